//! Display boundary
//!
//! The engine never renders anything itself. It hands the track list to a
//! [`DisplaySink`] after every change and reports non-fatal failures as
//! notices.

use parking_lot::Mutex;

use crate::types::TrackListing;

pub trait DisplaySink: Send + Sync {
    /// Replace the shown track list
    fn render(&self, tracks: &[TrackListing]);

    /// Show a short, non-fatal message
    fn notice(&self, message: &str);
}

/// Prints to the terminal; used by the CLI
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn render(&self, tracks: &[TrackListing]) {
        if tracks.is_empty() {
            println!("no subtitles");
            return;
        }
        for track in tracks {
            let marker = if track.showing { "*" } else { " " };
            println!("{} [{}] {}  {}", marker, track.language_code, track.label, track.path);
        }
    }

    fn notice(&self, message: &str) {
        eprintln!("note: {}", message);
    }
}

/// Keeps everything it was given
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    renders: Mutex<Vec<Vec<TrackListing>>>,
    notices: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> Vec<Vec<TrackListing>> {
        self.renders.lock().clone()
    }

    pub fn last_render(&self) -> Option<Vec<TrackListing>> {
        self.renders.lock().last().cloned()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&self, tracks: &[TrackListing]) {
        self.renders.lock().push(tracks.to_vec());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }
}
