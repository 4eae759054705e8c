//! End-to-end integration tests

use crate::error::SubtitleError;
use crate::store::{
    KeyValueStore, MemoryStore, SelectionRecord, KEY_AUTO_LOAD, KEY_DEFAULT_LANGUAGE,
    KEY_LAST_USED_LANGUAGE, KEY_SELECTIONS,
};
use crate::tests::fixtures::{engine, movie_dir, MemFs, TestEngine, SRT_EN, SRT_FR, TTML_BROKEN};

fn active_path(engine: &TestEngine) -> Option<String> {
    engine.state().active_track.map(|t| t.path)
}

fn store_with_record(media: &str, subtitle: &str) -> MemoryStore {
    let store = MemoryStore::new();
    let mut record = SelectionRecord::new();
    record.insert(media.to_string(), subtitle.to_string());
    store.set(KEY_SELECTIONS, &record).unwrap();
    store
}

#[tokio::test]
async fn test_load_matches_and_converts_all_formats() {
    let engine = engine(movie_dir(), MemoryStore::new());

    let found = engine.detect_and_apply("/media/movie.mkv").await;
    let mut languages: Vec<_> = found.iter().map(|s| s.language_code.as_str()).collect();
    languages.sort();
    assert_eq!(languages, vec!["eng", "fre", "ger", "spa"]);
    assert!(found.iter().all(|s| s.path != "/media/other.srt"));

    // English ranks first and is the default language
    assert_eq!(found[0].path, "/media/movie.en.srt");
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.en.srt"));
    assert!(engine.display().notices().is_empty());
}

#[tokio::test]
async fn test_record_beats_last_used_language() {
    let store = store_with_record("/media/show.mp4", "/media/show.fr.srt");
    store.set(KEY_LAST_USED_LANGUAGE, &"eng").unwrap();
    let files = MemFs::new()
        .with_file("/media/show.mp4", "")
        .with_file("/media/show.fr.srt", SRT_FR)
        .with_file("/media/show.en.srt", SRT_EN);
    let engine = engine(files, store);

    engine.detect_and_apply("/media/show.mp4").await;
    assert_eq!(active_path(&engine).as_deref(), Some("/media/show.fr.srt"));
}

#[tokio::test]
async fn test_last_used_language_beats_default() {
    let store = MemoryStore::new();
    store.set(KEY_LAST_USED_LANGUAGE, &"ger").unwrap();
    let engine = engine(movie_dir(), store);

    engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.de.ass"));
}

#[tokio::test]
async fn test_stored_default_language_overrides_config() {
    let store = MemoryStore::new();
    store.set(KEY_DEFAULT_LANGUAGE, &"es").unwrap();
    let engine = engine(movie_dir(), store);

    engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.es.ttml"));
}

#[tokio::test]
async fn test_no_candidates_leaves_off() {
    let files = MemFs::new()
        .with_file("/media/movie.mkv", "")
        .with_file("/media/unrelated.srt", SRT_EN);
    let engine = engine(files, MemoryStore::new());

    let found = engine.detect_and_apply("/media/movie.mkv").await;
    assert!(found.is_empty());
    assert_eq!(active_path(&engine), None);
    assert_eq!(engine.display().last_render(), Some(vec![]));
}

#[tokio::test]
async fn test_failed_conversion_is_isolated() {
    let files = MemFs::new()
        .with_file("/media/movie.mkv", "")
        .with_file("/media/movie.en.ttml", TTML_BROKEN)
        .with_file("/media/movie.fr.srt", SRT_FR);
    let engine = engine(files, MemoryStore::new());

    let found = engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, "/media/movie.fr.srt");

    let notices = engine.display().notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("movie (English)"));

    let listing = engine.tracks();
    assert_eq!(listing.len(), 1);
    // No English track converted and nothing else applies
    assert_eq!(active_path(&engine), None);
}

#[tokio::test]
async fn test_auto_load_disabled() {
    let store = MemoryStore::new();
    store.set(KEY_AUTO_LOAD, &false).unwrap();
    let engine = engine(movie_dir(), store);

    let found = engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(found.len(), 4);
    assert_eq!(active_path(&engine), None);
    assert_eq!(engine.tracks().len(), 4);
}

#[tokio::test]
async fn test_selection_is_persisted_and_restored() {
    let engine = engine(movie_dir(), MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;

    engine.select_track(Some("/media/movie.de.ass")).unwrap();
    let record: SelectionRecord = engine.store().get(KEY_SELECTIONS, SelectionRecord::new());
    assert_eq!(
        record.get("/media/movie.mkv").map(String::as_str),
        Some("/media/movie.de.ass")
    );
    let last: Option<String> = engine.store().get(KEY_LAST_USED_LANGUAGE, None);
    assert_eq!(last.as_deref(), Some("ger"));

    // Reload: the record wins
    engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.de.ass"));

    // Off deletes the record but keeps the last used language
    engine.select_track(None).unwrap();
    assert_eq!(active_path(&engine), None);
    let record: SelectionRecord = engine.store().get(KEY_SELECTIONS, SelectionRecord::new());
    assert!(record.is_empty());
    assert_eq!(engine.state().last_used_language.as_deref(), Some("ger"));

    engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.de.ass"));
}

#[tokio::test]
async fn test_select_unknown_track() {
    let engine = engine(movie_dir(), MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;

    assert_eq!(
        engine.select_track(Some("/media/missing.srt")),
        Err(SubtitleError::TrackNotFound("/media/missing.srt".into()))
    );
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.en.srt"));
}

#[tokio::test]
async fn test_at_most_one_track_showing() {
    let engine = engine(movie_dir(), MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;
    engine.select_track(Some("/media/movie.fr.srt")).unwrap();
    engine.select_track(Some("/media/movie.es.ttml")).unwrap();
    engine.select_track(None).unwrap();

    for render in engine.display().renders() {
        assert!(render.iter().filter(|t| t.showing).count() <= 1);
    }
}

#[tokio::test]
async fn test_active_content_is_canonical() {
    let engine = engine(movie_dir(), MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;

    engine.select_track(Some("/media/movie.es.ttml")).unwrap();
    let content = engine.active_content().unwrap();
    assert_eq!(
        std::str::from_utf8(&content).unwrap(),
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.500\nHola\nmundo\n\n"
    );

    engine.select_track(None).unwrap();
    assert!(engine.active_content().is_none());
}

#[tokio::test]
async fn test_load_external() {
    let files = movie_dir().with_file("/downloads/subs.pt.srt", SRT_EN);
    let engine = engine(files, MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;

    let source = engine.load_external("/downloads/subs.pt.srt").await.unwrap();
    assert_eq!(source.language_code, "por");
    assert_eq!(active_path(&engine).as_deref(), Some("/downloads/subs.pt.srt"));
    assert_eq!(engine.tracks().len(), 5);
    assert_eq!(engine.state().last_used_language.as_deref(), Some("por"));
    assert!(engine.active_content().is_some());
}

#[tokio::test]
async fn test_load_external_failure_keeps_state() {
    let files = movie_dir().with_file("/downloads/bad.ttml", TTML_BROKEN);
    let engine = engine(files, MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;

    let err = engine.load_external("/downloads/bad.ttml").await.unwrap_err();
    assert!(matches!(err, SubtitleError::MalformedDocument(_)));
    assert_eq!(active_path(&engine).as_deref(), Some("/media/movie.en.srt"));
    assert_eq!(engine.display().notices().len(), 1);

    let err = engine.load_external("/downloads/subs.idx").await.unwrap_err();
    assert!(matches!(err, SubtitleError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_converted_tracks_are_served_from_cache() {
    let engine = engine(movie_dir(), MemoryStore::new());
    engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(engine.cache().len(), 4);

    // Already converted for this media: no further reads
    let before = files_read(&engine);
    engine.load_external("/media/movie.fr.srt").await.unwrap();
    assert_eq!(files_read(&engine), before);
}

fn files_read(engine: &TestEngine) -> usize {
    engine.files().reads()
}

#[tokio::test]
async fn test_media_change_clears_cache_and_state() {
    let files = movie_dir()
        .with_file("/shows/ep1.mkv", "")
        .with_file("/shows/ep1.srt", SRT_EN);
    let engine = engine(files, MemoryStore::new());

    engine.detect_and_apply("/media/movie.mkv").await;
    assert!(engine.cache().state("/media/movie.en.srt").is_some());

    engine.detect_and_apply("/shows/ep1.mkv").await;
    assert!(engine.cache().state("/media/movie.en.srt").is_none());
    assert_eq!(engine.tracks().len(), 1);
    assert_eq!(active_path(&engine).as_deref(), Some("/shows/ep1.srt"));
}

#[tokio::test]
async fn test_stale_load_during_directory_scan_is_dropped() {
    let mut files = movie_dir()
        .with_file("/shows/ep1.mkv", "")
        .with_file("/shows/ep1.srt", SRT_EN);
    let gate = files.gate("/media");
    let engine = engine(files, MemoryStore::new());

    let first = engine.detect_and_apply("/media/movie.mkv");
    let second = async {
        let found = engine.detect_and_apply("/shows/ep1.mkv").await;
        gate.notify_one();
        found
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_empty());
    assert_eq!(second.len(), 1);
    assert_eq!(active_path(&engine).as_deref(), Some("/shows/ep1.srt"));
    for render in engine.display().renders() {
        assert!(render.iter().all(|t| !t.path.starts_with("/media/")));
    }
}

#[tokio::test]
async fn test_stale_load_during_conversion_is_dropped() {
    let mut files = movie_dir()
        .with_file("/shows/ep1.mkv", "")
        .with_file("/shows/ep1.srt", SRT_EN);
    let gate = files.gate("/media/movie.en.srt");
    let engine = engine(files, MemoryStore::new());

    let first = engine.detect_and_apply("/media/movie.mkv");
    let second = async {
        let found = engine.detect_and_apply("/shows/ep1.mkv").await;
        gate.notify_one();
        found
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_empty());
    assert_eq!(second.len(), 1);
    assert_eq!(active_path(&engine).as_deref(), Some("/shows/ep1.srt"));
    assert_eq!(engine.tracks().len(), 1);
    assert!(engine.display().notices().is_empty());
}

#[tokio::test]
async fn test_selection_during_pending_load_is_kept() {
    let mut files = movie_dir().with_file("/downloads/subs.pt.srt", SRT_EN);
    let gate = files.gate("/media/movie.en.srt");
    let engine = engine(files, MemoryStore::new());

    let load = engine.detect_and_apply("/media/movie.mkv");
    let external = async {
        let source = engine.load_external("/downloads/subs.pt.srt").await;
        gate.notify_one();
        source
    };
    let (found, external) = tokio::join!(load, external);

    assert_eq!(found.len(), 4);
    assert_eq!(external.unwrap().language_code, "por");
    assert_eq!(active_path(&engine).as_deref(), Some("/downloads/subs.pt.srt"));

    let record: SelectionRecord = engine.store().get(KEY_SELECTIONS, SelectionRecord::new());
    assert_eq!(
        record.get("/media/movie.mkv").map(String::as_str),
        Some("/downloads/subs.pt.srt")
    );

    let listing = engine.tracks();
    assert_eq!(listing.len(), 5);
    let showing: Vec<_> = listing.iter().filter(|t| t.showing).collect();
    assert_eq!(showing.len(), 1);
    assert_eq!(showing[0].path, "/downloads/subs.pt.srt");
}

#[tokio::test]
async fn test_xml_metadata_is_not_activated() {
    let files = MemFs::new()
        .with_file("/media/movie.mkv", "")
        .with_file("/media/movie.fr.srt", SRT_FR)
        .with_file("/media/movie.xml", "<movie><title>Movie</title></movie>");
    let engine = engine(files, MemoryStore::new());

    let found = engine.detect_and_apply("/media/movie.mkv").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, "/media/movie.fr.srt");
    assert_eq!(active_path(&engine), None);
    assert_eq!(engine.display().notices().len(), 1);
}
