//! Integration testing module
//!
//! End-to-end tests for the engine:
//! - Media load, matching and resolution
//! - Selection persistence
//! - Stale load handling
//! - Failure isolation

pub mod e2e;
