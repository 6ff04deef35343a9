//! UUID and timestamp helpers shared across the crate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A UTC timestamp used throughout the data model.
pub type Timestamp = DateTime<Utc>;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Installs a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// For binaries and test harnesses embedding the pipeline. Does nothing if
/// a subscriber is already installed, so repeated calls are safe.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_is_v4() {
        let id = generate_uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
