pub mod firebase;
pub mod local_file;
pub mod memory;
pub mod postgres;

pub use firebase::FirebaseDocumentStore;
pub use local_file::FileLocalStore;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use chrono::Utc;
use uuid::Uuid;

/// Builds a child key that sorts roughly by creation time, for stores that
/// have no key generator of their own.
pub(crate) fn push_key() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("-{:012x}{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Splits a store path into its non-empty segments. `""` and `"/"` are the root.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_ignore_stray_slashes() {
        assert_eq!(segments("/bookings//u1/7/"), vec!["bookings", "u1", "7"]);
        assert!(segments("").is_empty());
        assert!(segments("/").is_empty());
    }

    #[test]
    fn push_keys_are_unique() {
        assert_ne!(push_key(), push_key());
    }
}
