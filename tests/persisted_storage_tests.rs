#[cfg(test)]
mod tests {
    use campus_kit::storage::persisted::FallbackPolicy;
    use campus_kit::utils::logging::LogRingBuffer;
    use campus_kit::{FileStorage, Persisted, SortOrder, StorageProvider};
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Preferences {
        language: String,
        page_size: usize,
        sort_order: SortOrder,
        favourites: Vec<String>,
    }

    fn sample() -> Preferences {
        Preferences {
            language: "es".to_string(),
            page_size: 25,
            sort_order: SortOrder::Descending,
            favourites: vec!["MAT101".to_string(), "CS101".to_string()],
        }
    }

    #[test]
    fn test_value_survives_reinitialization() {
        let dir = TempDir::new().unwrap();

        {
            let storage = FileStorage::new(dir.path()).unwrap();
            let mut prefs = Persisted::new(storage, "prefs", Preferences::default());
            prefs.set(sample());
        }

        let storage = FileStorage::new(dir.path()).unwrap();
        let prefs = Persisted::new(storage, "prefs", Preferences::default());
        assert_eq!(prefs.get(), &sample());
    }

    #[test]
    fn test_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut a = Persisted::new(storage.clone(), "user:1", 0u32);
        let mut b = Persisted::new(storage.clone(), "user:2", 0u32);
        a.set(1);
        b.set(2);

        assert_eq!(*Persisted::new(storage.clone(), "user:1", 0u32).get(), 1);
        assert_eq!(*Persisted::new(storage, "user:2", 0u32).get(), 2);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set_item("prefs", "{\"language\": ").unwrap();

        let log = LogRingBuffer::new();
        let prefs = Persisted::with_policy(
            storage,
            "prefs",
            Preferences::default(),
            FallbackPolicy::new(log.clone()),
        );

        assert_eq!(prefs.get(), &Preferences::default());
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_recent(1)[0].target, "storage");
    }

    #[test]
    fn test_wrong_shape_falls_back_silently_when_asked() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set_item("count", "\"not a number\"").unwrap();

        let count = Persisted::with_policy(storage, "count", 3u8, FallbackPolicy::silent());
        assert_eq!(*count.get(), 3);
    }
}
