#[cfg(test)]
mod tests {
    use crate::{export_path, load_export, ExportStore};
    use insight_core::{CaptionMap, CoreError, ExportError, Mode, PostKind};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_export(saved_count: usize) -> TempDir {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let saved: Vec<_> = (0..saved_count)
            .map(|i| {
                let link = if i % 2 == 0 {
                    format!("https://www.instagram.com/p/POST{i}/")
                } else {
                    format!("https://www.instagram.com/reel/REEL{i}/")
                };
                let timestamp = 1_700_000_000_i64 + i as i64;
                json!({
                    "title": format!("account_{i}"),
                    "string_map_data": {
                        "Saved on": { "href": link, "timestamp": timestamp }
                    }
                })
            })
            .collect();

        let saved_path = export_path(dir.path(), Mode::Saved);
        fs::create_dir_all(saved_path.parent().unwrap()).unwrap();
        fs::write(
            &saved_path,
            serde_json::to_string(&json!({ "saved_saved_media": saved })).unwrap(),
        )
        .unwrap();

        dir
    }

    #[tokio::test]
    async fn test_sample_posts_is_reproducible() {
        let dir = setup_test_export(30);
        let store = ExportStore::new(dir.path());

        let first = store.sample_posts("saved", 10, 42, None).await.unwrap();
        let second = store.sample_posts("saved", 10, 42, None).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
        for (position, post) in first.iter().enumerate() {
            assert_eq!(post.id, position as u64);
            let expected = if post.link.contains("/p/") {
                PostKind::Post
            } else {
                PostKind::Reel
            };
            assert_eq!(post.kind, expected);
        }
    }

    #[tokio::test]
    async fn test_sample_posts_attaches_captions() {
        let dir = setup_test_export(5);
        let store = ExportStore::new(dir.path());

        let mut captions = CaptionMap::new();
        captions.insert(0, "hello".to_string());

        let posts = store
            .sample_posts("saved", 5, 1, Some(&captions))
            .await
            .unwrap();
        assert_eq!(posts[0].captions, "hello");
        assert!(posts[1..].iter().all(|post| post.captions.is_empty()));
    }

    #[tokio::test]
    async fn test_invalid_mode() {
        let dir = setup_test_export(3);
        let store = ExportStore::new(dir.path());

        let err = store.sample_posts("bogus", 1, 42, None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::InvalidMode { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_export_file() {
        let dir = setup_test_export(3);
        let store = ExportStore::new(dir.path());

        let err = store.sample_posts("liked", 1, 42, None).await.unwrap_err();
        match err {
            CoreError::Export(ExportError::FileNotFound { path }) => {
                assert!(path.ends_with("liked_posts.json"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sample_larger_than_export() {
        let dir = setup_test_export(3);
        let store = ExportStore::new(dir.path());

        let err = store.sample_posts("saved", 4, 42, None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::SampleTooLarge { .. })
        ));

        let err = store.sample_posts("saved", 0, 42, None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::SampleOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(dir.path(), Mode::Liked);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = load_export(dir.path(), Mode::Liked).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::InvalidJson { .. })
        ));
    }
}
