//! Record extraction and seeded sampling.
//!
//! Sampling is a partial Fisher-Yates shuffle driven by a `fastrand::Rng`
//! seeded from the caller's seed, so the same export, seed and sample size
//! always produce the same records in the same order. The sequence is only
//! guaranteed stable within this implementation.

use insight_core::{CoreError, ExportError, Mode, RawPost};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub const MIN_SAMPLE: usize = 1;
pub const MAX_SAMPLE: usize = 100;

const SAVED_SECTION: &str = "saved_saved_media";
const LIKED_SECTION: &str = "likes_media_likes";
const SAVED_ON_KEY: &str = "Saved on";

#[derive(Debug, Deserialize)]
struct LinkStamp {
    href: String,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct SavedItem {
    title: String,
    string_map_data: HashMap<String, LinkStamp>,
}

#[derive(Debug, Deserialize)]
struct LikedItem {
    title: String,
    string_list_data: Vec<LinkStamp>,
}

pub fn section_key(mode: Mode) -> &'static str {
    match mode {
        Mode::Saved => SAVED_SECTION,
        Mode::Liked => LIKED_SECTION,
    }
}

pub fn validate_sample_size(sample_num: usize) -> Result<(), ExportError> {
    if (MIN_SAMPLE..=MAX_SAMPLE).contains(&sample_num) {
        Ok(())
    } else {
        Err(ExportError::SampleOutOfRange {
            requested: sample_num,
            min: MIN_SAMPLE,
            max: MAX_SAMPLE,
        })
    }
}

/// Pull title/link/timestamp out of every item of the mode's section.
/// A single malformed item fails the whole extraction.
pub fn extract_posts(export: &Value, mode: Mode) -> Result<Vec<RawPost>, CoreError> {
    let key = section_key(mode);
    let items = export
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ExportError::MissingSection {
            key: key.to_string(),
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| extract_item(index, item, mode).map_err(CoreError::from))
        .collect()
}

fn extract_item(index: usize, item: &Value, mode: Mode) -> Result<RawPost, ExportError> {
    let malformed = |details: String| ExportError::MalformedRecord { index, details };

    match mode {
        Mode::Saved => {
            let item = SavedItem::deserialize(item).map_err(|e| malformed(e.to_string()))?;
            let saved_on = item
                .string_map_data
                .get(SAVED_ON_KEY)
                .ok_or_else(|| malformed(format!("missing string_map_data[\"{SAVED_ON_KEY}\"]")))?;
            Ok(RawPost {
                title: item.title,
                link: saved_on.href.clone(),
                timestamp: saved_on.timestamp,
            })
        }
        Mode::Liked => {
            let item = LikedItem::deserialize(item).map_err(|e| malformed(e.to_string()))?;
            let first = item
                .string_list_data
                .into_iter()
                .next()
                .ok_or_else(|| malformed("empty string_list_data".to_string()))?;
            Ok(RawPost {
                title: item.title,
                link: first.href,
                timestamp: first.timestamp,
            })
        }
    }
}

/// Draw `sample_num` distinct items, in shuffled order, using `seed` as the
/// only source of randomness.
pub fn sample<T: Clone>(items: &[T], sample_num: usize, seed: u64) -> Result<Vec<T>, ExportError> {
    if sample_num > items.len() {
        return Err(ExportError::SampleTooLarge {
            requested: sample_num,
            available: items.len(),
        });
    }

    let mut rng = fastrand::Rng::with_seed(seed);
    let mut indices: Vec<usize> = (0..items.len()).collect();
    for i in 0..sample_num {
        let j = rng.usize(i..indices.len());
        indices.swap(i, j);
    }

    Ok(indices[..sample_num]
        .iter()
        .map(|&index| items[index].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn saved_export() -> Value {
        json!({
            "saved_saved_media": [
                {
                    "title": "alice",
                    "string_map_data": {
                        "Saved on": {
                            "href": "https://www.instagram.com/p/AAA/",
                            "timestamp": 1700000001
                        }
                    }
                },
                {
                    "title": "bob",
                    "string_map_data": {
                        "Saved on": {
                            "href": "https://www.instagram.com/reel/BBB/",
                            "timestamp": 1700000002
                        }
                    }
                }
            ]
        })
    }

    #[test]
    fn test_extract_saved() {
        let posts = extract_posts(&saved_export(), Mode::Saved).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "alice");
        assert_eq!(posts[0].link, "https://www.instagram.com/p/AAA/");
        assert_eq!(posts[1].timestamp, 1700000002);
    }

    #[test]
    fn test_extract_liked() {
        let export = json!({
            "likes_media_likes": [
                {
                    "title": "carol",
                    "string_list_data": [
                        { "href": "https://www.instagram.com/p/CCC/", "value": "👍", "timestamp": 1690000000 }
                    ]
                }
            ]
        });

        let posts = extract_posts(&export, Mode::Liked).unwrap();
        assert_eq!(
            posts,
            vec![RawPost {
                title: "carol".to_string(),
                link: "https://www.instagram.com/p/CCC/".to_string(),
                timestamp: 1690000000,
            }]
        );
    }

    #[test]
    fn test_wrong_section_for_mode() {
        let err = extract_posts(&saved_export(), Mode::Liked).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::MissingSection { ref key }) if key == "likes_media_likes"
        ));
    }

    #[test]
    fn test_malformed_record_names_index() {
        let export = json!({
            "saved_saved_media": [
                {
                    "title": "ok",
                    "string_map_data": { "Saved on": { "href": "https://x/p/1/", "timestamp": 1 } }
                },
                { "title": "broken", "string_map_data": {} }
            ]
        });

        let err = extract_posts(&export, Mode::Saved).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::MalformedRecord { index: 1, .. })
        ));

        let export = json!({ "likes_media_likes": [ { "title": "no data", "string_list_data": [] } ] });
        assert!(extract_posts(&export, Mode::Liked).is_err());
    }

    #[test]
    fn test_sample_is_deterministic() {
        let items: Vec<u32> = (0..50).collect();
        let first = sample(&items, 10, 42).unwrap();
        let second = sample(&items, 10, 42).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);

        let other_seed = sample(&items, 10, 7).unwrap();
        assert_ne!(first, other_seed);
    }

    #[test]
    fn test_sample_items_are_distinct() {
        let items: Vec<u32> = (0..20).collect();
        let mut picked = sample(&items, 20, 99).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, items);
    }

    #[test]
    fn test_sample_too_large() {
        let items = vec!["a", "b", "c"];
        let err = sample(&items, 4, 42).unwrap_err();
        assert!(matches!(
            err,
            ExportError::SampleTooLarge {
                requested: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_sample_size_bounds() {
        assert!(validate_sample_size(1).is_ok());
        assert!(validate_sample_size(100).is_ok());
        assert!(validate_sample_size(0).is_err());
        assert!(validate_sample_size(101).is_err());
    }
}
