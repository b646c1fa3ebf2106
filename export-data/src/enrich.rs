use insight_core::{CaptionMap, Post, PostKind, RawPost};

/// Number the sample by position, classify each link and attach captions.
/// Ids are positions in this sample, not identifiers from the export.
pub fn enrich(sampled: Vec<RawPost>, caption_map: Option<&CaptionMap>) -> Vec<Post> {
    sampled
        .into_iter()
        .enumerate()
        .map(|(position, raw)| {
            let id = position as u64;
            let captions = caption_map
                .and_then(|map| map.get(&id).cloned())
                .unwrap_or_default();
            Post {
                kind: PostKind::from_link(&raw.link),
                title: raw.title,
                link: raw.link,
                timestamp: raw.timestamp,
                id,
                captions,
            }
        })
        .collect()
}
