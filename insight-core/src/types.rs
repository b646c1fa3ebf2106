use crate::error::{CoreError, ExportError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Caller-supplied captions keyed by post id.
pub type CaptionMap = HashMap<u64, String>;

/// Which half of the export to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Saved,
    Liked,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Saved => "saved",
            Mode::Liked => "liked",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saved" => Ok(Mode::Saved),
            "liked" => Ok(Mode::Liked),
            other => Err(ExportError::InvalidMode {
                mode: other.to_string(),
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    Reel,
}

impl PostKind {
    /// Heuristic: only links containing `/p/` are regular posts, everything
    /// else (including `/tv/` and `/reel/`) is reported as a reel.
    pub fn from_link(link: &str) -> Self {
        if link.contains("/p/") {
            PostKind::Post
        } else {
            PostKind::Reel
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub link: String,
    pub timestamp: i64,
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: PostKind,
    #[serde(default)]
    pub captions: String,
}

/// Title/link/timestamp triple as it comes out of the export, before the
/// sample is numbered and classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub title: String,
    pub link: String,
    pub timestamp: i64,
}

/// An export file received through the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    /// Name the client sent; equals `stored_as` once only the disk is known.
    pub filename: String,
    pub stored_as: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub raw_reasoning: String,
    pub summary_reasoning: String,
    pub categories: Vec<String>,
}

impl fmt::Display for CategoryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RAW REASONING:\n{}\n", self.raw_reasoning)?;
        writeln!(f, "SUMMARY REASONING:\n{}\n", self.summary_reasoning)?;
        write!(f, "CATEGORIES: [{}]", self.categories.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("saved".parse::<Mode>().unwrap(), Mode::Saved);
        assert_eq!("liked".parse::<Mode>().unwrap(), Mode::Liked);

        let err = "bogus".parse::<Mode>().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Export(ExportError::InvalidMode { ref mode }) if mode == "bogus"
        ));
        assert!("Saved".parse::<Mode>().is_err());
    }

    #[test]
    fn test_post_kind_from_link() {
        assert_eq!(
            PostKind::from_link("https://www.instagram.com/p/ABC123/"),
            PostKind::Post
        );
        assert_eq!(
            PostKind::from_link("https://www.instagram.com/reel/XYZ/"),
            PostKind::Reel
        );
        assert_eq!(
            PostKind::from_link("https://www.instagram.com/tv/XYZ/"),
            PostKind::Reel
        );
    }

    #[test]
    fn test_post_serializes_kind_as_type() {
        let post = Post {
            title: "someone".to_string(),
            link: "https://www.instagram.com/p/ABC/".to_string(),
            timestamp: 1_700_000_000,
            id: 3,
            kind: PostKind::Post,
            captions: String::new(),
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["type"], "post");
        assert_eq!(value["id"], 3);
        assert_eq!(value["captions"], "");
    }

    #[test]
    fn test_category_result_display() {
        let result = CategoryResult {
            raw_reasoning: "thinking".to_string(),
            summary_reasoning: "travel post".to_string(),
            categories: vec!["travel".to_string(), "food".to_string()],
        };

        let text = result.to_string();
        assert!(text.contains("thinking"));
        assert!(text.contains("travel post"));
        assert!(text.ends_with("CATEGORIES: [travel, food]"));
    }
}
