//! Accepted media categories and the extension lists shown for them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse media category, keyed by MIME type prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MediaCategory {
    #[serde(rename = "image/*")]
    Image,
    #[serde(rename = "video/*")]
    Video,
}

impl MediaCategory {
    /// Category of a MIME type such as `image/png`; `None` for anything else
    pub fn from_mime(mime: &str) -> Option<Self> {
        let (prefix, _) = mime.split_once('/')?;
        match prefix.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaCategory::Image),
            "video" => Some(MediaCategory::Video),
            _ => None,
        }
    }

    /// Wildcard MIME pattern, e.g. `image/*`
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image/*",
            MediaCategory::Video => "video/*",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from media category to the file extensions offered for it
///
/// Filtering is decided by category only; the extension lists are
/// presentational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptFilter(BTreeMap<MediaCategory, Vec<String>>);

impl Default for AcceptFilter {
    fn default() -> Self {
        Self::empty()
            .with(MediaCategory::Image, [".jpg", ".jpeg", ".png"])
            .with(MediaCategory::Video, [".mp4", ".mov"])
    }
}

impl AcceptFilter {
    /// A filter accepting nothing
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Accept `category`, advertising the given extensions
    pub fn with<I, S>(mut self, category: MediaCategory, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(category, extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn accepts(&self, category: MediaCategory) -> bool {
        self.0.contains_key(&category)
    }

    /// Whether a MIME type belongs to an accepted category
    pub fn accepts_mime(&self, mime: &str) -> bool {
        MediaCategory::from_mime(mime).is_some_and(|category| self.accepts(category))
    }

    pub fn categories(&self) -> impl Iterator<Item = MediaCategory> + '_ {
        self.0.keys().copied()
    }

    pub fn extensions(&self, category: MediaCategory) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Hint text such as `.jpg, .jpeg or .png | .mp4 or .mov`
    pub fn hint(&self) -> String {
        self.categories()
            .map(|category| self.extensions(category))
            .filter(|exts| !exts.is_empty())
            .map(|exts| match exts.split_last() {
                Some((last, [])) => last.clone(),
                Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_from_mime() {
        assert_eq!(MediaCategory::from_mime("image/png"), Some(MediaCategory::Image));
        assert_eq!(MediaCategory::from_mime("VIDEO/mp4"), Some(MediaCategory::Video));
        assert_eq!(MediaCategory::from_mime("application/pdf"), None);
        assert_eq!(MediaCategory::from_mime("image"), None);
        assert_eq!(MediaCategory::from_mime(""), None);
    }

    #[test]
    fn test_filter_is_category_based() {
        let images = AcceptFilter::empty().with(MediaCategory::Image, [".png"]);
        // extension lists do not restrict the subtype
        assert!(images.accepts_mime("image/webp"));
        assert!(!images.accepts_mime("video/mp4"));

        let videos = AcceptFilter::empty().with(MediaCategory::Video, Vec::<String>::new());
        assert!(videos.accepts_mime("video/quicktime"));
        assert!(!videos.accepts_mime("image/png"));
    }

    #[test]
    fn test_default_filter_hint() {
        assert_eq!(AcceptFilter::default().hint(), ".jpg, .jpeg or .png | .mp4 or .mov");
        assert_eq!(
            AcceptFilter::empty().with(MediaCategory::Video, [".mp4"]).hint(),
            ".mp4"
        );
    }

    #[test]
    fn test_filter_serde_uses_wildcard_keys() {
        let filter: AcceptFilter =
            serde_json::from_value(json!({"image/*": [".png"]})).expect("filter should decode");
        assert!(filter.accepts(MediaCategory::Image));
        assert!(!filter.accepts(MediaCategory::Video));
        assert_eq!(filter.extensions(MediaCategory::Image), [".png".to_string()]);
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"image/*": [".png"]}));
    }
}
