//! Frame-ID canonicalization.
//!
//! A canonical [`FrameId`] always begins with `/`. Comparison is always by
//! value, deliberately: comparing interned-string identity instead would
//! under-detect self-transforms whenever two equal ids aren't actually the
//! same allocation, which is exactly the kind of false negative a rigid
//! transform graph can't afford.

use std::fmt;

/// A canonicalized frame identifier: non-empty, always starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(String);

impl FrameId {
    /// Canonicalize `raw`, prepending `prefix` (if any) and a leading `/`
    /// when missing. Returns whether a rewrite was necessary, for callers
    /// that want to log the "canonicalization was necessary" diagnostic.
    pub fn canonicalize(raw: &str, prefix: Option<&str>) -> (Self, bool) {
        if raw.starts_with('/') {
            return (FrameId(raw.to_string()), false);
        }

        let canonical = match prefix {
            Some(prefix) if !prefix.is_empty() => {
                let prefix = prefix.trim_start_matches('/').trim_end_matches('/');
                format!("/{prefix}/{raw}")
            }
            _ => format!("/{raw}"),
        };
        (FrameId(canonical), true)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty_segment(&self) -> bool {
        self.0 == "/" || self.0.is_empty()
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FrameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_slash_passes_through_unchanged() {
        let (id, rewritten) = FrameId::canonicalize("/map", None);
        assert_eq!(id.as_str(), "/map");
        assert!(!rewritten);
    }

    #[test]
    fn missing_slash_is_prefixed() {
        let (id, rewritten) = FrameId::canonicalize("base_link", None);
        assert_eq!(id.as_str(), "/base_link");
        assert!(rewritten);
    }

    #[test]
    fn configured_prefix_is_applied() {
        let (id, rewritten) = FrameId::canonicalize("base_link", Some("robot1"));
        assert_eq!(id.as_str(), "/robot1/base_link");
        assert!(rewritten);
    }

    #[test]
    fn configured_prefix_with_slashes_is_normalized() {
        let (id, _) = FrameId::canonicalize("base_link", Some("/robot1/"));
        assert_eq!(id.as_str(), "/robot1/base_link");
    }

    #[test]
    fn already_canonical_ignores_prefix() {
        let (id, rewritten) = FrameId::canonicalize("/base_link", Some("robot1"));
        assert_eq!(id.as_str(), "/base_link");
        assert!(!rewritten);
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let (first, _) = FrameId::canonicalize("base_link", Some("robot1"));
        let (second, rewritten) = FrameId::canonicalize(first.as_str(), Some("robot1"));
        assert_eq!(first, second);
        assert!(!rewritten);
    }

    #[test]
    fn equality_is_by_value_not_identity() {
        let (a, _) = FrameId::canonicalize("/map", None);
        let b = FrameId("/map".to_string());
        assert_eq!(a, b);
    }
}
