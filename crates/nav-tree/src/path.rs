//! Materialized path encoding.
//!
//! Every page stores its position in the tree as a string of fixed-width
//! segments. A page's path is its parent's path plus one segment, so:
//!
//! - descendants of a page share its path as a strict prefix
//! - depth is `path.len() / STEPLEN`
//! - the parent path is the path with the last segment removed
//!
//! Segments are base-36 numbers (`0-9A-Z`), left padded with zeros.

/// Width of a single path segment.
pub const STEPLEN: usize = 4;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Error returned for malformed materialized paths.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path is empty or its length is not a multiple of [`STEPLEN`].
    #[error("Invalid path length {len} for {path:?} (segment width is {STEPLEN})")]
    InvalidLength {
        /// The offending path.
        path: String,
        /// Its length in bytes.
        len: usize,
    },
    /// Path contains a character outside the segment alphabet.
    #[error("Invalid character in path {0:?}")]
    InvalidCharacter(String),
    /// Segment number does not fit in [`STEPLEN`] base-36 digits.
    #[error("Segment number {0} is out of range")]
    SegmentOverflow(u32),
}

/// Encode a 1-based sibling position as a path segment.
///
/// # Errors
///
/// Returns [`PathError::SegmentOverflow`] if `n` needs more than
/// [`STEPLEN`] digits.
pub fn encode_segment(n: u32) -> Result<String, PathError> {
    let mut digits = [b'0'; STEPLEN];
    let mut rest = n;
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(rest % 36) as usize];
        rest /= 36;
    }
    if rest != 0 {
        return Err(PathError::SegmentOverflow(n));
    }
    Ok(digits.iter().map(|&b| char::from(b)).collect())
}

/// Validate a path and return its depth.
///
/// # Errors
///
/// Returns [`PathError`] if the path is empty, not segment aligned, or
/// contains characters outside the alphabet.
pub fn depth_of(path: &str) -> Result<u32, PathError> {
    if path.is_empty() || path.len() % STEPLEN != 0 {
        return Err(PathError::InvalidLength {
            path: path.to_owned(),
            len: path.len(),
        });
    }
    if !path.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(PathError::InvalidCharacter(path.to_owned()));
    }
    u32::try_from(path.len() / STEPLEN).map_err(|_| PathError::InvalidLength {
        path: path.to_owned(),
        len: path.len(),
    })
}

/// Path of the `n`th child of `parent`.
///
/// # Errors
///
/// Returns [`PathError::SegmentOverflow`] if `n` cannot be encoded.
pub fn child_path(parent: &str, n: u32) -> Result<String, PathError> {
    Ok(format!("{parent}{}", encode_segment(n)?))
}

/// Path of the parent node, `None` for a root path.
#[must_use]
pub fn parent_path(path: &str) -> Option<&str> {
    if path.len() <= STEPLEN {
        return None;
    }
    path.get(..path.len() - STEPLEN)
}

/// Key under which a page is grouped with its siblings.
///
/// Equal to the parent path, or an empty string for root nodes.
#[must_use]
pub fn sibling_key(path: &str) -> &str {
    parent_path(path).unwrap_or("")
}

/// Paths of all strict ancestors, shallowest first.
#[must_use]
pub fn ancestor_paths(path: &str) -> Vec<&str> {
    (1..path.len() / STEPLEN)
        .filter_map(|n| path.get(..n * STEPLEN))
        .collect()
}

/// True if `path` lies strictly below `ancestor`.
#[must_use]
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment_pads_to_steplen() {
        assert_eq!(encode_segment(1).unwrap(), "0001");
        assert_eq!(encode_segment(35).unwrap(), "000Z");
        assert_eq!(encode_segment(36).unwrap(), "0010");
    }

    #[test]
    fn test_encode_segment_overflow() {
        let max = 36_u32.pow(4);
        assert!(encode_segment(max - 1).is_ok());
        assert_eq!(encode_segment(max), Err(PathError::SegmentOverflow(max)));
    }

    #[test]
    fn test_depth_of() {
        assert_eq!(depth_of("0001"), Ok(1));
        assert_eq!(depth_of("000100020003"), Ok(3));
    }

    #[test]
    fn test_depth_of_rejects_misaligned_path() {
        assert!(matches!(
            depth_of("00010"),
            Err(PathError::InvalidLength { len: 5, .. })
        ));
        assert!(matches!(depth_of(""), Err(PathError::InvalidLength { .. })));
    }

    #[test]
    fn test_depth_of_rejects_lowercase() {
        assert_eq!(
            depth_of("000a"),
            Err(PathError::InvalidCharacter("000a".to_owned()))
        );
    }

    #[test]
    fn test_child_path_appends_segment() {
        assert_eq!(child_path("0001", 2).unwrap(), "00010002");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("00010002"), Some("0001"));
        assert_eq!(parent_path("0001"), None);
    }

    #[test]
    fn test_sibling_key_for_root_is_empty() {
        assert_eq!(sibling_key("0001"), "");
        assert_eq!(sibling_key("000100010005"), "00010001");
    }

    #[test]
    fn test_ancestor_paths_shallowest_first() {
        assert_eq!(
            ancestor_paths("000100020003"),
            vec!["0001", "00010002"]
        );
        assert!(ancestor_paths("0001").is_empty());
    }

    #[test]
    fn test_is_descendant_of_is_strict() {
        assert!(is_descendant_of("00010002", "0001"));
        assert!(!is_descendant_of("0001", "0001"));
        assert!(!is_descendant_of("00020001", "0001"));
    }
}
