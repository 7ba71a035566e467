/*!
 * Resource Classification
 * =======================
 *
 * Maps a relay resource path to the kind of HLS resource it names. The decision is
 * made purely on the path suffix (case-sensitive); nothing is fetched or sniffed.
 *
 * ```text
 * - `.m3u8` / `.m3u`  => Manifest
 * - anything else      => Segment (including paths without an extension)
 * ```
 *
 * The function is total: every path has exactly one kind.
 */

use std::fmt;

/// Recognized manifest suffixes
const MANIFEST_SUFFIXES: [&str; 2] = [".m3u8", ".m3u"];

/// Kind of resource requested through the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Text playlist: master (variant index) or media playlist
    Manifest,
    /// Opaque media data, relayed byte-for-byte
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    Manifest,
    Other,
}

impl Suffix {
    fn of(path: &str) -> Self {
        if MANIFEST_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
            Suffix::Manifest
        } else {
            Suffix::Other
        }
    }
}

impl ResourceKind {
    /// Uppercase name used in relay event lines
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Manifest => "MANIFEST",
            ResourceKind::Segment => "SEGMENT",
        }
    }

    pub fn is_manifest(&self) -> bool {
        matches!(self, ResourceKind::Manifest)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a resource path by its suffix.
pub fn classify(path: &str) -> ResourceKind {
    match Suffix::of(path) {
        Suffix::Manifest => ResourceKind::Manifest,
        Suffix::Other => ResourceKind::Segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("playlist.m3u8", ResourceKind::Manifest)]
    #[case("content/m3u8s/f08e80da.m3u8", ResourceKind::Manifest)]
    #[case("legacy.m3u", ResourceKind::Manifest)]
    #[case("video.ts", ResourceKind::Segment)]
    #[case("init.mp4", ResourceKind::Segment)]
    #[case("chunk.m4s", ResourceKind::Segment)]
    #[case("noextension", ResourceKind::Segment)]
    #[case("", ResourceKind::Segment)]
    #[case("PLAYLIST.M3U8", ResourceKind::Segment)]
    #[case("playlist.m3u8.bak", ResourceKind::Segment)]
    #[case("playlistm3u", ResourceKind::Segment)]
    #[case("m3u8/segment.ts", ResourceKind::Segment)]
    fn test_classify(#[case] path: &str, #[case] expected: ResourceKind) {
        assert_eq!(classify(path), expected, "path: {path:?}");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ResourceKind::Manifest.to_string(), "MANIFEST");
        assert_eq!(ResourceKind::Segment.to_string(), "SEGMENT");
        assert!(ResourceKind::Manifest.is_manifest());
        assert!(!ResourceKind::Segment.is_manifest());
    }

    #[test]
    fn test_classify_is_deterministic() {
        for path in ["a.m3u8", "b.ts", "c"] {
            assert_eq!(classify(path), classify(path));
        }
    }
}
