//! Percent-encoding for URL path segments.
//!
//! Server-assigned job ids are interpolated into request paths; encoding
//! them keeps a hostile or malformed id from breaking URL resolution or
//! escaping into a different path.

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters percent-encoded in URL path segments.
///
/// RFC 3986 section 3.3 reserved characters, plus `%` so already-encoded
/// input is not double-decoded and `/` so a segment cannot introduce
/// extra path components.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'#');

/// Percent-encode a string for safe use as a URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    percent_encode(segment.as_bytes(), PATH_SEGMENT_ENCODE_SET).to_string()
}
