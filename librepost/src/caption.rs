//! Caption normalization
//!
//! Archived captions carry the collector's album boilerplate, a marker
//! of the form `[组图共N张] 原图` ("album of N images, original
//! resolution"). It is noise on every downstream platform and is
//! stripped before posting.

use once_cell::sync::Lazy;
use regex::Regex;

static ALBUM_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[组图共\d+张\]\s*原图\s*").expect("album marker regex is valid"));

/// Remove the album boilerplate from a caption.
///
/// Pure and infallible: a caption without the marker is returned
/// unchanged, internal whitespace elsewhere is preserved.
pub fn clean_caption(caption: &str) -> String {
    ALBUM_MARKER.replace_all(caption, "").into_owned()
}
