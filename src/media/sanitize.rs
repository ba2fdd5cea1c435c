use std::sync::LazyLock;

use regex::Regex;

/// Used when the title is missing or has nothing filesystem-safe in it
pub const FALLBACK_TITLE: &str = "video";

/// Filename limits count bytes (255 on most filesystems). This leaves room for
/// yt-dlp's intermediate names such as `{title}.f137.mp4.part`.
const MAX_TITLE_BYTES: usize = 200;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Turns a display title into a filesystem-safe slug.
///
/// Strips everything but word characters, whitespace and hyphens, then
/// collapses separator runs into a single `-`. Never returns an empty string
/// and `sanitize_title(&sanitize_title(x)) == sanitize_title(x)`.
pub fn sanitize_title(title: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(title, "");
    let collapsed = SEPARATOR_RUNS.replace_all(stripped.trim(), "-");

    let slug = truncate_bytes(&collapsed, MAX_TITLE_BYTES).trim_matches('-');

    if slug.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        slug.to_string()
    }
}

/// Longest prefix of `s` that fits in `budget` bytes without splitting a character
fn truncate_bytes(s: &str, budget: usize) -> &str {
    if s.len() <= budget {
        return s;
    }
    let mut end = budget;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
