//! Release tag and version-string helpers.

use std::sync::LazyLock;

use regex::Regex;

/// `release: 1.2.0` or a `v`-prefixed version anywhere in a title.
static TITLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)release:\s*(v?\d+(?:\.\d+)+[0-9a-z.+-]*)|\b(v\d+(?:\.\d+)+[0-9a-z.+-]*)")
        .expect("static regex")
});

/// Any dotted numeric version, optionally `v`-prefixed.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bv?(\d+(?:\.\d+)+)").expect("static regex"));

/// Tag name embedded in a release title, e.g. `"Release: v1.2.0"` → `"v1.2.0"`.
pub fn tag_from_title(title: &str) -> Option<String> {
    let caps = TITLE_TAG_RE.captures(title)?;
    let m = caps.get(1).or_else(|| caps.get(2))?;
    let tag = m.as_str().trim_end_matches(['.', '-', '+']);
    (!tag.is_empty()).then(|| tag.to_string())
}

/// First version-like substring of a title, without any `v` prefix.
pub fn version_in(title: &str) -> Option<String> {
    VERSION_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lower-case, drop a leading `v` and `release`/`release-`, keep digits and dots.
///
/// `"v1.2.0"`, `"1.2.0"`, `"release-1.2.0"` and `"Release-v1.2.0"` all become `"1.2.0"`.
pub fn normalize_tag(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    let s = lower.strip_prefix('v').unwrap_or(&lower);
    let s = s
        .strip_prefix("release-")
        .or_else(|| s.strip_prefix("release"))
        .unwrap_or(s);
    s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Case-insensitive equality, or equality after [`normalize_tag`]. Blank tags never match.
pub fn tags_equivalent(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    let (na, nb) = (normalize_tag(a), normalize_tag(b));
    !na.is_empty() && na == nb
}
