//! Text cleanup passes applied to Markdown before and after section splitting.
//!
//! Each pass is a function `&str -> String`. Regexes are compiled once and
//! shared through `LazyLock`.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Pre-split passes
// ---------------------------------------------------------------------------

/// Replace inline hyperlinks `[text](url)` with their link text.
///
/// Image syntax `![alt](src)` matches too and collapses to `!alt`.
pub fn remove_hyperlinks(md: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("valid regex"));

    LINK_RE.replace_all(md, "$1").into_owned()
}

/// Drop wiki-style embedded images (`![[diagram.png]]`).
pub fn remove_images(md: &str) -> String {
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[\[(.*)\]\]").expect("valid regex"));

    IMAGE_RE.replace_all(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Post-split passes
// ---------------------------------------------------------------------------

/// Remove inline HTML tags, keeping the text between them.
pub(crate) fn strip_html_tags(text: &str) -> String {
    static HTML_TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<.*?>").expect("valid regex"));

    HTML_TAG_RE.replace_all(text, "").into_owned()
}

/// Turn a header line (`## Setup `) into its bare title (`Setup`).
pub(crate) fn strip_header_marks(header: &str) -> String {
    header.replace('#', "").trim().to_string()
}

/// Join every line of a headerless body into a single line.
pub(crate) fn remove_newlines(text: &str) -> String {
    text.replace('\n', "")
}
