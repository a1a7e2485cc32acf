//! Header-based section splitting.
//!
//! [`MarkdownSplitter`] is the capability the file loader composes over;
//! [`MarkdownReader`] is the default implementation that turns a Markdown
//! file into one [`Document`] per header section.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use mdreader_shared::{Document, MdReaderError, Metadata, ReaderConfig, Result};

use crate::cleanup;

/// A `(header, body)` pair. `header` is `None` when the text has no headers.
pub type Section = (Option<String>, String);

// ---------------------------------------------------------------------------
// Splitter capability
// ---------------------------------------------------------------------------

/// Section-splitting reader consumed by [`crate::MarkdownFileLoader`].
pub trait MarkdownSplitter: Send + Sync {
    /// Whether hyperlinks are replaced by their text before splitting.
    fn remove_hyperlinks_enabled(&self) -> bool;

    /// Whether image embeds are dropped before splitting.
    fn remove_images_enabled(&self) -> bool;

    /// Strip hyperlink syntax from `text`, keeping link text.
    fn remove_hyperlinks(&self, text: &str) -> String {
        cleanup::remove_hyperlinks(text)
    }

    /// Strip image syntax from `text`.
    fn remove_images(&self, text: &str) -> String {
        cleanup::remove_images(text)
    }

    /// Split Markdown text into header sections.
    fn split_by_headers(&self, text: &str) -> Vec<Section>;

    /// Read (unless `content` is given), clean, and split a file into sections.
    fn parse_sections(&self, file: &Path, content: Option<&str>) -> Result<Vec<Section>> {
        let mut text = match content {
            Some(c) => c.to_string(),
            None => read_markdown_file(file)?,
        };

        if self.remove_hyperlinks_enabled() {
            text = self.remove_hyperlinks(&text);
        }
        if self.remove_images_enabled() {
            text = self.remove_images(&text);
        }

        Ok(self.split_by_headers(&text))
    }

    /// Load a file as one document per header section.
    ///
    /// Every document gets a fresh UUID v7 id and its own copy of `extra_info`.
    #[instrument(skip(self, extra_info, content), fields(path = %file.display()))]
    fn load_data(
        &self,
        file: &Path,
        extra_info: Option<Metadata>,
        content: Option<&str>,
    ) -> Result<Vec<Document>> {
        let metadata = extra_info.unwrap_or_default();
        let sections = self.parse_sections(file, content)?;

        debug!(sections = sections.len(), "split markdown by headers");

        Ok(sections
            .into_iter()
            .map(|(header, body)| {
                let text = match header {
                    Some(h) => format!("\n\n{h}\n{body}"),
                    None => body,
                };
                Document::with_generated_id(text, metadata.clone())
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Default reader
// ---------------------------------------------------------------------------

/// Default Markdown reader: optional link/image removal, then header splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownReader {
    remove_hyperlinks: bool,
    remove_images: bool,
}

impl MarkdownReader {
    pub fn new(remove_hyperlinks: bool, remove_images: bool) -> Self {
        Self {
            remove_hyperlinks,
            remove_images,
        }
    }

    /// Build a reader from the cleanup flags of a [`ReaderConfig`].
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.remove_hyperlinks, config.remove_images)
    }
}

impl Default for MarkdownReader {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl MarkdownSplitter for MarkdownReader {
    fn remove_hyperlinks_enabled(&self) -> bool {
        self.remove_hyperlinks
    }

    fn remove_images_enabled(&self) -> bool {
        self.remove_images
    }

    fn split_by_headers(&self, text: &str) -> Vec<Section> {
        split_by_headers(text)
    }
}

/// Split Markdown text into `(header, body)` sections.
///
/// A line starting with one or more `#` followed by whitespace opens a new
/// section. Sections with an empty body are dropped, except the last one.
/// If no header is found the whole text becomes one `(None, body)` section
/// with newlines removed.
///
/// When a header has an empty body, the following header takes over:
/// `"# Empty\n# Full\nbody"` yields `("Full", "body\n")`. Readers that skip
/// the later header line instead would yield `("Empty", "body\n")`.
pub fn split_by_headers(text: &str) -> Vec<Section> {
    static HEADER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^#+\s").expect("valid regex"));

    let mut sections: Vec<Section> = Vec::new();
    let mut current_header: Option<&str> = None;
    let mut current_body = String::new();

    for line in text.split('\n') {
        if HEADER_RE.is_match(line) {
            if let Some(header) = current_header {
                if !current_body.is_empty() {
                    sections.push((Some(header.to_string()), std::mem::take(&mut current_body)));
                }
            }
            current_header = Some(line);
            current_body.clear();
        } else {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }
    sections.push((current_header.map(str::to_string), current_body));

    if current_header.is_some() {
        sections
            .into_iter()
            .map(|(header, body)| {
                (
                    header.as_deref().map(cleanup::strip_header_marks),
                    cleanup::strip_html_tags(&body),
                )
            })
            .collect()
    } else {
        sections
            .into_iter()
            .map(|(header, body)| (header, cleanup::remove_newlines(&body)))
            .collect()
    }
}

/// Read a Markdown file as UTF-8.
///
/// Fails with [`MdReaderError::FileAccess`] when the file cannot be read and
/// [`MdReaderError::Encoding`] when its bytes are not UTF-8.
pub fn read_markdown_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| MdReaderError::file_access(path, e))?;

    String::from_utf8(bytes).map_err(|source| MdReaderError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}
