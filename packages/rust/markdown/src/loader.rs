//! Markdown file loader with an optional whole-file mode.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use mdreader_shared::{Document, Metadata, ReaderConfig, Result};

use crate::reader::{MarkdownReader, MarkdownSplitter, read_markdown_file};

/// Loads Markdown files into [`Document`]s.
///
/// With `read_as_single_doc` unset, loading is delegated to the splitter and
/// yields one document per header section. With it set, the whole file
/// becomes a single document whose id is the file path.
#[derive(Debug, Clone)]
pub struct MarkdownFileLoader<S = MarkdownReader> {
    splitter: S,
    read_as_single_doc: bool,
}

impl MarkdownFileLoader<MarkdownReader> {
    /// Build a loader around a default [`MarkdownReader`] configured from `config`.
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(MarkdownReader::from_config(config), config.read_as_single_doc)
    }
}

impl<S: MarkdownSplitter> MarkdownFileLoader<S> {
    pub fn new(splitter: S, read_as_single_doc: bool) -> Self {
        Self {
            splitter,
            read_as_single_doc,
        }
    }

    pub fn read_as_single_doc(&self) -> bool {
        self.read_as_single_doc
    }

    pub fn splitter(&self) -> &S {
        &self.splitter
    }

    /// Load `file` into documents.
    ///
    /// `content` is only consulted when delegating to the splitter; whole-file
    /// mode always reads from disk.
    ///
    /// In whole-file mode the document id is the path as given, converted
    /// with [`Path::to_string_lossy`]: non-UTF-8 path bytes become `U+FFFD`.
    #[instrument(
        skip(self, extra_info, content),
        fields(path = %file.display(), single_doc = self.read_as_single_doc)
    )]
    pub fn load(
        &self,
        file: &Path,
        extra_info: Option<Metadata>,
        content: Option<&str>,
    ) -> Result<Vec<Document>> {
        let metadata = extra_info.unwrap_or_default();

        if !self.read_as_single_doc {
            return self.splitter.load_data(file, Some(metadata), content);
        }

        let mut text = read_markdown_file(file)?;
        if self.splitter.remove_hyperlinks_enabled() {
            text = self.splitter.remove_hyperlinks(&text);
        }
        if self.splitter.remove_images_enabled() {
            text = self.splitter.remove_images(&text);
        }

        debug!(len = text.len(), "loaded markdown as single document");

        let id = file.to_string_lossy().into_owned();
        Ok(vec![Document::new(id, text, metadata)])
    }

    /// Load several files in order, attaching a copy of `extra_info` to each.
    ///
    /// Stops at the first file that fails.
    pub fn load_many(
        &self,
        files: &[PathBuf],
        extra_info: Option<&Metadata>,
    ) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for file in files {
            documents.extend(self.load(file, extra_info.cloned(), None)?);
        }
        debug!(files = files.len(), documents = documents.len(), "loaded markdown files");
        Ok(documents)
    }
}
