//! Markdown-to-document loading.
//!
//! Reads Markdown files and turns them into [`Document`]s for indexing, either
//! one document per header section ([`MarkdownReader`]) or one document per
//! file ([`MarkdownFileLoader`] in single-document mode).

pub mod cleanup;
mod loader;
mod reader;

pub use loader::MarkdownFileLoader;
pub use reader::{MarkdownReader, MarkdownSplitter, Section, read_markdown_file, split_by_headers};

pub use mdreader_shared::{Document, MdReaderError, Metadata, ReaderConfig, Result};
