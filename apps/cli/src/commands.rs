//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use mdreader_markdown::MarkdownFileLoader;
use mdreader_shared::{
    AppConfig, Document, MdReaderError, Metadata, ReaderConfig, init_config, load_config,
    load_config_from, write_default_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mdreader — turn Markdown files into documents for indexing.
#[derive(Parser)]
#[command(
    name = "mdreader",
    version,
    about = "Load Markdown files as documents, split by header or whole-file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.mdreader/mdreader.toml.
    #[arg(long, global = true, env = "MDREADER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load Markdown files and print the documents as JSON.
    Load {
        /// Markdown files to load.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Return each file as one document instead of one per header section.
        #[arg(long, overrides_with = "split")]
        single_doc: bool,

        /// Split each file by header sections.
        #[arg(long, overrides_with = "single_doc")]
        split: bool,

        /// Keep `[text](url)` links intact.
        #[arg(long, overrides_with = "remove_hyperlinks")]
        keep_hyperlinks: bool,

        /// Replace `[text](url)` links with their text.
        #[arg(long, overrides_with = "keep_hyperlinks")]
        remove_hyperlinks: bool,

        /// Keep `![[...]]` image embeds intact.
        #[arg(long, overrides_with = "remove_images")]
        keep_images: bool,

        /// Drop `![[...]]` image embeds.
        #[arg(long, overrides_with = "keep_images")]
        remove_images: bool,

        /// Metadata attached to every document, as key=value (repeatable).
        #[arg(short, long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mdreader=info",
        1 => "mdreader=debug",
        _ => "mdreader=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
///
/// The config file is only parsed by commands that read it, so `config init`
/// still works when the existing file is malformed.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;

    match cli.command {
        Command::Load {
            files,
            single_doc,
            split,
            keep_hyperlinks,
            remove_hyperlinks,
            keep_images,
            remove_images,
            meta,
            pretty,
        } => {
            let config = resolve_config(config_path.as_deref())?;
            let overrides = ReaderOverrides {
                read_as_single_doc: flag_pair(single_doc, split),
                remove_hyperlinks: flag_pair(remove_hyperlinks, keep_hyperlinks),
                remove_images: flag_pair(remove_images, keep_images),
            };
            let reader = overrides.apply(&config.reader);
            let extra_info = parse_metadata(&meta)?;
            cmd_load(files, &reader, extra_info, pretty).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path.as_deref()).await,
            ConfigAction::Show => {
                let config = resolve_config(config_path.as_deref())?;
                cmd_config_show(&config).await
            }
        },
    }
}

/// Load the config from `--config` if given, else from the default location.
fn resolve_config(path: Option<&Path>) -> mdreader_shared::Result<AppConfig> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    }
}

/// Collapse an on/off flag pair into an override. Clap keeps only the last
/// flag of each pair, so at most one side is set.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

/// Reader settings given on the command line. `None` keeps the config value.
#[derive(Debug, Clone, Copy, Default)]
struct ReaderOverrides {
    read_as_single_doc: Option<bool>,
    remove_hyperlinks: Option<bool>,
    remove_images: Option<bool>,
}

impl ReaderOverrides {
    /// Merge these overrides over the config file's `[reader]` section.
    fn apply(&self, base: &ReaderConfig) -> ReaderConfig {
        ReaderConfig {
            read_as_single_doc: self.read_as_single_doc.unwrap_or(base.read_as_single_doc),
            remove_hyperlinks: self.remove_hyperlinks.unwrap_or(base.remove_hyperlinks),
            remove_images: self.remove_images.unwrap_or(base.remove_images),
        }
    }
}

/// Parse `key=value` pairs into document metadata.
///
/// Values that parse as JSON (numbers, booleans, arrays) keep their type;
/// anything else is stored as a string.
fn parse_metadata(pairs: &[String]) -> mdreader_shared::Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| MdReaderError::invalid_metadata(format!("expected key=value, got `{pair}`")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(MdReaderError::invalid_metadata(format!("empty key in `{pair}`")));
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        metadata.insert(key.to_string(), value);
    }
    Ok(metadata)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_load(
    files: Vec<PathBuf>,
    reader: &ReaderConfig,
    extra_info: Metadata,
    pretty: bool,
) -> Result<()> {
    info!(
        files = files.len(),
        single_doc = reader.read_as_single_doc,
        remove_hyperlinks = reader.remove_hyperlinks,
        remove_images = reader.remove_images,
        "loading markdown files"
    );

    let loader = Arc::new(MarkdownFileLoader::from_config(reader));
    let documents = load_documents(loader, files, extra_info).await?;

    info!(documents = documents.len(), "loaded documents");

    let json = if pretty {
        serde_json::to_string_pretty(&documents)?
    } else {
        serde_json::to_string(&documents)?
    };
    println!("{json}");

    Ok(())
}

/// Load `files` concurrently, one blocking task per file.
///
/// Documents come back in input order; the first file that fails (in input
/// order) aborts the whole load.
async fn load_documents(
    loader: Arc<MarkdownFileLoader>,
    files: Vec<PathBuf>,
    extra_info: Metadata,
) -> Result<Vec<Document>> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let loader = Arc::clone(&loader);
            let extra_info = extra_info.clone();
            tokio::task::spawn_blocking(move || loader.load(&path, Some(extra_info), None))
        })
        .collect();

    let mut documents: Vec<Document> = Vec::new();
    for handle in handles {
        let docs = handle
            .await
            .map_err(|e| eyre!("loader task failed: {e}"))??;
        documents.extend(docs);
    }
    Ok(documents)
}

async fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => {
            write_default_config(p)?;
            p.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn parse_load_command() {
        let cli = Cli::try_parse_from([
            "mdreader",
            "load",
            "a.md",
            "b.md",
            "--single-doc",
            "--meta",
            "source=test",
        ])
        .expect("parse args");

        match cli.command {
            Command::Load {
                files,
                single_doc,
                meta,
                ..
            } => {
                assert_eq!(files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
                assert!(single_doc);
                assert_eq!(meta, vec!["source=test".to_string()]);
            }
            Command::Config { .. } => panic!("expected load command"),
        }
    }

    #[test]
    fn load_requires_files() {
        assert!(Cli::try_parse_from(["mdreader", "load"]).is_err());
    }

    fn load_overrides(args: &[&str]) -> ReaderOverrides {
        let argv = ["mdreader", "load", "a.md"].into_iter().chain(args.iter().copied());
        match Cli::try_parse_from(argv).expect("parse args").command {
            Command::Load {
                single_doc,
                split,
                keep_hyperlinks,
                remove_hyperlinks,
                keep_images,
                remove_images,
                ..
            } => ReaderOverrides {
                read_as_single_doc: flag_pair(single_doc, split),
                remove_hyperlinks: flag_pair(remove_hyperlinks, keep_hyperlinks),
                remove_images: flag_pair(remove_images, keep_images),
            },
            Command::Config { .. } => panic!("expected load command"),
        }
    }

    #[test]
    fn flags_disable_config_defaults() {
        let merged = load_overrides(&["--single-doc", "--keep-hyperlinks"])
            .apply(&ReaderConfig::default());
        assert!(merged.read_as_single_doc);
        assert!(!merged.remove_hyperlinks);
        assert!(merged.remove_images);
    }

    #[test]
    fn flags_reenable_what_config_turned_off() {
        let base = ReaderConfig {
            read_as_single_doc: true,
            remove_hyperlinks: false,
            remove_images: false,
        };
        let merged = load_overrides(&["--split", "--remove-hyperlinks", "--remove-images"])
            .apply(&base);
        assert!(!merged.read_as_single_doc);
        assert!(merged.remove_hyperlinks);
        assert!(merged.remove_images);
    }

    #[test]
    fn last_flag_of_a_pair_wins() {
        let overrides = load_overrides(&["--single-doc", "--split", "--keep-images", "--remove-images"]);
        assert_eq!(overrides.read_as_single_doc, Some(false));
        assert_eq!(overrides.remove_images, Some(true));
        assert_eq!(overrides.remove_hyperlinks, None);
    }

    #[test]
    fn no_flags_keep_config() {
        let base = ReaderConfig {
            read_as_single_doc: true,
            remove_hyperlinks: false,
            remove_images: true,
        };
        assert_eq!(load_overrides(&[]).apply(&base), base);
    }

    #[test]
    fn metadata_values_keep_json_types() {
        let pairs = vec![
            "source=test".to_string(),
            "page=3".to_string(),
            "draft=false".to_string(),
            "title=a=b".to_string(),
        ];
        let meta = parse_metadata(&pairs).expect("parse metadata");

        assert_eq!(meta["source"], serde_json::json!("test"));
        assert_eq!(meta["page"], serde_json::json!(3));
        assert_eq!(meta["draft"], serde_json::json!(false));
        assert_eq!(meta["title"], serde_json::json!("a=b"));
    }

    #[test]
    fn metadata_rejects_malformed_pairs() {
        let err = parse_metadata(&["source".to_string()]).unwrap_err();
        assert!(matches!(err, MdReaderError::InvalidMetadata { .. }));

        let err = parse_metadata(&["=value".to_string()]).unwrap_err();
        assert!(err.to_string().contains("empty key"));
    }

    // --- config init ---

    #[tokio::test]
    async fn config_init_repairs_malformed_file() {
        let dir = std::env::temp_dir().join(format!("mdreader_cli_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("mdreader.toml");
        std::fs::write(&path, "[reader]\nremove_images = \"yes\"\n").expect("write");

        let path_arg = path.to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["mdreader", "--config", &path_arg, "config", "init"])
            .expect("parse args");
        run(cli).await.expect("config init over malformed file");

        let repaired = load_config_from(&path).expect("load repaired config");
        assert_eq!(repaired.reader, ReaderConfig::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn config_show_reports_malformed_file() {
        let dir = std::env::temp_dir().join(format!("mdreader_cli_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("mdreader.toml");
        std::fs::write(&path, "[reader\n").expect("write");

        let path_arg = path.to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["mdreader", "--config", &path_arg, "config", "show"])
            .expect("parse args");
        assert!(run(cli).await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    // --- concurrent load ---

    fn temp_markdown(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write temp markdown");
        path
    }

    fn single_doc_loader() -> Arc<MarkdownFileLoader> {
        Arc::new(MarkdownFileLoader::from_config(&ReaderConfig {
            read_as_single_doc: true,
            ..ReaderConfig::default()
        }))
    }

    #[tokio::test]
    async fn load_documents_keeps_input_order() {
        let dir = std::env::temp_dir().join(format!("mdreader_cli_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let first = temp_markdown(&dir, "first.md", "# First\none");
        let second = temp_markdown(&dir, "second.md", "# Second\ntwo");

        let extra = parse_metadata(&["source=test".to_string()]).expect("metadata");
        let docs = load_documents(single_doc_loader(), vec![second.clone(), first.clone()], extra.clone())
            .await
            .expect("load documents");

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second.to_string_lossy());
        assert_eq!(docs[0].text, "# Second\ntwo");
        assert_eq!(docs[1].id, first.to_string_lossy());
        assert!(docs.iter().all(|d| d.metadata == extra));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn load_documents_fails_on_missing_file() {
        let dir = std::env::temp_dir().join(format!("mdreader_cli_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let a = temp_markdown(&dir, "a.md", "alpha");
        let b = temp_markdown(&dir, "b.md", "beta");
        let missing = dir.join("missing.md");

        let err = load_documents(single_doc_loader(), vec![a, b, missing], Metadata::new())
            .await
            .unwrap_err();

        let err = err.downcast_ref::<MdReaderError>().expect("reader error");
        assert!(matches!(err, MdReaderError::FileAccess { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
