//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use mfnf_core::ArticleContentParser;
use mfnf_mediawiki::MediaWikiClient;
use mfnf_rewrite::Context;
use mfnf_shared::{AppConfig, Article, expand_home, init_config, load_config};
use mfnf_storage::{CacheStore, CachedService, MemoryStore, SqliteStore};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mfnf: convert wiki articles into semantic document trees.
#[derive(Parser)]
#[command(
    name = "mfnf",
    version,
    about = "Convert \"Mathe für Nicht-Freaks\" articles into semantic document trees.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Fetch articles from the wiki and print their document trees.
    Parse {
        /// Article titles.
        #[arg(required = true)]
        titles: Vec<String>,

        /// Write one `<slug>.json` per article into this directory instead
        /// of printing to stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not read or write the persistent cache.
        #[arg(long)]
        no_cache: bool,
    },

    /// Convert a local file of rendered article HTML.
    Html {
        /// Path to the HTML file.
        file: PathBuf,

        /// Article title (defaults to the file stem).
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Manage configuration.
    Config {
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mfnf=info",
        1 => "mfnf=debug",
        _ => "mfnf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr; stdout carries the JSON trees.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse {
            titles,
            out,
            no_cache,
        } => cmd_parse(&titles, out.as_deref(), no_cache),
        Command::Html { file, title } => cmd_html(&file, title.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

type Service = CachedService<MediaWikiClient, Box<dyn CacheStore>>;

/// HTTP client behind the memoizing cache. The cache is persistent unless it
/// is disabled in the config or on the command line.
fn build_service(config: &AppConfig, no_cache: bool) -> Result<Service> {
    let client = MediaWikiClient::new(&config.mediawiki)?;

    let store: Box<dyn CacheStore> = if config.cache.enabled && !no_cache {
        let path = expand_home(&config.cache.path)?;
        info!(path = %path.display(), "using persistent cache");
        Box::new(SqliteStore::open(&path)?)
    } else {
        Box::new(MemoryStore::new())
    };

    Ok(CachedService::new(client, store))
}

fn cmd_parse(titles: &[String], out: Option<&Path>, no_cache: bool) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config, no_cache)?;
    let parser = ArticleContentParser::new(&config.pipeline);

    if let Some(dir) = out {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("cannot create output directory {}", dir.display()))?;
    }

    let progress = CliProgress::new()?;
    let mut failed = 0usize;

    for (i, title) in titles.iter().enumerate() {
        progress.article(title, i + 1, titles.len());

        let article = match parser.load(&service, title) {
            Ok(article) => article,
            Err(e) => {
                failed += 1;
                progress.suspend(|| error!(title = %title, error = %e, "article failed"));
                continue;
            }
        };

        let json = serde_json::to_string_pretty(&article)?;
        match out {
            Some(dir) => {
                let path = dir.join(format!("{}.json", slug(title)));
                std::fs::write(&path, json)
                    .wrap_err_with(|| format!("cannot write {}", path.display()))?;
                info!(title = %title, path = %path.display(), "article written");
            }
            None => progress.suspend(|| println!("{json}")),
        }
    }

    progress.finish();

    let stats = service.stats();
    let entries = service.store().len()?;
    info!(hits = stats.hits, misses = stats.misses, entries, "cache statistics");

    if failed > 0 {
        return Err(eyre!("{failed} of {} articles failed", titles.len()));
    }
    Ok(())
}

fn cmd_html(file: &Path, title: Option<&str>) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("cannot read {}", file.display()))?;
    let title = match title {
        Some(t) => t.to_string(),
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| eyre!("cannot derive a title from {}", file.display()))?,
    };

    let config = load_config()?;
    // Nested content parameters still go through the wiki renderer.
    let service = build_service(&config, false)?;
    let parser = ArticleContentParser::new(&config.pipeline);

    let content = parser.parse_rendered(Context::new(&service, &title), &html)?;
    let article = Article { title, content };
    println!("{}", serde_json::to_string_pretty(&article)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// File name for an article title: `Mathe für Nicht-Freaks: Folgen` becomes
/// `mathe_für_nicht-freaks_folgen`.
fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' {
            slug.push(c);
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner on stderr while articles are converted.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Ok(Self { spinner })
    }

    fn article(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Converting [{current}/{total}] {title}"));
    }

    fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.spinner.suspend(f)
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}
