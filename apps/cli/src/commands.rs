//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tokio::io::AsyncRead;
use tracing::info;

use tabxml_convert::{TableOptions, convert_table};
use tabxml_lineage::parents_to_lineage;
use tabxml_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Command-line entry for table conversion and lineage resolution.
#[derive(Parser)]
#[command(
    name = "tabxml",
    version,
    about = "Convert delimited tabular text to tagged markup and resolve identifier lineages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Convert a delimited table to tagged markup records.
    Convert {
        /// Field names in column order. Prefix a name with '*' to emit
        /// its values without markup escaping. Required unless --header
        /// is set.
        fields: Vec<String>,

        /// Column delimiter (defaults to the configured delimiter, tab
        /// out of the box).
        #[arg(short, long)]
        delim: Option<String>,

        /// Container tag wrapping the whole output ('-' or empty disables).
        #[arg(long, default_value = "")]
        set: String,

        /// Record tag wrapping each row ('-' or empty disables).
        #[arg(long, default_value = "")]
        rec: String,

        /// Number of leading lines to skip.
        #[arg(long)]
        skip: Option<usize>,

        /// Take field names from the first non-skipped line.
        #[arg(long)]
        header: bool,

        /// Lowercase values before emission.
        #[arg(long)]
        lower: bool,

        /// Uppercase values before emission (wins over --lower).
        #[arg(long)]
        upper: bool,

        /// Indent record and field elements.
        #[arg(long)]
        indent: bool,

        /// Drop fields whose value is the '-' placeholder.
        #[arg(long)]
        omit_placeholder: bool,

        /// Input file (reads stdin when omitted).
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Resolve full lineages from a tab-delimited identifier/parent table.
    Lineage {
        /// Input file (reads stdin when omitted).
        #[arg(short, long)]
        input: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tabxml=info",
        1 => "tabxml=debug",
        _ => "tabxml=trace",
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
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            fields,
            delim,
            set,
            rec,
            skip,
            header,
            lower,
            upper,
            indent,
            omit_placeholder,
            input,
        } => {
            let options = ConvertArgs {
                fields,
                delim,
                set,
                rec,
                skip,
                header,
                lower,
                upper,
                indent,
                omit_placeholder,
            };
            cmd_convert(options, input.as_deref()).await
        }
        Command::Lineage { input } => cmd_lineage(input.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

/// Raw `convert` flags before merging with the config file.
struct ConvertArgs {
    fields: Vec<String>,
    delim: Option<String>,
    set: String,
    rec: String,
    skip: Option<usize>,
    header: bool,
    lower: bool,
    upper: bool,
    indent: bool,
    omit_placeholder: bool,
}

impl ConvertArgs {
    /// Merge CLI flags over config-file defaults into library options.
    fn into_options(self, config: &AppConfig) -> TableOptions {
        TableOptions {
            delimiter: self
                .delim
                .unwrap_or_else(|| config.defaults.delimiter.clone()),
            set_tag: wrapper_tag(&self.set),
            rec_tag: wrapper_tag(&self.rec),
            skip: self.skip.unwrap_or(config.defaults.skip),
            header: self.header,
            lower: self.lower,
            upper: self.upper,
            indent: self.indent || config.defaults.indent,
            omit_placeholder: self.omit_placeholder,
            fields: self.fields,
        }
    }
}

/// Map the CLI tag convention ('-' or empty disables) to an option.
fn wrapper_tag(name: &str) -> Option<String> {
    match name {
        "" | "-" => None,
        tag => Some(tag.to_string()),
    }
}

async fn cmd_convert(args: ConvertArgs, input: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let options = args.into_options(&config);

    info!(
        delimiter = %options.delimiter.escape_debug(),
        header = options.header,
        fields = options.fields.len(),
        "starting table conversion"
    );

    let reader = open_input(input).await?;
    let mut rx = convert_table(reader, options)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while let Some(chunk) = rx.recv().await {
        out.write_all(chunk.as_bytes())?;
    }
    out.flush()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// lineage
// ---------------------------------------------------------------------------

async fn cmd_lineage(input: Option<&Path>) -> Result<()> {
    info!("starting lineage resolution");

    let reader = open_input(input).await?;
    let mut rx = parents_to_lineage(reader);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while let Some(line) = rx.recv().await {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

/// Open the input file, or fall back to stdin.
async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| eyre!("cannot open input file '{}': {e}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}
