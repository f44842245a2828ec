//! CLI command definitions, routing, and tracing setup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use scrapeapi_extract::evaluate_document;
use scrapeapi_fetch::{Fetcher, resolve_source};
use scrapeapi_server::validate_config;
use scrapeapi_shared::{AppConfig, DEFAULT_CONFIG_FILE, init_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// scrapeapi — turn web pages into JSON endpoints with CSS selector schemas.
#[derive(Parser)]
#[command(
    name = "scrapeapi",
    version,
    about = "Serve declarative CSS selector schemas as JSON endpoints.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file.
    #[arg(long, env = "SCRAPEAPI_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

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
    /// Start the HTTP server.
    Serve {
        /// Interface to bind (overrides `server.host`).
        #[arg(long, env = "SCRAPEAPI_HOST")]
        host: Option<String>,

        /// Port to bind (overrides `server.port`).
        #[arg(short, long, env = "SCRAPEAPI_PORT")]
        port: Option<u16>,
    },

    /// Validate the config and list its endpoints.
    Check,

    /// Run one endpoint once and print the JSON record.
    Extract {
        /// Endpoint path, e.g. `/wiki`.
        path: String,

        /// Query variable as `name=value` (repeatable).
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
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
    /// Write a sample config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

fn parse_var(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "scrapeapi=info,tower_http=warn",
        1 => "scrapeapi=debug,tower_http=debug",
        _ => "scrapeapi=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port } => cmd_serve(&cli.config, host, port).await,
        Command::Check => cmd_check(&cli.config),
        Command::Extract {
            path,
            vars,
            compact,
        } => cmd_extract(&cli.config, &path, vars, compact).await,
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(&cli.config, force),
            ConfigAction::Show => cmd_config_show(&cli.config),
        },
    }
}

/// Load and validate the config; every command that serves or extracts goes through here.
fn load_validated(path: &Path) -> Result<AppConfig> {
    let config = load_config_from(path)?;
    validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_validated(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let addr = tokio::net::lookup_host((config.server.host.as_str(), config.server.port))
        .await
        .map_err(|e| eyre!("cannot resolve {}: {e}", config.server.host))?
        .next()
        .ok_or_else(|| eyre!("no address found for {}", config.server.host))?;

    let fetcher = Fetcher::new(&config.fetch)?;

    info!(
        config = %config_path.display(),
        endpoints = config.endpoints.len(),
        "starting server"
    );

    scrapeapi_server::serve(Arc::new(config), Arc::new(fetcher), addr).await?;
    Ok(())
}

fn cmd_check(config_path: &Path) -> Result<()> {
    let config = load_config_from(config_path)?;
    let warnings = validate_config(&config)?;

    println!("  Config: {}", config_path.display());
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!();
    for endpoint in &config.endpoints {
        let vars = if endpoint.variables.is_empty() {
            String::new()
        } else {
            format!(" ?{}", endpoint.variables.join("&"))
        };
        println!("  GET {}{vars}", endpoint.path);
        println!("      source: {}", endpoint.source);
        println!("      fields: {}", endpoint.fields.len());
    }

    if warnings.is_empty() {
        println!();
        println!("  OK: {} endpoint(s), no warnings", config.endpoints.len());
    } else {
        println!();
        println!("  {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("    - {warning}");
        }
    }

    Ok(())
}

async fn cmd_extract(
    config_path: &Path,
    path: &str,
    vars: Vec<(String, String)>,
    compact: bool,
) -> Result<()> {
    let config = load_validated(config_path)?;
    let endpoint = config
        .endpoint(path)
        .ok_or_else(|| eyre!("no endpoint with path `{path}` in {}", config_path.display()))?;

    let query: HashMap<String, String> = vars.into_iter().collect();
    let source = resolve_source(&endpoint.source, &endpoint.variables, &query);

    let fetcher = Fetcher::new(&config.fetch)?;
    let body = fetcher.fetch(&source).await?;
    let record = evaluate_document(&body, &source, &endpoint.fields, config.extraction)?;

    let json = if compact {
        serde_json::to_string(&record)?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_config_init(config_path: &Path, force: bool) -> Result<()> {
    init_config(config_path, force)?;
    println!("  Config written to {}", config_path.display());
    Ok(())
}

fn cmd_config_show(config_path: &Path) -> Result<()> {
    let config = load_config_from(config_path)?;
    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    Ok(())
}
