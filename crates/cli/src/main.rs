//! gitnewcomers command-line tool.
//!
//! Provides subcommands for finding each contributor's first commit in a
//! `git log` export, consolidating author spellings into a roster, resolving
//! individual author lines, counting monthly active contributors, and
//! generating / validating configuration files.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use gitnewcomers_core::config::AppConfig;
use gitnewcomers_core::history::{monthly_active, newcomers, newcomers_csv, roster_lines, GitLog};
use gitnewcomers_core::identity::AliasResolver;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// gitnewcomers command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "gitnewcomers",
    version,
    about = "Find all contributors to a git repository and the date of their first commit"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Name-mapping feed (overrides `identity.names_feed`).
    #[arg(long, global = true)]
    names: Option<PathBuf>,

    /// Curated author list (overrides `identity.author_list`).
    #[arg(long, global = true)]
    authors: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write every contributor with the date of their first commit.
    Newcomers {
        /// `git log` export to scan ("-" for stdin).
        gitlog: PathBuf,

        /// Output CSV (`author;date`).
        output: PathBuf,

        /// Also write the sorted list of all contributors to this file.
        known: Option<PathBuf>,

        /// Merge author spellings found in the log itself before counting.
        #[arg(long)]
        consolidate: bool,
    },

    /// Group the author spellings of a log into one line per person.
    Consolidate {
        /// `git log` export to scan ("-" for stdin).
        gitlog: PathBuf,

        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = RosterFormat::Lines)]
        format: RosterFormat,
    },

    /// Print the canonical name(s) for raw author lines.
    Resolve {
        /// Raw author lines, e.g. "Jane Doe <jane@example.com>".
        #[arg(required = true)]
        raw: Vec<String>,
    },

    /// Count distinct active contributors per month.
    Activity {
        /// `git log` export to scan ("-" for stdin).
        gitlog: PathBuf,

        /// Merge author spellings found in the log itself before counting.
        #[arg(long)]
        consolidate: bool,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./gitnewcomers.toml")]
        output: PathBuf,
    },

    /// Validate the configuration file given with --config.
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RosterFormat {
    /// One person per line, aliases joined by `;`.
    Lines,
    /// JSON array of alias arrays.
    Json,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Start logging before the config file is read so its loading is
    // visible with --log-level; the file's own level applies afterwards.
    let filter = init_tracing(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
    let config = load_config(&cli)?;
    if let Some(level) = configured_log_level(&cli, &config) {
        filter
            .reload(env_filter(level))
            .context("failed to apply configured log level")?;
    }

    match cli.command {
        Commands::Init { output } => cmd_init(&output),
        Commands::Validate => cmd_validate(cli.config.as_deref(), &config),
        Commands::Newcomers {
            gitlog,
            output,
            known,
            consolidate,
        } => cmd_newcomers(&config, &gitlog, &output, known.as_deref(), consolidate),
        Commands::Consolidate {
            gitlog,
            output,
            format,
        } => cmd_consolidate(&config, &gitlog, output.as_deref(), format),
        Commands::Resolve { raw } => cmd_resolve(&config, &raw),
        Commands::Activity {
            gitlog,
            consolidate,
        } => cmd_activity(&config, &gitlog, consolidate),
    }
}

const DEFAULT_LOG_LEVEL: &str = "warn";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

fn init_tracing(level: &str) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(env_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
    handle
}

/// The config file's log level, unless --log-level already decided it.
fn configured_log_level<'a>(cli: &Cli, config: &'a AppConfig) -> Option<&'a str> {
    match cli.log_level {
        Some(_) => None,
        None if config.general.log_level != DEFAULT_LOG_LEVEL => {
            Some(config.general.log_level.as_str())
        }
        None => None,
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// Load the config file if one was given, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            AppConfig::load_from_file(path).context("failed to load configuration file")?
        }
        None => AppConfig::default(),
    };
    if let Some(ref path) = cli.names {
        config.identity.names_feed = Some(path.clone());
    }
    if let Some(ref path) = cli.authors {
        config.identity.author_list = Some(path.clone());
    }
    Ok(config)
}

fn build_resolver(config: &AppConfig) -> Result<AliasResolver> {
    config
        .validate()
        .context("configuration validation failed")?;
    AliasResolver::from_config(config).context("failed to initialize alias resolver")
}

fn read_log(path: &Path) -> Result<GitLog> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read git log from stdin")?;
        return GitLog::parse(&text).context("failed to parse git log from stdin");
    }
    GitLog::load(path).with_context(|| format!("failed to read git log {}", path.display()))
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{}", contents);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_newcomers(
    config: &AppConfig,
    gitlog: &Path,
    output: &Path,
    known: Option<&Path>,
    consolidate: bool,
) -> Result<()> {
    let mut resolver = build_resolver(config)?;
    let log = read_log(gitlog)?;
    if consolidate {
        resolver.absorb_authors(log.authors());
    }

    let found = newcomers(log.entries(), Some(&resolver));
    info!(commits = log.len(), contributors = found.len(), "newcomers collected");
    write_output(Some(output), &newcomers_csv(&found))?;

    if let Some(known) = known {
        let mut names: Vec<&str> = found.iter().map(|n| n.author.as_str()).collect();
        names.sort_unstable();
        let mut contents = names.join("\n");
        contents.push('\n');
        write_output(Some(known), &contents)?;
    }

    println!(
        "{} contributor(s) from {} commit(s) written to {}",
        found.len(),
        log.len(),
        output.display()
    );
    Ok(())
}

fn cmd_consolidate(
    config: &AppConfig,
    gitlog: &Path,
    output: Option<&Path>,
    format: RosterFormat,
) -> Result<()> {
    let resolver = build_resolver(config)?;
    let log = read_log(gitlog)?;
    let groups = resolver.consolidate(log.authors());
    debug!(groups = groups.len(), "roster built");

    let contents = match format {
        RosterFormat::Lines => {
            let mut contents = roster_lines(&groups).join("\n");
            contents.push('\n');
            contents
        }
        RosterFormat::Json => {
            let mut sorted: Vec<Vec<String>> = groups
                .into_iter()
                .map(|mut g| {
                    g.sort();
                    g
                })
                .collect();
            sorted.sort();
            let mut json =
                serde_json::to_string_pretty(&sorted).context("failed to serialize roster")?;
            json.push('\n');
            json
        }
    };

    write_output(output, &contents)
}

fn cmd_resolve(config: &AppConfig, raw: &[String]) -> Result<()> {
    let resolver = build_resolver(config)?;
    for line in raw {
        println!("{}\t{}", line, resolver.deanonymize(line).join("; "));
    }
    Ok(())
}

fn cmd_activity(config: &AppConfig, gitlog: &Path, consolidate: bool) -> Result<()> {
    let mut resolver = build_resolver(config)?;
    let log = read_log(gitlog)?;
    if consolidate {
        resolver.absorb_authors(log.authors());
    }

    let active = monthly_active(log.entries(), Some(&resolver));
    if active.is_empty() {
        println!("No commits found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Month", "Active contributors"]);
    for (month, count) in &active {
        table.add_row(vec![
            Cell::new(month),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
    Ok(())
}

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, AppConfig::default_toml()).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Point identity.names_feed / identity.author_list at your mapping files");
    println!(
        "  2. Validate with: gitnewcomers validate --config {}",
        output.display()
    );
    Ok(())
}

fn cmd_validate(config_path: Option<&Path>, config: &AppConfig) -> Result<()> {
    let Some(config_path) = config_path else {
        anyhow::bail!("no configuration file given; pass --config <FILE>");
    };
    println!("Validating configuration: {}", config_path.display());
    println!();
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => println!("  [OK] All values are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    let resolver = AliasResolver::from_config(config).context("failed to load mapping files")?;
    println!("  [OK] Mapping files load");

    println!();
    println!("Configuration summary:");
    println!(
        "  Names feed    : {}",
        display_path(config.identity.names_feed.as_deref())
    );
    println!(
        "  Author list   : {}",
        display_path(config.identity.author_list.as_deref())
    );
    println!("  Known people  : {}", resolver.index().len());
    println!("  Min name len  : {}", config.common_names.min_len);
    println!("  Extra common  : {}", config.common_names.extra.len());
    println!();
    println!("Configuration is valid.");
    Ok(())
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "not set".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_newcomers() {
        let cli = Cli::try_parse_from([
            "gitnewcomers",
            "--names",
            "names.csv",
            "newcomers",
            "git.log",
            "out.csv",
            "known.txt",
            "--consolidate",
        ])
        .unwrap();
        assert_eq!(cli.names, Some(PathBuf::from("names.csv")));
        match cli.command {
            Commands::Newcomers {
                known, consolidate, ..
            } => {
                assert_eq!(known, Some(PathBuf::from("known.txt")));
                assert!(consolidate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides_config_paths() {
        let cli = Cli::try_parse_from([
            "gitnewcomers",
            "--authors",
            "authors.txt",
            "resolve",
            "Jane Doe",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(
            config.identity.author_list,
            Some(PathBuf::from("authors.txt"))
        );
        assert!(config.identity.names_feed.is_none());
    }

    #[test]
    fn test_config_log_level_applies_without_flag() {
        let mut config = AppConfig::default();
        config.general.log_level = "debug".into();

        let cli = Cli::try_parse_from(["gitnewcomers", "validate"]).unwrap();
        assert_eq!(configured_log_level(&cli, &config), Some("debug"));

        let cli =
            Cli::try_parse_from(["gitnewcomers", "--log-level", "info", "validate"]).unwrap();
        assert_eq!(configured_log_level(&cli, &config), None);

        let cli = Cli::try_parse_from(["gitnewcomers", "validate"]).unwrap();
        assert_eq!(configured_log_level(&cli, &AppConfig::default()), None);
    }

    #[test]
    fn test_consolidate_writes_sorted_roster() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("git.log");
        let out_path = dir.path().join("roster.txt");
        std::fs::write(
            &log_path,
            "commit 2\nAuthor: jdoe <jane@x.com>\nDate:   Fri Feb 2 10:00:00 2018 +0000\n\n\
             commit 1\nAuthor: Jane Doe <jane@x.com>\nDate:   Mon Jan 1 10:00:00 2018 +0000\n",
        )
        .unwrap();

        cmd_consolidate(
            &AppConfig::default(),
            &log_path,
            Some(&out_path),
            RosterFormat::Lines,
        )
        .unwrap();
        let roster = std::fs::read_to_string(&out_path).unwrap();
        assert_eq!(roster, "Jane Doe <jane@x.com>;jdoe <jane@x.com>\n");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gitnewcomers.toml");
        cmd_init(&path).unwrap();
        assert!(AppConfig::load_and_validate(&path).is_ok());
        assert!(cmd_init(&path).is_err());
    }
}
