mod prompt;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use ghpulse_core::{
    Credential, OutputFormat, ProgressObserver, PulseConfig, PulseError, RepoId, RepositoryInfo,
    SkippedItem,
};
use ghpulse_github::{GitHubClient, RemoteRepository};
use ghpulse_stats::pipeline::{run_pair_analysis, run_weekly_analysis};

use crate::prompt::{Analysis, Prompter};

const CONFIG_FILE: &str = ".ghpulse.toml";

/// Resolution of the progress bar; fractions are mapped onto `0..=PROGRESS_SCALE`.
const PROGRESS_SCALE: u64 = 1000;

#[derive(Parser)]
#[command(
    name = "ghpulse",
    version,
    about = "Contributor pairing and weekly activity for GitHub repositories",
    long_about = "ghpulse reads a GitHub repository's commits, pull requests, and review\n\
                   comments and reports who works together and who did what this week.\n\n\
                   Run without a subcommand for an interactive session.\n\n\
                   Examples:\n  \
                     ghpulse                                   Interactive session\n  \
                     ghpulse pairs --repo rust-lang/cargo      Top contributor pairs\n  \
                     ghpulse weekly --repo rust-lang/cargo     Last week's contributions\n  \
                     ghpulse init                              Create a .ghpulse.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .ghpulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for analysis results.\n\n\
                       Formats:\n  \
                         text      Human-readable lines (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rank pairs of contributors that modified the same files
    #[command(long_about = "Rank pairs of contributors that modified the same files.\n\n\
        Walks every commit on the default branch, records which contributors touched\n\
        which files, and counts the files each pair has in common.\n\n\
        Examples:\n  ghpulse pairs --repo octocat/hello-world\n  ghpulse pairs --repo octocat/hello-world --limit 20 --format json")]
    Pairs {
        /// Repository (format: owner/name)
        #[arg(long)]
        repo: RepoId,

        /// Number of pairs to show (default: analysis.top_pairs, 10)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report each contributor's activity over the last week
    #[command(long_about = "Report each contributor's activity over the last week.\n\n\
        For every contributor: lines added, commits, pull requests opened, and the\n\
        longest review comment on those pull requests.\n\n\
        Examples:\n  ghpulse weekly --repo octocat/hello-world\n  ghpulse weekly --repo octocat/hello-world --days 14")]
    Weekly {
        /// Repository (format: owner/name)
        #[arg(long)]
        repo: RepoId,

        /// Window length in days (default: analysis.window_days, 7)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Create a default .ghpulse.toml configuration file
    #[command(long_about = "Create a default .ghpulse.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .ghpulse.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# ghpulse configuration

[github]
# api_url = "https://api.github.com"
# Environment variable holding the access token; GH_TOKEN is tried as a fallback
# token_env = "GITHUB_TOKEN"
# per_page = 100

[analysis]
# Number of contributor pairs to show
# top_pairs = 10
# window_days = 7
# Concurrent commit lookups
# concurrency = 8
"#;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,ghpulse=debug,ghpulse_core=debug,ghpulse_github=debug,ghpulse_stats=debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PulseConfig> {
    let config = match path {
        Some(path) => PulseConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                PulseConfig::from_file(default_path)?
            } else {
                PulseConfig::default()
            }
        }
    };
    Ok(config)
}

fn connect(config: &PulseConfig) -> Result<GitHubClient> {
    let credential = Credential::from_env(&config.github.token_env)?;
    Ok(GitHubClient::new(&credential, &config.github)?)
}

/// A bar on stderr, only when stderr is a terminal.
fn progress_bar(message: &'static str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new(PROGRESS_SCALE);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {percent}% ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

fn render_json<T: Serialize>(report: &T) -> std::result::Result<String, PulseError> {
    Ok(serde_json::to_string_pretty(report)? + "\n")
}

/// "Repository found" line, followed by the description when the repository has one.
fn repository_found(info: &RepositoryInfo) -> String {
    match info.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => {
            format!("Repository found: {}\n{description}", info.full_name)
        }
        _ => format!("Repository found: {}", info.full_name),
    }
}

fn report_skipped(skipped: &[SkippedItem]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!("Skipped {} item(s):", skipped.len());
    for item in skipped {
        eprintln!("  {item}");
    }
}

async fn analyze(
    analysis: Analysis,
    repo: &RemoteRepository,
    config: &PulseConfig,
    format: OutputFormat,
) -> Result<()> {
    let bar = progress_bar(match analysis {
        Analysis::Pairs => "Reading commits",
        Analysis::Weekly => "Analyzing contributors",
    });
    let observer = bar.clone().map(|pb| {
        move |fraction: f64| pb.set_position((fraction * PROGRESS_SCALE as f64).round() as u64)
    });
    let progress = observer.as_ref().map(|o| o as &dyn ProgressObserver);

    let (rendered, skipped) = match analysis {
        Analysis::Pairs => {
            let report = run_pair_analysis(repo, &config.analysis, progress).await;
            if let Some(pb) = &bar {
                pb.finish_and_clear();
            }
            let report = report?;
            let rendered = match format {
                OutputFormat::Json => render_json(&report)?,
                OutputFormat::Markdown => report.to_markdown(),
                OutputFormat::Text => report.to_string(),
            };
            (rendered, report.skipped)
        }
        Analysis::Weekly => {
            let report = run_weekly_analysis(repo, Utc::now(), &config.analysis, progress).await;
            if let Some(pb) = &bar {
                pb.finish_and_clear();
            }
            let report = report?;
            let rendered = match format {
                OutputFormat::Json => render_json(&report)?,
                OutputFormat::Markdown => report.to_markdown(),
                OutputFormat::Text => report.to_string(),
            };
            (rendered, report.skipped)
        }
    };

    print!("{rendered}");
    report_skipped(&skipped);
    Ok(())
}

async fn interactive(config: &PulseConfig, format: OutputFormat) -> Result<()> {
    let client = connect(config)?;

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    prompter.banner()?;
    let repo_id = prompter.repository()?;
    let repo = client.repository(&repo_id).await?;
    prompter.say(&repository_found(repo.info()))?;

    let analysis = prompter.menu()?;
    analyze(analysis, &repo, config, format).await
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, api_url = %config.github.api_url, "configuration loaded");

    match cli.command {
        None => interactive(&config, cli.format).await?,
        Some(Command::Pairs { ref repo, limit }) => {
            if let Some(limit) = limit {
                config.analysis.top_pairs = limit;
            }
            config.validate()?;
            let client = connect(&config)?;
            let repo = client.repository(repo).await?;
            if cli.verbose {
                eprintln!("{}", repository_found(repo.info()));
            }
            analyze(Analysis::Pairs, &repo, &config, cli.format).await?;
        }
        Some(Command::Weekly { ref repo, days }) => {
            if let Some(days) = days {
                config.analysis.window_days = days;
            }
            config.validate()?;
            let client = connect(&config)?;
            let repo = client.repository(repo).await?;
            if cli.verbose {
                eprintln!("{}", repository_found(repo.info()));
            }
            analyze(Analysis::Weekly, &repo, &config, cli.format).await?;
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ghpulse", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let config = PulseConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.analysis.top_pairs, 10);
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
    }

    #[test]
    fn pairs_subcommand_parses_repo_and_limit() {
        let cli = Cli::try_parse_from(["ghpulse", "pairs", "--repo", "octocat/hello", "--limit", "3"])
            .unwrap();
        match cli.command {
            Some(Command::Pairs { repo, limit }) => {
                assert_eq!(repo.to_string(), "octocat/hello");
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected pairs subcommand"),
        }
    }

    #[test]
    fn malformed_repo_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["ghpulse", "weekly", "--repo", "octocat"]).is_err());
    }

    #[test]
    fn repository_found_shows_description_when_set() {
        let mut info = RepositoryInfo {
            full_name: "octocat/hello-world".into(),
            description: Some("My first repository".into()),
        };
        assert_eq!(
            repository_found(&info),
            "Repository found: octocat/hello-world\nMy first repository"
        );

        info.description = Some("  ".into());
        assert_eq!(repository_found(&info), "Repository found: octocat/hello-world");
        info.description = None;
        assert_eq!(repository_found(&info), "Repository found: octocat/hello-world");
    }

    #[test]
    fn json_rendering_ends_with_newline() {
        let rendered = render_json(&serde_json::json!({ "commitsAnalyzed": 2 })).unwrap();
        assert!(rendered.ends_with("}\n"));
        assert!(rendered.contains("\"commitsAnalyzed\": 2"));
    }

    #[test]
    fn format_flag_is_global() {
        let cli = Cli::try_parse_from(["ghpulse", "weekly", "--repo", "a/b", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
