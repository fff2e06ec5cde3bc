mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{OutputFormat, Settings};
use gitlanes_core::{CommitSource, GitSource, GraphSession, JsonSource, RefreshOutcome};
use graph::{BranchAttribution, GraphBuilder, GraphModel, SequenceStrategy, TextRenderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitlanes")]
#[command(version, about = "Lay out a repository's commit history as branch lanes", long_about = None)]
struct Cli {
    /// Config file (defaults to ./gitlanes.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out the history of a local repository
    Graph {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Maximum number of commits (1-2000)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only walk this branch
        #[arg(short, long)]
        branch: Option<String>,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Which commits a branch name is attached to
        #[arg(long, value_enum)]
        attribution: Option<AttributionArg>,
    },
    /// Lay out a JSON commit list
    Build {
        /// File holding a JSON array of commit records
        file: PathBuf,
        /// Maximum number of commits
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only keep commits listing this branch
        #[arg(short, long)]
        branch: Option<String>,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Show details of one commit
    Show {
        /// Commit SHA (or unambiguous prefix)
        sha: String,
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(clap::Args)]
struct LayoutArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    /// Commit ordering before lane assignment
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Chronological,
    Topological,
}

impl From<StrategyArg> for SequenceStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Chronological => SequenceStrategy::Chronological,
            StrategyArg::Topological => SequenceStrategy::Topological,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AttributionArg {
    Tips,
    Reachable,
}

impl From<AttributionArg> for BranchAttribution {
    fn from(arg: AttributionArg) -> Self {
        match arg {
            AttributionArg::Tips => BranchAttribution::Tips,
            AttributionArg::Reachable => BranchAttribution::Reachable,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Graph {
            path,
            limit,
            branch,
            layout,
            attribution,
        } => {
            if let Some(attribution) = attribution {
                settings.graph.attribution = attribution.into();
            }
            let source = GitSource::new(&path).attribution(settings.graph.attribution);
            run_layout(&source, &mut settings, limit, branch.as_deref(), &layout).await?;
        }
        Commands::Build {
            file,
            limit,
            branch,
            layout,
        } => {
            let source = JsonSource::new(&file);
            run_layout(&source, &mut settings, limit, branch.as_deref(), &layout).await?;
        }
        Commands::Show { sha, path } => {
            let detail = GitSource::new(&path)
                .fetch_commit(&sha)
                .await
                .with_context(|| format!("Failed to load commit {}", sha))?;

            println!("commit {}", detail.sha);
            if !detail.parents.is_empty() {
                println!("Parents: {}", detail.parents.join(" "));
            }
            println!("Author:  {} <{}>", detail.author.name, detail.author.email);
            if let Some(date) = detail.author.local_time() {
                println!("Date:    {}", date);
            }
            if detail.committer != detail.author {
                println!("Commit:  {} <{}>", detail.committer.name, detail.committer.email);
            }
            println!();
            for line in detail.full_message.lines() {
                println!("    {}", line);
            }
        }
    }

    Ok(())
}

async fn run_layout(
    source: &dyn CommitSource,
    settings: &mut Settings,
    limit: Option<usize>,
    branch: Option<&str>,
    layout: &LayoutArgs,
) -> Result<()> {
    if let Some(limit) = limit {
        settings.graph.limit = limit;
    }
    if let Some(strategy) = layout.strategy {
        settings.graph.strategy = strategy.into();
    }
    if let Some(format) = layout.format {
        settings.render.format = format;
    }

    let builder = GraphBuilder::new()
        .palette(settings.graph.palette.to_palette()?)
        .strategy(settings.graph.strategy);
    let session = GraphSession::new(builder);

    let model = match session.refresh(source, settings.graph.limit, branch).await {
        Ok(RefreshOutcome::Accepted(model)) => model,
        Ok(RefreshOutcome::Superseded) => bail!("graph request was superseded"),
        Err(err) => return Err(err).context("Failed to build commit graph"),
    };

    print_model(&model, settings)
}

fn print_model(model: &GraphModel, settings: &Settings) -> Result<()> {
    for warning in model.warnings() {
        tracing::warn!("{}", warning);
    }

    match settings.render.format {
        OutputFormat::Json => println!("{}", model.to_json()?),
        OutputFormat::Text => {
            let stats = model.stats();
            print!("{}", TextRenderer::new(settings.render.message_width).render(model));
            println!(
                "\n{} commits, {} lanes, {} merge edges, {} tagged",
                stats.total_commits, stats.total_lanes, stats.merge_edges, stats.tagged_commits
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_takes_sha_then_optional_path() {
        let cli = Cli::try_parse_from(["gitlanes", "show", "abc1234"]).unwrap();
        match cli.command {
            Commands::Show { sha, path } => {
                assert_eq!(sha, "abc1234");
                assert_eq!(path, PathBuf::from("."));
            }
            _ => panic!("expected show"),
        }

        let cli = Cli::try_parse_from(["gitlanes", "show", "abc1234", "/tmp/repo"]).unwrap();
        match cli.command {
            Commands::Show { path, .. } => assert_eq!(path, PathBuf::from("/tmp/repo")),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn layout_flags_parse() {
        let cli = Cli::try_parse_from([
            "gitlanes", "-q", "graph", "repo", "--limit", "20", "--strategy", "topological",
            "--attribution", "tips", "--format", "json",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Graph { path, limit, layout, attribution, .. } => {
                assert_eq!(path, PathBuf::from("repo"));
                assert_eq!(limit, Some(20));
                assert!(matches!(layout.strategy, Some(StrategyArg::Topological)));
                assert!(matches!(layout.format, Some(OutputFormat::Json)));
                assert!(matches!(attribution, Some(AttributionArg::Tips)));
            }
            _ => panic!("expected graph"),
        }
    }

    #[test]
    fn build_requires_a_file() {
        assert!(Cli::try_parse_from(["gitlanes", "build"]).is_err());
        assert!(Cli::try_parse_from(["gitlanes", "-v", "-q", "build", "x.json"]).is_err());
    }
}
