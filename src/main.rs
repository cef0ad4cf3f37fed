use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchscore::cli::commands::{agents, config, history, init, missing, score};

#[derive(Parser)]
#[command(name = "pitchscore")]
#[command(version, about = "Multi-agent scoring for startup pitch documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize pitchscore in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing initialization")]
        force: bool,
    },

    /// Score a pitch document (UTF-8 text or Markdown)
    Score {
        #[arg(help = "Document to score")]
        file: PathBuf,
        #[arg(long, short, help = "Subject id (default: file name)")]
        subject: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long = "no-save", help = "Do not persist the report")]
        no_save: bool,
    },

    /// List sections a pitch never mentions (no model calls)
    Missing {
        #[arg(help = "Document to check")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Inspect and override agent configuration
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },

    /// Show recent scorings
    History {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Show the best score per subject
    Leaderboard {
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AgentsAction {
    /// List agents with their effective configuration and its source
    List,
    /// Show one agent's effective configuration and prompts
    Show {
        #[arg(help = "Agent id, e.g. team_analyzer")]
        id: String,
    },
    /// Persist an override for one agent
    Set {
        #[arg(help = "Agent id, e.g. team_analyzer")]
        id: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long, help = "File holding the system prompt")]
        system_prompt_file: Option<PathBuf>,
        #[arg(long, help = "File holding the analysis template ({text} placeholder)")]
        prompt_file: Option<PathBuf>,
        #[arg(long, help = "Store the override but keep it disabled")]
        inactive: bool,
    },
    /// Remove an agent's persisted override
    Reset {
        #[arg(help = "Agent id, e.g. team_analyzer")]
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Check gateway credentials and connectivity
    Check,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mpitchscore encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "pitchscore=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { force } => init::run(force)?,
        Commands::Score {
            file,
            subject,
            format,
            no_save,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(score::run(score::ScoreOptions {
                file,
                subject,
                format,
                save: !no_save,
            }))?;
        }
        Commands::Missing { file, format } => missing::run(&file, &format)?,
        Commands::Agents { action } => match action {
            AgentsAction::List => agents::list()?,
            AgentsAction::Show { id } => agents::show(&id)?,
            AgentsAction::Set {
                id,
                model,
                temperature,
                max_tokens,
                system_prompt_file,
                prompt_file,
                inactive,
            } => agents::set(
                &id,
                agents::AgentOverride {
                    model,
                    temperature,
                    max_tokens,
                    system_prompt_file,
                    prompt_file,
                    inactive,
                },
            )?,
            AgentsAction::Reset { id } => agents::reset(&id)?,
        },
        Commands::History { limit } => history::history(limit)?,
        Commands::Leaderboard { limit } => history::leaderboard(limit)?,
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => config::show(&format)?,
            ConfigAction::Path => config::path()?,
            ConfigAction::Check => Runtime::new()?.block_on(config::check())?,
        },
    }

    Ok(())
}
