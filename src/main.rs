use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readmeforge::cli::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "readmeforge")]
#[command(version, about = "AI-driven README generator for code repositories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, short, help = "Only log errors")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a README.md for a repository
    Generate {
        #[arg(default_value = ".", help = "Path to the repository")]
        path: PathBuf,
        #[arg(long, help = "Remote repository URL (for badges and links)")]
        repo_url: Option<String>,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Override the provider API base URL")]
        api_base: Option<String>,
        #[arg(long, short, help = "Output directory for README.md")]
        output: Option<PathBuf>,
        #[arg(
            long = "dry-run",
            help = "Show configuration and file tree only, don't call the LLM"
        )]
        dry_run: bool,
    },

    /// Report repository quality signals (README, license, docs, examples, tests)
    Rank {
        #[arg(default_value = ".", help = "Path to the repository")]
        path: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize a configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
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
        eprintln!("\x1b[31mreadmeforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

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
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            path,
            repo_url,
            provider,
            model,
            api_base,
            output,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(readmeforge::cli::commands::generate::run(
                &path,
                GenerateOptions {
                    repo_url,
                    provider,
                    model,
                    api_base,
                    output,
                    dry_run,
                },
            ))?;
        }
        Commands::Rank { path, format } => {
            readmeforge::cli::commands::rank::run(&path, &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                readmeforge::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                readmeforge::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                readmeforge::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
