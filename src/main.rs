use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shapedoc::OutputFormat;
use shapedoc::cli::ui::output::Output;
use shapedoc::cli::{CommandContext, GenerateArgs};

#[derive(Parser)]
#[command(name = "shapedoc")]
#[command(
    version,
    about = "Flattened, documented descriptions of Rust data types"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file merged over global and project config")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "SHAPEDOC_ROOT", help = "Project root (default: nearest Cargo.toml)")]
    root: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the document for a type
    Generate {
        #[arg(
            long = "type",
            short = 't',
            value_name = "TYPE",
            help = "Type path: crate::module::Type, crate::module.Type or Type"
        )]
        type_path: String,
        #[arg(long, short, help = "JSON rule plan to merge")]
        rules: Option<PathBuf>,
        #[arg(long = "exclude", short = 'x', help = "Exclude a property path and its subtree")]
        exclude: Vec<String>,
        #[arg(short = 'f', long, help = "Output format: json, yaml")]
        format: Option<OutputFormat>,
        #[arg(long, short, help = "Write to file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Compact JSON")]
        compact: bool,
    },

    /// List documented type declarations
    Symbols {
        #[arg(long, help = "Only modules whose path starts with this prefix")]
        filter: Option<String>,
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
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
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
    /// Write a project configuration file
    Init {
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
        eprintln!("\x1b[31mshapedoc encountered an unexpected error:\x1b[0m");
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
            Output::new().error(&format!("Error: {}", e));
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
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Generate {
            type_path,
            rules,
            exclude,
            format,
            output,
            compact,
        } => {
            let ctx = CommandContext::load(config_file, cli.root)?;
            shapedoc::cli::commands::generate::run(
                &ctx,
                GenerateArgs {
                    type_path,
                    rules,
                    exclude,
                    format,
                    output,
                    compact,
                },
            )?;
        }
        Commands::Symbols { filter, format } => {
            let ctx = CommandContext::load(config_file, cli.root)?;
            shapedoc::cli::commands::symbols::run(&ctx, filter.as_deref(), &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                shapedoc::cli::commands::config::show(global, &format, config_file)?;
            }
            ConfigAction::Path => {
                shapedoc::cli::commands::config::path()?;
            }
            ConfigAction::Init { force } => {
                shapedoc::cli::commands::config::init(force)?;
            }
        },
    }

    Ok(())
}
