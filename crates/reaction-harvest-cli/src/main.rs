//! ReactionHarvest entry point.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use reaction_harvest_cli::app;
use reaction_harvest_cli::config::{load_config, resolve_config_path, OutputFormat, Overrides};

#[derive(Parser)]
#[command(
    name = "reaction-harvest",
    about = "ReactionHarvest: export every entry of a post's reactions list",
    version,
    after_help = "Run 'reaction-harvest <command> --help' for details on each command."
)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest the list once and write it out (default).
    Run(RunArgs),

    /// Print the effective configuration as JSON.
    Config(RunArgs),

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Page holding the list to harvest.
    url: Option<String>,

    /// Output file (defaults to reactions_<timestamp>.<ext>).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Wait after each scroll before measuring again, in milliseconds.
    #[arg(long)]
    stabilization_wait_ms: Option<u64>,

    /// Maximum scroll cycles before giving up on reaching the end.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Run the browser without a window.
    #[arg(long)]
    headless: bool,

    /// Persistent browser profile directory.
    #[arg(long)]
    profile_dir: Option<PathBuf>,

    /// Chromium binary to launch.
    #[arg(long)]
    chromium: Option<PathBuf>,

    /// How long to wait for sign-in, in seconds.
    #[arg(long)]
    auth_timeout: Option<u64>,
}

impl From<RunArgs> for Overrides {
    fn from(args: RunArgs) -> Self {
        Overrides {
            url: args.url,
            output: args.output,
            format: args.format,
            stabilization_wait_ms: args.stabilization_wait_ms,
            max_attempts: args.max_attempts,
            headless: args.headless,
            profile_dir: args.profile_dir,
            chromium: args.chromium,
            auth_timeout_secs: args.auth_timeout,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(cli.config.as_deref(), args).await,
        Commands::Config(args) => print_config(cli.config.as_deref(), args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "reaction-harvest", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}

fn effective_config(
    explicit: Option<&str>,
    args: RunArgs,
) -> anyhow::Result<reaction_harvest_cli::config::AppConfig> {
    let path = resolve_config_path(explicit);
    let mut config = load_config(path.as_deref())?;
    Overrides::from(args).apply(&mut config);
    Ok(config)
}

async fn run(explicit: Option<&str>, args: RunArgs) -> anyhow::Result<()> {
    let config = effective_config(explicit, args)?;
    let summary = app::run(config).await?;

    println!(
        "Harvested {} records -> {}",
        summary.records,
        summary.output.display()
    );
    if summary.field_misses.total() > 0 {
        println!(
            "  Empty fields: name {}, role {}, link {}, reaction {}",
            summary.field_misses.user_name,
            summary.field_misses.current_role,
            summary.field_misses.profile_link,
            summary.field_misses.reaction_type
        );
    }
    Ok(())
}

fn print_config(explicit: Option<&str>, args: RunArgs) -> anyhow::Result<()> {
    let config = effective_config(explicit, args)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
