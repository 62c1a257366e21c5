//! Stacklens CLI entrypoint.
//!
//! This is the main entrypoint for the stacklens command-line tool.

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use stacklens::cli::{Cli, Commands, DemoCommands, DescribeCommands};
use stacklens::config::{ConfigLoader, NameFormat, OutputFormat, Settings};
use stacklens::demo::demo_views;
use stacklens::error::{Result, StacklensError};
use stacklens::pipeline::{describe_stack, summarize_plan};
use stacklens::render::{JsonRenderer, TableOptions, TableRenderer, ViewRenderer};
use stacklens::stack::{CloudFormationStackClient, StackInspector};
use stacklens::terraform::{PlanSession, TerraformRunner};

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    init_logging(settings.verbose);

    // Single-threaded: every step waits on the previous one
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command, settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads file, `.env` and environment settings, then applies flags.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let loader = ConfigLoader::new();
    loader.load_dotenv()?;
    let mut settings = loader.load(cli.config.as_deref())?;
    cli.apply_to(&mut settings);
    Ok(settings)
}

/// Initializes the logging system on stderr; `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs a command until it finishes or the process is interrupted.
///
/// Dropping the command future on interrupt releases the plan workspace
/// and kills a running planner.
async fn run(command: Commands, settings: Settings) -> Result<()> {
    tokio::select! {
        result = dispatch(command, &settings) => result,
        () = interrupted() => {
            warn!("Interrupted, aborting");
            Err(StacklensError::Interrupted)
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Describe {
            command: DescribeCommands::Stack { stack_name },
        } => cmd_describe_stack(&stack_name, settings).await,
        Commands::Terraform { workdir } => cmd_terraform(&workdir, settings).await,
        Commands::Demo {
            command: DemoCommands::Tables,
        } => cmd_demo_tables(settings),
    }
}

/// Describe a deployed stack.
async fn cmd_describe_stack(stack_name: &str, settings: &Settings) -> Result<()> {
    info!("Describing stack {stack_name}");
    if settings.output != OutputFormat::Table {
        debug!("describe stack always renders tables");
    }

    let client = CloudFormationStackClient::new(
        settings.aws.region.as_deref(),
        settings.aws.profile.as_deref(),
    )
    .await;
    let inspector = StackInspector::new(client);

    describe_stack(&inspector, stack_name, table_renderer(settings)).await?;
    Ok(())
}

/// Plan a Terraform configuration and summarize it.
async fn cmd_terraform(workdir: &Path, settings: &Settings) -> Result<()> {
    let artifact = NameFormat::new(settings.changeset.name_format.as_str())?.render(Utc::now())?;
    let session = PlanSession::create(&artifact)?;
    let runner = TerraformRunner::new(settings.terraform.binary.as_str());

    let outcome = match settings.output {
        OutputFormat::Table => {
            summarize_plan(&runner, &session, workdir, settings.verbose, table_renderer(settings))
                .await
                .map(drop)
        }
        OutputFormat::Json => {
            summarize_plan(&runner, &session, workdir, settings.verbose, json_renderer())
                .await
                .map(drop)
        }
    };

    let closed = session.close();
    outcome?;
    closed
}

/// Render canned tables.
fn cmd_demo_tables(settings: &Settings) -> Result<()> {
    let views = demo_views(settings.verbose);
    match settings.output {
        OutputFormat::Table => emit(table_renderer(settings), views),
        OutputFormat::Json => emit(json_renderer(), views),
    }
}

fn emit<R: ViewRenderer>(mut renderer: R, views: Vec<stacklens::View>) -> Result<()> {
    for view in views {
        renderer.append(view);
    }
    renderer.flush().map(drop)
}

fn table_renderer(settings: &Settings) -> TableRenderer<std::io::Stdout> {
    let stdout = std::io::stdout();
    let decorate = stdout.is_terminal();
    TableRenderer::new(stdout, TableOptions::from_settings(&settings.table, decorate))
}

fn json_renderer() -> JsonRenderer<std::io::Stdout> {
    JsonRenderer::new(std::io::stdout())
}
