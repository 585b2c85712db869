mod clients;
mod commands;
mod core;
mod engine;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use commands::{CreateAdvisoryArgs, CreateAdvisoryRequest, FindBuildsRequest};
use crate::core::config::RailConfig;
use crate::core::context::RunContext;
use crate::core::error::{RailError, RailResult, print_error};
use clients::Impetus;
use engine::model::BuildKind;
use std::path::PathBuf;

/// Find shippable builds and attach them to release advisories
#[derive(Parser)]
#[command(name = "advisory-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Configuration file (default: search advisory-rail.toml from the current directory)
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Enable debug logging (RUST_LOG overrides)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Find builds that can ship and optionally attach them to an advisory
  FindBuilds {
    /// Kind of build to look for
    #[arg(long, value_enum)]
    kind: BuildKind,
    /// Use these NVRs or build ids instead of searching tags (repeatable)
    #[arg(long = "build", value_name = "NVR_OR_ID")]
    builds: Vec<String>,
    /// Attach the viable builds to this advisory (default: dry run)
    #[arg(long, value_name = "ADVISORY")]
    attach: Option<u64>,
    /// Concurrent lookups (default: one per CPU)
    #[arg(long)]
    workers: Option<usize>,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Draft, or with --yes create, the next advisory for the group
  CreateAdvisory {
    /// Kind of advisory
    #[arg(long, value_enum)]
    kind: BuildKind,
    /// Reason for the advisory
    #[arg(long, value_enum, default_value = "standard")]
    impetus: Impetus,
    /// Release date, YYYY-MM-DD (default: computed from the latest advisory)
    #[arg(long)]
    date: Option<String>,
    /// QA contact email
    #[arg(long)]
    assigned_to: String,
    /// Manager email
    #[arg(long)]
    manager: String,
    /// Package owner email
    #[arg(long)]
    package_owner: String,
    /// Actually create the advisory (default: print the draft)
    #[arg(long)]
    yes: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the release date that follows a previous one
  ReleaseDate {
    /// Previous release date, YYYY-MM-DD
    previous: String,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  ui::logging::init_tracing(cli.verbose);

  if let Err(err) = run(cli) {
    handle_error(err);
  }
}

fn run(cli: Cli) -> RailResult<()> {
  match cli.command {
    Commands::ReleaseDate { previous, json } => commands::run_release_date(&previous, json),

    Commands::FindBuilds {
      kind,
      builds,
      attach,
      workers,
      json,
    } => {
      let request = FindBuildsRequest::from_args(kind, builds, attach, workers, json)?;
      let ctx = load_context(cli.config)?;
      commands::run_find_builds(&ctx, request)
    }

    Commands::CreateAdvisory {
      kind,
      impetus,
      date,
      assigned_to,
      manager,
      package_owner,
      yes,
      json,
    } => {
      let request = CreateAdvisoryRequest::from_args(CreateAdvisoryArgs {
        kind,
        impetus,
        date,
        assigned_to,
        manager,
        package_owner,
        yes,
        json,
      })?;
      let ctx = load_context(cli.config)?;
      commands::run_create_advisory(&ctx, request)
    }
  }
}

/// Load configuration and build the service clients for this invocation
fn load_context(explicit: Option<PathBuf>) -> RailResult<RunContext> {
  let cwd = std::env::current_dir()?;
  let config = RailConfig::load(explicit.as_deref(), &cwd)?;
  RunContext::build(config)
}

fn handle_error(err: RailError) -> ! {
  if let RailError::Remote(remote) = &err {
    tracing::debug!(service = %remote.service(), retryable = remote.is_retryable(), "remote call failed");
  }
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
