mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use waypost::config::Config;
use waypost::{ListQuery, PlatformClient};

#[derive(Parser, Debug)]
#[command(name = "waypost")]
#[command(about = "Query platform resources and plugin storage")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/waypost/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Increase log verbosity (-v, -vv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch one resource by type and id
  Get {
    kind: String,
    id: String,
    /// Related resources to embed
    #[arg(long)]
    include: Option<String>,
  },
  /// List resources with filters and paging
  List {
    #[arg(value_enum)]
    kind: ListKind,
    /// Filter as name=value (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
  },
  /// Run storage operations as one pipeline
  Storage {
    /// Installation to scope the operations to (overrides config)
    #[arg(long)]
    install_id: Option<String>,
    /// Operations: get:KEY, set:KEY=JSON, set-unique:KEY[=JSON], set-unique-num:KEY, unset:KEY
    #[arg(required = true)]
    ops: Vec<String>,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListKind {
  Employees,
  Invites,
}

fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
  s.split_once('=')
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let mut out = std::io::stdout().lock();
  serde_json::to_writer_pretty(&mut out, value)?;
  writeln!(out)?;
  Ok(())
}

async fn run(client: PlatformClient, command: Command) -> Result<()> {
  match command {
    Command::Get { kind, id, include } => {
      let resource = client.get_resource(&kind, &id, include.as_deref()).await?;
      print_json(&*resource)
    }
    Command::List {
      kind,
      filters,
      sort,
      page,
      per_page,
    } => {
      let query = ListQuery {
        filters,
        sort,
        page,
        per_page,
        include: None,
      };
      let collection = match kind {
        ListKind::Employees => client.get_employees(&query).await?,
        ListKind::Invites => client.get_invites(&query).await?,
      };
      print_json(&collection)
    }
    Command::Storage { install_id, ops } => {
      let pipeline = match install_id {
        Some(id) => client.storage_for(id),
        None => client.storage(),
      };
      let pipeline = ops.iter().try_fold(pipeline, |pipeline, op| {
        commands::parse_storage_op(op).map(|command| pipeline.add_command(command))
      })?;
      if pipeline.install_id().is_none() {
        tracing::warn!("no install id configured; storage runs unscoped");
      }

      let results = pipeline.execute().await?;
      print_json(&results)
    }
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = waypost::logging::init(args.verbose, args.log_file.as_deref())?;

  let config = Config::load(args.config.as_deref())?;
  let client = config
    .connect()
    .map_err(|e| eyre!("Failed to connect to {}: {}", config.api.url, e))?;

  run(client, args.command).await
}
