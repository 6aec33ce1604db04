mod client;
mod output;
mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logsink_core::auth::CredentialStore;
use logsink_core::config::Config;
use logsink_core::filter::FilterSpec;
use logsink_core::time::{format_received_at, parse_duration_str, parse_time_or_relative};
use logsink_ingest::Ingestor;
use serde::Serialize;

use crate::client::QueryClient;
use crate::output::{print_query_human, print_status_human};
use crate::telemetry::{
    LogFormat, TelemetryConfig, init_cli_tracing, init_run_tracing, shutdown_tracing,
};

#[derive(Parser, Debug)]
#[command(name = "logsink")]
#[command(about = "Centralized log collection and query service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "Server address for client commands")]
    addr: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the ingest and query HTTP server")]
    Run {
        #[arg(long)]
        db_path: Option<PathBuf>,
        #[arg(long)]
        http_addr: Option<String>,
        #[arg(long = "token", help = "Producer token (repeatable)")]
        tokens: Vec<String>,
        #[arg(long, help = "Bound on each storage call, e.g. 5s")]
        request_timeout: Option<String>,
    },
    #[command(about = "Query stored logs, newest receipt first")]
    Query {
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long, help = "Lower bound on producer timestamp (inclusive)")]
        timestamp_start: Option<String>,
        #[arg(long, help = "Upper bound on producer timestamp (inclusive)")]
        timestamp_end: Option<String>,
        #[arg(long, help = "RFC3339 time or duration ago, e.g. 15m")]
        received_since: Option<String>,
        #[arg(long, help = "RFC3339 time or duration ago, e.g. 1m")]
        received_until: Option<String>,
    },
    #[command(about = "Show store status")]
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            db_path,
            http_addr,
            tokens,
            request_timeout,
        } => {
            init_run_tracing(TelemetryConfig {
                format: LogFormat::from_env(),
            });
            let res = run_server(db_path, http_addr, tokens, request_timeout).await;
            shutdown_tracing();
            res?;
        }
        Commands::Query {
            service,
            severity,
            timestamp_start,
            timestamp_end,
            received_since,
            received_until,
        } => {
            init_cli_tracing();
            let spec = FilterSpec {
                timestamp_start,
                timestamp_end,
                received_at_start: received_since.as_deref().map(received_bound).transpose()?,
                received_at_end: received_until.as_deref().map(received_bound).transpose()?,
                service,
                severity,
            };
            let res = QueryClient::new(cli.addr).query(&spec).await?;
            if cli.json {
                print_json(&res)?;
            } else {
                print_query_human(&res);
            }
        }
        Commands::Status => {
            init_cli_tracing();
            let res = QueryClient::new(cli.addr).status().await?;
            if cli.json {
                print_json(&res)?;
            } else {
                print_status_human(&res);
            }
        }
    }

    Ok(())
}

async fn run_server(
    db_path: Option<PathBuf>,
    http_addr: Option<String>,
    tokens: Vec<String>,
    request_timeout: Option<String>,
) -> anyhow::Result<()> {
    let mut cfg = Config::load().context("load config")?;
    if let Some(v) = db_path {
        cfg.db_path = v;
    }
    if let Some(v) = http_addr {
        cfg.http_addr = v;
    }
    if !tokens.is_empty() {
        cfg.tokens = tokens;
    }
    if let Some(v) = request_timeout {
        cfg.request_timeout = parse_request_timeout(&v)?;
    }

    let credentials = CredentialStore::new(cfg.tokens.iter().cloned());
    if credentials.is_empty() {
        tracing::warn!("no producer tokens configured; every ingest will be rejected");
    }

    let store = logsink_store::Store::open(&cfg.db_path)
        .with_context(|| format!("open log store at {}", cfg.db_path.display()))?;
    let ingestor = Ingestor::new(credentials, store);

    eprintln!("logsink run");
    eprintln!("  db: {}", cfg.db_path.display());
    eprintln!("  http: {}", cfg.http_addr);
    eprintln!("  tokens: {}", cfg.tokens.len());

    let addr = cfg
        .http_addr
        .parse()
        .with_context(|| format!("parse http addr {}", cfg.http_addr))?;
    let server = tokio::spawn(logsink_ingest::server::run_http_server(
        ingestor,
        addr,
        cfg.request_timeout,
    ));

    tokio::select! {
        res = server => {
            res??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    Ok(())
}

fn received_bound(input: &str) -> anyhow::Result<String> {
    Ok(format_received_at(parse_time_or_relative(input)?))
}

fn parse_request_timeout(input: &str) -> anyhow::Result<Duration> {
    let timeout = parse_duration_str(input)?;
    if timeout.is_zero() {
        anyhow::bail!("request timeout must be greater than zero");
    }
    Ok(timeout)
}

fn print_json<T: Serialize>(v: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}
