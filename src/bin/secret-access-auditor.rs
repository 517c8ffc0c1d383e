//! Secret Access Auditor CLI
//!
//! Audits which roster repositories can read the required organization
//! secrets and optionally grants the whole roster access.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};
use secret_access_auditor::orchestration::report;
use secret_access_auditor::{
    ApiConfigFile, AuditConfig, AuditConfigFile, AuditError, AutoConfirm, ConfigLoadOptions,
    ConfigLoader, Confirmer, GitHubClient, RunMode, SecretAccessAuditor, StdinConfirmer,
    TokenManager, TokenSource, exit_code_for,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::task::JoinError;
use tracing_subscriber::EnvFilter;

/// GitHub organization secret access auditor
#[derive(Parser)]
#[command(name = "secret-access-auditor")]
#[command(version = "0.1.0")]
#[command(about = "Audit and grant repository access to organization secrets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Explicit configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Organization to audit
    #[arg(long, global = true)]
    org: Option<String>,

    /// REST API base URL
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit access and offer to fix it (default)
    Verify {
        /// Grant without asking
        #[arg(short, long)]
        yes: bool,

        /// Print the report and never modify allow-lists
        #[arg(long, conflicts_with = "yes")]
        report_only: bool,
    },

    /// Only check authentication and secret presence
    Check,

    /// Skip the audit and grant the whole roster access
    Grant {
        /// Grant without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    let audit = tokio::spawn(run(cli));

    tokio::select! {
        joined = audit => process::exit(exit_code_from_task(joined)),
        _ = tokio::signal::ctrl_c() => {
            println!("\n\n{}", "Interrupted by user. Exiting...".yellow());
            process::exit(0);
        }
    }
}

/// A panic inside the run is an unexpected fault and exits 1
fn exit_code_from_task(joined: Result<i32, JoinError>) -> i32 {
    match joined.context("audit task aborted") {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("\n{}", "Unexpected error".red().bold());
            eprintln!("{:?}", e);
            1
        }
    }
}

fn init_tracing(verbose: u8) {
    let directives = log_directives(verbose, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `RUST_LOG` applies only when no `-v` flag was given
fn log_directives(verbose: u8, rust_log: Option<String>) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    match rust_log {
        Some(directives) if verbose == 0 && !directives.trim().is_empty() => directives,
        _ => format!("warn,secret_access_auditor={}", level),
    }
}

async fn run(cli: Cli) -> i32 {
    let (mode, yes) = match cli.command {
        None => (RunMode::Verify { report_only: false }, false),
        Some(Commands::Verify { yes, report_only }) => (RunMode::Verify { report_only }, yes),
        Some(Commands::Check) => (RunMode::Check, false),
        Some(Commands::Grant { yes }) => (RunMode::Grant, yes),
    };

    let env: HashMap<String, String> = std::env::vars().collect();
    let cli_args = AuditConfigFile {
        organization: cli.org,
        api: cli.api_url.map(|url| ApiConfigFile {
            base_url: Some(url),
            ..Default::default()
        }),
        ..Default::default()
    };

    report::print_header("GitHub Organization Secrets Verification");

    let (mut auditor, mut confirmer) = match prepare(env, cli.config, cli_args, yes).await {
        Ok(prepared) => prepared,
        Err(e) => {
            report::print_failure(&e, None);
            return 1;
        }
    };

    let result = auditor.run(mode, confirmer.as_mut()).await;
    if let Err(e) = &result {
        tracing::debug!(code = e.code(), "run stopped");
        report::print_failure(e, Some(auditor.config()));
    }
    exit_code_for(&result)
}

async fn prepare(
    env: HashMap<String, String>,
    config_path: Option<PathBuf>,
    cli_args: AuditConfigFile,
    yes: bool,
) -> Result<(SecretAccessAuditor<GitHubClient>, Box<dyn Confirmer>), AuditError> {
    let config = ConfigLoader::load(ConfigLoadOptions {
        project_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        home_dir: std::env::var_os("HOME").map(PathBuf::from),
        config_path,
        cli_args: Some(cli_args),
        env: env.clone(),
    })
    .await?;

    report::print_run_banner(&config);

    let token = acquire_token(&config, &env).await?;
    let client = GitHubClient::new(&config, token).map_err(|e| AuditError::Client {
        message: e.to_string(),
    })?;

    let confirmer: Box<dyn Confirmer> = if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirmer)
    };

    Ok((SecretAccessAuditor::new(client, config), confirmer))
}

async fn acquire_token(
    config: &AuditConfig,
    env: &HashMap<String, String>,
) -> Result<SecretString, AuditError> {
    let manager = TokenManager::new(config.auth.token_env.clone());

    let (token, source) = match manager.from_env(env) {
        Some(token) => (token, TokenSource::Environment),
        None => {
            println!(
                "{}",
                format!("{} not found in environment", manager.variable()).yellow()
            );
            println!("Create a token at: https://github.com/settings/tokens");
            println!("Required scopes: admin:org, repo\n");

            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"Enter GitHub token: ").await?;
            stdout.flush().await?;

            let mut reader = BufReader::new(tokio::io::stdin());
            match manager.from_reader(&mut reader).await? {
                Some(token) => (token, TokenSource::Prompt),
                None => {
                    return Err(AuditError::TokenMissing {
                        variable: manager.variable().to_string(),
                    });
                }
            }
        }
    };

    tracing::debug!(
        source = ?source,
        token = %TokenManager::mask_token(token.expose_secret()),
        "using token"
    );
    if !TokenManager::looks_like_github_token(&token) {
        tracing::warn!("token does not carry a known GitHub prefix");
    }

    Ok(token)
}
