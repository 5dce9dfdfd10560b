//! GigClaw CLI - agent-native task marketplace
//!
//! Usage:
//!   gigclaw health                          Check API health
//!   gigclaw doctor                          Diagnose configuration
//!   gigclaw task list                       List tasks
//!   gigclaw task post --title T --budget B  Post a new task
//!   gigclaw task bid <task-id> --amount A   Bid on a task
//!   gigclaw task accept <task-id> --bid ID  Accept a bid
//!   gigclaw dashboard                       Launch the live dashboard

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gigclaw_client::MarketplaceClient;
use gigclaw_core::{config, ApiError, GigError, GigclawConfig, NewTask, Task};
use gigclaw_dashboard::DashboardConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gigclaw")]
#[command(author, version, about = "Agent-native task marketplace CLI")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file (defaults to ~/.gigclaw/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// GigClaw API base URL
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Retries after the first attempt for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check GigClaw API health
    Health,

    /// Diagnose CLI configuration and connectivity
    Doctor,

    /// Manage tasks on the marketplace
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },

    /// Launch the live terminal dashboard
    Dashboard {
        /// Auto-refresh interval in seconds
        #[arg(short, long)]
        refresh: Option<u64>,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List available tasks
    List,

    /// Post a new task
    Post {
        /// Task title
        #[arg(short, long)]
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Task budget
        #[arg(short, long)]
        budget: f64,

        /// Currency (USDC, SOL)
        #[arg(short, long, default_value = "USDC")]
        currency: String,

        /// Task tag (repeatable)
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,
    },

    /// Place a bid on a task
    Bid {
        /// Task ID
        task_id: String,

        /// Bid amount
        #[arg(short, long)]
        amount: f64,

        /// Message to the task owner
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Accept a bid on a task you posted
    Accept {
        /// Task ID
        task_id: String,

        /// Bid ID to accept
        #[arg(short, long = "bid")]
        bid_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The dashboard owns the screen, so only errors may reach stderr
    let level = match cli.command {
        Commands::Dashboard { .. } => Level::ERROR,
        _ if cli.global.verbose || config::debug_from_env() => Level::DEBUG,
        _ => Level::WARN,
    };
    if let Err(e) = init_logging(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli.global)?;

    match cli.command {
        Commands::Health => cmd_health(&config).await,
        Commands::Doctor => cmd_doctor(&cli.global, &config).await,
        Commands::Task { action } => cmd_task(&config, action).await,
        Commands::Dashboard { refresh } => cmd_dashboard(config, refresh).await,
    }
}

/// Config file, then environment, then command-line flags
fn resolve_config(args: &GlobalArgs) -> Result<GigclawConfig> {
    let config = GigclawConfig::load(args.config.as_deref())?.apply_env();
    Ok(apply_flags(config, args))
}

fn apply_flags(mut config: GigclawConfig, args: &GlobalArgs) -> GigclawConfig {
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(retries) = args.max_retries {
        config.max_retries = retries;
    }
    config
}

fn build_client(config: &GigclawConfig) -> Result<MarketplaceClient> {
    let client = MarketplaceClient::new(config.client_config())?;
    Ok(client)
}

/// Classified report for API failures, plain chain for everything else
fn render_error(err: &anyhow::Error) -> String {
    let api = err.downcast_ref::<ApiError>().or_else(|| {
        match err.downcast_ref::<GigError>() {
            Some(GigError::Api(api)) => Some(api),
            _ => None,
        }
    });

    match api {
        Some(api) => {
            let context = err.to_string();
            if context == api.to_string() {
                api.report()
            } else {
                format!("Error: {}\n\n{}", context, api.report())
            }
        }
        None => format!("Error: {:#}", err),
    }
}

async fn cmd_health(config: &GigclawConfig) -> Result<()> {
    let client = build_client(config)?;
    let health = client.health().await.context("Health check failed")?;

    println!();
    println!("╔══════════════════════════════════════════╗");
    println!("║             GigClaw Status               ║");
    println!("╚══════════════════════════════════════════╝");
    println!();
    println!("  Status:    ● {}", health.status);
    if !health.version.is_empty() {
        println!("  Version:   {}", health.version);
    }
    println!("  API:       {}", client.config().base_url);
    println!("  Time:      {}", chrono::Local::now().format("%H:%M:%S"));
    println!();
    println!("Quick commands:");
    println!("  gigclaw dashboard  # Launch TUI");
    println!("  gigclaw task list  # View tasks");
    println!();

    Ok(())
}

async fn cmd_doctor(args: &GlobalArgs, config: &GigclawConfig) -> Result<()> {
    println!("GigClaw doctor");
    println!();

    let mut issues = 0;
    let mut warnings = 0;

    println!("Configuration file");
    let path = args.config.clone().or_else(GigclawConfig::default_path);
    match path {
        Some(path) if path.exists() => println!("  ✓ {}", path.display()),
        Some(path) => {
            println!("  ⚠ Not found: {} (using defaults)", path.display());
            warnings += 1;
        }
        None => {
            println!("  ⚠ No home directory, using defaults");
            warnings += 1;
        }
    }
    println!();

    println!("API configuration");
    println!("  URL:         {}", config.api_url);
    println!(
        "  API key:     {}",
        if config.api_key.is_some() { "set" } else { "not set" }
    );
    println!("  Timeout:     {}s", config.timeout_secs);
    println!("  Max retries: {}", config.max_retries);
    if config.api_key.is_none() {
        warnings += 1;
    }
    println!();

    println!("API connectivity");
    match build_client(config) {
        Ok(client) => match client.health().await {
            Ok(health) => {
                println!("  ✓ API is healthy ({})", health.status);
                if !health.version.is_empty() {
                    println!("  Version: {}", health.version);
                }
            }
            Err(e) => {
                println!("  ✗ Health check failed: {}", e);
                for suggestion in e.kind.suggestions() {
                    println!("    • {}", suggestion);
                }
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ✗ Cannot create API client: {}", e);
            issues += 1;
        }
    }
    println!();

    println!("System");
    println!("  OS:      {}", std::env::consts::OS);
    println!("  Arch:    {}", std::env::consts::ARCH);
    println!("  Version: gigclaw {}", env!("CARGO_PKG_VERSION"));
    println!();

    if issues == 0 && warnings == 0 {
        println!("✓ All checks passed! GigClaw is ready to use.");
    } else {
        if issues > 0 {
            println!("✗ {} issue(s) found", issues);
        }
        if warnings > 0 {
            println!("⚠ {} warning(s) found", warnings);
        }
    }

    Ok(())
}

async fn cmd_task(config: &GigclawConfig, action: TaskCommands) -> Result<()> {
    let client = build_client(config)?;

    match action {
        TaskCommands::List => {
            let tasks = client.list_tasks().await.context("Failed to list tasks")?;
            print_task_list(&tasks);
        }
        TaskCommands::Post {
            title,
            description,
            budget,
            currency,
            tags,
        } => {
            let new_task = NewTask::new(title, budget, currency)
                .with_description(description)
                .with_tags(tags);
            let task = client
                .create_task(&new_task)
                .await
                .context("Failed to create task")?;
            info!("Task {} posted", task.id);

            println!("✓ Task created successfully!");
            println!();
            for line in format_created_task(&task) {
                println!("{}", line);
            }
            println!();
            println!("Next steps:");
            println!("  - Wait for bids: gigclaw task list");
            println!("  - Accept a bid:  gigclaw task accept <task-id> --bid <bid-id>");
        }
        TaskCommands::Bid {
            task_id,
            amount,
            message,
        } => {
            let bid = client
                .place_bid(&task_id, amount, &message)
                .await
                .context("Failed to place bid")?;

            println!("✓ Bid placed successfully!");
            println!();
            println!("Bid ID:   {}", bid.id);
            println!("Task ID:  {}", task_id);
            println!("Amount:   {:.2}", bid.amount);
            if !bid.message.is_empty() {
                println!("Message:  {}", bid.message);
            }
            println!();
            println!("Wait for the task owner to accept your bid.");
        }
        TaskCommands::Accept { task_id, bid_id } => {
            client
                .accept_bid(&task_id, &bid_id)
                .await
                .context("Failed to accept bid")?;

            println!("✓ Bid accepted!");
            println!();
            println!("Task ID: {}", task_id);
            println!("Bid ID:  {}", bid_id);
            println!();
            println!("Funds are now locked in escrow.");
        }
    }

    Ok(())
}

/// Detail lines for a freshly posted task, including escrow state
fn format_created_task(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("ID:       {}", task.id),
        format!("Title:    {}", task.title),
        format!("Budget:   {}", task.formatted_budget()),
        format!("Status:   {}", task.status),
    ];
    if !task.tags.is_empty() {
        lines.push(format!("Tags:     {}", task.tags.join(", ")));
    }
    if let Some(settlement) = &task.settlement {
        lines.push(format!("Escrow:   {}", settlement.status));
        if !settlement.reference.is_empty() {
            lines.push(format!("Tx:       {}", settlement.reference));
        }
        if let Some(error) = &settlement.error {
            lines.push(format!("Escrow error: {}", error));
        }
    }
    lines
}

fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        println!();
        println!("Post a task:");
        println!("  gigclaw task post --title 'My Task' --budget 50");
        return;
    }

    println!("Found {} task(s)", tasks.len());
    println!();
    for line in format_task_table(tasks) {
        println!("{}", line);
    }
}

fn format_task_table(tasks: &[Task]) -> Vec<String> {
    let rows: Vec<[String; 5]> = tasks
        .iter()
        .map(|task| {
            let tags = if task.tags.is_empty() {
                "-".to_string()
            } else {
                task.tags.join(", ")
            };
            [
                task.id.clone(),
                truncate(&task.title, 30),
                task.formatted_budget(),
                task.status.to_string(),
                tags,
            ]
        })
        .collect();

    let header = ["ID", "TITLE", "BUDGET", "STATUS", "TAGS"].map(String::from);
    let rule = ["--", "-----", "------", "------", "----"].map(String::from);

    let mut widths = [0usize; 5];
    for row in std::iter::once(&header).chain(rows.iter()) {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(std::iter::once(&rule))
        .chain(rows.iter())
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect()
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

async fn cmd_dashboard(config: GigclawConfig, refresh: Option<u64>) -> Result<()> {
    let client = build_client(&config)?;
    client
        .check_connectivity()
        .await
        .context("Cannot start dashboard")?;

    let refresh_interval = match refresh {
        Some(secs) => std::time::Duration::from_secs(secs.max(1)),
        None => config.refresh_interval(),
    };

    gigclaw_dashboard::run(Arc::new(client), DashboardConfig { refresh_interval }).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigclaw_core::{ApiErrorKind, SettlementState, SettlementStatus, TaskStatus};
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    fn task(id: &str, title: &str, tags: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            budget: 50.0,
            currency: "USDC".to_string(),
            status: TaskStatus::Posted,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: None,
            bids: Vec::new(),
            settlement: None,
        }
    }

    #[test]
    fn test_parse_task_post() {
        let cli = parse(&[
            "gigclaw", "task", "post", "--title", "Label images", "--budget", "50", "--tag",
            "ml", "--tag", "data",
        ]);
        match cli.command {
            Commands::Task {
                action:
                    TaskCommands::Post {
                        title,
                        budget,
                        currency,
                        tags,
                        ..
                    },
            } => {
                assert_eq!(title, "Label images");
                assert_eq!(budget, 50.0);
                assert_eq!(currency, "USDC");
                assert_eq!(tags, vec!["ml", "data"]);
            }
            _ => panic!("expected task post"),
        }
    }

    #[test]
    fn test_created_task_shows_escrow_reference() {
        let mut posted = task("t-9", "Label images", &["ml"]);
        posted.settlement = Some(SettlementStatus {
            status: SettlementState::Confirmed,
            reference: "5xYzSig".to_string(),
            error: None,
        });

        let lines = format_created_task(&posted);
        assert!(lines.contains(&"Escrow:   confirmed".to_string()));
        assert!(lines.contains(&"Tx:       5xYzSig".to_string()));
        assert!(lines.contains(&"Tags:     ml".to_string()));
    }

    #[test]
    fn test_created_task_without_settlement() {
        let lines = format_created_task(&task("t-1", "Label images", &[]));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "Budget:   50.00 USDC");
        assert!(lines.iter().all(|l| !l.starts_with("Escrow")));
    }

    #[test]
    fn test_post_requires_title_and_budget() {
        assert!(Cli::try_parse_from(["gigclaw", "task", "post", "--budget", "5"]).is_err());
        assert!(Cli::try_parse_from(["gigclaw", "task", "post", "--title", "x"]).is_err());
    }

    #[test]
    fn test_parse_accept_and_global_flags() {
        let cli = parse(&[
            "gigclaw",
            "task",
            "accept",
            "t1",
            "--bid",
            "b1",
            "--api-url",
            "http://localhost:3000",
            "--max-retries",
            "0",
        ]);
        assert_eq!(cli.global.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cli.global.max_retries, Some(0));
        assert!(matches!(
            cli.command,
            Commands::Task {
                action: TaskCommands::Accept { .. }
            }
        ));
    }

    #[test]
    fn test_flags_override_config() {
        let args = GlobalArgs {
            api_url: Some("http://flag".into()),
            timeout: Some(5),
            ..Default::default()
        };
        let config = apply_flags(GigclawConfig::default(), &args);
        assert_eq!(config.api_url, "http://flag");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, GigclawConfig::default().max_retries);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_resolve_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"http://from-file\"\nmax_retries = 1").unwrap();

        let args = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            max_retries: Some(4),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.max_retries, 4);
    }

    #[test]
    fn test_resolve_config_missing_file() {
        let args = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/gigclaw.toml")),
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_render_api_error_report() {
        let err = anyhow::Error::new(ApiError::new(
            ApiErrorKind::ConnectionRefused,
            "connection refused",
        ))
        .context("Failed to list tasks");
        let text = render_error(&err);
        assert!(text.starts_with("Error: Failed to list tasks"));
        assert!(text.contains("Cannot connect to GigClaw API"));
        assert!(text.contains("gigclaw health"));
    }

    #[test]
    fn test_render_config_error() {
        let err = anyhow::Error::new(GigError::Config("API URL must not be empty".into()));
        assert_eq!(
            render_error(&err),
            "Error: Configuration error: API URL must not be empty"
        );
    }

    #[test]
    fn test_task_table_alignment() {
        let lines = format_task_table(&[
            task("t1", "Short", &[]),
            task("t-long-id", "A very long task title that keeps going on", &["ml"]),
        ]);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID         TITLE"));
        assert!(lines[2].contains("50.00 USDC"));
        assert!(lines[2].ends_with('-'));
        assert!(lines[3].contains("A very long task title that..."));
        assert!(lines[3].ends_with("ml"));
    }
}
