use clap::{Parser, Subcommand};

use crate::config::{ConfigStore, ProviderKind, PROVIDER_PRIORITY};
use crate::llm::TokenUsage;
use crate::mcp_surface;
use crate::GatewayEngine;

#[derive(Parser)]
#[command(name = "llmgateway", about = "Unified MCP gateway over multiple LLM providers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the current merged configuration (API keys redacted).
    Config,
    /// Check provider readiness; with --test, issue a one-token probe call.
    Doctor {
        #[arg(long)]
        test: bool,
    },
    /// Print a host MCP-server install stanza for this binary.
    Install {
        #[arg(long, default_value = "llmgateway")]
        name: String,
    },
    /// Pricing cache inspection.
    Pricing {
        #[command(subcommand)]
        action: PricingAction,
    },
    /// Request-log and conversation database inspection.
    #[command(name = "db")]
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Placeholder for the (out-of-scope) HTTP dashboard.
    Dashboard {
        #[arg(long, default_value_t = 3000)]
        port: u16,
        #[arg(long)]
        dev: bool,
    },
}

#[derive(Subcommand)]
pub enum PricingAction {
    /// Print the full resolved pricing catalog.
    Show,
    /// Compute the dollar cost of a token usage against a model.
    Calculate {
        model: String,
        #[arg(long, default_value_t = 0)]
        input_tokens: u64,
        #[arg(long, default_value_t = 0)]
        output_tokens: u64,
    },
    /// Force a remote refresh, bypassing memory and disk caches.
    Refresh,
    /// Clear the in-memory and on-disk caches.
    Clear,
    /// Print cache file path and source URL.
    Info,
}

#[derive(Subcommand)]
pub enum DbAction {
    /// Summary stats across all request records.
    Stats,
    /// Most recent request records.
    Show {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Paginated session list from conversation memory.
    View {
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

fn db_path(config_path: &std::path::Path) -> std::path::PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("ultra-mcp.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ultra-mcp.db"))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Config => cmd_config().await,
        Command::Doctor { test } => cmd_doctor(test).await,
        Command::Install { name } => cmd_install(name),
        Command::Pricing { action } => cmd_pricing(action).await,
        Command::Db { action } => cmd_db(action).await,
        Command::Dashboard { port, dev } => cmd_dashboard(port, dev),
    }
}

async fn cmd_config() -> anyhow::Result<()> {
    let store = ConfigStore::new().await?;
    let config = store.get_config().await;

    println!("config path: {}", store.config_path().display());
    for kind in PROVIDER_PRIORITY {
        let credential = config.credential(*kind);
        let key_state = if credential.is_configured() { "configured" } else { "not configured" };
        println!("  {:<18} {}", kind.as_str(), key_state);
    }
    Ok(())
}

async fn cmd_doctor(test: bool) -> anyhow::Result<()> {
    let config = std::sync::Arc::new(ConfigStore::new().await?);

    if test {
        let path = db_path(config.config_path());
        let engine = GatewayEngine::new(config.clone(), &path).await?;
        for kind in PROVIDER_PRIORITY {
            let request = crate::llm::GenerateRequest {
                provider: Some(*kind),
                prompt: "ping".to_string(),
                max_output_tokens: Some(1),
                tool_name: Some("doctor".to_string()),
                ..Default::default()
            };
            let cancel = tokio_util::sync::CancellationToken::new();
            let result = engine.generate(&request, None, &cancel).await;
            print_doctor_line(kind, result.is_ok(), result.err().map(|e| e.to_string()));
        }
        return Ok(());
    }

    let registry = crate::llm::ProviderRegistry::new(config.clone(), reqwest::Client::new());
    let snapshot = registry.health_snapshot().await;
    for kind in PROVIDER_PRIORITY {
        let health = snapshot.get(kind).cloned().unwrap_or_default();
        print_doctor_line(kind, health.configured, health.last_error);
    }
    Ok(())
}

fn print_doctor_line(kind: &ProviderKind, ok: bool, detail: Option<String>) {
    let status = if ok { "ok" } else { "fail" };
    match detail {
        Some(detail) if !ok => println!("  {:<18} {}  ({detail})", kind.as_str(), status),
        _ => println!("  {:<18} {}", kind.as_str(), status),
    }
}

fn cmd_install(name: String) -> anyhow::Result<()> {
    let binary_path = std::env::current_exe()?.to_string_lossy().to_string();
    let stanza = mcp_surface::install_stanza(&binary_path, &name);
    println!("{}", serde_json::to_string_pretty(&stanza)?);
    Ok(())
}

async fn cmd_pricing(action: PricingAction) -> anyhow::Result<()> {
    let pricing = crate::pricing::PricingService::new(reqwest::Client::new());

    match action {
        PricingAction::Show => {
            let catalog = pricing.get_catalog().await;
            for (model, entry) in &catalog.models {
                println!(
                    "  {:<30} in={}/1M out={}/1M",
                    model,
                    crate::pricing::format_cost(entry.input_cost_per_million),
                    crate::pricing::format_cost(entry.output_cost_per_million),
                );
            }
        }
        PricingAction::Calculate { model, input_tokens, output_tokens } => {
            let usage = TokenUsage::new(input_tokens, output_tokens);
            let cost = pricing.calculate_cost(&model, &usage).await;
            println!("  input:   {}", crate::pricing::format_cost(cost.input_cost));
            println!("  output:  {}", crate::pricing::format_cost(cost.output_cost));
            println!("  total:   {}", crate::pricing::format_cost(cost.total_cost));
            println!("  tiered:  {}", cost.tiered_applied);
        }
        PricingAction::Refresh => {
            pricing.refresh().await?;
            println!("pricing cache refreshed");
        }
        PricingAction::Clear => {
            pricing.clear().await?;
            println!("pricing cache cleared");
        }
        PricingAction::Info => {
            println!("cache path: {}", pricing.disk_cache_path().display());
        }
    }
    Ok(())
}

async fn cmd_db(action: DbAction) -> anyhow::Result<()> {
    let config = ConfigStore::new().await?;
    let path = db_path(config.config_path());
    let engine = GatewayEngine::new(std::sync::Arc::new(config), &path).await?;

    match action {
        DbAction::Stats => {
            let stats = engine.tracker.stats().await?;
            println!("total requests:    {}", stats.total_requests);
            println!("successful:        {}", stats.successful_requests);
            println!("failed:            {}", stats.failed_requests);
            println!("total cost (USD):  {}", crate::pricing::format_cost(stats.total_cost_dollars));
            println!("total input tok:   {}", stats.total_input_tokens);
            println!("total output tok:  {}", stats.total_output_tokens);
        }
        DbAction::Show { limit } => {
            let records = engine.tracker.recent(limit).await?;
            for record in records {
                println!(
                    "  {}  {:<10} {:<20} {}",
                    record.started_at.to_rfc3339(),
                    record.provider,
                    record.model,
                    record.status.as_str(),
                );
            }
        }
        DbAction::View { limit, offset } => {
            let list = engine.memory.list_sessions(None, limit, offset).await?;
            for session in list.sessions {
                println!(
                    "  {}  {:<20} messages={} files={} cost={}",
                    session.id,
                    session.name.unwrap_or_else(|| "(unnamed)".to_string()),
                    session.message_count,
                    session.file_count,
                    crate::pricing::format_cost(session.total_cost_usd),
                );
            }
            println!("total: {}  has_more: {}", list.total_count, list.has_more);
        }
    }
    Ok(())
}

fn cmd_dashboard(_port: u16, _dev: bool) -> anyhow::Result<()> {
    eprintln!("the dashboard is not part of this gateway; its HTTP/tRPC surface is out of scope.");
    std::process::exit(1);
}
