use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tokenseer::client::{NewWatchlistItem, NewWebhook, TokenAnalysis, WatchlistUpdate};
use tokenseer::config;
use tokenseer::evaluator::{self, RiskAnalyzer, RiskAssessment};
use tokenseer::market::{format_timestamp, shorten_address};
use tokenseer::{IntelClient, Signal, SignalQuery, SignalSeverity, SignalType};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis of a token as reported by the service
    Analyze { address: String },
    /// Signals recorded for a token
    Signals {
        address: String,
        #[arg(long)]
        min_severity: Option<SignalSeverity>,
        /// Restrict to these signal types (repeatable)
        #[arg(long = "type")]
        types: Vec<SignalType>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Latest signals across all tokens
    Feed {
        #[arg(long)]
        min_severity: Option<SignalSeverity>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Market snapshot for a token
    Market { address: String },
    /// Contract security check
    Security { address: String },
    /// Holder distribution
    Holders {
        address: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Score a token's signals locally against the configured tolerance
    Risk { address: String },
    /// Analysis, signals and market data fetched together
    Report { address: String },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Manage webhook subscriptions
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    List,
    Add {
        address: String,
        #[arg(long)]
        note: Option<String>,
        /// Alert when a signal at or above this severity arrives
        #[arg(long)]
        alert_severity: Option<SignalSeverity>,
    },
    Update {
        id: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        alert_severity: Option<SignalSeverity>,
    },
    Remove { id: String },
}

#[derive(Subcommand)]
enum WebhookAction {
    List,
    Subscribe {
        url: String,
        /// Signal types to deliver (repeatable, default all)
        #[arg(long = "event")]
        events: Vec<SignalType>,
        #[arg(long)]
        min_severity: Option<SignalSeverity>,
    },
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let Some(command) = cli.command else {
        info!("No command specified. Use --help for available commands.");
        return Ok(());
    };

    let config = config::load_config().context("failed to load configuration")?;
    let client = IntelClient::new(&config).context("failed to create API client")?;

    match command {
        Commands::Analyze { address } => {
            let analysis = client.get_token_analysis(&address).await?;
            print_analysis(&analysis);
        }
        Commands::Signals {
            address,
            min_severity,
            types,
            limit,
        } => {
            let query = SignalQuery {
                types,
                min_severity,
                since: None,
                limit,
            };
            let signals = client.get_token_signals(&address, &query).await?;
            print_signals(&signals);
        }
        Commands::Feed { min_severity, limit } => {
            let query = SignalQuery {
                min_severity,
                limit: Some(limit),
                ..Default::default()
            };
            let signals = client.get_signal_feed(&query).await?;
            print_signals(&signals);
        }
        Commands::Market { address } => {
            let market = client.get_market_data(&address).await?;
            println!("Market for {}", shorten_address(&address));
            for line in market.summary_lines() {
                println!("  {}", line);
            }
        }
        Commands::Security { address } => {
            let security = client.get_contract_analysis(&address).await?;
            println!("Security check for {}", shorten_address(&security.address));
            println!("  Honeypot: {}", yes_no(security.is_honeypot));
            println!("  Verified: {}", yes_no(security.is_verified));
            println!("  Mint authority revoked: {}", yes_no(security.mint_authority_revoked));
            println!("  Freeze authority revoked: {}", yes_no(security.freeze_authority_revoked));
            if let Some(locked) = security.lp_locked {
                match security.lp_locked_percentage {
                    Some(pct) => println!("  LP locked: {} ({:.1}%)", yes_no(locked), pct),
                    None => println!("  LP locked: {}", yes_no(locked)),
                }
            }
            if let (Some(buy), Some(sell)) = (security.buy_tax, security.sell_tax) {
                println!("  Tax: buy {:.1}% / sell {:.1}%", buy, sell);
            }
            for risk in &security.risks {
                println!("  ! {}", risk);
            }
            if security.has_blocking_issue() {
                warn!("Token {} has blocking contract issues", address);
            }
        }
        Commands::Holders { address, limit } => {
            let holders = client.get_holder_analysis(&address, Some(limit)).await?;
            println!(
                "{} holders, top 10 hold {:.2}%",
                holders.total_holders, holders.top10_percentage
            );
            for (rank, holder) in holders.holders.iter().enumerate() {
                println!(
                    "  {:>2}. {} {:>7.2}% {}",
                    rank + 1,
                    shorten_address(&holder.address),
                    holder.percentage,
                    holder.label.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Risk { address } => {
            let analyzer = RiskAnalyzer::new(client, config.max_risk_level);
            let assessment = analyzer.assess(&address).await?;
            print_assessment(&assessment);
            if analyzer.is_within_tolerance(&assessment) {
                println!("Within tolerance (max {})", analyzer.max_risk_level());
            } else {
                println!("Exceeds tolerance (max {})", analyzer.max_risk_level());
            }
        }
        Commands::Report { address } => {
            let query = SignalQuery::default();
            let (analysis, signals, market) = futures::try_join!(
                client.get_token_analysis(&address),
                client.get_token_signals(&address, &query),
                client.get_market_data(&address),
            )?;

            println!("{} ({})", analysis.token.name, analysis.token.symbol);
            for line in market.summary_lines() {
                println!("  {}", line);
            }
            print_assessment(&RiskAssessment::from_signals(&signals));
            if let Some(remote) = analysis.risk_score {
                println!("Service risk score: {}", remote);
            }
            print_signals(&signals);
        }
        Commands::Watchlist { action } => match action {
            WatchlistAction::List => {
                let items = client.list_watchlist().await?;
                if items.is_empty() {
                    println!("Watchlist is empty");
                }
                for item in items {
                    println!(
                        "{}  {}  {}  added {}{}",
                        item.id,
                        shorten_address(&item.address),
                        item.symbol.as_deref().unwrap_or("?"),
                        format_timestamp(item.added_at),
                        item.note.map(|n| format!("  ({})", n)).unwrap_or_default()
                    );
                }
            }
            WatchlistAction::Add {
                address,
                note,
                alert_severity,
            } => {
                let item = client
                    .add_to_watchlist(&NewWatchlistItem {
                        address,
                        note,
                        alert_severity,
                    })
                    .await?;
                println!("Added {} as {}", item.address, item.id);
            }
            WatchlistAction::Update {
                id,
                note,
                alert_severity,
            } => {
                let item = client
                    .update_watchlist_item(&id, &WatchlistUpdate { note, alert_severity })
                    .await?;
                println!("Updated {}", item.id);
            }
            WatchlistAction::Remove { id } => {
                client.remove_from_watchlist(&id).await?;
                println!("Removed {}", id);
            }
        },
        Commands::Webhook { action } => match action {
            WebhookAction::List => {
                for hook in client.list_webhooks().await? {
                    let events = if hook.events.is_empty() {
                        "all".to_string()
                    } else {
                        hook.events
                            .iter()
                            .map(|e| e.as_str())
                            .collect::<Vec<_>>()
                            .join(",")
                    };
                    println!(
                        "{}  {}  events={}  active={}",
                        hook.id, hook.url, events, hook.active
                    );
                }
            }
            WebhookAction::Subscribe {
                url,
                events,
                min_severity,
            } => {
                let hook = client
                    .subscribe_webhook(&NewWebhook {
                        url,
                        events,
                        min_severity,
                    })
                    .await?;
                println!("Subscribed webhook {}", hook.id);
            }
            WebhookAction::Remove { id } => {
                client.delete_webhook(&id).await?;
                println!("Deleted webhook {}", id);
            }
        },
    }

    Ok(())
}

fn print_analysis(analysis: &TokenAnalysis) {
    let token = &analysis.token;
    println!("{} ({}) {}", token.name, token.symbol, shorten_address(&token.address));

    if let Some(market) = &analysis.market {
        for line in market.summary_lines() {
            println!("  {}", line);
        }
    }
    if let Some(security) = &analysis.security {
        if security.has_blocking_issue() {
            println!("  Contract: issues found ({})", security.risks.join(", "));
        } else {
            println!("  Contract: no blocking issues");
        }
    }

    let local = RiskAssessment::from_signals(&analysis.signals);
    match analysis.risk_score {
        Some(remote) if remote != local.score => {
            println!("  Risk: {} ({}), service reports {}", local.score, local.level, remote)
        }
        _ => println!("  Risk: {} ({})", local.score, local.level),
    }

    for signal in evaluator::get_critical_signals(&analysis.signals) {
        println!("  {}", evaluator::format_signal(signal));
    }
}

fn print_signals(signals: &[Signal]) {
    if signals.is_empty() {
        println!("No signals");
        return;
    }

    for (signal_type, group) in evaluator::group_by_type(signals) {
        println!("{} ({})", signal_type, group.len());
        for signal in group {
            println!(
                "  {}  {}",
                format_timestamp(signal.timestamp),
                evaluator::format_signal(signal)
            );
        }
    }
}

fn print_assessment(assessment: &RiskAssessment) {
    println!(
        "Risk score {} ({}), {} signals, {} high/critical{}",
        assessment.score,
        assessment.level,
        assessment.signal_count,
        assessment.critical_count,
        if assessment.high_risk { ", HIGH RISK" } else { "" }
    );
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
