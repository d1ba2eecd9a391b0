//! Command-line interface for the market forum engine
//!
//! Commands:
//! - `analyze` runs one query through the pipeline
//! - `report generate | show` composes or retrieves a stored report
//! - `price`, `news`, `indexes` call a single data provider
//! - `profile save | show` manages stored user profiles
//! - `status` prints the wiring and budget split

mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use forum_core::{
    IndexProvider, NewsProvider, PriceSeriesProvider, ProfileStore, ReportRequest, RiskTolerance,
    Ticker, UserProfile,
};
use forum_engine::{
    ApiResponse, ExecutionMode, FileProfileStore, FileReportStore, ForumConfig, ForumEngine,
    QueryAgent, ReportAgent, ReportPublisher,
};
use forum_utils::{AppConfig, init_tracing_with};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "forum")]
#[command(about = "Ask market questions and compose reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Use seeded sample data instead of Yahoo Finance and Finnhub
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Overall request budget in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a natural-language query through the pipeline
    Analyze {
        /// Query text, e.g. "AAPL trend last 30 days"
        #[arg(required = true)]
        query: Vec<String>,

        /// Load the stored profile of this user
        #[arg(long, conflicts_with = "profile")]
        user: Option<String>,

        /// Read the profile from a JSON file
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Run media before insight so insights can cite charts and tables
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Compose and store a report from the result
        #[arg(long, default_value_t = false)]
        save_report: bool,
    },
    /// Compose or retrieve reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Price series for one ticker
    Price {
        ticker: String,

        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Headlines for a ticker or keyword
    News {
        #[arg(default_value = "market")]
        keyword: String,
    },
    /// Latest market index values
    Indexes,
    /// Manage stored user profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show configuration and stage wiring
    Status,
}

#[derive(Subcommand, Debug)]
enum ReportAction {
    /// Compose a report from a saved aggregated result or report request
    Generate {
        /// JSON file; `-` reads stdin
        #[arg(long)]
        input: PathBuf,
    },
    /// Print a stored report
    Show {
        report_id: String,

        /// Print the rendered HTML body
        #[arg(long, default_value_t = false)]
        body: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Create or replace a profile
    Save {
        user_id: String,

        /// JSON file with the profile fields
        #[arg(long)]
        file: Option<PathBuf>,

        /// conservative, moderate or aggressive
        #[arg(long)]
        risk: Option<String>,

        /// Preferred lookback in days
        #[arg(long)]
        lookback: Option<u32>,
    },
    /// Print a stored profile
    Show { user_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = AppConfig::from_env()?;
    init_tracing_with(app.log_format);

    let cli = Cli::parse();
    info!(environment = %app.environment, offline = cli.offline, "Starting forum");

    match cli.command {
        Commands::Analyze {
            ref query,
            ref user,
            ref profile,
            sequential,
            save_report,
        } => {
            let raw_text = query.join(" ");
            let config = forum_config(&cli, sequential)?;
            analyze(&cli, &app, config, &raw_text, user.as_deref(), profile.as_deref(), save_report)
                .await
        }
        Commands::Report { ref action } => report(&cli, &app, action).await,
        Commands::Price { ref ticker, days } => {
            let agent = query_agent(&cli)?;
            let ticker = Ticker::new(ticker);
            let points = agent.prices().get_price_series(&ticker, days).await?;
            if cli.json {
                print_json(&ApiResponse::ok(points))
            } else {
                println!("{}", render::price_table(&ticker, &points));
                Ok(())
            }
        }
        Commands::News { ref keyword } => {
            let agent = query_agent(&cli)?;
            let articles = agent.news().get_news(keyword).await?;
            if cli.json {
                print_json(&ApiResponse::ok(articles))
            } else {
                println!("{}", render::news_table(&articles));
                Ok(())
            }
        }
        Commands::Indexes => {
            let agent = query_agent(&cli)?;
            let indexes = agent.indexes().get_indexes().await?;
            if cli.json {
                print_json(&ApiResponse::ok(indexes))
            } else {
                println!("{}", render::index_table(&indexes));
                Ok(())
            }
        }
        Commands::Profile { ref action } => profile(&cli, &app, action).await,
        Commands::Status => status(&cli, &app),
    }
}

fn forum_config(cli: &Cli, sequential: bool) -> Result<ForumConfig> {
    let mut builder = ForumConfig::builder().with_env_keys();
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    if sequential {
        builder = builder.execution(ExecutionMode::Sequential);
    }
    Ok(builder.build()?)
}

fn query_agent(cli: &Cli) -> Result<QueryAgent> {
    let config = Arc::new(forum_config(cli, false)?);
    Ok(if cli.offline {
        QueryAgent::offline(config)
    } else {
        QueryAgent::live(config)
    })
}

fn publisher(app: &AppConfig) -> Result<ReportPublisher> {
    Ok(ReportPublisher::new(
        Arc::new(ReportAgent::new()?),
        Arc::new(FileReportStore::from_app_config(app)),
    ))
}

async fn analyze(
    cli: &Cli,
    app: &AppConfig,
    config: ForumConfig,
    raw_text: &str,
    user: Option<&str>,
    profile_file: Option<&Path>,
    save_report: bool,
) -> Result<()> {
    let config = Arc::new(config);
    let engine = if cli.offline {
        ForumEngine::offline(config)
    } else {
        ForumEngine::live(config)
    };
    let profiles = FileProfileStore::from_app_config(app);

    let profile = match (user, profile_file) {
        (_, Some(path)) => Some(UserProfile::from_value(read_json(path).await?)?),
        (Some(user_id), None) => profiles.load(user_id).await?,
        (None, None) => None,
    };

    let result = match engine.process(raw_text, profile.clone()).await {
        Ok(result) => result,
        Err(e) => {
            error!(kind = e.kind(), "Query failed: {}", e);
            if cli.json {
                print_json(&ApiResponse::<()>::failure(&e))?;
            }
            return Err(e.into());
        }
    };

    let receipt = if save_report {
        let request = ReportRequest::from_result(&result, profile);
        Some(publisher(app)?.generate_report(request).await?)
    } else {
        None
    };

    if cli.json {
        let mut body = serde_json::to_value(&result)?;
        if let (Some(receipt), Value::Object(map)) = (&receipt, &mut body) {
            map.insert("report".to_string(), serde_json::to_value(receipt)?);
        }
        return print_json(&ApiResponse::ok(body));
    }

    render::print_result(&result);
    if let Some(receipt) = receipt {
        let store = FileReportStore::from_app_config(app);
        println!(
            "Report {} written to {}",
            receipt.report_id,
            store.body_path(&receipt.report_id)?.display()
        );
    }
    Ok(())
}

async fn report(cli: &Cli, app: &AppConfig, action: &ReportAction) -> Result<()> {
    let publisher = publisher(app)?;
    match action {
        ReportAction::Generate { input } => {
            let body = read_json(input).await?;
            let receipt = match publisher.generate_report_json(body).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    error!(kind = e.kind(), "Report composition failed: {}", e);
                    if cli.json {
                        print_json(&ApiResponse::<()>::failure(&e))?;
                    }
                    return Err(e.into());
                }
            };
            if cli.json {
                print_json(&ApiResponse::ok(receipt))
            } else {
                println!("Report {} available at {}", receipt.report_id, receipt.path);
                Ok(())
            }
        }
        ReportAction::Show { report_id, body } => {
            let report = publisher.fetch_report(report_id).await?;
            if cli.json {
                print_json(&ApiResponse::ok(report))
            } else if *body {
                println!("{}", report.rendered_body);
                Ok(())
            } else {
                println!("{}", render::report_table(&report));
                Ok(())
            }
        }
    }
}

async fn profile(cli: &Cli, app: &AppConfig, action: &ProfileAction) -> Result<()> {
    let store = FileProfileStore::from_app_config(app);
    match action {
        ProfileAction::Save {
            user_id,
            file,
            risk,
            lookback,
        } => {
            let mut profile = match file {
                Some(path) => UserProfile::from_value(read_json(path).await?)?,
                None => UserProfile::new(user_id.as_str()),
            };
            profile.id.clone_from(user_id);
            if let Some(label) = risk {
                let Some(tolerance) = RiskTolerance::parse(label) else {
                    bail!("unknown risk tolerance: {label}");
                };
                profile.risk_tolerance = tolerance;
            }
            if let Some(days) = lookback {
                profile = profile.with_preference("default_lookback_days", Value::from(*days));
            }
            store.save(user_id, &profile).await?;
            info!(user_id = %user_id, "Profile saved");
            if cli.json {
                print_json(&ApiResponse::ok(profile))
            } else {
                println!("Saved profile {} ({})", user_id, profile.risk_tolerance.as_str());
                Ok(())
            }
        }
        ProfileAction::Show { user_id } => match store.load(user_id).await? {
            Some(profile) => print_json(&profile),
            None => bail!("no stored profile for {user_id}"),
        },
    }
}

fn status(cli: &Cli, app: &AppConfig) -> Result<()> {
    let config = Arc::new(forum_config(cli, false)?);
    let live_news = config.finnhub_api_key.is_some();
    let engine = if cli.offline {
        ForumEngine::offline(config.clone())
    } else {
        ForumEngine::live(config.clone())
    };

    if cli.json {
        return print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "environment": app.environment,
            "offline": cli.offline,
            "stages": engine.stage_names(),
            "request_timeout_ms": config.request_timeout.as_millis(),
            "fetch_budget_ms": config.fetch_budget().as_millis(),
            "derive_budget_ms": config.derive_budget().as_millis(),
            "execution": config.execution,
            "live_news": live_news,
            "reports_dir": app.reports_dir,
            "profiles_dir": app.profiles_dir,
        }));
    }

    println!("{}", render::status_table(&engine, app, cli.offline, live_news));
    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "forum", "--offline", "analyze", "AAPL", "trend", "--sequential", "--timeout", "5",
        ])
        .unwrap();
        assert!(cli.offline);
        assert_eq!(cli.timeout, Some(5));
        let Commands::Analyze { query, sequential, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(query.join(" "), "AAPL trend");
        assert!(sequential);

        let config = forum_config(&Cli::try_parse_from(["forum", "status"]).unwrap(), true).unwrap();
        assert_eq!(config.execution, ExecutionMode::Sequential);
    }

    #[test]
    fn test_user_and_profile_file_conflict() {
        let parsed = Cli::try_parse_from([
            "forum", "analyze", "AAPL", "--user", "u1", "--profile", "p.json",
        ]);
        assert!(parsed.is_err());
    }
}
