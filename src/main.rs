use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use log::{error, info, warn};
use std::sync::Arc;

use pair_dashboard::api::SubgraphClient;
use pair_dashboard::cli::{Cli, Command, FetchArgs, ServeArgs};
use pair_dashboard::config::Config;
use pair_dashboard::dashboard::params::DashboardParams;
use pair_dashboard::dashboard::{CycleOutcome, Dashboard};
use pair_dashboard::server::{self, ServerState};
use pair_dashboard::{logging, render};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    logging::init(&config.logging, cli.debug)?;
    info!("Using subgraph endpoint {}", config.api.endpoint);

    let client = SubgraphClient::from_config(&config.api)?;
    match cli.command.unwrap_or(Command::Fetch(FetchArgs::default())) {
        Command::Fetch(args) => run_fetch(config, client, args).await,
        Command::Serve(args) => run_serve(config, client, args).await,
    }
}

async fn run_fetch(config: Config, client: SubgraphClient, args: FetchArgs) -> Result<()> {
    let params = args
        .params
        .apply(DashboardParams::from_config(&config.dashboard, Utc::now()))?;
    let dashboard = Dashboard::new(client, params.clone(), &config.dashboard);

    if let CycleOutcome::Failed { message, .. } = dashboard.apply_params(params).await? {
        error!("{}", message);
        return Err(anyhow::anyhow!(message));
    }

    let snapshot = dashboard.snapshot().await;
    let rows = render::rows(&snapshot.rows, &config.explorer);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render::render_text_table(&rows));
    }
    Ok(())
}

async fn run_serve(mut config: Config, client: SubgraphClient, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let params = args
        .params
        .apply(DashboardParams::from_config(&config.dashboard, Utc::now()))?;
    let dashboard = Dashboard::new(client, params.clone(), &config.dashboard);

    // Initial load; a failure here is shown on the page rather than aborting.
    match dashboard.apply_params(params).await? {
        CycleOutcome::Failed { message, .. } => warn!("Initial load failed: {}", message),
        outcome => info!("Initial load finished: {:?}", outcome),
    }

    let state = Arc::new(ServerState {
        dashboard,
        explorer: config.explorer.clone(),
        page_size: config.server.page_size,
    });
    server::serve(state, &config.server).await?;
    Ok(())
}
