use crate::dashboard::params::{parse_created_after, DashboardParams, OrderDirection, PairDayOrderBy};
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)] // default location handled by Config::resolve
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one refresh cycle and print the table
    Fetch(FetchArgs),
    /// Serve the dashboard over HTTP
    Serve(ServeArgs),
}

/// Overrides for the six dashboard parameters.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamArgs {
    /// Maximum number of pairs and day records (1-1000)
    #[arg(long)]
    pub first: Option<u32>,

    /// dailyVolumeUSD, dailyVolumeToken0 or dailyVolumeToken1
    #[arg(long)]
    pub order_by: Option<PairDayOrderBy>,

    /// asc or desc
    #[arg(long)]
    pub order_direction: Option<OrderDirection>,

    /// Only pairs created after this (unix seconds, RFC 3339, YYYY-MM-DDTHH:MM:SS in UTC or YYYY-MM-DD)
    #[arg(long)]
    pub created_after: Option<String>,

    /// Only day records with more USD volume than this
    #[arg(long)]
    pub min_daily_volume_usd: Option<f64>,

    /// Only pairs created in this block
    #[arg(long)]
    pub block_number: Option<u64>,
}

impl ParamArgs {
    pub fn apply(&self, mut params: DashboardParams) -> Result<DashboardParams> {
        if let Some(first) = self.first {
            params.first = first;
        }
        if let Some(order_by) = self.order_by {
            params.order_by = order_by;
        }
        if let Some(direction) = self.order_direction {
            params.order_direction = direction;
        }
        if let Some(created_after) = &self.created_after {
            params.created_after = parse_created_after(created_after)?;
        }
        if let Some(volume) = self.min_daily_volume_usd {
            params.min_daily_volume_usd = volume;
        }
        if self.block_number.is_some() {
            params.created_at_block_number = self.block_number;
        }
        params.validate()?;
        Ok(params)
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Address to bind, overrides server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overrides server.port
    #[arg(long)]
    pub port: Option<u16>,
}
