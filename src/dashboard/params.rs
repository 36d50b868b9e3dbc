use crate::api::types::PairDayData;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::validation;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }

    /// Orients an ascending comparison to this direction.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            other => Err(Error::ValidationError(format!(
                "order direction must be asc or desc, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort fields accepted by the `pairs` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairOrderBy {
    #[default]
    #[serde(rename = "createdAtTimestamp")]
    CreatedAtTimestamp,
    #[serde(rename = "createdAtBlockNumber")]
    CreatedAtBlockNumber,
}

impl PairOrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairOrderBy::CreatedAtTimestamp => "createdAtTimestamp",
            PairOrderBy::CreatedAtBlockNumber => "createdAtBlockNumber",
        }
    }
}

impl fmt::Display for PairOrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort fields accepted by the `pairDayDatas` query and offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairDayOrderBy {
    #[default]
    #[serde(rename = "dailyVolumeUSD")]
    DailyVolumeUsd,
    #[serde(rename = "dailyVolumeToken0")]
    DailyVolumeToken0,
    #[serde(rename = "dailyVolumeToken1")]
    DailyVolumeToken1,
}

impl PairDayOrderBy {
    pub const ALL: [PairDayOrderBy; 3] = [
        PairDayOrderBy::DailyVolumeUsd,
        PairDayOrderBy::DailyVolumeToken0,
        PairDayOrderBy::DailyVolumeToken1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PairDayOrderBy::DailyVolumeUsd => "dailyVolumeUSD",
            PairDayOrderBy::DailyVolumeToken0 => "dailyVolumeToken0",
            PairDayOrderBy::DailyVolumeToken1 => "dailyVolumeToken1",
        }
    }

    pub fn key(&self, record: &PairDayData) -> f64 {
        match self {
            PairDayOrderBy::DailyVolumeUsd => record.daily_volume_usd,
            PairDayOrderBy::DailyVolumeToken0 => record.daily_volume_token0,
            PairDayOrderBy::DailyVolumeToken1 => record.daily_volume_token1,
        }
    }
}

impl FromStr for PairDayOrderBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        PairDayOrderBy::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::ValidationError(format!(
                    "order by must be one of dailyVolumeUSD, dailyVolumeToken0, dailyVolumeToken1, got {}",
                    wanted
                ))
            })
    }
}

impl fmt::Display for PairDayOrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six user-tunable inputs of a refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardParams {
    pub first: u32,
    pub order_by: PairDayOrderBy,
    pub order_direction: OrderDirection,
    /// Unix seconds; only pairs created strictly after this are listed.
    pub created_after: i64,
    pub min_daily_volume_usd: f64,
    pub created_at_block_number: Option<u64>,
}

impl DashboardParams {
    pub fn from_config(config: &DashboardConfig, now: DateTime<Utc>) -> Self {
        Self {
            first: config.first,
            order_by: config.order_by,
            order_direction: config.order_direction,
            created_after: now.timestamp() - i64::from(config.created_within_hours) * 3600,
            min_daily_volume_usd: config.min_daily_volume_usd,
            created_at_block_number: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_first(self.first)?;
        validation::validate_timestamp(self.created_after)?;
        validation::validate_min_volume(self.min_daily_volume_usd)?;
        Ok(())
    }
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default(), Utc::now())
    }
}

/// Wall-clock format of the `created_after` form field, in UTC.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a creation cutoff given as unix seconds, an RFC 3339 timestamp, a
/// UTC `YYYY-MM-DDTHH:MM[:SS]` wall-clock time or a `YYYY-MM-DD` date
/// (midnight UTC).
pub fn parse_created_after(input: &str) -> Result<i64> {
    let input = input.trim();
    if let Ok(seconds) = input.parse::<i64>() {
        return Ok(seconds);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Ok(datetime.timestamp());
    }
    // `datetime-local` form values, read as UTC. Browsers drop `:00` seconds.
    for format in [DATETIME_LOCAL_FORMAT, "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(datetime.and_utc().timestamp());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp());
        }
    }
    Err(Error::ValidationError(format!(
        "created-after must be unix seconds, RFC 3339, YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD, got {}",
        input
    )))
}
