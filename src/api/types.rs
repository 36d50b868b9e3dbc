use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Token metadata as embedded in pair and pair-day entities.
///
/// The subgraph encodes BigInt and BigDecimal fields as JSON strings, so the
/// numeric fields go through the string-or-number deserializers below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_u64_from_string_or_number")]
    pub decimals: u64,
    // BigInt that regularly exceeds u64, kept verbatim.
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub total_supply: String,
    #[serde(deserialize_with = "deserialize_f64_from_string_or_number")]
    pub trade_volume: f64,
    #[serde(rename = "tradeVolumeUSD", deserialize_with = "deserialize_f64_from_string_or_number")]
    pub trade_volume_usd: f64,
    #[serde(rename = "untrackedVolumeUSD", deserialize_with = "deserialize_f64_from_string_or_number")]
    pub untracked_volume_usd: f64,
    #[serde(deserialize_with = "deserialize_u64_from_string_or_number")]
    pub tx_count: u64,
    #[serde(deserialize_with = "deserialize_f64_from_string_or_number")]
    pub total_liquidity: f64,
    // Null until the token has been priced against ETH.
    #[serde(
        rename = "derivedETH",
        default,
        deserialize_with = "deserialize_option_f64_from_string_or_number"
    )]
    pub derived_eth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub id: String,
    pub token0: Token,
    pub token1: Token,
    #[serde(deserialize_with = "deserialize_u64_from_string_or_number")]
    pub created_at_timestamp: u64,
    #[serde(deserialize_with = "deserialize_u64_from_string_or_number")]
    pub created_at_block_number: u64,
}

/// One calendar day of activity for a pair. `id` is `<pairAddress>-<dayIndex>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDayData {
    pub id: String,
    pub pair_address: String,
    pub token0: Token,
    pub token1: Token,
    #[serde(deserialize_with = "deserialize_f64_from_string_or_number")]
    pub daily_volume_token0: f64,
    #[serde(deserialize_with = "deserialize_f64_from_string_or_number")]
    pub daily_volume_token1: f64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "deserialize_f64_from_string_or_number")]
    pub daily_volume_usd: f64,
    #[serde(deserialize_with = "deserialize_u64_from_string_or_number")]
    pub date: u64,
}

#[derive(Debug, Deserialize)]
pub struct PairsData {
    pub pairs: Vec<Pair>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDayDatasData {
    pub pair_day_datas: Vec<PairDayData>,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Accepts `"123"`, `123` or `123.0` and yields the textual form.
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_owned())
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

pub fn deserialize_f64_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = deserialize_string_or_number(deserializer)?;
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| de::Error::custom(format!("invalid decimal value: {}", raw)))?;
    if !value.is_finite() {
        return Err(de::Error::custom(format!("non-finite decimal value: {}", raw)));
    }
    Ok(value)
}

/// Like [`deserialize_f64_from_string_or_number`] but maps `null` to `None`.
pub fn deserialize_option_f64_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Decimal(#[serde(deserialize_with = "deserialize_f64_from_string_or_number")] f64);

    Ok(Option::<Decimal>::deserialize(deserializer)?.map(|Decimal(value)| value))
}

pub fn deserialize_u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = deserialize_string_or_number(deserializer)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| de::Error::custom(format!("invalid integer value: {}", raw)))
}
