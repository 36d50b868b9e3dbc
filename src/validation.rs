use crate::error::{Error, Result};

/// Largest page the subgraph will serve for a single `first` argument.
pub const MAX_FIRST: u32 = 1000;

pub fn validate_first(first: u32) -> Result<()> {
    if first == 0 {
        return Err(Error::ValidationError("first must be at least 1".to_string()));
    }
    if first > MAX_FIRST {
        return Err(Error::ValidationError(format!(
            "first must not exceed {}, got {}",
            MAX_FIRST, first
        )));
    }
    Ok(())
}

pub fn validate_timestamp(timestamp: i64) -> Result<()> {
    if timestamp < 0 {
        return Err(Error::ValidationError(format!(
            "timestamp must not be negative, got {}",
            timestamp
        )));
    }
    Ok(())
}

pub fn validate_min_volume(volume: f64) -> Result<()> {
    if !volume.is_finite() {
        return Err(Error::ValidationError("minimum volume must be a finite number".to_string()));
    }
    if volume < 0.0 {
        return Err(Error::ValidationError(format!(
            "minimum volume must not be negative, got {}",
            volume
        )));
    }
    Ok(())
}

/// Checks a `0x`-prefixed 20-byte hex address and returns it lower-cased,
/// which is the form the subgraph uses for entity ids.
pub fn sanitize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::ValidationError(format!("address must start with 0x: {}", address)))?;
    if hex.len() != 40 {
        return Err(Error::ValidationError(format!(
            "address must have 40 hex digits: {}",
            address
        )));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::ValidationError(format!(
            "address contains non-hex characters: {}",
            address
        )));
    }
    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}

pub fn sanitize_addresses<'a, I>(addresses: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    addresses.into_iter().map(sanitize_address).collect()
}
