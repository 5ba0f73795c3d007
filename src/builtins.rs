//! Conversions registered in every instance built with builtins enabled.
//!
//! Each one is an ordinary single-string parser; none of them is special to
//! the populator.

use std::error::Error as StdError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::error::EnvcfgError;
use crate::parser::IntoParser;
#[cfg(feature = "json")]
use crate::parser::ParserManifest;
use crate::registry::Registry;
use crate::types::{HardwareAddr, MailAddress, MailAddressList};

/// Register the built-in conversions into `registry`.
pub fn register_builtins(registry: &Registry) -> Result<(), EnvcfgError> {
    registry.register(from_str::<String>().into_manifest())?;
    registry.register(parse_bool.into_manifest())?;
    registry.register(from_str::<char>().into_manifest())?;

    registry.register(from_str::<i8>().into_manifest())?;
    registry.register(from_str::<i16>().into_manifest())?;
    registry.register(from_str::<i32>().into_manifest())?;
    registry.register(from_str::<i64>().into_manifest())?;
    registry.register(from_str::<i128>().into_manifest())?;
    registry.register(from_str::<isize>().into_manifest())?;
    registry.register(from_str::<u8>().into_manifest())?;
    registry.register(from_str::<u16>().into_manifest())?;
    registry.register(from_str::<u32>().into_manifest())?;
    registry.register(from_str::<u64>().into_manifest())?;
    registry.register(from_str::<u128>().into_manifest())?;
    registry.register(from_str::<usize>().into_manifest())?;
    registry.register(from_str::<f32>().into_manifest())?;
    registry.register(from_str::<f64>().into_manifest())?;

    registry.register(from_str::<PathBuf>().into_manifest())?;
    registry.register(from_str::<IpAddr>().into_manifest())?;
    registry.register(from_str::<Ipv4Addr>().into_manifest())?;
    registry.register(from_str::<Ipv6Addr>().into_manifest())?;
    registry.register(from_str::<SocketAddr>().into_manifest())?;
    registry.register(parse_duration.into_manifest())?;
    registry.register(from_str::<HardwareAddr>().into_manifest())?;
    registry.register(from_str::<MailAddress>().into_manifest())?;
    registry.register(from_str::<MailAddressList>().into_manifest())?;

    #[cfg(feature = "chrono")]
    {
        use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
        registry.register(DateTime::<FixedOffset>::parse_from_rfc3339.into_manifest())?;
        registry.register(
            (|s: &str| {
                DateTime::<FixedOffset>::parse_from_rfc3339(s)
                    .map(|when| when.with_timezone(&Utc))
            })
            .into_manifest(),
        )?;
        registry.register(from_str::<NaiveDate>().into_manifest())?;
    }

    #[cfg(feature = "url")]
    registry.register(from_str::<url::Url>().into_manifest())?;

    #[cfg(feature = "templates")]
    registry.register(from_str::<crate::types::Template>().into_manifest())?;

    Ok(())
}

fn from_str<T>() -> impl Fn(&str) -> Result<T, T::Err> + Send + Sync + 'static
where
    T: FromStr + Send + 'static,
    T::Err: StdError + Send + Sync + 'static,
{
    |s: &str| s.parse::<T>()
}

/// A conversion that reads a single string as JSON.
///
/// ```
/// let engine = envcfg::Envcfg::with_builtins();
/// engine.register_manifest(envcfg::json::<Vec<String>>()).unwrap();
/// ```
#[cfg(feature = "json")]
pub fn json<T>() -> ParserManifest
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    (|s: &str| serde_json::from_str::<T>(s)).into_manifest()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boolean {0:?}")]
pub struct ParseBoolError(String);

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, ParseBoolError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError(s.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("negative duration {0:?}")]
    Negative(String),
    #[error("duration {0:?} out of range")]
    Overflow(String),
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits kept per number. With the largest unit this bounds the
/// intermediate product well inside `u128` while staying below a
/// nanosecond of error.
const MAX_FRACTION_DIGITS: usize = 19;

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// A duration is a sequence of decimal numbers, each with an optional
/// fraction and a unit suffix: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
/// A bare `0` is also accepted. Negative durations are rejected, except
/// for a negative zero such as `-0s`.
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    match input.strip_prefix('-') {
        Some(body) => {
            let parsed = parse_unsigned_duration(body, input)?;
            if parsed.is_zero() {
                Ok(parsed)
            } else {
                Err(ParseDurationError::Negative(input.to_string()))
            }
        }
        None => parse_unsigned_duration(input.strip_prefix('+').unwrap_or(input), input),
    }
}

fn parse_unsigned_duration(body: &str, input: &str) -> Result<Duration, ParseDurationError> {
    let invalid = || ParseDurationError::Invalid(input.to_string());
    let overflow = || ParseDurationError::Overflow(input.to_string());

    if body == "0" {
        return Ok(Duration::ZERO);
    }
    if body.is_empty() {
        return Err(invalid());
    }

    let mut rest = body;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);
        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(frac) => {
                let frac_len = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
                frac.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remainder) = after_number.split_at(unit_len);
        let scale: u128 = match unit {
            "" => return Err(ParseDurationError::MissingUnit(input.to_string())),
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => {
                return Err(ParseDurationError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                });
            }
        };

        let whole = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u128>().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
            let frac = digits.parse::<u128>().map_err(|_| invalid())?;
            let divisor = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(frac * scale / divisor)
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = remainder;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| overflow())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
