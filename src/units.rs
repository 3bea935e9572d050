//! Token amount normalization and human readable stake formatting.
//!
//! Amounts arrive from the subgraph as 18-decimal fixed point integers
//! encoded as strings. They are parsed as arbitrary precision integers and
//! only converted to `f64` once split into whole units and remainder, so the
//! integer part survives intact for any value `f64` can represent. Beyond that
//! range the result is still an `f64` approximation.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::str::FromStr;

use crate::prelude::*;

pub const DECIMALS: u32 = 18;

/// MPond is worth this many POND when ranking stake.
pub const MPOND_TO_POND: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Pond,
    MPond,
}

impl Token {
    pub const POND_ID: &'static str =
        "0x5802add45f8ec0a524470683e7295faacc853f97cf4a8d3ffbaaf25ce0fd87c4";

    pub const MPOND_ID: &'static str =
        "0x1635815984abab0dbb9afd77984dad69c24bf3d711bc0ddb1e2d53ef2d523e5e";

    pub fn id(&self) -> &'static str {
        match self {
            Token::Pond => Self::POND_ID,
            Token::MPond => Self::MPOND_ID,
        }
    }

    /// Classifies a delegation token id; unknown ids are not stake we track.
    pub fn from_id(id: &str) -> Option<Self> {
        [Token::Pond, Token::MPond].into_iter().find(|x| x.id() == id)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Pond => "POND",
            Token::MPond => "MPOND",
        }
    }
}

/// Parses a raw fixed point amount without scaling it.
pub fn parse_amount(raw: &str) -> Result<BigInt, Error> {
    BigInt::from_str(raw).map_err(|e| Error::parse(format!("invalid token amount {raw:?}: {e}")))
}

/// Parses a raw integer amount and scales it down by 10^18.
pub fn to_token_units(raw: &str) -> Result<f64, Error> {
    scale_amount(&parse_amount(raw)?)
}

/// Scales an already parsed fixed point amount down by 10^18.
pub fn scale_amount(amount: &BigInt) -> Result<f64, Error> {
    let scale = BigInt::from(10u64).pow(DECIMALS);
    let whole = amount / &scale;
    let fraction = amount % &scale;

    let whole = whole
        .to_f64()
        .ok_or_else(|| Error::parse(format!("token amount {amount} out of range")))?;

    // remainder is below 10^18, always representable
    let fraction = fraction.to_f64().unwrap_or_default() / 10f64.powi(DECIMALS as i32);

    Ok(whole + fraction)
}

/// Renders a stake amount scaled to its magnitude. Values that are not finite
/// numbers are returned as they print, without a unit.
pub fn format_stake(value: f64, token: Token) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scaled = match token {
        Token::Pond if value > 1e6 => format!("{:.2}M", value / 1e6),
        Token::Pond if value > 1e3 => format!("{:.2}k", value / 1e3),
        Token::Pond => format!("{value:.2}"),
        Token::MPond => scientific(value, 3),
    };

    format!("{scaled} {}", token.symbol())
}

/// `printf`-style `%.Ne`: signed exponent with at least two digits.
fn scientific(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");

    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };

    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("{mantissa}e{sign}{:02}", exponent.abs())
}
