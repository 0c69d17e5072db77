//! Conversion between human decimal amounts and smallest on-chain units.

use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::U256;

use crate::error::EthError;

/// Decimals of the native currency on every supported EVM chain.
pub const NATIVE_DECIMALS: u8 = 18;

/// Largest exponent for which `10^decimals` still fits in a `U256`.
const MAX_DECIMALS: u8 = 77;

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

fn check_decimals(decimals: u8) -> Result<(), EthError> {
    if decimals > MAX_DECIMALS {
        return Err(EthError::InvalidAmount(format!(
            "{decimals} decimals exceeds the uint256 range"
        )));
    }
    Ok(())
}

/// Validates a user-entered decimal string and returns it in canonical form
/// (`"1."` becomes `"1"`, `".5"` becomes `"0.5"`).
///
/// Rejects empty input, signs, exponents, separators and more fractional
/// digits than the asset can represent.
fn canonicalize(input: &str, decimals: u8) -> Result<String, EthError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EthError::InvalidAmount("amount is empty".into()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) || (int_part.is_empty() && frac_part.is_empty())
    {
        return Err(EthError::InvalidAmount(format!("{input:?} is not a decimal number")));
    }

    if frac_part.len() > decimals as usize {
        return Err(EthError::InvalidAmount(format!(
            "{input:?} has more than {decimals} fractional digits"
        )));
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{int_part}.{frac_part}"))
    }
}

/// Converts a decimal display amount (e.g. `"1.5"`) into smallest units
/// using the asset's declared decimals.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<U256, EthError> {
    check_decimals(decimals)?;
    let canonical = canonicalize(amount, decimals)?;

    let parsed = parse_units(&canonical, decimals)
        .map_err(|e| EthError::InvalidAmount(format!("{amount:?}: {e}")))?;
    if parsed.is_negative() {
        return Err(EthError::InvalidAmount(format!("{amount:?} is negative")));
    }
    Ok(parsed.get_absolute())
}

/// Converts a smallest-unit amount into an exact decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept (`"1.5"`, `"2.0"`), so no precision is lost.
pub fn to_display_unit(amount: U256, decimals: u8) -> Result<String, EthError> {
    check_decimals(decimals)?;
    if decimals == 0 {
        return Ok(amount.to_string());
    }

    let formatted = format_units(amount, decimals)
        .map_err(|e| EthError::EncodingError(format!("format units: {e}")))?;

    match formatted.split_once('.') {
        Some((int_part, frac_part)) => {
            let frac = frac_part.trim_end_matches('0');
            let frac = if frac.is_empty() { "0" } else { frac };
            Ok(format!("{int_part}.{frac}"))
        }
        None => Ok(format!("{formatted}.0")),
    }
}

/// Formats a smallest-unit amount with exactly `places` fractional digits,
/// rounding half up. Presentation only: the result is lossy.
pub fn round_display(amount: U256, decimals: u8, places: u8) -> Result<String, EthError> {
    check_decimals(decimals)?;
    check_decimals(places)?;

    let scaled = if decimals <= places {
        amount
            .checked_mul(pow10(places - decimals))
            .ok_or_else(|| EthError::InvalidAmount("amount overflows when scaled".into()))?
    } else {
        let step = pow10(decimals - places);
        let quotient = amount / step;
        let remainder = amount % step;
        if remainder >= step - remainder {
            quotient + U256::from(1u64)
        } else {
            quotient
        }
    };

    if places == 0 {
        return Ok(scaled.to_string());
    }

    let unit = pow10(places);
    let int_part = scaled / unit;
    let frac_part = (scaled % unit).to_string();
    Ok(format!("{int_part}.{frac_part:0>width$}", width = places as usize))
}
