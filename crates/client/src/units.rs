//! Lossless decimal rendering of token amounts.
//!
//! Token balances live in base units (wei for ETH) and routinely exceed
//! what a float can represent exactly, so both directions work on decimal
//! digit strings instead.

use crate::error::ClientError;
use alloy_primitives::U256;

/// Renders a base-unit amount as a decimal string scaled down by
/// `decimals`, with trailing fractional zeros (and the point itself, when
/// nothing remains behind it) stripped.
pub fn to_decimal(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    // Pad so at least one digit sits left of the point.
    let padded = if digits.len() > decimals {
        digits
    } else {
        format!("{digits:0>width$}", width = decimals + 1)
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

/// Parses a decimal amount string into base units scaled up by `decimals`.
///
/// The fractional part must fit in `decimals` digits; base units are
/// indivisible, so excess precision is an error rather than a rounding.
pub fn from_decimal(value: &str, decimals: u8) -> Result<U256, ClientError> {
    let invalid = || ClientError::InvalidDecimal(value.to_string());
    let decimals = decimals as usize;

    let (whole, frac) = match value.split_once('.') {
        Some(parts) => parts,
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) || frac.len() > decimals {
        return Err(invalid());
    }

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(decimals - frac.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_amounts_smaller_than_one() {
        assert_eq!(to_decimal(U256::from(2_200_000u64), 18), "0.0000000000022");
        assert_eq!(to_decimal(U256::from(1u64), 18), "0.000000000000000001");
    }

    #[test]
    fn renders_whole_amounts_without_a_point() {
        assert_eq!(to_decimal(U256::from(10u64).pow(U256::from(18u64)), 18), "1");
        assert_eq!(to_decimal(U256::ZERO, 18), "0");
        assert_eq!(to_decimal(U256::from(42u64), 0), "42");
    }

    #[test]
    fn strips_trailing_fractional_zeros() {
        assert_eq!(to_decimal(U256::from(1_500_000_000_000_000_000u64), 18), "1.5");
        assert_eq!(to_decimal(U256::from(1_234_500u64), 6), "1.2345");
    }

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(
            from_decimal("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(from_decimal("0.0000000000022", 18).unwrap(), U256::from(2_200_000u64));
        assert_eq!(from_decimal("42", 0).unwrap(), U256::from(42u64));
        assert_eq!(from_decimal("0", 18).unwrap(), U256::ZERO);
        assert_eq!(from_decimal(".5", 1).unwrap(), U256::from(5u64));
    }

    #[test]
    fn round_trips_through_base_units() {
        for text in ["1", "0.1", "123.456", "0.000000000000000001"] {
            let base = from_decimal(text, 18).unwrap();
            assert_eq!(to_decimal(base, 18), text);
        }
    }

    #[test]
    fn rejects_excess_precision() {
        let err = from_decimal("1.2345678", 6).unwrap_err();
        assert!(matches!(err, ClientError::InvalidDecimal(_)), "{err:?}");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", ".", "1.2.3", "1,5", "-1", "1e18", "abc"] {
            let err = from_decimal(bad, 18).unwrap_err();
            assert!(matches!(err, ClientError::InvalidDecimal(_)), "{bad}: {err:?}");
        }
    }
}
