use alloy::primitives::{U256, U512};
use fastnum::{
    bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Decimals of the native token amounts (wei).
pub const ETH_DECIMALS: u8 = 18;

/// Decimals of the USD fixed-point values reported by the contract.
pub const USD_DECIMALS: u8 = 8;

/// Fractional digits kept when computing the completion percentage.
const PERCENT_DECIMALS: u32 = 8;

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Converter for native token amounts.
    pub fn eth() -> Self {
        Self::new(ETH_DECIMALS)
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned<const N: usize>(&self, value: UnsignedDecimal<N>) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }
}

/// Formats a fixed-point integer with `decimals` fractional digits,
/// trimming trailing zeros but keeping at least one fractional digit
/// (`1000000000000000000` with 18 decimals is `"1.0"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let (int, frac) = value.div_rem(scale);
    if decimals == 0 {
        return format!("{int}.0");
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{int}.0")
    } else {
        format!("{int}.{frac}")
    }
}

/// Formats a wei amount in ETH.
pub fn format_ether(value: U256) -> String {
    format_units(value, ETH_DECIMALS)
}

/// Formats a USD value scaled by 1e8 with exactly two decimals,
/// rounding half up.
pub fn format_usd(value: U256) -> String {
    let cents_divisor = U256::from(10u64).pow(U256::from(USD_DECIMALS - 2));
    let half = cents_divisor / U256::from(2u64);
    let cents = value.saturating_add(half) / cents_divisor;
    let (dollars, cents) = cents.div_rem(U256::from(100u64));
    format!("{dollars}.{:02}", cents.to::<u64>())
}

/// Completion percentage `jackpot * 100 / target`.
///
/// Computed on 512-bit integers with 8 fractional digits before converting
/// to `f64`. Not clamped; a zero target yields zero.
pub fn percent_complete(jackpot_usd: U256, target_usd: U256) -> f64 {
    if target_usd.is_zero() {
        return 0.0;
    }
    let scale = U512::from(10u64).pow(U512::from(PERCENT_DECIMALS));
    let scaled = U512::from(jackpot_usd) * U512::from(100u64) * scale / U512::from(target_usd);
    let (int, frac) = scaled.div_rem(scale);
    let int = u128::try_from(int).unwrap_or(u128::MAX);
    let frac = u128::try_from(frac).unwrap_or_default();
    int as f64 + frac as f64 / 10f64.powi(PERCENT_DECIMALS as i32)
}

/// Clamps a raw completion percentage into `[0, 100]` for display.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use fastnum::udec256;

    use super::*;

    #[test]
    fn test_numeric_converter_from_unsigned() {
        assert_eq!(
            Converter::new(0).from_unsigned(U256::from(1234567890)),
            udec256!(1234567890)
        );
        assert_eq!(
            Converter::eth().from_unsigned(U256::from(500_000_000_000_000_000u64)),
            udec256!(0.5)
        );
        assert_eq!(
            Converter::new(12).from_unsigned(U256::from(1234567890)),
            udec256!(0.00123456789)
        );
    }

    #[test]
    fn test_numeric_converter_to_unsigned() {
        assert_eq!(
            Converter::eth().to_unsigned(udec256!(1.5)),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(
            Converter::new(6).to_unsigned(udec256!(1234.56789)),
            U256::from(1234567890)
        );
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::from(1_000_000_000_000_000_000u64)), "1.0");
        assert_eq!(format_ether(U256::from(500_000_000_000_000_000u64)), "0.5");
        assert_eq!(format_ether(U256::from(1_230_000_000_000_000_001u64)), "1.230000000000000001");
        assert_eq!(format_ether(U256::ZERO), "0.0");
    }

    #[test]
    fn test_format_usd_rounds_to_cents() {
        assert_eq!(format_usd(U256::from(50_000_000_000u64)), "500.00");
        assert_eq!(format_usd(U256::from(123_456_789u64)), "1.23");
        assert_eq!(format_usd(U256::from(123_500_000u64)), "1.24");
        assert_eq!(format_usd(U256::from(99_999_999u64)), "1.00");
        assert_eq!(format_usd(U256::ZERO), "0.00");
    }

    #[test]
    fn test_percent_complete_is_unclamped() {
        let pct = percent_complete(U256::from(50_000_000_000u64), U256::from(220_000_000_000_000u64));
        assert!(pct > 0.0227 && pct < 0.0228, "got {pct}");

        let over = percent_complete(U256::from(300u64), U256::from(100u64));
        assert_eq!(over, 300.0);
        assert_eq!(clamp_percent(over), 100.0);

        assert_eq!(percent_complete(U256::from(1u64), U256::ZERO), 0.0);
    }

    #[test]
    fn test_percent_complete_survives_large_values() {
        let huge = U256::MAX / U256::from(1000u64);
        let pct = percent_complete(huge, huge);
        assert_eq!(pct, 100.0);
    }
}
