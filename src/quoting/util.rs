use thiserror::Error;

/// Slippage tolerances are expressed in basis points of the quoted amount.
pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum SlippageError {
    #[error("slippage tolerance {0} bps exceeds 10000")]
    InvalidSlippageTolerance(u16),
    #[error("slippage-adjusted amount does not fit in u64")]
    AmountOverflow,
}

fn check_slippage_tolerance(slippage_tolerance_bps: u16) -> Result<u64, SlippageError> {
    let bps = u64::from(slippage_tolerance_bps);
    if bps > BPS_DENOMINATOR {
        return Err(SlippageError::InvalidSlippageTolerance(slippage_tolerance_bps));
    }
    Ok(bps)
}

/// Smallest acceptable amount received, rounded down.
pub fn min_amount_with_slippage(
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<u64, SlippageError> {
    let bps = check_slippage_tolerance(slippage_tolerance_bps)?;
    let scaled =
        u128::from(amount) * u128::from(BPS_DENOMINATOR - bps) / u128::from(BPS_DENOMINATOR);
    u64::try_from(scaled).map_err(|_| SlippageError::AmountOverflow)
}

/// Largest acceptable amount paid, rounded up.
pub fn max_amount_with_slippage(
    amount: u64,
    slippage_tolerance_bps: u16,
) -> Result<u64, SlippageError> {
    let bps = check_slippage_tolerance(slippage_tolerance_bps)?;
    let scaled = (u128::from(amount) * u128::from(BPS_DENOMINATOR + bps))
        .div_ceil(u128::from(BPS_DENOMINATOR));
    u64::try_from(scaled).map_err(|_| SlippageError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(906_610, 100, 897_543)]
    #[case(904_435, 100, 895_390)]
    #[case(1_000, 0, 1_000)]
    #[case(1_000, 10_000, 0)]
    #[case(u64::MAX, 1, 18_444_899_399_302_180_659)]
    fn min_amount(#[case] amount: u64, #[case] bps: u16, #[case] expected: u64) {
        assert_eq!(min_amount_with_slippage(amount, bps), Ok(expected));
    }

    #[rstest]
    #[case(527_900, 100, 533_179)]
    #[case(994_541, 100, 1_004_487)]
    #[case(1, 1, 2)]
    #[case(1_000, 0, 1_000)]
    #[case(1_000, 10_000, 2_000)]
    fn max_amount(#[case] amount: u64, #[case] bps: u16, #[case] expected: u64) {
        assert_eq!(max_amount_with_slippage(amount, bps), Ok(expected));
    }

    #[test]
    fn max_amount_overflow() {
        assert_eq!(
            max_amount_with_slippage(u64::MAX, 1),
            Err(SlippageError::AmountOverflow)
        );
        assert_eq!(max_amount_with_slippage(u64::MAX, 0), Ok(u64::MAX));
    }

    #[test]
    fn invalid_tolerance() {
        assert_eq!(
            min_amount_with_slippage(1, 10_001),
            Err(SlippageError::InvalidSlippageTolerance(10_001))
        );
        assert_eq!(
            max_amount_with_slippage(1, u16::MAX),
            Err(SlippageError::InvalidSlippageTolerance(u16::MAX))
        );
    }
}
