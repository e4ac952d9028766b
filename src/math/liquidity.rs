use crate::math::delta::{amount_delta_a, amount_delta_b, AmountDeltaError};
use crate::math::uint::{try_into_u128, U256};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum LiquidityMathError {
    #[error("liquidity {liquidity} minus {delta} underflows")]
    Underflow { liquidity: u128, delta: i128 },
    #[error("liquidity {liquidity} plus {delta} overflows")]
    Overflow { liquidity: u128, delta: i128 },
    #[error("liquidity does not fit in u128")]
    LiquidityTooHigh,
    #[error("sqrt price range is empty")]
    EmptyRange,
    #[error("amount delta error")]
    AmountDelta(#[from] AmountDeltaError),
}

/// Applies a signed liquidity delta, failing instead of wrapping.
pub fn add_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, LiquidityMathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(LiquidityMathError::Underflow { liquidity, delta })
    } else {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(LiquidityMathError::Overflow { liquidity, delta })
    }
}

/// Token A and B owed for `liquidity` over `[sqrt_price_lower, sqrt_price_upper]` at `sqrt_price`.
pub fn token_amounts_for_liquidity(
    liquidity: u128,
    sqrt_price: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    round_up: bool,
) -> Result<(u64, u64), LiquidityMathError> {
    if sqrt_price_lower >= sqrt_price_upper {
        return Err(LiquidityMathError::EmptyRange);
    }

    if sqrt_price <= sqrt_price_lower {
        let amount_a = amount_delta_a(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((amount_a, 0))
    } else if sqrt_price < sqrt_price_upper {
        let amount_a = amount_delta_a(sqrt_price, sqrt_price_upper, liquidity, round_up)?;
        let amount_b = amount_delta_b(sqrt_price_lower, sqrt_price, liquidity, round_up)?;
        Ok((amount_a, amount_b))
    } else {
        let amount_b = amount_delta_b(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((0, amount_b))
    }
}

/// Liquidity bought by `amount` of token A over a sqrt price range, rounded down.
pub fn liquidity_from_token_a(
    amount: u64,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
) -> Result<u128, LiquidityMathError> {
    if sqrt_price_lower >= sqrt_price_upper {
        return Err(LiquidityMathError::EmptyRange);
    }

    let product = U256::from(amount)
        .checked_mul(U256::from(sqrt_price_lower))
        .and_then(|p| p.checked_mul(U256::from(sqrt_price_upper)))
        .ok_or(LiquidityMathError::LiquidityTooHigh)?;
    let liquidity = (product / U256::from(sqrt_price_upper - sqrt_price_lower)) >> 64;

    try_into_u128(liquidity).ok_or(LiquidityMathError::LiquidityTooHigh)
}

/// Liquidity bought by `amount` of token B over a sqrt price range, rounded down.
pub fn liquidity_from_token_b(
    amount: u64,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
) -> Result<u128, LiquidityMathError> {
    if sqrt_price_lower >= sqrt_price_upper {
        return Err(LiquidityMathError::EmptyRange);
    }

    Ok((u128::from(amount) << 64) / (sqrt_price_upper - sqrt_price_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::sqrt_price::SQRT_PRICE_ONE;
    use crate::math::tick::tick_index_to_sqrt_price;
    use rstest::rstest;

    fn sqrt_price(tick: i32) -> u128 {
        tick_index_to_sqrt_price(tick).unwrap()
    }

    #[rstest]
    #[case(100, 50, 150)]
    #[case(100, -50, 50)]
    #[case(100, -100, 0)]
    #[case(0, 0, 0)]
    fn add_delta(#[case] liquidity: u128, #[case] delta: i128, #[case] expected: u128) {
        assert_eq!(add_liquidity_delta(liquidity, delta).unwrap(), expected);
    }

    #[test]
    fn add_delta_underflow() {
        assert_eq!(
            add_liquidity_delta(10_000_000, -12_000_000),
            Err(LiquidityMathError::Underflow {
                liquidity: 10_000_000,
                delta: -12_000_000
            })
        );
    }

    #[test]
    fn add_delta_overflow() {
        assert_eq!(
            add_liquidity_delta(u128::MAX, 1),
            Err(LiquidityMathError::Overflow {
                liquidity: u128::MAX,
                delta: 1
            })
        );
    }

    #[test]
    fn add_delta_min_i128() {
        assert_eq!(add_liquidity_delta(1 << 127, i128::MIN).unwrap(), 0);
    }

    mod token_amounts {
        use super::*;

        #[test]
        fn below_range_is_all_token_a() {
            let (a, b) = token_amounts_for_liquidity(
                10_000_000,
                sqrt_price(-64),
                SQRT_PRICE_ONE,
                sqrt_price(2816),
                true,
            )
            .unwrap();
            assert_eq!((a, b), (1_313_309, 0));
        }

        #[test]
        fn in_range_needs_both() {
            let (a, b) = token_amounts_for_liquidity(
                10_000_000,
                SQRT_PRICE_ONE,
                sqrt_price(-2816),
                sqrt_price(2816),
                true,
            )
            .unwrap();
            assert_eq!((a, b), (1_313_309, 1_313_309));
        }

        #[test]
        fn above_range_is_all_token_b() {
            let (a, b) = token_amounts_for_liquidity(
                10_000_000,
                sqrt_price(4000),
                SQRT_PRICE_ONE,
                sqrt_price(2816),
                false,
            )
            .unwrap();
            assert_eq!((a, b), (0, 1_511_862));
        }

        #[test]
        fn empty_range() {
            assert_eq!(
                token_amounts_for_liquidity(1, SQRT_PRICE_ONE, SQRT_PRICE_ONE, SQRT_PRICE_ONE, true),
                Err(LiquidityMathError::EmptyRange)
            );
        }
    }

    mod from_token {
        use super::*;

        #[test]
        fn token_a() {
            assert_eq!(
                liquidity_from_token_a(1_000_000, SQRT_PRICE_ONE, sqrt_price(2816)).unwrap(),
                7_614_356
            );
        }

        #[test]
        fn token_b() {
            assert_eq!(
                liquidity_from_token_b(1_000_000, sqrt_price(-2816), SQRT_PRICE_ONE).unwrap(),
                7_614_356
            );
        }

        #[test]
        fn empty_range() {
            assert_eq!(
                liquidity_from_token_b(1, SQRT_PRICE_ONE, SQRT_PRICE_ONE),
                Err(LiquidityMathError::EmptyRange)
            );
        }
    }
}
