use crate::math::swap::SwapStep;

// Parameters of a simulated swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapParams {
    pub amount: u64,
    /// Whether `amount` is paid in (exact input) or received (exact output).
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    pub slippage_tolerance_bps: u16,
    /// Price the swap may not move past. When set, running into it is not an error.
    pub sqrt_price_limit: Option<u128>,
}

impl SwapParams {
    #[must_use]
    pub fn exact_input(amount: u64, a_to_b: bool, slippage_tolerance_bps: u16) -> Self {
        Self {
            amount,
            amount_specified_is_input: true,
            a_to_b,
            slippage_tolerance_bps,
            sqrt_price_limit: None,
        }
    }

    #[must_use]
    pub fn exact_output(amount: u64, a_to_b: bool, slippage_tolerance_bps: u16) -> Self {
        Self {
            amount,
            amount_specified_is_input: false,
            a_to_b,
            slippage_tolerance_bps,
            sqrt_price_limit: None,
        }
    }

    #[must_use]
    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit: u128) -> Self {
        self.sqrt_price_limit = Some(sqrt_price_limit);
        self
    }
}

// An initialized tick the swap moved across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossedTick {
    pub tick_index: i32,
    pub liquidity_net: i128,
    /// Active liquidity once the tick is crossed.
    pub liquidity_after: u128,
}

// The expected result of a swap against a pool snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quote {
    pub amount: u64,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    /// Limit the swap ran against, the global bound if none was given.
    pub sqrt_price_limit: u128,
    /// Total paid in, fees included.
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    /// Minimum output for exact input swaps, maximum input for exact output swaps.
    pub other_amount_threshold: u64,
    pub end_sqrt_price: u128,
    pub end_tick_index: i32,
    pub end_liquidity: u128,
    pub fee_amount: u64,
    pub protocol_fee_amount: u64,
    /// Fee growth of the input token after the swap.
    pub end_fee_growth_global: u128,
    pub crossed_ticks: Vec<CrossedTick>,
    pub steps: Vec<SwapStep>,
}

impl Quote {
    /// Unfilled part of `amount`, only nonzero when a price limit stopped the swap.
    #[must_use]
    pub fn amount_remaining(&self) -> u64 {
        let filled = if self.amount_specified_is_input {
            self.estimated_amount_in
        } else {
            self.estimated_amount_out
        };
        self.amount.saturating_sub(filled)
    }

    #[must_use]
    pub fn is_partial_fill(&self) -> bool {
        self.amount_remaining() != 0
    }
}
