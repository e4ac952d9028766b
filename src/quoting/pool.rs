use crate::errors::{PoolConfigError, PoolStateError};
use crate::math::swap::PROTOCOL_FEE_RATE_DENOMINATOR;
use crate::math::tick::{
    is_sqrt_price_in_bounds, sqrt_price_to_tick_index, tick_index_to_sqrt_price,
};
use core::fmt;

/// 32-byte account address of a token mint.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mint(pub [u8; 32]);

impl fmt::Debug for Mint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mint(0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl From<[u8; 32]> for Mint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// Static parameters of a pool, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    pub tick_spacing: u16,
    /// Swap fee in hundredths of a basis point.
    pub fee_rate: u16,
    /// Share of the swap fee taken by the protocol, in basis points.
    pub protocol_fee_rate: u16,
}

impl PoolConfig {
    pub fn new(
        tick_spacing: u16,
        fee_rate: u16,
        protocol_fee_rate: u16,
    ) -> Result<Self, PoolConfigError> {
        let config = Self {
            tick_spacing,
            fee_rate,
            protocol_fee_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PoolConfigError> {
        if self.tick_spacing == 0 {
            return Err(PoolConfigError::ZeroTickSpacing);
        }
        if u128::from(self.protocol_fee_rate) > PROTOCOL_FEE_RATE_DENOMINATOR {
            return Err(PoolConfigError::ProtocolFeeRateTooHigh(
                self.protocol_fee_rate,
            ));
        }
        Ok(())
    }
}

/// Read-only snapshot of a pool account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolState {
    pub token_mint_a: Mint,
    pub token_mint_b: Mint,
    pub config: PoolConfig,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub liquidity: u128,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
}

impl PoolState {
    pub fn new(
        config: PoolConfig,
        sqrt_price: u128,
        tick_current_index: i32,
        liquidity: u128,
    ) -> Result<Self, PoolStateError> {
        let state = Self {
            token_mint_a: Mint::default(),
            token_mint_b: Mint::default(),
            config,
            sqrt_price,
            tick_current_index,
            liquidity,
            fee_growth_global_a: 0,
            fee_growth_global_b: 0,
        };
        state.validate()?;
        Ok(state)
    }

    #[must_use]
    pub fn with_token_mints(mut self, token_mint_a: Mint, token_mint_b: Mint) -> Self {
        self.token_mint_a = token_mint_a;
        self.token_mint_b = token_mint_b;
        self
    }

    #[must_use]
    pub fn with_fee_growth(mut self, fee_growth_global_a: u128, fee_growth_global_b: u128) -> Self {
        self.fee_growth_global_a = fee_growth_global_a;
        self.fee_growth_global_b = fee_growth_global_b;
        self
    }

    /// Checks the snapshot is internally consistent.
    ///
    /// The current tick is the one containing the sqrt price, except that a price sitting exactly
    /// on a tick after a downward crossing belongs to the tick below.
    pub fn validate(&self) -> Result<(), PoolStateError> {
        self.config.validate()?;

        if !is_sqrt_price_in_bounds(self.sqrt_price) {
            return Err(PoolStateError::SqrtPriceOutOfRange(self.sqrt_price));
        }

        let expected = sqrt_price_to_tick_index(self.sqrt_price)
            .map_err(|_| PoolStateError::SqrtPriceOutOfRange(self.sqrt_price))?;

        let on_boundary = tick_index_to_sqrt_price(expected) == Ok(self.sqrt_price);
        if self.tick_current_index == expected
            || (on_boundary && self.tick_current_index == expected - 1)
        {
            Ok(())
        } else {
            Err(PoolStateError::TickMismatch {
                tick_current_index: self.tick_current_index,
                expected,
            })
        }
    }

    /// Fee growth accumulator of the token paid into the pool.
    #[must_use]
    pub fn fee_growth_global(&self, a_to_b: bool) -> u128 {
        if a_to_b {
            self.fee_growth_global_a
        } else {
            self.fee_growth_global_b
        }
    }

    /// Swap direction when `mint` is paid into the pool, `None` for a foreign mint.
    #[must_use]
    pub fn a_to_b_for_input(&self, mint: &Mint) -> Option<bool> {
        if *mint == self.token_mint_a {
            Some(true)
        } else if *mint == self.token_mint_b {
            Some(false)
        } else {
            None
        }
    }
}
