//! Swap and liquidity quoting for ReDEX concentrated liquidity pools.
//!
//! Quotes are computed from a [`PoolState`] snapshot and the [`TickArray`]s around its price,
//! reproducing on-chain execution exactly.

pub mod errors;
pub mod math;
pub mod quoting;

pub use math::uint::U256;
pub use quoting::liquidity::{
    decrease_liquidity_quote, increase_liquidity_quote, increase_liquidity_quote_by_token_a,
    increase_liquidity_quote_by_token_b, DecreaseLiquidityQuote, IncreaseLiquidityQuote,
    LiquidityQuoteError,
};
pub use quoting::pool::{Mint, PoolConfig, PoolState};
pub use quoting::swap::{
    simulate_swap, swap_quote_by_input_token, swap_quote_by_output_token, SwapError,
};
pub use quoting::tick_array::{check_liquidity_conservation, Tick, TickArray};
pub use quoting::types::{CrossedTick, Quote, SwapParams};
