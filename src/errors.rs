//! Error types for constructing ReDEX pool snapshots.

use thiserror::Error;

/// Errors that can occur when constructing a PoolConfig.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum PoolConfigError {
    /// Tick spacing must be positive.
    #[error("tick spacing must be positive")]
    ZeroTickSpacing,
    /// The protocol cannot take more than the whole swap fee.
    #[error("protocol fee rate {0} exceeds 10000")]
    ProtocolFeeRateTooHigh(u16),
}

/// Errors that can occur when constructing a PoolState.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum PoolStateError {
    /// The pool configuration is invalid.
    #[error(transparent)]
    Config(#[from] PoolConfigError),
    /// Sqrt price must lie within the tick range.
    #[error("sqrt price {0} is out of range")]
    SqrtPriceOutOfRange(u128),
    /// The current tick does not correspond to the sqrt price.
    #[error("tick {tick_current_index} does not match sqrt price tick {expected}")]
    TickMismatch { tick_current_index: i32, expected: i32 },
}

/// Errors that can occur when constructing or reading TickArrays.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum TickArrayError {
    /// Tick spacing must be positive.
    #[error("tick spacing must be positive")]
    ZeroTickSpacing,
    /// Start index must be a multiple of the array width and cover part of the tick range.
    #[error("invalid tick array start {start_tick_index} for tick spacing {tick_spacing}")]
    InvalidStartTickIndex {
        start_tick_index: i32,
        tick_spacing: u16,
    },
    /// The tick lies outside the array.
    #[error("tick {tick_index} is not in the tick array starting at {start_tick_index}")]
    TickNotInArray {
        tick_index: i32,
        start_tick_index: i32,
    },
    /// The tick is not a multiple of the tick spacing or is outside the tick range.
    #[error("tick {tick_index} is not initializable with tick spacing {tick_spacing}")]
    TickNotInitializable { tick_index: i32, tick_spacing: u16 },
    /// All arrays supplied for a pool must share its tick spacing.
    #[error("tick array has tick spacing {actual}, pool uses {expected}")]
    TickSpacingMismatch { expected: u16, actual: u16 },
    /// Two arrays with the same start index were supplied.
    #[error("duplicate tick array starting at {start_tick_index}")]
    DuplicateTickArray { start_tick_index: i32 },
}
