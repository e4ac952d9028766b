pub mod liquidity;
pub mod pool;
pub mod swap;
pub mod tick_array;
pub mod types;
pub mod util;
