pub mod delta;
pub mod liquidity;
pub mod muldiv;
pub mod sqrt_price;
pub mod swap;
pub mod tick;
pub mod uint;
