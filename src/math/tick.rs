use crate::math::uint::mul_u256;
use thiserror::Error;

pub const MIN_TICK_INDEX: i32 = -443636;
pub const MAX_TICK_INDEX: i32 = 443636;

/// Sqrt price of [`MIN_TICK_INDEX`] in Q64.64.
pub const MIN_SQRT_PRICE_X64: u128 = 4295048016;
/// Sqrt price of [`MAX_TICK_INDEX`] in Q64.64.
pub const MAX_SQRT_PRICE_X64: u128 = 79226673515401279992447579055;

/// Number of ticks stored by a single tick array.
pub const TICK_ARRAY_SIZE: i32 = 88;

/// Q96 values of sqrt(1.0001)^(2^i) for tick bits i = 1..=18.
const POSITIVE_TICK_FACTORS: [u128; 18] = [
    79236085330515764027303304731,
    79244008939048815603706035061,
    79259858533276714757314932305,
    79291567232598584799939703904,
    79355022692464371645785046466,
    79482085999252804386437311141,
    79736823300114093921829183326,
    80248749790819932309965073892,
    81282483887344747381513967011,
    83390072131320151908154831281,
    87770609709833776024991924138,
    97234110755111693312479820773,
    119332217159966728226237229890,
    179736315981702064433883588727,
    407748233172238350107850275304,
    2098478828474011932436660412517,
    55581415166113811149459800483533,
    38992368544603139932233054999993551,
];

/// Q64 values of sqrt(1.0001)^(-2^i) for tick bits i = 1..=18.
const NEGATIVE_TICK_FACTORS: [u128; 18] = [
    18444899583751176498,
    18443055278223354162,
    18439367220385604838,
    18431993317065449817,
    18417254355718160513,
    18387811781193591352,
    18329067761203520168,
    18212142134806087854,
    17980523815641551639,
    17526086738831147013,
    16651378430235024244,
    15030750278693429944,
    12247334978882834399,
    8131365268884726200,
    3584323654723342297,
    696457651847595233,
    26294789957452057,
    37481735321082,
];

const LOG_B_2_X32: i128 = 59543866431248;
const BIT_PRECISION: u32 = 14;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error, Hash)]
pub enum TickMathError {
    #[error("tick index {0} is outside [{MIN_TICK_INDEX}, {MAX_TICK_INDEX}]")]
    TickOutOfRange(i32),
    #[error("sqrt price {0} is outside [{MIN_SQRT_PRICE_X64}, {MAX_SQRT_PRICE_X64}]")]
    SqrtPriceOutOfRange(u128),
}

#[must_use]
pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

#[must_use]
pub fn is_sqrt_price_in_bounds(sqrt_price: u128) -> bool {
    (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price)
}

/// Sqrt price of a tick in Q64.64, bit-exact with the settlement program.
pub fn tick_index_to_sqrt_price(tick_index: i32) -> Result<u128, TickMathError> {
    if !is_tick_index_in_bounds(tick_index) {
        return Err(TickMathError::TickOutOfRange(tick_index));
    }

    if tick_index >= 0 {
        Ok(positive_tick_sqrt_price(tick_index))
    } else {
        Ok(negative_tick_sqrt_price(tick_index))
    }
}

fn positive_tick_sqrt_price(tick: i32) -> u128 {
    let mut ratio: u128 = if tick & 1 != 0 {
        79232123823359799118286999567
    } else {
        79228162514264337593543950336
    };

    for (i, factor) in POSITIVE_TICK_FACTORS.iter().enumerate() {
        if tick & (2 << i) != 0 {
            // both operands are Q96 below 2^128, so the shifted product fits back in u128
            ratio = (mul_u256(ratio, *factor) >> 96).low_u128();
        }
    }

    ratio >> 32
}

fn negative_tick_sqrt_price(tick: i32) -> u128 {
    let tick_abs = tick.unsigned_abs();

    let mut ratio: u128 = if tick_abs & 1 != 0 {
        18445821805675392311
    } else {
        18446744073709551616
    };

    for (i, factor) in NEGATIVE_TICK_FACTORS.iter().enumerate() {
        if tick_abs & (2 << i) != 0 {
            ratio = (ratio * factor) >> 64;
        }
    }

    ratio
}

/// Greatest tick whose sqrt price is at or below `sqrt_price`.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> Result<i32, TickMathError> {
    if !is_sqrt_price_in_bounds(sqrt_price) {
        return Err(TickMathError::SqrtPriceOutOfRange(sqrt_price));
    }

    // integer part of log2 from the most significant bit
    let msb: u32 = 127 - sqrt_price.leading_zeros();
    let log2p_integer_x32 = (i128::from(msb) - 64) << 32;

    // fractional part by repeated squaring of the normalised mantissa (Q1.63)
    let mut bit: i128 = 0x8000_0000_0000_0000;
    let mut precision = 0;
    let mut log2p_fraction_x64: i128 = 0;
    let mut r = if msb >= 64 {
        sqrt_price >> (msb - 63)
    } else {
        sqrt_price << (63 - msb)
    };

    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = r >> 127;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
        precision += 1;
    }

    let log2p_x32 = log2p_integer_x32 + (log2p_fraction_x64 >> 32);
    let logbp_x64 = log2p_x32 * LOG_B_2_X32;

    let out_of_range = |_| TickMathError::SqrtPriceOutOfRange(sqrt_price);
    let tick_low =
        i32::try_from((logbp_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64).map_err(out_of_range)?;
    let tick_high =
        i32::try_from((logbp_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64).map_err(out_of_range)?;

    if tick_low == tick_high {
        return Ok(tick_low);
    }

    // the estimate brackets the true tick; tick_high wins only if its price is not above the input
    match tick_index_to_sqrt_price(tick_high) {
        Ok(high_sqrt_price) if high_sqrt_price <= sqrt_price => Ok(tick_high),
        _ => Ok(tick_low),
    }
}

/// Rounds a tick to a multiple of `tick_spacing`, towards negative infinity unless `round_up`.
#[must_use]
pub fn initializable_tick_index_rounded(tick_index: i32, tick_spacing: u16, round_up: bool) -> i32 {
    let spacing = i32::from(tick_spacing);
    let floor = tick_index.div_euclid(spacing) * spacing;
    if round_up && floor != tick_index {
        floor + spacing
    } else {
        floor
    }
}

#[must_use]
pub fn initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    initializable_tick_index_rounded(tick_index, tick_spacing, false)
}

/// Closest initializable tick strictly below `tick_index`.
#[must_use]
pub fn prev_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let tick = initializable_tick_index(tick_index, tick_spacing);
    if tick == tick_index {
        tick - i32::from(tick_spacing)
    } else {
        tick
    }
}

/// Closest initializable tick strictly above `tick_index`.
#[must_use]
pub fn next_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    initializable_tick_index(tick_index, tick_spacing) + i32::from(tick_spacing)
}

#[must_use]
pub fn is_tick_initializable(tick_index: i32, tick_spacing: u16) -> bool {
    tick_index.rem_euclid(i32::from(tick_spacing)) == 0
}

/// Start tick of the tick array holding `tick_index`.
#[must_use]
pub fn tick_array_start_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let ticks_in_array = TICK_ARRAY_SIZE * i32::from(tick_spacing);
    tick_index.div_euclid(ticks_in_array) * ticks_in_array
}

/// Lowest and highest initializable ticks for a tick spacing.
#[must_use]
pub fn full_range_tick_indexes(tick_spacing: u16) -> (i32, i32) {
    let spacing = i32::from(tick_spacing);
    (
        (MIN_TICK_INDEX / spacing) * spacing,
        (MAX_TICK_INDEX / spacing) * spacing,
    )
}

#[must_use]
pub fn invert_tick_index(tick_index: i32) -> i32 {
    -tick_index
}

/// Sqrt price of the inverted pair, snapped to the enclosing tick.
pub fn invert_sqrt_price(sqrt_price: u128) -> Result<u128, TickMathError> {
    tick_index_to_sqrt_price(invert_tick_index(sqrt_price_to_tick_index(sqrt_price)?))
}
