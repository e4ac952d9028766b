uint::construct_uint! {
    pub struct U256(4);
}

/// Full-width product of two u128 values. Cannot overflow.
#[must_use]
pub fn mul_u256(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Shifts left by one 64-bit word, or `None` if the top word would be lost.
#[must_use]
pub fn checked_shift_word_left(value: U256) -> Option<U256> {
    if value.0[3] != 0 {
        None
    } else {
        Some(value << 64)
    }
}

#[must_use]
pub fn try_into_u128(value: U256) -> Option<u128> {
    if value.0[2] != 0 || value.0[3] != 0 {
        None
    } else {
        Some(value.low_u128())
    }
}

#[must_use]
pub fn try_into_u64(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) {
        None
    } else {
        Some(value.low_u64())
    }
}
