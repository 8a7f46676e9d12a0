/// Upper four bits of `value`, shifted down.
pub(crate) fn high_nibble(value: u8) -> u8 {
    (value & 0xF0) >> 4
}

/// Lower four bits of `value`.
pub(crate) fn low_nibble(value: u8) -> u8 {
    value & 0x0F
}
