/// Set bit `bit` of `x` on if `toggle` is true, otherwise off.
pub fn bit(bit: u64, x: u64, toggle: bool) -> u64 {
    if toggle {
        x | (1 << bit)
    } else {
        x & !(1 << bit)
    }
}

/// Test whether bit `bit` of `x` is set.
pub fn test_bit(bit: u64, x: u64) -> bool {
    bit < 64 && (x >> bit) & 1 == 1
}

/// Positions of the set bits of `x`, lowest first.
pub fn set_bits(x: u64) -> impl Iterator<Item = u64> {
    (0..64).filter(move |&b| test_bit(b, x))
}

/// True when `x` has exactly one bit set.
pub fn is_single_bit(x: u64) -> bool {
    x != 0 && x & (x - 1) == 0
}
