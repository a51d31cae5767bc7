//! Fixed-width unsigned integer keys.

use std::fmt::Debug;
use std::hash::Hash;

/// Unsigned integer usable as an [`XFastTrie`](crate::XFastTrie) key.
///
/// The trie addresses keys bit by bit from the most significant configured
/// bit down to bit 0. Every operation here is a single shift or mask in the
/// native register width.
pub trait TrieKey: Copy + Ord + Hash + Debug {
    /// Native bit width of the type.
    const BITS: u32;

    /// Zero value, the prefix id of the root level.
    const ZERO: Self;

    /// Key shifted right by `shift` bits, or zero once `shift` reaches
    /// [`Self::BITS`].
    fn prefix(self, shift: u32) -> Self;

    /// Bit `n` of the key, where `0` is the least significant bit.
    fn bit(self, n: u32) -> bool;

    /// Widening conversion used for error reporting and size arithmetic.
    fn to_u128(self) -> u128;

    /// Whether the key is representable in `width` bits.
    #[inline]
    fn fits(self, width: u32) -> bool {
        self.prefix(width) == Self::ZERO
    }
}

macro_rules! impl_trie_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl TrieKey for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;

                #[inline(always)]
                fn prefix(self, shift: u32) -> Self {
                    self.checked_shr(shift).unwrap_or(0)
                }

                #[inline(always)]
                fn bit(self, n: u32) -> bool {
                    debug_assert!(n < Self::BITS, "bit index out of bounds");
                    (self >> n) & 1 == 1
                }

                #[inline(always)]
                fn to_u128(self) -> u128 {
                    self as u128
                }
            }
        )*
    };
}

impl_trie_key!(u8, u16, u32, u64, u128, usize);
