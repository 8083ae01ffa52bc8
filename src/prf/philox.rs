//! Philox PRF family
//!
//! Multiply-xor-rotate generators from Salmon et al., "Parallel Random
//! Numbers: As Easy as 1, 2, 3" (2011). Each round takes the full
//! double-width product of a counter word with a fixed multiplier and folds
//! the halves back with xors; the key words advance along a Weyl sequence
//! between rounds.
//!
//! The input block is counter words first, key words last: `n` counter words
//! and `n/2` key words for an `n`-word output.

use crate::prf::CounterPrf;
use crate::word::Word;

// Multiplier / Weyl-increment pairs per lane, from the Random123
// distribution. Entries alternate: multiplier for lane 0, Weyl step for key
// 0, multiplier for lane 1, Weyl step for key 1.
const PHILOX_M2X32: [u32; 2] = [0xD256_D193, 0x9E37_79B9];
const PHILOX_M4X32: [u32; 4] = [0xD251_1F53, 0x9E37_79B9, 0xCD9E_8D57, 0xBB67_AE85];
const PHILOX_M2X64: [u64; 2] = [0xD2B7_4407_B1CE_6E93, 0x9E37_79B9_7F4A_7C15];
const PHILOX_M4X64: [u64; 4] = [
    0xD2E7_470E_E14C_6C93,
    0x9E37_79B9_7F4A_7C15,
    0xCA5A_8263_9512_1157,
    0xBB67_AE85_84CA_A73B,
];

/// Two-word Philox rounds
#[inline(always)]
fn philox2_rounds<W: Word, const R: usize>(ctr: [W; 2], key: W, mw: &[W; 2]) -> [W; 2] {
    let [mut c0, mut c1] = ctr;
    let mut k0 = key;

    for _ in 0..R {
        let (hi, lo) = c0.mulhilo(mw[0]);
        c0 = hi ^ k0 ^ c1;
        c1 = lo;
        k0 = k0.wrapping_add(mw[1]);
    }

    [c0, c1]
}

/// Four-word Philox rounds
#[inline(always)]
fn philox4_rounds<W: Word, const R: usize>(ctr: [W; 4], key: [W; 2], mw: &[W; 4]) -> [W; 4] {
    let [mut c0, mut c1, mut c2, mut c3] = ctr;
    let [mut k0, mut k1] = key;

    for _ in 0..R {
        let (hi0, lo0) = c0.mulhilo(mw[0]);
        let (hi1, lo1) = c2.mulhilo(mw[2]);
        c0 = hi1 ^ c1 ^ k0;
        c1 = lo1;
        c2 = hi0 ^ c3 ^ k1;
        c3 = lo0;
        k0 = k0.wrapping_add(mw[1]);
        k1 = k1.wrapping_add(mw[3]);
    }

    [c0, c1, c2, c3]
}

macro_rules! philox_prf {
    ($(#[$doc:meta])* $name:ident, $word:ty, 2, $rounds:literal, $mw:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name<const R: usize = $rounds>;

        impl<const R: usize> CounterPrf for $name<R> {
            type Word = $word;
            type Input = [$word; 3];
            type Output = [$word; 2];

            #[inline]
            fn apply(input: &[$word; 3]) -> [$word; 2] {
                let [c0, c1, k0] = *input;
                philox2_rounds::<$word, R>([c0, c1], k0, &$mw)
            }
        }
    };
    ($(#[$doc:meta])* $name:ident, $word:ty, 4, $rounds:literal, $mw:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name<const R: usize = $rounds>;

        impl<const R: usize> CounterPrf for $name<R> {
            type Word = $word;
            type Input = [$word; 6];
            type Output = [$word; 4];

            #[inline]
            fn apply(input: &[$word; 6]) -> [$word; 4] {
                let [c0, c1, c2, c3, k0, k1] = *input;
                philox4_rounds::<$word, R>([c0, c1, c2, c3], [k0, k1], &$mw)
            }
        }
    };
}

philox_prf!(
    /// Philox 2x32: two 32-bit words per block, 10 rounds by default
    Philox2x32, u32, 2, 10, PHILOX_M2X32
);
philox_prf!(
    /// Philox 4x32: four 32-bit words per block, 10 rounds by default
    Philox4x32, u32, 4, 10, PHILOX_M4X32
);
philox_prf!(
    /// Philox 2x64: two 64-bit words per block, 10 rounds by default
    Philox2x64, u64, 2, 10, PHILOX_M2X64
);
philox_prf!(
    /// Philox 4x64: four 64-bit words per block, 10 rounds by default
    Philox4x64, u64, 4, 10, PHILOX_M4X64
);
