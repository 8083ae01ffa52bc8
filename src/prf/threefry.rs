//! Threefry PRF family
//!
//! Add-rotate-xor generators derived from the Threefish block cipher
//! (Salmon et al. 2011). State words mix pairwise with data-independent
//! rotations; the extended key (the key words plus their parity-masked xor)
//! is injected every four rounds together with the injection index.
//!
//! The input block is counter words first, key words last: `n` of each for an
//! `n`-word output.
//!
//! The round functions are generic over an [`ArxLane`], which is either a
//! bare word or (with the `simd` feature) a `wide` vector holding one word of
//! several independent blocks per lane. The bulk path in
//! [`simd`](crate::prf::simd) reuses exactly the scalar algorithm, lane-wise.

use crate::prf::CounterPrf;
#[cfg(feature = "simd")]
use crate::prf::OutputOrder;
use crate::word::Word;

// Rotation schedules and key-schedule parity constants from the Random123
// distribution. For the 4-word variants the first eight entries drive one
// mixing pair and the second eight the other.
pub(crate) const THREEFRY_ROT_2X32: [u32; 8] = [13, 15, 26, 6, 17, 29, 16, 24];
pub(crate) const THREEFRY_ROT_2X64: [u32; 8] = [16, 42, 12, 31, 16, 32, 24, 21];
pub(crate) const THREEFRY_ROT_4X32: [u32; 16] =
    [10, 11, 13, 23, 6, 17, 25, 18, 26, 21, 27, 5, 20, 11, 10, 20];
pub(crate) const THREEFRY_ROT_4X64: [u32; 16] =
    [14, 52, 23, 5, 25, 46, 58, 32, 16, 57, 40, 37, 33, 12, 22, 32];

pub(crate) const THREEFRY_PARITY32: u32 = 0x1BD1_1BDA;
pub(crate) const THREEFRY_PARITY64: u64 = 0x1BD1_1BDA_A9FC_1A22;

/// One word-position of the ARX state: a scalar word, or a SIMD vector
/// carrying that word position for several independent blocks.
pub(crate) trait ArxLane: Copy {
    /// The underlying word type
    type Scalar: Word;

    /// Blocks processed per evaluation
    const LANES: usize;

    /// Broadcast a word to every lane
    fn splat(v: Self::Scalar) -> Self;

    /// Lane-wise wrapping addition
    fn wadd(self, rhs: Self) -> Self;

    /// Lane-wise xor
    fn xor(self, rhs: Self) -> Self;

    /// Lane-wise left rotation by `r` bits, `0 < r <` word width
    fn rotl(self, r: u32) -> Self;
}

impl ArxLane for u32 {
    type Scalar = u32;
    const LANES: usize = 1;

    #[inline(always)]
    fn splat(v: u32) -> Self {
        v
    }

    #[inline(always)]
    fn wadd(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn rotl(self, r: u32) -> Self {
        self.rotate_left(r)
    }
}

impl ArxLane for u64 {
    type Scalar = u64;
    const LANES: usize = 1;

    #[inline(always)]
    fn splat(v: u64) -> Self {
        v
    }

    #[inline(always)]
    fn wadd(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn rotl(self, r: u32) -> Self {
        self.rotate_left(r)
    }
}

/// Two-word Threefry: initial key injection, `R` mix rounds, extended-key
/// injection after every fourth round.
#[inline(always)]
pub(crate) fn threefry2_rounds<L: ArxLane, const R: usize>(
    ctr: [L; 2],
    key: [L; 2],
    rot: &[u32; 8],
    parity: L::Scalar,
) -> [L; 2] {
    let ks = [key[0], key[1], key[0].xor(key[1]).xor(L::splat(parity))];
    let mut c0 = ctr[0].wadd(ks[0]);
    let mut c1 = ctr[1].wadd(ks[1]);

    let mut r = 0;
    while r < R {
        c0 = c0.wadd(c1);
        c1 = c1.rotl(rot[r % 8]).xor(c0);
        r += 1;
        if r % 4 == 0 {
            let s = r / 4;
            c0 = c0.wadd(ks[s % 3]);
            c1 = c1
                .wadd(ks[(s + 1) % 3])
                .wadd(L::splat(L::Scalar::from_u64(s as u64)));
        }
    }

    [c0, c1]
}

/// Four-word Threefry. Even rounds mix (c0,c1) and (c2,c3); odd rounds mix
/// (c0,c3) and (c2,c1), so every word meets every other.
#[inline(always)]
pub(crate) fn threefry4_rounds<L: ArxLane, const R: usize>(
    ctr: [L; 4],
    key: [L; 4],
    rot: &[u32; 16],
    parity: L::Scalar,
) -> [L; 4] {
    let kp = key[0]
        .xor(key[1])
        .xor(key[2])
        .xor(key[3])
        .xor(L::splat(parity));
    let ks = [key[0], key[1], key[2], key[3], kp];

    let mut c0 = ctr[0].wadd(ks[0]);
    let mut c1 = ctr[1].wadd(ks[1]);
    let mut c2 = ctr[2].wadd(ks[2]);
    let mut c3 = ctr[3].wadd(ks[3]);

    let mut r = 0;
    while r < R {
        if r % 2 == 0 {
            c0 = c0.wadd(c1);
            c1 = c1.rotl(rot[r % 8]).xor(c0);
            c2 = c2.wadd(c3);
            c3 = c3.rotl(rot[8 + r % 8]).xor(c2);
        } else {
            c0 = c0.wadd(c3);
            c3 = c3.rotl(rot[r % 8]).xor(c0);
            c2 = c2.wadd(c1);
            c1 = c1.rotl(rot[8 + r % 8]).xor(c2);
        }
        r += 1;
        if r % 4 == 0 {
            let s = r / 4;
            c0 = c0.wadd(ks[s % 5]);
            c1 = c1.wadd(ks[(s + 1) % 5]);
            c2 = c2.wadd(ks[(s + 2) % 5]);
            c3 = c3
                .wadd(ks[(s + 3) % 5])
                .wadd(L::splat(L::Scalar::from_u64(s as u64)));
        }
    }

    [c0, c1, c2, c3]
}

macro_rules! threefry_prf {
    ($(#[$doc:meta])* $name:ident, $word:ty, 2, $rounds:literal, $rot:ident, $parity:ident, $bulk:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name<const R: usize = $rounds>;

        impl<const R: usize> CounterPrf for $name<R> {
            type Word = $word;
            type Input = [$word; 4];
            type Output = [$word; 2];

            #[inline]
            fn apply(input: &[$word; 4]) -> [$word; 2] {
                let [c0, c1, k0, k1] = *input;
                threefry2_rounds::<$word, R>([c0, c1], [k0, k1], &$rot, $parity)
            }

            #[cfg(feature = "simd")]
            fn generate_ordered<I>(inputs: I, out: &mut [$word], order: OutputOrder)
            where
                I: IntoIterator<Item = [$word; 4]>,
                I::IntoIter: ExactSizeIterator,
            {
                crate::prf::simd::$bulk::<R, _>(inputs.into_iter(), out, order);
            }
        }
    };
    ($(#[$doc:meta])* $name:ident, $word:ty, 4, $rounds:literal, $rot:ident, $parity:ident, $bulk:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name<const R: usize = $rounds>;

        impl<const R: usize> CounterPrf for $name<R> {
            type Word = $word;
            type Input = [$word; 8];
            type Output = [$word; 4];

            #[inline]
            fn apply(input: &[$word; 8]) -> [$word; 4] {
                let [c0, c1, c2, c3, k0, k1, k2, k3] = *input;
                threefry4_rounds::<$word, R>([c0, c1, c2, c3], [k0, k1, k2, k3], &$rot, $parity)
            }

            #[cfg(feature = "simd")]
            fn generate_ordered<I>(inputs: I, out: &mut [$word], order: OutputOrder)
            where
                I: IntoIterator<Item = [$word; 8]>,
                I::IntoIter: ExactSizeIterator,
            {
                crate::prf::simd::$bulk::<R, _>(inputs.into_iter(), out, order);
            }
        }
    };
}

threefry_prf!(
    /// Threefry 2x32: two 32-bit words per block, 20 rounds by default
    Threefry2x32, u32, 2, 20, THREEFRY_ROT_2X32, THREEFRY_PARITY32, threefry2x32_bulk
);
threefry_prf!(
    /// Threefry 4x32: four 32-bit words per block, 20 rounds by default
    Threefry4x32, u32, 4, 20, THREEFRY_ROT_4X32, THREEFRY_PARITY32, threefry4x32_bulk
);
threefry_prf!(
    /// Threefry 2x64: two 64-bit words per block, 20 rounds by default
    Threefry2x64, u64, 2, 20, THREEFRY_ROT_2X64, THREEFRY_PARITY64, threefry2x64_bulk
);
threefry_prf!(
    /// Threefry 4x64: four 64-bit words per block, 20 rounds by default
    Threefry4x64, u64, 4, 20, THREEFRY_ROT_4X64, THREEFRY_PARITY64, threefry4x64_bulk
);
