//! Vectorised Threefry bulk generation
//!
//! Packs word `j` of several independent input blocks into lane `j` of a
//! 32-byte vector and runs the scalar round functions lane-wise. Leftover
//! blocks that do not fill a whole vector group fall back to the scalar
//! path, so the in-order output is bit-identical to a loop over `apply`.

use wide::{u32x8, u64x4};

use crate::prf::threefry::{
    threefry2_rounds, threefry4_rounds, ArxLane, THREEFRY_PARITY32, THREEFRY_PARITY64,
    THREEFRY_ROT_2X32, THREEFRY_ROT_2X64, THREEFRY_ROT_4X32, THREEFRY_ROT_4X64,
};
use crate::prf::OutputOrder;

impl ArxLane for u64x4 {
    type Scalar = u64;
    const LANES: usize = 4;

    #[inline(always)]
    fn splat(v: u64) -> Self {
        u64x4::splat(v)
    }

    #[inline(always)]
    fn wadd(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn rotl(self, r: u32) -> Self {
        (self << r) | (self >> (64 - r))
    }
}

impl ArxLane for u32x8 {
    type Scalar = u32;
    const LANES: usize = 8;

    #[inline(always)]
    fn splat(v: u32) -> Self {
        u32x8::splat(v)
    }

    #[inline(always)]
    fn wadd(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn rotl(self, r: u32) -> Self {
        (self << r) | (self >> (32 - r))
    }
}

macro_rules! threefry_bulk {
    ($name:ident, $word:ty, $vec:ty, $lanes:literal, 2, $rot:ident, $parity:ident) => {
        pub(crate) fn $name<const R: usize, I>(mut inputs: I, out: &mut [$word], order: OutputOrder)
        where
            I: ExactSizeIterator<Item = [$word; 4]>,
        {
            assert_eq!(
                out.len(),
                inputs.len() * 2,
                "output slice length must match the number of input blocks"
            );
            let mut pos = 0;

            while inputs.len() >= $lanes {
                let mut c0 = [0; $lanes];
                let mut c1 = [0; $lanes];
                let mut k0 = [0; $lanes];
                let mut k1 = [0; $lanes];
                for s in 0..$lanes {
                    if let Some(b) = inputs.next() {
                        c0[s] = b[0];
                        c1[s] = b[1];
                        k0[s] = b[2];
                        k1[s] = b[3];
                    }
                }

                let [r0, r1] = threefry2_rounds::<$vec, R>(
                    [<$vec>::new(c0), <$vec>::new(c1)],
                    [<$vec>::new(k0), <$vec>::new(k1)],
                    &$rot,
                    $parity,
                );
                let (r0, r1) = (r0.to_array(), r1.to_array());

                match order {
                    OutputOrder::InOrder => {
                        for s in 0..$lanes {
                            out[pos + 2 * s] = r0[s];
                            out[pos + 2 * s + 1] = r1[s];
                        }
                    }
                    OutputOrder::LaneMajor => {
                        out[pos..pos + $lanes].copy_from_slice(&r0);
                        out[pos + $lanes..pos + 2 * $lanes].copy_from_slice(&r1);
                    }
                }
                pos += 2 * $lanes;
            }

            for b in inputs {
                let res =
                    threefry2_rounds::<$word, R>([b[0], b[1]], [b[2], b[3]], &$rot, $parity);
                out[pos..pos + 2].copy_from_slice(&res);
                pos += 2;
            }
        }
    };
    ($name:ident, $word:ty, $vec:ty, $lanes:literal, 4, $rot:ident, $parity:ident) => {
        pub(crate) fn $name<const R: usize, I>(mut inputs: I, out: &mut [$word], order: OutputOrder)
        where
            I: ExactSizeIterator<Item = [$word; 8]>,
        {
            assert_eq!(
                out.len(),
                inputs.len() * 4,
                "output slice length must match the number of input blocks"
            );
            let mut pos = 0;

            while inputs.len() >= $lanes {
                let mut ctr = [[0; $lanes]; 4];
                let mut key = [[0; $lanes]; 4];
                for s in 0..$lanes {
                    if let Some(b) = inputs.next() {
                        for j in 0..4 {
                            ctr[j][s] = b[j];
                            key[j][s] = b[4 + j];
                        }
                    }
                }

                let res = threefry4_rounds::<$vec, R>(
                    [
                        <$vec>::new(ctr[0]),
                        <$vec>::new(ctr[1]),
                        <$vec>::new(ctr[2]),
                        <$vec>::new(ctr[3]),
                    ],
                    [
                        <$vec>::new(key[0]),
                        <$vec>::new(key[1]),
                        <$vec>::new(key[2]),
                        <$vec>::new(key[3]),
                    ],
                    &$rot,
                    $parity,
                );
                let res = [
                    res[0].to_array(),
                    res[1].to_array(),
                    res[2].to_array(),
                    res[3].to_array(),
                ];

                match order {
                    OutputOrder::InOrder => {
                        for s in 0..$lanes {
                            for j in 0..4 {
                                out[pos + 4 * s + j] = res[j][s];
                            }
                        }
                    }
                    OutputOrder::LaneMajor => {
                        for j in 0..4 {
                            out[pos + j * $lanes..pos + (j + 1) * $lanes]
                                .copy_from_slice(&res[j]);
                        }
                    }
                }
                pos += 4 * $lanes;
            }

            for b in inputs {
                let res = threefry4_rounds::<$word, R>(
                    [b[0], b[1], b[2], b[3]],
                    [b[4], b[5], b[6], b[7]],
                    &$rot,
                    $parity,
                );
                out[pos..pos + 4].copy_from_slice(&res);
                pos += 4;
            }
        }
    };
}

threefry_bulk!(threefry2x32_bulk, u32, u32x8, 8, 2, THREEFRY_ROT_2X32, THREEFRY_PARITY32);
threefry_bulk!(threefry4x32_bulk, u32, u32x8, 8, 4, THREEFRY_ROT_4X32, THREEFRY_PARITY32);
threefry_bulk!(threefry2x64_bulk, u64, u64x4, 4, 2, THREEFRY_ROT_2X64, THREEFRY_PARITY64);
threefry_bulk!(threefry4x64_bulk, u64, u64x4, 4, 4, THREEFRY_ROT_4X64, THREEFRY_PARITY64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prf::threefry::{Threefry2x32, Threefry2x64, Threefry4x32, Threefry4x64};
    use crate::prf::CounterPrf;

    fn blocks2x64(count: u64) -> Vec<[u64; 4]> {
        (0..count).map(|i| [i, i ^ 0xabcd, 42, 7 * i]).collect()
    }

    #[test]
    fn test_packed_matches_scalar_2x64() {
        // 23 blocks: five full vector groups plus a scalar tail.
        let blocks = blocks2x64(23);
        let mut packed = vec![0u64; 46];
        threefry2x64_bulk::<20, _>(blocks.iter().copied(), &mut packed, OutputOrder::InOrder);

        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(&packed[2 * i..2 * i + 2], Threefry2x64::<20>::apply(b).as_ref());
        }
    }

    #[test]
    fn test_packed_matches_scalar_4x64() {
        let blocks: Vec<[u64; 8]> = (0..19u64)
            .map(|i| [i, 1, 2, 3, 0x1BD1_1BDA, i * i, 5, 6])
            .collect();
        let mut packed = vec![0u64; 19 * 4];
        threefry4x64_bulk::<20, _>(blocks.iter().copied(), &mut packed, OutputOrder::InOrder);

        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(&packed[4 * i..4 * i + 4], Threefry4x64::<20>::apply(b).as_ref());
        }
    }

    #[test]
    fn test_packed_matches_scalar_2x32() {
        let blocks: Vec<[u32; 4]> = (0..27u32).map(|i| [i, !i, 3, i * 5]).collect();
        let mut packed = vec![0u32; 27 * 2];
        threefry2x32_bulk::<20, _>(blocks.iter().copied(), &mut packed, OutputOrder::InOrder);

        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(&packed[2 * i..2 * i + 2], Threefry2x32::<20>::apply(b).as_ref());
        }
    }

    #[test]
    fn test_packed_matches_scalar_4x32() {
        let blocks: Vec<[u32; 8]> = (0..21u32)
            .map(|i| [i, 0, i * 7, 0, 9, 9, 9, i])
            .collect();
        let mut packed = vec![0u32; 21 * 4];
        threefry4x32_bulk::<20, _>(blocks.iter().copied(), &mut packed, OutputOrder::InOrder);

        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(&packed[4 * i..4 * i + 4], Threefry4x32::<20>::apply(b).as_ref());
        }
    }

    #[test]
    fn test_lane_major_is_a_permutation() {
        let blocks = blocks2x64(16);
        let mut in_order = vec![0u64; 32];
        let mut lane_major = vec![0u64; 32];
        threefry2x64_bulk::<20, _>(blocks.iter().copied(), &mut in_order, OutputOrder::InOrder);
        threefry2x64_bulk::<20, _>(
            blocks.iter().copied(),
            &mut lane_major,
            OutputOrder::LaneMajor,
        );

        assert_ne!(in_order, lane_major);
        let mut a = in_order.clone();
        let mut b = lane_major.clone();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }
}
