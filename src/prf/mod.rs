//! Counter-based pseudo-random functions
//!
//! A counter-based PRF is a pure function from a fixed-width input block to a
//! fixed-width output block: same input, same output, no state. Reproducible
//! parallel generation falls out of that purity, since any position in a
//! stream is computable directly from its index and a key with no sequential
//! dependency between draws.
//!
//! # Algorithms
//!
//! - [`philox`]: Philox, multiply-xor-rotate (Salmon et al. 2011)
//! - [`threefry`]: Threefry, ARX cipher derived from Threefish (Salmon et al. 2011)
//!
//! Both families come in 2- and 4-word tuples of 32- and 64-bit words, with
//! the round counts and constants of the Random123 distribution. All eight
//! instantiations are validated against published known-answer vectors.

pub mod philox;
#[cfg(feature = "simd")]
pub(crate) mod simd;
pub mod threefry;

use crate::word::{Block, Word};

/// Ordering of the words written by a bulk [`CounterPrf::generate_ordered`] call.
///
/// The vectorised Threefry path computes several independent blocks at once,
/// one block per SIMD lane. Storing them input-major requires a transpose;
/// permitting lane-major output skips it, emitting word `j` of every lane
/// before word `j + 1`. The two orderings write the same multiset of words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputOrder {
    /// All words of block 0, then all words of block 1, and so on
    #[default]
    InOrder,
    /// Within each vector group, word `j` of every block before word `j + 1`
    LaneMajor,
}

/// A stateless counter-based pseudo-random function.
///
/// Implementations are unit structs: the PRF carries no key and no mutable
/// state. The whole input (counter words first, key words last) arrives as
/// one block, and equal blocks always produce equal outputs. A PRF value is
/// therefore freely shareable across threads.
///
/// # Example
///
/// ```
/// use cbrng::prf::{philox::Philox2x64, CounterPrf};
///
/// let out = Philox2x64::<10>::apply(&[0, 0, 0]);
/// assert_eq!(out, [0xca00a0459843d731, 0x66c24222c9a845b5]);
/// ```
pub trait CounterPrf: Copy + Default + std::fmt::Debug + Send + Sync + 'static {
    /// Word type of both input and output blocks
    type Word: Word;

    /// Input block: counter words followed by key words
    type Input: Block<Self::Word>;

    /// Output block
    type Output: Block<Self::Word>;

    /// Words per input block
    const INPUT_WORDS: usize = <Self::Input as Block<Self::Word>>::WORDS;

    /// Words per output block
    const OUTPUT_WORDS: usize = <Self::Output as Block<Self::Word>>::WORDS;

    /// Bit width of every input and output word
    const WORD_BITS: u32 = <Self::Word as Word>::BITS;

    /// Evaluate the PRF on one input block.
    fn apply(input: &Self::Input) -> Self::Output;

    /// Evaluate the PRF on every block of `inputs`, writing
    /// [`OUTPUT_WORDS`](Self::OUTPUT_WORDS) words per block into `out`.
    ///
    /// `out.len()` must equal `inputs.len() * OUTPUT_WORDS`. Equivalent to a
    /// loop over [`apply`](Self::apply); implementations may batch
    /// independent blocks through SIMD lanes.
    fn generate<I>(inputs: I, out: &mut [Self::Word])
    where
        I: IntoIterator<Item = Self::Input>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::generate_ordered(inputs, out, OutputOrder::InOrder)
    }

    /// [`generate`](Self::generate) with an explicit output ordering.
    ///
    /// The default implementation evaluates blocks one at a time and always
    /// writes in order; `order` only changes the layout on implementations
    /// with a vectorised path.
    fn generate_ordered<I>(inputs: I, out: &mut [Self::Word], _order: OutputOrder)
    where
        I: IntoIterator<Item = Self::Input>,
        I::IntoIter: ExactSizeIterator,
    {
        let inputs = inputs.into_iter();
        assert_eq!(
            out.len(),
            inputs.len() * Self::OUTPUT_WORDS,
            "output slice length must match the number of input blocks"
        );
        for (block, chunk) in inputs.zip(out.chunks_exact_mut(Self::OUTPUT_WORDS)) {
            chunk.copy_from_slice(Self::apply(&block).as_ref());
        }
    }
}
