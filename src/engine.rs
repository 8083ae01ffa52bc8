//! Counter-based uniform random bit generator
//!
//! [`CounterEngine`] adapts a stateless [`CounterPrf`] to the sequential
//! generator interface statistical distributions consume. Its entire state is
//! one PRF input block (a multi-word counter followed by the seed words)
//! plus the most recent output block and an index into it. Because the next
//! output depends only on that input block, engines can be seeded per logical
//! stream (one per `(timestep, particle)`, say) and advanced independently,
//! in parallel, or out of order via [`discard`](CounterEngine::discard).
//!
//! The counter is a little-endian multi-word integer occupying the first `C`
//! input words. When it wraps, the engine is exhausted: every further draw
//! reports [`Error::Exhausted`] until the engine is re-seeded.

use std::fmt;
use std::str::FromStr;

use rand_core::RngCore;

use crate::error::{Error, Result};
use crate::prf::philox::{Philox2x32, Philox2x64, Philox4x32, Philox4x64};
use crate::prf::threefry::{Threefry2x32, Threefry2x64, Threefry4x32, Threefry4x64};
use crate::prf::CounterPrf;
use crate::word::{Block, Word};

/// Philox 2x32 engine with a 64-bit counter and one 32-bit seed word
pub type Philox2x32Engine = CounterEngine<Philox2x32, 2>;
/// Philox 4x32 engine with a 64-bit counter and four 32-bit seed words
pub type Philox4x32Engine = CounterEngine<Philox4x32, 2>;
/// Philox 2x64 engine with a 64-bit counter and two 64-bit seed words
pub type Philox2x64Engine = CounterEngine<Philox2x64, 1>;
/// Philox 4x64 engine with a 64-bit counter and five 64-bit seed words
pub type Philox4x64Engine = CounterEngine<Philox4x64, 1>;
/// Threefry 2x32 engine with a 64-bit counter and two 32-bit seed words
pub type Threefry2x32Engine = CounterEngine<Threefry2x32, 2>;
/// Threefry 4x32 engine with a 64-bit counter and six 32-bit seed words
pub type Threefry4x32Engine = CounterEngine<Threefry4x32, 2>;
/// Threefry 2x64 engine with a 64-bit counter and three 64-bit seed words
pub type Threefry2x64Engine = CounterEngine<Threefry2x64, 1>;
/// Threefry 4x64 engine with a 64-bit counter and seven 64-bit seed words
pub type Threefry4x64Engine = CounterEngine<Threefry4x64, 1>;

/// SplitMix64, the ecosystem's standard seed-expansion stream.
///
/// Plays the seed-sequence role: an arbitrary integer seed expands into as
/// many 32-bit values as the engine's seed words need.
struct SplitMix64 {
    state: u64,
    spare: Option<u32>,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_u32(&mut self) -> u32 {
        if let Some(hi) = self.spare.take() {
            return hi;
        }
        let x = self.next_u64();
        self.spare = Some((x >> 32) as u32);
        x as u32
    }
}

/// A stateful generator over the output sequence of a counter-based PRF.
///
/// `C` is the counter width in words; the remaining
/// `P::INPUT_WORDS - C` words of the input block hold the seed. The engine
/// produces `P::OUTPUT_WORDS · 2^(C · word_bits)` words and then reports
/// [`Error::Exhausted`] until re-seeded.
///
/// Engines compare equal exactly when their input blocks and read positions
/// agree, and [`Display`](fmt::Display)/[`FromStr`] round-trip that state as
/// whitespace-separated decimals.
///
/// # Example
///
/// ```
/// use cbrng::engine::Philox4x64Engine;
///
/// let mut a = Philox4x64Engine::seed_from_u64(12345);
/// let mut b = Philox4x64Engine::seed_from_u64(12345);
///
/// b.discard(1000).unwrap();
/// for _ in 0..1000 {
///     a.next().unwrap();
/// }
/// assert_eq!(a, b);
/// assert_eq!(a.next().unwrap(), b.next().unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct CounterEngine<P: CounterPrf, const C: usize> {
    input: P::Input,
    cache: P::Output,
    ridx: usize,
}

impl<P: CounterPrf, const C: usize> CounterEngine<P, C> {
    /// Words in the PRF input block
    pub const INPUT_WORDS: usize = P::INPUT_WORDS;

    /// Words per cached output block
    pub const OUTPUT_WORDS: usize = P::OUTPUT_WORDS;

    /// Seed words following the counter in the input block
    pub const SEED_WORDS: usize = P::INPUT_WORDS - C;

    const COUNTER_WIDTH_OK: () = assert!(
        C >= 1 && C <= P::INPUT_WORDS,
        "counter width must be between 1 and the PRF input width"
    );

    /// Engine with every state word zero and no cached block.
    fn zeroed() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::COUNTER_WIDTH_OK;
        Self {
            input: P::Input::zeroed(),
            cache: P::Output::zeroed(),
            ridx: 0,
        }
    }

    /// Default-seeded engine, equivalent to `seed_from_u64(0)`.
    pub fn new() -> Self {
        Self::seed_from_u64(0)
    }

    /// Engine seeded by expanding `state` through SplitMix64.
    pub fn seed_from_u64(state: u64) -> Self {
        let mut engine = Self::zeroed();
        engine.reseed_from_u64(state);
        engine
    }

    /// Engine seeded from explicit words.
    ///
    /// Up to [`SEED_WORDS`](Self::SEED_WORDS) words are copied; missing words
    /// are zero.
    pub fn from_seed_words(words: &[P::Word]) -> Self {
        let mut engine = Self::zeroed();
        engine.reseed_from_words(words);
        engine
    }

    /// Re-seed in place with the default seed.
    pub fn reseed(&mut self) {
        self.reseed_from_u64(0);
    }

    /// Re-seed in place, expanding `state` through SplitMix64.
    ///
    /// The stream is drawn 32 bits at a time and packed little-end first
    /// into each seed word. The counter and read position reset to zero.
    pub fn reseed_from_u64(&mut self, state: u64) {
        let mut sm = SplitMix64::new(state);
        let chunks = P::WORD_BITS.div_ceil(32);
        for slot in self.input.as_mut()[C..].iter_mut() {
            let mut acc = 0u64;
            for j in 0..chunks {
                acc |= (sm.next_u32() as u64) << (32 * j);
            }
            *slot = P::Word::from_u64(acc);
        }
        self.restart();
    }

    /// Re-seed in place from explicit words.
    pub fn reseed_from_words(&mut self, words: &[P::Word]) {
        for (i, slot) in self.input.as_mut()[C..].iter_mut().enumerate() {
            *slot = words.get(i).copied().unwrap_or(P::Word::ZERO);
        }
        self.restart();
    }

    /// Zero the counter and read position, keeping the installed seed.
    fn restart(&mut self) {
        for w in self.input.as_mut()[..C].iter_mut() {
            *w = P::Word::ZERO;
        }
        self.ridx = 0;
    }

    /// The installed seed words.
    pub fn seed_words(&self) -> &[P::Word] {
        &self.input.as_ref()[C..]
    }

    fn counter_is_zero(&self) -> bool {
        self.input.as_ref()[..C].iter().all(|w| *w == P::Word::ZERO)
    }

    /// Add `delta` blocks to the counter. Returns true when the addition
    /// carried out of the top counter word, i.e. the logical `C · word_bits`
    /// bit counter wrapped.
    fn counter_add(input: &mut P::Input, delta: u64) -> bool {
        let mut carry = delta as u128;
        for w in input.as_mut()[..C].iter_mut() {
            if carry == 0 {
                return false;
            }
            let sum = w.to_u64() as u128 + (carry & P::Word::MAX.to_u64() as u128);
            *w = P::Word::from_u64(sum as u64);
            carry = (carry >> P::Word::BITS) + (sum >> P::Word::BITS);
        }
        carry != 0
    }

    /// PRF blocks still available before the counter wraps, saturating at
    /// `u64::MAX`. The distance is the two's-complement negation of the
    /// counter over its `C` words; a zero counter has the whole period left.
    fn blocks_left(&self) -> u64 {
        let words = &self.input.as_ref()[..C];
        if words.iter().all(|w| *w == P::Word::ZERO) {
            let bits = C as u32 * P::Word::BITS;
            return if bits < 64 { 1u64 << bits } else { u64::MAX };
        }

        let per = P::Word::BITS;
        let low_limbs = (64 / per) as usize;
        let mut carry: u128 = 1;
        let mut dist = 0u64;
        let mut beyond_u64 = false;
        for (i, w) in words.iter().enumerate() {
            let neg = ((!w.to_u64() & P::Word::MAX.to_u64()) as u128) + carry;
            carry = neg >> per;
            let limb = neg as u64 & P::Word::MAX.to_u64();
            if i < low_limbs {
                dist |= limb << (i as u32 * per);
            } else {
                beyond_u64 |= limb != 0;
            }
        }
        if beyond_u64 {
            u64::MAX
        } else {
            dist
        }
    }

    /// Output words still available, saturating well above any slice length.
    fn remaining_words(&self) -> u128 {
        let n = Self::OUTPUT_WORDS;
        if self.ridx == n {
            return 0;
        }
        let cached = if self.ridx == 0 { 0 } else { n - self.ridx } as u128;
        if self.ridx > 0 && self.counter_is_zero() {
            // The cached block was the last one of the period.
            return cached;
        }
        cached + self.blocks_left() as u128 * n as u128
    }

    /// Move to the canonical exhausted state: counter zero, read position at
    /// the block length. All exhausted engines of one type compare equal.
    fn exhaust(&mut self) {
        for w in self.input.as_mut()[..C].iter_mut() {
            *w = P::Word::ZERO;
        }
        self.ridx = Self::OUTPUT_WORDS;
    }

    /// Draw the next output word.
    ///
    /// # Errors
    ///
    /// [`Error::Exhausted`] once the counter has wrapped; re-seed to recover.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<P::Word> {
        let n = Self::OUTPUT_WORDS;
        if self.ridx >= n {
            return Err(Error::Exhausted);
        }
        if self.ridx == 0 {
            self.cache = P::apply(&self.input);
            Self::counter_add(&mut self.input, 1);
        }
        let word = self.cache.as_ref()[self.ridx];
        self.ridx += 1;
        if self.ridx == n && !self.counter_is_zero() {
            self.ridx = 0;
        }
        Ok(word)
    }

    /// Fill `out` with the next `out.len()` output words.
    ///
    /// Exactly equivalent to drawing each word with [`next`](Self::next),
    /// but whole blocks between the cached prefix and the tail go through
    /// the PRF's bulk path over a lazily counted input sequence; no
    /// intermediate input storage is allocated.
    ///
    /// # Errors
    ///
    /// [`Error::Exhausted`] if fewer than `out.len()` words remain in the
    /// period. The engine is left exhausted and `out` untouched.
    pub fn fill(&mut self, out: &mut [P::Word]) -> Result<()> {
        let n = Self::OUTPUT_WORDS;
        if out.is_empty() {
            return Ok(());
        }
        if out.len() as u128 > self.remaining_words() {
            self.exhaust();
            return Err(Error::Exhausted);
        }

        let mut pos = 0;

        // Drain the cached suffix.
        if self.ridx > 0 {
            let take = (n - self.ridx).min(out.len());
            out[..take].copy_from_slice(&self.cache.as_ref()[self.ridx..self.ridx + take]);
            self.ridx += take;
            pos = take;
            if self.ridx < n {
                return Ok(());
            }
            if self.counter_is_zero() {
                // Period ended exactly at the cached block's end; the
                // capacity check above guarantees the request is satisfied.
                return Ok(());
            }
            self.ridx = 0;
            if pos == out.len() {
                return Ok(());
            }
        }

        // Whole blocks, generated from a lazy run of counter values.
        let nprf = (out.len() - pos) / n;
        if nprf > 0 {
            let blocks = CounterBlocks::<P, C> {
                input: self.input,
                remaining: nprf as u64,
            };
            P::generate(blocks, &mut out[pos..pos + nprf * n]);
            Self::counter_add(&mut self.input, nprf as u64);
            pos += nprf * n;
        }

        // Partial tail block.
        let tail = out.len() - pos;
        if tail > 0 {
            self.cache = P::apply(&self.input);
            Self::counter_add(&mut self.input, 1);
            out[pos..].copy_from_slice(&self.cache.as_ref()[..tail]);
            self.ridx = tail;
        } else if self.counter_is_zero() {
            // The bulk run consumed the final block of the period.
            self.ridx = n;
        }
        Ok(())
    }

    /// Advance by `jump` output words without computing the skipped values.
    ///
    /// After `discard(j)`, the engine is in exactly the state that `j`
    /// successful [`next`](Self::next) calls would have produced, at cost
    /// `O(1)` PRF evaluations.
    ///
    /// # Errors
    ///
    /// - [`Error::Exhausted`] if the engine is already exhausted.
    /// - [`Error::DiscardOverflow`] if the jump would step the counter past
    ///   its wrap; the engine is left in the canonical exhausted state.
    pub fn discard(&mut self, jump: u64) -> Result<()> {
        let n = Self::OUTPUT_WORDS;
        if self.ridx == n {
            return Err(Error::Exhausted);
        }

        let total = self.ridx as u128 + jump as u128;
        let adv = (total / n as u128) as u64;
        let new_off = (total % n as u128) as usize;

        if self.ridx > 0 {
            // Offsets are relative to the cached block, which sits one
            // behind the stored counter.
            if new_off > 0 {
                if adv > 0 {
                    if Self::counter_add(&mut self.input, adv - 1) {
                        self.exhaust();
                        return Err(Error::DiscardOverflow { jump });
                    }
                    self.cache = P::apply(&self.input);
                    Self::counter_add(&mut self.input, 1);
                }
                self.ridx = new_off;
            } else {
                // new_off == 0 implies adv >= 1 here.
                if Self::counter_add(&mut self.input, adv - 1) {
                    if self.counter_is_zero() {
                        // Landed exactly on the period boundary.
                        self.ridx = n;
                    } else {
                        self.exhaust();
                        return Err(Error::DiscardOverflow { jump });
                    }
                } else {
                    self.ridx = 0;
                }
            }
        } else {
            // The stored counter is the next unevaluated block.
            if new_off > 0 {
                if Self::counter_add(&mut self.input, adv) {
                    self.exhaust();
                    return Err(Error::DiscardOverflow { jump });
                }
                self.cache = P::apply(&self.input);
                Self::counter_add(&mut self.input, 1);
                self.ridx = new_off;
            } else if Self::counter_add(&mut self.input, adv) {
                if self.counter_is_zero() {
                    self.ridx = n;
                } else {
                    self.exhaust();
                    return Err(Error::DiscardOverflow { jump });
                }
            }
        }
        Ok(())
    }
}

/// Lazy run of PRF input blocks with successive counter values.
///
/// Yields the engine's input block with the counter field stepping by one
/// per item; the bulk fill path iterates this instead of materialising
/// `O(N)` inputs.
struct CounterBlocks<P: CounterPrf, const C: usize> {
    input: P::Input,
    remaining: u64,
}

impl<P: CounterPrf, const C: usize> Iterator for CounterBlocks<P, C> {
    type Item = P::Input;

    fn next(&mut self) -> Option<P::Input> {
        if self.remaining == 0 {
            return None;
        }
        let block = self.input;
        let mut carry = true;
        for w in self.input.as_mut()[..C].iter_mut() {
            if !carry {
                break;
            }
            *w = w.wrapping_add(P::Word::ONE);
            carry = *w == P::Word::ZERO;
        }
        self.remaining -= 1;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl<P: CounterPrf, const C: usize> ExactSizeIterator for CounterBlocks<P, C> {}

impl<P: CounterPrf, const C: usize> Default for CounterEngine<P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CounterPrf, const C: usize> PartialEq for CounterEngine<P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.input == other.input && self.ridx == other.ridx
    }
}

impl<P: CounterPrf, const C: usize> Eq for CounterEngine<P, C> {}

impl<P: CounterPrf, const C: usize> fmt::Display for CounterEngine<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.input.as_ref() {
            write!(f, "{} ", w)?;
        }
        write!(f, "{}", self.ridx)
    }
}

impl<P: CounterPrf, const C: usize> FromStr for CounterEngine<P, C> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let mut engine = Self::zeroed();
        for slot in engine.input.as_mut().iter_mut() {
            let token = tokens.next().ok_or(Error::InvalidState {
                reason: "missing state word",
            })?;
            *slot = P::Word::from_str_dec(token).ok_or(Error::InvalidState {
                reason: "unparseable state word",
            })?;
        }
        let ridx: usize = tokens
            .next()
            .ok_or(Error::InvalidState {
                reason: "missing result index",
            })?
            .parse()
            .map_err(|_| Error::InvalidState {
                reason: "unparseable result index",
            })?;
        if ridx > Self::OUTPUT_WORDS {
            return Err(Error::InvalidState {
                reason: "result index out of range",
            });
        }
        if tokens.next().is_some() {
            return Err(Error::InvalidState {
                reason: "trailing data after state",
            });
        }
        engine.ridx = ridx;
        if ridx != 0 {
            engine.cache = P::apply(&engine.input);
        }
        Ok(engine)
    }
}

/// `rand_core` integration.
///
/// The infallible methods panic on counter exhaustion (unreachable before
/// `2^64` draws for the default engines); [`RngCore::try_fill_bytes`]
/// surfaces it as an error instead.
impl<P: CounterPrf, const C: usize> RngCore for CounterEngine<P, C> {
    fn next_u32(&mut self) -> u32 {
        self.draw().to_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        if P::WORD_BITS == 64 {
            self.draw().to_u64()
        } else {
            let lo = self.draw().to_u64();
            let hi = self.draw().to_u64();
            lo | (hi << 32)
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let bytes = (P::WORD_BITS / 8) as usize;
        for chunk in dest.chunks_mut(bytes) {
            let le = self.draw().to_u64().to_le_bytes();
            chunk.copy_from_slice(&le[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        let bytes = (P::WORD_BITS / 8) as usize;
        for chunk in dest.chunks_mut(bytes) {
            let word = self.next().map_err(rand_core::Error::new)?;
            let le = word.to_u64().to_le_bytes();
            chunk.copy_from_slice(&le[..chunk.len()]);
        }
        Ok(())
    }
}

impl<P: CounterPrf, const C: usize> CounterEngine<P, C> {
    /// `next()` for the infallible `RngCore` surface.
    fn draw(&mut self) -> P::Word {
        self.next()
            .expect("counter-based engine exhausted; reseed to continue")
    }
}
