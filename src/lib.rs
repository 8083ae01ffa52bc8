//! # cbrng
//!
//! **Counter-based random number generation for Rust.**
//!
//! cbrng provides the Philox and Threefry pseudo-random functions of Salmon
//! et al. ("Parallel Random Numbers: As Easy as 1, 2, 3", SC 2011) and a
//! counter-based engine that turns any of them into a `rand_core` generator.
//!
//! ## Why counter-based?
//!
//! A conventional PRNG hides a large mutable state behind every draw; stream
//! `k` of a simulation cannot be reproduced without replaying streams
//! `0..k`. A counter-based PRF has no state at all: output block `i` of a
//! stream is `prf(counter = i, key = stream)`, so any draw is computable
//! directly from its coordinates. Per-particle streams and exact replay
//! across thread counts come for free.
//!
//! - **Bit-exact**: all eight instantiations pass the published Random123
//!   known-answer vectors
//! - **Random access**: `discard(j)` seeks anywhere in a stream in O(1)
//! - **Bulk generation**: block fills run the Threefry rounds across SIMD
//!   lanes (`simd` feature, on by default)
//! - **Tiny state**: an engine is one PRF input block plus a read index
//!
//! ## Quick Start
//!
//! ```
//! use cbrng::prelude::*;
//!
//! // One engine per logical stream, seeded by stream coordinates.
//! let mut eng = Philox4x64Engine::from_seed_words(&[17, 4095]);
//!
//! let word = eng.next().unwrap();
//!
//! let mut block = [0u64; 1000];
//! eng.fill(&mut block).unwrap();
//!
//! // A second engine seeded the same way replays the identical stream.
//! let mut replay = Philox4x64Engine::from_seed_words(&[17, 4095]);
//! assert_eq!(replay.next().unwrap(), word);
//! ```
//!
//! ## Feature Flags
//!
//! - `simd` (default): vectorised Threefry bulk generation via `wide`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod prf;
pub mod word;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{
        CounterEngine, Philox2x32Engine, Philox2x64Engine, Philox4x32Engine, Philox4x64Engine,
        Threefry2x32Engine, Threefry2x64Engine, Threefry4x32Engine, Threefry4x64Engine,
    };
    pub use crate::error::{Error, Result};
    pub use crate::prf::philox::{Philox2x32, Philox2x64, Philox4x32, Philox4x64};
    pub use crate::prf::threefry::{Threefry2x32, Threefry2x64, Threefry4x32, Threefry4x64};
    pub use crate::prf::{CounterPrf, OutputOrder};
    pub use crate::word::{Block, Word};
}
