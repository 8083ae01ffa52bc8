//! Round-trip tests for the textual engine state format
//!
//! The format is the input block followed by the read index, as
//! whitespace-separated decimals. State equality (input block + read index)
//! must survive the round trip from any reachable state.

use cbrng::prelude::*;

#[test]
fn test_roundtrip_fresh_engine() {
    let eng = Threefry4x64Engine::seed_from_u64(2026);
    let back: Threefry4x64Engine = eng.to_string().parse().unwrap();
    assert_eq!(eng, back);
}

#[test]
fn test_roundtrip_every_read_offset() {
    let mut eng = Philox4x64Engine::seed_from_u64(11);
    for step in 0..16 {
        let back: Philox4x64Engine = eng.to_string().parse().unwrap();
        assert_eq!(eng, back, "state mismatch after {step} draws");
        eng.next().unwrap();
    }
}

#[test]
fn test_roundtrip_after_discard_and_fill() {
    let mut eng = Philox2x32Engine::seed_from_u64(77);
    eng.discard(12345).unwrap();
    let mut buf = [0u32; 33];
    eng.fill(&mut buf).unwrap();

    let back: Philox2x32Engine = eng.to_string().parse().unwrap();
    assert_eq!(eng, back);
}

#[test]
fn test_roundtrip_exhausted_engine() {
    let mut eng = Threefry2x64Engine::seed_from_u64(3);
    eng.discard(u64::MAX).unwrap();
    eng.discard(u64::MAX).unwrap();
    eng.discard(2).unwrap();
    assert_eq!(eng.next(), Err(Error::Exhausted));

    let mut back: Threefry2x64Engine = eng.to_string().parse().unwrap();
    assert_eq!(eng, back);
    assert_eq!(back.next(), Err(Error::Exhausted));
}

#[test]
fn test_parsed_engine_continues_from_its_counter() {
    // After a restore the cache is rebuilt from the serialized input block,
    // so a parsed engine draws deterministically from its stored counter.
    let mut eng = Threefry2x32Engine::seed_from_u64(55);
    eng.next().unwrap();

    let mut a: Threefry2x32Engine = eng.to_string().parse().unwrap();
    let mut b: Threefry2x32Engine = eng.to_string().parse().unwrap();
    assert_eq!(a, b);
    for _ in 0..32 {
        assert_eq!(a.next().unwrap(), b.next().unwrap());
    }
    assert_eq!(a, b);
}

#[test]
fn test_format_shape() {
    let eng = Philox2x64Engine::from_seed_words(&[10, 20]);
    // Counter word, two seed words, read index.
    assert_eq!(eng.to_string(), "0 10 20 0");
    let parsed: Philox2x64Engine = "0 10 20 0".parse().unwrap();
    assert_eq!(parsed, eng);

    // Whitespace runs and a trailing newline are tolerated.
    let parsed: Philox2x64Engine = " 0  10\t20\n0\n".parse().unwrap();
    assert_eq!(parsed, eng);
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        "".parse::<Philox2x64Engine>(),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        "1 2".parse::<Philox2x64Engine>(),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        "1 2 3 0 junk".parse::<Philox2x64Engine>(),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(
        "1 2 -3 0".parse::<Philox2x64Engine>(),
        Err(Error::InvalidState { .. })
    ));
}
