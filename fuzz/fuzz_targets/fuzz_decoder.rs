#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use utf8con::Decoder;

#[derive(Debug, Arbitrary)]
struct Input {
    split_seed: u64,
    single_bytes: bool,
    bytes: Vec<u8>,
}

/// Split `bytes` into chunks of at least one byte, sized by a deterministic
/// RNG so a crash reproduces from the input alone.
fn split(bytes: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut rng = SmallRng::seed_from_u64(split_seed);
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (head, tail) = rest.split_at(rng.random_range(1..=rest.len()));
        chunks.push(head);
        rest = tail;
    }
    chunks
}

fn decode(input: &Input) {
    let mut whole16 = Decoder::new(Vec::<u16>::new());
    let mut whole32 = Decoder::new(Vec::<u32>::new());
    whole16.process_bytes(&input.bytes).unwrap();
    whole32.process_bytes(&input.bytes).unwrap();

    let mut split16 = Decoder::new(Vec::<u16>::new());
    for chunk in split(&input.bytes, input.split_seed) {
        if input.single_bytes {
            for &byte in chunk {
                split16.process_byte(byte).unwrap();
            }
        } else {
            split16.process_bytes(chunk).unwrap();
        }
    }
    let whole16 = whole16.into_sink();
    assert_eq!(split16.into_sink(), whole16, "chunking changed the output");

    if let Ok(text) = std::str::from_utf8(&input.bytes) {
        assert!(whole16.iter().copied().eq(text.encode_utf16()));
        assert!(whole32.into_sink().iter().copied().eq(text.chars().map(u32::from)));
    }
}

fuzz_target!(|input: Input| decode(&input));
