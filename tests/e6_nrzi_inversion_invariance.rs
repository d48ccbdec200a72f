//! E6 — NRZ-I inversion invariance: decoding a captured bitstream and its
//! bitwise complement (the other valid NRZ-I phase) yields the same
//! sector payloads, up to a possible one-frame shift in where the very
//! first sync lock lands (the initial channel level is undefined, so
//! flipping every bit can only ever disturb the single bit at position 0
//! — see `nrzi_decode_is_invariant_to_inversion_past_first_bit` in
//! `circ::decoder`).

use circfm::circ::decoder::{lines_to_bits, CircDecoder};
use circfm::{generators, CircEncoder};

#[test]
fn inverted_capture_decodes_to_the_same_trailing_sectors() {
    let pattern = generators::ramp_sector();

    let mut enc = CircEncoder::new();
    let mut lines = Vec::new();
    for _ in 0..6 {
        lines.extend(enc.queue(pattern, None));
    }
    let bits = lines_to_bits(&lines);
    let inverted: Vec<bool> = bits.iter().map(|&b| !b).collect();

    let sectors_a = CircDecoder::new().decode(&bits);
    let sectors_b = CircDecoder::new().decode(&inverted);

    assert!(!sectors_a.is_empty());
    assert!(!sectors_b.is_empty());

    // Compare the tail-most sectors common to both runs: any discrepancy
    // from the undefined initial level only ever affects which sector
    // gets dropped first, never the steady-state content.
    for (a, b) in sectors_a.iter().rev().zip(sectors_b.iter().rev()) {
        assert_eq!(a.sector, b.sector);
        assert_eq!(a.sector, pattern);
    }
}
