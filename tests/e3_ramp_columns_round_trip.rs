//! E3 — ramp columns: encode several copies of the "ramp" test pattern
//! (row `j` filled with byte value `j`), decode the resulting bitstream,
//! and check the de-interleaved sector bytes match the original pattern
//! for every sector past the warmup.

use circfm::circ::decoder::{lines_to_bits, CircDecoder};
use circfm::{generators, CircEncoder};

#[test]
fn ramp_pattern_round_trips_through_encode_and_decode() {
    // Surfaces the decoder's log::warn! anomaly diagnostics (sync loss,
    // bad merge bits, lost sectors) under RUST_LOG, same setup pattern
    // used by this pack's other codec crates for decoder-driving tests.
    env_logger::init();

    let pattern = generators::ramp_sector();

    let mut enc = CircEncoder::new();
    let mut lines = Vec::new();
    for _ in 0..6 {
        lines.extend(enc.queue(pattern, None));
    }

    let bits = lines_to_bits(&lines);
    let mut dec = CircDecoder::new();
    let sectors = dec.decode(&bits);

    assert_eq!(sectors.len(), 2);
    for sector in &sectors {
        assert_eq!(sector.sector, pattern);
    }
}
