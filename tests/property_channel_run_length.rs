//! Universal invariant 2 (spec.md section 8): for arbitrary data, every
//! interior run of identical NRZ-I levels in an EFM-encoded stream stays
//! within `[3, 11]`. Checked here over randomized symbol sequences rather
//! than one fixed pattern, since merge-bit selection depends on
//! cross-symbol context that a single example can't fully stress.

use circfm::bitsink::{unpack_bits, BitSink};
use circfm::efm::Symbol;
use proptest::prelude::*;

proptest! {
    #[test]
    fn interior_runs_stay_within_d2_k10(bytes in proptest::collection::vec(0u8..255, 8..200)) {
        let mut sink = BitSink::new();
        for &b in &bytes {
            sink.put_symbol(Symbol::Byte(b));
        }
        sink.finish();

        let bits = unpack_bits(sink.bits(), sink.bit_count());

        let mut runs = Vec::new();
        let mut cur = bits[0];
        let mut len = 1usize;
        for &b in &bits[1..] {
            if b == cur {
                len += 1;
            } else {
                runs.push(len);
                cur = b;
                len = 1;
            }
        }
        runs.push(len);

        for &run in &runs[1..runs.len() - 1] {
            prop_assert!((3..=11).contains(&run), "run length {} out of [3,11]", run);
        }
    }
}
