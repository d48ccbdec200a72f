//! E2 — all-zero audio: past the 3-sector warmup, every emitted CIRC line
//! is silence-shaped (`00x12 FFx4 00x12 FFx4`).

use circfm::CircEncoder;

#[test]
fn all_zero_input_emits_silent_lines_past_warmup() {
    let mut enc = CircEncoder::new();
    let mut lines = Vec::new();
    for _ in 0..10 {
        lines.extend(enc.queue([0u8; 2352], None));
    }

    assert_eq!(lines.len(), 7 * 98);
    for line in &lines {
        assert_eq!(&line.bytes[0..12], &[0u8; 12][..]);
        assert_eq!(&line.bytes[12..16], &[0xFFu8; 4][..]);
        assert_eq!(&line.bytes[16..28], &[0u8; 12][..]);
        assert_eq!(&line.bytes[28..32], &[0xFFu8; 4][..]);
    }
}
