//! E5 — EFM symbol count: one sector's worth of emitted CIRC lines packs
//! to exactly 98 * 588 bits; nothing is emitted before the 3-sector
//! warmup fills.

use circfm::circ::decoder::lines_to_bits;
use circfm::CircEncoder;

#[test]
fn one_sector_of_lines_packs_to_98_times_588_bits() {
    let mut enc = CircEncoder::new();

    assert!(enc.queue([0x11; 2352], None).is_empty());
    assert!(enc.queue([0x22; 2352], None).is_empty());
    let lines = enc.queue([0x33; 2352], None);

    assert_eq!(lines.len(), 98);
    let bits = lines_to_bits(&lines);
    assert_eq!(bits.len(), 98 * 588);
}
