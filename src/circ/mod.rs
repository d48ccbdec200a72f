//! The CIRC interleaver/de-interleaver: turns 2352-byte sectors (plus
//! optional 96-byte subchannel) into 33-symbol, 32-data-byte lines ready for
//! the EFM sink, and back.
//!
//! [`encoder::CircEncoder`] and [`decoder::CircDecoder`] share the
//! interleave constants defined here; both are grounded on the same design
//! table (spec section 3), so the decoder's de-interleave is derived as the
//! algebraic inverse of the encoder's gather rather than an independently
//! guessed table — see `DESIGN.md`.

pub mod decoder;
pub mod encoder;

use crate::efm::Symbol;

/// Number of RS parity bytes carried by both C1 and C2 (re-exported for
/// convenience; see [`crate::reed_solomon::NUM_PARITY`]).
pub const NUM_PARITY: usize = crate::reed_solomon::NUM_PARITY;

/// Frames per sector.
pub const FRAMES_PER_SECTOR: usize = 98;

/// Payload columns per sector (after de-interleave): 24 data bytes per row.
pub const DATA_COLUMNS: usize = 24;

/// `delayedLine[c]`: row delay (in frames, against the data-line offset of
/// [`DELAYED_OFFSET`]) applied when gathering payload column `c`.
pub const DELAYED_LINE: [usize; 24] = [
    106, 103, 98, 95, 90, 87, 82, 79, 74, 71, 66, 63, // P1 half
    44, 41, 36, 33, 29, 26, 20, 17, 12, 9, 5, 2, // P2 half
];

/// `swizzledColumn[c]`: which original sector column payload column `c`
/// actually reads from.
pub const SWIZZLED_COLUMN: [usize; 24] = [
    5, 4, 13, 12, 21, 20, 7, 6, 15, 14, 23, 22, // P1 half
    9, 8, 17, 16, 1, 0, 11, 10, 19, 18, 3, 2, // P2 half
];

/// `delayedC2Data[c]`: the row-delay C2 uses for its own gather of column
/// `c`, distinct from [`DELAYED_LINE`].
pub const DELAYED_C2_DATA: [usize; 24] = [
    107, 104, 99, 96, 91, 88, 83, 80, 75, 72, 67, 64,
    43, 40, 35, 32, 27, 24, 19, 16, 11, 8, 3, 0,
];

/// `delayedC2Locs[n]`: row delay used when computing C2 parity index `n`.
pub const DELAYED_C2_LOCS: [usize; NUM_PARITY] = [59, 56, 51, 48];

/// The smallest data-line delay offset that keeps a digital-data sync
/// pattern from splitting across the interleave; fixed per spec for
/// round-trip determinism (see `DESIGN.md`, Open Questions).
pub const DELAYED_OFFSET: usize = 2;

/// Decode-side C2 delay for each of the 28 symbols of a C2 codeword (P1[12]
/// · parity[4] · P2[12], in that order): `DELAYED_C2_DATA[0..12] ++
/// DELAYED_C2_LOCS ++ DELAYED_C2_DATA[12..24]`, matching the literal list
/// given in the design table.
pub const C2_DECODE_DELAYS: [usize; 28] = [
    107, 104, 99, 96, 91, 88, 83, 80, 75, 72, 67, 64,
    59, 56, 51, 48,
    43, 40, 35, 32, 27, 24, 19, 16, 11, 8, 3, 0,
];

/// Decode-side C1 delay for symbol `k` of the 32-symbol codeword: 0 for
/// even `k`, 1 for odd.
pub fn c1_decode_delay(k: usize) -> usize {
    k % 2
}

/// Inverse permutation of [`SWIZZLED_COLUMN`]: `inverse_swizzle()[oc]` is the
/// payload column `c` with `SWIZZLED_COLUMN[c] == oc`.
pub fn inverse_swizzle() -> &'static [usize; 24] {
    use std::sync::OnceLock;
    static INV: OnceLock<[usize; 24]> = OnceLock::new();
    INV.get_or_init(|| {
        let mut inv = [0usize; 24];
        for (c, &oc) in SWIZZLED_COLUMN.iter().enumerate() {
            inv[oc] = c;
        }
        inv
    })
}

/// One 33-symbol output line: a subchannel marker/byte, followed by the
/// 32 data bytes `P1[12] · C2[4] · P2[12] · C1[4]` (C2 and C1 stored
/// inverted, matching what actually gets transmitted).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    /// The frame's subchannel symbol: [`Symbol::S0`]/[`Symbol::S1`] for the
    /// first two frames of a sector, a subchannel data byte otherwise.
    pub subchannel_symbol: Symbol,
    /// The 32 data bytes of the line, in transmission order.
    pub bytes: [u8; 32],
}
