//! Streaming CIRC encoder: sectors in, interleaved 33-symbol lines out.
//!
//! Mirrors the ring-buffer architecture of the design table directly: a
//! 3-deep ring of not-yet-emitted sectors (the "future" data the interleave
//! reads ahead into) and a 59-row ring of already-emitted data lines (the
//! "past" data the interleaved C2/C1 gathers read behind into, pre-filled
//! with silence so the very first lines out are valid, if garbage-prefixed).

use std::collections::VecDeque;

use super::{Line, DATA_COLUMNS, DELAYED_C2_DATA, DELAYED_C2_LOCS, DELAYED_LINE, DELAYED_OFFSET,
    FRAMES_PER_SECTOR, NUM_PARITY, SWIZZLED_COLUMN};
use crate::efm::Symbol;
use crate::reed_solomon;

const FUTURE_SECTORS: usize = 3;
const PAST_ROWS: usize = 59;

/// One already-emitted data line kept in the past ring: `P1[12] · c2v[4]
/// (stored inverted) · P2[12]`, 28 bytes.
type PastRow = [u8; 28];

fn silent_past_row() -> PastRow {
    let mut row = [0u8; 28];
    row[12..16].copy_from_slice(&[0xFF; NUM_PARITY]);
    row
}

/// Streaming CIRC encoder. Feed sectors with [`CircEncoder::queue`]; once 3
/// are buffered it starts returning 98 lines per call, oldest sector first.
pub struct CircEncoder {
    future: VecDeque<([u8; 2352], Option<[u8; 96]>)>,
    /// Most recently emitted row at the front, oldest (59 rows back) at the
    /// back.
    past: VecDeque<PastRow>,
}

impl CircEncoder {
    /// Build an encoder with the past ring pre-filled with silence.
    pub fn new() -> CircEncoder {
        let mut past = VecDeque::with_capacity(PAST_ROWS);
        past.resize(PAST_ROWS, silent_past_row());

        CircEncoder { future: VecDeque::with_capacity(FUTURE_SECTORS), past }
    }

    /// Enqueue one sector (plus optional subchannel). Returns the 98 lines
    /// for the oldest buffered sector once 3 sectors are buffered;
    /// otherwise returns an empty vector and simply retains the input.
    pub fn queue(&mut self, sector: [u8; 2352], subchannel: Option<[u8; 96]>) -> Vec<Line> {
        self.future.push_back((sector, subchannel));
        if self.future.len() < FUTURE_SECTORS {
            return Vec::new();
        }

        let lines = (0..FRAMES_PER_SECTOR).map(|i| self.produce_line(i)).collect();
        self.future.pop_front();
        lines
    }

    fn future_byte(&self, row: usize, col: usize) -> u8 {
        let sector_idx = row / FRAMES_PER_SECTOR;
        let row_in_sector = row % FRAMES_PER_SECTOR;
        self.future[sector_idx].0[row_in_sector * DATA_COLUMNS + col]
    }

    fn subchannel_byte(&self, i: usize) -> u8 {
        match &self.future[0].1 {
            Some(sub) => sub[i - 2],
            None => 0,
        }
    }

    fn push_past(&mut self, row: PastRow) {
        self.past.push_front(row);
        self.past.pop_back();
    }

    /// Gather the 24-byte C2 message for parity index `n`, optionally
    /// shifted by `extra` rows (used by the future-C2 lookahead in
    /// [`Self::produce_line`]).
    fn gather_c2_message(&self, i: usize, n: usize, extra: i64) -> [u8; DATA_COLUMNS] {
        let loc = DELAYED_C2_LOCS[n] as i64 + extra;
        let mut msg = [0u8; DATA_COLUMNS];

        for c in 0..12 {
            let row = 59 - (DELAYED_C2_DATA[c] as i64 - loc);
            msg[c] = self.past[row as usize][c];
        }
        for c in 12..24 {
            let row = DELAYED_LINE[c] as i64 + i as i64 + (loc - DELAYED_C2_DATA[c] as i64)
                - DELAYED_OFFSET as i64;
            msg[c] = self.future_byte(row as usize, SWIZZLED_COLUMN[c]);
        }

        msg
    }

    /// Gather the P1/P2 halves of a 28-byte C1 message. `pass1` selects the
    /// delay-1 pass (delay `1 - c%2`) versus the delay-0 pass (delay `c%2`,
    /// with odd columns read from the outgoing past-ring row 58 instead of
    /// the future ring, since that delay has already fallen out of the
    /// buffered lookahead window).
    fn gather_c1_halves(&self, i: usize, pass1: bool) -> ([u8; 12], [u8; 12]) {
        let mut p1 = [0u8; 12];
        let mut p2 = [0u8; 12];

        for c in 0..24 {
            let delay = if pass1 { 1 - (c % 2) } else { c % 2 };
            let byte = if !pass1 && c % 2 == 1 {
                let past_col = if c < 12 { c } else { c + 4 };
                self.past[58][past_col]
            } else {
                let row =
                    DELAYED_LINE[c] as i64 + i as i64 + delay as i64 - DELAYED_OFFSET as i64;
                self.future_byte(row as usize, SWIZZLED_COLUMN[c])
            };

            if c < 12 {
                p1[c] = byte;
            } else {
                p2[c - 12] = byte;
            }
        }

        (p1, p2)
    }

    fn produce_line(&mut self, i: usize) -> Line {
        let subchannel_symbol = match i {
            0 => Symbol::S0,
            1 => Symbol::S1,
            _ => Symbol::Byte(self.subchannel_byte(i)),
        };

        let mut p1 = [0u8; 12];
        let mut p2 = [0u8; 12];
        for c in 0..12 {
            let row = DELAYED_LINE[c] as i64 + i as i64 - DELAYED_OFFSET as i64;
            p1[c] = self.future_byte(row as usize, SWIZZLED_COLUMN[c]);
        }
        for c in 12..24 {
            let row = DELAYED_LINE[c] as i64 + i as i64 - DELAYED_OFFSET as i64;
            p2[c - 12] = self.future_byte(row as usize, SWIZZLED_COLUMN[c]);
        }

        // Step 3: one gather + encode per C2 parity index, each at its own
        // time-skew.
        let mut c2v = [0u8; NUM_PARITY];
        for n in 0..NUM_PARITY {
            let msg = self.gather_c2_message(i, n, 0);
            c2v[n] = reed_solomon::encode_c2_index(&msg, n) ^ 0xFF;
        }

        // Step 4: future C2 at parity indices {0, 2}, one row further out,
        // uninverted — what the delay-1 C1 pass needs for its own gather.
        let c2f0 = reed_solomon::encode_c2_index(&self.gather_c2_message(i, 0, 1), 0);
        let c2f2 = reed_solomon::encode_c2_index(&self.gather_c2_message(i, 2, 1), 2);

        // Step 5: C1, two passes.
        let mut c1v = [0u8; NUM_PARITY];
        {
            let (d1_p1, d1_p2) = self.gather_c1_halves(i, true);
            let c2_insert = [c2f0, c2v[1] ^ 0xFF, c2f2, c2v[3] ^ 0xFF];
            let msg = c1_message(d1_p1, c2_insert, d1_p2);
            let parity = reed_solomon::encode_c1(&msg);
            c1v[1] = parity[1] ^ 0xFF;
            c1v[3] = parity[3] ^ 0xFF;
        }
        {
            let (d0_p1, d0_p2) = self.gather_c1_halves(i, false);
            let c2_insert = [c2v[0] ^ 0xFF, self.past[58][13] ^ 0xFF, c2v[2] ^ 0xFF, self.past[58][15] ^ 0xFF];
            let msg = c1_message(d0_p1, c2_insert, d0_p2);
            let parity = reed_solomon::encode_c1(&msg);
            c1v[0] = parity[0] ^ 0xFF;
            c1v[2] = parity[2] ^ 0xFF;
        }

        let mut bytes = [0u8; 32];
        bytes[0..12].copy_from_slice(&p1);
        bytes[12..16].copy_from_slice(&c2v);
        bytes[16..28].copy_from_slice(&p2);
        bytes[28..32].copy_from_slice(&c1v);

        let mut past_row: PastRow = [0u8; 28];
        past_row[0..12].copy_from_slice(&p1);
        past_row[12..16].copy_from_slice(&c2v);
        past_row[16..28].copy_from_slice(&p2);
        self.push_past(past_row);

        Line { subchannel_symbol, bytes }
    }
}

impl Default for CircEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn c1_message(p1: [u8; 12], c2: [u8; NUM_PARITY], p2: [u8; 12]) -> [u8; 28] {
    let mut msg = [0u8; 28];
    msg[0..12].copy_from_slice(&p1);
    msg[12..16].copy_from_slice(&c2);
    msg[16..28].copy_from_slice(&p2);
    msg
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn silence_in_is_all_0xff_parity_out() {
        let mut enc = CircEncoder::new();

        let mut lines = Vec::new();
        for _ in 0..5 {
            lines.extend(enc.queue([0u8; 2352], None));
        }

        assert_eq!(lines.len(), 3 * FRAMES_PER_SECTOR);
        for line in &lines {
            assert_eq!(&line.bytes[0..12], &[0u8; 12][..]);
            assert_eq!(&line.bytes[12..16], &[0xFFu8; 4][..]);
            assert_eq!(&line.bytes[16..28], &[0u8; 12][..]);
            assert_eq!(&line.bytes[28..32], &[0xFFu8; 4][..]);
        }
    }

    #[test]
    fn fewer_than_three_sectors_produces_no_lines() {
        let mut enc = CircEncoder::new();
        assert!(enc.queue([0u8; 2352], None).is_empty());
        assert!(enc.queue([0u8; 2352], None).is_empty());
    }

    #[test]
    fn third_sector_emits_exactly_one_sector_of_lines() {
        let mut enc = CircEncoder::new();
        assert!(enc.queue([1u8; 2352], None).is_empty());
        assert!(enc.queue([2u8; 2352], None).is_empty());
        let lines = enc.queue([3u8; 2352], None);
        assert_eq!(lines.len(), FRAMES_PER_SECTOR);
    }

    #[test]
    fn subchannel_markers_open_every_sector() {
        let mut enc = CircEncoder::new();
        enc.queue([0u8; 2352], None);
        enc.queue([0u8; 2352], None);
        let lines = enc.queue([0u8; 2352], Some([0x42; 96]));

        assert_eq!(lines[0].subchannel_symbol, Symbol::S0);
        assert_eq!(lines[1].subchannel_symbol, Symbol::S1);
        assert_eq!(lines[2].subchannel_symbol, Symbol::Byte(0x42));
    }
}
