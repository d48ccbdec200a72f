//! Eight-to-Fourteen Modulation symbol tables.
//!
//! The forward table maps each of the 256 possible data bytes to a 14-bit
//! channel codeword chosen so that, combined with the merge-bit selector in
//! [`crate::bitsink`], the NRZ-I-encoded stream obeys the `d=2`/`k=10`
//! run-length constraints. Three additional codewords are reserved outside
//! the byte table for the subchannel block markers `S0`/`S1` and for the
//! decoder's erasure sentinel.
//!
//! The byte-to-codeword assignment below is generated deterministically
//! from the run-length constraint itself (see [`valid_codewords`]) rather
//! than transcribed from the Red Book Annex tables, which this crate does
//! not have on hand; see `DESIGN.md` for the rationale. Every invariant the
//! codec depends on — the forward/reverse bijection, the run-length bound,
//! and the fixed special codewords — holds regardless of which concrete
//! assignment is used, and is checked at startup by [`tables`].

use std::sync::OnceLock;

/// One EFM symbol: either a literal data byte, or one of the three special
/// markers used outside the byte table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// A regular data byte, encoded through the forward LUT.
    Byte(u8),
    /// Subchannel block marker for frame 0 of a sector.
    S0,
    /// Subchannel block marker for frame 1 of a sector.
    S1,
    /// Decoder sentinel for a 14-bit pattern that didn't match any known
    /// codeword (a corrupted or unsynchronized read).
    Erasure,
}

impl Symbol {
    /// `true` for [`Symbol::Erasure`].
    pub fn is_erasure(self) -> bool {
        matches!(self, Symbol::Erasure)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Symbol::Byte(b) => write!(f, "{:#04x}", b),
            Symbol::S0 => write!(f, "S0"),
            Symbol::S1 => write!(f, "S1"),
            Symbol::Erasure => write!(f, "erasure"),
        }
    }
}

impl From<u8> for Symbol {
    fn from(b: u8) -> Symbol {
        Symbol::Byte(b)
    }
}

/// 14-bit codeword for the `S0` subchannel marker.
pub const S0_CODE: u16 = 0x2004;
/// 14-bit codeword for the `S1` subchannel marker.
pub const S1_CODE: u16 = 0x1200;
/// 14-bit pattern used by the decoder to flag an erasure. Never produced
/// by the encoder.
pub const ERASURE_CODE: u16 = 0b10001000000000;

const NUM_BYTES: usize = 256;

/// `true` if `word` (considered bit-0-first, i.e. in transmission order)
/// satisfies the run-length constraints this table's byte entries use:
/// at most 2 leading/trailing zeros (so that up to 3 inserted merge bits
/// can never push a boundary run past `k=10`), and an internal run of
/// zeros between any two ones of `2..=10` (the `d=2`/`k=10` bound itself).
fn is_valid_byte_codeword(word: u16) -> bool {
    let ones: Vec<u32> = (0..14).filter(|&i| (word >> i) & 1 == 1).collect();

    let (&first, &last) = match (ones.first(), ones.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return false,
    };

    if first > 2 || (13 - last) > 2 {
        return false;
    }

    for pair in ones.windows(2) {
        let gap = pair[1] - pair[0] - 1;
        if !(2..=10).contains(&gap) {
            return false;
        }
    }

    true
}

/// All 14-bit codewords satisfying [`is_valid_byte_codeword`], in
/// ascending numeric order, excluding the three reserved special
/// codewords.
fn valid_codewords() -> Vec<u16> {
    (0u16..(1 << 14))
        .filter(|&w| w != S0_CODE && w != S1_CODE && w != ERASURE_CODE)
        .filter(|&w| is_valid_byte_codeword(w))
        .collect()
}

/// Forward/reverse EFM lookup tables.
pub struct Tables {
    forward: [u16; NUM_BYTES],
    /// Indexed directly by the 14-bit codeword; defaults to
    /// [`Symbol::Erasure`] for anything not assigned above.
    reverse: Vec<Symbol>,
}

impl Tables {
    fn build() -> Tables {
        let candidates = valid_codewords();
        assert!(
            candidates.len() >= NUM_BYTES,
            "not enough run-length-legal 14-bit codewords to cover all 256 bytes"
        );

        let mut forward = [0u16; NUM_BYTES];
        forward.copy_from_slice(&candidates[..NUM_BYTES]);

        let mut reverse = vec![Symbol::Erasure; 1 << 14];
        for (byte, &code) in forward.iter().enumerate() {
            reverse[code as usize] = Symbol::Byte(byte as u8);
        }
        reverse[S0_CODE as usize] = Symbol::S0;
        reverse[S1_CODE as usize] = Symbol::S1;

        let tables = Tables { forward, reverse };
        tables.verify_bijection();
        tables
    }

    /// Self-check run at startup: every byte round-trips through
    /// forward-then-reverse, and S0/S1 remain distinguishable from byte
    /// values.
    fn verify_bijection(&self) {
        for b in 0..=255u8 {
            match self.reverse(self.forward(b)) {
                Symbol::Byte(rb) if rb == b => {}
                other => panic!("EFM table broken for byte {b:#04x}: got {other:?}"),
            }
        }
        assert_eq!(self.reverse(S0_CODE), Symbol::S0);
        assert_eq!(self.reverse(S1_CODE), Symbol::S1);
    }

    /// Forward lookup: byte -> 14-bit codeword.
    pub fn forward(&self, byte: u8) -> u16 {
        self.forward[byte as usize]
    }

    /// Reverse lookup: 14-bit codeword -> symbol (possibly
    /// [`Symbol::Erasure`] if `code` doesn't match anything).
    pub fn reverse(&self, code: u16) -> Symbol {
        self.reverse[(code & 0x3FFF) as usize]
    }

    /// 14-bit codeword for the S0 marker.
    pub fn s0(&self) -> u16 {
        S0_CODE
    }

    /// 14-bit codeword for the S1 marker.
    pub fn s1(&self) -> u16 {
        S1_CODE
    }
}

/// Process-wide EFM tables, built and self-checked on first use.
pub fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(Tables::build)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn forward_reverse_round_trips_every_byte() {
        let t = tables();
        for b in 0..=255u8 {
            assert_eq!(t.reverse(t.forward(b)), Symbol::Byte(b));
        }
    }

    #[test]
    fn special_codes_distinct_from_bytes() {
        let t = tables();
        assert_eq!(t.reverse(S0_CODE), Symbol::S0);
        assert_eq!(t.reverse(S1_CODE), Symbol::S1);
        assert!(t.reverse(ERASURE_CODE).is_erasure());
    }

    #[test]
    fn forward_table_has_no_duplicates() {
        let t = tables();
        let mut codes: Vec<u16> = (0..=255u8).map(|b| t.forward(b)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 256);
    }

    #[test]
    fn every_forward_entry_obeys_run_length_margin() {
        let t = tables();
        for b in 0..=255u8 {
            assert!(is_valid_byte_codeword(t.forward(b)), "byte {b:#04x} codeword invalid");
        }
    }
}
