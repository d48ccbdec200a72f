//! Subchannel extraction: bit-transposing the 96 raw subchannel bytes of a
//! sector into the 8 named bit-columns P..W, and decoding P/Q.
//!
//! Only P and Q are interpreted here; R..W are exposed as raw 12-byte
//! columns for callers that want pass-through access.

use crate::bcd::Bcd;
use crate::crc16;
use crate::msf::Msf;

/// Number of raw subchannel bytes per sector (one per data frame, i.e.
/// frames 2..97 of the 98-frame sector).
pub const SUBCHANNEL_BYTES: usize = 96;

/// Length in bytes of one subchannel bit-column after transposition.
pub const COLUMN_BYTES: usize = 12;

/// The 8 subchannel bit-columns for one sector, after transposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subchannel {
    pub p: [u8; COLUMN_BYTES],
    pub q: [u8; COLUMN_BYTES],
    pub r: [u8; COLUMN_BYTES],
    pub s: [u8; COLUMN_BYTES],
    pub t: [u8; COLUMN_BYTES],
    pub u: [u8; COLUMN_BYTES],
    pub v: [u8; COLUMN_BYTES],
    pub w: [u8; COLUMN_BYTES],
}

impl Subchannel {
    /// Transpose 96 raw subchannel bytes, bit-serially MSB first, into the
    /// 8 named columns: byte `i`'s bit 7 goes to column P's bit `i`, bit 6
    /// to Q's bit `i`, and so on down to bit 0 for column W.
    pub fn transpose(bytes: &[u8; SUBCHANNEL_BYTES]) -> Subchannel {
        let mut cols = [[0u8; COLUMN_BYTES]; 8];

        for (i, &byte) in bytes.iter().enumerate() {
            for (col, column) in cols.iter_mut().enumerate() {
                if (byte >> (7 - col)) & 1 == 1 {
                    column[i / 8] |= 1 << (7 - (i % 8));
                }
            }
        }

        Subchannel {
            p: cols[0],
            q: cols[1],
            r: cols[2],
            s: cols[3],
            t: cols[4],
            u: cols[5],
            v: cols[6],
            w: cols[7],
        }
    }

    /// `true` if every bit of the P column is identical, the shape the
    /// Red Book mandates (all-0 inside a track, all-1 across a gap).
    pub fn p_valid(&self) -> bool {
        let first = self.p[0];
        (first == 0x00 || first == 0xff) && self.p.iter().all(|&b| b == first)
    }

    /// `true` if the P column reads as "inside track" (all zero bits).
    pub fn p_in_track(&self) -> bool {
        self.p.iter().all(|&b| b == 0)
    }

    /// Parse the Q column.
    pub fn q(&self) -> SubChannelQ {
        SubChannelQ { bytes: self.q }
    }
}

/// The Q subchannel column of one sector, raw 12 bytes: 1 control/ADR byte,
/// 9 bytes of mode-specific payload, 2 CRC bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubChannelQ {
    bytes: [u8; 12],
}

bitflags::bitflags! {
    /// Upper-nibble control flags of Q subchannel byte 0.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct QControl: u8 {
        /// Pre-emphasis enabled (audio tracks only).
        const PRE_EMPHASIS = 0b0001_0000;
        /// Digital copy permitted.
        const COPY_PERMITTED = 0b0010_0000;
        /// Set for data tracks, clear for audio.
        const DATA = 0b0100_0000;
        /// 4-channel audio (audio tracks only).
        const FOUR_CHANNEL = 0b1000_0000;
    }
}

impl SubChannelQ {
    /// Build from 12 raw Q-column bytes.
    pub fn new(bytes: [u8; 12]) -> SubChannelQ {
        SubChannelQ { bytes }
    }

    /// Raw 12 bytes.
    pub fn raw(&self) -> &[u8; 12] {
        &self.bytes
    }

    /// Control flags, the upper nibble of byte 0.
    pub fn control(&self) -> QControl {
        QControl::from_bits_truncate(self.bytes[0] & 0xf0)
    }

    /// `true` if this is a data track.
    pub fn is_data(&self) -> bool {
        self.control().contains(QControl::DATA)
    }

    /// Address mode, the low nibble of byte 0: which layout `data()`
    /// should be interpreted with.
    pub fn adr(&self) -> u8 {
        self.bytes[0] & 0x0f
    }

    /// CRC-16-CCITT transmitted in the last 2 bytes.
    pub fn transmitted_crc(&self) -> u16 {
        ((self.bytes[10] as u16) << 8) | self.bytes[11] as u16
    }

    /// Validate the transmitted CRC against bytes `0..10`: per the Red
    /// Book, the transmitted bytes carry the CRC-16-CCITT of the first 10
    /// bytes XORed with 0xFFFF a second time, independent of the
    /// algorithm's own final XOR already folded into [`crc16::crc16`].
    pub fn crc_valid(&self) -> bool {
        (crc16::crc16(&self.bytes[0..10]) ^ 0xFFFF) == self.transmitted_crc()
    }

    /// Compute and append a valid CRC to a built Q payload (bytes 0..10
    /// already filled in), returning the full 12-byte column.
    pub fn with_crc(payload: [u8; 10]) -> [u8; 12] {
        let crc = crc16::crc16(&payload) ^ 0xFFFF;
        let mut out = [0u8; 12];
        out[..10].copy_from_slice(&payload[..]);
        out[10] = (crc >> 8) as u8;
        out[11] = crc as u8;
        out
    }

    /// Decode the mode-specific payload. Only ADR 1 (position data) is
    /// interpreted fully; ADR 2 and 3 (media/track catalog numbers) are
    /// surfaced as raw passthrough, matching the spec's non-goal of full
    /// upper-layer TOC decoding.
    pub fn parse_data(&self) -> QData {
        match self.adr() {
            1 => self.parse_mode1(),
            2 => QData::MediaCatalog(self.bytes[1..10].try_into().unwrap()),
            3 => QData::TrackCatalog(self.bytes[1..10].try_into().unwrap()),
            _ => QData::Unsupported,
        }
    }

    fn parse_mode1(&self) -> QData {
        let track = match Bcd::from_bcd(self.bytes[1]) {
            Some(b) => b,
            None => return QData::Unsupported,
        };
        let index = match Bcd::from_bcd(self.bytes[2]) {
            Some(b) => b,
            None => return QData::Unsupported,
        };

        let rel = match bcd_msf(self.bytes[3], self.bytes[4], self.bytes[5]) {
            Some(m) => m,
            None => return QData::Unsupported,
        };

        if self.bytes[6] != 0 {
            return QData::Unsupported;
        }

        let abs = match bcd_msf(self.bytes[7], self.bytes[8], self.bytes[9]) {
            Some(m) => m,
            None => return QData::Unsupported,
        };

        QData::Position { track, index, relative: rel, absolute: abs }
    }
}

fn bcd_msf(m: u8, s: u8, f: u8) -> Option<Msf> {
    let m = Bcd::from_bcd(m)?;
    let s = Bcd::from_bcd(s)?;
    let f = Bcd::from_bcd(f)?;
    Msf::new(m, s, f)
}

/// Decoded Q subchannel payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QData {
    /// ADR 1: position data, the common case outside the lead-in.
    Position {
        track: Bcd,
        index: Bcd,
        /// MSF relative to the start of the current index.
        relative: Msf,
        /// MSF relative to the start of the user data area.
        absolute: Msf,
    },
    /// ADR 2: raw media catalog number payload (9 bytes), not decoded.
    MediaCatalog([u8; 9]),
    /// ADR 3: raw track catalog number (ISRC) payload (9 bytes), not decoded.
    TrackCatalog([u8; 9]),
    /// Any other ADR value, or a malformed mode-1 payload.
    Unsupported,
}
