//! CIRC/EFM codec for the physical bitstream of a Red Book (IEC-60908)
//! Compact Disc: the two-stage Reed-Solomon interleaver (C2/C1), the
//! Eight-to-Fourteen Modulation line code, frame/sector framing, and the
//! matching decoder that recovers symbols, subchannel P/Q and Reed-Solomon
//! syndromes from a captured bitstream.
//!
//! Out of scope: applying Reed-Solomon corrections, CLI/argument parsing,
//! variable-speed timing, audio DAC, and upper-layer structures (TOC,
//! filesystem, CD-Text) — see `DESIGN.md`.

#![warn(missing_docs)]

#[macro_use]
extern crate arrayref;
#[cfg(feature = "serde")]
extern crate serde;
#[cfg(feature = "serde")]
extern crate serde_big_array;
extern crate thiserror;

pub mod bcd;
pub mod bitsink;
pub mod circ;
pub mod crc16;
pub mod efm;
pub mod gf256;
pub mod generators;
pub mod msf;
pub mod poly;
pub mod reed_solomon;
pub mod scrambler;
pub mod subchannel;

pub use bcd::Bcd;
pub use circ::decoder::{CircDecoder, DecodedSector, RowReport};
pub use circ::encoder::CircEncoder;
pub use circ::Line;
pub use msf::Msf;

use thiserror::Error;

/// Error type for codec operations.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum CdError {
    #[error("invalid EFM input symbol: value is neither a byte nor S0/S1/erasure")]
    InvalidEfmSymbol,
    #[error("invalid Reed-Solomon message length: expected {expected}, got {got}")]
    InvalidRsMessageLength { expected: usize, got: usize },
    #[error("frame sync pattern not found in bitstream")]
    SyncNotFound,
    #[error("attempted to parse invalid BCD data")]
    BadBcd,
    #[error("invalid or unexpected MSF format")]
    InvalidMsf,
    #[error("invalid Q subchannel CRC")]
    InvalidSubQCrc,
}

/// Convenience type alias for a `Result<R, CdError>`.
pub type CdResult<R> = std::result::Result<R, CdError>;

#[test]
fn cderror_display() {
    println!("{}", CdError::SyncNotFound);
}
