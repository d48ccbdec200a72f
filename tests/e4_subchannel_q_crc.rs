//! E4 — CRC validation: a Q subchannel built with control=0x01, ADR=1 and
//! data-Q `BCD(01 00 00 02 00 00 00 00 00 00)` must validate under its own
//! computed CRC.

use circfm::subchannel::SubChannelQ;

#[test]
fn freshly_computed_crc_validates() {
    let control_adr = (0x01 << 4) | 0x01;
    let payload: [u8; 10] =
        [control_adr, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00];

    let q = SubChannelQ::new(SubChannelQ::with_crc(payload));

    assert!(q.crc_valid());
    assert_eq!(q.adr(), 1);
}
