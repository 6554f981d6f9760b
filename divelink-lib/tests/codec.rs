//! Frame codec round-trips and corruption detection

mod common;

use common::*;
use divelink_lib::legacy::HexCodec;
use divelink_lib::packet::checksum;
use proptest::prelude::*;
use std::io::Cursor;

fn decode(codec: &dyn FrameCodec, bytes: &[u8]) -> Result<Frame, DcError> {
    codec.decode(&mut Cursor::new(bytes))
}

#[test]
fn test_binary_fixture_frame() {
    let codec = BinaryCodec::new(MAX_PACKET);
    let frame = Frame::new(
        CommandGroup::Info,
        INFO_LAST_DIVE_INDEX,
        Bytes::from_static(&[0x00, 0x00]),
    );
    let bytes = codec.encode(&frame).expect("Failed to encode frame");

    // A0 04 01 02 00 00, sum 0xA7, inverted 0x58
    assert_eq!(
        hex::encode(&bytes),
        "a0040102000058",
        "Encoded frame does not match the wire layout"
    );
    assert_eq!(decode(&codec, &bytes).expect("Failed to decode frame"), frame);
}

#[test]
fn test_binary_reply_fixture() {
    let codec = BinaryCodec::new(MAX_PACKET);
    let bytes = hex_to_bytes("a1040102070050");
    let frame = decode(&codec, &bytes).expect("Failed to decode reply");
    assert_eq!(frame.command_group(), CommandGroup::InfoAck);
    assert_eq!(frame.payload.as_ref(), &[0x07, 0x00]);
}

#[test]
fn test_binary_rejects_bad_flag() {
    let codec = BinaryCodec::new(MAX_PACKET);
    let mut bytes = hex_to_bytes("a0040102000058").to_vec();
    bytes[2] = 0x02;
    bytes[6] = checksum(&bytes[..6]);
    assert!(matches!(decode(&codec, &bytes), Err(DcError::Protocol(_))));
}

#[test]
fn test_binary_rejects_oversize_length() {
    let codec = BinaryCodec::new(16);
    let bytes = hex_to_bytes("a1040120");
    assert!(matches!(decode(&codec, &bytes), Err(DcError::Protocol(_))));

    let payload = Bytes::from(vec![0u8; 17]);
    assert!(matches!(
        codec.encode(&Frame::new(CommandGroup::Info, 0, payload)),
        Err(DcError::InvalidArgument(_))
    ));
}

#[test]
fn test_short_read_is_io() {
    let codec = BinaryCodec::new(MAX_PACKET);
    assert!(matches!(decode(&codec, &hex_to_bytes("a10401")), Err(DcError::Io(_))));
    assert!(matches!(decode(&codec, &hex_to_bytes("a104010200")), Err(DcError::Io(_))));
}

#[test]
fn test_zero_length_payload() {
    let codec = BinaryCodec::new(MAX_PACKET);
    let frame = Frame::new(CommandGroup::Info, INFO_SERIAL_NUMBER, Bytes::new());
    let bytes = codec.encode(&frame).expect("Failed to encode frame");
    assert_eq!(bytes.len(), FRAME_HEADER_SIZE + FRAME_CHECKSUM_SIZE);
    assert_eq!(decode(&codec, &bytes).expect("Failed to decode frame"), frame);
}

#[test]
fn test_hex_checksum_mismatch() {
    let codec = HexCodec::new(LEGACY_MAX_PACKET);
    let good = b"$A15703040000\n";
    let frame = decode(&codec, good).expect("Failed to decode line");
    assert_eq!(frame.subcmd, INFO_LAST_DIVE_INDEX);
    assert_eq!(frame.payload.as_ref(), &[0x00, 0x00]);

    let bad = b"$A15803040000\n";
    assert!(matches!(decode(&codec, bad), Err(DcError::Protocol(_))));
}

proptest! {
    #[test]
    fn prop_binary_roundtrip(
        cmd in any::<u8>(),
        subcmd in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PACKET),
    ) {
        let codec = BinaryCodec::new(MAX_PACKET);
        let frame = Frame::new(cmd, subcmd, payload);
        let bytes = codec.encode(&frame).expect("Failed to encode frame");
        prop_assert_eq!(bytes.len(), frame.payload.len() + FRAME_HEADER_SIZE + FRAME_CHECKSUM_SIZE);
        prop_assert_eq!(decode(&codec, &bytes).expect("Failed to decode frame"), frame);
    }

    #[test]
    fn prop_binary_bit_flip_detected(
        subcmd in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 1..64),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let codec = BinaryCodec::new(MAX_PACKET);
        let frame = Frame::new(CommandGroup::Logs, subcmd, payload);
        let mut bytes = codec.encode(&frame).expect("Failed to encode frame").to_vec();
        let position = position.index(bytes.len());
        bytes[position] ^= 1 << bit;

        let result = decode(&codec, &bytes);
        if position == 3 {
            // A corrupted length reframes the payload; it must never come back intact
            prop_assert!(result.map_or(true, |decoded| decoded != frame));
        } else {
            prop_assert!(result.is_err(), "Flip at byte {} bit {} went unnoticed", position, bit);
        }
    }

    #[test]
    fn prop_hex_roundtrip(
        cmd in any::<u8>(),
        subcmd in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..=LEGACY_MAX_PACKET),
    ) {
        let codec = HexCodec::new(LEGACY_MAX_PACKET);
        let frame = Frame::new(cmd, subcmd, payload);
        let line = codec.encode(&frame).expect("Failed to encode line");
        prop_assert_eq!(line[0], LEGACY_FRAME_MARKER);
        prop_assert_eq!(line[line.len() - 1], LEGACY_FRAME_TERMINATOR);
        prop_assert_eq!(decode(&codec, &line).expect("Failed to decode line"), frame);
    }
}
