//! Per-firmware protocol parameters.

use crate::bulk::ReplyPadding;
use crate::constants::*;
use crate::error::DcError;
use crate::legacy::HexCodec;
use crate::packet::{BinaryCodec, FrameCodec};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Binary { max_payload: usize },
    Hex { max_payload: usize },
}

impl CodecKind {
    pub fn build(self) -> Box<dyn FrameCodec + Send> {
        match self {
            CodecKind::Binary { max_payload } => Box::new(BinaryCodec::new(max_payload)),
            CodecKind::Hex { max_payload } => Box::new(HexCodec::new(max_payload)),
        }
    }
}

/// Order in which the device hands out its dives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOrder {
    /// Dive 1 first
    Ascending,
    /// Most recent dive first
    Descending,
}

impl IterationOrder {
    /// Dive numbers `1..=count` in device order
    pub fn numbers(self, count: u16) -> Vec<u16> {
        match self {
            IterationOrder::Ascending => (1..=count).collect(),
            IterationOrder::Descending => (1..=count).rev().collect(),
        }
    }
}

/// Where the fields the downloader needs sit inside a dive header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub size: usize,
    /// Position of the u32 LE profile start offset
    pub start_offset: usize,
    /// Position of the u32 LE profile end offset
    pub end_offset: usize,
    pub fingerprint_offset: usize,
    pub fingerprint_size: usize,
}

impl HeaderLayout {
    pub fn fingerprint_range(&self) -> Range<usize> {
        self.fingerprint_offset..self.fingerprint_offset + self.fingerprint_size
    }

    /// Bytes a reply must carry for the offsets and fingerprint to be readable
    fn required(&self) -> usize {
        (self.start_offset + 4)
            .max(self.end_offset + 4)
            .max(self.fingerprint_offset + self.fingerprint_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolGeneration {
    pub name: &'static str,
    pub codec: CodecKind,
    pub header: HeaderLayout,
    pub order: IterationOrder,
    /// Serial number bytes placed between header and profile; zero for none
    pub serial_len: usize,
    pub bulk_replies: ReplyPadding,
}

/// DeepSix Excursion, binary framing
pub const EXCURSION: ProtocolGeneration = ProtocolGeneration {
    name: "Excursion",
    codec: CodecKind::Binary {
        max_payload: MAX_PACKET,
    },
    header: HeaderLayout {
        size: EXCURSION_HEADER_SIZE,
        start_offset: 40,
        end_offset: 44,
        fingerprint_offset: FINGERPRINT_OFFSET,
        fingerprint_size: FINGERPRINT_SIZE,
    },
    order: IterationOrder::Descending,
    serial_len: SERIAL_NUMBER_LEN,
    bulk_replies: ReplyPadding::Exact,
};

/// First Deep6 firmware, hex-text framing
pub const DEEP6: ProtocolGeneration = ProtocolGeneration {
    name: "Deep6",
    codec: CodecKind::Hex {
        max_payload: LEGACY_MAX_PACKET,
    },
    header: HeaderLayout {
        size: DEEP6_HEADER_SIZE,
        start_offset: 44,
        end_offset: 48,
        fingerprint_offset: FINGERPRINT_OFFSET,
        fingerprint_size: FINGERPRINT_SIZE,
    },
    order: IterationOrder::Ascending,
    serial_len: SERIAL_NUMBER_LEN,
    bulk_replies: ReplyPadding::Padded,
};

/// A dive header as returned by LOG/INFO, padded to the layout size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiveHeader {
    bytes: Vec<u8>,
    layout: HeaderLayout,
}

impl DiveHeader {
    pub fn parse(reply: &[u8], layout: HeaderLayout) -> Result<Self, DcError> {
        if reply.len() < layout.required() {
            return Err(DcError::Protocol(format!(
                "short dive header: {} bytes, need {}",
                reply.len(),
                layout.required()
            )));
        }
        let mut bytes = reply[..reply.len().min(layout.size)].to_vec();
        bytes.resize(layout.size, 0);
        Ok(Self { bytes, layout })
    }

    fn u32_at(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[offset..offset + 4]);
        u32::from_le_bytes(raw)
    }

    pub fn start_offset(&self) -> u32 {
        self.u32_at(self.layout.start_offset)
    }

    pub fn end_offset(&self) -> u32 {
        self.u32_at(self.layout.end_offset)
    }

    pub fn profile_length(&self) -> Result<usize, DcError> {
        let (start, end) = (self.start_offset(), self.end_offset());
        end.checked_sub(start)
            .map(|len| len as usize)
            .ok_or_else(|| {
                DcError::Protocol(format!("inverted profile range {start:#x}..{end:#x}"))
            })
    }

    pub fn fingerprint(&self) -> &[u8] {
        &self.bytes[self.layout.fingerprint_range()]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_range(layout: HeaderLayout, start: u32, end: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; layout.size];
        bytes[layout.start_offset..layout.start_offset + 4].copy_from_slice(&start.to_le_bytes());
        bytes[layout.end_offset..layout.end_offset + 4].copy_from_slice(&end.to_le_bytes());
        bytes
    }

    #[test]
    fn test_profile_length_from_offsets() {
        let bytes = header_with_range(EXCURSION.header, 0x100, 0x180);
        let header = DiveHeader::parse(&bytes, EXCURSION.header).expect("header");
        assert_eq!(header.profile_length().expect("length"), 0x80, "0x180 - 0x100");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let bytes = header_with_range(DEEP6.header, 0x180, 0x100);
        let header = DiveHeader::parse(&bytes, DEEP6.header).expect("header");
        assert!(matches!(header.profile_length(), Err(DcError::Protocol(_))));
    }

    #[test]
    fn test_short_reply_is_padded() {
        let bytes = header_with_range(EXCURSION.header, 0, 8);
        let header = DiveHeader::parse(&bytes[..60], EXCURSION.header).expect("header");
        assert_eq!(header.as_bytes().len(), EXCURSION_HEADER_SIZE);
        assert!(header.as_bytes()[60..].iter().all(|b| *b == 0), "Padding must be zero");

        assert!(DiveHeader::parse(&bytes[..40], EXCURSION.header).is_err());
    }

    #[test]
    fn test_iteration_order() {
        assert_eq!(IterationOrder::Ascending.numbers(3), vec![1, 2, 3]);
        assert_eq!(IterationOrder::Descending.numbers(3), vec![3, 2, 1]);
        assert!(IterationOrder::Descending.numbers(0).is_empty());
    }
}
