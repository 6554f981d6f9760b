use crate::constants::{FRAME_CHECKSUM_SIZE, FRAME_FLAG, FRAME_HEADER_SIZE};
use crate::error::DcError;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use std::io::Read;
use tracing::{debug, error};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Command groups. A response carries the request group plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum CommandGroup {
    Info = 0xA0,
    InfoAck = 0xA1,
    Settings = 0xB0,
    SettingsAck = 0xB1,
    Logs = 0xC0,
    LogsAck = 0xC1,

    #[num_enum(catch_all)]
    Unknown(u8),
}

impl CommandGroup {
    /// Group byte the device answers with
    pub fn ack(self) -> u8 {
        u8::from(self).wrapping_add(1)
    }
}

/// On-wire header of a binary frame
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameHeader {
    pub cmd: u8,
    pub subcmd: u8,
    pub flag: u8,
    pub len: u8,
}

/// One checksummed protocol frame. The flag byte is fixed and not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cmd: u8,
    pub subcmd: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(cmd: impl Into<u8>, subcmd: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            cmd: cmd.into(),
            subcmd,
            payload: payload.into(),
        }
    }

    pub fn command_group(&self) -> CommandGroup {
        CommandGroup::from_primitive(self.cmd)
    }
}

/// Sum of all bytes modulo 256, inverted
pub fn checksum(bytes: &[u8]) -> u8 {
    checksum_of(bytes)
}

pub(crate) fn checksum_of<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u8 {
    bytes.into_iter().fold(0u8, |acc, b| acc.wrapping_add(*b)) ^ 0xFF
}

/// Frame encoding shared by every protocol generation.
pub trait FrameCodec {
    /// Largest payload one frame can carry
    fn max_payload(&self) -> usize;

    fn encode(&self, frame: &Frame) -> Result<Bytes, DcError>;

    fn decode(&self, source: &mut dyn Read) -> Result<Frame, DcError>;
}

/// Length-prefixed binary framing: `[cmd][subcmd][0x01][len][payload][csum]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodec {
    max_payload: usize,
}

impl BinaryCodec {
    pub const fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl FrameCodec for BinaryCodec {
    fn max_payload(&self) -> usize {
        self.max_payload
    }

    fn encode(&self, frame: &Frame) -> Result<Bytes, DcError> {
        let len = frame.payload.len();
        if len > self.max_payload || len > u8::MAX as usize {
            return Err(DcError::InvalidArgument(format!(
                "payload of {len} bytes exceeds the {} byte packet limit",
                self.max_payload
            )));
        }

        let header = FrameHeader {
            cmd: frame.cmd,
            subcmd: frame.subcmd,
            flag: FRAME_FLAG,
            len: len as u8,
        };

        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + len + FRAME_CHECKSUM_SIZE);
        buf.put_slice(header.as_bytes());
        buf.put_slice(&frame.payload);
        let csum = checksum(&buf);
        buf.put_u8(csum);
        Ok(buf.freeze())
    }

    fn decode(&self, source: &mut dyn Read) -> Result<Frame, DcError> {
        let mut raw = [0u8; FRAME_HEADER_SIZE];
        source.read_exact(&mut raw)?;
        let header = FrameHeader::read_from_bytes(&raw[..])
            .map_err(|_| DcError::Protocol("short frame header".to_string()))?;

        if header.flag != FRAME_FLAG {
            error!("Unexpected frame flag {:#04x}", header.flag);
            return Err(DcError::Protocol(format!("unexpected frame flag {:#04x}", header.flag)));
        }

        let len = header.len as usize;
        if len > self.max_payload {
            return Err(DcError::Protocol(format!(
                "oversize length: {len} bytes, limit {}",
                self.max_payload
            )));
        }

        let mut body = vec![0u8; len + FRAME_CHECKSUM_SIZE];
        source.read_exact(&mut body)?;
        debug!(header = hex::encode(raw), body = hex::encode(&body), "Frame read");

        let received = body[len];
        let expected = checksum_of(raw.iter().chain(&body[..len]));
        if received != expected {
            error!("Checksum mismatch: got {:#04x}, expected {:#04x}", received, expected);
            return Err(DcError::Protocol(format!(
                "checksum mismatch: got {received:#04x}, expected {expected:#04x}"
            )));
        }

        body.truncate(len);
        Ok(Frame {
            cmd: header.cmd,
            subcmd: header.subcmd,
            payload: Bytes::from(body),
        })
    }
}
