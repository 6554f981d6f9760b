//! Hex-text framing of the first DeepSix firmware.
//!
//! A frame is one ASCII line: `$`, the command group, checksum and length as two hex
//! digits each, the hex-encoded data, then `\n`. The line has no sub-command field, so
//! the sub-command travels as the first data byte. The checksum is the inverted byte sum
//! of command group, length and data.

use crate::constants::{LEGACY_FRAME_MARKER, LEGACY_FRAME_TERMINATOR};
use crate::error::DcError;
use crate::packet::{Frame, FrameCodec, checksum_of};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Read;
use tracing::{debug, error};

/// Hex digits of the cmd, checksum and length fields
const LINE_HEADER_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexCodec {
    max_payload: usize,
}

impl HexCodec {
    pub const fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }

    /// Data bytes on the line: sub-command plus payload
    fn max_data(&self) -> usize {
        self.max_payload + 1
    }
}

fn decode_hex(digits: &[u8], what: &str) -> Result<Vec<u8>, DcError> {
    hex::decode(digits).map_err(|e| DcError::Protocol(format!("non-hex {what}: {e}")))
}

impl FrameCodec for HexCodec {
    fn max_payload(&self) -> usize {
        self.max_payload
    }

    fn encode(&self, frame: &Frame) -> Result<Bytes, DcError> {
        let len = frame.payload.len();
        if len > self.max_payload || len + 1 > u8::MAX as usize {
            return Err(DcError::InvalidArgument(format!(
                "payload of {len} bytes exceeds the {} byte packet limit",
                self.max_payload
            )));
        }

        let mut data = Vec::with_capacity(len + 1);
        data.push(frame.subcmd);
        data.extend_from_slice(&frame.payload);
        let ndata = data.len() as u8;
        let csum = checksum_of([frame.cmd, ndata].iter().chain(&data));

        let mut line = BytesMut::with_capacity(1 + LINE_HEADER_DIGITS + 2 * data.len() + 1);
        line.put_u8(LEGACY_FRAME_MARKER);
        line.put_slice(hex::encode_upper([frame.cmd, csum, ndata]).as_bytes());
        line.put_slice(hex::encode_upper(&data).as_bytes());
        line.put_u8(LEGACY_FRAME_TERMINATOR);
        Ok(line.freeze())
    }

    fn decode(&self, source: &mut dyn Read) -> Result<Frame, DcError> {
        let mut marker = [0u8; 1];
        source.read_exact(&mut marker)?;
        if marker[0] != LEGACY_FRAME_MARKER {
            error!("Unexpected line marker {:#04x}", marker[0]);
            return Err(DcError::Protocol(format!("missing frame marker, got {:#04x}", marker[0])));
        }

        let mut digits = [0u8; LINE_HEADER_DIGITS];
        source.read_exact(&mut digits)?;
        let fields = decode_hex(&digits, "frame header")?;
        let (cmd, received, ndata) = (fields[0], fields[1], fields[2] as usize);

        if ndata == 0 {
            return Err(DcError::Protocol("empty legacy frame".to_string()));
        }
        if ndata > self.max_data() {
            return Err(DcError::Protocol(format!(
                "oversize length: {} bytes, limit {}",
                ndata - 1,
                self.max_payload
            )));
        }

        let mut rest = vec![0u8; 2 * ndata + 1];
        source.read_exact(&mut rest)?;
        debug!(cmd = cmd, line = String::from_utf8_lossy(&rest).trim_end(), "Line read");
        if rest[2 * ndata] != LEGACY_FRAME_TERMINATOR {
            return Err(DcError::Protocol("missing line terminator".to_string()));
        }
        let data = decode_hex(&rest[..2 * ndata], "payload")?;

        let expected = checksum_of([cmd, ndata as u8].iter().chain(&data));
        if received != expected {
            error!("Checksum mismatch: got {:#04x}, expected {:#04x}", received, expected);
            return Err(DcError::Protocol(format!(
                "checksum mismatch: got {received:#04x}, expected {expected:#04x}"
            )));
        }

        let mut data = Bytes::from(data);
        let subcmd = data.split_to(1)[0];
        Ok(Frame {
            cmd,
            subcmd,
            payload: data,
        })
    }
}
