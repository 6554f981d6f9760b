use crate::constants::LOG_PROFILE;
use crate::error::DcError;
use crate::link::Link;
use crate::packet::CommandGroup;
use crate::transport::Transport;
use tracing::{debug, trace};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Payload of a LOG/PROFILE request
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ProfileRequest {
    pub dive: U16,
    pub offset: U32,
}

/// How the device sizes its bulk replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplyPadding {
    /// Replies never run past the requested range; any excess is an error.
    Exact,
    /// Replies may carry garbage past the logical end; it is clipped.
    Padded,
}

impl<T: Transport> Link<T> {
    /// Download `total_length` bytes of dive `identifier`, one reply at a time.
    pub fn fetch_bulk(
        &mut self,
        identifier: u16,
        total_length: usize,
        padding: ReplyPadding,
    ) -> Result<Vec<u8>, DcError> {
        let mut buffer = Vec::new();
        self.fetch_bulk_into(identifier, total_length, padding, &mut buffer)?;
        Ok(buffer)
    }

    /// Append the downloaded bytes to `out`
    pub fn fetch_bulk_into(
        &mut self,
        identifier: u16,
        total_length: usize,
        padding: ReplyPadding,
        out: &mut Vec<u8>,
    ) -> Result<(), DcError> {
        if u32::try_from(total_length).is_err() {
            return Err(DcError::InvalidArgument(format!(
                "bulk length {total_length} does not fit the offset field"
            )));
        }
        out.try_reserve_exact(total_length)?;

        let mut offset = 0usize;
        while offset < total_length {
            let remaining = total_length - offset;
            let request = ProfileRequest {
                dive: U16::new(identifier),
                offset: U32::new(offset as u32),
            };
            let max_len = match padding {
                ReplyPadding::Exact => self.max_payload(),
                ReplyPadding::Padded => remaining,
            };

            let response =
                self.transact(CommandGroup::Logs, LOG_PROFILE, request.as_bytes(), max_len)?;
            let received = response.payload.len();
            if received == 0 {
                return Err(DcError::Protocol(format!(
                    "empty bulk response with {remaining} bytes outstanding"
                )));
            }
            if received > remaining {
                return Err(DcError::Protocol(format!(
                    "bulk overflow: {received} bytes received, {remaining} expected"
                )));
            }

            out.extend_from_slice(&response.payload);
            offset += received;
            trace!(dive = identifier, offset, total_length, "Bulk chunk");
        }

        debug!(dive = identifier, total_length, "Bulk transfer complete");
        Ok(())
    }
}
