use crate::error::DcError;
use crate::packet::{Frame, FrameCodec};
use crate::transport::Transport;
use bytes::Bytes;
use std::io::Write;
use tracing::{debug, error, trace};

/// One request in flight over a half-duplex transport.
pub struct Link<T> {
    transport: T,
    codec: Box<dyn FrameCodec + Send>,
}

impl<T: Transport> Link<T> {
    pub fn new(transport: T, codec: Box<dyn FrameCodec + Send>) -> Self {
        Self { transport, codec }
    }

    pub fn max_payload(&self) -> usize {
        self.codec.max_payload()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Encode and write one frame without waiting for a reply
    pub fn send(&mut self, cmd: impl Into<u8>, subcmd: u8, payload: &[u8]) -> Result<(), DcError> {
        let frame = Frame::new(cmd, subcmd, Bytes::copy_from_slice(payload));
        let bytes = self.codec.encode(&frame)?;
        debug!(bytes = hex::encode(&bytes), "Link write");
        self.transport.write_all(&bytes)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Block until one complete frame has been read
    pub fn receive(&mut self) -> Result<Frame, DcError> {
        self.codec.decode(&mut self.transport)
    }

    /// Send a request and read its acknowledgement.
    ///
    /// The reply must carry the request's command group plus one. Its payload is clipped
    /// to `max_len`; bytes past that point are discarded.
    pub fn transact(
        &mut self,
        cmd: impl Into<u8>,
        subcmd: u8,
        payload: &[u8],
        max_len: usize,
    ) -> Result<Frame, DcError> {
        let cmd = cmd.into();
        self.send(cmd, subcmd, payload)?;

        let mut response = self.receive()?;
        let expected = cmd.wrapping_add(1);
        if response.cmd != expected {
            error!(
                "Unexpected ack command {:#04x} for request {:#04x}/{:#04x}",
                response.cmd, cmd, subcmd
            );
            return Err(DcError::Protocol(format!(
                "unexpected ack command {:#04x}, expected {expected:#04x}",
                response.cmd
            )));
        }

        if response.payload.len() > max_len {
            trace!(received = response.payload.len(), max_len, "Clipping reply payload");
            response.payload.truncate(max_len);
        }
        Ok(response)
    }
}
