//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use divelink_lib::constants::*;
#[allow(unused_imports)]
pub use divelink_lib::device::{
    CancelToken, DeviceEvent, Dive, Progress, Session, StopReason, SyncStatus,
};
#[allow(unused_imports)]
pub use divelink_lib::error::DcError;
#[allow(unused_imports)]
pub use divelink_lib::generation::{DEEP6, EXCURSION, ProtocolGeneration};
#[allow(unused_imports)]
pub use divelink_lib::packet::{BinaryCodec, CommandGroup, Frame, FrameCodec};
#[allow(unused_imports)]
pub use divelink_lib::transport::{Direction, LineSettings, Transport};
#[allow(unused_imports)]
pub use hex;

use std::collections::{HashMap, VecDeque};
use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// Route `tracing` output to the test harness. Safe to call from every test.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Profile start offset the simulated device reports in its headers
#[allow(dead_code)]
pub const SIM_PROFILE_BASE: u32 = 0x4000;

#[allow(dead_code)]
pub const SIM_SERIAL: &[u8; SERIAL_NUMBER_LEN] = b"EX1234567890";

/// A dive computer living in memory.
///
/// Request frames are decoded with the generation's own codec as they are flushed and
/// answered the way the device would; every decoded request is kept for inspection.
#[allow(dead_code)]
pub struct SimulatedDevice {
    pub generation: ProtocolGeneration,
    codec: Box<dyn FrameCodec + Send>,
    pub serial: [u8; SERIAL_NUMBER_LEN],
    /// Profiles of dives 1..=n
    pub profiles: Vec<Vec<u8>>,
    /// Largest profile chunk returned per request
    pub chunk: usize,
    /// Fill every profile reply up to `chunk` bytes with zeros, as padded firmware does
    pub pad_replies: bool,
    /// Headers sent instead of the generated ones
    pub header_overrides: HashMap<u16, Vec<u8>>,
    pub requests: Vec<Frame>,
    pub line_settings: Option<LineSettings>,
    pub purges: Vec<Direction>,
    input: Vec<u8>,
    output: VecDeque<u8>,
}

#[allow(dead_code)]
impl SimulatedDevice {
    pub fn new(generation: ProtocolGeneration, profiles: Vec<Vec<u8>>) -> Self {
        Self {
            generation,
            codec: generation.codec.build(),
            serial: *SIM_SERIAL,
            profiles,
            chunk: 60,
            pad_replies: false,
            header_overrides: HashMap::new(),
            requests: Vec::new(),
            line_settings: None,
            purges: Vec::new(),
            input: Vec::new(),
            output: VecDeque::new(),
        }
    }

    /// Dives whose profile is `len` bytes of the dive number
    pub fn with_dives(generation: ProtocolGeneration, lengths: &[usize]) -> Self {
        let profiles = lengths
            .iter()
            .enumerate()
            .map(|(i, len)| vec![(i + 1) as u8; *len])
            .collect();
        Self::new(generation, profiles)
    }

    /// Fingerprint the device stores for dive `number`
    pub fn fingerprint_of(number: u16) -> [u8; FINGERPRINT_SIZE] {
        let [lo, hi] = number.to_le_bytes();
        [0x24, 0x07, lo, hi, 0x5A, 0xA5]
    }

    pub fn header_of(&self, number: u16) -> Vec<u8> {
        if let Some(header) = self.header_overrides.get(&number) {
            return header.clone();
        }
        let layout = self.generation.header;
        let length = self.profiles[usize::from(number) - 1].len() as u32;
        let mut header = vec![0u8; layout.size];
        header[layout.start_offset..layout.start_offset + 4]
            .copy_from_slice(&SIM_PROFILE_BASE.to_le_bytes());
        header[layout.end_offset..layout.end_offset + 4]
            .copy_from_slice(&(SIM_PROFILE_BASE + length).to_le_bytes());
        header[layout.fingerprint_range()].copy_from_slice(&Self::fingerprint_of(number));
        header
    }

    /// Queue raw bytes ahead of any reply
    pub fn inject(&mut self, bytes: &[u8]) {
        self.output.extend(bytes.iter());
    }

    /// Requests of one command group and sub-command, in arrival order
    pub fn requests_for(&self, group: CommandGroup, subcmd: u8) -> Vec<&Frame> {
        self.requests
            .iter()
            .filter(|f| f.command_group() == group && f.subcmd == subcmd)
            .collect()
    }

    /// Dive numbers whose profile was requested at least once
    pub fn downloaded_dives(&self) -> Vec<u16> {
        let mut dives: Vec<u16> = self
            .requests_for(CommandGroup::Logs, LOG_PROFILE)
            .iter()
            .map(|f| u16::from_le_bytes([f.payload[0], f.payload[1]]))
            .collect();
        dives.dedup();
        dives
    }

    fn respond(&self, request: &Frame) -> Option<Vec<u8>> {
        match (request.command_group(), request.subcmd) {
            (CommandGroup::Info, INFO_SERIAL_NUMBER) => Some(self.serial.to_vec()),
            (CommandGroup::Info, INFO_LAST_DIVE_INDEX) => {
                Some((self.profiles.len() as u16).to_le_bytes().to_vec())
            }
            (CommandGroup::Logs, LOG_INFO) => {
                let number = u16::from_le_bytes([request.payload[0], request.payload[1]]);
                Some(self.header_of(number))
            }
            (CommandGroup::Logs, LOG_PROFILE) => {
                let number = u16::from_le_bytes([request.payload[0], request.payload[1]]);
                let offset = u32::from_le_bytes([
                    request.payload[2],
                    request.payload[3],
                    request.payload[4],
                    request.payload[5],
                ]) as usize;
                let profile = &self.profiles[usize::from(number) - 1];
                let end = (offset + self.chunk).min(profile.len());
                let mut reply = profile[offset.min(end)..end].to_vec();
                if self.pad_replies {
                    reply.resize(self.chunk, 0);
                }
                Some(reply)
            }
            // Clock writes are not acknowledged
            _ => None,
        }
    }
}

impl Read for SimulatedDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.output.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "simulated device is silent"));
        }
        let n = buf.len().min(self.output.len());
        for (slot, byte) in buf.iter_mut().zip(self.output.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for SimulatedDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.input.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut cursor = Cursor::new(std::mem::take(&mut self.input));
        while (cursor.position() as usize) < cursor.get_ref().len() {
            let request = self
                .codec
                .decode(&mut cursor)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
            if let Some(payload) = self.respond(&request) {
                let reply = Frame::new(request.cmd.wrapping_add(1), request.subcmd, payload);
                let bytes = self
                    .codec
                    .encode(&reply)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
                self.output.extend(bytes.iter());
            }
            self.requests.push(request);
        }
        Ok(())
    }
}

impl Transport for SimulatedDevice {
    fn configure(&mut self, settings: &LineSettings) -> io::Result<()> {
        self.line_settings = Some(*settings);
        Ok(())
    }

    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }

    fn purge(&mut self, direction: Direction) -> io::Result<()> {
        self.purges.push(direction);
        Ok(())
    }

    fn sleep(&mut self, _duration: Duration) {}
}

/// Open a session on a simulated device without the settle delay
#[allow(dead_code)]
pub fn open(device: &mut SimulatedDevice) -> Session<&mut SimulatedDevice> {
    let generation = device.generation;
    Session::open(device, generation).expect("Failed to open session")
}
