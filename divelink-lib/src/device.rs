use crate::constants::*;
use crate::error::DcError;
use crate::generation::{DiveHeader, ProtocolGeneration};
use crate::link::Link;
use crate::packet::CommandGroup;
use crate::transport::{Direction, LineSettings, Transport};
use bytes::Bytes;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use strum_macros::Display;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line parameters applied when a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    pub baud_rate: u32,
    pub timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Cooperative cancellation flag, checked before each dive
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    pub current: u32,
    pub maximum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Progress(Progress),
    DevInfo { serial: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    #[strum(to_string = "fingerprint match")]
    FingerprintMatch,
    #[strum(to_string = "stop requested by callback")]
    CallbackRequested,
}

/// Result of a dive enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyncStatus {
    Complete { dives: usize },
    StoppedEarly { dives: usize, reason: StopReason },
    Cancelled { dives: usize },
}

impl SyncStatus {
    /// Number of dives handed to the callback
    pub fn dives(&self) -> usize {
        match *self {
            SyncStatus::Complete { dives }
            | SyncStatus::StoppedEarly { dives, .. }
            | SyncStatus::Cancelled { dives } => dives,
        }
    }
}

/// One downloaded dive: header, optional serial number, then the raw profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dive {
    pub number: u16,
    pub data: Bytes,
    header_len: usize,
    fingerprint: Range<usize>,
}

impl Dive {
    pub fn fingerprint(&self) -> &[u8] {
        &self.data[self.fingerprint.clone()]
    }

    pub fn header(&self) -> &[u8] {
        &self.data[..self.header_len]
    }
}

enum DiveOutcome {
    Delivered,
    Stopped(StopReason),
}

type EventHandler = Box<dyn FnMut(DeviceEvent) + Send>;

/// A DeepSix download session owning its transport
pub struct Session<T> {
    link: Link<T>,
    generation: ProtocolGeneration,
    fingerprint: Vec<u8>,
    cancel: CancelToken,
    events: Option<EventHandler>,
}

impl<T: Transport> Session<T> {
    pub fn open(transport: T, generation: ProtocolGeneration) -> Result<Self, DcError> {
        Self::open_with(transport, generation, SessionConfig::default())
    }

    pub fn open_with(
        mut transport: T,
        generation: ProtocolGeneration,
        config: SessionConfig,
    ) -> Result<Self, DcError> {
        // Bluetooth bridges reject line settings; the link still works without them.
        if let Err(e) = transport.configure(&LineSettings::eight_n_one(config.baud_rate)) {
            warn!("Failed to set the line settings: {e}");
        }
        if let Err(e) = transport.set_timeout(config.timeout) {
            warn!("Failed to set the timeout: {e}");
        }

        transport.sleep(config.settle_delay);
        transport.purge(Direction::All)?;
        info!(generation = generation.name, baud = config.baud_rate, "Session opened");

        Ok(Self {
            link: Link::new(transport, generation.codec.build()),
            generation,
            fingerprint: vec![0; generation.header.fingerprint_size],
            cancel: CancelToken::default(),
            events: None,
        })
    }

    pub fn generation(&self) -> &ProtocolGeneration {
        &self.generation
    }

    pub fn link_mut(&mut self) -> &mut Link<T> {
        &mut self.link
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn set_event_handler(&mut self, handler: impl FnMut(DeviceEvent) + Send + 'static) {
        self.events = Some(Box::new(handler));
    }

    fn emit(&mut self, event: DeviceEvent) {
        if let Some(handler) = self.events.as_mut() {
            handler(event);
        }
    }

    /// Set the fingerprint of the newest dive already known. Empty resets it.
    pub fn set_fingerprint(&mut self, fingerprint: &[u8]) -> Result<(), DcError> {
        let size = self.generation.header.fingerprint_size;
        if fingerprint.is_empty() {
            self.fingerprint = vec![0; size];
        } else if fingerprint.len() == size {
            self.fingerprint = fingerprint.to_vec();
        } else {
            return Err(DcError::InvalidArgument(format!(
                "fingerprint of {} bytes, expected {size}",
                fingerprint.len()
            )));
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    /// Number of dives stored on the device
    pub fn dive_count(&mut self) -> Result<u16, DcError> {
        let response = self
            .link
            .transact(CommandGroup::Info, INFO_LAST_DIVE_INDEX, &[0, 0], 2)?;
        match response.payload.as_ref() {
            [lo, hi] => Ok(u16::from_le_bytes([*lo, *hi])),
            other => Err(DcError::Protocol(format!(
                "short dive index reply: {} bytes",
                other.len()
            ))),
        }
    }

    fn serial_bytes(&mut self) -> Result<[u8; SERIAL_NUMBER_LEN], DcError> {
        let response = self
            .link
            .transact(CommandGroup::Info, INFO_SERIAL_NUMBER, &[], SERIAL_NUMBER_LEN)?;
        let mut serial = [0u8; SERIAL_NUMBER_LEN];
        serial[..response.payload.len()].copy_from_slice(&response.payload);
        Ok(serial)
    }

    pub fn serial_number(&mut self) -> Result<String, DcError> {
        let serial = self.serial_bytes()?;
        Ok(serial_string(&serial))
    }

    /// Download every dive newer than the fingerprint.
    ///
    /// The callback receives each dive in device order and returns `false` to stop.
    pub fn foreach<F>(&mut self, mut callback: F) -> Result<SyncStatus, DcError>
    where
        F: FnMut(&Dive) -> bool,
    {
        self.emit(DeviceEvent::Progress(Progress::default()));

        let serial = self.serial_bytes()?;
        self.emit(DeviceEvent::DevInfo {
            serial: serial_string(&serial),
        });

        let count = self.dive_count()?;
        info!(count, "Dives on device");
        if count == 0 {
            return Ok(SyncStatus::Complete { dives: 0 });
        }

        let mut progress = Progress {
            current: 0,
            maximum: u32::from(count),
        };
        self.emit(DeviceEvent::Progress(progress));

        let mut delivered = 0usize;
        for number in self.generation.order.numbers(count) {
            if self.cancel.is_cancelled() {
                info!(number, delivered, "Download cancelled");
                return Ok(SyncStatus::Cancelled { dives: delivered });
            }

            let outcome = self.download_dive(number, &serial, &mut callback)?;
            if let DiveOutcome::Stopped(StopReason::FingerprintMatch) = outcome {
                info!(number, delivered, "Download stopped at a known dive");
                return Ok(SyncStatus::StoppedEarly {
                    dives: delivered,
                    reason: StopReason::FingerprintMatch,
                });
            }

            delivered += 1;
            progress.current += 1;
            self.emit(DeviceEvent::Progress(progress));

            if let DiveOutcome::Stopped(reason) = outcome {
                info!(number, delivered, %reason, "Download stopped early");
                return Ok(SyncStatus::StoppedEarly {
                    dives: delivered,
                    reason,
                });
            }
        }

        Ok(SyncStatus::Complete { dives: delivered })
    }

    fn download_dive<F>(
        &mut self,
        number: u16,
        serial: &[u8; SERIAL_NUMBER_LEN],
        callback: &mut F,
    ) -> Result<DiveOutcome, DcError>
    where
        F: FnMut(&Dive) -> bool,
    {
        let layout = self.generation.header;
        let reply = self
            .link
            .transact(CommandGroup::Logs, LOG_INFO, &number.to_le_bytes(), layout.size)?;
        let header = DiveHeader::parse(&reply.payload, layout)?;

        // The all-zero default matches nothing, so blank headers never end a sync.
        let armed = self.fingerprint.iter().any(|b| *b != 0);
        if armed && header.fingerprint() == self.fingerprint.as_slice() {
            debug!(number, fingerprint = hex::encode(header.fingerprint()), "Fingerprint match");
            return Ok(DiveOutcome::Stopped(StopReason::FingerprintMatch));
        }

        let length = header.profile_length()?;
        let serial_len = self.generation.serial_len.min(SERIAL_NUMBER_LEN);
        let mut data = Vec::new();
        data.try_reserve_exact(layout.size + serial_len + length)?;
        data.extend_from_slice(header.as_bytes());
        data.extend_from_slice(&serial[..serial_len]);
        self.link
            .fetch_bulk_into(number, length, self.generation.bulk_replies, &mut data)?;
        debug!(number, size = data.len(), profile = length, "Dive downloaded");

        let dive = Dive {
            number,
            data: Bytes::from(data),
            header_len: layout.size,
            fingerprint: layout.fingerprint_range(),
        };
        if callback(&dive) {
            Ok(DiveOutcome::Delivered)
        } else {
            Ok(DiveOutcome::Stopped(StopReason::CallbackRequested))
        }
    }

    /// Set the device clock. The device does not acknowledge these writes.
    pub fn timesync(&mut self, datetime: NaiveDateTime) -> Result<(), DcError> {
        let year = datetime.year();
        let year = u8::try_from(year - 2000)
            .map_err(|_| DcError::InvalidArgument(format!("year {year} out of range")))?;

        let date = [year, datetime.month() as u8, datetime.day() as u8];
        let time = [
            datetime.hour() as u8,
            datetime.minute() as u8,
            datetime.second() as u8,
        ];
        self.link.send(CommandGroup::Settings, SETTING_DATE, &date)?;
        self.link.send(CommandGroup::Settings, SETTING_TIME, &time)?;
        info!(%datetime, "Clock synchronised");
        Ok(())
    }

    /// Release the session and hand back the transport
    pub fn close(self) -> T {
        info!(generation = self.generation.name, "Session closed");
        self.link.into_inner()
    }
}

/// Printable part of the serial number reply
fn serial_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}
