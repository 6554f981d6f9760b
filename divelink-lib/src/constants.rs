// Protocol constants for the DeepSix link and the profile decoders

use std::time::Duration;

/// Size of the binary frame header: cmd, subcmd, flag, length
pub const FRAME_HEADER_SIZE: usize = 4;

/// Size of the trailing checksum byte
pub const FRAME_CHECKSUM_SIZE: usize = 1;

/// Flag byte carried by every binary frame
pub const FRAME_FLAG: u8 = 0x01;

/// Largest payload of an Excursion binary frame
pub const MAX_PACKET: usize = 255;

/// Largest logical payload of a legacy hex-text frame
pub const LEGACY_MAX_PACKET: usize = 200;

/// Leading marker of a legacy hex-text frame
pub const LEGACY_FRAME_MARKER: u8 = b'$';

/// Trailing terminator of a legacy hex-text frame
pub const LEGACY_FRAME_TERMINATOR: u8 = b'\n';

/// INFO group: serial number
pub const INFO_SERIAL_NUMBER: u8 = 0x03;

/// INFO group: index of the most recent dive
pub const INFO_LAST_DIVE_INDEX: u8 = 0x04;

/// LOG group: per-dive header
pub const LOG_INFO: u8 = 0x02;

/// LOG group: chunk of the dive profile
pub const LOG_PROFILE: u8 = 0x03;

/// SETTINGS group: date
pub const SETTING_DATE: u8 = 0x01;

/// SETTINGS group: time of day
pub const SETTING_TIME: u8 = 0x03;

/// Length of the serial number reply
pub const SERIAL_NUMBER_LEN: usize = 12;

/// Fingerprint window: the packed start date and time of the dive
pub const FINGERPRINT_OFFSET: usize = 12;
pub const FINGERPRINT_SIZE: usize = 6;

/// Dive header size of the Excursion firmware
pub const EXCURSION_HEADER_SIZE: usize = 156;

/// Dive header size of the legacy Deep6 firmware
pub const DEEP6_HEADER_SIZE: usize = 165;

/// Serial line defaults used when a session is opened
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Oceanic memory page size; surface markers span one page
pub const PAGE_SIZE: usize = 16;

/// Standard atmosphere in millibar, used when a header carries no surface pressure
pub const DEFAULT_SURFACE_PRESSURE_MBAR: u32 = 1013;

/// Initial tank pressure reported when no transmitter is paired
pub const NO_TRANSMITTER_PSI: u32 = 10000;

/// Oxygen value stored for an air slot
pub const AIR_OXYGEN_PERCENT: u8 = 21;

/// Years below this were stored with a single BCD digit
pub const YEAR_ERA_THRESHOLD: u32 = 2010;
