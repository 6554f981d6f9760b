//! Byte-stream link to the dive computer.
//!
//! The physical connection (serial port, BLE bridge, socket) lives outside this crate.
//! Anything that can read and write bytes and understands the few line controls below
//! can carry a [`Session`](crate::device::Session).

use std::io::{self, Read, Write};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlowControl {
    #[default]
    None,
    Hardware,
    Software,
}

/// Which buffered bytes a purge discards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    All,
}

/// Serial line parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl LineSettings {
    /// 8 data bits, no parity, one stop bit, no flow control
    pub const fn eight_n_one(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// A half-duplex byte link.
///
/// `read_exact` must block until the requested bytes arrive or the configured timeout
/// elapses, in which case it returns an error (usually [`io::ErrorKind::TimedOut`]).
pub trait Transport: Read + Write {
    fn configure(&mut self, settings: &LineSettings) -> io::Result<()>;

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    fn purge(&mut self, direction: Direction) -> io::Result<()>;

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn configure(&mut self, settings: &LineSettings) -> io::Result<()> {
        (**self).configure(settings)
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }

    fn purge(&mut self, direction: Direction) -> io::Result<()> {
        (**self).purge(direction)
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn configure(&mut self, settings: &LineSettings) -> io::Result<()> {
        (**self).configure(settings)
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }

    fn purge(&mut self, direction: Direction) -> io::Result<()> {
        (**self).purge(direction)
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}
