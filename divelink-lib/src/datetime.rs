//! Dive start times as stored by the various firmware families.

use crate::constants::YEAR_ERA_THRESHOLD;
use crate::error::DcError;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Calendar fields exactly as decoded; not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DateTime {
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Bit-packing scheme of the start time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeLayout {
    /// Six plain bytes at `offset`: year-2000, month, day, hour, minute, second
    Sequential { offset: usize },
    /// Day high bit in byte 0, year spread over bytes 5 and 7
    PackedA,
    /// Year split over bytes 3 and 4, month in the high nibble of 4
    PackedB,
    /// Year in the low bits of byte 3, month in byte 7
    PackedC,
    /// BCD year tens in the top of byte 3
    PackedBcd,
    /// Freedive BCD block at bytes 6..=8 and 12..=13
    FreediveBcd,
    /// BCD date at bytes 13..=15, binary time at 10..=11
    BcdDate,
    /// Binary date at bytes 8..=10, BCD time
    BinaryDate,
}

impl DateTimeLayout {
    /// Bytes the scheme reads from the start of the buffer
    pub fn required(self) -> usize {
        match self {
            DateTimeLayout::Sequential { offset } => offset + 6,
            DateTimeLayout::PackedA | DateTimeLayout::PackedC => 8,
            DateTimeLayout::PackedB | DateTimeLayout::PackedBcd => 5,
            DateTimeLayout::FreediveBcd => 14,
            DateTimeLayout::BcdDate => 16,
            DateTimeLayout::BinaryDate => 11,
        }
    }

    /// Oceanic packed schemes: 12-hour clock and single-digit years
    fn packed(self) -> bool {
        !matches!(self, DateTimeLayout::Sequential { .. })
    }
}

pub fn bcd2dec(value: u8) -> u32 {
    u32::from(value >> 4) * 10 + u32::from(value & 0x0F)
}

/// Reinterpret a year stored with only its last digit.
///
/// The digit is placed in the current decade, or the one before if it is ahead of
/// the current year's last digit. This guesses wrong for dives more than ten years old.
pub fn resolve_year(year: u32, current_year: u32) -> u32 {
    if year >= YEAR_ERA_THRESHOLD || current_year < YEAR_ERA_THRESHOLD {
        return year;
    }
    let mut decade = current_year / 10 * 10;
    if year % 10 > current_year % 10 {
        decade -= 10;
    }
    year + decade - 2000
}

/// Decode the start time at the front of `data`
pub fn decode(layout: DateTimeLayout, data: &[u8], current_year: u32) -> Result<DateTime, DcError> {
    if data.len() < layout.required() {
        return Err(DcError::DataFormat(format!(
            "start time needs {} bytes, buffer has {}",
            layout.required(),
            data.len()
        )));
    }
    let p = data;
    let mut pm = p[1] & 0x80 != 0;

    let mut dt = match layout {
        DateTimeLayout::Sequential { offset } => {
            let p = &data[offset..offset + 6];
            DateTime {
                year: u32::from(p[0]) + 2000,
                month: u32::from(p[1]),
                day: u32::from(p[2]),
                hour: u32::from(p[3]),
                minute: u32::from(p[4]),
                second: u32::from(p[5]),
            }
        }
        DateTimeLayout::PackedA => DateTime {
            year: u32::from((p[5] & 0xE0) >> 5) + u32::from((p[7] & 0xE0) >> 2) + 2000,
            month: u32::from(p[3] & 0x0F),
            day: u32::from((p[0] & 0x80) >> 3) + u32::from((p[3] & 0xF0) >> 4),
            hour: bcd2dec(p[1] & 0x1F),
            minute: bcd2dec(p[0] & 0x7F),
            second: 0,
        },
        DateTimeLayout::PackedB => DateTime {
            year: u32::from((p[3] & 0xE0) >> 1) + u32::from(p[4] & 0x0F) + 2000,
            month: u32::from((p[4] & 0xF0) >> 4),
            day: u32::from(p[3] & 0x1F),
            hour: bcd2dec(p[1] & 0x1F),
            minute: bcd2dec(p[0]),
            second: 0,
        },
        DateTimeLayout::PackedC => DateTime {
            year: u32::from(p[3] & 0x1F) + 2000,
            month: u32::from((p[7] & 0xF0) >> 4),
            day: u32::from((p[3] & 0x80) >> 3) + u32::from((p[5] & 0xF0) >> 4),
            hour: bcd2dec(p[1] & 0x1F),
            minute: bcd2dec(p[0]),
            second: 0,
        },
        DateTimeLayout::PackedBcd => DateTime {
            year: bcd2dec(((p[3] & 0xC0) >> 2) + (p[4] & 0x0F)) + 2000,
            month: u32::from((p[4] & 0xF0) >> 4),
            day: bcd2dec(p[3] & 0x3F),
            hour: bcd2dec(p[1] & 0x1F),
            minute: bcd2dec(p[0]),
            second: 0,
        },
        DateTimeLayout::FreediveBcd => {
            pm = p[13] & 0x80 != 0;
            DateTime {
                year: bcd2dec(p[6]) + 2000,
                month: bcd2dec(p[7]),
                day: bcd2dec(p[8]),
                hour: bcd2dec(p[13] & 0x7F),
                minute: bcd2dec(p[12]),
                second: 0,
            }
        }
        DateTimeLayout::BcdDate => DateTime {
            year: bcd2dec(p[13]) + 2000,
            month: bcd2dec(p[14]),
            day: bcd2dec(p[15]),
            hour: u32::from(p[11]),
            minute: u32::from(p[10]),
            second: 0,
        },
        DateTimeLayout::BinaryDate => DateTime {
            year: u32::from(p[10]) + 2000,
            month: u32::from(p[8]),
            day: u32::from(p[9]),
            hour: bcd2dec(p[1] & 0x1F),
            minute: bcd2dec(p[0]),
            second: 0,
        },
    };

    if layout.packed() {
        dt.year = resolve_year(dt.year, current_year);
        dt.hour %= 12;
        if pm {
            dt.hour += 12;
        }
    }
    Ok(dt)
}
