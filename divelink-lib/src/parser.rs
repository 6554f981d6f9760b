//! Dive buffer decoding: summary fields and the sample stream.

use crate::constants::{AIR_OXYGEN_PERCENT, DEFAULT_SURFACE_PRESSURE_MBAR};
use crate::datetime::{self, DateTime, bcd2dec};
use crate::descriptor::*;
use crate::error::DcError;
use crate::samples::{SampleEvent, Samples, StreamContext};
use crate::units::{feet_to_meters, pressure_to_depth};
use bytes::Bytes;
use chrono::Datelike;
use strum_macros::Display;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gas fractions, 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasMix {
    pub oxygen: f64,
    pub helium: f64,
    pub nitrogen: f64,
}

impl GasMix {
    fn from_percent(oxygen: u8, helium: u8) -> Self {
        let oxygen = f64::from(oxygen) / 100.0;
        let helium = f64::from(helium) / 100.0;
        Self {
            oxygen,
            helium,
            nitrogen: 1.0 - oxygen - helium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WaterType {
    #[strum(to_string = "fresh")]
    Fresh,
    #[strum(to_string = "salt")]
    Salt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Salinity {
    pub water: WaterType,
    /// kg/m³, zero when the device does not record it
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FieldType {
    DiveTime,
    MaxDepth,
    GasMixCount,
    GasMix,
    Salinity,
    Atmospheric,
    DiveMode,
    String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum FieldValue {
    /// Seconds
    DiveTime(u32),
    /// Metres
    MaxDepth(f64),
    GasMixCount(usize),
    GasMix(GasMix),
    Salinity(Salinity),
    /// Bar
    Atmospheric(f64),
    DiveMode(DiveMode),
    String { desc: &'static str, value: String },
}

/// Everything the header and footer of a dive say about it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiveSummary {
    pub datetime: DateTime,
    pub divetime: u32,
    pub maxdepth: f64,
    pub mode: DiveMode,
    pub gasmixes: Vec<GasMix>,
    pub salinity: Option<Salinity>,
    pub atmospheric: Option<f64>,
    pub serial: Option<String>,
    pub firmware: Option<String>,
}

fn check_size(data: &[u8], descriptor: &Descriptor) -> Result<(), DcError> {
    if data.len() < descriptor.min_size() {
        return Err(DcError::DataFormat(format!(
            "{} dive of {} bytes, need at least {}",
            descriptor.name,
            data.len(),
            descriptor.min_size()
        )));
    }
    Ok(())
}

fn dive_mode(data: &[u8], descriptor: &Descriptor) -> Result<DiveMode, DcError> {
    match descriptor.mode {
        ModeLayout::Fixed(mode) => Ok(mode),
        ModeLayout::Code(field) => {
            let code = field.read(data)?;
            u8::try_from(code)
                .ok()
                .and_then(|code| DiveMode::try_from(code).ok())
                .ok_or_else(|| DcError::DataFormat(format!("unknown activity code {code}")))
        }
    }
}

fn gasmix_count(data: &[u8], descriptor: &Descriptor, mode: DiveMode) -> Result<usize, DcError> {
    let Some(layout) = descriptor.gasmixes else {
        return Ok(0);
    };
    if mode == DiveMode::Freedive {
        return Ok(0);
    }
    match layout.count {
        MixCount::Fixed(count) => Ok(count),
        MixCount::Flags { field, table, default } => {
            let flags = field.read(data)?;
            Ok(table
                .iter()
                .find(|(bit, _)| flags & bit != 0)
                .map_or(default, |(_, count)| *count))
        }
    }
}

fn surface_mbar(data: &[u8], descriptor: &Descriptor) -> Result<u32, DcError> {
    descriptor
        .surface_pressure
        .map_or(Ok(DEFAULT_SURFACE_PRESSURE_MBAR), |field| field.read(data))
}

/// Refuse sample streams recorded by firmware with an unknown record layout
fn check_firmware(data: &[u8], descriptor: &Descriptor) -> Result<(), DcError> {
    let (Some(tag), Some(field)) = (descriptor.undecoded_firmware, descriptor.firmware) else {
        return Ok(());
    };
    if data.get(field.offset..field.offset + field.len) == Some(tag) {
        return Err(DcError::Unsupported(format!(
            "{} samples from firmware {}",
            descriptor.name,
            String::from_utf8_lossy(tag)
        )));
    }
    Ok(())
}

fn byte_at(data: &[u8], offset: usize) -> Result<u8, DcError> {
    data.get(offset)
        .copied()
        .ok_or_else(|| DcError::out_of_bounds("byte", offset, data.len()))
}

/// Text up to the first NUL
fn text(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

/// Lazily decode the samples of a dive buffer
pub fn decode_samples<'a>(data: &'a [u8], descriptor: &Descriptor) -> Result<Samples<'a>, DcError> {
    check_size(data, descriptor)?;
    check_firmware(data, descriptor)?;
    let mode = dive_mode(data, descriptor)?;
    let gasmixes = gasmix_count(data, descriptor, mode)?;
    let surface = surface_mbar(data, descriptor)?;
    let (ctx, track) = StreamContext::new(descriptor, data, mode, gasmixes, surface)?;

    let start = descriptor.header_size + descriptor.serial_len;
    let end = data.len() - descriptor.footer_size;
    debug!(model = descriptor.name, %mode, start, end, "Decoding samples");
    Ok(Samples::new(ctx, track, &data[start..end]))
}

/// Decode the summary of a dive buffer, resolving years against the local clock
pub fn decode_summary(
    data: &[u8],
    descriptor: &'static Descriptor,
) -> Result<DiveSummary, DcError> {
    let mut parser = Parser::from_descriptor(descriptor);
    parser.set_data(Bytes::copy_from_slice(data))?;
    parser.summary()
}

/// Decoder for one model, fed one dive buffer at a time
#[derive(Debug, Clone)]
pub struct Parser {
    descriptor: &'static Descriptor,
    host_serial: Option<u32>,
    current_year: u32,
    data: Option<Bytes>,
}

impl Parser {
    pub fn new(model: u32) -> Result<Self, DcError> {
        Ok(Self::from_descriptor(select_variant(model)?))
    }

    /// Parser for models that do not embed their serial number in the dive
    pub fn with_serial(model: u32, serial: u32) -> Result<Self, DcError> {
        let mut parser = Self::new(model)?;
        parser.host_serial = Some(serial);
        Ok(parser)
    }

    pub fn from_descriptor(descriptor: &'static Descriptor) -> Self {
        Self {
            descriptor,
            host_serial: None,
            current_year: chrono::Local::now().year().max(0) as u32,
            data: None,
        }
    }

    /// Year used to place single-digit years in a decade
    pub fn with_reference_year(mut self, year: u32) -> Self {
        self.current_year = year;
        self
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    pub fn set_data(&mut self, data: impl Into<Bytes>) -> Result<(), DcError> {
        let data = data.into();
        check_size(&data, self.descriptor)?;
        self.data = Some(data);
        Ok(())
    }

    fn data(&self) -> Result<&[u8], DcError> {
        self.data
            .as_deref()
            .ok_or_else(|| DcError::InvalidArgument("no dive data set".to_string()))
    }

    pub fn datetime(&self) -> Result<DateTime, DcError> {
        datetime::decode(self.descriptor.datetime, self.data()?, self.current_year)
    }

    pub fn mode(&self) -> Result<DiveMode, DcError> {
        dive_mode(self.data()?, self.descriptor)
    }

    pub fn gasmixes(&self) -> Result<Vec<GasMix>, DcError> {
        let data = self.data()?;
        let count = gasmix_count(data, self.descriptor, self.mode()?)?;
        (0..count).map(|index| self.gasmix(data, index)).collect()
    }

    fn gasmix(&self, data: &[u8], index: usize) -> Result<GasMix, DcError> {
        let Some(layout) = self.descriptor.gasmixes else {
            return Err(DcError::Unsupported("gas mixes".to_string()));
        };
        let oxygen = match byte_at(data, layout.oxygen + index * layout.step)? {
            0 => AIR_OXYGEN_PERCENT,
            oxygen => oxygen,
        };
        let helium = match layout.helium {
            Some(offset) => byte_at(data, offset + index)?,
            None => 0,
        };
        Ok(GasMix::from_percent(oxygen, helium))
    }

    pub fn divetime(&self) -> Result<u32, DcError> {
        let data = self.data()?;
        match self.descriptor.divetime {
            DivetimeLayout::Seconds(field) => field.read(data),
            DivetimeLayout::BcdMinutesSeconds { minutes, seconds } => {
                Ok(bcd2dec(byte_at(data, minutes)?) * 60 + bcd2dec(byte_at(data, seconds)?))
            }
            DivetimeLayout::FromSamples => {
                let mut samples = self.samples()?;
                for event in samples.by_ref() {
                    event?;
                }
                Ok(samples.elapsed())
            }
        }
    }

    pub fn maxdepth(&self) -> Result<f64, DcError> {
        let data = self.data()?;
        match self.descriptor.maxdepth {
            MaxDepthLayout::Millibar(field) => {
                Ok(pressure_to_depth(field.read(data)?, surface_mbar(data, self.descriptor)?))
            }
            MaxDepthLayout::SixteenthFeet { anchor, field } => {
                let base = match anchor {
                    Anchor::Start => 0,
                    Anchor::Footer => data.len() - self.descriptor.footer_size,
                };
                Ok(feet_to_meters(f64::from(field.read(&data[base..])?) / 16.0))
            }
        }
    }

    pub fn salinity(&self) -> Result<Option<Salinity>, DcError> {
        let Some(field) = self.descriptor.salinity else {
            return Ok(None);
        };
        let water = if field.read(self.data()?)? != 0 {
            WaterType::Fresh
        } else {
            WaterType::Salt
        };
        Ok(Some(Salinity { water, density: 0.0 }))
    }

    /// Surface pressure in bar, when the header records it
    pub fn atmospheric(&self) -> Result<Option<f64>, DcError> {
        match self.descriptor.surface_pressure {
            Some(field) => Ok(Some(f64::from(field.read(self.data()?)?) / 1000.0)),
            None => Ok(None),
        }
    }

    pub fn serial(&self) -> Result<Option<String>, DcError> {
        let data = self.data()?;
        if self.descriptor.serial_len > 0 {
            let start = self.descriptor.header_size;
            return Ok(Some(text(&data[start..start + self.descriptor.serial_len])));
        }
        Ok(self.host_serial.map(|serial| format!("{serial:06}")))
    }

    pub fn firmware(&self) -> Result<Option<String>, DcError> {
        let data = self.data()?;
        self.descriptor
            .firmware
            .map(|field| {
                data.get(field.offset..field.offset + field.len)
                    .map(text)
                    .ok_or_else(|| DcError::out_of_bounds("firmware", field.offset, data.len()))
            })
            .transpose()
    }

    /// Query a single summary field. `flags` selects the gas mix or string.
    pub fn field(&self, field: FieldType, flags: u32) -> Result<FieldValue, DcError> {
        let unsupported = || DcError::Unsupported(format!("{field} on {}", self.descriptor.name));
        match field {
            FieldType::DiveTime => self.divetime().map(FieldValue::DiveTime),
            FieldType::MaxDepth => self.maxdepth().map(FieldValue::MaxDepth),
            FieldType::GasMixCount => {
                if self.descriptor.gasmixes.is_none() {
                    return Err(unsupported());
                }
                Ok(FieldValue::GasMixCount(self.gasmixes()?.len()))
            }
            FieldType::GasMix => {
                if self.descriptor.gasmixes.is_none() {
                    return Err(unsupported());
                }
                let mixes = self.gasmixes()?;
                mixes
                    .get(flags as usize)
                    .copied()
                    .map(FieldValue::GasMix)
                    .ok_or_else(|| {
                        DcError::InvalidArgument(format!("gas mix {flags} of {}", mixes.len()))
                    })
            }
            FieldType::Salinity => {
                self.salinity()?.map(FieldValue::Salinity).ok_or_else(unsupported)
            }
            FieldType::Atmospheric => {
                self.atmospheric()?.map(FieldValue::Atmospheric).ok_or_else(unsupported)
            }
            FieldType::DiveMode => self.mode().map(FieldValue::DiveMode),
            FieldType::String => {
                let (desc, value) = match flags {
                    0 => ("Serial", self.serial()?),
                    1 => ("Firmware", self.firmware()?),
                    _ => return Err(DcError::Unsupported(format!("string field {flags}"))),
                };
                value
                    .map(|value| FieldValue::String { desc, value })
                    .ok_or_else(unsupported)
            }
        }
    }

    pub fn summary(&self) -> Result<DiveSummary, DcError> {
        Ok(DiveSummary {
            datetime: self.datetime()?,
            divetime: self.divetime()?,
            maxdepth: self.maxdepth()?,
            mode: self.mode()?,
            gasmixes: self.gasmixes()?,
            salinity: self.salinity()?,
            atmospheric: self.atmospheric()?,
            serial: self.serial()?,
            firmware: self.firmware()?,
        })
    }

    pub fn samples(&self) -> Result<Samples<'_>, DcError> {
        decode_samples(self.data()?, self.descriptor)
    }

    /// Feed every sample event to `callback`. Events delivered before an error stand.
    pub fn samples_foreach<F>(&self, mut callback: F) -> Result<(), DcError>
    where
        F: FnMut(&SampleEvent),
    {
        for event in self.samples()? {
            callback(&event?);
        }
        Ok(())
    }
}
