//! Per-model layout tables.
//!
//! Every byte the decoder reads is located through a [`Descriptor`]. Models that share
//! a layout share the same building blocks; the table at the bottom is the only place
//! a model id is mentioned.

use crate::constants::{EXCURSION_HEADER_SIZE, PAGE_SIZE, SERIAL_NUMBER_LEN};
use crate::datetime::DateTimeLayout;
use crate::error::DcError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer encodings found in dive buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U8,
    U16Le,
    U16Be,
    U32Le,
}

impl Width {
    pub const fn size(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16Le | Width::U16Be => 2,
            Width::U32Le => 4,
        }
    }
}

/// A masked and shifted integer at a fixed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub offset: usize,
    pub width: Width,
    pub mask: u32,
    pub shift: u8,
}

impl BitField {
    pub const fn byte(offset: usize) -> Self {
        Self {
            offset,
            width: Width::U8,
            mask: 0xFF,
            shift: 0,
        }
    }

    pub const fn bits(offset: usize, mask: u8, shift: u8) -> Self {
        Self {
            offset,
            width: Width::U8,
            mask: mask as u32,
            shift,
        }
    }

    pub const fn le16(offset: usize) -> Self {
        Self {
            offset,
            width: Width::U16Le,
            mask: 0xFFFF,
            shift: 0,
        }
    }

    pub const fn be16(offset: usize) -> Self {
        Self {
            offset,
            width: Width::U16Be,
            mask: 0xFFFF,
            shift: 0,
        }
    }

    pub const fn le32(offset: usize) -> Self {
        Self {
            offset,
            width: Width::U32Le,
            mask: u32::MAX,
            shift: 0,
        }
    }

    pub const fn masked(self, mask: u32) -> Self {
        Self { mask, ..self }
    }

    pub fn end(&self) -> usize {
        self.offset + self.width.size()
    }

    pub fn read(&self, data: &[u8]) -> Result<u32, DcError> {
        let raw = data
            .get(self.offset..self.end())
            .ok_or_else(|| DcError::out_of_bounds("field", self.offset, data.len()))?;
        let value = match self.width {
            Width::U8 => u32::from(raw[0]),
            Width::U16Le => u32::from(u16::from_le_bytes([raw[0], raw[1]])),
            Width::U16Be => u32::from(u16::from_be_bytes([raw[0], raw[1]])),
            Width::U32Le => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
        };
        Ok((value & self.mask) >> self.shift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DiveMode {
    #[strum(to_string = "open circuit")]
    OpenCircuit = 0,
    #[strum(to_string = "gauge")]
    Gauge = 1,
    #[strum(to_string = "freedive")]
    Freedive = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeLayout {
    Fixed(DiveMode),
    /// Activity code: 0 normal, 1 gauge, 2 freedive
    Code(BitField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivetimeLayout {
    Seconds(BitField),
    BcdMinutesSeconds { minutes: usize, seconds: usize },
    /// Time of the last sample
    FromSamples,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxDepthLayout {
    /// Absolute pressure, compensated with the surface pressure
    Millibar(BitField),
    SixteenthFeet { anchor: Anchor, field: BitField },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixCount {
    Fixed(usize),
    /// First matching flag bit gives the count
    Flags {
        field: BitField,
        table: &'static [(u32, usize)],
        default: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMixLayout {
    pub oxygen: usize,
    pub helium: Option<usize>,
    pub step: usize,
    pub count: MixCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField {
    pub offset: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalLayout {
    Fixed(u32),
    Seconds(BitField),
    /// Two-bit code selecting (interval, records per interval)
    Coded { field: BitField, table: [(u32, u32); 4] },
}

impl IntervalLayout {
    /// Sampling interval in seconds and the number of records logged per interval
    pub fn resolve(&self, data: &[u8]) -> Result<(u32, u32), DcError> {
        let (interval, samplerate) = match *self {
            IntervalLayout::Fixed(seconds) => (seconds, 1),
            IntervalLayout::Seconds(field) => (field.read(data)?, 1),
            IntervalLayout::Coded { field, table } => table[(field.read(data)? & 0x03) as usize],
        };
        if interval == 0 {
            return Err(DcError::DataFormat("zero sampling interval".to_string()));
        }
        Ok((interval, samplerate))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthField {
    SixteenthFeet(BitField),
    Millibar(BitField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignBit {
    pub field: BitField,
    pub inverted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureField {
    Fahrenheit(BitField),
    /// Change against the previous sample, sign in a separate bit
    FahrenheitDelta { sign: SignBit, delta: BitField },
    /// Absolute °F assembled from bit groups, each shifted left by its amount
    FahrenheitParts(&'static [(BitField, u8)]),
    TenthsCelsius(BitField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureLayout {
    /// Starting value, relative to the header sample
    pub initial: Option<usize>,
    pub field: TemperatureField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureField {
    /// psi = field * multiplier
    Absolute { field: BitField, multiplier: u32 },
    /// psi used since the previous sample
    Consumed(BitField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureLayout {
    /// Starting psi, relative to the header sample
    pub initial: BitField,
    pub field: PressureField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankSwitchField {
    pub tag: u8,
    /// One-based tank number; absent means the first tank
    pub tank: Option<BitField>,
    pub pressure: BitField,
    pub multiplier: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoField {
    /// Stop depth in 10 ft units, zero for no-deco
    pub stop: BitField,
    /// Minutes
    pub time: BitField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFraming {
    /// Fixed stride; the first byte may mark a surface interval or tank switch
    Markers {
        surface: Option<u8>,
        tank_switch: Option<TankSwitchField>,
    },
    /// The first byte selects the record type
    Tagged {
        sample: u8,
        skip: &'static [(u8, usize)],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleClock {
    Interval,
    /// BCD minute, hour, second at the start of each record
    BcdTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub size: usize,
    pub framing: RecordFraming,
    pub interval: IntervalLayout,
    pub clock: SampleClock,
    pub depth: DepthField,
    pub temperature: Option<TemperatureLayout>,
    pub pressure: Option<PressureLayout>,
    pub gasmix: Option<BitField>,
    pub deco: Option<DecoField>,
    pub rbt: Option<BitField>,
    pub bookmark: Option<BitField>,
}

/// Replacement sample layout for freedives: depth only, no markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreediveLayout {
    pub size: usize,
    pub interval: IntervalLayout,
    pub depth: DepthField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub model: u32,
    pub name: &'static str,
    pub header_size: usize,
    pub footer_size: usize,
    /// Serial number bytes between header and profile
    pub serial_len: usize,
    /// Offset of the summary sample inside the header
    pub header_sample: usize,
    pub datetime: DateTimeLayout,
    pub mode: ModeLayout,
    pub divetime: DivetimeLayout,
    pub maxdepth: MaxDepthLayout,
    /// Surface pressure in mbar
    pub surface_pressure: Option<BitField>,
    pub gasmixes: Option<GasMixLayout>,
    /// Non-zero means fresh water
    pub salinity: Option<BitField>,
    pub firmware: Option<TextField>,
    /// Firmware tag whose profile uses a record layout this decoder does not read
    pub undecoded_firmware: Option<&'static [u8]>,
    pub samples: SampleLayout,
    pub freedive: Option<FreediveLayout>,
}

impl Descriptor {
    /// Smallest buffer the layout can describe
    pub fn min_size(&self) -> usize {
        self.header_size + self.serial_len + self.footer_size
    }
}

/// Model ids
pub mod model {
    /// DeepSix Excursion; not an Oceanic id
    pub const DEEPSIX_EXCURSION: u32 = 0x0601;

    pub const VT3: u32 = 0x4258;
    pub const ATOM2: u32 = 0x4342;
    pub const DATAMASK: u32 = 0x4347;
    pub const F10A: u32 = 0x434D;
    pub const OC1A: u32 = 0x434E;
    pub const VEO30: u32 = 0x435A;
    pub const GEO20: u32 = 0x4446;
    pub const ATOM31: u32 = 0x4456;
    pub const TX1: u32 = 0x4542;
    pub const AMPHOS: u32 = 0x4545;
    pub const F11A: u32 = 0x4549;
    pub const A300CS: u32 = 0x454C;
    pub const I450T: u32 = 0x4641;
    pub const I550: u32 = 0x4642;
}

const HALF_PAGE: usize = PAGE_SIZE / 2;
const OCEANIC_HEADER: usize = 9 * PAGE_SIZE / 2;
const OCEANIC_FOOTER: usize = 2 * PAGE_SIZE / 2;

const INTERVAL_AT_17: IntervalLayout = IntervalLayout::Coded {
    field: BitField::bits(0x17, 0x03, 0),
    table: [(2, 1), (15, 1), (30, 1), (60, 1)],
};
const INTERVAL_AT_1F: IntervalLayout = IntervalLayout::Coded {
    field: BitField::bits(0x1F, 0x03, 0),
    table: [(2, 1), (15, 1), (30, 1), (60, 1)],
};

const DEPTH_AT_2: DepthField = DepthField::SixteenthFeet(BitField::le16(2).masked(0x0FFF));
const DEPTH_AT_4: DepthField = DepthField::SixteenthFeet(BitField::le16(4).masked(0x0FFF));

const TEMPERATURE_AT_3: Option<TemperatureLayout> = Some(TemperatureLayout {
    initial: Some(7),
    field: TemperatureField::Fahrenheit(BitField::byte(3)),
});

const fn temperature_delta(sign: BitField, inverted: bool) -> Option<TemperatureLayout> {
    Some(TemperatureLayout {
        initial: Some(7),
        field: TemperatureField::FahrenheitDelta {
            sign: SignBit {
                field: sign,
                inverted,
            },
            delta: BitField::bits(7, 0x0C, 2),
        },
    })
}

const PRESSURE_CONSUMED: Option<PressureLayout> = Some(PressureLayout {
    initial: BitField::le16(2),
    field: PressureField::Consumed(BitField::byte(1)),
});

const PRESSURE_5PSI: Option<PressureLayout> = Some(PressureLayout {
    initial: BitField::le16(2),
    field: PressureField::Absolute {
        field: BitField::be16(0).masked(0x03FF),
        multiplier: 5,
    },
});

/// Tank number and 2 psi pressure, big endian at byte 4
const TANK_SWITCH: TankSwitchField = TankSwitchField {
    tag: 0xAA,
    tank: Some(BitField::bits(1, 0x03, 0)),
    pressure: BitField::be16(4).masked(0x0FFF),
    multiplier: 2,
};

const fn markers(tank_switch: TankSwitchField) -> RecordFraming {
    RecordFraming::Markers {
        surface: Some(0xBB),
        tank_switch: Some(tank_switch),
    }
}

const OCEANIC_SAMPLES: SampleLayout = SampleLayout {
    size: HALF_PAGE,
    framing: markers(TANK_SWITCH),
    interval: INTERVAL_AT_17,
    clock: SampleClock::Interval,
    depth: DEPTH_AT_2,
    temperature: temperature_delta(BitField::bits(0, 0x80, 7), true),
    pressure: PRESSURE_CONSUMED,
    gasmix: None,
    deco: None,
    rbt: None,
    bookmark: None,
};

const OCEANIC_FREEDIVE: FreediveLayout = FreediveLayout {
    size: PAGE_SIZE / 4,
    interval: IntervalLayout::Fixed(1),
    depth: DepthField::SixteenthFeet(BitField::le16(0)),
};

/// Layout shared by the Oceanic family, for a given header size
const fn oceanic(model: u32, name: &'static str, header_size: usize) -> Descriptor {
    let header_sample = header_size - HALF_PAGE;
    Descriptor {
        model,
        name,
        header_size,
        footer_size: OCEANIC_FOOTER,
        serial_len: 0,
        header_sample,
        datetime: DateTimeLayout::PackedBcd,
        mode: ModeLayout::Fixed(DiveMode::OpenCircuit),
        divetime: DivetimeLayout::FromSamples,
        maxdepth: MaxDepthLayout::SixteenthFeet {
            anchor: Anchor::Footer,
            field: BitField::le16(4).masked(0x0FFF),
        },
        surface_pressure: None,
        gasmixes: Some(GasMixLayout {
            oxygen: header_sample + 4,
            helium: None,
            step: 1,
            count: MixCount::Fixed(3),
        }),
        salinity: None,
        firmware: None,
        undecoded_firmware: None,
        samples: OCEANIC_SAMPLES,
        freedive: Some(OCEANIC_FREEDIVE),
    }
}

/// Freedive-only wrist units: BCD summary, two byte depth samples, no footer
const fn oceanic_freediver(
    model: u32,
    name: &'static str,
    header_size: usize,
    interval: IntervalLayout,
) -> Descriptor {
    Descriptor {
        footer_size: 0,
        datetime: DateTimeLayout::FreediveBcd,
        mode: ModeLayout::Fixed(DiveMode::Freedive),
        divetime: DivetimeLayout::BcdMinutesSeconds {
            minutes: 3,
            seconds: 2,
        },
        maxdepth: MaxDepthLayout::SixteenthFeet {
            anchor: Anchor::Start,
            field: BitField::le16(4),
        },
        gasmixes: None,
        freedive: Some(FreediveLayout {
            size: 2,
            interval,
            depth: DepthField::SixteenthFeet(BitField::le16(0)),
        }),
        ..oceanic(model, name, header_size)
    }
}

/// Record tags of the DeepSix profile: 2 is a sample, the rest are skipped
const DEEPSIX_SKIP: &[(u8, usize)] = &[(1, 8), (3, 6), (4, 8)];

static DESCRIPTORS: &[Descriptor] = &[
    Descriptor {
        model: model::DEEPSIX_EXCURSION,
        name: "DeepSix Excursion",
        header_size: EXCURSION_HEADER_SIZE,
        footer_size: 0,
        serial_len: SERIAL_NUMBER_LEN,
        header_sample: 0,
        datetime: DateTimeLayout::Sequential { offset: 12 },
        mode: ModeLayout::Code(BitField::le32(4)),
        divetime: DivetimeLayout::Seconds(BitField::le32(20)),
        maxdepth: MaxDepthLayout::Millibar(BitField::le32(28)),
        surface_pressure: Some(BitField::le32(54)),
        gasmixes: None,
        salinity: None,
        firmware: Some(TextField { offset: 48, len: 6 }),
        undecoded_firmware: Some(b"D01-4C"),
        samples: SampleLayout {
            size: 6,
            framing: RecordFraming::Tagged {
                sample: 2,
                skip: DEEPSIX_SKIP,
            },
            interval: IntervalLayout::Seconds(BitField::le32(24)),
            clock: SampleClock::Interval,
            depth: DepthField::Millibar(BitField::le16(2)),
            temperature: Some(TemperatureLayout {
                initial: None,
                field: TemperatureField::TenthsCelsius(BitField::le16(4)),
            }),
            pressure: None,
            gasmix: None,
            deco: None,
            rbt: None,
            bookmark: None,
        },
        freedive: None,
    },
    Descriptor {
        samples: SampleLayout {
            framing: markers(TankSwitchField {
                pressure: BitField::be16(3).masked(0x0FFF),
                ..TANK_SWITCH
            }),
            temperature: temperature_delta(BitField::bits(0, 0x80, 7), false),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::ATOM2, "Atom 2.0", OCEANIC_HEADER)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedB,
        mode: ModeLayout::Code(BitField::bits(2, 0xC0, 6)),
        ..oceanic(model::VT3, "VT3", OCEANIC_HEADER)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedB,
        mode: ModeLayout::Code(BitField::bits(1, 0x60, 5)),
        samples: SampleLayout {
            depth: DEPTH_AT_4,
            temperature: TEMPERATURE_AT_3,
            pressure: None,
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::VEO30, "Veo 3.0", OCEANIC_HEADER - PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedB,
        samples: SampleLayout {
            depth: DEPTH_AT_4,
            temperature: TEMPERATURE_AT_3,
            pressure: None,
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::GEO20, "Geo 2.0", OCEANIC_HEADER - PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedB,
        gasmixes: Some(GasMixLayout {
            oxygen: OCEANIC_HEADER - PAGE_SIZE - HALF_PAGE + 3,
            helium: None,
            step: 1,
            count: MixCount::Fixed(1),
        }),
        samples: SampleLayout {
            framing: markers(TankSwitchField {
                tank: None,
                pressure: BitField::le16(6).masked(0x0FFF),
                multiplier: 1,
                ..TANK_SWITCH
            }),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::DATAMASK, "Datamask", OCEANIC_HEADER - PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedC,
        samples: SampleLayout {
            temperature: temperature_delta(BitField::bits(5, 0x04, 2), false),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::AMPHOS, "Amphos", OCEANIC_HEADER)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedA,
        samples: SampleLayout {
            size: PAGE_SIZE,
            depth: DEPTH_AT_4,
            temperature: TEMPERATURE_AT_3,
            pressure: Some(PressureLayout {
                initial: BitField::le16(2),
                field: PressureField::Absolute {
                    field: BitField::le16(10).masked(0x0FFF),
                    multiplier: 1,
                },
            }),
            deco: Some(DecoField {
                stop: BitField::bits(7, 0xF0, 4),
                time: BitField::le16(6).masked(0x0FFF),
            }),
            rbt: Some(BitField::le16(8).masked(0x01FF)),
            bookmark: Some(BitField::bits(12, 0x80, 7)),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::OC1A, "OC1", OCEANIC_HEADER)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedA,
        samples: SampleLayout {
            temperature: temperature_delta(BitField::bits(5, 0x04, 2), true),
            pressure: PRESSURE_5PSI,
            deco: Some(DecoField {
                stop: BitField::bits(5, 0xF0, 4),
                time: BitField::le16(4).masked(0x03FF),
            }),
            rbt: Some(BitField::le16(6).masked(0x03FF)),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::I550, "i550", OCEANIC_HEADER - PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::PackedA,
        samples: SampleLayout {
            temperature: Some(TemperatureLayout {
                initial: Some(7),
                field: TemperatureField::FahrenheitParts(&[
                    (BitField::bits(7, 0xF0, 4), 0),
                    (BitField::bits(7, 0x0C, 2), 4),
                    (BitField::bits(5, 0x0C, 2), 6),
                ]),
            }),
            pressure: PRESSURE_5PSI,
            deco: Some(DecoField {
                stop: BitField::bits(5, 0xF0, 4),
                time: BitField::le16(4).masked(0x03FF),
            }),
            rbt: Some(BitField::le16(6).masked(0x01FF)),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::ATOM31, "Atom 3.1", OCEANIC_HEADER)
    },
    Descriptor {
        datetime: DateTimeLayout::BinaryDate,
        gasmixes: Some(GasMixLayout {
            oxygen: 0x2A,
            helium: None,
            step: 1,
            count: MixCount::Flags {
                field: BitField::byte(0x39),
                table: &[(0x04, 1), (0x08, 2), (0x10, 3)],
                default: 4,
            },
        }),
        salinity: Some(BitField::bits(0x18, 0x80, 7)),
        samples: SampleLayout {
            size: PAGE_SIZE,
            framing: markers(TankSwitchField {
                pressure: BitField::le16(6).masked(0x0FFF),
                multiplier: 1,
                ..TANK_SWITCH
            }),
            interval: INTERVAL_AT_1F,
            temperature: Some(TemperatureLayout {
                initial: Some(7),
                field: TemperatureField::Fahrenheit(BitField::byte(11)),
            }),
            pressure: Some(PressureLayout {
                initial: BitField::le16(16),
                field: PressureField::Absolute {
                    field: BitField::le16(4),
                    multiplier: 1,
                },
            }),
            deco: Some(DecoField {
                stop: BitField::bits(15, 0x70, 4),
                time: BitField::le16(6).masked(0x03FF),
            }),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::A300CS, "A300CS", 5 * PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::BcdDate,
        gasmixes: Some(GasMixLayout {
            oxygen: 0x3E,
            helium: Some(0x48),
            step: 1,
            count: MixCount::Fixed(6),
        }),
        samples: SampleLayout {
            size: PAGE_SIZE,
            temperature: Some(TemperatureLayout {
                initial: Some(7),
                field: TemperatureField::Fahrenheit(BitField::byte(1)),
            }),
            pressure: Some(PressureLayout {
                initial: BitField::le16(2),
                field: PressureField::Absolute {
                    field: BitField::le16(4),
                    multiplier: 1,
                },
            }),
            gasmix: Some(BitField::bits(0, 0x07, 0)),
            deco: Some(DecoField {
                stop: BitField::byte(10),
                time: BitField::le16(6),
            }),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::TX1, "TX1", OCEANIC_HEADER + 2 * PAGE_SIZE)
    },
    Descriptor {
        datetime: DateTimeLayout::BinaryDate,
        gasmixes: Some(GasMixLayout {
            oxygen: 0x30,
            helium: None,
            step: 1,
            count: MixCount::Fixed(3),
        }),
        samples: SampleLayout {
            size: PAGE_SIZE,
            interval: INTERVAL_AT_1F,
            clock: SampleClock::BcdTimestamp,
            depth: DEPTH_AT_4,
            temperature: TEMPERATURE_AT_3,
            pressure: Some(PressureLayout {
                initial: BitField::le16(2),
                field: PressureField::Absolute {
                    field: BitField::le16(10).masked(0x0FFF),
                    multiplier: 1,
                },
            }),
            deco: Some(DecoField {
                stop: BitField::bits(7, 0xF0, 4),
                time: BitField::le16(6).masked(0x0FFF),
            }),
            rbt: Some(BitField::le16(8).masked(0x01FF)),
            ..OCEANIC_SAMPLES
        },
        ..oceanic(model::I450T, "i450T", 5 * PAGE_SIZE)
    },
    oceanic_freediver(model::F10A, "F10", 3 * PAGE_SIZE, IntervalLayout::Fixed(1)),
    oceanic_freediver(
        model::F11A,
        "F11",
        5 * PAGE_SIZE,
        IntervalLayout::Coded {
            field: BitField::bits(0x29, 0x03, 0),
            table: [(1, 4), (1, 2), (1, 1), (2, 1)],
        },
    ),
];

/// Resolve the layout table for a model id
pub fn select_variant(model: u32) -> Result<&'static Descriptor, DcError> {
    DESCRIPTORS
        .iter()
        .find(|d| d.model == model)
        .ok_or_else(|| DcError::Unsupported(format!("unknown model id {model:#06x}")))
}

/// Every model the decoder knows
pub fn supported_models() -> impl Iterator<Item = (u32, &'static str)> {
    DESCRIPTORS.iter().map(|d| (d.model, d.name))
}
