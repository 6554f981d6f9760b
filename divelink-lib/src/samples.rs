//! Profile sample decoding.
//!
//! The profile region is walked by a small state machine. [`step`] is a pure function
//! from (state, running values, remaining bytes) to the next state plus the events one
//! record produced; [`Samples`] drives it lazily and buffers the events.

use crate::constants::{NO_TRANSMITTER_PSI, PAGE_SIZE};
use crate::datetime::bcd2dec;
use crate::descriptor::*;
use crate::error::DcError;
use crate::units::{fahrenheit_to_celsius, feet_to_meters, pressure_to_depth, psi_to_bar};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use strum_macros::Display;
use tracing::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoKind {
    #[strum(to_string = "NDL")]
    Ndl,
    #[strum(to_string = "deco stop")]
    DecoStop,
}

/// One decoded value, in metric units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SampleEvent {
    /// Seconds since the start of the dive; opens every sample
    Time(u32),
    /// Metres
    Depth(f64),
    /// °C
    Temperature(f64),
    Pressure { tank: u32, bar: f64 },
    /// Zero-based gas mix index
    GasMix(usize),
    /// `depth` in metres, `time` in seconds
    Deco { kind: DecoKind, depth: f64, time: u32 },
    /// Remaining bottom time, minutes
    Rbt(u32),
    Bookmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    ExpectRecord,
    SkipPadding,
    /// Synthetic surface samples still to emit
    ExpandSurfaceRun { remaining: u32 },
    Finished,
}

/// Values carried from one record to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Track {
    pub time: u32,
    /// Surface time already accounted for, added to absolute timestamps
    pub extra_time: u32,
    /// Regular records seen, including skipped ones
    pub count: u32,
    /// °F
    pub temperature: i32,
    pub tank: u32,
    /// psi
    pub pressure: i32,
    pub gasmix: Option<u32>,
}

/// Everything about a dive's samples that stays fixed while decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamContext {
    pub stride: usize,
    pub framing: RecordFraming,
    pub freedive: bool,
    pub interval: u32,
    /// Records per interval; the others are skipped
    pub samplerate: u32,
    pub clock: SampleClock,
    pub depth: DepthField,
    pub temperature: Option<TemperatureField>,
    pub pressure: Option<PressureField>,
    pub gasmix: Option<BitField>,
    pub deco: Option<DecoField>,
    pub rbt: Option<BitField>,
    pub bookmark: Option<BitField>,
    pub gasmix_count: usize,
    pub surface_mbar: u32,
}

impl StreamContext {
    /// Resolve the sample layout against a dive buffer and seed the running values
    pub fn new(
        descriptor: &Descriptor,
        data: &[u8],
        mode: DiveMode,
        gasmix_count: usize,
        surface_mbar: u32,
    ) -> Result<(Self, Track), DcError> {
        let layout = &descriptor.samples;
        let mut track = Track::default();

        let freedive = match (mode, descriptor.freedive) {
            (DiveMode::Freedive, Some(free)) => Some(free),
            _ => None,
        };
        let (interval, samplerate) = match freedive {
            Some(free) => free.interval.resolve(data)?,
            None => layout.interval.resolve(data)?,
        };

        let mut ctx = Self {
            stride: layout.size,
            framing: layout.framing,
            freedive: false,
            interval,
            samplerate: samplerate.max(1),
            clock: layout.clock,
            depth: layout.depth,
            temperature: None,
            pressure: None,
            gasmix: layout.gasmix,
            deco: layout.deco,
            rbt: layout.rbt,
            bookmark: layout.bookmark,
            gasmix_count,
            surface_mbar,
        };

        if let Some(free) = freedive {
            return Ok((
                Self {
                    stride: free.size,
                    framing: RecordFraming::Markers {
                        surface: None,
                        tank_switch: None,
                    },
                    freedive: true,
                    clock: SampleClock::Interval,
                    depth: free.depth,
                    gasmix: None,
                    deco: None,
                    rbt: None,
                    bookmark: None,
                    ..ctx
                },
                track,
            ));
        }

        let summary = data.get(descriptor.header_sample..).unwrap_or_default();
        if let Some(temperature) = layout.temperature {
            if let Some(initial) = temperature.initial {
                track.temperature = BitField::byte(initial).read(summary)? as i32;
            }
            ctx.temperature = Some(temperature.field);
        }
        if let Some(pressure) = layout.pressure {
            let initial = pressure.initial.read(summary)?;
            if initial == NO_TRANSMITTER_PSI {
                trace!("No transmitter paired, pressure disabled");
            } else {
                track.pressure = initial as i32;
                ctx.pressure = Some(pressure.field);
            }
        }
        Ok((ctx, track))
    }

    fn is_padding(&self, record: &[u8]) -> bool {
        record.iter().all(|b| *b == 0xFF) || (!self.freedive && record.iter().all(|b| *b == 0x00))
    }

    fn classify(&self, tag: u8) -> Result<RecordKind, DcError> {
        match self.framing {
            RecordFraming::Markers { surface, tank_switch } => {
                if surface == Some(tag) {
                    Ok(RecordKind::SurfaceInterval)
                } else if let Some(switch) = tank_switch.filter(|s| s.tag == tag) {
                    Ok(RecordKind::TankSwitch(switch))
                } else {
                    Ok(RecordKind::Sample)
                }
            }
            RecordFraming::Tagged { sample, skip } => {
                if tag == sample {
                    return Ok(RecordKind::Sample);
                }
                skip.iter()
                    .find(|(t, _)| *t == tag)
                    .map(|(_, len)| RecordKind::Skip(*len))
                    .ok_or_else(|| DcError::DataFormat(format!("unknown record tag {tag:#04x}")))
            }
        }
    }
}

enum RecordKind {
    Sample,
    SurfaceInterval,
    TankSwitch(TankSwitchField),
    Skip(usize),
}

/// Outcome of a single [`step`]
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: DecoderState,
    pub track: Track,
    pub events: Vec<SampleEvent>,
    /// Bytes of the input the step used up
    pub consumed: usize,
}

impl Step {
    fn idle(state: DecoderState, track: Track) -> Self {
        Self::advance(state, track, 0)
    }

    fn advance(state: DecoderState, track: Track, consumed: usize) -> Self {
        Self {
            state,
            track,
            events: Vec::new(),
            consumed,
        }
    }
}

/// Advance the decoder by one record or one synthetic surface sample.
///
/// `bytes` is the unread rest of the profile region.
pub fn step(
    ctx: &StreamContext,
    state: DecoderState,
    track: Track,
    bytes: &[u8],
) -> Result<Step, DcError> {
    match state {
        DecoderState::Finished => Ok(Step::idle(DecoderState::Finished, track)),
        DecoderState::ExpandSurfaceRun { remaining: 0 } => {
            Ok(Step::idle(DecoderState::ExpectRecord, track))
        }
        DecoderState::ExpandSurfaceRun { remaining } => {
            let mut track = track;
            track.time += ctx.interval;
            Ok(Step {
                state: DecoderState::ExpandSurfaceRun {
                    remaining: remaining - 1,
                },
                track,
                events: vec![SampleEvent::Time(track.time), SampleEvent::Depth(0.0)],
                consumed: 0,
            })
        }
        DecoderState::SkipPadding => match bytes.get(..ctx.stride) {
            None => Ok(Step::idle(DecoderState::Finished, track)),
            Some(record) if ctx.is_padding(record) => {
                Ok(Step::advance(DecoderState::SkipPadding, track, ctx.stride))
            }
            Some(_) => Ok(Step::idle(DecoderState::ExpectRecord, track)),
        },
        DecoderState::ExpectRecord => {
            let Some(record) = bytes.get(..ctx.stride) else {
                return Ok(Step::idle(DecoderState::Finished, track));
            };
            if ctx.is_padding(record) {
                return Ok(Step::advance(DecoderState::SkipPadding, track, ctx.stride));
            }

            let mut track = track;
            match ctx.classify(record[0])? {
                RecordKind::SurfaceInterval => {
                    let page = bytes.get(..PAGE_SIZE).ok_or_else(|| {
                        DcError::DataFormat(
                            "surface interval record overruns the profile".to_string(),
                        )
                    })?;
                    let surface_time = 60 * bcd2dec(page[1]) + bcd2dec(page[2]);
                    track.extra_time += surface_time;
                    trace!(surface_time, "Surface interval");
                    Ok(Step::advance(
                        DecoderState::ExpandSurfaceRun {
                            remaining: surface_time / ctx.interval,
                        },
                        track,
                        PAGE_SIZE,
                    ))
                }
                RecordKind::TankSwitch(switch) => {
                    track.tank = match switch.tank {
                        Some(field) => field.read(record)?.saturating_sub(1),
                        None => 0,
                    };
                    track.pressure = (switch.pressure.read(record)? * switch.multiplier) as i32;
                    trace!(tank = track.tank, psi = track.pressure, "Tank switch");
                    Ok(Step::advance(DecoderState::ExpectRecord, track, ctx.stride))
                }
                RecordKind::Skip(len) => {
                    if bytes.len() < len {
                        return Err(DcError::DataFormat(format!(
                            "record of {len} bytes overruns the profile"
                        )));
                    }
                    Ok(Step::advance(DecoderState::ExpectRecord, track, len))
                }
                RecordKind::Sample => sample(ctx, track, record),
            }
        }
    }
}

fn sample(ctx: &StreamContext, mut track: Track, record: &[u8]) -> Result<Step, DcError> {
    let consumed = record.len();
    if track.count % ctx.samplerate != 0 {
        track.count += 1;
        return Ok(Step::advance(DecoderState::ExpectRecord, track, consumed));
    }

    match ctx.clock {
        SampleClock::Interval => track.time += ctx.interval,
        SampleClock::BcdTimestamp => {
            let timestamp = bcd2dec(record[1] & 0x0F) * 3600
                + bcd2dec(record[0]) * 60
                + bcd2dec(record[2])
                + track.extra_time;
            if timestamp < track.time {
                return Err(DcError::DataFormat(format!(
                    "sample timestamp moved backwards: {timestamp} < {}",
                    track.time
                )));
            }
            if timestamp == track.time {
                warn!(timestamp, "Ignoring sample with a repeated timestamp");
                return Ok(Step::advance(DecoderState::ExpectRecord, track, consumed));
            }
            track.time = timestamp;
        }
    }

    let mut events = vec![SampleEvent::Time(track.time)];

    if let Some(field) = ctx.temperature {
        let celsius = match field {
            TemperatureField::Fahrenheit(value) => {
                track.temperature = value.read(record)? as i32;
                fahrenheit_to_celsius(f64::from(track.temperature))
            }
            TemperatureField::FahrenheitDelta { sign, delta } => {
                let delta = delta.read(record)? as i32;
                let negative = (sign.field.read(record)? != 0) != sign.inverted;
                track.temperature += if negative { -delta } else { delta };
                fahrenheit_to_celsius(f64::from(track.temperature))
            }
            TemperatureField::FahrenheitParts(parts) => {
                let mut value = 0;
                for (part, shift) in parts {
                    value |= part.read(record)? << shift;
                }
                track.temperature = value as i32;
                fahrenheit_to_celsius(f64::from(track.temperature))
            }
            TemperatureField::TenthsCelsius(value) => f64::from(value.read(record)?) / 10.0,
        };
        events.push(SampleEvent::Temperature(celsius));
    }

    if let Some(field) = ctx.pressure {
        match field {
            PressureField::Absolute { field, multiplier } => {
                track.pressure = (field.read(record)? * multiplier) as i32;
            }
            PressureField::Consumed(used) => track.pressure -= used.read(record)? as i32,
        }
        events.push(SampleEvent::Pressure {
            tank: track.tank,
            bar: psi_to_bar(f64::from(track.pressure)),
        });
    }

    let depth = match ctx.depth {
        DepthField::SixteenthFeet(field) => feet_to_meters(f64::from(field.read(record)?) / 16.0),
        DepthField::Millibar(field) => pressure_to_depth(field.read(record)?, ctx.surface_mbar),
    };
    events.push(SampleEvent::Depth(depth));

    if let Some(field) = ctx.gasmix {
        let index = field.read(record)?;
        if track.gasmix != Some(index) {
            if index < 1 || index as usize > ctx.gasmix_count {
                return Err(DcError::DataFormat(format!(
                    "gas mix index {index} outside 1..={}",
                    ctx.gasmix_count
                )));
            }
            events.push(SampleEvent::GasMix(index as usize - 1));
            track.gasmix = Some(index);
        }
    }

    if let Some(deco) = ctx.deco {
        let stop = deco.stop.read(record)?;
        let time = deco.time.read(record)? * 60;
        let (kind, depth) = if stop == 0 {
            (DecoKind::Ndl, 0.0)
        } else {
            (DecoKind::DecoStop, feet_to_meters(f64::from(stop * 10)))
        };
        events.push(SampleEvent::Deco { kind, depth, time });
    }

    if let Some(rbt) = ctx.rbt {
        events.push(SampleEvent::Rbt(rbt.read(record)?));
    }

    if let Some(bookmark) = ctx.bookmark {
        if bookmark.read(record)? != 0 {
            events.push(SampleEvent::Bookmark);
        }
    }

    track.count += 1;
    Ok(Step {
        state: DecoderState::ExpectRecord,
        track,
        events,
        consumed,
    })
}

/// Lazy sample iterator over a profile region.
///
/// Yields the first decoding error once, then ends.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    ctx: StreamContext,
    profile: &'a [u8],
    offset: usize,
    state: DecoderState,
    track: Track,
    pending: VecDeque<SampleEvent>,
}

impl<'a> Samples<'a> {
    pub fn new(ctx: StreamContext, track: Track, profile: &'a [u8]) -> Self {
        Self {
            ctx,
            profile,
            offset: 0,
            state: DecoderState::ExpectRecord,
            track,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Time of the latest sample produced so far
    pub fn elapsed(&self) -> u32 {
        self.track.time
    }
}

impl Iterator for Samples<'_> {
    type Item = Result<SampleEvent, DcError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.state == DecoderState::Finished {
                return None;
            }
            match step(&self.ctx, self.state, self.track, &self.profile[self.offset..]) {
                Ok(step) => {
                    self.offset += step.consumed;
                    self.state = step.state;
                    self.track = step.track;
                    self.pending.extend(step.events);
                }
                Err(e) => {
                    warn!(offset = self.offset, "Sample decoding stopped: {e}");
                    self.state = DecoderState::Finished;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl FusedIterator for Samples<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_context() -> StreamContext {
        StreamContext {
            stride: 8,
            framing: RecordFraming::Markers {
                surface: Some(0xBB),
                tank_switch: Some(TankSwitchField {
                    tag: 0xAA,
                    tank: Some(BitField::bits(1, 0x03, 0)),
                    pressure: BitField::be16(4).masked(0x0FFF),
                    multiplier: 2,
                }),
            },
            freedive: false,
            interval: 15,
            samplerate: 1,
            clock: SampleClock::Interval,
            depth: DepthField::SixteenthFeet(BitField::le16(2).masked(0x0FFF)),
            temperature: None,
            pressure: None,
            gasmix: None,
            deco: None,
            rbt: None,
            bookmark: None,
            gasmix_count: 0,
            surface_mbar: 1013,
        }
    }

    #[test]
    fn test_sample_record() {
        let ctx = marker_context();
        // 160/16 = 10 ft
        let record = [0x00, 0x00, 0xA0, 0x00, 0x00, 0x00, 0x00, 0x01];
        let step = step(&ctx, DecoderState::ExpectRecord, Track::default(), &record).expect("step");
        assert_eq!(step.state, DecoderState::ExpectRecord);
        assert_eq!(step.consumed, 8);
        assert_eq!(step.track.time, 15);
        assert_eq!(step.track.count, 1);
        assert_eq!(step.events[0], SampleEvent::Time(15));
        let SampleEvent::Depth(depth) = step.events[1] else {
            panic!("Expected depth, got {:?}", step.events[1]);
        };
        assert!((depth - 3.048).abs() < 1e-9);
    }

    #[test]
    fn test_padding_transitions() {
        let ctx = marker_context();
        let mut bytes = vec![0xFF; 8];
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&[0x01, 0, 0x10, 0, 0, 0, 0, 0]);

        let first = step(&ctx, DecoderState::ExpectRecord, Track::default(), &bytes).expect("step");
        assert_eq!(first.state, DecoderState::SkipPadding);
        assert_eq!(first.consumed, 8);
        assert!(first.events.is_empty());

        let second = step(&ctx, first.state, first.track, &bytes[8..]).expect("step");
        assert_eq!(second.state, DecoderState::SkipPadding, "All-zero records are padding too");

        let third = step(&ctx, second.state, second.track, &bytes[16..]).expect("step");
        assert_eq!(third.state, DecoderState::ExpectRecord);
        assert_eq!(third.consumed, 0, "Leaving padding must not consume the record");

        let end =
            step(&ctx, DecoderState::SkipPadding, Track::default(), &[0xFF; 3]).expect("step");
        assert_eq!(end.state, DecoderState::Finished);
    }

    #[test]
    fn test_zero_record_is_data_in_freedive() {
        let ctx = StreamContext {
            freedive: true,
            ..marker_context()
        };
        let step =
            step(&ctx, DecoderState::ExpectRecord, Track::default(), &[0u8; 8]).expect("step");
        assert_eq!(step.state, DecoderState::ExpectRecord);
        assert_eq!(step.events.len(), 2, "Time and depth");
    }

    #[test]
    fn test_surface_run_expansion() {
        let ctx = marker_context();
        // 1 minute 15 seconds of surface time at a 15 s interval
        let mut page = [0u8; PAGE_SIZE];
        page[0] = 0xBB;
        page[1] = 0x01;
        page[2] = 0x15;

        let start = step(&ctx, DecoderState::ExpectRecord, Track::default(), &page).expect("step");
        assert_eq!(start.state, DecoderState::ExpandSurfaceRun { remaining: 5 });
        assert_eq!(start.consumed, PAGE_SIZE);
        assert_eq!(start.track.extra_time, 75);

        let mut state = start.state;
        let mut track = start.track;
        let mut times = Vec::new();
        while state != DecoderState::ExpectRecord {
            let next = step(&ctx, state, track, &[]).expect("step");
            if let [SampleEvent::Time(t), SampleEvent::Depth(d)] = next.events.as_slice() {
                assert_eq!(*d, 0.0);
                times.push(*t);
            }
            state = next.state;
            track = next.track;
        }
        assert_eq!(times, vec![15, 30, 45, 60, 75]);
    }

    #[test]
    fn test_surface_record_overrun() {
        let ctx = marker_context();
        let bytes = [0xBB, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let result = step(&ctx, DecoderState::ExpectRecord, Track::default(), &bytes);
        assert!(matches!(result, Err(DcError::DataFormat(_))));
    }

    #[test]
    fn test_tank_switch_updates_track() {
        let ctx = marker_context();
        let record = [0xAA, 0x02, 0x00, 0x00, 0x05, 0xDC, 0x00, 0x00];
        let step = step(&ctx, DecoderState::ExpectRecord, Track::default(), &record).expect("step");
        assert!(step.events.is_empty());
        assert_eq!(step.track.tank, 1, "Tank numbers are one based on the wire");
        assert_eq!(step.track.pressure, 0x5DC * 2);
    }

    #[test]
    fn test_samplerate_skips_records() {
        let ctx = StreamContext {
            samplerate: 2,
            ..marker_context()
        };
        let record = [0x01, 0, 0x10, 0, 0, 0, 0, 0];
        let track = Track {
            count: 1,
            ..Track::default()
        };
        let step = step(&ctx, DecoderState::ExpectRecord, track, &record).expect("step");
        assert!(step.events.is_empty());
        assert_eq!(step.track.count, 2);
        assert_eq!(step.track.time, 0);
    }

    #[test]
    fn test_gasmix_index_validation() {
        let ctx = StreamContext {
            gasmix: Some(BitField::bits(0, 0x07, 0)),
            gasmix_count: 2,
            ..marker_context()
        };
        let good = [0x02, 0, 0x10, 0, 0, 0, 0, 0];
        let step_ok =
            step(&ctx, DecoderState::ExpectRecord, Track::default(), &good).expect("step");
        assert!(step_ok.events.contains(&SampleEvent::GasMix(1)));

        let again = step(&ctx, DecoderState::ExpectRecord, step_ok.track, &good).expect("step");
        assert!(
            !again.events.iter().any(|e| matches!(e, SampleEvent::GasMix(_))),
            "Unchanged mix is not repeated"
        );

        let bad = [0x03, 0, 0x10, 0, 0, 0, 0, 0];
        let result = step(&ctx, DecoderState::ExpectRecord, Track::default(), &bad);
        assert!(matches!(result, Err(DcError::DataFormat(_))));
    }

    #[test]
    fn test_bcd_clock() {
        let ctx = StreamContext {
            clock: SampleClock::BcdTimestamp,
            ..marker_context()
        };
        // 00:02:30
        let record = [0x02, 0x00, 0x30, 0, 0x10, 0, 0, 0];
        let first =
            step(&ctx, DecoderState::ExpectRecord, Track::default(), &record).expect("step");
        assert_eq!(first.track.time, 150);

        let repeated = step(&ctx, DecoderState::ExpectRecord, first.track, &record).expect("step");
        assert!(repeated.events.is_empty(), "Repeated timestamps are dropped");

        let earlier = [0x01, 0x00, 0x30, 0, 0x10, 0, 0, 0];
        let result = step(&ctx, DecoderState::ExpectRecord, first.track, &earlier);
        assert!(matches!(result, Err(DcError::DataFormat(_))));
    }

    #[test]
    fn test_tagged_framing() {
        let ctx = StreamContext {
            stride: 6,
            framing: RecordFraming::Tagged {
                sample: 2,
                skip: &[(1, 8), (3, 6)],
            },
            depth: DepthField::Millibar(BitField::le16(2)),
            temperature: Some(TemperatureField::TenthsCelsius(BitField::le16(4))),
            ..marker_context()
        };

        let skipped = step(
            &ctx,
            DecoderState::ExpectRecord,
            Track::default(),
            &[1, 9, 9, 9, 9, 9, 9, 9],
        )
        .expect("step");
        assert_eq!(skipped.consumed, 8);
        assert!(skipped.events.is_empty());

        // 2017 mbar, 21.5 °C
        let record = [0x02, 0x00, 0xE1, 0x07, 0xD7, 0x00];
        let sample =
            step(&ctx, DecoderState::ExpectRecord, Track::default(), &record).expect("step");
        assert_eq!(sample.events[1], SampleEvent::Temperature(21.5));
        let SampleEvent::Depth(depth) = sample.events[2] else {
            panic!("Expected depth, got {:?}", sample.events[2]);
        };
        assert!((depth - 10.0).abs() < 0.01);

        let unknown = step(&ctx, DecoderState::ExpectRecord, Track::default(), &[9, 1, 1, 1, 1, 1]);
        assert!(matches!(unknown, Err(DcError::DataFormat(_))));
    }

    #[test]
    fn test_iterator_is_fused_after_error() {
        let ctx = StreamContext {
            stride: 6,
            framing: RecordFraming::Tagged {
                sample: 2,
                skip: &[],
            },
            depth: DepthField::Millibar(BitField::le16(2)),
            ..marker_context()
        };
        let profile = [0x02, 0x00, 0xF5, 0x03, 0x00, 0x00, 0x07, 0x01, 0x01, 0x01, 0x01, 0x01];
        let mut samples = Samples::new(ctx, Track::default(), &profile);
        assert_eq!(samples.next().map(|r| r.ok()), Some(Some(SampleEvent::Time(15))));
        assert_eq!(samples.next().map(|r| r.ok()), Some(Some(SampleEvent::Depth(0.0))));
        assert!(matches!(samples.next(), Some(Err(DcError::DataFormat(_)))));
        assert!(samples.next().is_none());
        assert!(samples.next().is_none());
        assert_eq!(samples.state(), DecoderState::Finished);
    }
}
