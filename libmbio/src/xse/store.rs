use bon::Builder;
use nom::{
    combinator::map,
    number::complete::{le_f64, le_i16, le_i32, le_u8},
    sequence::tuple,
};
use strum::{Display, EnumIter, FromRepr, IntoStaticStr};
use tracing::{debug, trace};

use super::{
    frame::{split_frame, Envelope, FrameTime, FrameWriter, Groups, PutLe, RawGroup},
    parse::{counted, decode_group, f32_array, f64_pair, text, Parsed},
    COMMENT_LENGTH, MAX_BEAMS,
};
use crate::{codec::RecordKind, Error};

/// Frame type ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum FrameType {
    Navigation = 1,
    VelocityProfile = 2,
    Tide = 3,
    Ship = 4,
    Sidescan = 5,
    Multibeam = 6,
    Singlebeam = 7,
    Control = 8,
    Bathymetry = 9,
    Product = 10,
    NativeTime = 11,
    Geodetic = 12,
    Seabeam = 13,
    Message = 14,
    Attitude = 15,
    Comment = 99,
}

impl FrameType {
    /// Numeric frame id
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

mod nav_group {
    pub const GENERAL: u32 = 1;
    pub const POSITION: u32 = 2;
    pub const MOTION_GROUND: u32 = 4;
    pub const MOTION_WATER: u32 = 5;
    pub const HEAVE: u32 = 8;
    pub const ROLL: u32 = 9;
    pub const PITCH: u32 = 10;
    pub const HEADING: u32 = 11;
    pub const LOG: u32 = 12;
}

mod svp_group {
    pub const DEPTH: u32 = 2;
    pub const VELOCITY: u32 = 3;
    pub const CONDUCTIVITY: u32 = 4;
    pub const SALINITY: u32 = 5;
    pub const TEMPERATURE: u32 = 6;
    pub const PRESSURE: u32 = 7;
    pub const SSV: u32 = 8;
}

mod ship_group {
    pub const PARAMETER: u32 = 8;
}

mod mbm_group {
    pub const GENERAL: u32 = 1;
    pub const NAVIGATION: u32 = 99;
}

const COMMENT_GROUP: u32 = 1;

fn put_count(out: &mut Vec<u8>, len: usize) {
    i32::try_from(len).unwrap_or(i32::MAX).put_le(out);
}

fn put_f64s(out: &mut Vec<u8>, values: &[f64]) {
    put_count(out, values.len());
    for &v in values {
        v.put_le(out);
    }
}

/// Text field padded with NULs to `field_len` bytes, or to the text if longer
fn put_text(out: &mut Vec<u8>, text: &str, field_len: usize) {
    let len = field_len.max(text.len());
    put_count(out, len);
    out.extend_from_slice(text.as_bytes());
    out.resize(out.len() + len - text.len(), 0);
}

fn payload(put: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let mut out = Vec::new();
    put(&mut out);
    out
}

fn raw(id: u32, payload: &[u8]) -> RawGroup {
    RawGroup {
        id,
        payload: payload.to_vec(),
    }
}

/// Navigation fix quality and status
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NavGeneral {
    pub quality: i32,
    pub status: i32,
}

/// Position fix in radians
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Position {
    /// Name of the coordinate system
    pub description: String,
    /// Byte length of the description field as read, NUL padding included
    pub description_len: usize,
    /// Longitude in radians
    pub x: f64,
    /// Latitude in radians
    pub y: f64,
    /// Height in meters
    pub z: f64,
}

/// Speed in m/s and course in radians
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct Motion {
    pub speed: f64,
    pub course: f64,
}

/// Navigation frame
///
/// Groups this crate does not interpret are kept in `extra`. Decoding
/// records every group id in `layout` so that encoding writes the groups
/// back in stream order; groups the layout does not name follow it.
#[derive(Debug, Default, Clone, PartialEq, Builder)]
#[non_exhaustive]
pub struct NavigationFrame {
    /// Data source, 0 marks a frame without a usable fix
    #[builder(default)]
    pub source: u32,
    /// Time stamp
    #[builder(default)]
    pub time: FrameTime,
    /// Fix quality
    pub general: Option<NavGeneral>,
    /// Position
    pub position: Option<Position>,
    /// Motion over ground
    pub motion_ground: Option<Motion>,
    /// Motion through water
    pub motion_water: Option<Motion>,
    /// Heave in meters
    pub heave: Option<f64>,
    /// Roll in radians
    pub roll: Option<f64>,
    /// Pitch in radians
    pub pitch: Option<f64>,
    /// Heading in radians
    pub heading: Option<f64>,
    /// Speed log in m/s
    pub log: Option<f64>,
    /// Uninterpreted groups
    #[builder(default)]
    pub extra: Vec<RawGroup>,
    /// Group ids in stream order
    #[builder(default)]
    pub layout: Vec<u32>,
}

impl NavigationFrame {
    fn decode(envelope: &Envelope<'_>) -> Result<Self, Error> {
        let id = envelope.frame_id;
        let mut frame = Self {
            source: envelope.source,
            time: envelope.time,
            ..Self::default()
        };
        for group in Groups::new(id, envelope.body) {
            let (group_id, payload) = group?;
            frame.layout.push(group_id);
            let scalar = || decode_group(id, group_id, payload, le_f64);
            match group_id {
                nav_group::GENERAL => {
                    let (quality, status) = decode_group(id, group_id, payload, tuple((le_i32, le_i32)))?;
                    frame.general = Some(NavGeneral { quality, status });
                }
                nav_group::POSITION => {
                    let ((description, description_len), x, y, z) =
                        decode_group(id, group_id, payload, tuple((text, le_f64, le_f64, le_f64)))?;
                    frame.position = Some(Position {
                        description,
                        description_len,
                        x,
                        y,
                        z,
                    });
                }
                nav_group::MOTION_GROUND | nav_group::MOTION_WATER => {
                    let (speed, course) = decode_group(id, group_id, payload, f64_pair)?;
                    let motion = Some(Motion { speed, course });
                    if group_id == nav_group::MOTION_GROUND {
                        frame.motion_ground = motion;
                    } else {
                        frame.motion_water = motion;
                    }
                }
                nav_group::HEAVE => frame.heave = Some(scalar()?),
                nav_group::ROLL => frame.roll = Some(scalar()?),
                nav_group::PITCH => frame.pitch = Some(scalar()?),
                nav_group::HEADING => frame.heading = Some(scalar()?),
                nav_group::LOG => frame.log = Some(scalar()?),
                _ => frame.extra.push(raw(group_id, payload)),
            }
        }
        Ok(frame)
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let mut known = Vec::new();
        if let Some(general) = self.general {
            known.push((
                nav_group::GENERAL,
                payload(|o| {
                    general.quality.put_le(o);
                    general.status.put_le(o);
                }),
            ));
        }
        if let Some(position) = &self.position {
            known.push((
                nav_group::POSITION,
                payload(|o| {
                    put_text(o, &position.description, position.description_len);
                    for v in [position.x, position.y, position.z] {
                        v.put_le(o);
                    }
                }),
            ));
        }
        for (group_id, motion) in [
            (nav_group::MOTION_GROUND, self.motion_ground),
            (nav_group::MOTION_WATER, self.motion_water),
        ] {
            if let Some(motion) = motion {
                known.push((
                    group_id,
                    payload(|o| {
                        motion.speed.put_le(o);
                        motion.course.put_le(o);
                    }),
                ));
            }
        }
        for (group_id, value) in [
            (nav_group::HEAVE, self.heave),
            (nav_group::ROLL, self.roll),
            (nav_group::PITCH, self.pitch),
            (nav_group::HEADING, self.heading),
            (nav_group::LOG, self.log),
        ] {
            if let Some(value) = value {
                known.push((group_id, payload(|o| value.put_le(o))));
            }
        }
        let mut w = FrameWriter::begin(out, FrameType::Navigation.id(), self.source, self.time);
        w.ordered_groups(&self.layout, known, &self.extra)?;
        w.finish()
    }
}

/// Sound velocity profile frame
#[derive(Debug, Default, Clone, PartialEq, Builder)]
#[non_exhaustive]
pub struct SvpFrame {
    /// Data source
    #[builder(default)]
    pub source: u32,
    /// Time stamp
    #[builder(default)]
    pub time: FrameTime,
    /// Sample depths in meters
    pub depth: Option<Vec<f64>>,
    /// Sound velocity in m/s
    pub velocity: Option<Vec<f64>>,
    /// Conductivity
    pub conductivity: Option<Vec<f64>>,
    /// Salinity
    pub salinity: Option<Vec<f64>>,
    /// Temperature
    pub temperature: Option<Vec<f64>>,
    /// Pressure
    pub pressure: Option<Vec<f64>>,
    /// Surface sound velocity in m/s
    pub ssv: Option<f64>,
    /// Uninterpreted groups
    #[builder(default)]
    pub extra: Vec<RawGroup>,
    /// Group ids in stream order
    #[builder(default)]
    pub layout: Vec<u32>,
}

impl SvpFrame {
    fn decode(envelope: &Envelope<'_>) -> Result<Self, Error> {
        let id = envelope.frame_id;
        let mut frame = Self {
            source: envelope.source,
            time: envelope.time,
            ..Self::default()
        };
        for group in Groups::new(id, envelope.body) {
            let (group_id, payload) = group?;
            frame.layout.push(group_id);
            let slot = match group_id {
                svp_group::DEPTH => &mut frame.depth,
                svp_group::VELOCITY => &mut frame.velocity,
                svp_group::CONDUCTIVITY => &mut frame.conductivity,
                svp_group::SALINITY => &mut frame.salinity,
                svp_group::TEMPERATURE => &mut frame.temperature,
                svp_group::PRESSURE => &mut frame.pressure,
                svp_group::SSV => {
                    frame.ssv = Some(decode_group(id, group_id, payload, le_f64)?);
                    continue;
                }
                _ => {
                    frame.extra.push(raw(group_id, payload));
                    continue;
                }
            };
            *slot = Some(decode_group(id, group_id, payload, counted(8, le_f64))?);
        }
        Ok(frame)
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let mut known = Vec::new();
        for (group_id, values) in [
            (svp_group::DEPTH, &self.depth),
            (svp_group::VELOCITY, &self.velocity),
            (svp_group::CONDUCTIVITY, &self.conductivity),
            (svp_group::SALINITY, &self.salinity),
            (svp_group::TEMPERATURE, &self.temperature),
            (svp_group::PRESSURE, &self.pressure),
        ] {
            if let Some(values) = values {
                known.push((group_id, payload(|o| put_f64s(o, values))));
            }
        }
        if let Some(ssv) = self.ssv {
            known.push((svp_group::SSV, payload(|o| ssv.put_le(o))));
        }
        let mut w = FrameWriter::begin(out, FrameType::VelocityProfile.id(), self.source, self.time);
        w.ordered_groups(&self.layout, known, &self.extra)?;
        w.finish()
    }
}

/// Installation offsets and calibration biases
///
/// Angles are in radians, offsets in meters.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct ShipParameter {
    pub roll_bias: f32,
    pub pitch_bias: f32,
    pub heading_bias: f32,
    pub time_delay: f32,
    pub trans_x_port: f32,
    pub trans_y_port: f32,
    pub trans_z_port: f32,
    pub trans_x_stbd: f32,
    pub trans_y_stbd: f32,
    pub trans_z_stbd: f32,
    pub trans_err_port: f32,
    pub trans_err_stbd: f32,
    pub nav_x: f32,
    pub nav_y: f32,
    pub nav_z: f32,
    pub hrp_x: f32,
    pub hrp_y: f32,
    pub hrp_z: f32,
}

impl ShipParameter {
    const fn from_array(v: [f32; 18]) -> Self {
        Self {
            roll_bias: v[0],
            pitch_bias: v[1],
            heading_bias: v[2],
            time_delay: v[3],
            trans_x_port: v[4],
            trans_y_port: v[5],
            trans_z_port: v[6],
            trans_x_stbd: v[7],
            trans_y_stbd: v[8],
            trans_z_stbd: v[9],
            trans_err_port: v[10],
            trans_err_stbd: v[11],
            nav_x: v[12],
            nav_y: v[13],
            nav_z: v[14],
            hrp_x: v[15],
            hrp_y: v[16],
            hrp_z: v[17],
        }
    }

    const fn to_array(self) -> [f32; 18] {
        [
            self.roll_bias,
            self.pitch_bias,
            self.heading_bias,
            self.time_delay,
            self.trans_x_port,
            self.trans_y_port,
            self.trans_z_port,
            self.trans_x_stbd,
            self.trans_y_stbd,
            self.trans_z_stbd,
            self.trans_err_port,
            self.trans_err_stbd,
            self.nav_x,
            self.nav_y,
            self.nav_z,
            self.hrp_x,
            self.hrp_y,
            self.hrp_z,
        ]
    }
}

/// Ship installation frame
#[derive(Debug, Default, Clone, PartialEq, Builder)]
#[non_exhaustive]
pub struct ShipFrame {
    /// Data source
    #[builder(default)]
    pub source: u32,
    /// Time stamp
    #[builder(default)]
    pub time: FrameTime,
    /// Offsets and biases
    pub parameter: Option<ShipParameter>,
    /// Uninterpreted groups
    #[builder(default)]
    pub extra: Vec<RawGroup>,
    /// Group ids in stream order
    #[builder(default)]
    pub layout: Vec<u32>,
}

impl ShipFrame {
    fn decode(envelope: &Envelope<'_>) -> Result<Self, Error> {
        let id = envelope.frame_id;
        let mut frame = Self {
            source: envelope.source,
            time: envelope.time,
            ..Self::default()
        };
        for group in Groups::new(id, envelope.body) {
            let (group_id, payload) = group?;
            frame.layout.push(group_id);
            if group_id == ship_group::PARAMETER {
                let values = decode_group(id, group_id, payload, f32_array::<18>)?;
                frame.parameter = Some(ShipParameter::from_array(values));
            } else {
                frame.extra.push(raw(group_id, payload));
            }
        }
        Ok(frame)
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let known = self.parameter.map(|parameter| {
            let values = payload(|o| {
                for v in parameter.to_array() {
                    v.put_le(o);
                }
            });
            (ship_group::PARAMETER, values)
        });
        let mut w = FrameWriter::begin(out, FrameType::Ship.id(), self.source, self.time);
        w.ordered_groups(&self.layout, known.into_iter().collect(), &self.extra)?;
        w.finish()
    }
}

/// Per beam groups of a multibeam frame
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr, EnumIter, FromRepr,
)]
#[repr(u32)]
pub enum BeamArray {
    /// Beam numbers, 1 at starboard
    Number = 2,
    /// Two way travel times in seconds
    TravelTime = 3,
    /// Quality codes
    Quality = 4,
    /// Amplitudes
    Amplitude = 5,
    /// Transmit delays in seconds
    Delay = 6,
    /// Lateral distances in meters
    Lateral = 7,
    /// Alongtrack distances in meters
    Along = 8,
    /// Depths in meters
    Depth = 9,
    /// Beam angles in radians
    Angle = 10,
    /// Heave in meters
    Heave = 11,
    /// Roll in radians
    Roll = 12,
    /// Pitch in radians
    Pitch = 13,
}

/// One multibeam beam, assembled from the per beam groups
#[derive(Debug, Default, Clone, Copy, PartialEq, Builder)]
#[non_exhaustive]
#[allow(missing_docs)]
pub struct Beam {
    #[builder(default)]
    pub number: i16,
    #[builder(default)]
    pub travel_time: f64,
    #[builder(default)]
    pub quality: u8,
    #[builder(default)]
    pub amplitude: i16,
    #[builder(default)]
    pub delay: f64,
    #[builder(default)]
    pub lateral: f64,
    #[builder(default)]
    pub along: f64,
    #[builder(default)]
    pub depth: f64,
    #[builder(default)]
    pub angle: f64,
    #[builder(default)]
    pub heave: f64,
    #[builder(default)]
    pub roll: f64,
    #[builder(default)]
    pub pitch: f64,
}

impl Beam {
    /// Value of a floating point array, [`None`] for the integer arrays
    #[must_use]
    pub const fn value(&self, array: BeamArray) -> Option<f64> {
        match array {
            BeamArray::TravelTime => Some(self.travel_time),
            BeamArray::Delay => Some(self.delay),
            BeamArray::Lateral => Some(self.lateral),
            BeamArray::Along => Some(self.along),
            BeamArray::Depth => Some(self.depth),
            BeamArray::Angle => Some(self.angle),
            BeamArray::Heave => Some(self.heave),
            BeamArray::Roll => Some(self.roll),
            BeamArray::Pitch => Some(self.pitch),
            BeamArray::Number | BeamArray::Quality | BeamArray::Amplitude => None,
        }
    }

    fn value_mut(&mut self, array: BeamArray) -> Option<&mut f64> {
        match array {
            BeamArray::TravelTime => Some(&mut self.travel_time),
            BeamArray::Delay => Some(&mut self.delay),
            BeamArray::Lateral => Some(&mut self.lateral),
            BeamArray::Along => Some(&mut self.along),
            BeamArray::Depth => Some(&mut self.depth),
            BeamArray::Angle => Some(&mut self.angle),
            BeamArray::Heave => Some(&mut self.heave),
            BeamArray::Roll => Some(&mut self.roll),
            BeamArray::Pitch => Some(&mut self.pitch),
            BeamArray::Number | BeamArray::Quality | BeamArray::Amplitude => None,
        }
    }
}

/// Sonar settings of one ping
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct MultibeamGeneral {
    pub ping: i32,
    pub frequency: f32,
    pub pulse: f32,
    pub power: f32,
    pub bandwidth: f32,
    pub sample: f32,
    pub swath: f32,
}

impl MultibeamGeneral {
    fn parse(input: &[u8]) -> Parsed<'_, Self> {
        map(tuple((le_i32, f32_array::<6>)), |(ping, v)| Self {
            ping,
            frequency: v[0],
            pulse: v[1],
            power: v[2],
            bandwidth: v[3],
            sample: v[4],
            swath: v[5],
        })(input)
    }
}

/// Ping navigation stored with the multibeam frame
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MultibeamNav {
    /// Longitude in radians
    pub lon: f64,
    /// Latitude in radians
    pub lat: f64,
    /// Heading in radians
    pub heading: f64,
    /// Speed in m/s
    pub speed: f64,
}

/// Multibeam ping frame
#[derive(Debug, Default, Clone, PartialEq, Builder)]
#[non_exhaustive]
pub struct MultibeamFrame {
    /// Data source
    #[builder(default)]
    pub source: u32,
    /// Time stamp
    #[builder(default)]
    pub time: FrameTime,
    /// Sonar settings
    pub general: Option<MultibeamGeneral>,
    /// Per beam groups carried by this ping, in stream order
    #[builder(default)]
    pub arrays: Vec<BeamArray>,
    /// Beams
    #[builder(default)]
    pub beams: Vec<Beam>,
    /// Ping navigation
    pub nav: Option<MultibeamNav>,
    /// Uninterpreted groups
    #[builder(default)]
    pub extra: Vec<RawGroup>,
    /// Group ids in stream order
    #[builder(default)]
    pub layout: Vec<u32>,
}

impl MultibeamFrame {
    /// Returns `true` if the ping carries the per beam group
    #[must_use]
    pub fn has(&self, array: BeamArray) -> bool {
        self.arrays.contains(&array)
    }

    /// Marks a per beam group as carried, keeping existing groups in place
    pub fn add_array(&mut self, array: BeamArray) {
        if !self.has(array) {
            self.arrays.push(array);
        }
    }

    fn fill<T>(
        &mut self,
        array: BeamArray,
        values: Vec<T>,
        set: impl Fn(&mut Beam, T),
    ) -> Result<(), Error> {
        if self.arrays.is_empty() {
            if values.len() > MAX_BEAMS {
                return Err(Error::BeamCapacity {
                    count: values.len(),
                    max: MAX_BEAMS,
                });
            }
            self.beams = vec![Beam::default(); values.len()];
        } else if values.len() != self.beams.len() {
            return Err(Error::CorruptRecord(format!(
                "{array} group holds {} beams where earlier groups hold {}",
                values.len(),
                self.beams.len()
            )));
        }
        for (beam, value) in self.beams.iter_mut().zip(values) {
            set(beam, value);
        }
        self.add_array(array);
        Ok(())
    }

    fn decode_array(&mut self, array: BeamArray, payload: &[u8]) -> Result<(), Error> {
        let (id, group_id) = (FrameType::Multibeam.id(), array as u32);
        match array {
            BeamArray::Number => {
                let values = decode_group(id, group_id, payload, counted(2, le_i16))?;
                self.fill(array, values, |b, v| b.number = v)
            }
            BeamArray::Quality => {
                let values = decode_group(id, group_id, payload, counted(1, le_u8))?;
                self.fill(array, values, |b, v| b.quality = v)
            }
            BeamArray::Amplitude => {
                let values = decode_group(id, group_id, payload, counted(2, le_i16))?;
                self.fill(array, values, |b, v| b.amplitude = v)
            }
            _ => {
                let values = decode_group(id, group_id, payload, counted(8, le_f64))?;
                self.fill(array, values, |b, v| {
                    if let Some(slot) = b.value_mut(array) {
                        *slot = v;
                    }
                })
            }
        }
    }

    fn decode(envelope: &Envelope<'_>) -> Result<Self, Error> {
        let id = envelope.frame_id;
        let mut frame = Self {
            source: envelope.source,
            time: envelope.time,
            ..Self::default()
        };
        for group in Groups::new(id, envelope.body) {
            let (group_id, payload) = group?;
            frame.layout.push(group_id);
            if let Some(array) = BeamArray::from_repr(group_id) {
                frame.decode_array(array, payload)?;
                continue;
            }
            match group_id {
                mbm_group::GENERAL => {
                    frame.general = Some(decode_group(id, group_id, payload, MultibeamGeneral::parse)?);
                }
                mbm_group::NAVIGATION => {
                    let (lon, lat, heading, speed) =
                        decode_group(id, group_id, payload, tuple((le_f64, le_f64, le_f64, le_f64)))?;
                    frame.nav = Some(MultibeamNav {
                        lon,
                        lat,
                        heading,
                        speed,
                    });
                }
                _ => frame.extra.push(raw(group_id, payload)),
            }
        }
        trace!("multibeam ping with {} beams", frame.beams.len());
        Ok(frame)
    }

    fn put_array(&self, array: BeamArray, out: &mut Vec<u8>) {
        put_count(out, self.beams.len());
        for beam in &self.beams {
            match array {
                BeamArray::Number => beam.number.put_le(out),
                BeamArray::Quality => beam.quality.put_le(out),
                BeamArray::Amplitude => beam.amplitude.put_le(out),
                _ => beam.value(array).unwrap_or_default().put_le(out),
            }
        }
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        if self.beams.len() > MAX_BEAMS {
            return Err(Error::BeamCapacity {
                count: self.beams.len(),
                max: MAX_BEAMS,
            });
        }
        let mut known = Vec::new();
        if let Some(g) = self.general {
            known.push((
                mbm_group::GENERAL,
                payload(|o| {
                    g.ping.put_le(o);
                    for v in [g.frequency, g.pulse, g.power, g.bandwidth, g.sample, g.swath] {
                        v.put_le(o);
                    }
                }),
            ));
        }
        for &array in &self.arrays {
            known.push((array as u32, payload(|o| self.put_array(array, o))));
        }
        if let Some(nav) = self.nav {
            known.push((
                mbm_group::NAVIGATION,
                payload(|o| {
                    for v in [nav.lon, nav.lat, nav.heading, nav.speed] {
                        v.put_le(o);
                    }
                }),
            ));
        }
        let mut w = FrameWriter::begin(out, FrameType::Multibeam.id(), self.source, self.time);
        w.ordered_groups(&self.layout, known, &self.extra)?;
        w.finish()
    }
}

/// Comment frame
#[derive(Debug, Default, Clone, PartialEq, Builder)]
#[non_exhaustive]
pub struct CommentFrame {
    /// Data source
    #[builder(default)]
    pub source: u32,
    /// Time stamp
    #[builder(default)]
    pub time: FrameTime,
    /// Comment text
    #[builder(into, default)]
    pub text: String,
    /// Byte length of the text field as read, NUL padding included
    #[builder(default)]
    pub text_len: usize,
    /// Uninterpreted groups
    #[builder(default)]
    pub extra: Vec<RawGroup>,
    /// Group ids in stream order
    #[builder(default)]
    pub layout: Vec<u32>,
}

impl CommentFrame {
    /// Shortens the text to what a comment group can hold, on a character boundary
    pub fn truncate(&mut self) {
        let end = Self::stored_len(&self.text);
        if end < self.text.len() {
            debug!("truncating comment to {end} bytes");
            self.text.truncate(end);
        }
    }

    /// Bytes of `text` that fit a comment group next to its NUL
    fn stored_len(text: &str) -> usize {
        if text.len() < COMMENT_LENGTH {
            return text.len();
        }
        let mut end = COMMENT_LENGTH - 1;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        end
    }

    fn decode(envelope: &Envelope<'_>) -> Result<Self, Error> {
        let id = envelope.frame_id;
        let mut frame = Self {
            source: envelope.source,
            time: envelope.time,
            ..Self::default()
        };
        for group in Groups::new(id, envelope.body) {
            let (group_id, payload) = group?;
            frame.layout.push(group_id);
            if group_id == COMMENT_GROUP {
                (frame.text, frame.text_len) = decode_group(id, group_id, payload, text)?;
            } else {
                frame.extra.push(raw(group_id, payload));
            }
        }
        Ok(frame)
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let text = &self.text[..Self::stored_len(&self.text)];
        // a field read from the stream keeps its length while the text still fits it,
        // otherwise NUL terminated and padded to a multiple of four bytes
        let field_len = if (1..=COMMENT_LENGTH).contains(&self.text_len) && text.len() <= self.text_len {
            self.text_len
        } else {
            (text.len() + 4) & !3
        };
        let known = vec![(COMMENT_GROUP, payload(|o| put_text(o, text, field_len)))];
        let mut w = FrameWriter::begin(out, FrameType::Comment.id(), self.source, self.time);
        w.ordered_groups(&self.layout, known, &self.extra)?;
        w.finish()
    }
}

/// A frame passed through without interpretation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OtherFrame {
    /// Frame type id
    pub frame_id: u32,
    /// Data source
    pub source: u32,
    /// Time stamp
    pub time: FrameTime,
    /// Encoded groups
    pub body: Vec<u8>,
}

impl OtherFrame {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let mut w = FrameWriter::begin(out, self.frame_id, self.source, self.time);
        w.body(&self.body);
        w.finish()
    }
}

/// One decoded XSE frame
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum XseFrame {
    Navigation(NavigationFrame),
    VelocityProfile(SvpFrame),
    Ship(ShipFrame),
    Multibeam(MultibeamFrame),
    Comment(CommentFrame),
    Other(OtherFrame),
}

impl XseFrame {
    /// Decodes the frame at the front of `input`
    ///
    /// Returns the frame and the number of bytes it occupied. Navigation
    /// frames without a source, sidescan frames and frame types without
    /// an interpretation come back as [`XseFrame::Other`].
    ///
    /// # Errors
    ///
    /// Framing errors from [`split_frame`](super::frame::split_frame) and
    /// [`Error::GroupSizeMismatch`] or [`Error::CorruptRecord`] for groups
    /// whose content contradicts their byte count.
    pub fn decode(input: &[u8]) -> Result<(Self, usize), Error> {
        let (envelope, used) = split_frame(input)?;
        let frame = match FrameType::from_repr(envelope.frame_id) {
            Some(FrameType::Navigation) if envelope.source > 0 => {
                Self::Navigation(NavigationFrame::decode(&envelope)?)
            }
            Some(FrameType::VelocityProfile) => Self::VelocityProfile(SvpFrame::decode(&envelope)?),
            Some(FrameType::Ship) => Self::Ship(ShipFrame::decode(&envelope)?),
            Some(FrameType::Multibeam) => Self::Multibeam(MultibeamFrame::decode(&envelope)?),
            Some(FrameType::Comment) => Self::Comment(CommentFrame::decode(&envelope)?),
            _ => Self::Other(OtherFrame {
                frame_id: envelope.frame_id,
                source: envelope.source,
                time: envelope.time,
                body: envelope.body.to_vec(),
            }),
        };
        Ok((frame, used))
    }

    /// Appends the encoded frame to `out`
    ///
    /// # Errors
    ///
    /// [`Error::BeamCapacity`] for pings with more than [`MAX_BEAMS`] beams
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Self::Navigation(f) => f.encode(out),
            Self::VelocityProfile(f) => f.encode(out),
            Self::Ship(f) => f.encode(out),
            Self::Multibeam(f) => f.encode(out),
            Self::Comment(f) => f.encode(out),
            Self::Other(f) => f.encode(out),
        }
    }

    /// Record kind reported for this frame
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Navigation(_) => RecordKind::Navigation,
            Self::VelocityProfile(_) => RecordKind::VelocityProfile,
            Self::Ship(_) => RecordKind::Parameter,
            Self::Multibeam(_) => RecordKind::Data,
            Self::Comment(_) => RecordKind::Comment,
            Self::Other(_) => RecordKind::Other,
        }
    }
}

/// Everything known about the stream after the last decoded frame
///
/// Each frame type has its own slot holding the most recent frame of that
/// type, so attitude and installation values stay available while pings
/// are read. `kind` names the slot that was filled last.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct XseStore {
    kind: Option<RecordKind>,
    /// Most recent navigation frame
    pub navigation: NavigationFrame,
    /// Most recent sound velocity profile
    pub svp: SvpFrame,
    /// Most recent installation frame
    pub ship: ShipFrame,
    /// Most recent ping
    pub multibeam: MultibeamFrame,
    /// Most recent comment
    pub comment: CommentFrame,
    /// Most recent uninterpreted frame
    pub other: OtherFrame,
    /// Draft used when no installation frame gives one
    pub ship_draft: f64,
}

impl XseStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of the frame filled last, [`None`] before the first frame
    #[must_use]
    pub const fn kind(&self) -> Option<RecordKind> {
        self.kind
    }

    /// Stores a frame in its slot and makes it the current record
    pub fn push(&mut self, frame: XseFrame) -> RecordKind {
        let kind = frame.kind();
        match frame {
            XseFrame::Navigation(f) => self.navigation = f,
            XseFrame::VelocityProfile(f) => self.svp = f,
            XseFrame::Ship(f) => self.ship = f,
            XseFrame::Multibeam(f) => self.multibeam = f,
            XseFrame::Comment(f) => self.comment = f,
            XseFrame::Other(f) => self.other = f,
        }
        self.kind = Some(kind);
        kind
    }

    pub(super) fn set_kind(&mut self, kind: RecordKind) {
        self.kind = Some(kind);
    }

    /// Appends the current record, encoded, to `out`
    ///
    /// # Errors
    ///
    /// [`Error::NotEnoughData`] before any record was stored, otherwise see
    /// [`XseFrame::encode`]
    pub fn encode_current(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        match self.kind {
            Some(RecordKind::Navigation) => self.navigation.encode(out),
            Some(RecordKind::VelocityProfile) => self.svp.encode(out),
            Some(RecordKind::Parameter) => self.ship.encode(out),
            Some(RecordKind::Data) => self.multibeam.encode(out),
            Some(RecordKind::Comment) => self.comment.encode(out),
            Some(RecordKind::Other) => self.other.encode(out),
            None => Err(Error::NotEnoughData("no record has been stored")),
        }
    }

    /// Transducer draft in meters
    #[must_use]
    pub fn draft(&self) -> f64 {
        self.ship.parameter.map_or(self.ship_draft, |p| {
            0.5 * (f64::from(p.trans_z_port) + f64::from(p.trans_z_stbd))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(beams: usize) -> MultibeamFrame {
        MultibeamFrame::builder()
            .time(FrameTime::new(3_140_000_000, 250))
            .arrays(vec![BeamArray::Number, BeamArray::Quality, BeamArray::Depth])
            .beams(
                (0..beams)
                    .map(|i| {
                        Beam::builder()
                            .number(i16::try_from(beams - i).unwrap())
                            .quality(1)
                            .depth(100.0 + i as f64)
                            .build()
                    })
                    .collect(),
            )
            .build()
    }

    #[test]
    fn ship_parameter_keeps_field_order() {
        let values: [f32; 18] = std::array::from_fn(|i| i as f32);
        let p = ShipParameter::from_array(values);
        assert_eq!(p.trans_z_port, 6.0);
        assert_eq!(p.trans_err_stbd, 11.0);
        assert_eq!(p.to_array(), values);
    }

    #[test]
    fn mismatched_beam_counts_are_corrupt() {
        let mut frame = ping(3);
        let mut out = Vec::new();
        MultibeamFrame {
            beams: ping(2).beams,
            arrays: vec![BeamArray::Lateral],
            ..MultibeamFrame::default()
        }
        .encode(&mut out)
        .unwrap();
        let (envelope, _) = split_frame(&out).unwrap();
        let (_, payload) = Groups::new(6, envelope.body).next().unwrap().unwrap();
        assert!(matches!(
            frame.decode_array(BeamArray::Lateral, payload),
            Err(Error::CorruptRecord(_))
        ));
    }

    #[test]
    fn comment_is_padded_and_terminated() {
        let mut out = Vec::new();
        CommentFrame::builder().text("abcd").build().encode(&mut out).unwrap();
        // 24 frame header, 28 group bytes with the padded text, 4 trailer
        assert_eq!(out.len(), 56);
        let (frame, used) = XseFrame::decode(&out).unwrap();
        assert_eq!(used, out.len());
        let XseFrame::Comment(comment) = frame else {
            panic!("expected a comment");
        };
        assert_eq!(comment.text, "abcd");
        assert_eq!(comment.text_len, 8);
    }

    #[test]
    fn long_comments_are_cut_when_encoded() {
        for (text, kept) in [("x".repeat(300), 199), ("é".repeat(150), 198)] {
            let mut out = Vec::new();
            CommentFrame::builder().text(text.as_str()).build().encode(&mut out).unwrap();
            let (XseFrame::Comment(comment), _) = XseFrame::decode(&out).unwrap() else {
                panic!("expected a comment");
            };
            assert_eq!(comment.text.len(), kept);
            assert!(text.starts_with(&comment.text));
            assert!(comment.text_len <= COMMENT_LENGTH);
        }
    }

    #[test]
    fn decoded_frames_keep_group_order_and_padding() {
        let mut out = Vec::new();
        let mut w = FrameWriter::begin(&mut out, FrameType::Navigation.id(), 1, FrameTime::new(3_140_000_000, 0));
        w.group(nav_group::HEADING, |o| 1.25f64.put_le(o)).unwrap();
        w.group(7, |o| o.extend_from_slice(&[1, 2, 3])).unwrap();
        w.group(nav_group::POSITION, |o| {
            8i32.put_le(o);
            o.extend_from_slice(b"WGS84\0\0\0");
            for v in [0.1f64, 0.2, 0.0] {
                v.put_le(o);
            }
        })
        .unwrap();
        w.group(nav_group::GENERAL, |o| {
            1i32.put_le(o);
            0i32.put_le(o);
        })
        .unwrap();
        w.finish().unwrap();

        let (XseFrame::Navigation(mut nav), _) = XseFrame::decode(&out).unwrap() else {
            panic!("expected navigation");
        };
        assert_eq!(nav.position.as_ref().map(|p| p.description.as_str()), Some("WGS84"));
        assert_eq!(nav.layout, [11, 7, 2, 1]);
        let mut again = Vec::new();
        nav.encode(&mut again).unwrap();
        assert_eq!(again, out);

        // groups set after decoding follow the ones read
        nav.roll = Some(0.5);
        again.clear();
        nav.encode(&mut again).unwrap();
        let (XseFrame::Navigation(decoded), _) = XseFrame::decode(&again).unwrap() else {
            panic!("expected navigation");
        };
        assert_eq!(decoded.layout, [11, 7, 2, 1, 9]);
        assert_eq!(decoded.roll, Some(0.5));
    }

    #[test]
    fn oversized_pings_fail_to_decode() {
        let mut out = Vec::new();
        let mut w = FrameWriter::begin(&mut out, FrameType::Multibeam.id(), 1, FrameTime::default());
        w.group(BeamArray::Depth as u32, |o| put_f64s(o, &[100.0; MAX_BEAMS + 1]))
            .unwrap();
        w.finish().unwrap();
        let err = XseFrame::decode(&out).unwrap_err();
        assert!(matches!(err, Error::BeamCapacity { count: 152, max: MAX_BEAMS }), "{err}");
        assert!(err.is_stream_integrity());
    }

    #[test]
    fn sourceless_navigation_passes_through() {
        let mut out = Vec::new();
        NavigationFrame::builder().heading(1.0).build().encode(&mut out).unwrap();
        let (frame, _) = XseFrame::decode(&out).unwrap();
        assert_eq!(frame.kind(), RecordKind::Other);
        let mut again = Vec::new();
        frame.encode(&mut again).unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn draft_prefers_installation_offsets() {
        let mut store = XseStore {
            ship_draft: 3.0,
            ..XseStore::default()
        };
        assert!((store.draft() - 3.0).abs() < 1e-12);
        store.ship.parameter = Some(ShipParameter {
            trans_z_port: 4.0,
            trans_z_stbd: 5.0,
            ..ShipParameter::default()
        });
        assert!((store.draft() - 4.5).abs() < 1e-12);
    }
}
