//! Per sensor family codec interface
//!
//! Every [`SensorFamily`] dispatches to exactly one [`SensorCodec`]. The
//! family list is matched exhaustively in [`codec_for`], so adding a family
//! to the registry forces a decision here. Operations a family cannot
//! answer return [`Error::Unsupported`].

#![allow(clippy::module_name_repetitions)]

use std::{
    fmt::Debug,
    io::{BufRead, Write},
};

use chrono::NaiveDateTime;
use strum::{Display, IntoStaticStr};

use crate::{
    format::SensorFamily,
    time::to_datetime,
    xse::{XseCodec, XseStore},
    Error,
};

/// Kind of the record produced by one decode call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[non_exhaustive]
pub enum RecordKind {
    /// Survey ping with bathymetry, amplitude and/or sidescan
    #[strum(serialize = "survey data")]
    Data,
    /// Navigation fix without sounding data
    #[strum(serialize = "navigation")]
    Navigation,
    /// Free text annotation
    #[strum(serialize = "comment")]
    Comment,
    /// Sound velocity profile
    #[strum(serialize = "velocity profile")]
    VelocityProfile,
    /// Installation and calibration parameters
    #[strum(serialize = "parameter")]
    Parameter,
    /// Record passed through without interpretation
    #[default]
    #[strum(serialize = "other")]
    Other,
}

/// Editing state of one bathymetry beam
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum BeamFlag {
    /// Good sounding
    #[default]
    None,
    /// No sounding
    Null,
    /// Flagged by the sonar
    Sonar,
    /// Flagged by hand
    Manual,
    /// Flagged by an automatic filter
    Filter,
}

impl BeamFlag {
    /// Returns `true` for a good, unflagged sounding
    #[must_use]
    pub const fn is_good(self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if the beam carries no sounding at all
    #[must_use]
    pub const fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One bathymetry sounding in normalized form
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sounding {
    /// Beam flag
    pub flag: BeamFlag,
    /// Depth in meters, positive down
    pub depth: f64,
    /// Acrosstrack distance in meters, positive to starboard
    pub acrosstrack: f64,
    /// Alongtrack distance in meters, positive forward
    pub alongtrack: f64,
}

/// One sidescan sample in normalized form
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Pixel {
    /// Backscatter value
    pub value: f64,
    /// Acrosstrack distance in meters
    pub acrosstrack: f64,
    /// Alongtrack distance in meters
    pub alongtrack: f64,
}

/// Swath values of one ping, ordered port to starboard
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Swath {
    /// Bathymetry beams
    pub bath: Vec<Sounding>,
    /// Amplitude per bathymetry beam
    pub amp: Vec<f64>,
    /// Sidescan samples
    pub ss: Vec<Pixel>,
}

/// Format independent view of one decoded record
///
/// `distance` is filled by the session from consecutive fixes; codecs leave it at 0.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    /// Record kind
    pub kind: RecordKind,
    /// Seconds since 1970-01-01T00:00:00 UTC
    pub time_d: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in km/hr
    pub speed: f64,
    /// Heading in degrees
    pub heading: f64,
    /// Distance from the previous ping in km
    pub distance: f64,
    /// Bathymetry, amplitude and sidescan
    pub swath: Swath,
    /// Comment text for comment records
    pub comment: Option<String>,
}

impl Record {
    /// Record time as a broken-down UTC time
    #[must_use]
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        to_datetime(self.time_d)
    }
}

/// Navigation and attitude of one record
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Navigation {
    /// Seconds since 1970-01-01T00:00:00 UTC
    pub time_d: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in km/hr
    pub speed: f64,
    /// Heading in degrees
    pub heading: f64,
    /// Transducer draft in meters
    pub draft: f64,
    /// Roll in degrees
    pub roll: f64,
    /// Pitch in degrees
    pub pitch: f64,
    /// Heave in meters
    pub heave: f64,
}

/// Travel times and takeoff angles of one ping, ordered port to starboard
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TravelTimes {
    /// Two way travel times in seconds
    pub ttimes: Vec<f64>,
    /// Takeoff angle from vertical in degrees
    pub angles: Vec<f64>,
    /// Takeoff azimuth from acrosstrack in degrees
    pub angles_forward: Vec<f64>,
    /// Angle of the transducer face normal in degrees
    pub angles_null: Vec<f64>,
    /// Heave at each beam in meters
    pub heave: Vec<f64>,
    /// Alongtrack offset of each beam in meters
    pub alongtrack_offset: Vec<f64>,
    /// Beam flags
    pub flags: Vec<BeamFlag>,
    /// Transducer draft in meters
    pub draft: f64,
    /// Surface sound velocity in m/s
    pub ssv: f64,
}

impl TravelTimes {
    /// Number of beams
    #[must_use]
    pub fn len(&self) -> usize {
        self.ttimes.len()
    }

    /// Returns `true` if no beams are present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ttimes.is_empty()
    }
}

/// Transducer depth and altitude above the seafloor
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Altitude {
    /// Transducer depth in meters
    pub transducer_depth: f64,
    /// Altitude of the transducer above the seafloor in meters
    pub altitude: f64,
}

/// Sound velocity profile
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VelocityProfile {
    /// Depth of each sample in meters
    pub depth: Vec<f64>,
    /// Sound velocity at each sample in m/s
    pub velocity: Vec<f64>,
}

/// Format specific storage owned by a session
///
/// One variant per family with a built in codec.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Store {
    /// ELAC/SeaBeam XSE storage
    Xse(Box<XseStore>),
}

impl Store {
    /// Kind of the record currently held
    #[must_use]
    pub fn kind(&self) -> Option<RecordKind> {
        match self {
            Self::Xse(store) => store.kind(),
        }
    }
}

/// Format specific half of the generic i/o protocol
///
/// Every method defaults to [`Error::Unsupported`]; implementations override
/// what their family can answer.
pub trait SensorCodec: Debug {
    /// Sensor family served by this codec
    fn family(&self) -> SensorFamily;

    /// Builds an [`Error::Unsupported`] for `operation`
    fn unsupported(&self, operation: &'static str) -> Error {
        Error::Unsupported {
            family: self.family(),
            operation,
        }
    }

    /// Allocates empty storage for this family
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family has no built in codec
    fn new_store(&self) -> Result<Store, Error> {
        Err(self.unsupported("storage allocation"))
    }

    /// Decodes the next record from `r` into `store`
    ///
    /// # Errors
    ///
    /// Stream integrity errors, [`Error::EndOfFile`] or [`Error::Unsupported`]
    fn read_record(&self, _r: &mut dyn BufRead, _store: &mut Store) -> Result<RecordKind, Error> {
        Err(self.unsupported("read"))
    }

    /// Encodes the record held in `store` to `w`
    ///
    /// # Errors
    ///
    /// [`Error::WriteFailed`], [`Error::BeamCapacity`] or [`Error::Unsupported`]
    fn write_record(&self, _w: &mut dyn Write, _store: &Store) -> Result<(), Error> {
        Err(self.unsupported("write"))
    }

    /// Extracts time, navigation, swath values and comments
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family cannot extract
    fn extract(&self, _store: &Store) -> Result<Record, Error> {
        Err(self.unsupported("extract"))
    }

    /// Inserts time, navigation, swath values and comments
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family cannot insert
    fn insert(&self, _store: &mut Store, _record: &Record) -> Result<(), Error> {
        Err(self.unsupported("insert"))
    }

    /// Extracts navigation and attitude
    ///
    /// # Errors
    ///
    /// [`Error::WrongRecordKind`] or [`Error::Unsupported`]
    fn extract_nav(&self, _store: &Store) -> Result<Navigation, Error> {
        Err(self.unsupported("extract navigation"))
    }

    /// Inserts navigation
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family cannot insert navigation
    fn insert_nav(&self, _store: &mut Store, _nav: &Navigation) -> Result<(), Error> {
        Err(self.unsupported("insert navigation"))
    }

    /// Extracts transducer depth and altitude
    ///
    /// # Errors
    ///
    /// [`Error::WrongRecordKind`] or [`Error::Unsupported`]
    fn extract_altitude(&self, _store: &Store) -> Result<Altitude, Error> {
        Err(self.unsupported("extract altitude"))
    }

    /// Inserts transducer depth and altitude
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family cannot insert altitude
    fn insert_altitude(&self, _store: &mut Store, _altitude: &Altitude) -> Result<(), Error> {
        Err(self.unsupported("insert altitude"))
    }

    /// Extracts travel times and takeoff angles
    ///
    /// # Errors
    ///
    /// [`Error::NotEnoughData`], [`Error::WrongRecordKind`] or [`Error::Unsupported`]
    fn ttimes(&self, _store: &Store) -> Result<TravelTimes, Error> {
        Err(self.unsupported("extract travel times"))
    }

    /// Extracts a sound velocity profile
    ///
    /// # Errors
    ///
    /// [`Error::WrongRecordKind`] or [`Error::Unsupported`]
    fn extract_svp(&self, _store: &Store) -> Result<VelocityProfile, Error> {
        Err(self.unsupported("extract velocity profile"))
    }

    /// Inserts a sound velocity profile
    ///
    /// # Errors
    ///
    /// [`Error::WrongRecordKind`] or [`Error::Unsupported`]
    fn insert_svp(&self, _store: &mut Store, _svp: &VelocityProfile) -> Result<(), Error> {
        Err(self.unsupported("insert velocity profile"))
    }
}

/// Codec for families whose format modules are not built into this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalCodec(SensorFamily);

impl SensorCodec for ExternalCodec {
    fn family(&self) -> SensorFamily {
        self.0
    }
}

/// Returns the codec serving `family`
#[must_use]
pub fn codec_for(family: SensorFamily) -> Box<dyn SensorCodec> {
    match family {
        SensorFamily::Xse => Box::new(XseCodec),
        SensorFamily::SeaBeam
        | SensorFamily::Hsds
        | SensorFamily::Sb2000
        | SensorFamily::Sb2100
        | SensorFamily::Simrad
        | SensorFamily::Simrad2
        | SensorFamily::Simrad3
        | SensorFamily::Mr1
        | SensorFamily::Mr1B
        | SensorFamily::Mr1V2001
        | SensorFamily::Ldeoih
        | SensorFamily::Reson
        | SensorFamily::Reson8k
        | SensorFamily::Elac
        | SensorFamily::ElacMk2
        | SensorFamily::Hsmd
        | SensorFamily::Dsl
        | SensorFamily::Gsf
        | SensorFamily::MStiff
        | SensorFamily::Oic
        | SensorFamily::Hdcs
        | SensorFamily::Singlebeam
        | SensorFamily::Hs10
        | SensorFamily::NetCdf
        | SensorFamily::Atlas
        | SensorFamily::NavNetCdf
        | SensorFamily::Surf
        | SensorFamily::Reson7k
        | SensorFamily::Jstar
        | SensorFamily::Image83p
        | SensorFamily::Hysweep
        | SensorFamily::Benthos
        | SensorFamily::SwathPlus
        | SensorFamily::ThreeDatDepthLidar
        | SensorFamily::ThreeDdWissl1
        | SensorFamily::ThreeDdWissl2
        | SensorFamily::Wassp
        | SensorFamily::StereoPair
        | SensorFamily::Kmbes
        | SensorFamily::Reson7k3 => Box::new(ExternalCodec(family)),
    }
}
