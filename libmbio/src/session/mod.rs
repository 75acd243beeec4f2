//! Generic record i/o over any registered format
//!
//! A [`Session`] owns one open stream, the codec of the stream's sensor
//! family and that codec's storage. Reading sessions decode one record per
//! call and apply the filters of their [`ControlParams`]; writing sessions
//! encode whatever the storage currently holds.
//!
//! ```no_run
//! use libmbio::{session::{ControlParams, Session}, Error};
//!
//! # fn main() -> Result<(), Error> {
//! let mut session = Session::open("survey.mb94", 94, ControlParams::default())?;
//! loop {
//!     match session.read() {
//!         Ok(ping) => println!("{} {} {}", ping.time_d, ping.lon, ping.lat),
//!         Err(Error::EndOfFile) => break,
//!         Err(e) if e.is_skip() => continue,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod control;

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use strum::{Display, IntoStaticStr};
use tracing::{debug, info, instrument, trace, warn};

pub use control::ControlParams;

use crate::{
    codec::{
        codec_for, Altitude, BeamFlag, Navigation, Pixel, Record, RecordKind, SensorCodec,
        Sounding, Store, Swath, TravelTimes, VelocityProfile,
    },
    coords::{apply_lonflip, coor_scale, DTR, RTD},
    format::{lookup, FormatInfo},
    time::TIME_D_UNKNOWN,
    Error,
};

/// Hours per second
const HOURS_PER_SECOND: f64 = 0.000_277_778;

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    /// Opened, nothing transferred yet
    Open,
    /// At least one record was read
    Reading,
    /// At least one record was written
    Writing,
    /// Closed, every further call fails
    Closed,
}

/// Running totals of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Counters {
    /// Survey pings decoded
    pub pings: u64,
    /// Comments decoded
    pub comments: u64,
    /// Records decoded, of any kind
    pub records: u64,
    /// Records written
    pub written: u64,
}

/// Time and position of a ping
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fix {
    time_d: f64,
    lon: f64,
    lat: f64,
}

impl From<&Record> for Fix {
    fn from(record: &Record) -> Self {
        Self {
            time_d: record.time_d,
            lon: record.lon,
            lat: record.lat,
        }
    }
}

/// Outcome of one filtered decode, kept when averaging must stop early
enum Step {
    Accepted(Record),
    Rejected(Record, Error),
    Failed(Error),
}

enum Stream {
    Read(Box<dyn BufRead>),
    Write(Box<dyn Write>),
}

/// One open swath data stream
pub struct Session {
    format: &'static FormatInfo,
    codec: Box<dyn SensorCodec>,
    params: ControlParams,
    state: SessionState,
    stream: Option<Stream>,
    store: Option<Store>,
    counters: Counters,
    /// last ping that passed the filters, for time gaps
    last: Option<Fix>,
    /// last reported ping, for distance and speed
    old: Option<Fix>,
    pending: Option<Step>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("format", &self.format.name)
            .field("codec", &self.codec)
            .field("state", &self.state)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl Session {
    fn new(format_id: i32, params: ControlParams, stream: Stream) -> Result<Self, Error> {
        let format = lookup(format_id)?;
        params.validate()?;
        let codec = codec_for(format.family);
        let store = match codec.new_store() {
            Ok(store) => Some(store),
            Err(Error::Unsupported { .. }) => {
                debug!("{} has no built in codec", format.family);
                None
            }
            Err(e) => return Err(e),
        };
        info!("opened {} session, format {} ({})", format.family, format.id, format.name);
        Ok(Self {
            format,
            codec,
            params,
            state: SessionState::Open,
            stream: Some(stream),
            store,
            counters: Counters::default(),
            last: None,
            old: None,
            pending: None,
        })
    }

    /// Opens a file for reading
    ///
    /// # Errors
    ///
    /// - [`Error::BadFormat`] for an unregistered format id
    /// - [`Error::BadParameter`] for inconsistent control parameters
    /// - [`Error::OpenFailed`] if the file cannot be opened
    pub fn open(
        path: impl AsRef<Path>,
        format_id: i32,
        params: ControlParams,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        lookup(format_id)?;
        let file = File::open(path).map_err(|source| Error::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), format_id, params)
    }

    /// Opens a reading session over any buffered reader
    ///
    /// # Errors
    ///
    /// See [`Session::open`]
    pub fn from_reader(
        reader: impl BufRead + 'static,
        format_id: i32,
        params: ControlParams,
    ) -> Result<Self, Error> {
        Self::new(format_id, params, Stream::Read(Box::new(reader)))
    }

    /// Creates or truncates a file for writing
    ///
    /// # Errors
    ///
    /// - [`Error::BadFormat`] for an unregistered format id
    /// - [`Error::OpenFailed`] if the file cannot be created
    pub fn create(path: impl AsRef<Path>, format_id: i32) -> Result<Self, Error> {
        let path = path.as_ref();
        lookup(format_id)?;
        let file = File::create(path).map_err(|source| Error::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_writer(BufWriter::new(file), format_id)
    }

    /// Opens a writing session over any writer
    ///
    /// # Errors
    ///
    /// See [`Session::create`]
    pub fn from_writer(writer: impl Write + 'static, format_id: i32) -> Result<Self, Error> {
        Self::new(
            format_id,
            ControlParams::default(),
            Stream::Write(Box::new(writer)),
        )
    }

    /// Registry entry of the session's format
    #[must_use]
    pub const fn format(&self) -> &'static FormatInfo {
        self.format
    }

    /// Control parameters in effect
    #[must_use]
    pub const fn params(&self) -> &ControlParams {
        &self.params
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Running totals
    #[must_use]
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    fn bad_usage(&self, operation: &'static str) -> Error {
        Error::BadUsage {
            operation,
            state: self.state.into(),
        }
    }

    /// Storage holding the current record
    ///
    /// # Errors
    ///
    /// [`Error::BadUsage`] after [`Session::close`], [`Error::Unsupported`]
    /// for families without a built in codec
    pub fn store(&self) -> Result<&Store, Error> {
        if self.state == SessionState::Closed {
            return Err(self.bad_usage("store"));
        }
        self.store
            .as_ref()
            .ok_or_else(|| self.codec.unsupported("store"))
    }

    /// Mutable storage, for building records to write
    ///
    /// # Errors
    ///
    /// See [`Session::store`]
    pub fn store_mut(&mut self) -> Result<&mut Store, Error> {
        if self.state == SessionState::Closed {
            return Err(self.bad_usage("store"));
        }
        let unsupported = self.codec.unsupported("store");
        self.store.as_mut().ok_or(unsupported)
    }

    /// Decodes the next record into the storage without extracting or filtering it
    ///
    /// # Errors
    ///
    /// [`Error::BadUsage`] on a closed or writing session, otherwise the
    /// codec's decode errors
    pub fn read_record(&mut self) -> Result<RecordKind, Error> {
        let unsupported = self.codec.unsupported("read");
        let Some(Stream::Read(reader)) = self.stream.as_mut() else {
            return Err(self.bad_usage("read"));
        };
        let store = self.store.as_mut().ok_or(unsupported)?;
        self.state = SessionState::Reading;
        let kind = self.codec.read_record(&mut **reader, store)?;
        self.counters.records += 1;
        match kind {
            RecordKind::Data => self.counters.pings += 1,
            RecordKind::Comment => self.counters.comments += 1,
            _ => {}
        }
        Ok(kind)
    }

    /// Decodes, extracts and applies the per ping filters
    fn step(&mut self) -> Step {
        let record = match self.read_record().and_then(|_| self.extract()) {
            Ok(record) => record,
            Err(e) => return Step::Failed(e),
        };
        if record.kind != RecordKind::Data {
            return Step::Accepted(record);
        }
        let mut record = record;
        record.lon = apply_lonflip(self.params.lonflip, record.lon);
        let known_time = record.time_d > TIME_D_UNKNOWN;
        let verdict = if !self.params.in_bounds(record.lon, record.lat) {
            Err(Error::OutOfBounds {
                lon: record.lon,
                lat: record.lat,
            })
        } else if known_time && !self.params.in_time_window(record.time_d) {
            Err(Error::OutOfTimeWindow {
                time_d: record.time_d,
            })
        } else {
            match self.last {
                Some(last)
                    if known_time
                        && self.counters.pings > 1
                        && record.time_d - last.time_d > 60.0 * self.params.timegap =>
                {
                    Err(Error::TimeGap {
                        gap: record.time_d - last.time_d,
                    })
                }
                _ => Ok(()),
            }
        };
        if matches!(verdict, Ok(()) | Err(Error::TimeGap { .. } | Error::OutOfBounds { .. })) {
            self.last = Some(Fix::from(&record));
        }
        match verdict {
            Ok(()) => Step::Accepted(record),
            Err(e) => {
                debug!("ping at {} rejected: {e}", record.time_d);
                Step::Rejected(record, e)
            }
        }
    }

    /// Fills distance and derived speed from the previous reported ping
    fn motion(&mut self, record: &mut Record) -> Result<(), Error> {
        let old = *self.old.get_or_insert_with(|| Fix::from(&*record));
        record.distance = if old.time_d > 0.0 {
            let (mtodeglon, mtodeglat) = coor_scale(record.lat);
            let dx = (record.lon - old.lon) / mtodeglon;
            let dy = (record.lat - old.lat) / mtodeglat;
            0.001 * dx.hypot(dy)
        } else {
            0.0
        };
        if record.speed <= 0.0 {
            let hours = HOURS_PER_SECOND * (record.time_d - old.time_d);
            record.speed = if old.time_d > 0.0 && hours > 0.0 {
                record.distance / hours
            } else {
                0.0
            };
        }
        self.old = Some(Fix::from(&*record));
        if self.counters.pings > 1
            && record.time_d > TIME_D_UNKNOWN
            && record.speed < self.params.speedmin
        {
            return Err(Error::SpeedTooSmall {
                speed: record.speed,
            });
        }
        Ok(())
    }

    /// Reads the next record of any kind
    ///
    /// Survey pings carry the distance from the previous ping and, when the
    /// format supplies none, a speed derived from it. Pings failing the
    /// bounds, time window or minimum speed checks are reported as skip
    /// errors; the session stays readable. A [`Error::TimeGap`] is only a
    /// notice: the ping that follows the gap is returned by the next call.
    ///
    /// # Errors
    ///
    /// - [`Error::EndOfFile`] after the last record
    /// - skip errors, see [`Error::is_skip`]
    /// - stream integrity errors of the current record, see [`Error::is_stream_integrity`]
    /// - [`Error::BadUsage`] on a closed or writing session
    pub fn get_all(&mut self) -> Result<Record, Error> {
        let step = self.pending.take().unwrap_or_else(|| self.step());
        match step {
            Step::Accepted(mut record) => {
                if record.kind == RecordKind::Data {
                    self.motion(&mut record)?;
                }
                Ok(record)
            }
            Step::Rejected(record, e @ Error::TimeGap { .. }) => {
                self.pending = Some(Step::Accepted(record));
                Err(e)
            }
            Step::Rejected(_, e) | Step::Failed(e) => Err(e),
        }
    }

    /// Reads the next survey ping or comment, averaging `pings` consecutive pings
    ///
    /// Navigation, parameter, profile and unknown records are passed over,
    /// as are records that fail to decode while a bin is being filled.
    /// When a bin ends early on a comment or an error, that comment or
    /// error is returned by the following call.
    ///
    /// # Errors
    ///
    /// See [`Session::get_all`]
    #[instrument(skip(self), level = "debug")]
    pub fn read(&mut self) -> Result<Record, Error> {
        let wanted = self.params.pings;
        let mut bin = PingBin::default();
        loop {
            let step = self.pending.take().unwrap_or_else(|| self.step());
            match step {
                Step::Accepted(record) if record.kind == RecordKind::Data => {
                    bin.add(&record, wanted == 1);
                    if bin.count >= wanted {
                        break;
                    }
                }
                Step::Accepted(record) if record.kind == RecordKind::Comment => {
                    if bin.count == 0 {
                        return Ok(record);
                    }
                    self.pending = Some(Step::Accepted(record));
                    break;
                }
                Step::Accepted(record) => trace!("passing over {} record", record.kind),
                Step::Rejected(record, e @ Error::TimeGap { .. }) if bin.count == 0 => {
                    self.pending = Some(Step::Accepted(record));
                    return Err(e);
                }
                Step::Failed(e) if e.is_stream_integrity() => {
                    warn!("passing over unreadable record: {e}");
                }
                Step::Rejected(_, e) | Step::Failed(e) if bin.count == 0 => return Err(e),
                step => {
                    self.pending = Some(step);
                    break;
                }
            }
        }
        let mut record = bin.finish();
        self.motion(&mut record)?;
        Ok(record)
    }

    fn with_store<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&dyn SensorCodec, &Store) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let store = self.store().map_err(|e| match e {
            Error::BadUsage { .. } => self.bad_usage(operation),
            _ => self.codec.unsupported(operation),
        })?;
        f(self.codec.as_ref(), store)
    }

    fn with_store_mut<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&dyn SensorCodec, &mut Store) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.state == SessionState::Closed {
            return Err(self.bad_usage(operation));
        }
        let unsupported = self.codec.unsupported(operation);
        let store = self.store.as_mut().ok_or(unsupported)?;
        f(self.codec.as_ref(), store)
    }

    /// Normalized view of the current record, without filtering
    ///
    /// # Errors
    ///
    /// [`Error::BadUsage`] after close, otherwise the codec's errors
    pub fn extract(&self) -> Result<Record, Error> {
        self.with_store("extract", |codec, store| codec.extract(store))
    }

    /// Navigation and attitude of the current record
    ///
    /// # Errors
    ///
    /// [`Error::WrongRecordKind`] for records without navigation,
    /// [`Error::Unsupported`] for families that cannot answer
    pub fn extract_nav(&self) -> Result<Navigation, Error> {
        self.with_store("extract_nav", |codec, store| codec.extract_nav(store))
    }

    /// Transducer depth and altitude of the current ping
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn extract_altitude(&self) -> Result<Altitude, Error> {
        self.with_store("extract_altitude", |codec, store| {
            codec.extract_altitude(store)
        })
    }

    /// Travel times and takeoff angles of the current ping
    ///
    /// # Errors
    ///
    /// [`Error::NotEnoughData`] when the ping lacks travel times, otherwise
    /// see [`Session::extract_nav`]
    pub fn ttimes(&self) -> Result<TravelTimes, Error> {
        self.with_store("ttimes", |codec, store| codec.ttimes(store))
    }

    /// Sound velocity profile of the current record
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn extract_svp(&self) -> Result<VelocityProfile, Error> {
        self.with_store("extract_svp", |codec, store| codec.extract_svp(store))
    }

    /// Replaces the navigation of the current record
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn insert_nav(&mut self, nav: &Navigation) -> Result<(), Error> {
        self.with_store_mut("insert_nav", |codec, store| codec.insert_nav(store, nav))
    }

    /// Replaces the altitude of the current record
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn insert_altitude(&mut self, altitude: &Altitude) -> Result<(), Error> {
        self.with_store_mut("insert_altitude", |codec, store| {
            codec.insert_altitude(store, altitude)
        })
    }

    /// Replaces the sound velocity profile of the current record
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn insert_svp(&mut self, svp: &VelocityProfile) -> Result<(), Error> {
        self.with_store_mut("insert_svp", |codec, store| codec.insert_svp(store, svp))
    }

    /// Writes a normalized record back into the storage
    ///
    /// Comments always succeed; survey data replaces the values of the
    /// ping currently held.
    ///
    /// # Errors
    ///
    /// See [`Session::extract_nav`]
    pub fn insert(&mut self, record: &Record) -> Result<(), Error> {
        self.with_store_mut("insert", |codec, store| codec.insert(store, record))
    }

    /// Encodes the current record to the output stream
    ///
    /// # Errors
    ///
    /// [`Error::BadUsage`] on a closed or reading session,
    /// [`Error::WriteFailed`] when the stream refuses the bytes
    pub fn write(&mut self) -> Result<(), Error> {
        let unsupported = self.codec.unsupported("write");
        let Some(Stream::Write(writer)) = self.stream.as_mut() else {
            return Err(self.bad_usage("write"));
        };
        let store = self.store.as_ref().ok_or(unsupported)?;
        self.codec.write_record(&mut **writer, store)?;
        self.state = SessionState::Writing;
        self.counters.written += 1;
        Ok(())
    }

    /// Encodes the record held by another session's storage
    ///
    /// # Errors
    ///
    /// See [`Session::write`]
    pub fn write_store(&mut self, store: &Store) -> Result<(), Error> {
        let Some(Stream::Write(writer)) = self.stream.as_mut() else {
            return Err(self.bad_usage("write"));
        };
        self.codec.write_record(&mut **writer, store)?;
        self.state = SessionState::Writing;
        self.counters.written += 1;
        Ok(())
    }

    /// Flushes and releases the stream and storage
    ///
    /// Every later call fails with [`Error::BadUsage`]. Closing twice is harmless.
    ///
    /// # Errors
    ///
    /// [`Error::WriteFailed`] if buffered output cannot be flushed
    pub fn close(&mut self) -> Result<(), Error> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        let stream = self.stream.take();
        self.store = None;
        self.pending = None;
        self.state = SessionState::Closed;
        info!(
            "closed session: {} records read ({} pings, {} comments), {} written",
            self.counters.records,
            self.counters.pings,
            self.counters.comments,
            self.counters.written
        );
        if let Some(Stream::Write(mut writer)) = stream {
            writer.flush().map_err(Error::WriteFailed)?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("closing session on drop: {e}");
        }
    }
}

/// Running sums of the pings averaged into one output ping
#[derive(Debug, Default)]
struct PingBin {
    count: usize,
    time_d: f64,
    lon: f64,
    lat: f64,
    speed: f64,
    heading: f64,
    heading_x: f64,
    heading_y: f64,
    bath: Vec<(Sounding, usize)>,
    amp: Vec<(f64, usize)>,
    ss: Vec<(Pixel, usize)>,
}

impl PingBin {
    fn add(&mut self, record: &Record, single: bool) {
        self.count += 1;
        self.time_d += record.time_d;
        self.lon += record.lon;
        self.lat += record.lat;
        self.speed += record.speed;
        self.heading += record.heading;
        let (sin, cos) = (DTR * record.heading).sin_cos();
        self.heading_x += sin;
        self.heading_y += cos;

        let swath = &record.swath;
        let empty = Sounding {
            flag: BeamFlag::Null,
            ..Sounding::default()
        };
        if self.bath.len() < swath.bath.len() {
            self.bath.resize(swath.bath.len(), (empty, 0));
        }
        if self.amp.len() < swath.amp.len() {
            self.amp.resize(swath.amp.len(), (0.0, 0));
        }
        if self.ss.len() < swath.ss.len() {
            self.ss.resize(swath.ss.len(), (Pixel::default(), 0));
        }
        for (i, beam) in swath.bath.iter().enumerate() {
            let slot = &mut self.bath[i];
            if single {
                *slot = (*beam, 1);
            } else if beam.flag.is_good() {
                slot.0.flag = BeamFlag::None;
                slot.0.depth += beam.depth;
                slot.0.acrosstrack += beam.acrosstrack;
                slot.0.alongtrack += beam.alongtrack;
                slot.1 += 1;
            }
        }
        for (i, &amp) in swath.amp.iter().enumerate() {
            let good = swath.bath.get(i).map_or(true, |b| b.flag.is_good());
            let slot = &mut self.amp[i];
            if single {
                *slot = (amp, 1);
            } else if good {
                slot.0 += amp;
                slot.1 += 1;
            }
        }
        for (i, pixel) in swath.ss.iter().enumerate() {
            let slot = &mut self.ss[i];
            if single {
                *slot = (*pixel, 1);
            } else if pixel.value != 0.0 {
                slot.0.value += pixel.value;
                slot.0.acrosstrack += pixel.acrosstrack;
                slot.0.alongtrack += pixel.alongtrack;
                slot.1 += 1;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> Record {
        let n = self.count.max(1) as f64;
        let (hx, hy) = (self.heading_x / n, self.heading_y / n);
        let mut heading = if hx.hypot(hy) > 0.0 {
            RTD * hx.atan2(hy)
        } else {
            self.heading / n
        };
        if heading < 0.0 {
            heading += 360.0;
        }
        let mean = |sum: f64, count: usize| {
            if count > 0 {
                sum / count as f64
            } else {
                0.0
            }
        };
        let bath = self
            .bath
            .into_iter()
            .map(|(beam, count)| {
                if count == 0 {
                    Sounding {
                        flag: BeamFlag::Null,
                        ..Sounding::default()
                    }
                } else {
                    Sounding {
                        flag: beam.flag,
                        depth: mean(beam.depth, count),
                        acrosstrack: mean(beam.acrosstrack, count),
                        alongtrack: mean(beam.alongtrack, count),
                    }
                }
            })
            .collect();
        let amp = self.amp.into_iter().map(|(a, count)| mean(a, count)).collect();
        let ss = self
            .ss
            .into_iter()
            .map(|(p, count)| Pixel {
                value: mean(p.value, count),
                acrosstrack: mean(p.acrosstrack, count),
                alongtrack: mean(p.alongtrack, count),
            })
            .collect();
        Record {
            kind: RecordKind::Data,
            time_d: self.time_d / n,
            lon: self.lon / n,
            lat: self.lat / n,
            speed: self.speed / n,
            heading,
            distance: 0.0,
            swath: Swath { bath, amp, ss },
            comment: None,
        }
    }
}
