use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{codec::RecordKind, format::SensorFamily};

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libmbio` errors
///
/// The variants fall into the groups reported by [`Error::is_skip`],
/// [`Error::is_stream_integrity`] and [`Error::is_fatal`]. Skip signals
/// (bounds, time window, speed, time gap) leave the session readable.
pub enum Error {
    /// Format id is not present in the registry
    #[error("format id {0} is not a registered swath format")]
    BadFormat(i32),
    /// Operation is not legal in the current session state
    #[error("{operation} is not allowed while the session is {state}")]
    BadUsage {
        /// operation that was attempted
        operation: &'static str,
        /// session state at the time of the call
        state: &'static str,
    },
    /// Inconsistent control parameter
    #[error("bad parameter: {0}")]
    BadParameter(String),
    /// Underlying file could not be opened
    #[error("unable to open {path:?}")]
    OpenFailed {
        /// path of the file
        path: PathBuf,
        /// io error returned by the OS
        #[source]
        source: io::Error,
    },
    /// A declared record length could not be allocated
    #[error("unable to allocate {requested} bytes for record")]
    OutOfMemory {
        /// number of bytes requested
        requested: usize,
    },
    /// Writing an encoded record failed
    #[error("write failed")]
    WriteFailed(#[source] io::Error),
    /// The stream did not start with a frame start marker
    #[error("frame sync lost, skipped {skipped} bytes without finding a start marker")]
    FrameSyncLost {
        /// bytes skipped while scanning for a start marker
        skipped: u64,
    },
    /// A group's declared byte count disagrees with its decoded content
    #[error("group {group_id} of frame {frame_id} declares {declared} bytes but {consumed} were consumed")]
    GroupSizeMismatch {
        /// parent frame type id
        frame_id: u32,
        /// group id
        group_id: u32,
        /// byte count stored in the group
        declared: u32,
        /// byte count actually consumed
        consumed: u32,
    },
    /// A frame's end marker is not where its byte count puts it
    #[error("frame {frame_id} declares {declared} bytes but its end marker follows {actual}")]
    FrameTrailerMismatch {
        /// frame type id
        frame_id: u32,
        /// byte count stored in the frame
        declared: u32,
        /// byte count up to the end marker actually found
        actual: u32,
    },
    /// A frame or group claims more bytes than the stream holds
    #[error("record truncated: needed {needed} bytes, {available} available")]
    TruncatedRecord {
        /// bytes required by the declared count
        needed: usize,
        /// bytes actually available
        available: usize,
    },
    /// Decoded values are not physically meaningful
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
    /// A ping holds more beams than the format allows
    #[error("{count} beams exceeds the format maximum of {max}")]
    BeamCapacity {
        /// beams in the record
        count: usize,
        /// format maximum
        max: usize,
    },
    /// Ping position lies outside the configured bounds
    #[error("ping at lon {lon}, lat {lat} is outside the configured bounds")]
    OutOfBounds {
        /// ping longitude
        lon: f64,
        /// ping latitude
        lat: f64,
    },
    /// Ping time lies outside the configured time window
    #[error("ping time {time_d} is outside the configured time window")]
    OutOfTimeWindow {
        /// ping time in seconds since 1970
        time_d: f64,
    },
    /// Time since the last ping exceeds the configured gap
    #[error("time gap of {gap} seconds")]
    TimeGap {
        /// elapsed seconds since the previous ping
        gap: f64,
    },
    /// Derived speed is below the configured minimum
    #[error("speed {speed} km/hr is below the configured minimum")]
    SpeedTooSmall {
        /// speed in km/hr
        speed: f64,
    },
    /// No more records in the stream
    #[error("end of file")]
    EndOfFile,
    /// The current record does not carry the data required
    #[error("not enough data: {0}")]
    NotEnoughData(&'static str),
    /// The current record kind cannot answer this operation
    #[error("{operation} is not available for {kind} records")]
    WrongRecordKind {
        /// operation that was attempted
        operation: &'static str,
        /// kind of the current record
        kind: RecordKind,
    },
    /// The sensor family does not implement this operation
    #[error("{operation} is not supported by the {family} sensor family")]
    Unsupported {
        /// family that was dispatched to
        family: SensorFamily,
        /// operation that was attempted
        operation: &'static str,
    },
    /// Other read failures
    #[error("i/o error")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` for record rejections that leave the stream usable:
    /// out of bounds, out of the time window, speed too small and time gaps
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. }
                | Self::OutOfTimeWindow { .. }
                | Self::SpeedTooSmall { .. }
                | Self::TimeGap { .. }
        )
    }

    /// Returns `true` for framing and decoding failures of the current record
    #[must_use]
    pub const fn is_stream_integrity(&self) -> bool {
        matches!(
            self,
            Self::FrameSyncLost { .. }
                | Self::GroupSizeMismatch { .. }
                | Self::FrameTrailerMismatch { .. }
                | Self::TruncatedRecord { .. }
                | Self::CorruptRecord(_)
                | Self::BeamCapacity { .. }
        )
    }

    /// Returns `true` if the session cannot continue after this error
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EndOfFile
                | Self::Io(_)
                | Self::WriteFailed(_)
                | Self::OutOfMemory { .. }
                | Self::OpenFailed { .. }
        )
    }
}
