//! ELAC/SeaBeam XSE codec (format 94, `L3XSERAW`)
//!
//! XSE streams are sequences of self-describing frames, each holding a
//! sequence of groups. Frames and groups carry their own byte counts and
//! start/end markers; see [`frame`] for the envelope layout.
//!
//! Decoding is split in three layers:
//!
//! 1. [`frame::read_frame`] pulls one complete frame off a stream,
//!    resynchronizing on the next start marker after garbage.
//! 2. [`XseFrame::decode`] interprets the groups of the frame types this
//!    crate understands and keeps everything else verbatim, so that
//!    re-encoding an unmodified frame reproduces its bytes.
//! 3. The [`SensorCodec`] implementation translates between the frames
//!    held in an [`XseStore`] and the format independent views.

pub mod frame;
mod extract;
mod parse;
mod store;

use std::io::{BufRead, Write};

use tracing::{instrument, trace};

pub use frame::{FrameTime, RawGroup};
pub use store::{
    Beam, BeamArray, CommentFrame, FrameType, Motion, MultibeamFrame, MultibeamGeneral,
    MultibeamNav, NavGeneral, NavigationFrame, OtherFrame, Position, ShipFrame, ShipParameter,
    SvpFrame, XseFrame, XseStore,
};

use crate::{
    codec::{
        Altitude, Navigation, Record, RecordKind, SensorCodec, Store, TravelTimes,
        VelocityProfile,
    },
    format::SensorFamily,
    Error,
};

/// Maximum number of beams in one ping
pub const MAX_BEAMS: usize = 151;
/// Maximum number of samples in one sound velocity profile
pub const MAX_SVP: usize = 200;
/// Capacity of a comment, terminating NUL included
pub const COMMENT_LENGTH: usize = 200;
/// Soundings deeper than this are rejected as corrupt
pub const MAX_DEPTH: f64 = 11_000.0;

/// Codec for the [`SensorFamily::Xse`] family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XseCodec;

fn xse(store: &Store) -> &XseStore {
    match store {
        Store::Xse(store) => store,
    }
}

fn xse_mut(store: &mut Store) -> &mut XseStore {
    match store {
        Store::Xse(store) => store,
    }
}

impl SensorCodec for XseCodec {
    fn family(&self) -> SensorFamily {
        SensorFamily::Xse
    }

    fn new_store(&self) -> Result<Store, Error> {
        Ok(Store::Xse(Box::default()))
    }

    #[instrument(skip_all, level = "trace")]
    fn read_record(&self, r: &mut dyn BufRead, store: &mut Store) -> Result<RecordKind, Error> {
        let bytes = frame::read_frame(r)?;
        let (frame, _) = XseFrame::decode(&bytes)?;
        let kind = xse_mut(store).push(frame);
        trace!("read {kind} record");
        Ok(kind)
    }

    fn write_record(&self, w: &mut dyn Write, store: &Store) -> Result<(), Error> {
        let mut out = Vec::new();
        xse(store).encode_current(&mut out)?;
        w.write_all(&out).map_err(Error::WriteFailed)
    }

    fn extract(&self, store: &Store) -> Result<Record, Error> {
        extract::extract(xse(store))
    }

    fn insert(&self, store: &mut Store, record: &Record) -> Result<(), Error> {
        extract::insert(xse_mut(store), record)
    }

    fn extract_nav(&self, store: &Store) -> Result<Navigation, Error> {
        extract::extract_nav(xse(store))
    }

    fn insert_nav(&self, store: &mut Store, nav: &Navigation) -> Result<(), Error> {
        extract::insert_nav(xse_mut(store), nav)
    }

    fn extract_altitude(&self, store: &Store) -> Result<Altitude, Error> {
        extract::extract_altitude(xse(store))
    }

    fn ttimes(&self, store: &Store) -> Result<TravelTimes, Error> {
        extract::ttimes(xse(store))
    }

    fn extract_svp(&self, store: &Store) -> Result<VelocityProfile, Error> {
        extract::extract_svp(xse(store))
    }

    fn insert_svp(&self, store: &mut Store, svp: &VelocityProfile) -> Result<(), Error> {
        extract::insert_svp(xse_mut(store), svp)
    }
}
