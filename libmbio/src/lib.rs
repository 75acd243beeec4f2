//! # libmbio
//!
//!
//! This library provides the format independent i/o layer for swath sonar data: a registry of
//! numeric format ids, a generic read/write session that filters and averages pings, and a
//! codec for the ELAC/SeaBeam XSE frame format (format 94).
//!
//! Swath data files come in dozens of vendor formats. Each format id belongs to a
//! [`SensorFamily`](format::SensorFamily), and each family is served by one
//! [`SensorCodec`](codec::SensorCodec). Callers never deal with the family directly; they open a
//! [`Session`] with a format id and receive format independent [`Record`]s.
//!
//! ### Limitations
//!
//! Only the XSE family has a built in codec. Every other registered family resolves to a codec
//! that answers [`Error::Unsupported`], so the registry can still identify and describe those
//! files.
//!
//! ### Usage
//!
//! #### Listing the pings of a file
//!
//! ```no_run
//! use libmbio::{ControlParams, Error, Session};
//!
//! fn main() -> anyhow::Result<()> {
//!     let params = ControlParams::builder()
//!         .bounds([-123.0, -121.0, 36.0, 37.5])
//!         .pings(3)
//!         .build();
//!     let mut session = Session::open("survey.mb94", 94, params)?;
//!     loop {
//!         match session.read() {
//!             Ok(ping) => println!("{:.6} {:.6} {:.6}", ping.time_d, ping.lon, ping.lat),
//!             Err(Error::EndOfFile) => break,
//!             Err(e) if e.is_skip() => continue,
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//!     session.close()?;
//!     Ok(())
//! }
//! ```
//!
//! #### Copying records between files
//!
//! Raw copies go through the storage, so frames this crate does not interpret are written back
//! byte for byte.
//!
//! ```no_run
//! use libmbio::{ControlParams, Error, Session};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut input = Session::open("in.mb94", 94, ControlParams::default())?;
//!     let mut output = Session::create("out.mb94", 94)?;
//!     loop {
//!         match input.read_record() {
//!             Ok(_) => output.write_store(input.store()?)?,
//!             Err(Error::EndOfFile) => break,
//!             Err(e) if e.is_stream_integrity() => continue,
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//!     output.close()?;
//!     Ok(())
//! }
//! ```
//!
//! #### Unstable API
//!
//! Expect breaking changes between minor releases until `v1.0`. The XSE frame types carry the
//! `#[non_exhaustive]` attribute and implement the builder pattern; build them through their
//! `builder()` functions.
//!
//!

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

pub mod codec;
pub mod coords;
mod error;
pub mod format;
pub mod session;
pub mod time;
pub mod xse;

pub use codec::{Record, RecordKind};
pub use error::Error;
pub use format::{FormatInfo, SensorFamily};
pub use session::{ControlParams, Session};
