//! Registry of swath data formats
//!
//! Maps numeric format ids to their names, sensor families and beam
//! capacities, and infers format ids from filename suffixes.

#![allow(clippy::module_name_repetitions)]

mod table;

use std::{path::Path, sync::LazyLock};

use regex::Regex;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, trace};

use crate::Error;
use table::{FORMATS, LEGACY_ALIASES};

/// Exclusive upper bound of the format id space
pub const MAX_FORMAT_ID: i32 = 1000;

/// Format id reported for datalist files
pub const DATALIST: i32 = -1;

/// The class of per-format codec logic a format id dispatches to
///
/// Several formats may share one family. The discriminant is the
/// family's stable numeric id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[repr(u8)]
#[non_exhaustive]
pub enum SensorFamily {
    /// SeaBeam classic
    #[strum(serialize = "SB")]
    SeaBeam = 1,
    /// Hydrosweep DS
    #[strum(serialize = "HSDS")]
    Hsds = 2,
    /// SeaBeam 2000
    #[strum(serialize = "SB2000")]
    Sb2000 = 3,
    /// SeaBeam 2100
    #[strum(serialize = "SB2100")]
    Sb2100 = 4,
    /// Old Simrad multibeams
    #[strum(serialize = "SIMRAD")]
    Simrad = 5,
    /// Simrad EM300/EM3000
    #[strum(serialize = "SIMRAD2")]
    Simrad2 = 6,
    /// Kongsberg EM710 generation
    #[strum(serialize = "SIMRAD3")]
    Simrad3 = 7,
    /// Hawaii MR1
    #[strum(serialize = "MR1")]
    Mr1 = 8,
    /// Hawaii MR1, small Lamont variant
    #[strum(serialize = "MR1B")]
    Mr1B = 9,
    /// Hawaii MR1, 2001 revision
    #[strum(serialize = "MR1V2001")]
    Mr1V2001 = 10,
    /// L-DEO in-house generic
    #[strum(serialize = "LDEOIH")]
    Ldeoih = 11,
    /// Reson SeaBat
    #[strum(serialize = "RESON")]
    Reson = 12,
    /// Reson SeaBat 8K
    #[strum(serialize = "RESON8K")]
    Reson8k = 13,
    /// Elac BottomChart
    #[strum(serialize = "ELAC")]
    Elac = 14,
    /// Elac BottomChart Mk2
    #[strum(serialize = "ELACMK2")]
    ElacMk2 = 15,
    /// Hydrosweep MD
    #[strum(serialize = "HSMD")]
    Hsmd = 16,
    /// WHOI DSL AMS-120
    #[strum(serialize = "DSL")]
    Dsl = 17,
    /// Generic Sensor Format
    #[strum(serialize = "GSF")]
    Gsf = 18,
    /// MSTIFF sidescan
    #[strum(serialize = "MSTIFF")]
    MStiff = 19,
    /// Oceanic Imaging Consultants
    #[strum(serialize = "OIC")]
    Oic = 20,
    /// UNB OMG HDCS
    #[strum(serialize = "HDCS")]
    Hdcs = 21,
    /// Single beam and navigation only
    #[strum(serialize = "SINGLEBEAM")]
    Singlebeam = 22,
    /// ELAC/SeaBeam XSE frame/group format
    #[strum(serialize = "XSE")]
    Xse = 23,
    /// Furuno HS10
    #[strum(serialize = "HS10")]
    Hs10 = 24,
    /// CARAIBES netCDF
    #[strum(serialize = "NETCDF")]
    NetCdf = 25,
    /// STN Atlas
    #[strum(serialize = "ATLAS")]
    Atlas = 26,
    /// CARAIBES netCDF navigation
    #[strum(serialize = "NAVNETCDF")]
    NavNetCdf = 27,
    /// STN Atlas SURF
    #[strum(serialize = "SURF")]
    Surf = 28,
    /// Reson 7K
    #[strum(serialize = "RESON7K")]
    Reson7k = 29,
    /// Edgetech Jstar
    #[strum(serialize = "JSTAR")]
    Jstar = 30,
    /// Imagenex DeltaT
    #[strum(serialize = "IMAGE83P")]
    Image83p = 31,
    /// Hypack HYSWEEP
    #[strum(serialize = "HYSWEEP")]
    Hysweep = 32,
    /// Benthos sidescan
    #[strum(serialize = "BENTHOS")]
    Benthos = 33,
    /// SEA SWATHplus
    #[strum(serialize = "SWATHPLUS")]
    SwathPlus = 34,
    /// 3DatDepth lidar
    #[strum(serialize = "3DATDEPTHLIDAR")]
    ThreeDatDepthLidar = 35,
    /// 3D at Depth WiSSL
    #[strum(serialize = "3DDWISSL1")]
    ThreeDdWissl1 = 36,
    /// 3D at Depth WiSSL2
    #[strum(serialize = "3DDWISSL2")]
    ThreeDdWissl2 = 37,
    /// WASSP
    #[strum(serialize = "WASSP")]
    Wassp = 38,
    /// Stereo photogrammetry
    #[strum(serialize = "STEREOPAIR")]
    StereoPair = 39,
    /// Kongsberg kmall
    #[strum(serialize = "KMBES")]
    Kmbes = 40,
    /// Teledyne 7k version 3
    #[strum(serialize = "RESON7K3")]
    Reson7k3 = 41,
}

impl SensorFamily {
    /// Returns the family's numeric id
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the family's short name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Into::<&'static str>::into(self)
    }
}

/// Registry entry describing one swath data format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct FormatInfo {
    /// Format id
    pub id: i32,
    /// Eight character format name
    pub name: &'static str,
    /// Sensor family handling this format
    pub family: SensorFamily,
    /// Maximum number of bathymetry beams
    pub beams_bath_max: usize,
    /// Maximum number of amplitude beams
    pub beams_amp_max: usize,
    /// Maximum number of sidescan pixels
    pub pixels_ss_max: usize,
    /// Whether records carry a ship speed (otherwise it is derived from navigation)
    pub speed_supplied: bool,
    /// Human readable description
    pub description: &'static str,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn build_index() -> [Option<u16>; MAX_FORMAT_ID as usize] {
    let mut index = [None; MAX_FORMAT_ID as usize];
    let mut i = 0;
    while i < FORMATS.len() {
        index[FORMATS[i].id as usize] = Some(i as u16);
        i += 1;
    }
    index
}

static INDEX: [Option<u16>; MAX_FORMAT_ID as usize] = build_index();

static SUFFIX_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\.mb(-?\d+)$"));

/// Translates legacy format ids (1 through 9) to their current ids
///
/// Every other id is returned unchanged.
#[must_use]
pub fn resolve_alias(id: i32) -> i32 {
    usize::try_from(id)
        .ok()
        .and_then(|i| LEGACY_ALIASES.get(i).copied())
        .filter(|&alias| alias != 0)
        .map_or(id, |alias| {
            debug!("format id {id} is a legacy alias of {alias}");
            alias
        })
}

/// Looks up a format id in the registry
///
/// Legacy ids are resolved first.
///
/// # Errors
///
/// Returns [`Error::BadFormat`] for any id that is not registered, including
/// negative ids and ids past [`MAX_FORMAT_ID`].
pub fn lookup(id: i32) -> Result<&'static FormatInfo, Error> {
    let resolved = resolve_alias(id);
    usize::try_from(resolved)
        .ok()
        .and_then(|i| INDEX.get(i).copied().flatten())
        .map(|i| &FORMATS[usize::from(i)])
        .ok_or(Error::BadFormat(id))
}

/// Looks up a format by its eight character name, ignoring case
///
/// # Errors
///
/// Returns [`Error::BadParameter`] if no format carries this name.
pub fn lookup_name(name: &str) -> Result<&'static FormatInfo, Error> {
    FORMATS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::BadParameter(format!("unknown format name {name}")))
}

/// Returns the sensor family of a format id
///
/// # Errors
///
/// See [`lookup`]
pub fn family_of(id: i32) -> Result<SensorFamily, Error> {
    lookup(id).map(|f| f.family)
}

/// Iterates over all registered formats in id order
pub fn formats() -> impl Iterator<Item = &'static FormatInfo> {
    FORMATS.iter()
}

/// Infers a format id from a filename suffix
///
/// Recognizes `.mbNN`, `.rec` (SeaBeam 2100), `.merged` (HDCS) and `.nv`
/// (simple navigation). Datalists (`.dls`, `.mb-1`) and unknown suffixes fail.
///
/// # Errors
///
/// Returns [`Error::BadFormat`] when no registered format can be inferred.
pub fn format_from_path(path: impl AsRef<Path>) -> Result<i32, Error> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::BadParameter(format!("invalid filename {}", path.display())))?;
    trace!("inferring format of {name}");
    let suffix = SUFFIX_REGEX
        .as_ref()
        .map_err(|e| Error::BadParameter(e.to_string()))?;
    let id = if let Some(caps) = suffix.captures(name) {
        caps[1].parse::<i32>().map_err(|_| Error::BadFormat(0))?
    } else if name.ends_with(".dls") {
        DATALIST
    } else if name.ends_with(".rec") {
        41
    } else if name.ends_with(".merged") {
        151
    } else if name.ends_with(".nv") {
        166
    } else {
        return Err(Error::BadFormat(0));
    };
    lookup(id).map(|f| f.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_table() {
        for f in formats() {
            assert_eq!(lookup(f.id).unwrap(), f);
        }
    }

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(FORMATS.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn names_are_eight_characters() {
        assert!(FORMATS.iter().all(|f| f.name.len() == 8));
    }
}
