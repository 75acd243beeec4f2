use std::{fmt, io::Write, path::Path};

use anyhow::{bail, ensure, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use itertools::{Itertools, MinMaxResult};
use libmbio::{
    codec::{BeamFlag, Record},
    format::{format_from_path, lookup},
    time::to_datetime,
    ControlParams, Error, FormatInfo, RecordKind, SensorFamily, Session,
};
use tracing::{debug, info, instrument, warn};

/// Picks the explicit format id, or infers it from the filename
pub fn resolve_format(format: Option<i32>, path: &Path) -> Result<i32> {
    match format {
        Some(id) => Ok(lookup(id)?.id),
        None => format_from_path(path)
            .with_context(|| format!("cannot infer the format of {}, use --format", path.display())),
    }
}

/// Parses geographic bounds written as `west/east/south/north`
pub fn parse_bounds(s: &str) -> Result<[f64; 4]> {
    let values: Vec<f64> = s
        .split('/')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid bounds {s}"))?;
    let Ok(bounds) = <[f64; 4]>::try_from(values) else {
        bail!("bounds need four values, west/east/south/north, found {s}");
    };
    Ok(bounds)
}

/// Parses a UTC time, either ISO 8601 or `yyyy/mm/dd/hh/mm/ss`
pub fn parse_time(s: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d/%H/%M/%S",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .with_context(|| format!("unrecognized time {s}"))
}

/// One line description of a registry entry
pub fn describe_format(info: &FormatInfo) -> String {
    format!(
        "{:>4}  {}  {:<8}  {}",
        info.id,
        info.name,
        info.family.as_str(),
        info.description
    )
}

fn format_time(time_d: f64) -> String {
    to_datetime(time_d).map_or_else(
        || format!("{time_d:.6}"),
        |t| t.format("%Y/%m/%d %H:%M:%S%.6f").to_string(),
    )
}

/// Counts and extents of one swath file
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    /// Records of each kind, in order of first appearance
    pub records: Vec<(RecordKind, u64)>,
    /// Records rejected by the control parameters
    pub skipped: u64,
    /// Records that could not be decoded
    pub unreadable: u64,
    /// First and last ping time
    pub time: Option<(f64, f64)>,
    /// Longitude range of the pings
    pub lon: Option<(f64, f64)>,
    /// Latitude range of the pings
    pub lat: Option<(f64, f64)>,
    /// Depth range of the good beams
    pub depth: Option<(f64, f64)>,
    /// Total distance along track in km
    pub distance: f64,
    /// Good, flagged and empty beams
    pub beams: [u64; 3],
    /// Comment texts
    pub comments: Vec<String>,
}

fn widen(range: &mut Option<(f64, f64)>, value: f64) {
    *range = Some(range.map_or((value, value), |(lo, hi)| (lo.min(value), hi.max(value))));
}

impl Summary {
    fn add(&mut self, record: &Record) {
        match self.records.iter_mut().find(|(kind, _)| *kind == record.kind) {
            Some((_, count)) => *count += 1,
            None => self.records.push((record.kind, 1)),
        }
        match record.kind {
            RecordKind::Data => {
                let start = self.time.map_or(record.time_d, |(start, _)| start);
                self.time = Some((start, record.time_d));
                widen(&mut self.lon, record.lon);
                widen(&mut self.lat, record.lat);
                self.distance += record.distance;
                let good = record.swath.bath.iter().filter(|b| b.flag.is_good());
                match good.map(|b| b.depth).minmax() {
                    MinMaxResult::NoElements => {}
                    MinMaxResult::OneElement(d) => widen(&mut self.depth, d),
                    MinMaxResult::MinMax(lo, hi) => {
                        widen(&mut self.depth, lo);
                        widen(&mut self.depth, hi);
                    }
                }
                for beam in &record.swath.bath {
                    let slot = match beam.flag {
                        BeamFlag::None => 0,
                        BeamFlag::Null => 2,
                        _ => 1,
                    };
                    self.beams[slot] += 1;
                }
            }
            RecordKind::Comment => self.comments.extend(record.comment.clone()),
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = |r: Option<(f64, f64)>| {
            r.map_or_else(|| "-".to_owned(), |(lo, hi)| format!("{lo:.6} to {hi:.6}"))
        };
        writeln!(
            f,
            "records:    {}",
            self.records
                .iter()
                .map(|(kind, count)| format!("{count} {kind}"))
                .join(", ")
        )?;
        writeln!(f, "skipped:    {}", self.skipped)?;
        writeln!(f, "unreadable: {}", self.unreadable)?;
        if let Some((start, end)) = self.time {
            writeln!(f, "start:      {}", format_time(start))?;
            writeln!(f, "end:        {}", format_time(end))?;
        }
        writeln!(f, "longitude:  {}", range(self.lon))?;
        writeln!(f, "latitude:   {}", range(self.lat))?;
        writeln!(f, "depth:      {}", range(self.depth))?;
        writeln!(f, "track:      {:.3} km", self.distance)?;
        let [good, flagged, empty] = self.beams;
        writeln!(f, "beams:      {good} good, {flagged} flagged, {empty} empty")?;
        for comment in &self.comments {
            writeln!(f, "comment:    {comment}")?;
        }
        Ok(())
    }
}

/// Reads every record of a file and summarizes it
#[instrument(skip(params))]
pub fn summarize(path: &Path, format: i32, params: ControlParams) -> Result<Summary> {
    let mut session = Session::open(path, format, params)?;
    let mut summary = Summary::default();
    loop {
        match session.get_all() {
            Ok(record) => summary.add(&record),
            Err(Error::EndOfFile) => break,
            Err(e) if e.is_skip() => {
                debug!("{e}");
                summary.skipped += 1;
            }
            Err(e) if e.is_stream_integrity() => {
                warn!("{e}");
                summary.unreadable += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
    session.close()?;
    Ok(summary)
}

/// Writes one navigation line per (averaged) ping, returns the number of lines
#[instrument(skip(params, out))]
pub fn list_navigation(
    path: &Path,
    format: i32,
    params: ControlParams,
    out: &mut dyn Write,
) -> Result<u64> {
    let mut session = Session::open(path, format, params)?;
    let mut lines = 0;
    loop {
        let record = match session.read() {
            Ok(record) if record.kind == RecordKind::Data => record,
            Ok(_) => continue,
            Err(Error::EndOfFile) => break,
            Err(e) if e.is_skip() || e.is_stream_integrity() => {
                debug!("{e}");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let line = [
            format_time(record.time_d),
            format!("{:.6}", record.lon),
            format!("{:.6}", record.lat),
            format!("{:.2}", record.heading),
            format!("{:.2}", record.speed),
        ]
        .iter()
        .join("\t");
        writeln!(out, "{line}")?;
        lines += 1;
    }
    session.close()?;
    info!("listed {lines} pings");
    Ok(lines)
}

/// Copies an XSE file, writing comment records ahead of its content
///
/// Returns the number of records written.
#[instrument(skip(texts))]
pub fn insert_comments(input: &Path, output: &Path, format: i32, texts: &[String]) -> Result<u64> {
    ensure!(
        lookup(format)?.family == SensorFamily::Xse,
        "comments can only be written to XSE files"
    );
    let mut source = Session::open(input, format, ControlParams::default())?;
    let mut sink = Session::create(output, format)?;

    for text in texts {
        sink.insert(&Record {
            kind: RecordKind::Comment,
            comment: Some(text.clone()),
            ..Record::default()
        })?;
        sink.write()?;
    }
    loop {
        match source.read_record() {
            Ok(_) => sink.write_store(source.store()?)?,
            Err(Error::EndOfFile) => break,
            Err(e) if e.is_stream_integrity() => warn!("dropping unreadable record: {e}"),
            Err(e) => return Err(e).with_context(|| format!("reading {}", input.display())),
        }
    }
    source.close()?;
    sink.close()?;
    let written = sink.counters().written;
    info!("wrote {written} records to {}", output.display());
    Ok(written)
}
