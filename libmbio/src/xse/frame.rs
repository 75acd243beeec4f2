//! Frame and group envelopes of the XSE stream
//!
//! A frame is laid out as
//!
//! ```text
//! "$HSF" count:u32 frame_id:u32 source:u32 sec:u32 usec:u32 group* "#HSF"
//! ```
//!
//! and a group as
//!
//! ```text
//! "$HSG" count:u32 group_id:u32 payload "#HSG"
//! ```
//!
//! All integers are little endian. A frame's `count` covers everything
//! between the count and the end marker; a group's `count` covers the
//! group id and the payload.

use std::io::{BufRead, ErrorKind, Read};

use nom::{
    bytes::complete::{tag, take},
    number::complete::le_u32,
    sequence::{preceded, terminated, tuple},
};
use tracing::{instrument, trace, warn};

use super::parse::Parsed;
use crate::Error;

/// Frame start marker
pub const FRAME_START: &[u8; 4] = b"$HSF";
/// Frame end marker
pub const FRAME_END: &[u8; 4] = b"#HSF";
/// Group start marker
pub const GROUP_START: &[u8; 4] = b"$HSG";
/// Group end marker
pub const GROUP_END: &[u8; 4] = b"#HSG";

/// Bytes of the frame header covered by the frame byte count
pub const FRAME_HEADER_LEN: usize = 16;

/// Size of a frame without groups, markers included
pub const MIN_FRAME_LEN: usize = 8 + FRAME_HEADER_LEN + 4;

/// Bytes scanned for an end marker before a frame is given up as corrupt,
/// unless its byte count asks for more
pub const MAX_FRAME_LEN: usize = 32_000;

/// Seconds from the XSE epoch (1901-01-01) to the unix epoch
pub const TIME_OFFSET: f64 = 2_177_452_800.0;

/// Frame time stamp in seconds and microseconds since 1901-01-01
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTime {
    /// Whole seconds since 1901-01-01T00:00:00
    pub sec: u32,
    /// Microseconds
    pub usec: u32,
}

impl FrameTime {
    /// Creates a time stamp from its raw parts
    #[must_use]
    pub const fn new(sec: u32, usec: u32) -> Self {
        Self { sec, usec }
    }

    /// Seconds since 1970-01-01T00:00:00
    #[must_use]
    pub fn time_d(self) -> f64 {
        f64::from(self.sec) - TIME_OFFSET + 1.0e-6 * f64::from(self.usec)
    }

    /// Builds the time stamp of an epoch time, saturating at the limits of the format
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_time_d(time_d: f64) -> Self {
        let total = (time_d + TIME_OFFSET).clamp(0.0, f64::from(u32::MAX));
        let mut sec = total.floor();
        let mut usec = ((total - sec) * 1.0e6).round();
        if usec >= 1.0e6 {
            sec += 1.0;
            usec = 0.0;
        }
        Self {
            sec: sec as u32,
            usec: usec as u32,
        }
    }
}

/// A group kept verbatim because its content is not interpreted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawGroup {
    /// Group id
    pub id: u32,
    /// Payload following the group id
    pub payload: Vec<u8>,
}

/// Header fields and group bytes of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Frame type id
    pub frame_id: u32,
    /// Data source id
    pub source: u32,
    /// Frame time stamp
    pub time: FrameTime,
    /// Concatenated groups
    pub body: &'a [u8],
}

fn count_to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Start marker, byte count, frame id, source, seconds and microseconds
fn frame_header(input: &[u8]) -> Parsed<'_, (u32, u32, u32, u32, u32)> {
    preceded(
        tag(FRAME_START.as_slice()),
        tuple((le_u32, le_u32, le_u32, le_u32, le_u32)),
    )(input)
}

/// Start marker, byte count and group id
fn group_header(input: &[u8]) -> Parsed<'_, (u32, u32)> {
    preceded(tag(GROUP_START.as_slice()), tuple((le_u32, le_u32)))(input)
}

/// `true` if `body` is a sequence of complete groups
fn whole_groups(frame_id: u32, body: &[u8]) -> bool {
    Groups::new(frame_id, body).all(|group| group.is_ok())
}

/// Offset of the end marker that closes the groups starting `body`
///
/// The first marker preceded by whole groups wins; failing that, the
/// first marker at all.
fn find_frame_end(frame_id: u32, body: &[u8]) -> Option<usize> {
    let mut markers = body
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == FRAME_END.as_slice())
        .map(|(at, _)| at)
        .peekable();
    let first = markers.peek().copied();
    markers
        .find(|&at| whole_groups(frame_id, &body[..at]))
        .or(first)
}

/// Splits one complete frame off the front of `input`
///
/// Returns the envelope and the number of bytes the frame occupies.
///
/// # Errors
///
/// - [`Error::FrameSyncLost`] if `input` does not begin with the start marker
/// - [`Error::TruncatedRecord`] if `input` ends before the frame does
/// - [`Error::CorruptRecord`] if the byte count cannot hold a frame header
/// - [`Error::FrameTrailerMismatch`] if the end marker is not where the
///   byte count puts it
pub fn split_frame(input: &[u8]) -> Result<(Envelope<'_>, usize), Error> {
    if input.get(..4).is_some_and(|marker| marker != FRAME_START) {
        return Err(Error::FrameSyncLost { skipped: 0 });
    }
    let Ok((after, (count, frame_id, source, sec, usec))) = frame_header(input) else {
        return Err(Error::TruncatedRecord {
            needed: 8 + FRAME_HEADER_LEN,
            available: input.len(),
        });
    };
    let declared = usize::try_from(count).map_err(|_| Error::OutOfMemory {
        requested: usize::MAX,
    })?;
    let Some(groups_len) = declared.checked_sub(FRAME_HEADER_LEN) else {
        return Err(Error::CorruptRecord(format!(
            "frame byte count {declared} is smaller than the frame header"
        )));
    };
    let total = declared
        .checked_add(12)
        .ok_or(Error::OutOfMemory { requested: declared })?;
    let parsed: Parsed<'_, &[u8]> =
        terminated(take(groups_len), tag(FRAME_END.as_slice()))(after);
    let Ok((_, body)) = parsed else {
        return Err(match find_frame_end(frame_id, after) {
            Some(at) => {
                let err = Error::FrameTrailerMismatch {
                    frame_id,
                    declared: count,
                    actual: count_to_u32(at + FRAME_HEADER_LEN),
                };
                warn!("{err}");
                err
            }
            None => Error::TruncatedRecord {
                needed: total,
                available: input.len(),
            },
        });
    };
    trace!("frame {frame_id} from source {source}, {declared} bytes");
    Ok((
        Envelope {
            frame_id,
            source,
            time: FrameTime::new(sec, usec),
            body,
        },
        total,
    ))
}

/// Iterator over the groups of a frame body
///
/// Yields `(group_id, payload)` pairs and stops after the first error.
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    frame_id: u32,
    rest: &'a [u8],
}

impl<'a> Groups<'a> {
    /// Iterates the groups in `body`, a frame body of type `frame_id`
    #[must_use]
    pub const fn new(frame_id: u32, body: &'a [u8]) -> Self {
        Self {
            frame_id,
            rest: body,
        }
    }

    fn mismatch(&self, group_id: u32, declared: usize) -> Error {
        // bytes up to the first end marker, counted like the declared count
        let consumed = self
            .rest
            .get(8..)
            .and_then(|after| after.windows(4).position(|w| w == GROUP_END))
            .unwrap_or_else(|| self.rest.len().saturating_sub(8));
        Error::GroupSizeMismatch {
            frame_id: self.frame_id,
            group_id,
            declared: count_to_u32(declared),
            consumed: count_to_u32(consumed),
        }
    }

    fn next_group(&mut self) -> Result<(u32, &'a [u8]), Error> {
        let Ok((after, (count, group_id))) = group_header(self.rest) else {
            return Err(Error::CorruptRecord(format!(
                "frame {}: expected a group start marker",
                self.frame_id
            )));
        };
        let declared = usize::try_from(count).unwrap_or(usize::MAX);
        let Some(payload_len) = declared.checked_sub(4) else {
            return Err(self.mismatch(group_id, declared));
        };
        let parsed: Parsed<'a, &'a [u8]> =
            terminated(take(payload_len), tag(GROUP_END.as_slice()))(after);
        let Ok((rest, payload)) = parsed else {
            return Err(self.mismatch(group_id, declared));
        };
        self.rest = rest;
        Ok((group_id, payload))
    }
}

impl<'a> Iterator for Groups<'a> {
    type Item = Result<(u32, &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let group = self.next_group();
        if group.is_err() {
            self.rest = &[];
        }
        Some(group)
    }
}

fn read_byte(reader: &mut dyn BufRead) -> Result<Option<u8>, Error> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Consumes bytes up to and including the next frame start marker
///
/// Returns the number of bytes skipped before the marker.
fn sync(reader: &mut dyn BufRead) -> Result<u64, Error> {
    let mut window = [0u8; 4];
    let mut filled = 0usize;
    let mut skipped = 0u64;
    loop {
        let Some(byte) = read_byte(reader)? else {
            let skipped = skipped + filled as u64;
            return Err(if skipped == 0 {
                Error::EndOfFile
            } else {
                Error::FrameSyncLost { skipped }
            });
        };
        if filled < 4 {
            window[filled] = byte;
            filled += 1;
        } else {
            window.rotate_left(1);
            window[3] = byte;
            skipped += 1;
        }
        if filled == 4 && &window == FRAME_START {
            return Ok(skipped);
        }
    }
}

/// Byte count of a frame, read from its first eight bytes, plus the markers
fn declared_total(head: &[u8]) -> Result<usize, Error> {
    let parsed: Parsed<'_, u32> = preceded(tag(FRAME_START.as_slice()), le_u32)(head);
    let Ok((_, count)) = parsed else {
        return Err(Error::CorruptRecord("frame byte count unreadable".to_owned()));
    };
    let count = usize::try_from(count).map_err(|_| Error::OutOfMemory {
        requested: usize::MAX,
    })?;
    if count < FRAME_HEADER_LEN {
        return Err(Error::CorruptRecord(format!(
            "frame byte count {count} is smaller than the frame header"
        )));
    }
    count
        .checked_add(12)
        .ok_or(Error::OutOfMemory { requested: count })
}

/// `true` once `frame` ends with an end marker that closes it
///
/// Past the declared size any end marker does. Before it, the marker
/// must follow whole groups, so marker bytes inside a payload are read
/// over.
fn frame_closed(frame: &[u8], total: usize) -> bool {
    if frame.len() < MIN_FRAME_LEN || !frame.ends_with(FRAME_END) {
        return false;
    }
    if frame.len() >= total {
        return true;
    }
    frame_header(frame).is_ok_and(|(after, (_, frame_id, ..))| {
        whole_groups(frame_id, &after[..after.len() - FRAME_END.len()])
    })
}

/// Reads the next complete frame from a stream, markers included
///
/// Bytes preceding the next start marker are skipped with a warning. The
/// frame runs up to its end marker rather than its byte count, which is
/// not always right; [`split_frame`] reports the disagreement.
///
/// # Errors
///
/// - [`Error::EndOfFile`] when the stream ends cleanly between frames
/// - [`Error::FrameSyncLost`] when the stream ends while scanning for a marker
/// - [`Error::CorruptRecord`] when the byte count cannot hold a frame header
///   or no end marker turns up within [`MAX_FRAME_LEN`] bytes
/// - [`Error::OutOfMemory`] when the frame cannot be buffered
/// - [`Error::TruncatedRecord`] when the stream ends inside the frame
#[instrument(skip(reader), level = "trace")]
pub fn read_frame(reader: &mut dyn BufRead) -> Result<Vec<u8>, Error> {
    let skipped = sync(reader)?;
    if skipped > 0 {
        warn!("skipped {skipped} bytes before the next frame start marker");
    }
    let mut frame = FRAME_START.to_vec();
    let mut total = None;
    loop {
        let Some(byte) = read_byte(reader)? else {
            return Err(Error::TruncatedRecord {
                needed: total.unwrap_or(MIN_FRAME_LEN).max(frame.len() + 1),
                available: frame.len(),
            });
        };
        frame.try_reserve(1).map_err(|_| Error::OutOfMemory {
            requested: frame.len() + 1,
        })?;
        frame.push(byte);
        match total {
            None if frame.len() == 8 => total = Some(declared_total(&frame)?),
            Some(total) if frame_closed(&frame, total) => return Ok(frame),
            Some(total) if frame.len() >= total.max(MAX_FRAME_LEN) => {
                return Err(Error::CorruptRecord(format!(
                    "no frame end marker within {} bytes",
                    frame.len()
                )));
            }
            _ => {}
        }
    }
}

/// Little endian encoding of a payload value
pub(crate) trait PutLe: Copy {
    fn put_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_put_le {
    ($($t:ty),*) => {
        $(impl PutLe for $t {
            fn put_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        })*
    };
}

impl_put_le!(u8, i16, i32, u32, f32, f64);

/// Writes one frame, back-patching the byte counts once the groups are known
pub(crate) struct FrameWriter<'a> {
    out: &'a mut Vec<u8>,
    start: usize,
}

fn patch_count(out: &mut [u8], marker_at: usize) -> Result<(), Error> {
    let count = out.len() - (marker_at + 8);
    let count = u32::try_from(count).map_err(|_| {
        Error::CorruptRecord(format!("{count} bytes do not fit a record byte count"))
    })?;
    if let Some(slot) = out.get_mut(marker_at + 4..marker_at + 8) {
        slot.copy_from_slice(&count.to_le_bytes());
    }
    Ok(())
}

impl<'a> FrameWriter<'a> {
    pub(crate) fn begin(out: &'a mut Vec<u8>, frame_id: u32, source: u32, time: FrameTime) -> Self {
        let start = out.len();
        out.extend_from_slice(FRAME_START);
        0u32.put_le(out);
        for value in [frame_id, source, time.sec, time.usec] {
            value.put_le(out);
        }
        Self { out, start }
    }

    pub(crate) fn group(
        &mut self,
        group_id: u32,
        payload: impl FnOnce(&mut Vec<u8>),
    ) -> Result<(), Error> {
        let at = self.out.len();
        self.out.extend_from_slice(GROUP_START);
        0u32.put_le(self.out);
        group_id.put_le(self.out);
        payload(self.out);
        patch_count(self.out, at)?;
        self.out.extend_from_slice(GROUP_END);
        Ok(())
    }

    /// Writes encoded `known` groups and `extra` groups in `layout` order
    ///
    /// Each layout entry takes the first unwritten group with its id.
    /// Groups the layout does not name follow, known groups first.
    pub(crate) fn ordered_groups(
        &mut self,
        layout: &[u32],
        known: Vec<(u32, Vec<u8>)>,
        extra: &[RawGroup],
    ) -> Result<(), Error> {
        let mut known: Vec<_> = known.into_iter().map(Some).collect();
        let mut extra: Vec<_> = extra.iter().map(Some).collect();
        for &id in layout {
            let group = known
                .iter_mut()
                .find(|group| group.as_ref().is_some_and(|(known_id, _)| *known_id == id))
                .and_then(Option::take);
            if let Some((id, payload)) = group {
                self.group(id, |out| out.extend_from_slice(&payload))?;
                continue;
            }
            let group = extra
                .iter_mut()
                .find(|group| group.is_some_and(|raw| raw.id == id))
                .and_then(Option::take);
            if let Some(raw) = group {
                self.group(raw.id, |out| out.extend_from_slice(&raw.payload))?;
            }
        }
        for (id, payload) in known.into_iter().flatten() {
            self.group(id, |out| out.extend_from_slice(&payload))?;
        }
        for raw in extra.into_iter().flatten() {
            self.group(raw.id, |out| out.extend_from_slice(&raw.payload))?;
        }
        Ok(())
    }

    /// Appends already encoded groups verbatim
    pub(crate) fn body(&mut self, body: &[u8]) {
        self.out.extend_from_slice(body);
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        patch_count(self.out, self.start)?;
        self.out.extend_from_slice(FRAME_END);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn frame_with(groups: &[(u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut frame = FrameWriter::begin(&mut out, 14, 0, FrameTime::new(10, 20));
        for (id, payload) in groups {
            frame.group(*id, |o| o.extend_from_slice(payload)).unwrap();
        }
        frame.finish().unwrap();
        out
    }

    #[test]
    fn byte_counts_are_backpatched() {
        let bytes = frame_with(&[(1, &[1, 2, 3, 4]), (2, &[])]);
        let (envelope, used) = split_frame(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        // 16 header bytes plus (count + 12) per group
        let (_, (count, ..)) = frame_header(&bytes).unwrap();
        assert_eq!(count, 16 + (8 + 12) + (4 + 12));
        let groups: Vec<_> = Groups::new(envelope.frame_id, envelope.body)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups, vec![(1, &[1u8, 2, 3, 4][..]), (2, &[][..])]);
    }

    #[test]
    fn time_carries_microseconds() {
        let t = FrameTime::from_time_d(-TIME_OFFSET + 5.999_999_9);
        assert_eq!(t, FrameTime::new(6, 0));
        let t = FrameTime::new(TIME_OFFSET as u32 + 1, 500_000);
        assert!((t.time_d() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn resync_skips_garbage() {
        let mut stream = b"junk".to_vec();
        stream.extend(frame_with(&[(1, &[0; 8])]));
        let mut reader = Cursor::new(stream);
        let frame = read_frame(&mut reader).unwrap();
        assert_eq!(&frame[..4], FRAME_START);
        assert!(matches!(read_frame(&mut reader), Err(Error::EndOfFile)));
    }

    #[test]
    fn trailing_garbage_loses_sync() {
        let mut reader = Cursor::new(b"garbage".to_vec());
        assert!(matches!(
            read_frame(&mut reader),
            Err(Error::FrameSyncLost { skipped: 7 })
        ));
    }

    fn with_count(mut bytes: Vec<u8>, delta: i64) -> Vec<u8> {
        let (_, (count, ..)) = frame_header(&bytes).unwrap();
        let count = u32::try_from(i64::from(count) + delta).unwrap();
        bytes[4..8].copy_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn wrong_frame_counts_stop_at_the_end_marker() {
        let good = frame_with(&[(1, &[7; 16])]);
        let next = frame_with(&[(2, &[])]);
        for delta in [8, -8] {
            let mut stream = with_count(good.clone(), delta);
            stream.extend_from_slice(&next);
            let mut reader = Cursor::new(stream);

            let frame = read_frame(&mut reader).unwrap();
            assert_eq!(frame.len(), good.len(), "count off by {delta}");
            // header plus one group of 16 payload bytes
            let declared = u32::try_from(48 + delta).unwrap();
            assert!(matches!(
                split_frame(&frame),
                Err(Error::FrameTrailerMismatch { frame_id: 14, declared: d, actual: 48 }) if d == declared
            ));
            assert_eq!(read_frame(&mut reader).unwrap(), next);
        }
    }

    #[test]
    fn end_marker_bytes_inside_a_payload_are_data() {
        let bytes = frame_with(&[(1, b"ab#HSFcd"), (2, &[1, 2, 3, 4])]);
        let mut stream = bytes.clone();
        stream.extend(frame_with(&[]));
        let mut reader = Cursor::new(stream);
        assert_eq!(read_frame(&mut reader).unwrap(), bytes);
        let (envelope, used) = split_frame(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(Groups::new(envelope.frame_id, envelope.body).count(), 2);
        assert_eq!(read_frame(&mut reader).unwrap().len(), MIN_FRAME_LEN);
    }

    #[test]
    fn missing_end_marker_is_corrupt() {
        let mut stream = frame_with(&[]);
        stream.truncate(MIN_FRAME_LEN - 4);
        stream.resize(MAX_FRAME_LEN + 10, 0);
        let mut reader = Cursor::new(stream);
        assert!(matches!(
            read_frame(&mut reader),
            Err(Error::CorruptRecord(_))
        ));
    }

    #[test]
    fn overlong_group_is_reported() {
        let mut bytes = frame_with(&[(3, &[0; 8])]);
        // declare 20 bytes for a group holding 12
        bytes[28..32].copy_from_slice(&20u32.to_le_bytes());
        let (envelope, _) = split_frame(&bytes).unwrap();
        let err = Groups::new(envelope.frame_id, envelope.body)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::GroupSizeMismatch {
                group_id: 3,
                declared: 20,
                consumed: 12,
                ..
            }
        ));
    }
}
