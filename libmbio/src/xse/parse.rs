use nom::{
    bytes::complete::take,
    error::{Error as NomError, ErrorKind},
    multi::count,
    number::complete::{le_f32, le_f64, le_i32},
    sequence::tuple,
    Err as NomErr, IResult,
};
use tracing::warn;

use crate::Error;

pub(super) type Parsed<'a, T> = IResult<&'a [u8], T>;

/// Element parser used by [`counted`]
pub(super) type Item<'a, T> = fn(&'a [u8]) -> Parsed<'a, T>;

/// An `i32` element count followed by that many `width` byte elements
///
/// Counts that are negative or larger than the remaining input fail
/// without allocating.
pub(super) fn counted<'a, T>(
    width: usize,
    item: Item<'a, T>,
) -> impl FnMut(&'a [u8]) -> Parsed<'a, Vec<T>> {
    move |input: &'a [u8]| {
        let (rest, n) = le_i32(input)?;
        let n = usize::try_from(n)
            .ok()
            .filter(|&n| n.checked_mul(width).is_some_and(|bytes| bytes <= rest.len()))
            .ok_or(NomErr::Failure(NomError::new(input, ErrorKind::Count)))?;
        count(item, n)(rest)
    }
}

/// An `i32` byte length followed by that many bytes of text
///
/// Returns the text up to the first NUL and the length of the field.
pub(super) fn text(input: &[u8]) -> Parsed<'_, (String, usize)> {
    let (rest, n) = le_i32(input)?;
    let n = usize::try_from(n).map_err(|_| NomErr::Failure(NomError::new(input, ErrorKind::Count)))?;
    let (rest, bytes) = take(n)(rest)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok((rest, (String::from_utf8_lossy(&bytes[..end]).into_owned(), n)))
}

pub(super) fn f64_pair(input: &[u8]) -> Parsed<'_, (f64, f64)> {
    tuple((le_f64, le_f64))(input)
}

pub(super) fn f32_array<const N: usize>(input: &[u8]) -> Parsed<'_, [f32; N]> {
    let mut values = [0.0; N];
    let mut rest = input;
    for value in &mut values {
        let (r, v) = le_f32(rest)?;
        *value = v;
        rest = r;
    }
    Ok((rest, values))
}

fn to_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Decodes a whole group payload with `parser`
///
/// The parser must consume the payload exactly, otherwise the group's
/// declared byte count is reported as inconsistent.
///
/// # Errors
///
/// [`Error::GroupSizeMismatch`] if the parser fails or leaves bytes over
pub(super) fn decode_group<'a, T>(
    frame_id: u32,
    group_id: u32,
    payload: &'a [u8],
    mut parser: impl FnMut(&'a [u8]) -> Parsed<'a, T>,
) -> Result<T, Error> {
    // the declared count includes the group id
    let declared = payload.len() + 4;
    let mismatch = |rest: &[u8]| {
        let err = Error::GroupSizeMismatch {
            frame_id,
            group_id,
            declared: to_count(declared),
            consumed: to_count(declared - rest.len()),
        };
        warn!("{err}");
        err
    };
    match parser(payload) {
        Ok(([], value)) => Ok(value),
        Ok((rest, _)) | Err(NomErr::Error(NomError { input: rest, .. }) | NomErr::Failure(NomError { input: rest, .. })) => {
            Err(mismatch(rest))
        }
        Err(NomErr::Incomplete(_)) => Err(mismatch(&[])),
    }
}

#[cfg(test)]
mod tests {
    use nom::number::complete::le_i16;

    use super::*;

    #[test]
    fn counted_rejects_oversized_counts() {
        let mut input = 1_000_000i32.to_le_bytes().to_vec();
        input.extend_from_slice(&[0; 8]);
        assert!(counted(8, le_f64)(&input).is_err());
        let mut input = (-1i32).to_le_bytes().to_vec();
        input.extend_from_slice(&[0; 2]);
        assert!(counted(2, le_i16)(&input).is_err());
    }

    #[test]
    fn text_stops_at_nul() {
        let mut input = 8i32.to_le_bytes().to_vec();
        input.extend_from_slice(b"abc\0\0\0\0\0");
        let (rest, (s, len)) = text(&input).unwrap();
        assert!(rest.is_empty());
        assert_eq!(s, "abc");
        assert_eq!(len, 8);
    }

    #[test]
    fn leftover_bytes_are_a_size_mismatch() {
        let payload = [0u8; 20];
        let err = decode_group(1, 4, &payload, f64_pair).unwrap_err();
        assert!(matches!(
            err,
            Error::GroupSizeMismatch {
                declared: 24,
                consumed: 20,
                ..
            }
        ));
    }
}
