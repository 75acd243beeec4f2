use std::io::Cursor;

mod common;
use common::{comment, encode, navigation, ping, survey, T0, XSE};
use libmbio::{
    xse::{
        frame::{split_frame, Groups},
        FrameTime, NavigationFrame, OtherFrame, RawGroup, XseFrame, MAX_BEAMS,
    },
    ControlParams, Error, RecordKind, Session,
};

fn frame_count(bytes: &[u8]) -> usize {
    u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize
}

#[test]
fn empty_and_full_pings_survive_a_round_trip() -> anyhow::Result<()> {
    for beams in [0, MAX_BEAMS] {
        let frame = XseFrame::Multibeam(ping(T0, -121.5, 36.8, beams));
        let bytes = encode(&[frame.clone()]);
        let (decoded, used) = XseFrame::decode(&bytes)?;
        assert_eq!(used, bytes.len());
        assert_eq!(encode(&[decoded.clone()]), bytes);
        let XseFrame::Multibeam(mut decoded) = decoded else {
            panic!("expected a ping");
        };
        // general, six beam arrays, navigation
        assert_eq!(decoded.layout, [1, 2, 4, 5, 7, 8, 9, 99]);
        decoded.layout.clear();
        assert_eq!(XseFrame::Multibeam(decoded), frame);
    }
    Ok(())
}

#[test]
fn byte_counts_cover_every_group() -> anyhow::Result<()> {
    let bytes = encode(&[XseFrame::Multibeam(ping(T0, 10.0, 54.0, 31))]);
    let (envelope, used) = split_frame(&bytes)?;
    assert_eq!(used, bytes.len());
    assert_eq!(frame_count(&bytes) + 12, bytes.len());

    let mut groups = 0;
    let mut expected = 16;
    for group in Groups::new(envelope.frame_id, envelope.body) {
        let (_, payload) = group?;
        // count, id and both markers
        expected += payload.len() + 16;
        groups += 1;
    }
    // general, six beam arrays, navigation
    assert_eq!(groups, 8);
    assert_eq!(expected, frame_count(&bytes));
    Ok(())
}

#[test]
fn oversized_pings_are_refused() {
    let frame = XseFrame::Multibeam(ping(T0, 0.0, 0.0, MAX_BEAMS + 1));
    let mut out = Vec::new();
    assert!(matches!(
        frame.encode(&mut out),
        Err(Error::BeamCapacity { count: 152, max: 151 })
    ));
}

#[test]
fn reading_resumes_after_a_damaged_frame() -> anyhow::Result<()> {
    let mut damaged = encode(&[survey(T0, 10.0, 54.0)]);
    // grow the first group's byte count past its end marker
    let count = u32::from_le_bytes(damaged[28..32].try_into()?);
    damaged[28..32].copy_from_slice(&(count + 4).to_le_bytes());

    let mut bytes = b"\0\0garbage".to_vec();
    bytes.extend(encode(&[survey(T0, 10.0, 54.0)]));
    bytes.extend(damaged);
    bytes.extend(encode(&[survey(T0 + 1.0, 10.0, 54.0)]));

    let mut session = Session::from_reader(Cursor::new(bytes), XSE, ControlParams::default())?;
    assert_eq!(session.get_all()?.time_d, T0);
    let err = session.get_all().unwrap_err();
    assert!(err.is_stream_integrity(), "{err}");
    assert!(!err.is_fatal());
    assert_eq!(session.get_all()?.time_d, T0 + 1.0);
    assert!(matches!(session.get_all(), Err(Error::EndOfFile)));
    Ok(())
}

#[test]
fn wrong_frame_counts_cost_only_their_own_frame() -> anyhow::Result<()> {
    for delta in [8i64, -8] {
        let mut damaged = encode(&[survey(T0, 10.0, 54.0)]);
        let count = i64::try_from(frame_count(&damaged))? + delta;
        damaged[4..8].copy_from_slice(&u32::try_from(count)?.to_le_bytes());

        let mut bytes = damaged;
        bytes.extend(encode(&[
            survey(T0 + 1.0, 10.0, 54.0),
            survey(T0 + 2.0, 10.0, 54.0),
        ]));

        let mut session = Session::from_reader(Cursor::new(bytes), XSE, ControlParams::default())?;
        let err = session.get_all().unwrap_err();
        assert!(
            matches!(err, Error::FrameTrailerMismatch { .. }),
            "count off by {delta}: {err}"
        );
        assert_eq!(session.get_all()?.time_d, T0 + 1.0);
        assert_eq!(session.get_all()?.time_d, T0 + 2.0);
        assert!(matches!(session.get_all(), Err(Error::EndOfFile)));
    }
    Ok(())
}

#[test]
fn short_frames_are_truncated_records() -> anyhow::Result<()> {
    let mut bytes = encode(&[comment("first"), comment("second")]);
    bytes.truncate(bytes.len() - 10);

    let mut session = Session::from_reader(Cursor::new(bytes), XSE, ControlParams::default())?;
    assert_eq!(session.get_all()?.comment.as_deref(), Some("first"));
    assert!(matches!(
        session.get_all(),
        Err(Error::TruncatedRecord { .. })
    ));
    assert!(matches!(session.get_all(), Err(Error::EndOfFile)));
    Ok(())
}

#[test]
fn uninterpreted_frames_and_groups_pass_through() -> anyhow::Result<()> {
    let mut group = Vec::new();
    group.extend_from_slice(b"$HSG");
    group.extend_from_slice(&8u32.to_le_bytes());
    group.extend_from_slice(&1u32.to_le_bytes());
    group.extend_from_slice(&[1, 2, 3, 4]);
    group.extend_from_slice(b"#HSG");
    let sidescan = XseFrame::Other(OtherFrame {
        frame_id: 5,
        source: 1,
        time: FrameTime::from_time_d(T0),
        body: group,
    });
    let nav = XseFrame::Navigation(
        NavigationFrame::builder()
            .source(2)
            .time(FrameTime::new(3_177_452_800, 500_000))
            .heading(1.5)
            .extra(vec![RawGroup {
                id: 77,
                payload: vec![9; 12],
            }])
            .build(),
    );
    let bytes = encode(&[sidescan, nav]);

    let mut offset = 0;
    let mut frames = Vec::new();
    while offset < bytes.len() {
        let (frame, used) = XseFrame::decode(&bytes[offset..])?;
        offset += used;
        frames.push(frame);
    }
    assert_eq!(frames[0].kind(), RecordKind::Other);
    let XseFrame::Navigation(decoded) = &frames[1] else {
        panic!("expected navigation, found {:?}", frames[1].kind());
    };
    assert_eq!(decoded.extra.len(), 1);
    assert!((decoded.time.time_d() - (T0 + 0.5)).abs() < 1e-6);
    assert_eq!(encode(&frames), bytes);
    Ok(())
}

#[test]
fn navigation_records_carry_their_fix() -> anyhow::Result<()> {
    let bytes = encode(&[navigation(T0, -70.5, 41.25)]);
    let mut session = Session::from_reader(Cursor::new(bytes), XSE, ControlParams::default())?;
    let record = session.get_all()?;
    assert_eq!(record.kind, RecordKind::Navigation);
    assert!((record.lon + 70.5).abs() < 1e-9);
    assert!((record.lat - 41.25).abs() < 1e-9);
    let nav = session.extract_nav()?;
    assert!((nav.heading - 90.0).abs() < 1e-9);
    assert!(matches!(
        session.ttimes(),
        Err(Error::WrongRecordKind { .. })
    ));
    Ok(())
}
