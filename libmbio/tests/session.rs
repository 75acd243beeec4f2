use std::io::Cursor;

mod common;
use common::{comment, encode, navigation, ping, ping_with_heading, survey, T0, XSE};
use libmbio::{
    codec::{BeamFlag, Store},
    session::SessionState,
    xse::XseFrame,
    ControlParams, Error, RecordKind, Session,
};
use mktemp::Temp;

fn reader(frames: &[XseFrame], params: ControlParams) -> anyhow::Result<Session> {
    Ok(Session::from_reader(
        Cursor::new(encode(frames)),
        XSE,
        params,
    )?)
}

fn near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

#[test]
fn filters_reject_pings_without_stopping_the_stream() -> anyhow::Result<()> {
    let params = ControlParams::builder()
        .bounds([-123.0, -121.0, 36.0, 37.5])
        .btime(T0)
        .etime(T0 + 100.0)
        .build();
    let mut session = reader(
        &[
            survey(T0 + 1.0, -122.0, 36.5),
            survey(T0 + 2.0, -100.0, 36.5),
            survey(T0 + 3.0, -122.0, 36.6),
            survey(T0 + 500.0, -122.0, 36.6),
            survey(T0 + 50.0, -122.0, 36.7),
        ],
        params,
    )?;

    let first = session.get_all()?;
    assert!(near(first.time_d, T0 + 1.0, 1e-6));
    assert_eq!(first.distance, 0.0);
    assert!(matches!(
        session.get_all(),
        Err(Error::OutOfBounds { .. })
    ));
    let third = session.get_all()?;
    // a tenth of a degree of latitude
    assert!(near(third.distance, 11.1, 0.1), "{}", third.distance);
    assert!(third.speed > 0.0);
    let err = session.get_all().unwrap_err();
    assert!(matches!(err, Error::OutOfTimeWindow { .. }));
    assert!(err.is_skip());
    assert!(near(session.get_all()?.lat, 36.7, 1e-9));
    assert!(matches!(session.get_all(), Err(Error::EndOfFile)));

    let counters = session.counters();
    assert_eq!(counters.pings, 5);
    assert_eq!(counters.records, 5);
    assert_eq!(session.state(), SessionState::Reading);
    Ok(())
}

#[test]
fn time_gaps_are_reported_once() -> anyhow::Result<()> {
    let mut session = reader(
        &[
            survey(T0, 5.0, 54.0),
            survey(T0 + 10.0, 5.0, 54.0),
            survey(T0 + 200.0, 5.0, 54.0),
            survey(T0 + 210.0, 5.0, 54.0),
        ],
        ControlParams::default(),
    )?;
    session.get_all()?;
    session.get_all()?;
    let Err(Error::TimeGap { gap }) = session.get_all() else {
        panic!("expected a time gap");
    };
    assert!(near(gap, 190.0, 1e-6));
    assert!(near(session.get_all()?.time_d, T0 + 200.0, 1e-6));
    assert!(near(session.get_all()?.time_d, T0 + 210.0, 1e-6));
    assert!(matches!(session.get_all(), Err(Error::EndOfFile)));
    Ok(())
}

#[test]
fn stationary_pings_are_too_slow() -> anyhow::Result<()> {
    let params = ControlParams::builder().speedmin(5.0).build();
    let mut session = reader(
        &[
            survey(T0, 5.0, 54.0),
            survey(T0 + 10.0, 5.0, 54.0),
            survey(T0 + 20.0, 5.0, 54.01),
        ],
        params,
    )?;
    // nothing to compare the first ping with
    session.get_all()?;
    let Err(Error::SpeedTooSmall { speed }) = session.get_all() else {
        panic!("expected a stationary ping to be rejected");
    };
    assert_eq!(speed, 0.0);
    // about 1.1 km in 10 s
    let moving = session.get_all()?;
    assert!(near(moving.speed, 400.0, 10.0), "{}", moving.speed);
    Ok(())
}

#[test]
fn pings_are_averaged_in_bins() -> anyhow::Result<()> {
    let params = ControlParams::builder().pings(2).build();
    let mut session = reader(
        &[
            ping_with_heading(T0, -122.0, 36.0, 350.0),
            ping_with_heading(T0 + 1.0, -122.2, 36.2, 10.0),
            comment("turning"),
            ping_with_heading(T0 + 2.0, -122.0, 36.0, 20.0),
            navigation(T0 + 2.5, -122.0, 36.0),
            ping_with_heading(T0 + 3.0, -122.0, 36.0, 40.0),
            ping_with_heading(T0 + 4.0, -122.0, 36.0, 50.0),
        ],
        params,
    )?;

    let first = session.read()?;
    assert_eq!(first.kind, RecordKind::Data);
    assert!(near(first.time_d, T0 + 0.5, 1e-6));
    assert!(near(first.lon, -122.1, 1e-9));
    assert!(near(first.lat, 36.1, 1e-9));
    assert!(first.heading.min(360.0 - first.heading) < 1e-6, "{}", first.heading);
    assert_eq!(first.swath.bath.len(), 5);
    assert!(near(first.swath.bath[0].depth, 100.0, 1e-9));
    assert!(near(first.swath.amp[4], 14.0, 1e-9));

    let note = session.read()?;
    assert_eq!(note.kind, RecordKind::Comment);
    assert_eq!(note.comment.as_deref(), Some("turning"));

    let second = session.read()?;
    assert!(near(second.heading, 30.0, 1e-6));
    assert!(near(second.time_d, T0 + 2.5, 1e-6));

    // the stream ends before the bin is full
    let last = session.read()?;
    assert!(near(last.heading, 50.0, 1e-6));
    assert!(matches!(session.read(), Err(Error::EndOfFile)));
    Ok(())
}

#[test]
fn comments_close_a_partial_bin() -> anyhow::Result<()> {
    let params = ControlParams::builder().pings(2).build();
    let mut session = reader(
        &[
            survey(T0, 0.0, 0.0),
            comment("line 2"),
            survey(T0 + 1.0, 0.0, 0.0),
            survey(T0 + 2.0, 0.0, 0.0),
        ],
        params,
    )?;
    assert!(near(session.read()?.time_d, T0, 1e-6));
    assert_eq!(session.read()?.kind, RecordKind::Comment);
    assert!(near(session.read()?.time_d, T0 + 1.5, 1e-6));
    Ok(())
}

#[test]
fn averages_use_good_beams_only() -> anyhow::Result<()> {
    let mut flagged = ping(T0, 0.0, 0.0, 5);
    flagged.beams[0].quality = 7;
    flagged.beams[0].depth = 999.0;
    flagged.beams[1].quality = 8;
    let mut also_flagged = ping(T0 + 1.0, 0.0, 0.0, 5);
    also_flagged.beams[1].quality = 8;

    let params = ControlParams::builder().pings(2).build();
    let mut session = reader(
        &[
            XseFrame::Multibeam(flagged),
            XseFrame::Multibeam(also_flagged),
        ],
        params,
    )?;
    let averaged = session.read()?;
    assert!(near(averaged.swath.bath[0].depth, 100.0, 1e-9));
    assert_eq!(averaged.swath.bath[0].flag, BeamFlag::None);
    assert_eq!(averaged.swath.bath[1].flag, BeamFlag::Null);
    Ok(())
}

#[test]
fn files_written_are_read_back_unchanged() -> anyhow::Result<()> {
    let frames = [
        comment("survey line 1"),
        navigation(T0, -70.0, 41.0),
        survey(T0 + 1.0, -70.0, 41.0),
    ];
    let first = Temp::new_file()?;
    let mut output = Session::create(&first, XSE)?;
    for frame in &frames {
        let Store::Xse(store) = output.store_mut()? else {
            unreachable!("format 94 uses XSE storage");
        };
        store.push(frame.clone());
        output.write()?;
    }
    output.close()?;
    assert_eq!(output.counters().written, 3);
    assert_eq!(std::fs::read(&first)?, encode(&frames));

    let second = Temp::new_file()?;
    let mut input = Session::open(&first, XSE, ControlParams::default())?;
    let mut output = Session::create(&second, XSE)?;
    loop {
        match input.read_record() {
            Ok(_) => output.write_store(input.store()?)?,
            Err(Error::EndOfFile) => break,
            Err(e) => return Err(e.into()),
        }
    }
    output.close()?;
    assert_eq!(std::fs::read(&second)?, std::fs::read(&first)?);
    Ok(())
}

#[test]
fn edited_flags_survive_a_rewrite() -> anyhow::Result<()> {
    let mut input = reader(&[survey(T0, 8.0, 54.0)], ControlParams::default())?;
    let mut record = input.get_all()?;
    record.swath.bath[1].flag = BeamFlag::Manual;
    input.insert(&record)?;

    let altitude = input.extract_altitude()?;
    assert!(near(altitude.altitude, 102.0, 1e-9));
    assert!(matches!(input.ttimes(), Err(Error::NotEnoughData(_))));

    let copy = Temp::new_file()?;
    let mut output = Session::create(&copy, XSE)?;
    output.write_store(input.store()?)?;
    output.close()?;

    let mut reread = Session::open(&copy, XSE, ControlParams::default())?;
    let edited = reread.get_all()?;
    assert_eq!(edited.swath.bath[1].flag, BeamFlag::Manual);
    assert_eq!(edited.swath.bath[0].flag, BeamFlag::None);
    assert!(near(edited.swath.bath[1].depth, 101.0, 1e-9));
    Ok(())
}

#[test]
fn closed_sessions_refuse_every_call() -> anyhow::Result<()> {
    let mut session = reader(&[survey(T0, 0.0, 0.0)], ControlParams::default())?;
    session.close()?;
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(session.read(), Err(Error::BadUsage { .. })));
    assert!(matches!(session.get_all(), Err(Error::BadUsage { .. })));
    assert!(matches!(session.extract_nav(), Err(Error::BadUsage { .. })));
    assert!(matches!(session.write(), Err(Error::BadUsage { .. })));
    session.close()?;

    let mut writer = Session::from_writer(Vec::new(), XSE)?;
    assert!(matches!(
        writer.read_record(),
        Err(Error::BadUsage { operation: "read", state: "open" })
    ));
    Ok(())
}

#[test]
fn opening_checks_format_parameters_and_path() {
    assert!(matches!(
        Session::open("missing.mb94", 100_000, ControlParams::default()),
        Err(Error::BadFormat(100_000))
    ));
    assert!(matches!(
        Session::open("/nonexistent/dir/line.mb94", XSE, ControlParams::default()),
        Err(Error::OpenFailed { .. })
    ));
    assert!(matches!(
        Session::from_reader(
            Cursor::new(Vec::new()),
            XSE,
            ControlParams::builder().pings(0).build()
        ),
        Err(Error::BadParameter(_))
    ));
}

#[test]
fn families_without_a_codec_are_unsupported() -> anyhow::Result<()> {
    let mut session = Session::from_reader(
        Cursor::new(vec![0u8; 64]),
        41,
        ControlParams::default(),
    )?;
    assert!(matches!(
        session.read_record(),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        session.extract_nav(),
        Err(Error::Unsupported { .. })
    ));
    assert_eq!(session.format().name, "SB2100RW");
    Ok(())
}
