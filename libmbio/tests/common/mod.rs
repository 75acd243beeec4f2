#![allow(dead_code)]

use libmbio::{
    coords::DTR,
    xse::{
        Beam, BeamArray, CommentFrame, FrameTime, MultibeamFrame, MultibeamGeneral, MultibeamNav,
        NavigationFrame, Position, XseFrame,
    },
};

/// 2001-09-09T01:46:40 UTC
pub const T0: f64 = 1_000_000_000.0;

pub const XSE: i32 = 94;

/// A ping with depths, quality codes and amplitudes for `beams` beams
///
/// Beam `i` sits at slot `i` after reordering; its depth is `100 + i`.
pub fn ping(time_d: f64, lon: f64, lat: f64, beams: usize) -> MultibeamFrame {
    let half = i32::try_from(beams / 2).unwrap();
    MultibeamFrame::builder()
        .source(1)
        .time(FrameTime::from_time_d(time_d))
        .general(MultibeamGeneral {
            ping: 1,
            frequency: 12_000.0,
            ..MultibeamGeneral::default()
        })
        .arrays(vec![
            BeamArray::Number,
            BeamArray::Quality,
            BeamArray::Amplitude,
            BeamArray::Lateral,
            BeamArray::Along,
            BeamArray::Depth,
        ])
        .beams(
            (0..beams)
                .map(|i| {
                    let offset = f64::from(i32::try_from(i).unwrap() - half);
                    Beam::builder()
                        .number(i16::try_from(beams - i).unwrap())
                        .quality(1)
                        .amplitude(i16::try_from(10 + i).unwrap())
                        .lateral(-25.0 * offset)
                        .along(0.5)
                        .depth(100.0 + f64::from(i32::try_from(i).unwrap()))
                        .build()
                })
                .collect(),
        )
        .nav(MultibeamNav {
            lon: DTR * lon,
            lat: DTR * lat,
            heading: DTR * 45.0,
            speed: 0.0,
        })
        .build()
}

pub fn ping_with_heading(time_d: f64, lon: f64, lat: f64, heading: f64) -> XseFrame {
    let mut frame = ping(time_d, lon, lat, 5);
    if let Some(nav) = frame.nav.as_mut() {
        nav.heading = DTR * heading;
    }
    XseFrame::Multibeam(frame)
}

pub fn survey(time_d: f64, lon: f64, lat: f64) -> XseFrame {
    XseFrame::Multibeam(ping(time_d, lon, lat, 5))
}

pub fn navigation(time_d: f64, lon: f64, lat: f64) -> XseFrame {
    XseFrame::Navigation(
        NavigationFrame::builder()
            .source(1)
            .time(FrameTime::from_time_d(time_d))
            .position(Position {
                description: "WGS-84".to_owned(),
                x: DTR * lon,
                y: DTR * lat,
                z: 0.0,
                ..Position::default()
            })
            .heading(DTR * 90.0)
            .build(),
    )
}

pub fn comment(text: &str) -> XseFrame {
    XseFrame::Comment(
        CommentFrame::builder()
            .source(1)
            .time(FrameTime::from_time_d(T0))
            .text(text)
            .build(),
    )
}

pub fn encode(frames: &[XseFrame]) -> Vec<u8> {
    let mut out = Vec::new();
    for frame in frames {
        frame.encode(&mut out).unwrap();
    }
    out
}
