//! Translation between XSE frames and the format independent record views

use tracing::{debug, warn};

use super::{
    frame::FrameTime,
    store::{BeamArray, CommentFrame, MultibeamFrame, MultibeamNav, Position, ShipParameter, XseStore},
    MAX_DEPTH, MAX_SVP,
};
use crate::{
    codec::{
        Altitude, BeamFlag, Navigation, Record, RecordKind, Sounding, Swath, TravelTimes,
        VelocityProfile,
    },
    coords::{rollpitch_to_takeoff, DTR, RTD},
    Error,
};

/// Converts m/s to km/hr
const MS_TO_KMH: f64 = 3.6;

/// Sound speed assumed when depths are computed from travel times
const NOMINAL_SOUND_SPEED: f64 = 1500.0;

/// Quality codes written for edited beams
mod quality {
    pub const GOOD: u8 = 1;
    pub const SONAR: u8 = 7;
    pub const NULL: u8 = 8;
    pub const MANUAL: u8 = 10;
    pub const FILTER: u8 = 20;
}

fn current_kind(store: &XseStore) -> Result<RecordKind, Error> {
    store
        .kind()
        .ok_or(Error::NotEnoughData("no record has been read"))
}

const fn flag_from_quality(q: u8) -> BeamFlag {
    match q {
        quality::GOOD => BeamFlag::None,
        2..=7 => BeamFlag::Sonar,
        quality::MANUAL => BeamFlag::Manual,
        quality::FILTER => BeamFlag::Filter,
        _ => BeamFlag::Null,
    }
}

const fn quality_from_flag(flag: BeamFlag, previous: u8) -> u8 {
    match flag {
        BeamFlag::None => quality::GOOD,
        BeamFlag::Null => quality::NULL,
        BeamFlag::Manual => quality::MANUAL,
        BeamFlag::Filter => quality::FILTER,
        BeamFlag::Sonar if previous == quality::GOOD => quality::SONAR,
        BeamFlag::Sonar => previous,
    }
}

/// `-1` when lateral distances grow with the beam index, `+1` otherwise
fn across_sign(frame: &MultibeamFrame) -> f64 {
    let (mut min, mut max) = ((0usize, 0.0f64), (0usize, 0.0f64));
    for (i, beam) in frame.beams.iter().enumerate() {
        if beam.lateral < min.1 {
            min = (i, beam.lateral);
        }
        if beam.lateral > max.1 {
            max = (i, beam.lateral);
        }
    }
    if max.0 > min.0 {
        -1.0
    } else {
        1.0
    }
}

/// Port to starboard slot of a beam number
fn slot(beam_count: usize, number: i16) -> Option<usize> {
    let count = i32::try_from(beam_count).ok()?;
    usize::try_from(count - i32::from(number))
        .ok()
        .filter(|&j| j < beam_count)
}

/// Depth, lateral and alongtrack distance of every beam
///
/// Pings carrying travel times and attitude but no depths are raytraced
/// with a constant sound speed. Returns [`None`] when neither is possible.
fn geometry(store: &XseStore) -> Result<Option<Vec<(f64, f64, f64)>>, Error> {
    let frame = &store.multibeam;
    let soundings: Vec<_> = if frame.has(BeamArray::Depth) {
        frame
            .beams
            .iter()
            .map(|b| (b.depth, b.lateral, b.along))
            .collect()
    } else if [
        BeamArray::TravelTime,
        BeamArray::Angle,
        BeamArray::Heave,
        BeamArray::Roll,
        BeamArray::Pitch,
    ]
    .into_iter()
    .all(|a| frame.has(a))
    {
        let speed = ground_speed(store);
        frame
            .beams
            .iter()
            .map(|b| {
                let (theta, phi) = rollpitch_to_takeoff(RTD * b.pitch, 90.0 - RTD * b.angle);
                // one way range
                let range = NOMINAL_SOUND_SPEED * b.travel_time / 2.0;
                let (sin_theta, cos_theta) = (DTR * theta).sin_cos();
                let (sin_phi, cos_phi) = (DTR * phi).sin_cos();
                let xx = range * sin_theta;
                (
                    range * cos_theta,
                    xx * cos_phi,
                    xx * sin_phi + 0.5 * speed * b.delay,
                )
            })
            .collect()
    } else {
        return Ok(None);
    };
    if let Some((depth, ..)) = soundings.iter().find(|(d, ..)| d.abs() > MAX_DEPTH) {
        return Err(Error::CorruptRecord(format!(
            "depth {depth} m is beyond full ocean depth"
        )));
    }
    Ok(Some(soundings))
}

fn ground_speed(store: &XseStore) -> f64 {
    store
        .navigation
        .motion_ground
        .map_or(0.0, |m| m.speed)
}

fn nav_heading(store: &XseStore) -> f64 {
    let nav = &store.navigation;
    nav.heading
        .or(nav.motion_ground.map(|m| m.course))
        .or(nav.motion_water.map(|m| m.course))
        .map_or(0.0, |h| RTD * h)
}

fn nav_speed(store: &XseStore) -> f64 {
    let nav = &store.navigation;
    nav.log
        .or(nav.motion_ground.map(|m| m.speed))
        .or(nav.motion_water.map(|m| m.speed))
        .map_or(0.0, |s| MS_TO_KMH * s)
}

/// Attitude of the center beam, `(heave, roll, pitch)`
fn center_attitude(frame: &MultibeamFrame) -> Option<(f64, f64, f64)> {
    let has_all = [BeamArray::Heave, BeamArray::Roll, BeamArray::Pitch]
        .into_iter()
        .all(|a| frame.has(a));
    if !has_all {
        return None;
    }
    frame
        .beams
        .get(frame.beams.len() / 2)
        .map(|b| (b.heave, RTD * b.roll, RTD * b.pitch))
}

fn nav_attitude(store: &XseStore) -> Option<(f64, f64, f64)> {
    let nav = &store.navigation;
    if nav.heave.is_none() && nav.roll.is_none() && nav.pitch.is_none() {
        return None;
    }
    Some((
        nav.heave.unwrap_or_default(),
        RTD * nav.roll.unwrap_or_default(),
        RTD * nav.pitch.unwrap_or_default(),
    ))
}

pub(super) fn extract(store: &XseStore) -> Result<Record, Error> {
    let kind = current_kind(store)?;
    let mut record = Record {
        kind,
        ..Record::default()
    };
    match kind {
        RecordKind::Data => {
            let frame = &store.multibeam;
            record.time_d = frame.time.time_d();
            let nav = frame.nav.unwrap_or_default();
            record.lon = RTD * nav.lon;
            record.lat = RTD * nav.lat;
            record.heading = RTD * nav.heading;
            record.speed = MS_TO_KMH * nav.speed;
            record.swath = swath(store)?;
        }
        RecordKind::Navigation => {
            let nav = &store.navigation;
            record.time_d = nav.time.time_d();
            let position = nav.position.clone().unwrap_or_default();
            record.lon = RTD * position.x;
            record.lat = RTD * position.y;
            record.heading = nav_heading(store);
            record.speed = nav_speed(store);
        }
        RecordKind::Comment => {
            record.time_d = store.comment.time.time_d();
            record.comment = Some(store.comment.text.clone());
        }
        RecordKind::VelocityProfile => record.time_d = store.svp.time.time_d(),
        RecordKind::Parameter => record.time_d = store.ship.time.time_d(),
        RecordKind::Other => record.time_d = store.other.time.time_d(),
    }
    Ok(record)
}

fn swath(store: &XseStore) -> Result<Swath, Error> {
    let frame = &store.multibeam;
    let n = frame.beams.len();
    let Some(geometry) = geometry(store)? else {
        debug!("ping carries neither depths nor travel times");
        return Ok(Swath::default());
    };
    let dsign = across_sign(frame);
    let mut bath = vec![
        Sounding {
            flag: BeamFlag::Null,
            ..Sounding::default()
        };
        n
    ];
    let with_amp = frame.has(BeamArray::Amplitude);
    let mut amp = if with_amp { vec![0.0; n] } else { Vec::new() };
    for (beam, (depth, lateral, along)) in frame.beams.iter().zip(geometry) {
        let Some(j) = slot(n, beam.number) else {
            warn!("beam number {} outside a {n} beam ping", beam.number);
            continue;
        };
        bath[j] = Sounding {
            flag: flag_from_quality(beam.quality),
            depth,
            acrosstrack: dsign * lateral,
            alongtrack: along,
        };
        if with_amp {
            amp[j] = f64::from(beam.amplitude);
        }
    }
    Ok(Swath {
        bath,
        amp,
        ss: Vec::new(),
    })
}

pub(super) fn insert(store: &mut XseStore, record: &Record) -> Result<(), Error> {
    match record.kind {
        RecordKind::Data => {
            let current = current_kind(store)?;
            if current != RecordKind::Data {
                return Err(Error::WrongRecordKind {
                    operation: "insert",
                    kind: current,
                });
            }
            insert_ping(&mut store.multibeam, record);
        }
        RecordKind::Navigation => {
            let nav = &mut store.navigation;
            nav.time = FrameTime::from_time_d(record.time_d);
            let position = nav.position.get_or_insert_with(Position::default);
            position.x = DTR * record.lon;
            position.y = DTR * record.lat;
            nav.heading = Some(DTR * record.heading);
            nav.log = Some(record.speed / MS_TO_KMH);
            store.set_kind(RecordKind::Navigation);
        }
        RecordKind::Comment => {
            let mut comment = CommentFrame {
                time: FrameTime::from_time_d(record.time_d),
                text: record.comment.clone().unwrap_or_default(),
                ..CommentFrame::default()
            };
            comment.truncate();
            store.comment = comment;
            store.set_kind(RecordKind::Comment);
        }
        kind => {
            return Err(Error::WrongRecordKind {
                operation: "insert",
                kind,
            })
        }
    }
    Ok(())
}

fn insert_ping(frame: &mut MultibeamFrame, record: &Record) {
    frame.time = FrameTime::from_time_d(record.time_d);
    frame.nav = Some(MultibeamNav {
        lon: DTR * record.lon,
        lat: DTR * record.lat,
        heading: DTR * record.heading,
        speed: record.speed / MS_TO_KMH,
    });
    let dsign = across_sign(frame);
    let n = frame.beams.len();
    let bath = &record.swath.bath;
    let amp = &record.swath.amp;
    for beam in &mut frame.beams {
        let Some(j) = slot(n, beam.number) else {
            continue;
        };
        if let Some(sounding) = bath.get(j) {
            beam.quality = quality_from_flag(sounding.flag, beam.quality);
            beam.depth = sounding.depth;
            beam.lateral = dsign * sounding.acrosstrack;
            beam.along = sounding.alongtrack;
        }
        if let Some(&value) = amp.get(j) {
            #[allow(clippy::cast_possible_truncation)]
            let value = value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
            beam.amplitude = value;
        }
    }
    if !bath.is_empty() {
        for array in [
            BeamArray::Quality,
            BeamArray::Lateral,
            BeamArray::Along,
            BeamArray::Depth,
        ] {
            frame.add_array(array);
        }
    }
    if !amp.is_empty() {
        frame.add_array(BeamArray::Amplitude);
    }
}

pub(super) fn extract_nav(store: &XseStore) -> Result<Navigation, Error> {
    let kind = current_kind(store)?;
    let draft = store.draft();
    let center = center_attitude(&store.multibeam);
    let nav_attitude = nav_attitude(store);
    match kind {
        RecordKind::Data => {
            let frame = &store.multibeam;
            let nav = frame.nav.unwrap_or_default();
            let (heave, roll, pitch) = center.or(nav_attitude).unwrap_or_default();
            Ok(Navigation {
                time_d: frame.time.time_d(),
                lon: RTD * nav.lon,
                lat: RTD * nav.lat,
                speed: MS_TO_KMH * nav.speed,
                heading: RTD * nav.heading,
                draft,
                roll,
                pitch,
                heave,
            })
        }
        RecordKind::Navigation => {
            let nav = &store.navigation;
            let position = nav.position.clone().unwrap_or_default();
            let (heave, roll, pitch) = nav_attitude.or(center).unwrap_or_default();
            Ok(Navigation {
                time_d: nav.time.time_d(),
                lon: RTD * position.x,
                lat: RTD * position.y,
                speed: nav_speed(store),
                heading: nav_heading(store),
                draft,
                roll,
                pitch,
                heave,
            })
        }
        kind => Err(Error::WrongRecordKind {
            operation: "extract_nav",
            kind,
        }),
    }
}

pub(super) fn insert_nav(store: &mut XseStore, nav: &Navigation) -> Result<(), Error> {
    let kind = current_kind(store)?;
    match kind {
        RecordKind::Data => {
            let frame = &mut store.multibeam;
            frame.time = FrameTime::from_time_d(nav.time_d);
            frame.nav = Some(MultibeamNav {
                lon: DTR * nav.lon,
                lat: DTR * nav.lat,
                heading: DTR * nav.heading,
                speed: nav.speed / MS_TO_KMH,
            });
        }
        RecordKind::Navigation => {
            let frame = &mut store.navigation;
            frame.time = FrameTime::from_time_d(nav.time_d);
            let position = frame.position.get_or_insert_with(Position::default);
            position.x = DTR * nav.lon;
            position.y = DTR * nav.lat;
            frame.heading = Some(DTR * nav.heading);
            frame.log = Some(nav.speed / MS_TO_KMH);
        }
        kind => {
            return Err(Error::WrongRecordKind {
                operation: "insert_nav",
                kind,
            })
        }
    }
    #[allow(clippy::cast_possible_truncation)]
    let draft = nav.draft as f32;
    match store.ship.parameter.as_mut() {
        Some(ShipParameter {
            trans_z_port,
            trans_z_stbd,
            ..
        }) => {
            *trans_z_port = draft;
            *trans_z_stbd = draft;
        }
        None => store.ship_draft = nav.draft,
    }
    Ok(())
}

pub(super) fn extract_altitude(store: &XseStore) -> Result<Altitude, Error> {
    let kind = current_kind(store)?;
    if kind != RecordKind::Data {
        return Err(Error::WrongRecordKind {
            operation: "extract_altitude",
            kind,
        });
    }
    let frame = &store.multibeam;
    let center = frame
        .beams
        .get(frame.beams.len() / 2)
        .ok_or(Error::NotEnoughData("ping has no beams"))?;
    let transducer_depth = store.draft() - center.heave;

    let nearest = |accept: fn(u8) -> bool| {
        frame
            .beams
            .iter()
            .filter(|b| accept(b.quality))
            .min_by(|a, b| a.lateral.abs().total_cmp(&b.lateral.abs()))
            .map(|b| b.depth)
    };
    let mut bath_best = if center.quality == quality::GOOD {
        center.depth
    } else {
        nearest(|q| q == quality::GOOD).unwrap_or_default()
    };
    if bath_best <= 0.0 {
        bath_best = nearest(|q| q < quality::NULL).unwrap_or_default();
    }
    Ok(Altitude {
        transducer_depth,
        altitude: bath_best - transducer_depth,
    })
}

pub(super) fn ttimes(store: &XseStore) -> Result<TravelTimes, Error> {
    let kind = current_kind(store)?;
    if kind != RecordKind::Data {
        return Err(Error::WrongRecordKind {
            operation: "ttimes",
            kind,
        });
    }
    let frame = &store.multibeam;
    if !(frame.has(BeamArray::TravelTime) && frame.has(BeamArray::Angle)) {
        return Err(Error::NotEnoughData("ping has no travel times or beam angles"));
    }
    let n = frame.beams.len();
    let dsign = across_sign(frame);
    let speed = ground_speed(store);
    let parameter = store.ship.parameter;
    let frequency = frame.general.map_or(0.0, |g| f64::from(g.frequency));
    let mut tt = TravelTimes {
        ttimes: vec![0.0; n],
        angles: vec![0.0; n],
        angles_forward: vec![0.0; n],
        angles_null: vec![0.0; n],
        heave: vec![0.0; n],
        alongtrack_offset: vec![0.0; n],
        flags: vec![BeamFlag::Null; n],
        draft: store.draft(),
        ssv: store.svp.ssv.unwrap_or_default(),
    };
    for beam in &frame.beams {
        let Some(j) = slot(n, beam.number) else {
            warn!("beam number {} outside a {n} beam ping", beam.number);
            continue;
        };
        let beta = 90.0 - dsign * RTD * beam.angle;
        let alpha = RTD * beam.pitch;
        let (theta, phi) = rollpitch_to_takeoff(alpha, beta);
        tt.ttimes[j] = beam.travel_time;
        tt.angles[j] = theta;
        tt.angles_forward[j] = phi;
        // flat faced arrays only, the curved low frequency arrays report 0
        if frequency >= 50_000.0 || frequency <= 0.0 {
            let error = parameter.map_or(0.0, |p| {
                f64::from(if beam.angle < 0.0 {
                    p.trans_err_port
                } else {
                    p.trans_err_stbd
                })
            });
            tt.angles_null[j] = 37.5 + RTD * error;
        }
        tt.heave[j] = beam.heave;
        tt.alongtrack_offset[j] = 0.5 * speed * beam.delay;
        tt.flags[j] = flag_from_quality(beam.quality);
    }
    Ok(tt)
}

pub(super) fn extract_svp(store: &XseStore) -> Result<VelocityProfile, Error> {
    let kind = current_kind(store)?;
    if kind != RecordKind::VelocityProfile {
        return Err(Error::WrongRecordKind {
            operation: "extract_svp",
            kind,
        });
    }
    let svp = &store.svp;
    let (Some(depth), Some(velocity)) = (&svp.depth, &svp.velocity) else {
        return Err(Error::NotEnoughData("profile has no depth or velocity samples"));
    };
    let n = depth.len().min(velocity.len());
    Ok(VelocityProfile {
        depth: depth[..n].to_vec(),
        velocity: velocity[..n].to_vec(),
    })
}

pub(super) fn insert_svp(store: &mut XseStore, profile: &VelocityProfile) -> Result<(), Error> {
    let kind = current_kind(store)?;
    if kind != RecordKind::VelocityProfile {
        return Err(Error::WrongRecordKind {
            operation: "insert_svp",
            kind,
        });
    }
    let mut n = profile.depth.len().min(profile.velocity.len());
    if n > MAX_SVP {
        warn!("keeping the first {MAX_SVP} of {n} profile samples");
        n = MAX_SVP;
    }
    store.svp.depth = Some(profile.depth[..n].to_vec());
    store.svp.velocity = Some(profile.velocity[..n].to_vec());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xse::store::{Beam, XseFrame};

    fn beam(number: i16, quality: u8, lateral: f64, depth: f64) -> Beam {
        Beam::builder()
            .number(number)
            .quality(quality)
            .lateral(lateral)
            .depth(depth)
            .build()
    }

    fn store_with(beams: Vec<Beam>) -> XseStore {
        let mut store = XseStore::new();
        store.push(XseFrame::Multibeam(
            MultibeamFrame::builder()
                .arrays(vec![
                    BeamArray::Number,
                    BeamArray::Quality,
                    BeamArray::Lateral,
                    BeamArray::Depth,
                ])
                .beams(beams)
                .build(),
        ));
        store
    }

    #[test]
    fn quality_codes_map_to_flags() {
        assert_eq!(flag_from_quality(1), BeamFlag::None);
        assert_eq!(flag_from_quality(3), BeamFlag::Sonar);
        assert_eq!(flag_from_quality(8), BeamFlag::Null);
        assert_eq!(flag_from_quality(10), BeamFlag::Manual);
        assert_eq!(flag_from_quality(20), BeamFlag::Filter);
        assert_eq!(flag_from_quality(0), BeamFlag::Null);
        assert_eq!(quality_from_flag(BeamFlag::Sonar, 1), 7);
        assert_eq!(quality_from_flag(BeamFlag::Sonar, 4), 4);
    }

    #[test]
    fn beams_are_reordered_port_to_starboard() {
        // beam 3 is the port beam, stored first with a negative lateral
        let store = store_with(vec![
            beam(3, 1, -10.0, 100.0),
            beam(2, 1, 0.0, 101.0),
            beam(1, 8, 10.0, 102.0),
        ]);
        let record = extract(&store).unwrap();
        let bath = record.swath.bath;
        assert_eq!(bath.len(), 3);
        assert!((bath[0].depth - 100.0).abs() < 1e-12);
        assert!((bath[2].depth - 102.0).abs() < 1e-12);
        assert_eq!(bath[2].flag, BeamFlag::Null);
        // laterals grow with the index, so acrosstrack is negated
        assert!((bath[0].acrosstrack - 10.0).abs() < 1e-12);
    }

    #[test]
    fn altitude_falls_back_to_nearest_good_beam() {
        let mut store = store_with(vec![
            beam(3, 1, -10.0, 100.0),
            beam(2, 8, 0.0, 0.0),
            beam(1, 1, 5.0, 90.0),
        ]);
        store.ship_draft = 2.0;
        let altitude = extract_altitude(&store).unwrap();
        assert!((altitude.transducer_depth - 2.0).abs() < 1e-12);
        assert!((altitude.altitude - 88.0).abs() < 1e-12);
    }

    #[test]
    fn derived_depth_uses_nominal_sound_speed() {
        let mut store = XseStore::new();
        store.push(XseFrame::Multibeam(
            MultibeamFrame::builder()
                .arrays(vec![
                    BeamArray::Number,
                    BeamArray::TravelTime,
                    BeamArray::Angle,
                    BeamArray::Heave,
                    BeamArray::Roll,
                    BeamArray::Pitch,
                ])
                .beams(vec![Beam::builder().number(1).quality(1).travel_time(0.2).build()])
                .build(),
        ));
        let record = extract(&store).unwrap();
        // vertical beam: 1500 m/s over 0.1 s one way
        assert!((record.swath.bath[0].depth - 150.0).abs() < 1e-9);
        assert!(record.swath.bath[0].acrosstrack.abs() < 1e-9);
    }

    #[test]
    fn deep_soundings_are_corrupt() {
        let store = store_with(vec![beam(1, 1, 0.0, 12_000.0)]);
        assert!(matches!(extract(&store), Err(Error::CorruptRecord(_))));
    }

    #[test]
    fn comments_have_no_navigation() {
        let mut store = XseStore::new();
        store.push(XseFrame::Comment(CommentFrame::builder().text("hello").build()));
        assert!(matches!(
            extract_nav(&store),
            Err(Error::WrongRecordKind {
                kind: RecordKind::Comment,
                ..
            })
        ));
        assert_eq!(extract(&store).unwrap().comment.as_deref(), Some("hello"));
    }
}
