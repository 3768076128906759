mod common;

use common::{full_telegram, TelegramBuilder};
use stdbin::telegram::{
    Attitude, CourseSpeed, Geographic, GnssQuality, HeaveSurgeSwaySpeed, Horizontal, Position,
    PositionStdDev, Quaternion, RealTimeHeave, SmartHeave, SystemDate, Temperatures, Vec3,
};
use stdbin::{decode_telegram, DecodeError, DecodeErrorKind, Decoder, MessageKind, ValidityTime};
use test_case::test_case;

fn position_only() -> TelegramBuilder {
    TelegramBuilder::new().position(34.2, 241.7, 1, 100.5)
}

#[test]
fn position_only_telegram_is_valid() {
    let dat = position_only().build();
    let decoded = decode_telegram(&dat);
    let msg = &decoded.message;

    assert!(msg.valid, "errors: {:?}", msg.errors);
    assert_eq!(msg.nav_block_mask, 0x0000_0080);
    assert!(msg.has_position());
    let pos = msg.nav.position.unwrap();
    assert!((pos.latitude - 34.2).abs() < 1e-12);
    assert!((pos.longitude - 241.7).abs() < 1e-12);
    assert_eq!(pos.altitude_reference, 1);
    assert!((pos.altitude - 100.5).abs() < 1e-6);
    assert_eq!(decoded.consumed, dat.len());
    assert_eq!(usize::from(msg.total_telegram_size), dat.len());
}

#[test]
fn checksum_off_by_one_keeps_position() {
    let dat = position_only().checksum_delta(1).build();
    let msg = decode_telegram(&dat).message;

    assert!(!msg.valid);
    assert_eq!(msg.error().map(DecodeError::kind), Some(DecodeErrorKind::BadChecksum));
    assert_eq!(msg.claimed_checksum, msg.calculated_checksum + 1);
    let pos = msg.nav.position.unwrap();
    assert!((pos.latitude - 34.2).abs() < 1e-12);
    assert!((pos.longitude - 241.7).abs() < 1e-12);
    assert!((pos.altitude - 100.5).abs() < 1e-6);
}

#[test]
fn full_telegram_round_trips_bit_exact() {
    let dat = full_telegram(77);
    assert_eq!(dat.len(), 307);
    let msg = decode_telegram(&dat).message;

    assert!(msg.valid, "errors: {:?}", msg.errors);
    assert_eq!(msg.counter, 77);

    let att = msg.nav.attitude.unwrap();
    assert_eq!(att.heading.to_bits(), 12.5f32.to_bits());
    assert_eq!(att.roll.to_bits(), (-0.5f32).to_bits());
    assert_eq!(att.pitch.to_bits(), 1.25f32.to_bits());

    let pos = msg.nav.position.unwrap();
    assert_eq!(pos.latitude.to_bits(), 34.2f64.to_bits());
    assert_eq!(pos.longitude.to_bits(), 241.7f64.to_bits());

    assert_eq!(msg.nav.system_date.unwrap().to_string(), "2024-06-17");
    assert_eq!(msg.nav.algorithm_status, Some([0x8000_0001; 4]));
    assert_eq!(msg.nav.user_status, Some(0x8000_0001));
    let cs = msg.nav.course_speed_over_ground.unwrap();
    assert_eq!(cs.speed.to_bits(), 5.5f32.to_bits());

    let rate = msg.extended.raw_rotation_rate.unwrap();
    assert_eq!(rate.x3.to_bits(), (-3.0f32).to_bits());
    assert!(msg.extended.raw_rotation_acceleration_std_dev.is_some());

    assert_eq!(msg.external.utc.unwrap().source, 2);
    let gnss: Vec<_> = msg.external.gnss.iter().map(|g| g.unwrap()).collect();
    assert_eq!(gnss[0].quality, GnssQuality::Rtk0p1m);
    assert_eq!(gnss[1].quality, GnssQuality::Natural10m);
    assert_eq!(gnss[2].quality, GnssQuality::FloatRtk0p3m);
    assert_eq!(gnss[2].id, 2);
    assert_eq!(gnss[0].validity_time, -5);
    assert_eq!(gnss[1].latitude.to_bits(), 34.3f64.to_bits());
    assert_eq!(gnss[2].geoidal_separation.to_bits(), 32.0f32.to_bits());

    let temps = msg.nav.temperatures.unwrap();
    assert_eq!(temps.fog.to_bits(), 41.5f32.to_bits());
    assert_eq!(temps.sensor.to_bits(), 30.25f32.to_bits());

    // Bits that were not set stay empty
    assert!(msg.nav.smart_heave.is_none());
    assert!(msg.nav.attitude_quaternion.is_none());
}

/// Distinct value for field `idx` of navigation block `bit`.
fn field(bit: u8, idx: u8) -> f32 {
    f32::from(bit) * 10.0 + f32::from(idx) + 0.5
}

fn fields(bit: u8, n: u8) -> Vec<f32> {
    (0..n).map(|idx| field(bit, idx)).collect()
}

fn words(bit: u8, n: u8) -> Vec<u8> {
    (0..n)
        .flat_map(|idx| (u32::from(bit) * 100 + u32::from(idx)).to_be_bytes())
        .collect()
}

#[test]
fn every_nav_block_decodes_field_by_field() {
    let float_blocks: [(u8, u8); 21] = [
        (0, 3),
        (1, 3),
        (2, 4),
        (4, 3),
        (5, 3),
        (6, 3),
        (8, 4),
        (9, 3),
        (10, 3),
        (11, 2),
        (12, 2),
        (21, 3),
        (22, 3),
        (23, 3),
        (24, 2),
        (25, 3),
        (26, 4),
        (27, 3),
        (28, 3),
        (29, 3),
        (30, 3),
    ];
    let mut builder = TelegramBuilder::new()
        .counter(4)
        .position(-33.25, 151.125, 2, -12.5)
        .system_date(29, 2, 2024)
        .nav_block(14, words(14, 2))
        .nav_block(15, words(15, 4))
        .nav_block(16, words(16, 3))
        .nav_block(17, words(17, 1));
    let mut smart_heave = 123_456u32.to_be_bytes().to_vec();
    smart_heave.extend_from_slice(&field(3, 1).to_be_bytes());
    builder = builder.nav_block(3, smart_heave);
    for (bit, n) in float_blocks {
        builder = builder.nav_floats(bit, &fields(bit, n));
    }
    let dat = builder.build();

    let decoded = decode_telegram(&dat);
    let msg = &decoded.message;
    assert!(msg.valid, "errors: {:?}", msg.errors);
    assert_eq!(msg.nav_block_mask, 0x7fe3_ffff);
    assert_eq!(decoded.consumed, dat.len());

    let nav = &msg.nav;
    let att = |bit| Attitude {
        heading: field(bit, 0),
        roll: field(bit, 1),
        pitch: field(bit, 2),
    };
    let vec3 = |bit| Vec3 {
        x1: field(bit, 0),
        x2: field(bit, 1),
        x3: field(bit, 2),
    };
    let geo = |bit| Geographic {
        north: field(bit, 0),
        east: field(bit, 1),
        up: field(bit, 2),
    };
    let horiz = |bit| Horizontal {
        north: field(bit, 0),
        east: field(bit, 1),
    };

    assert_eq!(nav.attitude, Some(att(0)));
    assert_eq!(nav.attitude_std_dev, Some(att(1)));
    assert_eq!(
        nav.real_time_heave,
        Some(RealTimeHeave {
            heave_without_lever_arm: field(2, 0),
            heave: field(2, 1),
            surge: field(2, 2),
            sway: field(2, 3),
        })
    );
    assert_eq!(
        nav.smart_heave,
        Some(SmartHeave {
            validity_time: ValidityTime(123_456),
            heave: field(3, 1),
        })
    );
    assert_eq!(nav.attitude_rate, Some(att(4)));
    assert_eq!(nav.rotation_rate, Some(vec3(5)));
    assert_eq!(nav.acceleration, Some(vec3(6)));
    assert_eq!(
        nav.position,
        Some(Position {
            latitude: -33.25,
            longitude: 151.125,
            altitude_reference: 2,
            altitude: -12.5,
        })
    );
    assert_eq!(
        nav.position_std_dev,
        Some(PositionStdDev {
            north: field(8, 0),
            east: field(8, 1),
            north_east_correlation: field(8, 2),
            altitude: field(8, 3),
        })
    );
    assert_eq!(nav.speed, Some(geo(9)));
    assert_eq!(nav.speed_std_dev, Some(geo(10)));
    assert_eq!(nav.current, Some(horiz(11)));
    assert_eq!(nav.current_std_dev, Some(horiz(12)));
    assert_eq!(
        nav.system_date,
        Some(SystemDate {
            day: 29,
            month: 2,
            year: 2024,
        })
    );
    assert_eq!(nav.sensor_status, Some([1400, 1401]));
    assert_eq!(nav.algorithm_status, Some([1500, 1501, 1502, 1503]));
    assert_eq!(nav.system_status, Some([1600, 1601, 1602]));
    assert_eq!(nav.user_status, Some(1700));
    assert_eq!(
        nav.heave_surge_sway_speed,
        Some(HeaveSurgeSwaySpeed {
            heave: field(21, 0),
            surge: field(21, 1),
            sway: field(21, 2),
        })
    );
    assert_eq!(nav.vessel_speed, Some(vec3(22)));
    assert_eq!(nav.geographic_acceleration, Some(geo(23)));
    assert_eq!(
        nav.course_speed_over_ground,
        Some(CourseSpeed {
            course: field(24, 0),
            speed: field(24, 1),
        })
    );
    assert_eq!(
        nav.temperatures,
        Some(Temperatures {
            fog: field(25, 0),
            accelerometer: field(25, 1),
            sensor: field(25, 2),
        })
    );
    assert_eq!(
        nav.attitude_quaternion,
        Some(Quaternion {
            q0: field(26, 0),
            q1: field(26, 1),
            q2: field(26, 2),
            q3: field(26, 3),
        })
    );
    assert_eq!(nav.attitude_quaternion_std_dev, Some(vec3(27)));
    assert_eq!(nav.raw_acceleration, Some(vec3(28)));
    assert_eq!(nav.acceleration_std_dev, Some(vec3(29)));
    assert_eq!(nav.rotation_rate_std_dev, Some(vec3(30)));
}

#[test]
fn decode_is_deterministic() {
    let dat = full_telegram(3);
    let a = decode_telegram(&dat);
    let b = decode_telegram(&dat);
    assert_eq!(a, b);
}

#[test]
fn every_single_byte_flip_is_detected() {
    let dat = full_telegram(9);
    for idx in 0..dat.len() - 4 {
        let mut flipped = dat.clone();
        flipped[idx] ^= 0x04;
        let msg = decode_telegram(&flipped).message;
        assert!(!msg.valid, "flip at {idx} not detected");
    }
}

#[test]
fn trailer_flip_only_changes_claimed() {
    let dat = full_telegram(9);
    let good = decode_telegram(&dat).message;
    let mut flipped = dat.clone();
    let last = flipped.len() - 1;
    flipped[last] ^= 0xff;
    let bad = decode_telegram(&flipped).message;

    assert!(bad.has_error(DecodeErrorKind::BadChecksum));
    assert_eq!(bad.calculated_checksum, good.calculated_checksum);
    assert_ne!(bad.claimed_checksum, good.claimed_checksum);
}

#[test_case(2; "v2")]
#[test_case(3; "v3")]
#[test_case(5; "v5")]
fn all_protocol_versions_decode(version: u8) {
    let dat = TelegramBuilder::new()
        .version(version)
        .counter(11)
        .attitude(1.0, 2.0, 3.0)
        .utc(123, 1)
        .build();
    let decoded = decode_telegram(&dat);

    assert!(decoded.message.valid, "errors: {:?}", decoded.message.errors);
    assert_eq!(decoded.message.protocol_version, version);
    assert_eq!(decoded.consumed, dat.len());
    assert!(decoded.message.external.utc.is_some());
}

#[test_case(b"CM", MessageKind::Input; "input")]
#[test_case(b"AN", MessageKind::OutputAnswer; "answer")]
fn other_kinds_are_unsupported(marker: &[u8; 2], kind: MessageKind) {
    let dat = position_only().marker(marker).build();
    let decoded = decode_telegram(&dat);

    assert_eq!(decoded.message.kind, kind);
    assert_eq!(
        decoded.message.errors,
        vec![DecodeError::UnsupportedMessageKind(kind)]
    );
    assert_eq!(decoded.consumed, 3);
}

#[test]
fn unknown_version_consumes_prefix() {
    let dat = position_only().version(4).build();
    let decoded = decode_telegram(&dat);
    assert!(decoded
        .message
        .has_error(DecodeErrorKind::UnknownProtocolVersion));
    assert_eq!(decoded.consumed, 3);
}

#[test]
fn anomalous_extended_mask_decodes_defined_bits() {
    let dat = TelegramBuilder::new()
        .raw_rotation_rate(4.0, 5.0, 6.0)
        .build();
    let msg = decode_telegram(&dat).message;

    assert!(!msg.valid);
    assert_eq!(msg.errors, vec![DecodeError::AnomalousExtendedMask(0b100)]);
    assert_eq!(msg.extended.raw_rotation_rate.unwrap().x1, 4.0);
}

#[test]
fn reserved_bits_are_ignored() {
    let base = position_only().build();
    let mut dat = base.clone();
    // set nav bits 18..=20 and fix up the checksum
    dat[4] |= 0x1c;
    let body = dat.len() - 4;
    let sum = stdbin::telegram::checksum(&dat[..body]);
    dat[body..].copy_from_slice(&sum.to_be_bytes());

    let decoded = decode_telegram(&dat);

    assert!(decoded.message.valid, "errors: {:?}", decoded.message.errors);
    assert_eq!(decoded.consumed, base.len());
    assert_eq!(decoded.message.nav_block_mask, 0x001c_0080);
}

#[test]
fn short_read_reports_exact_shortfall() {
    let dat = position_only().build();
    // cut into the middle of the altitude field
    let cut = 27 + 17 + 2;
    let decoded = decode_telegram(&dat[..cut]);

    assert!(!decoded.message.valid);
    assert_eq!(decoded.message.shortfall(), Some(2));
    assert_eq!(decoded.consumed, 27 + 17);
    assert!(decoded.message.nav.position.is_none());
}

#[test]
fn declared_size_mismatch_is_not_an_error() {
    let dat = position_only().total_size(400).build();
    let decoded = decode_telegram(&dat);
    assert!(decoded.message.valid);
    assert_eq!(decoded.message.total_telegram_size, 400);
    assert_eq!(decoded.consumed, dat.len());
}

#[test]
fn sequence_drops() {
    let mut decoder = Decoder::new();
    let drops: Vec<u32> = [100, 101, 102, 107]
        .into_iter()
        .map(|c| decoder.decode(&full_telegram(c)).message.dropped_count)
        .collect();
    assert_eq!(drops, vec![0, 0, 0, 4]);

    let msg = decoder.decode(&full_telegram(50)).message;
    assert!(msg.counter_regressed);
    assert_eq!(msg.dropped_count, 50u32.wrapping_sub(107).wrapping_sub(1));
}

#[cfg(feature = "serde")]
#[test]
fn message_serializes_to_json() {
    let msg = decode_telegram(&full_telegram(1)).message;
    let json = serde_json::to_string(&msg).unwrap();
    let back: stdbin::Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back.counter, 1);
    assert_eq!(back.nav.position, msg.nav.position);
}
