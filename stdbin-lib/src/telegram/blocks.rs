//! Optional data blocks following the telegram header.
//!
//! Blocks carry no length or type prefix; which blocks are present is known only from
//! the header bitmasks, and a block's offset depends on every block before it. Each
//! bitmask therefore has an ordered table of `(bit, decoder)` pairs that is walked in
//! ascending bit order. Bits without a table entry are never decoded and never move the
//! cursor.
use std::fmt::Display;

use chrono::NaiveDate;

use super::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::message::ValidityTime;

type Result<T> = std::result::Result<T, DecodeError>;

/// Decodes one block at the current cursor position.
pub type DecodeFn<B> = fn(&mut ByteCursor) -> Result<B>;

/// Navigation bits that are reserved and must never be decoded.
pub const RESERVED_NAV_BITS: [u8; 3] = [18, 19, 20];

/// The only valid values for the extended navigation bitmask.
pub const EXTENDED_MASK_NONE: u32 = 0;
pub const EXTENDED_MASK_ALL: u32 = 0b111;

/// Heading, roll and pitch in degrees (or their rates/standard deviations, depending
/// on the block).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attitude {
    pub heading: f32,
    pub roll: f32,
    pub pitch: f32,
}

/// Three axis quantity in the vessel frame (XV1, XV2, XV3).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x1: f32,
    pub x2: f32,
    pub x3: f32,
}

/// Three axis quantity in the geographic frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geographic {
    pub north: f32,
    pub east: f32,
    pub up: f32,
}

/// Horizontal quantity in the geographic frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Horizontal {
    pub north: f32,
    pub east: f32,
}

/// Real-time heave, surge and sway in meters.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealTimeHeave {
    /// Positive up, without bras de levier
    pub heave_without_lever_arm: f32,
    /// Positive up
    pub heave: f32,
    /// Positive forward
    pub surge: f32,
    /// Positive port side
    pub sway: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmartHeave {
    pub validity_time: ValidityTime,
    pub heave: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Degrees, -90 to 90
    pub latitude: f64,
    /// Degrees, 0 to 360
    pub longitude: f64,
    pub altitude_reference: u8,
    /// Meters
    pub altitude: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionStdDev {
    pub north: f32,
    pub east: f32,
    pub north_east_correlation: f32,
    pub altitude: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl SystemDate {
    /// Calendar date, or `None` if the device reported an impossible date.
    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }
}

impl Display for SystemDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaveSurgeSwaySpeed {
    pub heave: f32,
    pub surge: f32,
    pub sway: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CourseSpeed {
    /// Degrees
    pub course: f32,
    /// Meters per second
    pub speed: f32,
}

/// Mean temperatures in degrees Celsius.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Temperatures {
    pub fog: f32,
    pub accelerometer: f32,
    pub sensor: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub q0: f32,
    pub q1: f32,
    pub q2: f32,
    pub q3: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utc {
    pub validity_time: ValidityTime,
    pub source: u8,
}

/// GNSS fix quality.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GnssQuality {
    #[default]
    Invalid,
    Natural10m,
    Differential3m,
    Military10m,
    Rtk0p1m,
    FloatRtk0p3m,
    Other,
}

impl From<u8> for GnssQuality {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::Natural10m,
            2 => Self::Differential3m,
            3 => Self::Military10m,
            4 => Self::Rtk0p1m,
            5 => Self::FloatRtk0p3m,
            _ => Self::Other,
        }
    }
}

impl Display for GnssQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Natural10m => "natural (10m)",
            Self::Differential3m => "differential (3m)",
            Self::Military10m => "military (10m)",
            Self::Rtk0p1m => "RTK (0.1m)",
            Self::FloatRtk0p3m => "float RTK (0.3m)",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// One GNSS status block.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GnssRecord {
    pub validity_time: i32,
    /// 0 = GNSS1, 2 = manual GNSS
    pub id: u8,
    /// Raw quality byte as sent
    pub quality_raw: u8,
    pub quality: GnssQuality,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
    pub latitude_std_dev: f32,
    pub longitude_std_dev: f32,
    pub altitude_std_dev: f32,
    pub lat_long_covariance: f32,
    pub geoidal_separation: f32,
}

/// A decoded navigation block, one variant per navigation bitmask bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavBlock {
    Attitude(Attitude),
    AttitudeStdDev(Attitude),
    RealTimeHeave(RealTimeHeave),
    SmartHeave(SmartHeave),
    AttitudeRate(Attitude),
    RotationRate(Vec3),
    Acceleration(Vec3),
    Position(Position),
    PositionStdDev(PositionStdDev),
    Speed(Geographic),
    SpeedStdDev(Geographic),
    Current(Horizontal),
    CurrentStdDev(Horizontal),
    SystemDate(SystemDate),
    SensorStatus([u32; 2]),
    AlgorithmStatus([u32; 4]),
    SystemStatus([u32; 3]),
    UserStatus(u32),
    HeaveSurgeSwaySpeed(HeaveSurgeSwaySpeed),
    VesselSpeed(Vec3),
    GeographicAcceleration(Geographic),
    CourseSpeedOverGround(CourseSpeed),
    Temperatures(Temperatures),
    AttitudeQuaternion(Quaternion),
    AttitudeQuaternionStdDev(Vec3),
    RawAcceleration(Vec3),
    AccelerationStdDev(Vec3),
    RotationRateStdDev(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtendedBlock {
    RawRotationAcceleration(Vec3),
    RawRotationAccelerationStdDev(Vec3),
    RawRotationRate(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExternalBlock {
    Utc(Utc),
    /// GNSS record with its zero based index
    Gnss(usize, GnssRecord),
}

/// Navigation blocks present in a telegram.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationData {
    pub attitude: Option<Attitude>,
    pub attitude_std_dev: Option<Attitude>,
    pub real_time_heave: Option<RealTimeHeave>,
    pub smart_heave: Option<SmartHeave>,
    pub attitude_rate: Option<Attitude>,
    pub rotation_rate: Option<Vec3>,
    pub acceleration: Option<Vec3>,
    pub position: Option<Position>,
    pub position_std_dev: Option<PositionStdDev>,
    pub speed: Option<Geographic>,
    pub speed_std_dev: Option<Geographic>,
    pub current: Option<Horizontal>,
    pub current_std_dev: Option<Horizontal>,
    pub system_date: Option<SystemDate>,
    pub sensor_status: Option<[u32; 2]>,
    pub algorithm_status: Option<[u32; 4]>,
    pub system_status: Option<[u32; 3]>,
    pub user_status: Option<u32>,
    pub heave_surge_sway_speed: Option<HeaveSurgeSwaySpeed>,
    pub vessel_speed: Option<Vec3>,
    pub geographic_acceleration: Option<Geographic>,
    pub course_speed_over_ground: Option<CourseSpeed>,
    pub temperatures: Option<Temperatures>,
    pub attitude_quaternion: Option<Quaternion>,
    pub attitude_quaternion_std_dev: Option<Vec3>,
    pub raw_acceleration: Option<Vec3>,
    pub acceleration_std_dev: Option<Vec3>,
    pub rotation_rate_std_dev: Option<Vec3>,
}

impl NavigationData {
    pub fn apply(&mut self, block: NavBlock) {
        match block {
            NavBlock::Attitude(b) => self.attitude = Some(b),
            NavBlock::AttitudeStdDev(b) => self.attitude_std_dev = Some(b),
            NavBlock::RealTimeHeave(b) => self.real_time_heave = Some(b),
            NavBlock::SmartHeave(b) => self.smart_heave = Some(b),
            NavBlock::AttitudeRate(b) => self.attitude_rate = Some(b),
            NavBlock::RotationRate(b) => self.rotation_rate = Some(b),
            NavBlock::Acceleration(b) => self.acceleration = Some(b),
            NavBlock::Position(b) => self.position = Some(b),
            NavBlock::PositionStdDev(b) => self.position_std_dev = Some(b),
            NavBlock::Speed(b) => self.speed = Some(b),
            NavBlock::SpeedStdDev(b) => self.speed_std_dev = Some(b),
            NavBlock::Current(b) => self.current = Some(b),
            NavBlock::CurrentStdDev(b) => self.current_std_dev = Some(b),
            NavBlock::SystemDate(b) => self.system_date = Some(b),
            NavBlock::SensorStatus(b) => self.sensor_status = Some(b),
            NavBlock::AlgorithmStatus(b) => self.algorithm_status = Some(b),
            NavBlock::SystemStatus(b) => self.system_status = Some(b),
            NavBlock::UserStatus(b) => self.user_status = Some(b),
            NavBlock::HeaveSurgeSwaySpeed(b) => self.heave_surge_sway_speed = Some(b),
            NavBlock::VesselSpeed(b) => self.vessel_speed = Some(b),
            NavBlock::GeographicAcceleration(b) => self.geographic_acceleration = Some(b),
            NavBlock::CourseSpeedOverGround(b) => self.course_speed_over_ground = Some(b),
            NavBlock::Temperatures(b) => self.temperatures = Some(b),
            NavBlock::AttitudeQuaternion(b) => self.attitude_quaternion = Some(b),
            NavBlock::AttitudeQuaternionStdDev(b) => self.attitude_quaternion_std_dev = Some(b),
            NavBlock::RawAcceleration(b) => self.raw_acceleration = Some(b),
            NavBlock::AccelerationStdDev(b) => self.acceleration_std_dev = Some(b),
            NavBlock::RotationRateStdDev(b) => self.rotation_rate_std_dev = Some(b),
        }
    }
}

/// Extended navigation blocks present in a telegram.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedNavigationData {
    pub raw_rotation_acceleration: Option<Vec3>,
    pub raw_rotation_acceleration_std_dev: Option<Vec3>,
    pub raw_rotation_rate: Option<Vec3>,
}

impl ExtendedNavigationData {
    pub fn apply(&mut self, block: ExtendedBlock) {
        match block {
            ExtendedBlock::RawRotationAcceleration(b) => self.raw_rotation_acceleration = Some(b),
            ExtendedBlock::RawRotationAccelerationStdDev(b) => {
                self.raw_rotation_acceleration_std_dev = Some(b);
            }
            ExtendedBlock::RawRotationRate(b) => self.raw_rotation_rate = Some(b),
        }
    }
}

/// External sensor blocks present in a telegram.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalData {
    pub utc: Option<Utc>,
    /// Index 0 is the primary internal GNSS, 1 the secondary, 2 the manual/external.
    pub gnss: [Option<GnssRecord>; 3],
}

impl ExternalData {
    pub fn apply(&mut self, block: ExternalBlock) {
        match block {
            ExternalBlock::Utc(b) => self.utc = Some(b),
            ExternalBlock::Gnss(idx, b) => self.gnss[idx] = Some(b),
        }
    }
}

fn attitude(cur: &mut ByteCursor) -> Result<Attitude> {
    Ok(Attitude {
        heading: cur.read_f32()?,
        roll: cur.read_f32()?,
        pitch: cur.read_f32()?,
    })
}

fn vec3(cur: &mut ByteCursor) -> Result<Vec3> {
    Ok(Vec3 {
        x1: cur.read_f32()?,
        x2: cur.read_f32()?,
        x3: cur.read_f32()?,
    })
}

fn geographic(cur: &mut ByteCursor) -> Result<Geographic> {
    Ok(Geographic {
        north: cur.read_f32()?,
        east: cur.read_f32()?,
        up: cur.read_f32()?,
    })
}

fn horizontal(cur: &mut ByteCursor) -> Result<Horizontal> {
    Ok(Horizontal {
        north: cur.read_f32()?,
        east: cur.read_f32()?,
    })
}

fn words<const N: usize>(cur: &mut ByteCursor) -> Result<[u32; N]> {
    let mut out = [0u32; N];
    for w in &mut out {
        *w = cur.read_u32()?;
    }
    Ok(out)
}

fn nav_attitude(cur: &mut ByteCursor) -> Result<NavBlock> {
    attitude(cur).map(NavBlock::Attitude)
}

fn nav_attitude_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    attitude(cur).map(NavBlock::AttitudeStdDev)
}

fn nav_real_time_heave(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::RealTimeHeave(RealTimeHeave {
        heave_without_lever_arm: cur.read_f32()?,
        heave: cur.read_f32()?,
        surge: cur.read_f32()?,
        sway: cur.read_f32()?,
    }))
}

fn nav_smart_heave(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::SmartHeave(SmartHeave {
        validity_time: ValidityTime(cur.read_u32()?),
        heave: cur.read_f32()?,
    }))
}

fn nav_attitude_rate(cur: &mut ByteCursor) -> Result<NavBlock> {
    attitude(cur).map(NavBlock::AttitudeRate)
}

fn nav_rotation_rate(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::RotationRate)
}

fn nav_acceleration(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::Acceleration)
}

fn nav_position(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::Position(Position {
        latitude: cur.read_f64()?,
        longitude: cur.read_f64()?,
        altitude_reference: cur.read_u8()?,
        altitude: cur.read_f32()?,
    }))
}

fn nav_position_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::PositionStdDev(PositionStdDev {
        north: cur.read_f32()?,
        east: cur.read_f32()?,
        north_east_correlation: cur.read_f32()?,
        altitude: cur.read_f32()?,
    }))
}

fn nav_speed(cur: &mut ByteCursor) -> Result<NavBlock> {
    geographic(cur).map(NavBlock::Speed)
}

fn nav_speed_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    geographic(cur).map(NavBlock::SpeedStdDev)
}

fn nav_current(cur: &mut ByteCursor) -> Result<NavBlock> {
    horizontal(cur).map(NavBlock::Current)
}

fn nav_current_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    horizontal(cur).map(NavBlock::CurrentStdDev)
}

fn nav_system_date(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::SystemDate(SystemDate {
        day: cur.read_u8()?,
        month: cur.read_u8()?,
        year: cur.read_u16()?,
    }))
}

fn nav_sensor_status(cur: &mut ByteCursor) -> Result<NavBlock> {
    words(cur).map(NavBlock::SensorStatus)
}

fn nav_algorithm_status(cur: &mut ByteCursor) -> Result<NavBlock> {
    words(cur).map(NavBlock::AlgorithmStatus)
}

fn nav_system_status(cur: &mut ByteCursor) -> Result<NavBlock> {
    words(cur).map(NavBlock::SystemStatus)
}

fn nav_user_status(cur: &mut ByteCursor) -> Result<NavBlock> {
    cur.read_u32().map(NavBlock::UserStatus)
}

fn nav_heave_surge_sway_speed(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::HeaveSurgeSwaySpeed(HeaveSurgeSwaySpeed {
        heave: cur.read_f32()?,
        surge: cur.read_f32()?,
        sway: cur.read_f32()?,
    }))
}

fn nav_vessel_speed(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::VesselSpeed)
}

fn nav_geographic_acceleration(cur: &mut ByteCursor) -> Result<NavBlock> {
    geographic(cur).map(NavBlock::GeographicAcceleration)
}

fn nav_course_speed(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::CourseSpeedOverGround(CourseSpeed {
        course: cur.read_f32()?,
        speed: cur.read_f32()?,
    }))
}

fn nav_temperatures(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::Temperatures(Temperatures {
        fog: cur.read_f32()?,
        accelerometer: cur.read_f32()?,
        sensor: cur.read_f32()?,
    }))
}

fn nav_quaternion(cur: &mut ByteCursor) -> Result<NavBlock> {
    Ok(NavBlock::AttitudeQuaternion(Quaternion {
        q0: cur.read_f32()?,
        q1: cur.read_f32()?,
        q2: cur.read_f32()?,
        q3: cur.read_f32()?,
    }))
}

fn nav_quaternion_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::AttitudeQuaternionStdDev)
}

fn nav_raw_acceleration(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::RawAcceleration)
}

fn nav_acceleration_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::AccelerationStdDev)
}

fn nav_rotation_rate_std_dev(cur: &mut ByteCursor) -> Result<NavBlock> {
    vec3(cur).map(NavBlock::RotationRateStdDev)
}

/// Navigation blocks in decode order. Bits 18, 19 and 20 are reserved.
pub const NAV_BLOCKS: &[(u8, DecodeFn<NavBlock>)] = &[
    (0, nav_attitude),
    (1, nav_attitude_std_dev),
    (2, nav_real_time_heave),
    (3, nav_smart_heave),
    (4, nav_attitude_rate),
    (5, nav_rotation_rate),
    (6, nav_acceleration),
    (7, nav_position),
    (8, nav_position_std_dev),
    (9, nav_speed),
    (10, nav_speed_std_dev),
    (11, nav_current),
    (12, nav_current_std_dev),
    (13, nav_system_date),
    (14, nav_sensor_status),
    (15, nav_algorithm_status),
    (16, nav_system_status),
    (17, nav_user_status),
    (21, nav_heave_surge_sway_speed),
    (22, nav_vessel_speed),
    (23, nav_geographic_acceleration),
    (24, nav_course_speed),
    (25, nav_temperatures),
    (26, nav_quaternion),
    (27, nav_quaternion_std_dev),
    (28, nav_raw_acceleration),
    (29, nav_acceleration_std_dev),
    (30, nav_rotation_rate_std_dev),
];

fn ext_rotation_acceleration(cur: &mut ByteCursor) -> Result<ExtendedBlock> {
    vec3(cur).map(ExtendedBlock::RawRotationAcceleration)
}

fn ext_rotation_acceleration_std_dev(cur: &mut ByteCursor) -> Result<ExtendedBlock> {
    vec3(cur).map(ExtendedBlock::RawRotationAccelerationStdDev)
}

fn ext_rotation_rate(cur: &mut ByteCursor) -> Result<ExtendedBlock> {
    vec3(cur).map(ExtendedBlock::RawRotationRate)
}

/// Extended navigation blocks in decode order.
pub const EXTENDED_BLOCKS: &[(u8, DecodeFn<ExtendedBlock>)] = &[
    (0, ext_rotation_acceleration),
    (1, ext_rotation_acceleration_std_dev),
    (2, ext_rotation_rate),
];

fn external_utc(cur: &mut ByteCursor) -> Result<ExternalBlock> {
    Ok(ExternalBlock::Utc(Utc {
        validity_time: ValidityTime(cur.read_u32()?),
        source: cur.read_u8()?,
    }))
}

fn gnss(cur: &mut ByteCursor) -> Result<GnssRecord> {
    let validity_time = cur.read_i32()?;
    let id = cur.read_u8()?;
    let quality_raw = cur.read_u8()?;
    Ok(GnssRecord {
        validity_time,
        id,
        quality_raw,
        quality: GnssQuality::from(quality_raw),
        latitude: cur.read_f64()?,
        longitude: cur.read_f64()?,
        altitude: cur.read_f32()?,
        latitude_std_dev: cur.read_f32()?,
        longitude_std_dev: cur.read_f32()?,
        altitude_std_dev: cur.read_f32()?,
        lat_long_covariance: cur.read_f32()?,
        geoidal_separation: cur.read_f32()?,
    })
}

fn external_gnss1(cur: &mut ByteCursor) -> Result<ExternalBlock> {
    gnss(cur).map(|g| ExternalBlock::Gnss(0, g))
}

fn external_gnss2(cur: &mut ByteCursor) -> Result<ExternalBlock> {
    gnss(cur).map(|g| ExternalBlock::Gnss(1, g))
}

fn external_gnss3(cur: &mut ByteCursor) -> Result<ExternalBlock> {
    gnss(cur).map(|g| ExternalBlock::Gnss(2, g))
}

/// External sensor blocks in decode order.
pub const EXTERNAL_BLOCKS: &[(u8, DecodeFn<ExternalBlock>)] = &[
    (0, external_utc),
    (1, external_gnss1),
    (2, external_gnss2),
    (3, external_gnss3),
];

#[must_use]
pub fn bit_set(mask: u32, bit: u8) -> bool {
    (mask >> bit) & 0x1 == 1
}

/// Decode, in table order, every block whose bit is set in `mask`, handing each decoded
/// block to `sink`.
///
/// Blocks decoded before a failure have already been handed to `sink`.
///
/// # Errors
/// [DecodeError::ShortRead] if the data ends inside a block.
pub fn walk<B>(
    mask: u32,
    table: &[(u8, DecodeFn<B>)],
    cur: &mut ByteCursor,
    mut sink: impl FnMut(B),
) -> Result<()> {
    for (bit, decode) in table {
        if bit_set(mask, *bit) {
            sink(decode(cur)?);
        }
    }
    Ok(())
}
