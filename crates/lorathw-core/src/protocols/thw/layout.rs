//! Byte layout of the TFA TH/W uplink payload.
//!
//! ```text
//!  byte  |   7..4 (high nibble)    |   3..0 (low nibble)    |
//!  ------+-------------------------+------------------------+
//!    0   |            humidity (8 bit, %)                   |
//!    1   |         temperature bits 7..0                    |
//!    2   | windspeed bits 3..0     | temperature bits 11..8 |
//!    3   |          windspeed bits 11..4                    |
//!  4..8  |          device id (u32, little-endian)          |
//! ```

pub const HUMIDITY_OFFSET: usize = 0;
pub const TEMPERATURE_LOW_OFFSET: usize = 1;
/// Shared byte: low nibble belongs to temperature, high nibble to windspeed.
pub const TEMP_WIND_OFFSET: usize = 2;
pub const WINDSPEED_HIGH_OFFSET: usize = 3;
pub const DEVID_OFFSET: usize = 4;

pub const PAYLOAD_LEN: usize = 8;

/// Packed temperature and windspeed fields are 12 bits wide.
pub const TEMPWIND_MASK: u16 = 0x0FFF;

pub const TEMPERATURE_OFFSET: i32 = 500;
pub const SCALE: f64 = 10.0;

/// Windspeed conversion applied when routing readings to datastreams,
/// expressed as a ratio so the product stays exact before the final division.
pub const WINDSPEED_ROUTE_NUMERATOR: f64 = 36.0;
pub const WINDSPEED_ROUTE_DENOMINATOR: f64 = 100.0;

/// FPort the sensor firmware transmits on.
pub const APP_PORT: u8 = 1;
