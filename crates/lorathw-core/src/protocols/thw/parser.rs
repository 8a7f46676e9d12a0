use serde::{Deserialize, Serialize};

use super::error::ThwError;
use super::layout;
use super::reader::ThwReader;

/// Raw integer fields of a TH/W payload, before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThwFrame {
    pub humidity: u8,
    /// Temperature in 0.1 °C steps, offset by +500 (12 bit).
    pub temperature_raw: u16,
    /// Windspeed in 0.1 steps (12 bit).
    pub windspeed_raw: u16,
    pub devid: u32,
}

/// Scaled sensor reading decoded from one uplink payload.
///
/// # Examples
/// ```
/// use lorathw_core::decode;
///
/// let reading = decode(&[55, 0xE8, 0x13, 0x01, 1, 2, 3, 4], 1)?;
/// assert_eq!(reading.humidity, 55);
/// assert_eq!(reading.temperature, 50.0);
/// assert_eq!(reading.windspeed, 1.7);
/// assert_eq!(reading.devid, 0x0403_0201);
/// # Ok::<(), lorathw_core::ThwError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedReading {
    /// Relative humidity in percent, unscaled.
    pub humidity: u8,
    /// Temperature in °C, one decimal of precision.
    pub temperature: f64,
    /// Windspeed, one decimal of precision.
    pub windspeed: f64,
    /// Device identifier chosen by the sensor.
    pub devid: u32,
}

impl ThwFrame {
    pub fn temperature(&self) -> f64 {
        f64::from(i32::from(self.temperature_raw) - layout::TEMPERATURE_OFFSET) / layout::SCALE
    }

    pub fn windspeed(&self) -> f64 {
        f64::from(self.windspeed_raw) / layout::SCALE
    }

    /// Windspeed as reported to datastreams: the raw value scaled by 3.6 / 10.
    pub fn windspeed_routed(&self) -> f64 {
        f64::from(self.windspeed_raw) * layout::WINDSPEED_ROUTE_NUMERATOR
            / layout::WINDSPEED_ROUTE_DENOMINATOR
    }

    pub fn reading(&self) -> DecodedReading {
        DecodedReading {
            humidity: self.humidity,
            temperature: self.temperature(),
            windspeed: self.windspeed(),
            devid: self.devid,
        }
    }
}

pub fn parse_frame(payload: &[u8]) -> Result<ThwFrame, ThwError> {
    let reader = ThwReader::new(payload);
    reader.require_len(layout::PAYLOAD_LEN)?;

    let humidity = reader.read_u8(layout::HUMIDITY_OFFSET)?;
    let temperature_raw =
        reader.read_u12_low_nibble_high(layout::TEMP_WIND_OFFSET, layout::TEMPERATURE_LOW_OFFSET)?;
    let windspeed_raw =
        reader.read_u12_high_nibble_low(layout::WINDSPEED_HIGH_OFFSET, layout::TEMP_WIND_OFFSET)?;
    let devid = reader.read_u32_le(layout::DEVID_OFFSET)?;

    Ok(ThwFrame {
        humidity,
        temperature_raw,
        windspeed_raw,
        devid,
    })
}

/// Decode a TH/W payload. `port` is accepted for the uplink callback
/// contract but does not influence decoding.
pub fn decode(payload: &[u8], _port: u8) -> Result<DecodedReading, ThwError> {
    parse_frame(payload).map(|frame| frame.reading())
}
