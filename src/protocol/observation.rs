/// Positional `obs_st` observation array decoding
use thiserror::Error;

use crate::models::{Observation, PrecipitationAnalysis, PrecipitationType};

/// Number of values in a Tempest observation array.
pub const OBSERVATION_VALUE_COUNT: usize = 22;

/// Reasons an observation array fails to decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedObservation {
    #[error("observation array has {0} values, expected 22")]
    WrongLength(usize),
    #[error("required observation value '{0}' is missing")]
    MissingValue(&'static str),
    #[error("unknown code {code} for observation value '{field}'")]
    UnknownCode { field: &'static str, code: i64 },
    #[error("message carries no observation arrays")]
    Empty,
}

/// Decode a raw `obs_st` observation array into structured data
///
/// Tempest observations arrive as a positional array of 22 nullable
/// numbers:
/// - Slot 0: Epoch (seconds UTC)
/// - Slot 1: Wind lull (m/s)
/// - Slot 2: Wind average (m/s)
/// - Slot 3: Wind gust (m/s)
/// - Slot 4: Wind direction (degrees)
/// - Slot 5: Wind sample interval (seconds)
/// - Slot 6: Pressure (mb)
/// - Slot 7: Air temperature (°C)
/// - Slot 8: Relative humidity (%)
/// - Slot 9: Illuminance (lux)
/// - Slot 10: UV index
/// - Slot 11: Solar radiation (W/m²)
/// - Slot 12: Rain accumulation (mm)
/// - Slot 13: Precipitation type (0 = none, 1 = rain, 2 = hail)
/// - Slot 14: Average strike distance (km)
/// - Slot 15: Strike count
/// - Slot 16: Battery (V)
/// - Slot 17: Report interval (minutes)
/// - Slot 18: Local day rain accumulation (mm)
/// - Slot 19: Rain accumulation final, Rain Check (mm)
/// - Slot 20: Local day rain accumulation final, Rain Check (mm)
/// - Slot 21: Precipitation analysis type (0 = none, 1 = Rain Check
///   display on, 2 = Rain Check display off)
///
/// Absent floating-point values decode as 0.0. Absent values in
/// integer-typed slots are an error rather than a silent substitute, as
/// are enum codes outside the defined sets. Arrays longer than 22 values
/// are accepted and the trailing values ignored.
///
/// # Arguments
/// * `values` - Raw observation values from the `obs` field
///
/// # Returns
/// The decoded Observation, or the reason the array is malformed
pub fn decode_observation(values: &[Option<f64>]) -> Result<Observation, MalformedObservation> {
    if values.len() < OBSERVATION_VALUE_COUNT {
        return Err(MalformedObservation::WrongLength(values.len()));
    }

    let precipitation_code = required(values, 13, "precipitation_type")? as i64;
    let precipitation_type = PrecipitationType::from_code(precipitation_code).ok_or(
        MalformedObservation::UnknownCode {
            field: "precipitation_type",
            code: precipitation_code,
        },
    )?;

    let analysis_code = required(values, 21, "precipitation_analysis_type")? as i64;
    let precipitation_analysis_type = PrecipitationAnalysis::from_code(analysis_code).ok_or(
        MalformedObservation::UnknownCode {
            field: "precipitation_analysis_type",
            code: analysis_code,
        },
    )?;

    Ok(Observation {
        epoch: required(values, 0, "epoch")? as i64,
        wind_lull: optional(values, 1),
        wind_avg: optional(values, 2),
        wind_gust: optional(values, 3),
        wind_direction: required(values, 4, "wind_direction")? as i32,
        wind_sample_interval: required(values, 5, "wind_sample_interval")? as i32,
        pressure: optional(values, 6),
        air_temperature: optional(values, 7),
        relative_humidity: required(values, 8, "relative_humidity")? as i32,
        illuminance: required(values, 9, "illuminance")? as i32,
        uv_index: optional(values, 10),
        solar_radiation: required(values, 11, "solar_radiation")? as i32,
        rain_accumulation: optional(values, 12),
        precipitation_type,
        average_strike_distance: required(values, 14, "average_strike_distance")? as i32,
        strike_count: required(values, 15, "strike_count")? as i32,
        battery: optional(values, 16),
        report_interval: required(values, 17, "report_interval")? as i32,
        local_day_rain_accumulation: optional(values, 18),
        rain_accumulation_final: optional(values, 19),
        local_day_rain_accumulation_final: optional(values, 20),
        precipitation_analysis_type,
    })
}

/// A value that must be present because the target field is integral.
fn required(
    values: &[Option<f64>],
    index: usize,
    field: &'static str,
) -> Result<f64, MalformedObservation> {
    values[index].ok_or(MalformedObservation::MissingValue(field))
}

/// A floating-point value that defaults to 0.0 when absent.
fn optional(values: &[Option<f64>], index: usize) -> f64 {
    values[index].unwrap_or(0.0)
}
