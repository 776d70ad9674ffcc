use serde::Deserialize;
use time::OffsetDateTime;

use crate::protocol::observation::{decode_observation, MalformedObservation};
use crate::utils::epoch_to_datetime;

/// A single decoded Tempest observation.
///
/// Built from the positional `obs` array of an `obs_st` message, see
/// `protocol::observation::decode_observation` for the slot layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Observation time (seconds UTC).
    pub epoch: i64,
    /// Wind lull (m/s).
    pub wind_lull: f64,
    /// Wind average (m/s).
    pub wind_avg: f64,
    /// Wind gust (m/s).
    pub wind_gust: f64,
    /// Wind direction (degrees).
    pub wind_direction: i32,
    /// Wind sample interval (seconds).
    pub wind_sample_interval: i32,
    /// Station pressure (mb).
    pub pressure: f64,
    /// Air temperature (°C).
    pub air_temperature: f64,
    /// Relative humidity (%).
    pub relative_humidity: i32,
    /// Illuminance (lux).
    pub illuminance: i32,
    /// UV index.
    pub uv_index: f64,
    /// Solar radiation (W/m²).
    pub solar_radiation: i32,
    /// Rain accumulation over the report interval (mm).
    pub rain_accumulation: f64,
    pub precipitation_type: PrecipitationType,
    /// Average lightning strike distance (km).
    pub average_strike_distance: i32,
    pub strike_count: i32,
    /// Battery voltage (V).
    pub battery: f64,
    /// Report interval (minutes).
    pub report_interval: i32,
    /// Local day rain accumulation (mm).
    pub local_day_rain_accumulation: f64,
    /// Rain accumulation after Rain Check analysis (mm).
    pub rain_accumulation_final: f64,
    /// Local day rain accumulation after Rain Check analysis (mm).
    pub local_day_rain_accumulation_final: f64,
    pub precipitation_analysis_type: PrecipitationAnalysis,
}

impl Observation {
    /// The time at which the observation occurred.
    pub fn occurred_at(&self) -> OffsetDateTime {
        epoch_to_datetime(self.epoch)
    }
}

/// Precipitation type code carried in observation slot 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationType {
    None,
    Rain,
    Hail,
}

impl PrecipitationType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PrecipitationType::None),
            1 => Some(PrecipitationType::Rain),
            2 => Some(PrecipitationType::Hail),
            _ => None,
        }
    }
}

/// Rain Check analysis code carried in observation slot 21.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationAnalysis {
    None,
    RainCheckDisplayOn,
    RainCheckDisplayOff,
}

impl PrecipitationAnalysis {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PrecipitationAnalysis::None),
            1 => Some(PrecipitationAnalysis::RainCheckDisplayOn),
            2 => Some(PrecipitationAnalysis::RainCheckDisplayOff),
            _ => None,
        }
    }
}

/// What a listen acknowledgement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenTarget {
    Station,
    Device,
}

/// Acknowledgement of a listen start/stop command. [type = ack]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Acknowledgement {
    #[serde(rename = "type")]
    pub message_type: String,
    /// String form of the id sent with the listen command.
    pub id: String,
}

impl Acknowledgement {
    /// Classify which subscription this acknowledgement answers.
    ///
    /// The service echoes back the id we sent, so an ack matching the
    /// station id belongs to the events subscription and everything else
    /// to the device subscription.
    pub fn target(&self, station_id: u32) -> ListenTarget {
        if self.id == station_id.to_string() {
            ListenTarget::Station
        } else {
            ListenTarget::Device
        }
    }
}

/// Lightning strike event. [type = evt_strike]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightningStrikeEvent {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub hub_sn: String,
    #[serde(default)]
    pub source: String,
    pub device_id: u32,
    /// Raw event values: [epoch seconds, distance km, energy, unknown].
    pub evt: [i64; 4],
}

impl LightningStrikeEvent {
    /// The time at which the strike occurred.
    pub fn occurred_at(&self) -> OffsetDateTime {
        epoch_to_datetime(self.evt[0])
    }

    /// The strike distance (km).
    pub fn distance(&self) -> i64 {
        self.evt[1]
    }

    /// The strike energy.
    pub fn energy(&self) -> i64 {
        self.evt[2]
    }

    /// Trailing event value with unknown meaning.
    pub fn unknown(&self) -> i64 {
        self.evt[3]
    }
}

/// Rain start event. [type = evt_precip]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RainStartEvent {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub hub_sn: String,
    #[serde(default)]
    pub source: String,
    pub device_id: u32,
    /// Raw event values: [epoch seconds].
    pub evt: [i64; 1],
}

impl RainStartEvent {
    /// The time at which rain started.
    pub fn occurred_at(&self) -> OffsetDateTime {
        epoch_to_datetime(self.evt[0])
    }
}

/// Device status carried by the status variant of `obs_st`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Status {
    pub status_code: i32,
    pub status_message: String,
}

/// Aggregate summary carried by both `obs_st` variants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Summary {
    pub pressure_trend: String,
    pub strike_count_1h: u32,
    pub strike_count_3h: u32,
    pub precip_total_1h: f64,
    /// Last lightning strike distance (km).
    pub strike_last_dist: i64,
    /// Last lightning strike time (seconds UTC).
    pub strike_last_epoch: i64,
    pub precip_accum_local_yesterday: f64,
    pub precip_accum_local_yesterday_final: f64,
    pub precip_analysis_type_yesterday: i32,
    /// Feels-like temperature (°C).
    pub feels_like: f64,
    /// Heat index (°C).
    pub heat_index: f64,
    /// Wind chill (°C).
    pub wind_chill: f64,
}

/// Status variant of an `obs_st` message: carries a `status` object
/// alongside the summary and observations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: Status,
    pub device_id: u32,
    #[serde(default)]
    pub source: String,
    pub summary: Summary,
    /// Raw positional observation arrays.
    pub obs: Vec<Vec<Option<f64>>>,
}

impl StatusMessage {
    /// Decode the first observation array carried by this message.
    pub fn first_observation(&self) -> Result<Observation, MalformedObservation> {
        let values = self.obs.first().ok_or(MalformedObservation::Empty)?;
        decode_observation(values)
    }
}

/// Summary variant of an `obs_st` message: no `status` object, but carries
/// the device serial numbers and firmware revision.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub summary: Summary,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub hub_sn: String,
    #[serde(default)]
    pub source: String,
    pub device_id: u32,
    #[serde(default)]
    pub firmware_revision: u32,
    /// Raw positional observation arrays.
    pub obs: Vec<Vec<Option<f64>>>,
}

impl SummaryMessage {
    /// Decode the first observation array carried by this message.
    pub fn first_observation(&self) -> Result<Observation, MalformedObservation> {
        let values = self.obs.first().ok_or(MalformedObservation::Empty)?;
        decode_observation(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_target_matches_station_id() {
        let ack = Acknowledgement {
            message_type: "ack".to_string(),
            id: "40983".to_string(),
        };
        assert_eq!(ack.target(40983), ListenTarget::Station);
        assert_eq!(ack.target(12345), ListenTarget::Device);
    }

    #[test]
    fn summary_deserializes_from_wire_names() {
        let json = r#"{"pressure_trend":"steady","strike_count_1h":6,"strike_count_3h":6,
            "precip_total_1h":0.0,"strike_last_dist":37,"strike_last_epoch":1597160656,
            "precip_accum_local_yesterday":0.0,"precip_accum_local_yesterday_final":0.0,
            "precip_analysis_type_yesterday":1,"feels_like":26.2,"heat_index":26.2,"wind_chill":26.2}"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.pressure_trend, "steady");
        assert_eq!(summary.strike_count_1h, 6);
        assert_eq!(summary.strike_last_epoch, 1597160656);
        assert_eq!(summary.wind_chill, 26.2);
    }

    #[test]
    fn strike_event_derives_values_from_raw_array() {
        let event = LightningStrikeEvent {
            message_type: "evt_strike".to_string(),
            serial_number: "AR-00004049".to_string(),
            hub_sn: "HB-00000043".to_string(),
            source: "enhanced".to_string(),
            device_id: 1,
            evt: [1597165492, 42, -1714, 1],
        };
        assert_eq!(event.occurred_at().unix_timestamp(), 1597165492);
        assert_eq!(event.distance(), 42);
        assert_eq!(event.energy(), -1714);
        assert_eq!(event.unknown(), 1);
    }

    #[test]
    fn out_of_range_precipitation_codes_are_rejected() {
        assert_eq!(PrecipitationType::from_code(2), Some(PrecipitationType::Hail));
        assert_eq!(PrecipitationType::from_code(3), None);
        assert_eq!(
            PrecipitationAnalysis::from_code(1),
            Some(PrecipitationAnalysis::RainCheckDisplayOn)
        );
        assert_eq!(PrecipitationAnalysis::from_code(-1), None);
    }
}
