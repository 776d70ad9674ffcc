/// Outbound listen command construction
use serde::{Deserialize, Serialize};

/// Start or stop observation delivery for one device.
///
/// The service echoes `id` back in the acknowledgement, which is how the
/// response is correlated to the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    #[serde(rename = "type")]
    pub message_type: String,
    pub device_id: u32,
    pub id: String,
}

impl DeviceCommand {
    /// Serialize to an outbound text frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Start or stop event delivery for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCommand {
    #[serde(rename = "type")]
    pub message_type: String,
    pub station_id: u32,
    pub id: String,
}

impl StationCommand {
    /// Serialize to an outbound text frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Subscribe to observations from a device.
pub fn listen_start(device_id: u32) -> DeviceCommand {
    device_command("listen_start", device_id)
}

/// Unsubscribe from observations from a device.
pub fn listen_stop(device_id: u32) -> DeviceCommand {
    device_command("listen_stop", device_id)
}

/// Subscribe to events from a station.
pub fn listen_start_events(station_id: u32) -> StationCommand {
    station_command("listen_start_events", station_id)
}

/// Unsubscribe from events from a station.
pub fn listen_stop_events(station_id: u32) -> StationCommand {
    station_command("listen_stop_events", station_id)
}

fn device_command(message_type: &str, device_id: u32) -> DeviceCommand {
    DeviceCommand {
        message_type: message_type.to_string(),
        device_id,
        id: device_id.to_string(),
    }
}

fn station_command(message_type: &str, station_id: u32) -> StationCommand {
    StationCommand {
        message_type: message_type.to_string(),
        station_id,
        id: station_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_start_round_trips_through_the_wire_format() {
        let frame = listen_start(79424).to_frame().unwrap();
        let decoded: DeviceCommand = serde_json::from_str(&frame).unwrap();
        assert_eq!(decoded.message_type, "listen_start");
        assert_eq!(decoded.device_id, 79424);
        assert_eq!(decoded.id, "79424");
    }

    #[test]
    fn device_commands_use_the_wire_field_names() {
        let frame = listen_stop(79424).to_frame().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "listen_stop");
        assert_eq!(value["device_id"], 79424);
        assert_eq!(value["id"], "79424");
    }

    #[test]
    fn station_commands_carry_the_station_id() {
        let start = listen_start_events(40983);
        assert_eq!(start.message_type, "listen_start_events");
        assert_eq!(start.station_id, 40983);
        assert_eq!(start.id, "40983");

        let stop = listen_stop_events(40983);
        assert_eq!(stop.message_type, "listen_stop_events");
        let value: serde_json::Value =
            serde_json::from_str(&stop.to_frame().unwrap()).unwrap();
        assert_eq!(value["station_id"], 40983);
    }
}
