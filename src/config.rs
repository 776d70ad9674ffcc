use std::env;

const DEFAULT_WS_URL: &str = "wss://ws.weatherflow.com/swd/data";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: String,
    pub station_id: u32,
    pub device_id: u32,
    pub url: String,
}

impl ClientConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let token = env::var("WEATHERFLOW_TOKEN")
            .map_err(|_| "WEATHERFLOW_TOKEN environment variable not set")?;
        if token.trim().is_empty() {
            return Err("WEATHERFLOW_TOKEN is empty".into());
        }

        let station_id = parse_id("WEATHERFLOW_STATION_ID")?;
        let device_id = parse_id("WEATHERFLOW_DEVICE_ID")?;

        // Optional endpoint override, used with a local replay server
        let url = env::var("WEATHERFLOW_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());

        Ok(ClientConfig {
            token,
            station_id,
            device_id,
            url,
        })
    }
}

fn parse_id(name: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let raw = env::var(name).map_err(|_| format!("{} environment variable not set", name))?;
    let id: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a positive integer, got '{}'", name, raw))?;
    if id == 0 {
        return Err(format!("{} must be a positive integer", name).into());
    }
    Ok(id)
}
