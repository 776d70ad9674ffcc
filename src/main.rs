use log::{error, info, warn};

use rust_tempest_ws_client::config::ClientConfig;
use rust_tempest_ws_client::connection::run_client;
use rust_tempest_ws_client::models::{ListenTarget, Observation};
use rust_tempest_ws_client::protocol::{Dispatcher, Event};
use rust_tempest_ws_client::utils::format_datetime;

/// Log one decoded event.
///
/// Every inbound frame ends up here in some form, decoded or not.
fn log_event(event: &Event, config: &ClientConfig) {
    match event {
        Event::ConnectionOpened(frame) => info!("Connection opened: {}", frame),
        Event::Ack(ack) => {
            let target = match ack.target(config.station_id) {
                ListenTarget::Station => "station",
                ListenTarget::Device => "device",
            };
            info!("Start/stop listening acknowledged for {} (id {})", target, ack.id);
        }
        Event::Status(message) => {
            info!(
                "Status {} ({}) from device {}",
                message.status.status_code, message.status.status_message, message.device_id
            );
            info!(
                "  Pressure trend: {}, feels like {:.1}°C",
                message.summary.pressure_trend, message.summary.feels_like
            );
            match message.first_observation() {
                Ok(obs) => log_observation(&obs),
                Err(e) => warn!("Observation discarded: {}", e),
            }
        }
        Event::Summary(message) => {
            info!(
                "Summary from {} (firmware {})",
                message.serial_number, message.firmware_revision
            );
            info!(
                "  Strikes last hour: {} ({} in 3h), precip last hour: {:.2} mm",
                message.summary.strike_count_1h,
                message.summary.strike_count_3h,
                message.summary.precip_total_1h
            );
            match message.first_observation() {
                Ok(obs) => log_observation(&obs),
                Err(e) => warn!("Observation discarded: {}", e),
            }
        }
        Event::LightningStrike(event) => {
            info!(
                "Lightning strike at {}: distance {} km, energy {}",
                format_datetime(&event.occurred_at()),
                event.distance(),
                event.energy()
            );
        }
        Event::RainStart(event) => {
            info!("Rain started at {}", format_datetime(&event.occurred_at()));
        }
        Event::StationOnline(frame) => info!("Station online: {}", frame),
        Event::StationOffline(frame) => info!("Station offline: {}", frame),
        Event::Unknown(frame) => info!("Unhandled message: {}", frame),
        Event::DecodeError { frame, reason } => {
            warn!("Failed to decode frame ({}): {}", reason, frame);
        }
    }
}

fn log_observation(obs: &Observation) {
    info!("Observation at {}:", format_datetime(&obs.occurred_at()));
    info!("  Air temperature: {:.1}°C", obs.air_temperature);
    info!("  Relative humidity: {}%", obs.relative_humidity);
    info!("  Pressure: {:.1} mb", obs.pressure);
    info!(
        "  Wind avg: {:.2} m/s (lull {:.2}, gust {:.2}) from {}°",
        obs.wind_avg, obs.wind_lull, obs.wind_gust, obs.wind_direction
    );
    info!(
        "  Illuminance: {} lux, solar radiation: {} W/m², UV index: {:.2}",
        obs.illuminance, obs.solar_radiation, obs.uv_index
    );
    info!(
        "  Rain accumulation: {:.2} mm ({:?})",
        obs.rain_accumulation, obs.precipitation_type
    );
    info!(
        "  Strikes: {} (avg distance {} km)",
        obs.strike_count, obs.average_strike_distance
    );
    info!("  Battery: {:.2} V", obs.battery);
    info!("  Next report in {} minutes", obs.report_interval);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match ClientConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    info!(
        "Starting Tempest websocket client for station {} / device {}",
        config.station_id, config.device_id
    );

    // Handle Ctrl+C gracefully
    let (tx, mut shutdown) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        let _ = tx.send(true);
    });

    // Consume and log every event the dispatcher emits
    let mut dispatcher = Dispatcher::new();
    let mut events = dispatcher.subscribe();
    let consumer_config = config.clone();
    let consumer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event, &consumer_config);
        }
    });

    match run_client(&config, &dispatcher, &mut shutdown).await {
        Ok(_) => info!("Client stopped. Exiting gracefully."),
        Err(e) => error!("Fatal error: {}", e),
    }

    // Dropping the dispatcher ends the consumer's event stream
    drop(dispatcher);
    let _ = consumer.await;

    Ok(())
}
