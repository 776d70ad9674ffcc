//! Tempest websocket telemetry client
//!
//! Connects to the WeatherFlow Tempest websocket service, subscribes to a
//! station and a device, and decodes the inbound event stream into typed
//! records.

pub mod config;
pub mod connection;
pub mod models;
pub mod protocol;
pub mod utils;
