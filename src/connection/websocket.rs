/// Websocket link to the Tempest data service
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::config::ClientConfig;
use crate::protocol::commands;
use crate::protocol::dispatch::Dispatcher;

const MAX_RETRIES: usize = 100;
const WAIT_BETWEEN_RETRIES: u64 = 5;

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Build the websocket endpoint URL with the access token attached.
pub fn build_url(config: &ClientConfig) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&config.url)?;
    url.query_pairs_mut().append_pair("token", &config.token);
    Ok(url)
}

/// Connect to the service and pump frames into the dispatcher
///
/// Maintains the connection with a bounded retry loop. Subscriptions are
/// sent on every (re)connect since the service forgets them when the
/// socket drops. On shutdown the listen stop commands go out before the
/// socket closes.
///
/// # Arguments
/// * `config` - Access token and subscription ids
/// * `dispatcher` - Receives every inbound text frame
/// * `shutdown` - Flips to true when the client should stop
///
/// # Returns
/// Ok after a clean shutdown, or an error once retries are exhausted
pub async fn run_client(
    config: &ClientConfig,
    dispatcher: &Dispatcher,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = build_url(config)?;

    for attempt in 0..MAX_RETRIES {
        if *shutdown.borrow() {
            return Ok(());
        }

        let stream = match connect_async(url.as_str()).await {
            Ok((stream, response)) => {
                info!("Connected to {} ({})", config.url, response.status());
                stream
            }
            Err(e) => {
                error!("Attempt {}: websocket connect error: {}", attempt + 1, e);
                sleep(Duration::from_secs(WAIT_BETWEEN_RETRIES)).await;
                continue;
            }
        };

        let (mut writer, mut reader) = stream.split();

        // The service forgets subscriptions across connections.
        if let Err(e) = send_subscriptions(&mut writer, config).await {
            error!("Failed to send listen commands: {}", e);
            sleep(Duration::from_secs(WAIT_BETWEEN_RETRIES)).await;
            continue;
        }

        match pump_frames(&mut reader, dispatcher, shutdown).await {
            Pump::Shutdown => {
                info!("Stopping subscriptions");
                if let Err(e) = send_unsubscriptions(&mut writer, config).await {
                    warn!("Failed to send listen stop commands: {}", e);
                }
                let _ = writer.close().await;
                return Ok(());
            }
            Pump::Disconnected => {
                warn!("Connection lost, reconnecting");
            }
        }

        if attempt < MAX_RETRIES - 1 {
            sleep(Duration::from_secs(WAIT_BETWEEN_RETRIES)).await;
        }
    }

    Err("Max retries exceeded".into())
}

/// Why the frame pump returned.
enum Pump {
    Shutdown,
    Disconnected,
}

/// Forward inbound text frames to the dispatcher until the connection
/// drops or shutdown is requested.
async fn pump_frames(
    reader: &mut WsReader,
    dispatcher: &Dispatcher,
    shutdown: &mut watch::Receiver<bool>,
) -> Pump {
    loop {
        tokio::select! {
            message = reader.next() => match message {
                Some(Ok(Message::Text(frame))) => dispatcher.dispatch(&frame),
                Some(Ok(Message::Close(_))) | None => {
                    return Pump::Disconnected;
                }
                Some(Ok(_)) => {} // ping/pong and binary frames carry no data for us
                Some(Err(e)) => {
                    error!("Websocket receive error: {}", e);
                    return Pump::Disconnected;
                }
            },
            _ = shutdown.changed() => {
                return Pump::Shutdown;
            }
        }
    }
}

async fn send_subscriptions(
    writer: &mut WsWriter,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = commands::listen_start(config.device_id).to_frame()?;
    writer.send(Message::Text(device)).await?;

    let station = commands::listen_start_events(config.station_id).to_frame()?;
    writer.send(Message::Text(station)).await?;

    Ok(())
}

async fn send_unsubscriptions(
    writer: &mut WsWriter,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = commands::listen_stop(config.device_id).to_frame()?;
    writer.send(Message::Text(device)).await?;

    let station = commands::listen_stop_events(config.station_id).to_frame()?;
    writer.send(Message::Text(station)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig {
            token: "secret-token".to_string(),
            station_id: 40983,
            device_id: 79424,
            url: "wss://ws.weatherflow.com/swd/data".to_string(),
        }
    }

    #[test]
    fn url_carries_the_access_token() {
        let url = build_url(&test_config()).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://ws.weatherflow.com/swd/data?token=secret-token"
        );
    }

    #[test]
    fn url_token_is_query_escaped() {
        let mut config = test_config();
        config.token = "a b&c".to_string();
        let url = build_url(&config).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://ws.weatherflow.com/swd/data?token=a+b%26c"
        );
    }
}
