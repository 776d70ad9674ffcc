/// Frame classification and typed message dispatch
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{
    Acknowledgement, LightningStrikeEvent, RainStartEvent, StatusMessage, SummaryMessage,
};
use crate::protocol::observation::MalformedObservation;

/// The message kinds the service sends, one per wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    ConnectionOpened,
    Ack,
    Observation,
    LightningStrike,
    RainStart,
    StationOnline,
    StationOffline,
    Unknown,
}

impl MessageKind {
    /// Map a `type` tag value to its message kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "connection_opened" => MessageKind::ConnectionOpened,
            "ack" => MessageKind::Ack,
            "obs_st" => MessageKind::Observation,
            "evt_strike" => MessageKind::LightningStrike,
            "evt_precip" => MessageKind::RainStart,
            "evt_station_online" => MessageKind::StationOnline,
            "evt_station_offline" => MessageKind::StationOffline,
            _ => MessageKind::Unknown,
        }
    }

    /// Fallback classification by probing the raw text for quoted tags,
    /// for frames whose JSON does not parse.
    fn from_probe(frame: &str) -> Self {
        const TAGS: [(&str, MessageKind); 7] = [
            ("\"connection_opened\"", MessageKind::ConnectionOpened),
            ("\"ack\"", MessageKind::Ack),
            ("\"obs_st\"", MessageKind::Observation),
            ("\"evt_strike\"", MessageKind::LightningStrike),
            ("\"evt_precip\"", MessageKind::RainStart),
            ("\"evt_station_online\"", MessageKind::StationOnline),
            ("\"evt_station_offline\"", MessageKind::StationOffline),
        ];
        for (tag, kind) in TAGS {
            if frame.contains(tag) {
                return kind;
            }
        }
        MessageKind::Unknown
    }
}

/// Determine the kind of a raw frame.
///
/// The parsed `type` value is authoritative; the substring probe only
/// runs for frames that are not valid JSON.
pub fn classify(frame: &str) -> MessageKind {
    match serde_json::from_str::<Value>(frame) {
        Ok(value) => value
            .get("type")
            .and_then(Value::as_str)
            .map(MessageKind::from_tag)
            .unwrap_or(MessageKind::Unknown),
        Err(_) => MessageKind::from_probe(frame),
    }
}

/// Reasons a frame of a recognized kind fails to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("{kind} frame does not match the expected shape: {source}")]
    SchemaMismatch {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    MalformedObservation(#[from] MalformedObservation),
}

/// One decoded inbound frame, tagged by kind.
///
/// Presence-only signals carry the raw frame text, as do frames nothing
/// could be done with; no inbound frame is dropped without an event.
#[derive(Debug, Clone)]
pub enum Event {
    ConnectionOpened(String),
    Ack(Acknowledgement),
    Status(StatusMessage),
    Summary(SummaryMessage),
    LightningStrike(LightningStrikeEvent),
    RainStart(RainStartEvent),
    StationOnline(String),
    StationOffline(String),
    Unknown(String),
    DecodeError { frame: String, reason: String },
}

impl Event {
    fn decode_failure(frame: &str, error: DecodeError) -> Self {
        Event::DecodeError {
            frame: frame.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Decode one raw text frame into its event.
///
/// Never fails: unrecognized kinds become `Event::Unknown` and decode
/// failures become `Event::DecodeError` carrying the original frame.
pub fn decode_frame(frame: &str) -> Event {
    match classify(frame) {
        MessageKind::ConnectionOpened => Event::ConnectionOpened(frame.to_string()),
        MessageKind::StationOnline => Event::StationOnline(frame.to_string()),
        MessageKind::StationOffline => Event::StationOffline(frame.to_string()),
        MessageKind::Unknown => Event::Unknown(frame.to_string()),
        MessageKind::Ack => decode_message::<Acknowledgement>("ack", frame)
            .map(Event::Ack)
            .unwrap_or_else(|error| Event::decode_failure(frame, error)),
        MessageKind::LightningStrike => decode_message::<LightningStrikeEvent>("evt_strike", frame)
            .map(Event::LightningStrike)
            .unwrap_or_else(|error| Event::decode_failure(frame, error)),
        MessageKind::RainStart => decode_message::<RainStartEvent>("evt_precip", frame)
            .map(Event::RainStart)
            .unwrap_or_else(|error| Event::decode_failure(frame, error)),
        MessageKind::Observation => decode_observation_message(frame)
            .unwrap_or_else(|error| Event::decode_failure(frame, error)),
    }
}

/// Decode an `obs_st` frame into its status or summary variant.
///
/// The variant is chosen by the presence of a `status` key on the generic
/// value, before any structural decoding, so a status frame never half
/// decodes into the summary shape.
fn decode_observation_message(frame: &str) -> Result<Event, DecodeError> {
    let value: Value = serde_json::from_str(frame).map_err(DecodeError::InvalidJson)?;
    if value.get("status").is_some() {
        let message: StatusMessage = typed("obs_st status", value)?;
        message.first_observation()?;
        Ok(Event::Status(message))
    } else {
        let message: SummaryMessage = typed("obs_st summary", value)?;
        message.first_observation()?;
        Ok(Event::Summary(message))
    }
}

fn decode_message<T: DeserializeOwned>(
    kind: &'static str,
    frame: &str,
) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_str(frame).map_err(DecodeError::InvalidJson)?;
    typed(kind, value)
}

fn typed<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::SchemaMismatch { kind, source })
}

/// Fans decoded events out to subscribed consumers.
///
/// Decoding runs on whatever task calls `dispatch`; since the connection
/// feeds frames from a single loop, events reach every subscriber in
/// arrival order.
pub struct Dispatcher {
    subscribers: Vec<mpsc::UnboundedSender<Event>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            subscribers: Vec::new(),
        }
    }

    /// Register a consumer and return its event stream.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Decode one frame and emit the event to every subscriber.
    pub fn dispatch(&self, frame: &str) {
        debug!("Frame received: {}", frame);
        let event = decode_frame(frame);
        for subscriber in &self.subscribers {
            // A closed receiver only means that consumer went away.
            let _ = subscriber.send(event.clone());
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new()
    }
}
