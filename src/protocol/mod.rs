pub mod commands;
pub mod dispatch;
pub mod observation;

pub use dispatch::{classify, decode_frame, Dispatcher, Event, MessageKind};
pub use observation::decode_observation;
