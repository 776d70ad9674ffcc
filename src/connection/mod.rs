pub mod websocket;

pub use websocket::{build_url, run_client};
