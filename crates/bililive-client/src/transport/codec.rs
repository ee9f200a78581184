//! WebSocket message codec for the transport layer.
//!
//! - Binary and text messages => frame bytes
//! - Ping/Pong are surfaced so the transport can skip them
//! - Close ends the stream

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Frame(Bytes),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Binary(b) => Inbound::Frame(Bytes::from(b)),
        Message::Text(s) => Inbound::Frame(Bytes::from(s.into_bytes())),
        Message::Ping(v) => Inbound::Ping(v),
        Message::Pong(v) => Inbound::Pong(v),
        Message::Close(_) => Inbound::Close,
        Message::Frame(f) => Inbound::Frame(Bytes::from(f.into_data())),
    }
}

pub fn encode(frame: Bytes) -> Message {
    Message::Binary(frame.to_vec())
}
