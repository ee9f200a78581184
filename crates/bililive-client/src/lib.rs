//! bililive client library entry.
//!
//! This crate wires the transport, identity resolution, dispatch table and
//! session lifecycle into a live chat client. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod config;
pub mod dispatch;
pub mod identity;
pub mod obs;
pub mod session;
pub mod transport;

pub use dispatch::{Dispatcher, Event, Flow, Handler};
pub use session::{Session, SessionHandle, SessionState};
