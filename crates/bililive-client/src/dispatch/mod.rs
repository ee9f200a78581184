//! Dispatcher module exports.
//!
//! Re-exports the dispatch table, the handler capability and the dispatched
//! event shape so downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod event;

pub use dispatcher::{Dispatcher, Flow, Handler};
pub use event::{Danmaku, Event, Gift};
