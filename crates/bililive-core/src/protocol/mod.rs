//! Protocol modules (frame header, batch walking, event tags).
//!
//! The gateway speaks length-prefixed binary frames:
//! - `frame`: 16-byte big-endian header encode/decode and payload classification.
//! - `batch`: zlib inflation and sub-frame walking for compressed batches.
//! - `event`: JSON payload parsing and command tag normalization.
//! - `cmd`: well-known command tags.
//!
//! All parsers are panic-free: malformed input is reported as `BiliLiveError`
//! instead of panicking or indexing raw buffers.

pub mod batch;
pub mod cmd;
pub mod event;
pub mod frame;
