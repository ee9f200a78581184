//! bililive core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts of the live chat gateway: the
//! 16-byte frame header, compressed batch walking, and event tag
//! normalization. It carries no runtime or network dependencies so the
//! client, tests and tooling can share it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input from the server surfaces as `BiliLiveError`/`Result`
//! so one bad frame cannot crash the receive loop.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BiliLiveError, ErrorKind, Result};
