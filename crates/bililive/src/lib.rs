//! Top-level facade crate for bililive.
//!
//! Re-exports the protocol core and the client library so users can depend on a single crate.

pub mod core {
    pub use bililive_core::*;
}

pub mod client {
    pub use bililive_client::*;
}
