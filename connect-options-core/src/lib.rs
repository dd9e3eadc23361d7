//! Capability types shared by the calling and serving side of
//! `connect-options`.
//!
//! The configuration core never serializes, compresses, or transports
//! anything itself. It stores the capabilities defined here by name and hands
//! them to the call-execution logic.
//!
//! ## Modules
//!
//! - [`error`]: Status codes, [`Status`], and [`CodecError`]
//! - [`codec`]: The serialization [`Codec`] capability
//! - [`compression`]: The [`Compressor`] capability and the gzip implementation

mod codec;
mod compression;
mod error;

pub use codec::*;
pub use compression::*;
pub use error::*;
