//! Serialization codec capability.
//!
//! A [`Codec`] turns messages into bytes and back. Codecs are registered by
//! name: a client holds exactly one, a handler holds one per name it accepts
//! and lets the caller pick at invocation time.
//!
//! Messages cross the trait as `dyn Any` so that one codec value can serve
//! every request and response type of a procedure. Implementations downcast
//! to the message types they understand and report
//! [`CodecError::UnsupportedMessage`] for anything else.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::CodecError;

/// A serialization method for RPC messages.
///
/// # Example
///
/// ```ignore
/// use connect_options_core::{Codec, CodecError};
/// use bytes::Bytes;
/// use std::any::Any;
///
/// struct Utf8Codec;
///
/// impl Codec for Utf8Codec {
///     fn marshal(&self, message: &dyn Any) -> Result<Bytes, CodecError> {
///         let text = message
///             .downcast_ref::<String>()
///             .ok_or(CodecError::UnsupportedMessage("expected String"))?;
///         Ok(Bytes::copy_from_slice(text.as_bytes()))
///     }
///
///     fn unmarshal(&self, data: &[u8], message: &mut dyn Any) -> Result<(), CodecError> {
///         // ...
///     }
/// }
/// ```
pub trait Codec: Send + Sync + 'static {
    /// Encode a message.
    fn marshal(&self, message: &dyn Any) -> Result<Bytes, CodecError>;

    /// Decode `data` into an existing message.
    fn unmarshal(&self, data: &[u8], message: &mut dyn Any) -> Result<(), CodecError>;
}

/// A shared, type-erased codec.
#[derive(Clone)]
pub struct BoxedCodec(Arc<dyn Codec>);

impl BoxedCodec {
    /// Create a new boxed codec.
    pub fn new<C: Codec>(codec: C) -> Self {
        BoxedCodec(Arc::new(codec))
    }

    /// Encode a message.
    pub fn marshal(&self, message: &dyn Any) -> Result<Bytes, CodecError> {
        self.0.marshal(message)
    }

    /// Decode `data` into an existing message.
    pub fn unmarshal(&self, data: &[u8], message: &mut dyn Any) -> Result<(), CodecError> {
        self.0.unmarshal(data, message)
    }

    /// Returns true if both handles point at the same codec instance.
    pub fn ptr_eq(&self, other: &BoxedCodec) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<C: Codec> From<C> for BoxedCodec {
    fn from(codec: C) -> Self {
        BoxedCodec::new(codec)
    }
}

impl std::fmt::Debug for BoxedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedCodec").finish_non_exhaustive()
    }
}
