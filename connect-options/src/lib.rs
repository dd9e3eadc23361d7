//! Option directives and interceptor chains for Connect clients and handlers.
//!
//! Before any traffic flows, every client and every handler resolves an
//! ordered list of options into one immutable configuration record:
//!
//! - [`ClientConfig`] for the calling side
//! - [`HandlerConfig`] for the serving side
//!
//! The same options work on both sides. Each one updates only the record it
//! is applied to, and they are applied in the order supplied.
//!
//! ## Example
//!
//! ```ignore
//! use connect_options::{
//!     ClientConfig, HandlerConfig, HeaderInterceptor, SharedInterceptor, with_codec,
//!     with_gzip, with_interceptors, with_read_max_bytes,
//! };
//! use std::sync::Arc;
//!
//! let auth: SharedInterceptor = Arc::new(HeaderInterceptor::new("authorization", "Bearer t"));
//!
//! let client = ClientConfig::builder("acme.user.v1.UserService/GetUser")
//!     .apply(with_codec("proto", ProtoCodec))
//!     .apply(with_gzip())
//!     .apply(with_interceptors([auth]))
//!     .build();
//!
//! let handler = HandlerConfig::builder("acme.user.v1.UserService/GetUser", "acme.user.v1.UserService")
//!     .apply(with_codec("proto", ProtoCodec))
//!     .apply(with_codec("json", JsonCodec))
//!     .apply(with_read_max_bytes(4 * 1024 * 1024))
//!     .build();
//! ```
//!
//! ## Options
//!
//! | Option | Client | Handler |
//! |--------|--------|---------|
//! | [`with_replace_procedure_prefix`] | rewrites the procedure | rewrites the procedure, clears the registration name |
//! | [`with_read_max_bytes`] | limits responses | limits requests |
//! | [`with_codec`] | sets the single codec | adds to the codec registry |
//! | [`with_compressor`] / [`with_gzip`] | adds to the compressor registry | adds to the compressor registry |
//! | [`with_interceptors`] | extends the chain | extends the chain |
//!
//! Options never fail. An empty registration name, a missing capability, a
//! non-matching prefix, or an empty interceptor list leaves the record
//! unchanged.
//!
//! ## Interceptors
//!
//! Interceptors compose like an onion: the first one registered is the
//! outermost layer, first to see outgoing data and last to see incoming data,
//! for unary calls and streams alike. See [`Chain`] for details.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `compression-gzip` (default) | Built-in gzip compressor and [`with_gzip`] | `flate2` |
//! | `tracing` (default) | Debug/trace events while options are applied | `tracing` |

mod chain;
mod config;
mod interceptor;
mod options;
mod procedure;
mod registry;

#[cfg(test)]
mod test_support;

pub use chain::{Chain, chain_with};
pub use config::{ClientConfig, ClientConfigBuilder, HandlerConfig, HandlerConfigBuilder};
pub use interceptor::{
    BoxFuture, FnInterceptor, HeaderInterceptor, Interceptor, Receiver, Sender,
    SharedInterceptor, StreamHandles, UnaryFunc, UnaryNext, UnaryRequest, UnaryResponse,
};
pub use options::{
    ClientOption, CodecOption, CompressorOption, ConnectOption, HandlerOption,
    InterceptorsOption, ReadMaxBytes, ReplaceProcedurePrefix, apply_client_options,
    apply_handler_options, with_codec, with_compressor, with_interceptors, with_read_max_bytes,
    with_replace_procedure_prefix, without_codec, without_compressor,
};
#[cfg(feature = "compression-gzip")]
pub use options::with_gzip;
pub use procedure::replace_prefix;
pub use registry::{CodecRegistry, CompressorRegistry, Registration, Registry};

// Re-export capability types that users need
pub use connect_options_core::{
    BoxedCodec, BoxedCompressor, COMPRESSION_GZIP, Code, Codec, CodecError, Compressor, Status,
};
#[cfg(feature = "compression-gzip")]
pub use connect_options_core::GzipCompressor;

pub use bytes::Bytes;
