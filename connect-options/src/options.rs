//! Option directives for clients and handlers.
//!
//! An option is a self-contained piece of configuration that knows how to
//! update a [`ClientConfig`], a [`HandlerConfig`], or both. Options never see
//! each other, only the record they are applied to, and they are applied in
//! the order they are supplied.
//!
//! Every option in this module implements both [`ClientOption`] and
//! [`HandlerOption`], so one list can configure both sides of a procedure:
//!
//! ```ignore
//! use connect_options::{ClientConfig, HandlerConfig, with_gzip, with_interceptors};
//!
//! let shared = [with_interceptors([auth.clone(), logging.clone()])];
//! let client = ClientConfig::builder("pkg.Svc/Method").apply_all(&shared).build();
//! let handler = HandlerConfig::builder("pkg.Svc/Method", "pkg.Svc").apply_all(&shared).build();
//! ```
//!
//! Fields such as the procedure, byte limit, and client codec are overridden
//! by later options. Registries and the interceptor chain accumulate.
//! Nothing here can fail: an empty name, a missing capability, a
//! non-matching prefix, or an empty interceptor list simply has no effect.

use std::sync::Arc;

use connect_options_core::{BoxedCodec, BoxedCompressor};

use crate::chain::chain_with;
use crate::config::{ClientConfig, HandlerConfig};
use crate::interceptor::SharedInterceptor;
use crate::procedure::replace_prefix;
use crate::registry::{CompressorRegistry, Registration};

/// An option that can be applied to a [`ClientConfig`].
pub trait ClientOption: Send + Sync {
    fn apply_to_client(&self, config: &mut ClientConfig);
}

/// An option that can be applied to a [`HandlerConfig`].
pub trait HandlerOption: Send + Sync {
    fn apply_to_handler(&self, config: &mut HandlerConfig);
}

/// An option that applies to both clients and handlers.
pub trait ConnectOption: ClientOption + HandlerOption {}

impl<T: ClientOption + HandlerOption> ConnectOption for T {}

impl<T: ClientOption + ?Sized> ClientOption for &T {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        (**self).apply_to_client(config)
    }
}

impl<T: ClientOption + ?Sized> ClientOption for Box<T> {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        (**self).apply_to_client(config)
    }
}

impl<T: ClientOption + ?Sized> ClientOption for Arc<T> {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        (**self).apply_to_client(config)
    }
}

impl<T: HandlerOption + ?Sized> HandlerOption for &T {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        (**self).apply_to_handler(config)
    }
}

impl<T: HandlerOption + ?Sized> HandlerOption for Box<T> {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        (**self).apply_to_handler(config)
    }
}

impl<T: HandlerOption + ?Sized> HandlerOption for Arc<T> {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        (**self).apply_to_handler(config)
    }
}

/// Apply options to a client record, in iteration order.
pub fn apply_client_options<I>(config: &mut ClientConfig, options: I)
where
    I: IntoIterator,
    I::Item: ClientOption,
{
    for option in options {
        option.apply_to_client(config);
    }
}

/// Apply options to a handler record, in iteration order.
pub fn apply_handler_options<I>(config: &mut HandlerConfig, options: I)
where
    I: IntoIterator,
    I::Item: HandlerOption,
{
    for option in options {
        option.apply_to_handler(config);
    }
}

// ============================================================================
// Procedure prefix
// ============================================================================

/// See [`with_replace_procedure_prefix`].
#[derive(Debug, Clone)]
pub struct ReplaceProcedurePrefix {
    prefix: String,
    replacement: String,
}

/// Replace a prefix of the procedure name with another static string.
///
/// Useful to avoid package collisions, for example to serve a health or
/// reflection service under a second name. Introspection metadata still
/// describes the original name, so on handlers a rewrite that changes the
/// procedure also clears the registration name, excluding the procedure from
/// introspection.
pub fn with_replace_procedure_prefix(
    prefix: impl Into<String>,
    replacement: impl Into<String>,
) -> ReplaceProcedurePrefix {
    ReplaceProcedurePrefix {
        prefix: prefix.into(),
        replacement: replacement.into(),
    }
}

impl ReplaceProcedurePrefix {
    fn rewrite(&self, procedure: &mut String) -> bool {
        match replace_prefix(procedure, &self.prefix, &self.replacement) {
            Some(rewritten) if rewritten != *procedure => {
                #[cfg(feature = "tracing")]
                tracing::trace!(from = %procedure, to = %rewritten, "rewrote procedure prefix");
                *procedure = rewritten;
                true
            }
            _ => false,
        }
    }
}

impl ClientOption for ReplaceProcedurePrefix {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        self.rewrite(&mut config.procedure);
    }
}

impl HandlerOption for ReplaceProcedurePrefix {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        if self.rewrite(&mut config.procedure) {
            config.registration_name.clear();
        }
    }
}

// ============================================================================
// Read limit
// ============================================================================

/// See [`with_read_max_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadMaxBytes(pub usize);

/// Limit the size of messages read from the other party.
///
/// On clients this bounds responses; on handlers it bounds requests. Limits
/// apply to each message before decompression, not to a stream as a whole.
/// Zero allows any size, which is also the default.
pub fn with_read_max_bytes(max: usize) -> ReadMaxBytes {
    ReadMaxBytes(max)
}

impl ClientOption for ReadMaxBytes {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        config.max_response_bytes = self.0;
    }
}

impl HandlerOption for ReadMaxBytes {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        config.max_request_bytes = self.0;
    }
}

// ============================================================================
// Codecs
// ============================================================================

/// See [`with_codec`].
#[derive(Debug, Clone)]
pub struct CodecOption {
    name: String,
    codec: Option<BoxedCodec>,
}

impl CodecOption {
    /// Register `codec` under `name`, or remove `name` when `codec` is `None`.
    pub fn new(name: impl Into<String>, codec: Option<BoxedCodec>) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }
}

/// Register a serialization codec.
///
/// Handlers may hold many codecs and use whichever the caller picks; to
/// override a default, register a new codec under the same name. Clients hold
/// exactly one codec: the last one registered wins.
///
/// Registering a codec with an empty name is a no-op.
pub fn with_codec(name: impl Into<String>, codec: impl Into<BoxedCodec>) -> CodecOption {
    CodecOption::new(name, Some(codec.into()))
}

/// Remove a previously registered codec from a handler.
///
/// Clients always keep their current codec, so this is a no-op there.
pub fn without_codec(name: impl Into<String>) -> CodecOption {
    CodecOption::new(name, None)
}

impl ClientOption for CodecOption {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        if self.name.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!("ignoring codec option with an empty name");
            return;
        }
        if let Some(codec) = &self.codec {
            config.codec = Some((self.name.clone(), codec.clone()));
        }
    }
}

impl HandlerOption for CodecOption {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        let outcome = config.codecs.register(&self.name, self.codec.clone());
        log_registration("codec", &self.name, outcome);
    }
}

// ============================================================================
// Compressors
// ============================================================================

/// See [`with_compressor`].
#[derive(Debug, Clone)]
pub struct CompressorOption {
    name: String,
    compressor: Option<BoxedCompressor>,
}

impl CompressorOption {
    /// Register `compressor` under `name`, or remove `name` when `compressor`
    /// is `None`.
    pub fn new(name: impl Into<String>, compressor: Option<BoxedCompressor>) -> Self {
        Self {
            name: name.into(),
            compressor,
        }
    }

    fn apply(&self, registry: &mut CompressorRegistry) {
        let outcome = registry.register(&self.name, self.compressor.clone());
        log_registration("compressor", &self.name, outcome);
    }
}

/// Register a compression algorithm.
///
/// Handlers accept messages compressed with any registered algorithm and may
/// compress responses with one. Clients advertise the registered algorithms
/// for responses and may use them for requests.
///
/// Registering a compressor with an empty name is a no-op.
pub fn with_compressor(
    name: impl Into<String>,
    compressor: impl Into<BoxedCompressor>,
) -> CompressorOption {
    CompressorOption::new(name, Some(compressor.into()))
}

/// Remove a previously registered compressor.
pub fn without_compressor(name: impl Into<String>) -> CompressorOption {
    CompressorOption::new(name, None)
}

/// Register the built-in gzip compressor under `"gzip"`.
///
/// Uses the default compression level and leaves messages under 1 KiB
/// uncompressed.
#[cfg(feature = "compression-gzip")]
pub fn with_gzip() -> CompressorOption {
    use connect_options_core::{COMPRESSION_GZIP, GzipCompressor};

    with_compressor(COMPRESSION_GZIP, GzipCompressor::default())
}

impl ClientOption for CompressorOption {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        self.apply(&mut config.compressors);
    }
}

impl HandlerOption for CompressorOption {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        self.apply(&mut config.compressors);
    }
}

#[cfg(feature = "tracing")]
fn log_registration(kind: &str, name: &str, outcome: Registration) {
    match outcome {
        Registration::Ignored => {
            tracing::debug!(kind, "ignoring registration with an empty name");
        }
        Registration::Absent => {
            tracing::debug!(kind, name, "nothing registered under name to remove");
        }
        outcome => {
            tracing::trace!(kind, name, ?outcome, "updated registry");
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn log_registration(_kind: &str, _name: &str, _outcome: Registration) {}

// ============================================================================
// Interceptors
// ============================================================================

/// See [`with_interceptors`].
#[derive(Clone, Default)]
pub struct InterceptorsOption {
    interceptors: Vec<SharedInterceptor>,
}

/// Add interceptors to a client or handler.
///
/// Interceptors compose like an onion: the first one supplied is the
/// outermost layer. It is the first to see requests and sent messages and
/// the last to see responses and received messages.
///
/// Repeated options accumulate in order, so
/// `with_interceptors([a])` followed by `with_interceptors([b, c])` behaves
/// exactly like `with_interceptors([a, b, c])`.
pub fn with_interceptors<I>(interceptors: I) -> InterceptorsOption
where
    I: IntoIterator<Item = SharedInterceptor>,
{
    InterceptorsOption {
        interceptors: interceptors.into_iter().collect(),
    }
}

impl InterceptorsOption {
    fn chain_onto(&self, current: Option<SharedInterceptor>) -> Option<SharedInterceptor> {
        #[cfg(feature = "tracing")]
        tracing::trace!(added = self.interceptors.len(), "chaining interceptors");
        chain_with(current, &self.interceptors)
    }
}

impl ClientOption for InterceptorsOption {
    fn apply_to_client(&self, config: &mut ClientConfig) {
        config.interceptor = self.chain_onto(config.interceptor.take());
    }
}

impl HandlerOption for InterceptorsOption {
    fn apply_to_handler(&self, config: &mut HandlerConfig) {
        config.interceptor = self.chain_onto(config.interceptor.take());
    }
}

impl std::fmt::Debug for InterceptorsOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorsOption")
            .field("count", &self.interceptors.len())
            .finish()
    }
}
