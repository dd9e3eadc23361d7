//! Resolved configuration records.
//!
//! - [`ClientConfig`]: the calling side, built once per client
//! - [`HandlerConfig`]: the serving side, built once per handler
//!
//! Records start empty, are filled by the option driver during setup, and
//! are read-only afterwards: fields are private and only options can change
//! them. To derive a variant of a frozen record, copy it with `to_builder`
//! and apply more options to the copy.
//!
//! # Example
//!
//! ```ignore
//! use connect_options::{ClientConfig, with_codec, with_gzip, with_read_max_bytes};
//!
//! let config = ClientConfig::builder("acme.user.v1.UserService/GetUser")
//!     .apply(with_codec("proto", ProtoCodec))
//!     .apply(with_gzip())
//!     .apply(with_read_max_bytes(4 * 1024 * 1024))
//!     .build();
//! ```

use connect_options_core::{BoxedCodec, Status};

use crate::interceptor::SharedInterceptor;
use crate::options::{ClientOption, HandlerOption, apply_client_options, apply_handler_options};
use crate::registry::{CodecRegistry, CompressorRegistry};

fn check_size(limit: usize, size: usize) -> Result<(), Status> {
    if limit > 0 && size > limit {
        return Err(Status::resource_exhausted(format!(
            "message size {} bytes exceeds maximum allowed size of {} bytes",
            size, limit
        )));
    }
    Ok(())
}

fn limit(max_bytes: usize) -> Option<usize> {
    (max_bytes > 0).then_some(max_bytes)
}

/// Calling-side configuration.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) procedure: String,
    pub(crate) max_response_bytes: usize,
    pub(crate) codec: Option<(String, BoxedCodec)>,
    pub(crate) compressors: CompressorRegistry,
    pub(crate) interceptor: Option<SharedInterceptor>,
}

impl ClientConfig {
    /// Create an empty record for `procedure`.
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            max_response_bytes: 0,
            codec: None,
            compressors: CompressorRegistry::new(),
            interceptor: None,
        }
    }

    /// Start building a record for `procedure`.
    pub fn builder(procedure: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(procedure),
        }
    }

    /// Copy this record into a builder so more options can be applied.
    ///
    /// The original record is left untouched.
    pub fn to_builder(&self) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: self.clone(),
        }
    }

    /// The procedure called (e.g., "package.Service/Method").
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Largest response message accepted, in bytes. 0 means unlimited.
    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// The response limit, or `None` if unlimited.
    pub fn response_limit(&self) -> Option<usize> {
        limit(self.max_response_bytes)
    }

    /// Check a response message size against the configured limit.
    ///
    /// `size` is the size on the wire, before decompression.
    pub fn check_response_size(&self, size: usize) -> Result<(), Status> {
        check_size(self.max_response_bytes, size)
    }

    /// The codec used to send requests and decode responses.
    pub fn codec(&self) -> Option<&BoxedCodec> {
        self.codec.as_ref().map(|(_, codec)| codec)
    }

    /// The registered name of [`codec`](Self::codec).
    pub fn codec_name(&self) -> Option<&str> {
        self.codec.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn compressors(&self) -> &CompressorRegistry {
        &self.compressors
    }

    /// The composite interceptor, if any interceptors were registered.
    pub fn interceptor(&self) -> Option<&SharedInterceptor> {
        self.interceptor.as_ref()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("procedure", &self.procedure)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("codec", &self.codec_name())
            .field("compressors", &self.compressors)
            .field("interceptor", &self.interceptor.is_some())
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// Each option is applied as soon as it is added, in call order.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Apply one option.
    pub fn apply<O: ClientOption>(mut self, option: O) -> Self {
        option.apply_to_client(&mut self.config);
        self
    }

    /// Apply options in iteration order.
    pub fn apply_all<I>(mut self, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: ClientOption,
    {
        apply_client_options(&mut self.config, options);
        self
    }

    /// Freeze the record.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Serving-side configuration.
#[derive(Clone)]
pub struct HandlerConfig {
    pub(crate) procedure: String,
    pub(crate) registration_name: String,
    pub(crate) max_request_bytes: usize,
    pub(crate) codecs: CodecRegistry,
    pub(crate) compressors: CompressorRegistry,
    pub(crate) interceptor: Option<SharedInterceptor>,
}

impl HandlerConfig {
    /// Create an empty record.
    ///
    /// `registration_name` is the name the procedure is published under for
    /// introspection; pass an empty string to keep it out of introspection.
    pub fn new(procedure: impl Into<String>, registration_name: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            registration_name: registration_name.into(),
            max_request_bytes: 0,
            codecs: CodecRegistry::new(),
            compressors: CompressorRegistry::new(),
            interceptor: None,
        }
    }

    /// Start building a record.
    pub fn builder(
        procedure: impl Into<String>,
        registration_name: impl Into<String>,
    ) -> HandlerConfigBuilder {
        HandlerConfigBuilder {
            config: Self::new(procedure, registration_name),
        }
    }

    /// Copy this record into a builder so more options can be applied.
    pub fn to_builder(&self) -> HandlerConfigBuilder {
        HandlerConfigBuilder {
            config: self.clone(),
        }
    }

    /// The procedure served (e.g., "package.Service/Method").
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// The name used by introspection. Empty when excluded.
    pub fn registration_name(&self) -> &str {
        &self.registration_name
    }

    /// Whether introspection should describe this procedure.
    pub fn is_introspectable(&self) -> bool {
        !self.registration_name.is_empty()
    }

    /// Largest request message accepted, in bytes. 0 means unlimited.
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// The request limit, or `None` if unlimited.
    pub fn request_limit(&self) -> Option<usize> {
        limit(self.max_request_bytes)
    }

    /// Check a request message size against the configured limit.
    ///
    /// `size` is the size on the wire, before decompression.
    pub fn check_request_size(&self, size: usize) -> Result<(), Status> {
        check_size(self.max_request_bytes, size)
    }

    /// Codecs callers may choose from.
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn compressors(&self) -> &CompressorRegistry {
        &self.compressors
    }

    /// The composite interceptor, if any interceptors were registered.
    pub fn interceptor(&self) -> Option<&SharedInterceptor> {
        self.interceptor.as_ref()
    }
}

impl std::fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("procedure", &self.procedure)
            .field("registration_name", &self.registration_name)
            .field("max_request_bytes", &self.max_request_bytes)
            .field("codecs", &self.codecs)
            .field("compressors", &self.compressors)
            .field("interceptor", &self.interceptor.is_some())
            .finish()
    }
}

/// Builder for [`HandlerConfig`].
#[derive(Debug, Clone)]
pub struct HandlerConfigBuilder {
    config: HandlerConfig,
}

impl HandlerConfigBuilder {
    /// Apply one option.
    pub fn apply<O: HandlerOption>(mut self, option: O) -> Self {
        option.apply_to_handler(&mut self.config);
        self
    }

    /// Apply options in iteration order.
    pub fn apply_all<I>(mut self, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: HandlerOption,
    {
        apply_handler_options(&mut self.config, options);
        self
    }

    /// Freeze the record.
    pub fn build(self) -> HandlerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_options_core::Code;

    #[test]
    fn test_new_client_config_is_empty() {
        let config = ClientConfig::new("pkg.Svc/Method");
        assert_eq!(config.procedure(), "pkg.Svc/Method");
        assert_eq!(config.max_response_bytes(), 0);
        assert_eq!(config.response_limit(), None);
        assert!(config.codec().is_none());
        assert!(config.codec_name().is_none());
        assert!(config.compressors().is_empty());
        assert!(config.interceptor().is_none());
    }

    #[test]
    fn test_new_handler_config_is_empty() {
        let config = HandlerConfig::new("pkg.Svc/Method", "pkg.Svc");
        assert_eq!(config.registration_name(), "pkg.Svc");
        assert!(config.is_introspectable());
        assert_eq!(config.request_limit(), None);
        assert!(config.codecs().is_empty());
        assert!(config.interceptor().is_none());

        assert!(!HandlerConfig::new("pkg.Svc/Method", "").is_introspectable());
    }

    #[test]
    fn test_check_size() {
        let mut config = HandlerConfig::new("pkg.Svc/Method", "");
        assert!(config.check_request_size(usize::MAX).is_ok());

        config.max_request_bytes = 1024;
        assert_eq!(config.request_limit(), Some(1024));
        assert!(config.check_request_size(1024).is_ok());

        let err = config.check_request_size(1025).unwrap_err();
        assert_eq!(err.code(), Code::ResourceExhausted);
        assert_eq!(
            err.message(),
            Some("message size 1025 bytes exceeds maximum allowed size of 1024 bytes")
        );
    }

    #[test]
    fn test_client_check_response_size() {
        let mut config = ClientConfig::new("pkg.Svc/Method");
        config.max_response_bytes = 10;
        assert!(config.check_response_size(10).is_ok());
        assert!(config.check_response_size(11).is_err());
    }

    #[test]
    fn test_records_are_shareable() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ClientConfig>();
        assert_send_sync::<HandlerConfig>();
    }

    #[test]
    fn test_debug_output() {
        let config = ClientConfig::new("pkg.Svc/Method");
        let debug = format!("{:?}", config);
        assert!(debug.contains("ClientConfig"));
        assert!(debug.contains("pkg.Svc/Method"));
        assert!(debug.contains("interceptor: false"));
    }
}
