//! Interceptor capability.
//!
//! An [`Interceptor`] wraps the two shapes of call the execution logic
//! performs:
//! - a unary call, represented as a [`UnaryFunc`]
//! - a stream, represented as the [`Sender`]/[`Receiver`] pair in
//!   [`StreamHandles`]
//!
//! Interceptors never run during configuration. The composite built by
//! [`with_interceptors`](crate::with_interceptors) is stored in the resolved
//! config and invoked by the call-execution logic around every call.
//!
//! # Example
//!
//! ```ignore
//! use connect_options::{FnInterceptor, UnaryNext, UnaryRequest};
//!
//! let logging = FnInterceptor::unary(|req: UnaryRequest, next: UnaryNext| {
//!     Box::pin(async move {
//!         println!("Calling: {}", req.procedure);
//!         next.call(req).await
//!     })
//! });
//! ```

use std::sync::Arc;

use bytes::Bytes;
use connect_options_core::Status;
use http::HeaderMap;

use crate::chain::Chain;

pub use futures::future::BoxFuture;

/// A unary request as seen by interceptors.
#[derive(Debug, Clone)]
pub struct UnaryRequest {
    /// The procedure being called (e.g., "package.Service/Method").
    pub procedure: String,
    /// Request metadata.
    pub headers: HeaderMap,
    /// Encoded request message.
    pub body: Bytes,
}

impl UnaryRequest {
    /// Create a new unary request.
    pub fn new(procedure: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            procedure: procedure.into(),
            headers,
            body,
        }
    }
}

/// A unary response as seen by interceptors.
#[derive(Debug, Clone, Default)]
pub struct UnaryResponse {
    /// Response metadata.
    pub headers: HeaderMap,
    /// Encoded response message.
    pub body: Bytes,
}

impl UnaryResponse {
    /// Create a new unary response.
    pub fn new(headers: HeaderMap, body: Bytes) -> Self {
        Self { headers, body }
    }
}

/// The signature of a unary call.
///
/// Interceptors wrap this function to add logic before and after the call.
pub type UnaryFunc =
    Arc<dyn Fn(UnaryRequest) -> BoxFuture<'static, Result<UnaryResponse, Status>> + Send + Sync>;

/// The "next" function in an interceptor chain.
///
/// Call this to proceed to the next interceptor or the actual call.
#[derive(Clone)]
pub struct UnaryNext {
    inner: UnaryFunc,
}

impl UnaryNext {
    pub(crate) fn new(inner: UnaryFunc) -> Self {
        Self { inner }
    }

    /// Call the next interceptor or the actual call.
    pub async fn call(self, request: UnaryRequest) -> Result<UnaryResponse, Status> {
        (self.inner)(request).await
    }
}

/// The outbound half of a stream.
///
/// On a client this carries requests; on a handler it carries responses.
pub trait Sender: Send {
    /// Metadata sent ahead of the first message.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send one encoded message.
    fn send(&mut self, message: Bytes) -> BoxFuture<'_, Result<(), Status>>;

    /// Signal that no more messages will be sent.
    fn close(&mut self) -> BoxFuture<'_, Result<(), Status>>;
}

/// The inbound half of a stream.
///
/// On a client this yields responses; on a handler it yields requests.
pub trait Receiver: Send {
    /// Metadata received from the peer.
    fn headers(&self) -> &HeaderMap;

    /// Receive the next encoded message, or `None` once the peer is done.
    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Bytes>, Status>>;
}

/// The handle pair of an open stream.
pub struct StreamHandles {
    /// The procedure the stream was opened for.
    pub procedure: String,
    pub sender: Box<dyn Sender>,
    pub receiver: Box<dyn Receiver>,
}

impl StreamHandles {
    /// Create a new handle pair.
    pub fn new(
        procedure: impl Into<String>,
        sender: impl Sender + 'static,
        receiver: impl Receiver + 'static,
    ) -> Self {
        Self {
            procedure: procedure.into(),
            sender: Box::new(sender),
            receiver: Box::new(receiver),
        }
    }
}

impl std::fmt::Debug for StreamHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandles")
            .field("procedure", &self.procedure)
            .finish_non_exhaustive()
    }
}

/// Middleware around unary calls and streams.
///
/// Both methods default to passing their input through unchanged, so an
/// interceptor only implements the shapes it cares about.
///
/// Implementations are shared by every concurrent call, so they must not
/// keep per-call state in `self`.
pub trait Interceptor: Send + Sync + 'static {
    /// Wrap a unary call.
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        next
    }

    /// Wrap the handle pair of a stream.
    fn wrap_stream(&self, stream: StreamHandles) -> StreamHandles {
        stream
    }

    #[doc(hidden)]
    fn as_chain(&self) -> Option<&Chain> {
        None
    }
}

/// A shared interceptor, as stored in configuration records.
pub type SharedInterceptor = Arc<dyn Interceptor>;

/// An interceptor that adds a header to every unary request and every
/// stream's outbound metadata.
///
/// # Example
///
/// ```ignore
/// use connect_options::{HeaderInterceptor, with_interceptors};
/// use std::sync::Arc;
///
/// let auth = HeaderInterceptor::new("authorization", "Bearer token123");
/// let option = with_interceptors([Arc::new(auth) as _]);
/// ```
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: http::HeaderName,
    value: http::HeaderValue,
}

impl HeaderInterceptor {
    /// Create a new header interceptor.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.parse().expect("invalid header name"),
            value: value.parse().expect("invalid header value"),
        }
    }

    /// Try to create a new header interceptor, returning an error if invalid.
    pub fn try_new(name: &str, value: &str) -> Result<Self, Status> {
        let name = name
            .parse()
            .map_err(|_| Status::invalid_argument(format!("invalid header name: {}", name)))?;
        let value = value
            .parse()
            .map_err(|_| Status::invalid_argument(format!("invalid header value: {}", value)))?;
        Ok(Self { name, value })
    }

    /// Create a new header interceptor from pre-parsed values.
    pub fn from_parts(name: http::HeaderName, value: http::HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Interceptor for HeaderInterceptor {
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let name = self.name.clone();
        let value = self.value.clone();
        Arc::new(move |mut request: UnaryRequest| {
            request.headers.insert(name.clone(), value.clone());
            next(request)
        })
    }

    fn wrap_stream(&self, mut stream: StreamHandles) -> StreamHandles {
        stream
            .sender
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        stream
    }
}

/// A closure-based unary interceptor.
///
/// Streams pass through untouched.
pub struct FnInterceptor<F> {
    func: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(UnaryRequest, UnaryNext) -> BoxFuture<'static, Result<UnaryResponse, Status>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    /// Create a new function-based unary interceptor.
    pub fn unary(func: F) -> Self {
        Self { func }
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(UnaryRequest, UnaryNext) -> BoxFuture<'static, Result<UnaryResponse, Status>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let func = self.func.clone();
        Arc::new(move |request: UnaryRequest| {
            let next = UnaryNext::new(next.clone());
            func(request, next)
        })
    }
}

impl<F: Clone> Clone for FnInterceptor<F> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<F> std::fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInterceptor").finish()
    }
}
