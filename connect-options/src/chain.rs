//! Composite interceptors.
//!
//! A [`Chain`] collapses an ordered list of interceptors into one value that
//! is itself an [`Interceptor`]. Ordering follows the onion model: the
//! interceptor at index 0 is the outermost layer.
//!
//! Applied to a client and a handler, `[A, B, ..., Z]` produces:
//!
//! ```text
//!        client send        client receive
//!              |                 ^
//!              v                 |
//!           A ---               --- A
//!           B ---               --- B
//!             ...               ...
//!           Z ---               --- Z
//!              |                 ^
//!              v                 |
//!           network            network
//!              |                 ^
//!              v                 |
//!           A ---               --- A
//!           B ---               --- B
//!             ...               ...
//!           Z ---               --- Z
//!              |                 ^
//!              v                 |
//!      handler receive    handler send
//! ```
//!
//! On a client the [`Sender`](crate::Sender) carries requests; on a handler
//! it carries responses. The chain does not care: it wraps whatever pair it
//! is given, in the same order.

use std::sync::Arc;

use crate::interceptor::{Interceptor, SharedInterceptor, StreamHandles, UnaryFunc};

/// An immutable, flattened sequence of interceptors acting as one.
///
/// Cloning is cheap and the chain keeps no per-call state, so one value can
/// be shared by every concurrent call.
#[derive(Clone)]
pub struct Chain {
    interceptors: Arc<[SharedInterceptor]>,
}

impl Chain {
    /// Build a chain from interceptors in outermost-first order.
    ///
    /// Any element that is itself a chain is spliced in place, so the result
    /// is always one flat list.
    pub fn new<I>(interceptors: I) -> Self
    where
        I: IntoIterator<Item = SharedInterceptor>,
    {
        let mut flat = Vec::new();
        for interceptor in interceptors {
            let nested = interceptor.as_chain().map(|chain| chain.interceptors.clone());
            match nested {
                Some(members) => flat.extend(members.iter().cloned()),
                None => flat.push(interceptor),
            }
        }
        Self {
            interceptors: flat.into(),
        }
    }

    /// The wrapped interceptors, outermost first.
    pub fn interceptors(&self) -> &[SharedInterceptor] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Interceptor for Chain {
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        // innermost wraps first so index 0 ends up outermost
        self.interceptors
            .iter()
            .rev()
            .fold(next, |wrapped, interceptor| interceptor.wrap_unary(wrapped))
    }

    fn wrap_stream(&self, stream: StreamHandles) -> StreamHandles {
        self.interceptors
            .iter()
            .rev()
            .fold(stream, |wrapped, interceptor| interceptor.wrap_stream(wrapped))
    }

    fn as_chain(&self) -> Option<&Chain> {
        Some(self)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("count", &self.interceptors.len())
            .finish()
    }
}

/// Merge newly supplied interceptors with the composite accumulated so far.
///
/// - No new interceptors: `current` is returned unchanged.
/// - No current composite and one new interceptor: that interceptor is used
///   directly.
/// - Otherwise a new [`Chain`] is built from `[current, new...]`, keeping
///   earlier registrations outermost.
///
/// The result is the same as if every interceptor had been supplied in one
/// list, in original order.
pub fn chain_with(
    current: Option<SharedInterceptor>,
    interceptors: &[SharedInterceptor],
) -> Option<SharedInterceptor> {
    match (current, interceptors) {
        (current, []) => current,
        (None, [single]) => Some(single.clone()),
        (None, many) => Some(Arc::new(Chain::new(many.iter().cloned()))),
        (Some(current), new) => Some(Arc::new(Chain::new(
            std::iter::once(current).chain(new.iter().cloned()),
        ))),
    }
}
