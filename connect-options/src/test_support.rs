//! Fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use connect_options_core::Status;
use http::HeaderMap;

use crate::interceptor::{
    BoxFuture, Interceptor, Receiver, Sender, SharedInterceptor, StreamHandles, UnaryFunc,
    UnaryRequest, UnaryResponse,
};

/// Ordered record of which layer saw what.
#[derive(Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Interceptor that logs `<name>:request`/`<name>:response` around unary calls
/// and `<name>:send`/`<name>:receive` on streams.
pub(crate) struct Recording {
    name: &'static str,
    log: Log,
}

pub(crate) fn recording(name: &'static str, log: &Log) -> SharedInterceptor {
    Arc::new(Recording {
        name,
        log: log.clone(),
    })
}

impl Interceptor for Recording {
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let name = self.name;
        let log = self.log.clone();
        Arc::new(move |request: UnaryRequest| {
            let next = next.clone();
            let log = log.clone();
            Box::pin(async move {
                log.push(format!("{name}:request"));
                let response = next(request).await;
                log.push(format!("{name}:response"));
                response
            })
        })
    }

    fn wrap_stream(&self, stream: StreamHandles) -> StreamHandles {
        StreamHandles {
            procedure: stream.procedure,
            sender: Box::new(RecordingSender {
                name: self.name,
                log: self.log.clone(),
                inner: stream.sender,
            }),
            receiver: Box::new(RecordingReceiver {
                name: self.name,
                log: self.log.clone(),
                inner: stream.receiver,
            }),
        }
    }
}

struct RecordingSender {
    name: &'static str,
    log: Log,
    inner: Box<dyn Sender>,
}

impl Sender for RecordingSender {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn send(&mut self, message: Bytes) -> BoxFuture<'_, Result<(), Status>> {
        self.log.push(format!("{}:send", self.name));
        self.inner.send(message)
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), Status>> {
        self.inner.close()
    }
}

struct RecordingReceiver {
    name: &'static str,
    log: Log,
    inner: Box<dyn Receiver>,
}

impl Receiver for RecordingReceiver {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Bytes>, Status>> {
        Box::pin(async move {
            let message = self.inner.receive().await;
            self.log.push(format!("{}:receive", self.name));
            message
        })
    }
}

/// Innermost unary call: logs `transport` and echoes the request body.
pub(crate) fn transport_unary(log: &Log) -> UnaryFunc {
    let log = log.clone();
    Arc::new(move |request: UnaryRequest| {
        log.push("transport");
        Box::pin(async move { Ok(UnaryResponse::new(HeaderMap::new(), request.body)) })
    })
}

/// Innermost unary call that stores the request it receives.
pub(crate) fn capture_unary() -> (UnaryFunc, Arc<Mutex<Option<UnaryRequest>>>) {
    let captured = Arc::new(Mutex::new(None));
    let slot = captured.clone();
    let next: UnaryFunc = Arc::new(move |request: UnaryRequest| {
        *slot.lock().unwrap() = Some(request);
        Box::pin(async { Ok(UnaryResponse::default()) })
    });
    (next, captured)
}

pub(crate) struct MemorySender {
    log: Log,
    headers: HeaderMap,
    closed: bool,
}

impl MemorySender {
    pub(crate) fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            headers: HeaderMap::new(),
            closed: false,
        }
    }
}

impl Sender for MemorySender {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn send(&mut self, _message: Bytes) -> BoxFuture<'_, Result<(), Status>> {
        Box::pin(async move {
            if self.closed {
                return Err(Status::internal("send after close"));
            }
            self.log.push("transport:send");
            Ok(())
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), Status>> {
        self.closed = true;
        Box::pin(async { Ok(()) })
    }
}

pub(crate) struct MemoryReceiver {
    log: Log,
    headers: HeaderMap,
    queue: VecDeque<Bytes>,
}

impl MemoryReceiver {
    pub(crate) fn new(log: &Log, messages: Vec<Bytes>) -> Self {
        Self {
            log: log.clone(),
            headers: HeaderMap::new(),
            queue: messages.into(),
        }
    }
}

impl Receiver for MemoryReceiver {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Bytes>, Status>> {
        Box::pin(async move {
            self.log.push("transport:receive");
            Ok(self.queue.pop_front())
        })
    }
}

/// Open a stream over in-memory handles with one queued inbound message.
pub(crate) fn memory_stream(log: &Log) -> StreamHandles {
    StreamHandles::new(
        "test.Service/Stream",
        MemorySender::new(log),
        MemoryReceiver::new(log, vec![Bytes::from_static(b"inbound")]),
    )
}

fn append(body: &Bytes, mark: &str) -> Bytes {
    let mut out = body.to_vec();
    out.extend_from_slice(mark.as_bytes());
    Bytes::from(out)
}

/// Interceptor that marks payloads instead of logging: `<name>>` is appended
/// to outgoing data and `<<name>` to incoming data. Each call's payload
/// therefore records its own path through the layers.
pub(crate) struct Trace(&'static str);

pub(crate) fn trace(name: &'static str) -> SharedInterceptor {
    Arc::new(Trace(name))
}

impl Interceptor for Trace {
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let name = self.0;
        Arc::new(move |mut request: UnaryRequest| {
            let next = next.clone();
            request.body = append(&request.body, &format!("{name}>"));
            Box::pin(async move {
                next(request).await.map(|mut response| {
                    response.body = append(&response.body, &format!("<{name}"));
                    response
                })
            })
        })
    }

    fn wrap_stream(&self, stream: StreamHandles) -> StreamHandles {
        StreamHandles {
            procedure: stream.procedure,
            sender: Box::new(TraceSender {
                name: self.0,
                inner: stream.sender,
            }),
            receiver: Box::new(TraceReceiver {
                name: self.0,
                inner: stream.receiver,
            }),
        }
    }
}

struct TraceSender {
    name: &'static str,
    inner: Box<dyn Sender>,
}

impl Sender for TraceSender {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn send(&mut self, message: Bytes) -> BoxFuture<'_, Result<(), Status>> {
        let message = append(&message, &format!("{}>", self.name));
        self.inner.send(message)
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), Status>> {
        self.inner.close()
    }
}

struct TraceReceiver {
    name: &'static str,
    inner: Box<dyn Receiver>,
}

impl Receiver for TraceReceiver {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Bytes>, Status>> {
        let mark = format!("<{}", self.name);
        Box::pin(async move {
            let message = self.inner.receive().await;
            message.map(|message| message.map(|message| append(&message, &mark)))
        })
    }
}

/// Stream whose receiver yields whatever its sender sent.
pub(crate) fn loopback_stream() -> StreamHandles {
    let queue = Arc::new(Mutex::new(VecDeque::new()));
    StreamHandles::new(
        "test.Service/Stream",
        LoopbackSender {
            queue: queue.clone(),
            headers: HeaderMap::new(),
        },
        LoopbackReceiver {
            queue,
            headers: HeaderMap::new(),
        },
    )
}

struct LoopbackSender {
    queue: Arc<Mutex<VecDeque<Bytes>>>,
    headers: HeaderMap,
}

impl Sender for LoopbackSender {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn send(&mut self, message: Bytes) -> BoxFuture<'_, Result<(), Status>> {
        self.queue.lock().unwrap().push_back(message);
        Box::pin(async { Ok(()) })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), Status>> {
        Box::pin(async { Ok(()) })
    }
}

struct LoopbackReceiver {
    queue: Arc<Mutex<VecDeque<Bytes>>>,
    headers: HeaderMap,
}

impl Receiver for LoopbackReceiver {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Bytes>, Status>> {
        let message = self.queue.lock().unwrap().pop_front();
        Box::pin(async move { Ok(message) })
    }
}
