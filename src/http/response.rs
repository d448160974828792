//! Response observation.
//!
//! # Responsibilities
//! - Snapshot status and headers when the response head is handed back
//! - Count body bytes as frames pass through to the client
//! - Report the total exactly once when the body is done
//!
//! # Design Decisions
//! - Frames are forwarded as soon as they are polled; nothing is buffered
//! - "Done" is end-of-stream, a body error, or the body being dropped
//!   (client went away), whichever happens first

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Response, StatusCode};
use bytes::Bytes;
use hyper::body::{Body as HttpBody, Frame, SizeHint};

use crate::observability::transaction::{header_multimap, HeaderMultiMap};

/// Status and headers of a response at the moment its head was finalized.
#[derive(Debug, Clone)]
pub struct HeaderCapture {
    pub status: StatusCode,
    pub headers: HeaderMultiMap,
}

impl HeaderCapture {
    pub fn observe<B>(response: &Response<B>) -> Self {
        Self {
            status: response.status(),
            headers: header_multimap(response.headers()),
        }
    }
}

type OnComplete = Box<dyn FnOnce(u64) + Send + 'static>;

/// Pass-through body that counts data bytes.
pub struct CaptureBody {
    inner: Body,
    written: u64,
    on_complete: Option<OnComplete>,
}

impl CaptureBody {
    /// Wrap `inner`; `on_complete` receives the byte total once.
    pub fn new(inner: Body, on_complete: impl FnOnce(u64) + Send + 'static) -> Self {
        Self {
            inner,
            written: 0,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.written);
        }
    }
}

impl HttpBody for CaptureBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let polled = Pin::new(&mut self.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    self.written += data.len() as u64;
                }
                if self.inner.is_end_stream() {
                    self.complete();
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => self.complete(),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CaptureBody {
    fn drop(&mut self) {
        self.complete();
    }
}
