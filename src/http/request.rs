//! Request body measurement.
//!
//! # Responsibilities
//! - Count the bytes of an inbound request body
//! - Hand the downstream handler a body with identical bytes and trailers
//!
//! # Design Decisions
//! - The body is buffered in full; the size is only known at end-of-stream
//! - A read error keeps whatever was read so the handler still runs

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Body as _, Frame};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read request body after {read} bytes: {source}")]
    Read {
        read: u64,
        #[source]
        source: axum::Error,
    },
}

/// Measure the request body and put an unread copy back.
///
/// The returned request is always usable, even when measuring failed.
pub async fn probe_body(request: Request<Body>) -> (Request<Body>, Result<u64, ProbeError>) {
    let (parts, mut body) = request.into_parts();
    if body.is_end_stream() {
        return (Request::from_parts(parts, body), Ok(0));
    }

    let mut data = BytesMut::new();
    let mut trailers = None;
    let outcome = loop {
        match body.frame().await {
            Some(Ok(frame)) => match frame.into_data() {
                Ok(chunk) => data.extend_from_slice(&chunk),
                Err(frame) => {
                    if let Ok(t) = frame.into_trailers() {
                        trailers = Some(t);
                    }
                }
            },
            Some(Err(source)) => {
                break Err(ProbeError::Read {
                    read: data.len() as u64,
                    source,
                })
            }
            None => break Ok(data.len() as u64),
        }
    };

    let replay = replay_body(data.freeze(), trailers);
    (Request::from_parts(parts, replay), outcome)
}

fn replay_body(data: Bytes, trailers: Option<HeaderMap>) -> Body {
    match trailers {
        None => Body::from(data),
        Some(trailers) => {
            let frames = vec![
                Ok::<_, Infallible>(Frame::data(data)),
                Ok(Frame::trailers(trailers)),
            ];
            Body::new(StreamBody::new(futures_util::stream::iter(frames)))
        }
    }
}
