//! Newline-delimited JSON processing for streaming responses.
//!
//! A streaming `/api/generate` call answers with one JSON object per line.
//! This module turns the raw byte stream into a stream of
//! [`GenerationEvent`]s, and turns a stream that ends without a `done: true`
//! object into a truncated-stream error.

use std::collections::VecDeque;
use std::io;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS, STREAM_TRUNCATED};
use crate::{Error, GenerateResponse, GenerationEvent, Result};

/// Longest line accepted from the server, in bytes.
pub const MAX_LINE_LENGTH: usize = 1 << 20;

/// Process a stream of bytes into a stream of generation events.
///
/// Events arrive in the order the server sent them.  The stream yields
/// [`GenerationEvent::Done`] exactly once, as its last item, when the server
/// signals completion.  If the transport closes first, the last item is a
/// streaming error instead.  Nothing is yielded after an error.
///
/// A line longer than [`MAX_LINE_LENGTH`] ends the stream with an error.
pub fn process_ndjson<S, E>(byte_stream: S) -> impl Stream<Item = Result<GenerationEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + Unpin + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    process_ndjson_with_limit(byte_stream, MAX_LINE_LENGTH)
}

fn process_ndjson_with_limit<S, E>(
    byte_stream: S,
    max_line_length: usize,
) -> impl Stream<Item = Result<GenerationEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + Unpin + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let reader = StreamReader::new(byte_stream.map(|result| result.map_err(io::Error::other)));
    let lines = FramedRead::new(reader, LinesCodec::new_with_max_length(max_line_length));

    stream::unfold(
        (lines, VecDeque::new(), false),
        move |(mut lines, mut pending, mut finished)| async move {
            loop {
                if let Some(item) = pending.pop_front() {
                    return Some((item, (lines, pending, finished)));
                }
                if finished {
                    return None;
                }

                match lines.next().await {
                    Some(Ok(line)) => {
                        STREAM_BYTES.count(line.len() as u64);
                        match decode_line(&line) {
                            Ok(events) => {
                                finished = events
                                    .iter()
                                    .any(|event| matches!(event, GenerationEvent::Done(_)));
                                pending.extend(events.into_iter().map(Ok));
                            }
                            Err(err) => {
                                STREAM_ERRORS.click();
                                finished = true;
                                pending.push_back(Err(err));
                            }
                        }
                    }
                    Some(Err(err)) => {
                        STREAM_ERRORS.click();
                        finished = true;
                        pending.push_back(Err(lines_error(err)));
                    }
                    None => {
                        STREAM_TRUNCATED.click();
                        finished = true;
                        pending.push_back(Err(Error::truncated_stream()));
                    }
                }
            }
        },
    )
}

/// Decode one line of the stream into zero, one, or two events.
///
/// Blank lines and empty fragments produce nothing.  A final object that also
/// carries text produces the text before the completion signal.
fn decode_line(line: &str) -> Result<Vec<GenerationEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let response: GenerateResponse = serde_json::from_str(line).map_err(|e| {
        Error::streaming(
            format!("Failed to parse stream line: {e}"),
            Some(Box::new(e)),
        )
    })?;

    if let Some(message) = response.error {
        return Err(Error::streaming(message, None));
    }

    let usage = response.usage();
    let mut events = Vec::with_capacity(2);
    if !response.response.is_empty() {
        STREAM_CHUNKS.click();
        events.push(GenerationEvent::Delta(response.response));
    }
    if response.done {
        events.push(GenerationEvent::Done(usage));
    }
    Ok(events)
}

fn lines_error(err: LinesCodecError) -> Error {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            Error::streaming("stream line exceeded the maximum length", None)
        }
        LinesCodecError::Io(err) => match err.kind() {
            io::ErrorKind::InvalidData => Error::encoding(
                format!("Invalid UTF-8 in stream: {err}"),
                Some(Box::new(err)),
            ),
            _ => Error::streaming(format!("Error in HTTP stream: {err}"), Some(Box::new(err))),
        },
    }
}
