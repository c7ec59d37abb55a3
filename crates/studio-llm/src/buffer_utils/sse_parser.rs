use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use crate::traits::EventStream;
use crate::StreamEvent;

/// Strategy for turning SSE `data:` payloads into stream events
pub trait SseLineParser: Send {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Parse an HTTP SSE response body with the given line parser.
pub fn parse_sse_stream<P: SseLineParser + 'static>(response: Response, parser: P) -> EventStream {
    parse_sse_bytes(response.bytes_stream(), parser)
}

/// Parse any byte stream carrying SSE frames.
pub fn parse_sse_bytes<S, B, E, P>(stream: S, parser: P) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut finished = false;

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        match line_result {
                            Ok(line) => {
                                let Some(data) = data_payload(&line) else { continue };
                                if parser.is_done_marker(data) {
                                    yield Ok(StreamEvent::Done { finish_reason: None });
                                    finished = true;
                                    break 'outer;
                                }
                                match parser.parse_data_line(data) {
                                    Ok(events) => {
                                        for event in events {
                                            yield Ok(event);
                                        }
                                    }
                                    Err(e) => yield Err(e),
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            if let Some(line) = buffer.take_remainder() {
                if let Some(data) = data_payload(&line) {
                    if parser.is_done_marker(data) {
                        yield Ok(StreamEvent::Done { finish_reason: None });
                    } else {
                        match parser.parse_data_line(data) {
                            Ok(events) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
            }
        }
    })
}

fn data_payload(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:").map(str::trim_start)
}
