mod buffering;
mod sse_parser;

pub use buffering::CircularLineBuffer;
pub use sse_parser::{SseLineParser, parse_sse_stream, parse_sse_bytes};
