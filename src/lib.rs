//! # RLE Encoding Scheme
//!
//! The compressed stream is a sequence of frames. Every frame starts with a
//! single length tag `L`.
//!
//! ```text
//!         tag          payload
//!          │              │
//!          ▼              ▼
//!     ┌─────────┬──────────────────┐
//!     │ 1..=127 │ 1 byte           │   run: repeat the byte L times
//!     ├─────────┼──────────────────┤
//!     │128..=255│ (256 - L) bytes  │   literal: copy the bytes as is
//!     ├─────────┼──────────────────┤
//!     │    0    │ -                │   end of stream (optional)
//!     └─────────┴──────────────────┘
//! ```
//!
//! A run is at most 127 bytes long, a literal span at most 128 bytes.
//! Longer stretches are split over several frames.
//!
//! The encoder never writes the end sentinel, the end of the underlying
//! stream terminates it. The decoder accepts both forms and stops reading
//! as soon as it sees a zero tag.
//!
//! # Streaming Scheme
//!
//! [`Rle`] and [`DeRle`] are push adaptors over an [`io::Write`]: bytes are
//! fed in, frames (or decoded bytes) come out the other side. Working memory
//! is bounded by one frame regardless of the input size.
//!
//! [`encode`] and [`decode`] wire an [`io::BufRead`] source to a sink and
//! classify failures into [`CodecError`].

#[macro_use]
extern crate log;

mod derle;
mod error;
mod rle;

pub use derle::DeRle;
pub use error::{CodecError, Result};
pub use rle::Rle;

use std::io::{self, ErrorKind, Write};

/// Tag value reserved for the explicit end of stream.
pub const END_OF_STREAM: u8 = 0;
/// Longest run a single frame can describe.
pub const MAX_RUN_LEN: usize = 0x7F;
/// Longest literal span a single frame can carry.
pub const MAX_LITERAL_LEN: usize = 0x80;
/// Encoder lookahead: a full literal span plus the byte that may start a run.
const LOOKAHEAD_LEN: usize = MAX_LITERAL_LEN + 1;

#[inline(always)]
const fn run_tag(len: usize) -> u8 {
    debug_assert!(len >= 1 && len <= MAX_RUN_LEN);
    len as u8
}

#[inline(always)]
const fn literal_tag(len: usize) -> u8 {
    debug_assert!(len >= 1 && len <= MAX_LITERAL_LEN);
    (0x100 - len) as u8
}

/// Compress everything readable from `input` into `output`.
///
/// Bytes already written to `output` stay there when an error is returned.
pub fn encode<R: io::BufRead, W: Write>(mut input: R, output: W) -> Result<()> {
    let mut rle = Rle::new(output);
    let mut total = 0usize;
    loop {
        let chunk = match input.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Input(e)),
        };
        if chunk.is_empty() {
            break;
        }
        for &byte in chunk {
            rle.update(byte).map_err(CodecError::Output)?;
        }
        let len = chunk.len();
        input.consume(len);
        total += len;
    }
    debug!("encoded {total} input bytes");
    rle.finalize().map_err(CodecError::Output)
}

/// Decompress the framed stream in `input` into `output`.
///
/// Reading stops right after an end-of-stream tag, anything behind it is left
/// unconsumed in `input`. A stream that ends inside a frame fails with
/// [`CodecError::TruncatedStream`].
pub fn decode<R: io::BufRead, W: Write>(mut input: R, output: W) -> Result<()> {
    let mut derle = DeRle::new(output);
    let mut total = 0usize;
    loop {
        let chunk = match input.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Input(e)),
        };
        if chunk.is_empty() {
            break;
        }
        let consumed = derle.feed(chunk).map_err(CodecError::Output)?;
        input.consume(consumed);
        total += consumed;
        if derle.is_finished() {
            debug!("end of stream tag after {total} input bytes");
            break;
        }
    }
    derle.finalize()
}

/// Compress a byte slice in memory.
pub fn encode_to_vec(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_LITERAL_LEN + 1);
    encode(data, &mut out).expect("writing to a Vec cannot fail");
    out
}

/// Decompress a byte slice in memory.
pub fn decode_to_vec(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    decode(data, &mut out)?;
    Ok(out)
}
