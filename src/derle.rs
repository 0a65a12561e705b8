use crate::{CodecError, END_OF_STREAM, MAX_RUN_LEN};
use std::io;

/// Streaming decoder.
///
/// Compressed bytes pushed through [`DeRle::feed`] (or [`io::Write`]) are
/// decoded straight into the inner writer. The only state kept between calls
/// is the frame currently being read.
pub struct DeRle<W> {
    status: DeRleStatus,
    writer: W,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DeRleStatus {
    /// Between frames, the next byte is a tag.
    Tag,
    /// Run tag read, waiting for the value to repeat.
    Run { count: usize },
    /// Literal tag read, `remaining` payload bytes still to copy.
    Literal { remaining: usize },
    /// End-of-stream tag seen.
    End,
}

impl<W: io::Write> DeRle<W> {
    pub fn new(writer: W) -> DeRle<W> {
        DeRle {
            status: DeRleStatus::Tag,
            writer,
        }
    }

    /// Whether the end-of-stream tag has been read.
    pub fn is_finished(&self) -> bool {
        self.status == DeRleStatus::End
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        match self.status {
            DeRleStatus::Tag => {
                self.status = match byte {
                    END_OF_STREAM => DeRleStatus::End,
                    1..=0x7F => DeRleStatus::Run {
                        count: byte as usize,
                    },
                    _ => DeRleStatus::Literal {
                        remaining: 0x100 - byte as usize,
                    },
                };
                trace!("tag 0x{byte:02X}, transit to {:?}", self.status);
            }
            DeRleStatus::Run { count } => {
                trace!("decode: 0x{byte:02X} x {count}");
                let run = [byte; MAX_RUN_LEN];
                self.writer.write_all(&run[..count])?;
                self.status = DeRleStatus::Tag;
            }
            DeRleStatus::Literal { remaining } => {
                trace!("decode: 0x{byte:02X}");
                self.writer.write_all(&[byte])?;
                self.status = Self::after_literal(remaining - 1);
            }
            DeRleStatus::End => {
                trace!("ignore 0x{byte:02X} after end of stream");
            }
        }
        Ok(())
    }

    /// Decode as much of `buf` as belongs to the stream.
    ///
    /// Returns the number of bytes consumed, which is short of `buf.len()`
    /// only when an end-of-stream tag was reached.
    pub fn feed(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut pos = 0;
        while pos < buf.len() {
            match self.status {
                DeRleStatus::End => break,
                DeRleStatus::Literal { remaining } => {
                    let take = remaining.min(buf.len() - pos);
                    trace!("decode: {take} literal byte(s)");
                    self.writer.write_all(&buf[pos..pos + take])?;
                    self.status = Self::after_literal(remaining - take);
                    pos += take;
                }
                _ => {
                    self.update(buf[pos])?;
                    pos += 1;
                }
            }
        }
        Ok(pos)
    }

    #[inline(always)]
    fn after_literal(remaining: usize) -> DeRleStatus {
        if remaining == 0 {
            DeRleStatus::Tag
        } else {
            DeRleStatus::Literal { remaining }
        }
    }

    /// Flush the inner writer and check that the stream did not stop inside a
    /// frame.
    pub fn finalize(mut self) -> Result<(), CodecError> {
        trace!("last status: {:?}", self.status);
        self.writer.flush().map_err(CodecError::Output)?;
        match self.status {
            DeRleStatus::Tag | DeRleStatus::End => Ok(()),
            DeRleStatus::Run { .. } => Err(CodecError::TruncatedStream { remaining: 1 }),
            DeRleStatus::Literal { remaining } => Err(CodecError::TruncatedStream { remaining }),
        }
    }
}

impl<W: io::Write> io::Write for DeRle<W> {
    /// Bytes after an end-of-stream tag are accepted and dropped.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
