use crate::{literal_tag, run_tag, LOOKAHEAD_LEN, MAX_LITERAL_LEN, MAX_RUN_LEN};
use std::fmt::Debug;
use std::{fmt, io};

/// Streaming encoder.
///
/// Bytes pushed through [`Rle::update`] (or [`io::Write`]) are held in a
/// lookahead buffer until it is clear whether they belong to a run or to a
/// literal span, then written to the inner writer one whole frame at a time.
/// [`Rle::finalize`] must be called to emit the last pending frame.
pub struct Rle<W> {
    status: RleStatus,
    buf: [u8; LOOKAHEAD_LEN],
    len: usize,
    writer: W,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RleStatus {
    /// Buffered bytes contain no adjacent repeat yet.
    Literal,
    /// Every buffered byte is the same value, at least two of them.
    Run,
    /// A frame could not be written, no further input is accepted.
    Failed,
}

impl<W: io::Write> Rle<W> {
    pub fn new(writer: W) -> Self {
        Rle {
            status: RleStatus::Literal,
            buf: [0; LOOKAHEAD_LEN],
            len: 0,
            writer,
        }
    }

    /// Push one input byte, emitting a frame when one is complete.
    ///
    /// Once writing a frame fails the encoder is unusable: this and
    /// [`Rle::finalize`] keep returning an error.
    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        if self.status == RleStatus::Failed {
            return Err(Self::failed());
        }
        let result = self.step(byte);
        if result.is_err() {
            self.status = RleStatus::Failed;
            trace!("output error, transit to {:?}", self.status);
        }
        result
    }

    fn failed() -> io::Error {
        io::Error::other("encoder stopped after an output error")
    }

    #[inline(always)]
    fn step(&mut self, byte: u8) -> io::Result<()> {
        trace!("update byte 0x{byte:02X}");
        self.buf[self.len] = byte;
        self.len += 1;

        match self.status {
            RleStatus::Run => {
                // a run always holds at least two bytes before this one arrives
                if self.buf[self.len - 2] != byte {
                    self.status = RleStatus::Literal;
                    trace!("run broken, transit to {:?}", self.status);
                    self.emit_run(self.len - 1)?;
                } else if self.len == MAX_RUN_LEN {
                    self.status = RleStatus::Literal;
                    trace!("run full, transit to {:?}", self.status);
                    self.emit_run(self.len)?;
                }
            }
            RleStatus::Literal => {
                if self.len >= 2 && self.buf[self.len - 2] == byte {
                    self.status = RleStatus::Run;
                    trace!("repeat found, transit to {:?}", self.status);
                    self.emit_literal(self.len - 2)?;
                } else if self.len == LOOKAHEAD_LEN {
                    trace!("literal full");
                    self.emit_literal(MAX_LITERAL_LEN)?;
                }
            }
            RleStatus::Failed => return Err(Self::failed()),
        }
        Ok(())
    }

    /// Write a run frame for the first `len` buffered bytes.
    fn emit_run(&mut self, len: usize) -> io::Result<()> {
        debug_assert!((2..=MAX_RUN_LEN).contains(&len));
        let frame = [run_tag(len), self.buf[0]];
        trace!("emit run {:02X?}", frame);
        self.writer.write_all(&frame)?;
        self.discard(len);
        Ok(())
    }

    /// Write a literal frame for the first `len` buffered bytes.
    fn emit_literal(&mut self, len: usize) -> io::Result<()> {
        if len == 0 {
            return Ok(());
        }
        let mut frame = [0u8; MAX_LITERAL_LEN + 1];
        frame[0] = literal_tag(len);
        frame[1..=len].copy_from_slice(&self.buf[..len]);
        trace!("emit literal tag=0x{:02X}, len={len}", frame[0]);
        self.writer.write_all(&frame[..=len])?;
        self.discard(len);
        Ok(())
    }

    #[inline(always)]
    fn discard(&mut self, len: usize) {
        self.buf.copy_within(len..self.len, 0);
        self.len -= len;
    }

    /// Emit whatever is still buffered and flush the inner writer.
    ///
    /// No end-of-stream tag is written.
    pub fn finalize(mut self) -> io::Result<()> {
        trace!("last block: {:?}", self);
        match self.status {
            RleStatus::Run => self.emit_run(self.len)?,
            RleStatus::Literal => self.emit_literal(self.len)?,
            RleStatus::Failed => return Err(Self::failed()),
        }
        self.writer.flush()
    }
}

impl<W> Debug for Rle<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rle")
            .field("status", &self.status)
            .field("pending", &format_args!("{:02X?}", &self.buf[..self.len]))
            .finish()
    }
}

impl<W: io::Write> io::Write for Rle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            self.update(*byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
