//! Binary AST codec for transformer IPC.
//!
//! Every node is a `[tag][length:BE u16][payload]` frame. Composite nodes
//! carry an empty payload; their children follow in canonical order and are
//! closed by an `END` frame. Trivia (tokens, comments, positions) is not
//! encoded: a decoded tree carries detached metadata, and round-trip
//! equality is structural only.

mod decode;
mod encode;
pub mod tag;

use std::io::Read;

use thiserror::Error;

pub use tag::Tag;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("byte stream ended mid-frame")]
    Truncated,

    #[error("unknown tag byte 0x{0:02x}")]
    UnknownTag(u8),

    #[error("expected {expected} frame, found {found}")]
    TagMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unexpected FIN frame")]
    UnexpectedFin,

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("payload exceeds the 65535-byte frame limit")]
    Oversize,

    #[error("invalid UTF-8 in {0} payload")]
    InvalidUtf8(&'static str),

    #[error("malformed {0} payload")]
    InvalidPayload(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The codec instance. Stateless today; owning an instance keeps the
/// encode/decode surface in one place and leaves room for versioning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec;

impl Codec {
    pub fn new() -> Self {
        Codec
    }
}

/// One decoded frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub tag: Tag,
    pub payload: Vec<u8>,
}

/// Frame-level reader with one-frame lookahead, which is how the decoder
/// handles optional children.
pub struct FrameReader<R: Read> {
    inner: R,
    peeked: Option<Option<Frame>>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        FrameReader {
            inner,
            peeked: None,
        }
    }

    /// Reads the next raw frame. `None` at a clean end of stream.
    fn read_frame(&mut self) -> Result<Option<Frame>, CodecError> {
        let mut tag_byte = [0u8; 1];
        match self.inner.read(&mut tag_byte)? {
            0 => return Ok(None),
            _ => {}
        }
        let tag = Tag::from_u8(tag_byte[0]).ok_or(CodecError::UnknownTag(tag_byte[0]))?;
        let mut len_bytes = [0u8; 2];
        self.read_exact(&mut len_bytes)?;
        let len = u16::from_be_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        self.read_exact(&mut payload)?;
        Ok(Some(Frame { tag, payload }))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        self.inner.read_exact(buf).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                CodecError::Truncated
            } else {
                CodecError::Io(err)
            }
        })
    }

    /// The tag of the next frame without consuming it.
    pub fn peek_tag(&mut self) -> Result<Option<Tag>, CodecError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_frame()?);
        }
        Ok(self
            .peeked
            .as_ref()
            .and_then(|slot| slot.as_ref())
            .map(|frame| frame.tag))
    }

    /// Consumes the next frame; `None` at a clean end of stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, CodecError> {
        match self.peeked.take() {
            Some(frame) => Ok(frame),
            None => self.read_frame(),
        }
    }

    /// Consumes a frame that must be present and must carry `expected`.
    pub fn expect(&mut self, expected: Tag) -> Result<Frame, CodecError> {
        let frame = self.next_frame()?.ok_or(CodecError::UnexpectedEof)?;
        if frame.tag == Tag::Fin {
            return Err(CodecError::UnexpectedFin);
        }
        if frame.tag != expected {
            return Err(CodecError::TagMismatch {
                expected: expected.name(),
                found: frame.tag.name(),
            });
        }
        Ok(frame)
    }

    /// Consumes the closing `END` of a composite.
    pub fn expect_end(&mut self) -> Result<(), CodecError> {
        self.expect(Tag::End).map(|_| ())
    }
}

#[cfg(test)]
#[path = "../tests/t_codec.rs"]
mod tests;
