//! SLIP framing (RFC 1055).
//!
//! The gateway delimits every payload with `0xC0` and escapes in-band
//! occurrences of the delimiter and the escape byte itself. Decoding is a
//! three-state machine fed from the TCP stream; a single `read` may contain a
//! partial frame, several frames, or garbage, so the decoder buffers
//! incomplete data and queues completed frames.
//!
//! ```text
//! ┌──────┐  0xC0   ┌───────┐  0xC0 / frame out  ┌──────┐
//! │ Init │────────>│ Frame │───────────────────>│ Init │
//! └──────┘         └───────┘                    └──────┘
//!     ^              │   ^
//!     │ corrupt      │ 0xDB (escape)
//!     │ escape       v   │ valid escape byte
//!     └──────────── ┌────────┐
//!                   │ Escape │
//!                   └────────┘
//! ```
//!
//! Corruption is not signaled per frame: a bad escape or an oversized partial
//! frame drops the buffer and the machine resynchronizes at the next
//! delimiter. Bytes preceding the first delimiter (mid-stream connects,
//! line noise) are discarded in `Init`.

use std::collections::VecDeque;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FramerOverflow;

/// Frame delimiter.
const END: u8 = 0xC0;
/// Escape introducer.
const ESC: u8 = 0xDB;
/// Escaped form of [`END`].
const ESC_END: u8 = 0xDC;
/// Escaped form of [`ESC`].
const ESC_ESC: u8 = 0xDD;

/// Upper bound on a decoded payload. The longest KLF-200 payload is well
/// under this; anything larger is a protocol error.
pub const MAX_FRAME_LEN: usize = 512;

/// Encode a payload into a SLIP frame.
///
/// Escapes are applied byte-wise, so an escape introduced for `0xDB` is never
/// rewritten by the `0xC0` substitution.
#[must_use]
pub fn encode(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 2);
    out.put_u8(END);
    for &byte in payload {
        match byte {
            END => {
                out.put_u8(ESC);
                out.put_u8(ESC_END);
            },
            ESC => {
                out.put_u8(ESC);
                out.put_u8(ESC_ESC);
            },
            other => out.put_u8(other),
        }
    }
    out.put_u8(END);
    out.freeze()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Discarding bytes until the next delimiter.
    Init,
    /// Accumulating payload bytes.
    Frame,
    /// Previous byte was the escape introducer.
    Escape,
}

/// Streaming SLIP decoder.
///
/// Feed raw bytes with [`SlipDecoder::extend`], then drain completed payloads
/// with [`SlipDecoder::next_frame`]. Created once per connection.
#[derive(Debug)]
pub struct SlipDecoder {
    state: State,
    buf: BytesMut,
    frames: VecDeque<Bytes>,
}

impl SlipDecoder {
    /// Create a decoder waiting for the first delimiter.
    #[must_use]
    pub fn new() -> Self {
        Self { state: State::Init, buf: BytesMut::new(), frames: VecDeque::new() }
    }

    /// Consume a chunk of raw stream bytes.
    ///
    /// All bytes are processed even when an overflow occurs mid-chunk; the
    /// returned error only reports that at least one partial frame was
    /// dropped for exceeding [`MAX_FRAME_LEN`].
    pub fn extend(&mut self, data: &[u8]) -> Result<(), FramerOverflow> {
        let mut overflowed = false;
        for &byte in data {
            overflowed |= self.push(byte);
        }
        if overflowed { Err(FramerOverflow) } else { Ok(()) }
    }

    /// Next completed payload, oldest first.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    /// Process one byte; returns true if the buffer was dropped for overflow.
    fn push(&mut self, byte: u8) -> bool {
        match self.state {
            State::Init => {
                if byte == END {
                    self.state = State::Frame;
                }
                false
            },
            State::Frame => match byte {
                END => {
                    // Back-to-back delimiters are a legal abort-and-restart
                    // marker; the resulting empty frame is not a message.
                    if !self.buf.is_empty() {
                        self.frames.push_back(self.buf.split().freeze());
                    }
                    self.state = State::Init;
                    false
                },
                ESC => {
                    self.state = State::Escape;
                    false
                },
                other => self.accumulate(other),
            },
            State::Escape => match byte {
                ESC_END => {
                    self.state = State::Frame;
                    self.accumulate(END)
                },
                ESC_ESC => {
                    self.state = State::Frame;
                    self.accumulate(ESC)
                },
                _ => {
                    // Invalid escape: the frame is corrupt. Drop it and
                    // resynchronize at the next delimiter.
                    self.buf.clear();
                    self.state = State::Init;
                    false
                },
            },
        }
    }

    fn accumulate(&mut self, byte: u8) -> bool {
        if self.buf.len() == MAX_FRAME_LEN {
            self.buf.clear();
            self.state = State::Init;
            return true;
        }
        self.buf.put_u8(byte);
        false
    }
}

impl Default for SlipDecoder {
    fn default() -> Self {
        Self::new()
    }
}
