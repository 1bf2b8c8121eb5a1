//! Codec error types.
//!
//! Frame-layer failures are never fatal to the connection: the caller logs
//! the error, drops the frame, and the framer resynchronizes at the next
//! delimiter. They are still surfaced as values so the client can log and
//! count them.

use thiserror::Error;

use crate::slip::MAX_FRAME_LEN;

/// A partial frame grew past [`MAX_FRAME_LEN`] without a terminator.
///
/// The framer drops the buffer and resynchronizes; the error only tells the
/// owner of the connection that it happened.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("partial frame exceeded {MAX_FRAME_LEN} bytes without a terminator")]
pub struct FramerOverflow;

/// Errors produced while validating or decoding an unframed payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Payload shorter than the fixed prelude (protocol id, length, command,
    /// checksum).
    #[error("payload too short: {0} bytes")]
    TooShort(usize),

    /// First payload byte is not the KLF protocol id (`0x00`).
    #[error("wrong protocol id: {0:#04x}")]
    WrongProtocolId(u8),

    /// Length byte disagrees with the actual payload size.
    #[error("wrong length byte: declared {declared}, payload carries {actual}")]
    WrongLength {
        /// Value of the length byte.
        declared: u8,
        /// Actual number of bytes the length byte should describe.
        actual: usize,
    },

    /// XOR checksum mismatch.
    #[error("wrong checksum: computed {computed:#04x}, frame carries {found:#04x}")]
    WrongChecksum {
        /// Checksum computed over the received bytes.
        computed: u8,
        /// Checksum byte carried by the frame.
        found: u8,
    },

    /// A known command whose arguments do not match its schema.
    #[error("malformed arguments for command {command:#06x}")]
    Arguments {
        /// Command id of the offending frame.
        command: u16,
        /// Schema violation detail.
        #[source]
        source: ArgumentError,
    },
}

/// Schema violations while reading an argument tuple.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// A field read past the end of the argument bytes.
    #[error("field overruns the arguments: wanted {wanted} more bytes, {left} left")]
    Underrun {
        /// Bytes the field still needed.
        wanted: usize,
        /// Bytes actually remaining.
        left: usize,
    },

    /// Bytes were left over after the last schema field.
    #[error("{0} undecoded bytes after the last field")]
    Trailing(usize),
}
