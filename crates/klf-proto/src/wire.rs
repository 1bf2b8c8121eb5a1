//! Payload codec.
//!
//! An unframed payload is laid out as:
//!
//! ```text
//! protocol_id (1) · length (1) · command (2, BE) · arguments · checksum (1)
//! ```
//!
//! The length byte counts command, arguments, and checksum (total payload
//! length minus two). The checksum is the XOR of every byte from the protocol
//! id through the last argument byte. Arguments are big-endian, tightly
//! packed, with variable-width fields zero-padded to their schema width.
//!
//! [`FieldReader`] walks an argument tuple with `Result`-returning accessors
//! so a truncated or overlong frame is a value on the parse path, never a
//! panic.

use std::net::Ipv4Addr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ArgumentError, WireError};

/// Protocol identifier carried by every KLF-200 payload.
pub const PROTOCOL_ID: u8 = 0x00;

/// Payload bytes that are not arguments: protocol id, length, command,
/// checksum.
const OVERHEAD: usize = 5;

/// XOR of all bytes.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Assemble a payload from a command id and its encoded arguments.
#[must_use]
pub fn encode_payload(command: u16, arguments: &[u8]) -> Bytes {
    // The length byte is a u8; no schema comes close to the limit.
    debug_assert!(arguments.len() <= u8::MAX as usize - 3);

    let mut buf = BytesMut::with_capacity(arguments.len() + OVERHEAD);
    buf.put_u8(PROTOCOL_ID);
    // Length counts command + arguments + checksum.
    buf.put_u8((arguments.len() + 3) as u8);
    buf.put_u16(command);
    buf.put_slice(arguments);
    let sum = checksum(&buf);
    buf.put_u8(sum);
    buf.freeze()
}

/// Validate a payload and split it into command id and argument bytes.
///
/// Checks run in wire order: protocol id, length byte, command, checksum.
///
/// # Errors
///
/// - [`WireError::WrongProtocolId`] if the first byte is not `0x00`
/// - [`WireError::TooShort`] / [`WireError::WrongLength`] if the length byte
///   disagrees with the payload size
/// - [`WireError::WrongChecksum`] if the XOR check fails
pub fn decode_payload(payload: &[u8]) -> Result<(u16, &[u8]), WireError> {
    let protocol_id = *payload.first().ok_or(WireError::TooShort(0))?;
    if protocol_id != PROTOCOL_ID {
        return Err(WireError::WrongProtocolId(protocol_id));
    }

    let declared = *payload.get(1).ok_or(WireError::TooShort(payload.len()))?;
    if usize::from(declared) != payload.len() - 2 {
        return Err(WireError::WrongLength { declared, actual: payload.len() - 2 });
    }
    if payload.len() < OVERHEAD {
        return Err(WireError::TooShort(payload.len()));
    }

    let command = u16::from_be_bytes([payload[2], payload[3]]);

    let (body, tail) = payload.split_at(payload.len() - 1);
    let computed = checksum(body);
    if computed != tail[0] {
        return Err(WireError::WrongChecksum { computed, found: tail[0] });
    }

    Ok((command, &payload[4..payload.len() - 1]))
}

/// Write `bytes` into `dst` as a fixed-width field, truncating or
/// zero-padding to `width`.
pub fn put_fixed(dst: &mut BytesMut, bytes: &[u8], width: usize) {
    let take = bytes.len().min(width);
    dst.put_slice(&bytes[..take]);
    dst.put_bytes(0, width - take);
}

/// Sequential reader over an argument tuple.
///
/// Every accessor checks bounds and returns [`ArgumentError::Underrun`] on
/// overrun; [`FieldReader::finish`] rejects undecoded trailing bytes, since
/// the argument schemas are fixed-width.
#[derive(Debug)]
pub struct FieldReader<'a> {
    rest: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Start reading at the first argument byte.
    #[must_use]
    pub fn new(arguments: &'a [u8]) -> Self {
        Self { rest: arguments }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ArgumentError> {
        if self.rest.len() < n {
            return Err(ArgumentError::Underrun { wanted: n, left: self.rest.len() });
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8, ArgumentError> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian u16.
    pub fn u16(&mut self) -> Result<u16, ArgumentError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian u32.
    pub fn u32(&mut self) -> Result<u32, ArgumentError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed-size byte array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], ArgumentError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a fixed-width text field: UTF-8, trailing NULs stripped.
    pub fn text(&mut self, width: usize) -> Result<String, ArgumentError> {
        let raw = self.take(width)?;
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Read four bytes as an IPv4 address.
    pub fn ipv4(&mut self) -> Result<Ipv4Addr, ArgumentError> {
        let octets: [u8; 4] = self.array()?;
        Ok(Ipv4Addr::from(octets))
    }

    /// Skip pad bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), ArgumentError> {
        self.take(n).map(|_| ())
    }

    /// Assert the whole tuple was consumed.
    pub fn finish(self) -> Result<(), ArgumentError> {
        if self.rest.is_empty() { Ok(()) } else { Err(ArgumentError::Trailing(self.rest.len())) }
    }
}
