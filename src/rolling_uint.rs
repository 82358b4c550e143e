//! Rolling uint encoding and decoding
//!
//! Variable-length integer used for lengths, counts and zigzagged integers.
//! Values below 0xfd take one byte; larger ones take a marker byte followed
//! by a little-endian u16, u32 or u64.

use crate::error::SerializationError;
use crate::read_context::ReadContext;
use bytes::BufMut;
use std::io::Read;
use tokio::io::{AsyncRead, AsyncReadExt};

const MARKER_U16: u8 = 0xfd;
const MARKER_U32: u8 = 0xfe;
const MARKER_U64: u8 = 0xff;

/// Calculate the size needed to encode a rolling uint
pub fn get_rolling_uint_size(data: u64) -> usize {
    if data < MARKER_U16 as u64 {
        1
    } else if data <= 0xffff {
        3
    } else if data <= 0xffffffff {
        5
    } else {
        9
    }
}

/// Append a rolling uint to a buffer
pub fn put_rolling_uint<B: BufMut>(buf: &mut B, data: u64) {
    if data < MARKER_U16 as u64 {
        buf.put_u8(data as u8);
    } else if data <= 0xffff {
        buf.put_u8(MARKER_U16);
        buf.put_u16_le(data as u16);
    } else if data <= 0xffffffff {
        buf.put_u8(MARKER_U32);
        buf.put_u32_le(data as u32);
    } else {
        buf.put_u8(MARKER_U64);
        buf.put_u64_le(data);
    }
}

/// Width of the little-endian payload that follows a first byte
fn payload_width(first_byte: u8) -> usize {
    match first_byte {
        MARKER_U16 => 2,
        MARKER_U32 => 4,
        MARKER_U64 => 8,
        _ => 0,
    }
}

fn assemble(first_byte: u8, payload: &[u8]) -> u64 {
    if payload.is_empty() {
        return first_byte as u64;
    }
    payload
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64)
}

/// Read a rolling uint through a read context
pub fn read_rolling_uint<R: Read>(ctx: &mut ReadContext<R>) -> crate::Result<u64> {
    let first_byte = ctx.read_byte()?;
    let mut payload = [0u8; 8];
    let width = payload_width(first_byte);
    ctx.read_exact(&mut payload[..width])?;
    Ok(assemble(first_byte, &payload[..width]))
}

/// Read a rolling uint from an async reader
pub async fn read_rolling_uint_async<R: AsyncRead + Unpin>(
    reader: &mut R,
    offset: &mut u64,
) -> crate::Result<u64> {
    let first_byte = read_exact_async(reader, offset, 1).await?[0];
    let width = payload_width(first_byte);
    let payload = read_exact_async(reader, offset, width).await?;
    Ok(assemble(first_byte, &payload))
}

/// Read `len` bytes from an async reader, mapping EOF to truncation
pub(crate) async fn read_exact_async<R: AsyncRead + Unpin>(
    reader: &mut R,
    offset: &mut u64,
    len: usize,
) -> crate::Result<Vec<u8>> {
    // The length comes off the wire; grow as bytes actually arrive
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    let read = AsyncReadExt::take(&mut *reader, len as u64)
        .read_to_end(&mut buf)
        .await
        .map_err(crate::Error::Io)?;
    *offset += read as u64;
    if read < len {
        return Err(SerializationError::Truncated { offset: *offset }.into());
    }
    Ok(buf)
}

/// Zigzag-map a signed integer so small magnitudes stay small
pub fn zigzag(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag`]
pub fn unzigzag(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}
