//! Encoding and decoding of single records
//!
//! A record is a tag byte followed by its payload. Containers carry an
//! element count and then their elements as nested records, so the end of a
//! record is always known from its own bytes.

use crate::config::Limits;
use crate::data_types::DataType;
use crate::error::{Error, SerializationError};
use crate::read_context::ReadContext;
use crate::rolling_uint::{get_rolling_uint_size, put_rolling_uint, read_rolling_uint, unzigzag, zigzag};
use crate::value::Value;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

/// Calculate the size needed to encode a value
pub fn encoded_len(value: &Value) -> usize {
    1 + match value {
        Value::None => 0,
        Value::Bool(_) => 1,
        Value::Int(n) => get_rolling_uint_size(zigzag(*n)),
        Value::Float(_) => 8,
        Value::Text(s) => get_rolling_uint_size(s.len() as u64) + s.len(),
        Value::Bytes(b) => get_rolling_uint_size(b.len() as u64) + b.len(),
        Value::List(items) | Value::Tuple(items) => {
            get_rolling_uint_size(items.len() as u64) + items.iter().map(encoded_len).sum::<usize>()
        }
        Value::Set(items) => {
            get_rolling_uint_size(items.len() as u64) + items.iter().map(encoded_len).sum::<usize>()
        }
        Value::Map(entries) => {
            get_rolling_uint_size(entries.len() as u64)
                + entries
                    .iter()
                    .map(|(k, v)| encoded_len(k) + encoded_len(v))
                    .sum::<usize>()
        }
    }
}

/// Encode one value as a standalone record
pub fn encode(value: &Value) -> Result<Bytes, SerializationError> {
    let limit = Limits::default().max_depth;
    if value.depth() > limit {
        return Err(SerializationError::DepthExceeded { limit });
    }
    let mut buf = BytesMut::with_capacity(encoded_len(value));
    write_value(value, &mut buf);
    Ok(buf.freeze())
}

/// Append one value to a buffer
fn write_value(value: &Value, buf: &mut BytesMut) {
    buf.put_u8(value.data_type().to_u8());
    match value {
        Value::None => {}
        Value::Bool(b) => buf.put_u8(u8::from(*b)),
        Value::Int(n) => put_rolling_uint(buf, zigzag(*n)),
        Value::Float(f) => buf.put_f64_le(*f),
        Value::Text(s) => {
            put_rolling_uint(buf, s.len() as u64);
            buf.put_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            put_rolling_uint(buf, b.len() as u64);
            buf.put_slice(b);
        }
        Value::List(items) | Value::Tuple(items) => {
            put_rolling_uint(buf, items.len() as u64);
            for item in items {
                write_value(item, buf);
            }
        }
        Value::Set(items) => {
            put_rolling_uint(buf, items.len() as u64);
            for item in items {
                write_value(item, buf);
            }
        }
        Value::Map(entries) => {
            put_rolling_uint(buf, entries.len() as u64);
            for (k, v) in entries {
                write_value(k, buf);
                write_value(v, buf);
            }
        }
    }
}

/// Decode the next record, or `None` if the input ends cleanly before it
pub fn decode_next<R: Read>(
    ctx: &mut ReadContext<R>,
    limits: &Limits,
) -> Result<Option<Value>, Error> {
    let tag_offset = ctx.offset();
    match ctx.read_boundary_byte()? {
        None => Ok(None),
        Some(tag) => read_tagged(ctx, limits, tag, tag_offset, 0).map(Some),
    }
}

/// Decode exactly one record
pub fn decode<R: Read>(ctx: &mut ReadContext<R>, limits: &Limits) -> Result<Value, Error> {
    let tag_offset = ctx.offset();
    let tag = ctx.read_byte()?;
    read_tagged(ctx, limits, tag, tag_offset, 0)
}

fn read_value<R: Read>(
    ctx: &mut ReadContext<R>,
    limits: &Limits,
    depth: usize,
) -> Result<Value, Error> {
    let tag_offset = ctx.offset();
    let tag = ctx.read_byte()?;
    read_tagged(ctx, limits, tag, tag_offset, depth)
}

fn read_tagged<R: Read>(
    ctx: &mut ReadContext<R>,
    limits: &Limits,
    tag: u8,
    tag_offset: u64,
    depth: usize,
) -> Result<Value, Error> {
    let data_type = DataType::from_u8(tag).ok_or(SerializationError::UnknownTag {
        tag,
        offset: tag_offset,
    })?;

    if data_type.is_container() && depth >= limits.max_depth {
        return Err(SerializationError::DepthExceeded {
            limit: limits.max_depth,
        }
        .into());
    }

    match data_type {
        DataType::None => Ok(Value::None),

        DataType::Bool => {
            let offset = ctx.offset();
            match ctx.read_byte()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                byte => Err(SerializationError::InvalidBool { byte, offset }.into()),
            }
        }

        DataType::Int => Ok(Value::Int(unzigzag(read_rolling_uint(ctx)?))),

        DataType::Float => {
            let mut arr = [0u8; 8];
            ctx.read_exact(&mut arr)?;
            Ok(Value::Float(f64::from_le_bytes(arr)))
        }

        DataType::Text => {
            let len = read_length(ctx, limits)?;
            let offset = ctx.offset();
            let bytes = ctx.read_bytes(len)?;
            let text = String::from_utf8(bytes).map_err(|_| SerializationError::InvalidUtf8 { offset })?;
            Ok(Value::Text(text))
        }

        DataType::Bytes => {
            let len = read_length(ctx, limits)?;
            Ok(Value::Bytes(Bytes::from(ctx.read_bytes(len)?)))
        }

        DataType::List | DataType::Tuple => {
            let len = read_length(ctx, limits)?;
            let mut items = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                items.push(read_value(ctx, limits, depth + 1)?);
            }
            if data_type == DataType::List {
                Ok(Value::List(items))
            } else {
                Ok(Value::Tuple(items))
            }
        }

        DataType::Set => {
            let len = read_length(ctx, limits)?;
            let mut items = BTreeSet::new();
            for _ in 0..len {
                items.insert(read_value(ctx, limits, depth + 1)?);
            }
            Ok(Value::Set(items))
        }

        DataType::Map => {
            let len = read_length(ctx, limits)?;
            let mut entries = BTreeMap::new();
            for _ in 0..len {
                let key = read_value(ctx, limits, depth + 1)?;
                let value = read_value(ctx, limits, depth + 1)?;
                entries.insert(key, value);
            }
            Ok(Value::Map(entries))
        }
    }
}

/// Read a length prefix and check it against the limits
fn read_length<R: Read>(ctx: &mut ReadContext<R>, limits: &Limits) -> Result<usize, Error> {
    let offset = ctx.offset();
    let length = read_rolling_uint(ctx)?;
    check_length(length, limits, offset)
}

pub(crate) fn check_length(length: u64, limits: &Limits, offset: u64) -> Result<usize, Error> {
    if length > limits.max_length {
        return Err(SerializationError::LengthLimit {
            length,
            limit: limits.max_length,
            offset,
        }
        .into());
    }
    usize::try_from(length).map_err(|_| {
        SerializationError::LengthLimit {
            length,
            limit: usize::MAX as u64,
            offset,
        }
        .into()
    })
}
