//! Async record streams over tokio I/O
//!
//! Same record format as [`crate::dump_records`] and
//! [`crate::load_records`], for code that already lives on a tokio runtime.
//! The caller owns the reader or writer; nothing here closes it.

use crate::codec::{check_length, encode};
use crate::config::Limits;
use crate::data_types::DataType;
use crate::error::{Result, SerializationError};
use crate::rolling_uint::{read_exact_async, read_rolling_uint_async, unzigzag};
use crate::value::Value;
use async_stream::try_stream;
use bytes::Bytes;
use futures::{pin_mut, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_stream::StreamExt;
use tracing::debug;

type ValueFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Write every value of `values` as a record, then flush.
///
/// Returns the number of records written.
pub async fn write_records_async<W, S>(writer: &mut W, values: S) -> Result<usize>
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = Value>,
{
    pin_mut!(values);
    let mut count = 0;
    while let Some(value) = values.next().await {
        let record = encode(&value)?;
        writer.write_all(&record).await?;
        count += 1;
    }
    writer.flush().await?;
    debug!(records = count, "Wrote records to async writer");
    Ok(count)
}

/// Stream the records of `reader` with default limits
pub fn read_records_async<R>(reader: R) -> impl Stream<Item = Result<Value>>
where
    R: AsyncRead + Unpin + Send,
{
    read_records_async_with(reader, Limits::default())
}

/// Stream the records of `reader`.
///
/// Ends cleanly when the reader stops at a record boundary; yields an error
/// and ends if it stops inside a record or holds something else.
pub fn read_records_async_with<R>(mut reader: R, limits: Limits) -> impl Stream<Item = Result<Value>>
where
    R: AsyncRead + Unpin + Send,
{
    try_stream! {
        let mut offset = 0u64;
        loop {
            let tag_offset = offset;
            let mut tag = [0u8; 1];
            if reader.read(&mut tag).await? == 0 {
                debug!(offset, "Reached end of async records");
                break;
            }
            offset += 1;
            let value = read_tagged(&mut reader, &mut offset, &limits, tag[0], tag_offset, 0).await?;
            yield value;
        }
    }
}

fn read_value<'a, R: AsyncRead + Unpin + Send>(
    reader: &'a mut R,
    offset: &'a mut u64,
    limits: &'a Limits,
    depth: usize,
) -> ValueFuture<'a> {
    Box::pin(async move {
        let tag_offset = *offset;
        let tag = read_exact_async(reader, offset, 1).await?[0];
        read_tagged(reader, offset, limits, tag, tag_offset, depth).await
    })
}

fn read_tagged<'a, R: AsyncRead + Unpin + Send>(
    reader: &'a mut R,
    offset: &'a mut u64,
    limits: &'a Limits,
    tag: u8,
    tag_offset: u64,
    depth: usize,
) -> ValueFuture<'a> {
    Box::pin(async move {
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
                let at = *offset;
                match read_exact_async(reader, offset, 1).await?[0] {
                    0 => Ok(Value::Bool(false)),
                    1 => Ok(Value::Bool(true)),
                    byte => Err(SerializationError::InvalidBool { byte, offset: at }.into()),
                }
            }

            DataType::Int => {
                let zigzagged = read_rolling_uint_async(reader, offset).await?;
                Ok(Value::Int(unzigzag(zigzagged)))
            }

            DataType::Float => {
                let bytes = read_exact_async(reader, offset, 8).await?;
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Value::Float(f64::from_le_bytes(arr)))
            }

            DataType::Text => {
                let len = read_length(reader, offset, limits).await?;
                let at = *offset;
                let bytes = read_exact_async(reader, offset, len).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| SerializationError::InvalidUtf8 { offset: at })?;
                Ok(Value::Text(text))
            }

            DataType::Bytes => {
                let len = read_length(reader, offset, limits).await?;
                Ok(Value::Bytes(Bytes::from(read_exact_async(reader, offset, len).await?)))
            }

            DataType::List | DataType::Tuple => {
                let len = read_length(reader, offset, limits).await?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(read_value(reader, offset, limits, depth + 1).await?);
                }
                if data_type == DataType::List {
                    Ok(Value::List(items))
                } else {
                    Ok(Value::Tuple(items))
                }
            }

            DataType::Set => {
                let len = read_length(reader, offset, limits).await?;
                let mut items = BTreeSet::new();
                for _ in 0..len {
                    items.insert(read_value(reader, offset, limits, depth + 1).await?);
                }
                Ok(Value::Set(items))
            }

            DataType::Map => {
                let len = read_length(reader, offset, limits).await?;
                let mut entries = BTreeMap::new();
                for _ in 0..len {
                    let key = read_value(reader, offset, limits, depth + 1).await?;
                    let value = read_value(reader, offset, limits, depth + 1).await?;
                    entries.insert(key, value);
                }
                Ok(Value::Map(entries))
            }
        }
    })
}

async fn read_length<R: AsyncRead + Unpin>(
    reader: &mut R,
    offset: &mut u64,
    limits: &Limits,
) -> Result<usize> {
    let at = *offset;
    let length = read_rolling_uint_async(reader, offset).await?;
    check_length(length, limits, at)
}

/// Collect every record of `reader` into a vector
pub async fn read_all_records_async<R>(reader: R) -> Result<Vec<Value>>
where
    R: AsyncRead + Unpin + Send,
{
    let stream = read_records_async(reader);
    pin_mut!(stream);
    let mut values = Vec::new();
    while let Some(value) = stream.next().await {
        values.push(value?);
    }
    Ok(values)
}
