//! Single-object codec

use crate::codec::{decode_next, encode};
use crate::config::Limits;
use crate::error::{Result, SerializationError};
use crate::mode::OpenMode;
use crate::read_context::ReadContext;
use crate::resource::{with_resource, Resource};
use crate::value::Value;
use std::io::{Read, Write};
use tracing::debug;

/// Write `value` as a single record.
///
/// Paths are opened write-binary, so an existing file is replaced.
pub fn dump_object<'a, S>(resource: impl Into<Resource<'a, S>>, value: &Value) -> Result<()>
where
    S: Write + ?Sized + 'a,
{
    let record = encode(value)?;
    with_resource(resource, Some(OpenMode::WRITE_BINARY), |f| {
        f.write_all(&record)?;
        f.flush()?;
        debug!(len = record.len(), kind = value.type_name(), "Dumped object");
        Ok(())
    })
}

/// Read the first record of `resource`.
///
/// Anything after the first record is left unread.
pub fn load_object<'a, S>(resource: impl Into<Resource<'a, S>>) -> Result<Value>
where
    S: Read + ?Sized + 'a,
{
    load_object_with(resource, Limits::default())
}

/// Like [`load_object`], with explicit decoder limits
pub fn load_object_with<'a, S>(resource: impl Into<Resource<'a, S>>, limits: Limits) -> Result<Value>
where
    S: Read + ?Sized + 'a,
{
    with_resource(resource, Some(OpenMode::READ_BINARY), |f| {
        let mut ctx = ReadContext::new(f);
        decode_next(&mut ctx, &limits)?.ok_or_else(|| SerializationError::Empty.into())
    })
}
