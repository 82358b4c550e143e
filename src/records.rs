//! Streams of records
//!
//! [`dump_records`] writes values back to back; [`load_records`] hands them
//! back one at a time through [`Records`], a single-pass iterator that owns
//! the opened resource until it is exhausted, closed or dropped.

use crate::codec::{decode_next, encode};
use crate::config::Limits;
use crate::error::Result;
use crate::mode::OpenMode;
use crate::read_context::ReadContext;
use crate::resource::{Resource, ResourceHandle};
use crate::value::Value;
use std::borrow::Borrow;
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

/// Write `values` as consecutive records.
///
/// Paths are opened write-binary (created or truncated) and closed before
/// returning. Returns the number of records written. If a value cannot be
/// encoded, the records before it have already been written and stay in
/// the sink.
pub fn dump_records<'a, S, I>(resource: impl Into<Resource<'a, S>>, values: I) -> Result<usize>
where
    S: Write + ?Sized + 'a,
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    let mut handle = ResourceHandle::open(resource, Some(OpenMode::WRITE_BINARY))?;
    let mut count = 0;
    for value in values {
        let record = encode(value.borrow())?;
        handle.write_all(&record)?;
        count += 1;
        trace!(index = count - 1, len = record.len(), "Wrote record");
    }
    handle.flush()?;
    debug!(records = count, owned = handle.is_owned(), "Dumped records");
    handle.close()?;
    Ok(count)
}

/// Open `resource` read-binary and iterate over its records
pub fn load_records<'a, S>(resource: impl Into<Resource<'a, S>>) -> Result<Records<'a, S>>
where
    S: Read + ?Sized + 'a,
{
    load_records_with(resource, Limits::default())
}

/// Like [`load_records`], with explicit decoder limits
pub fn load_records_with<'a, S>(
    resource: impl Into<Resource<'a, S>>,
    limits: Limits,
) -> Result<Records<'a, S>>
where
    S: Read + ?Sized + 'a,
{
    let handle = ResourceHandle::open(resource, Some(OpenMode::READ_BINARY))?;
    Ok(Records::new(handle, limits))
}

/// Lazy iterator over the records of one resource.
///
/// Yields `Ok(value)` per record and ends with `None` when the input stops
/// exactly at a record boundary. Input that stops inside a record, or bytes
/// that are not a record, yield one `Err` after which the iterator is done.
/// The resource is released when the iterator finishes, or when it is
/// closed or dropped before that.
///
/// Adopted streams are read unbuffered so no bytes past the last record
/// taken are consumed; wrap them in a `BufReader` for bulk reads.
pub struct Records<'a, S: Read + ?Sized = std::fs::File> {
    ctx: Option<ReadContext<ResourceHandle<'a, S>>>,
    limits: Limits,
    yielded: usize,
}

impl<'a, S: Read + ?Sized> Records<'a, S> {
    /// Iterate over the records of an already opened handle
    pub fn new(handle: ResourceHandle<'a, S>, limits: Limits) -> Self {
        Self {
            ctx: Some(ReadContext::new(handle)),
            limits,
            yielded: 0,
        }
    }

    /// Bytes consumed so far (0 once released)
    pub fn offset(&self) -> u64 {
        self.ctx.as_ref().map_or(0, ReadContext::offset)
    }

    /// Records yielded so far
    pub fn count_yielded(&self) -> usize {
        self.yielded
    }

    /// True once the resource has been released
    pub fn is_released(&self) -> bool {
        self.ctx.is_none()
    }

    /// Stop early and release the resource
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        match self.ctx.take() {
            Some(ctx) => ctx.into_inner().close(),
            None => Ok(()),
        }
    }
}

impl<'a, S: Read + ?Sized> Iterator for Records<'a, S> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let ctx = self.ctx.as_mut()?;
        match decode_next(ctx, &self.limits) {
            Ok(Some(value)) => {
                self.yielded += 1;
                Some(Ok(value))
            }
            Ok(None) => {
                debug!(records = self.yielded, "Reached end of records");
                self.release().err().map(Err)
            }
            Err(e) => {
                warn!(offset = ctx.offset(), error = %e, "Failed to read record");
                if let Err(close_err) = self.release() {
                    warn!(error = %close_err, "Failed to release resource after read error");
                }
                Some(Err(e))
            }
        }
    }
}

impl<'a, S: Read + ?Sized> std::iter::FusedIterator for Records<'a, S> {}
