//! Scoped access to a resource given either as a path or as an open stream
//!
//! A [`Resource`] decides ownership once, by its variant. A path is opened
//! here and the resulting file belongs to the [`ResourceHandle`]; it is
//! closed when the handle is closed or dropped, whichever comes first, on
//! every exit path. A borrowed stream is only lent to the handle and is
//! never closed by it.

use crate::error::{Error, Result};
use crate::mode::{Access, OpenMode};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A path to open, or a stream the caller already holds
#[derive(Debug)]
pub enum Resource<'a, S: ?Sized = File> {
    /// Opened (and later closed) by the handle
    Path(PathBuf),
    /// Borrowed from the caller; left open
    Handle(&'a mut S),
}

impl Resource<'_, File> {
    /// Create a path resource
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Resource::Path(path.into())
    }
}

impl<'a, S: ?Sized> Resource<'a, S> {
    /// Create a resource that adopts an open stream
    pub fn handle(stream: &'a mut S) -> Self {
        Resource::Handle(stream)
    }

    /// True if a handle built from this resource will own its stream
    pub fn is_owned(&self) -> bool {
        matches!(self, Resource::Path(_))
    }
}

impl From<&str> for Resource<'_, File> {
    fn from(path: &str) -> Self {
        Resource::Path(PathBuf::from(path))
    }
}

impl From<String> for Resource<'_, File> {
    fn from(path: String) -> Self {
        Resource::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Resource<'_, File> {
    fn from(path: &Path) -> Self {
        Resource::Path(path.to_path_buf())
    }
}

impl From<&PathBuf> for Resource<'_, File> {
    fn from(path: &PathBuf) -> Self {
        Resource::Path(path.clone())
    }
}

impl From<PathBuf> for Resource<'_, File> {
    fn from(path: PathBuf) -> Self {
        Resource::Path(path)
    }
}

impl<'a, S: ?Sized> From<&'a mut S> for Resource<'a, S> {
    fn from(stream: &'a mut S) -> Self {
        Resource::Handle(stream)
    }
}

enum Inner<'a, S: ?Sized> {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
    Adopted(&'a mut S),
}

/// Stream yielded for the duration of a scoped operation
pub struct ResourceHandle<'a, S: ?Sized = File> {
    inner: Inner<'a, S>,
    mode: Option<OpenMode>,
    path: Option<PathBuf>,
}

impl<'a, S: ?Sized> ResourceHandle<'a, S> {
    /// Open a path with `mode` (read-text when `None`) or adopt a stream.
    ///
    /// A mode given with an adopted stream is recorded but not applied: the
    /// stream is not reopened, truncated or checked against it.
    pub fn open(resource: impl Into<Resource<'a, S>>, mode: Option<OpenMode>) -> Result<Self> {
        match resource.into() {
            Resource::Path(path) => {
                let mode = mode.unwrap_or_default();
                let inner = open_path(&path, mode)?;
                debug!(path = %path.display(), %mode, "Opened owned resource");
                Ok(Self {
                    inner,
                    mode: Some(mode),
                    path: Some(path),
                })
            }
            Resource::Handle(stream) => {
                if let Some(mode) = mode {
                    trace!(%mode, "Mode ignored for adopted stream");
                }
                Ok(Self {
                    inner: Inner::Adopted(stream),
                    mode,
                    path: None,
                })
            }
        }
    }

    /// True if the stream was opened here and will be closed here
    pub fn is_owned(&self) -> bool {
        !matches!(self.inner, Inner::Adopted(_))
    }

    /// Mode the path was opened with, or the advisory mode of an adopted stream
    pub fn mode(&self) -> Option<OpenMode> {
        self.mode
    }

    /// Path of an owned resource
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the resource.
    ///
    /// An owned file is flushed and closed, with a flush failure reported
    /// rather than lost as it would be on drop. An adopted stream is left
    /// exactly as it is.
    pub fn close(self) -> Result<()> {
        match self.inner {
            Inner::Reader(reader) => drop(reader),
            Inner::Writer(mut writer) => {
                writer.flush()?;
                drop(writer);
            }
            Inner::Adopted(_) => return Ok(()),
        }
        if let Some(path) = &self.path {
            debug!(path = %path.display(), "Closed owned resource");
        }
        Ok(())
    }
}

impl<'a, S: Read + ?Sized> ResourceHandle<'a, S> {
    /// Read everything left in the stream as UTF-8 text
    pub fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        self.read_to_string(&mut text)?;
        Ok(text)
    }
}

fn open_path<'a, S: ?Sized>(path: &Path, mode: OpenMode) -> Result<Inner<'a, S>> {
    // Device nodes and pipes open like files; only directories are refused
    if path.is_dir() {
        return Err(Error::InvalidResourceKind {
            kind: "directory".to_string(),
        });
    }

    let file = mode.open_options().open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound && mode.access == Access::Read {
            Error::ResourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    Ok(match mode.access {
        Access::Read => Inner::Reader(BufReader::new(file)),
        Access::Write | Access::Append => Inner::Writer(BufWriter::new(file)),
    })
}

fn wrong_direction(expected: &str) -> io::Error {
    io::Error::new(
        ErrorKind::Unsupported,
        format!("resource was not opened for {}", expected),
    )
}

impl<'a, S: Read + ?Sized> Read for ResourceHandle<'a, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Reader(reader) => reader.read(buf),
            Inner::Writer(_) => Err(wrong_direction("reading")),
            Inner::Adopted(stream) => stream.read(buf),
        }
    }
}

impl<'a, S: Write + ?Sized> Write for ResourceHandle<'a, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Reader(_) => Err(wrong_direction("writing")),
            Inner::Writer(writer) => writer.write(buf),
            Inner::Adopted(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Inner::Reader(_) => Ok(()),
            Inner::Writer(writer) => writer.flush(),
            Inner::Adopted(stream) => stream.flush(),
        }
    }
}

/// Run `f` with the resource opened or adopted, then release it.
///
/// On success an owned stream is flushed and closed, and a failure to do so
/// is returned. When `f` fails the stream is still closed and `f`'s error is
/// returned.
pub fn with_resource<'a, S, T, F>(
    resource: impl Into<Resource<'a, S>>,
    mode: Option<OpenMode>,
    f: F,
) -> Result<T>
where
    S: ?Sized + 'a,
    F: FnOnce(&mut ResourceHandle<'a, S>) -> Result<T>,
{
    let mut handle = ResourceHandle::open(resource, mode)?;
    match f(&mut handle) {
        Ok(value) => {
            handle.close()?;
            Ok(value)
        }
        Err(e) => {
            drop(handle);
            Err(e)
        }
    }
}
