//! Read context for decoding records

use crate::error::{Error, SerializationError};
use std::io::{ErrorKind, Read};

/// Byte reader that tracks its offset and reports EOF as truncation
pub struct ReadContext<R: Read> {
    reader: R,
    offset: u64,
}

impl<R: Read> ReadContext<R> {
    /// Create a new read context from a reader
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Read the first byte of a record, or `None` on a clean end of input
    pub fn read_boundary_byte(&mut self) -> Result<Option<u8>, Error> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    /// Fill `buf` completely
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.reader.read_exact(buf).map_err(|e| self.classify(e))?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    /// Read a specific number of bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        // The length comes off the wire; grow as bytes actually arrive
        let mut buf = Vec::with_capacity(len.min(64 * 1024));
        let result = (&mut self.reader).take(len as u64).read_to_end(&mut buf);
        let read = result.map_err(|e| self.classify(e))?;
        self.offset += read as u64;
        if read < len {
            return Err(SerializationError::Truncated {
                offset: self.offset,
            }
            .into());
        }
        Ok(buf)
    }

    fn classify(&self, e: std::io::Error) -> Error {
        if e.kind() == ErrorKind::UnexpectedEof {
            SerializationError::Truncated {
                offset: self.offset,
            }
            .into()
        } else {
            Error::Io(e)
        }
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}
