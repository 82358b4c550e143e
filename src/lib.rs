//! # Spoolkit
//!
//! Low-level helpers for programs that spool values to files and streams.
//!
//! - [`Resource`] / [`ResourceHandle`]: operate on something that is either a
//!   path (opened and closed here) or a stream the caller already holds
//!   (borrowed, never closed here).
//! - [`dump_records`] / [`load_records`]: write a sequence of [`Value`]s as
//!   back-to-back self-delimiting records and read them back lazily.
//! - [`dump_object`] / [`load_object`]: the same for exactly one value.
//! - [`aio`]: the record stream over tokio's async I/O traits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use spoolkit::{dump_records, load_records, Value};
//!
//! fn main() -> spoolkit::Result<()> {
//!     let values = vec![Value::from("hello"), Value::from(42), Value::List(vec![Value::None])];
//!     dump_records("values.bin", &values)?;
//!
//!     for value in load_records("values.bin")? {
//!         println!("{:?}", value?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aio;
mod codec;
mod config;
mod data_types;
mod error;
mod mode;
mod object;
mod read_context;
mod records;
mod resource;
mod rolling_uint;
mod value;

pub use codec::{decode, decode_next, encode, encoded_len};
pub use config::{Limits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
pub use data_types::DataType;
pub use error::{Error, Result, SerializationError};
pub use mode::{Access, Format, OpenMode};
pub use object::{dump_object, load_object, load_object_with};
pub use read_context::ReadContext;
pub use records::{dump_records, load_records, load_records_with, Records};
pub use resource::{with_resource, Resource, ResourceHandle};
pub use value::Value;
