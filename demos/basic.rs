//! Basic example: spool values to a file, read them back, then do the same
//! over tokio I/O

use spoolkit::aio::{read_all_records_async, write_records_async};
use spoolkit::{dump_object, dump_records, load_object, load_records, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Spoolkit Example ===\n");

    let dir = std::env::temp_dir().join("spoolkit-demo");
    std::fs::create_dir_all(&dir)?;

    // Example 1: a stream of records in a file
    println!("Example 1: Records");
    {
        let path = dir.join("records.bin");
        let values = vec![
            Value::from("Hello, Spoolkit!"),
            Value::from(42),
            Value::map(vec![
                (Value::from("name"), Value::from("Alice")),
                (Value::from("tags"), Value::List(vec![Value::from("rust"), Value::from("io")])),
            ]),
        ];

        let count = dump_records(&path, &values)?;
        println!("  Wrote {} records to {}", count, path.display());

        for value in load_records(&path)? {
            println!("  Read: {:?}", value?);
        }
        println!();
    }

    // Example 2: a single object in memory
    println!("Example 2: Single object");
    {
        let value = Value::set(vec![Value::from(1), Value::from(2), Value::from(3)]);
        let mut buffer: Vec<u8> = Vec::new();
        dump_object(&mut buffer, &value)?;
        println!("  Serialized set to {} bytes", buffer.len());

        let mut reader = &buffer[..];
        println!("  Deserialized: {:?}\n", load_object(&mut reader)?);
    }

    // Example 3: async
    println!("Example 3: Async records");
    {
        let mut buffer: Vec<u8> = Vec::new();
        let values = vec![Value::from(true), Value::Float(2.5)];
        write_records_async(&mut buffer, tokio_stream::iter(values)).await?;

        let decoded = read_all_records_async(&buffer[..]).await?;
        println!("  Deserialized: {:?}", decoded);
    }

    Ok(())
}
