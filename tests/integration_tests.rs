//! Integration tests for spoolkit

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use spoolkit::{
    dump_object, dump_records, load_object, load_records, load_records_with, with_resource, Error,
    Limits, OpenMode, Resource, ResourceHandle, SerializationError, Value,
};
use tempfile::tempdir;

fn mixed_values() -> Vec<Value> {
    vec![
        Value::None,
        Value::from(true),
        Value::from(0),
        Value::from(-42),
        Value::Int(i64::MAX),
        Value::Int(i64::MIN),
        Value::from(3.14159),
        Value::Float(f64::NAN),
        Value::from(""),
        Value::from("Unicode: 你好世界 🌍"),
        Value::from(&[0u8, 1, 2, 255][..]),
        Value::List(vec![Value::from("a"), Value::List(vec![Value::from("b")])]),
        Value::Tuple(vec![Value::from(1), Value::None]),
        Value::set(vec![Value::from("x"), Value::from("y"), Value::from(1)]),
        Value::map(vec![
            (Value::from("name"), Value::from("Alice")),
            (Value::from("age"), Value::from(30)),
            (
                Value::Tuple(vec![Value::from(1), Value::from(2)]),
                Value::map(vec![(Value::from("nested"), Value::List(vec![]))]),
            ),
        ]),
    ]
}

fn read_all(path: &Path) -> Vec<Value> {
    load_records(path)
        .unwrap()
        .collect::<spoolkit::Result<_>>()
        .unwrap()
}

#[test]
fn test_records_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.bin");

    let written = dump_records(&path, &mixed_values()).unwrap();
    assert_eq!(written, mixed_values().len());
    assert_eq!(read_all(&path), mixed_values());
}

#[test]
fn test_records_overwrite_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.bin");

    dump_records(&path, &mixed_values()).unwrap();
    dump_records(&path, [Value::from("only")]).unwrap();
    assert_eq!(read_all(&path), vec![Value::from("only")]);
}

#[test]
fn test_object_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("object.bin");

    for value in mixed_values() {
        dump_object(&path, &value).unwrap();
        assert_eq!(load_object(&path).unwrap(), value);
    }
}

#[test]
fn test_object_reads_first_record_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("many.bin");

    dump_records(&path, &mixed_values()).unwrap();
    assert_eq!(load_object(&path).unwrap(), Value::None);
}

#[test]
fn test_load_object_from_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.bin");
    File::create(&path).unwrap();

    let err = load_object(&path).unwrap_err();
    assert!(matches!(err, Error::Serialization(SerializationError::Empty)));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.bin");

    assert!(matches!(
        load_records(&path).err().unwrap(),
        Error::ResourceNotFound { .. }
    ));
    assert!(matches!(
        load_object(&path).unwrap_err(),
        Error::ResourceNotFound { .. }
    ));
    assert!(!path.exists());

    // Writing creates it
    dump_object(&path, &Value::from(1)).unwrap();
    assert!(path.exists());
}

#[test]
fn test_directory_rejected() {
    let dir = tempdir().unwrap();
    let err = dump_records(dir.path(), [Value::None]).unwrap_err();
    assert!(matches!(err, Error::InvalidResourceKind { .. }));
}

#[test]
fn test_truncated_file_reports_error_after_good_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cut.bin");
    dump_records(&path, &mixed_values()).unwrap();

    let len = std::fs::metadata(&path).unwrap().len();
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 1).unwrap();
    drop(file);

    let results: Vec<_> = load_records(&path).unwrap().collect();
    assert_eq!(results.len(), mixed_values().len());
    let (last, good) = results.split_last().unwrap();
    assert!(good.iter().all(|r| r.is_ok()));
    assert!(matches!(
        last,
        Err(Error::Serialization(SerializationError::Truncated { .. }))
    ));
}

#[test]
fn test_partial_consumption_releases_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.bin");
    dump_records(&path, &mixed_values()).unwrap();

    let mut records = load_records(&path).unwrap();
    assert_eq!(records.next().unwrap().unwrap(), Value::None);
    records.close().unwrap();

    // Dropping an unfinished iterator also releases it
    {
        let mut records = load_records(&path).unwrap();
        records.next();
    }

    // The file is free to be replaced and removed
    dump_records(&path, [Value::from(7)]).unwrap();
    assert_eq!(read_all(&path), vec![Value::from(7)]);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_limits_apply_to_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deep.bin");
    let deep = Value::List(vec![Value::List(vec![Value::List(vec![])])]);
    dump_records(&path, [deep.clone()]).unwrap();

    let limits = Limits::default().with_max_depth(2);
    let err = load_records_with(&path, limits)
        .unwrap()
        .next()
        .unwrap()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::DepthExceeded { limit: 2 })
    ));
    assert_eq!(read_all(&path), vec![deep]);
}

fn too_deep() -> Value {
    let mut value = Value::None;
    for _ in 0..=spoolkit::DEFAULT_MAX_DEPTH {
        value = Value::List(vec![value]);
    }
    value
}

#[test]
fn test_dump_records_stops_at_unencodable_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial-write.bin");

    let err = dump_records(&path, [Value::from("first"), too_deep(), Value::from("never")])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::DepthExceeded { .. })
    ));

    // No rollback: what was written before the failure stays
    assert_eq!(read_all(&path), vec![Value::from("first")]);

    // Released: the file can be rewritten and removed
    dump_records(&path, [Value::from(1)]).unwrap();
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_dump_object_rejects_unencodable_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("object.bin");
    dump_object(&path, &Value::from("kept")).unwrap();

    let err = dump_object(&path, &too_deep()).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::DepthExceeded { .. })
    ));
    assert_eq!(load_object(&path).unwrap(), Value::from("kept"));
}

#[test]
fn test_adopted_file_stays_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("adopted.bin");
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .unwrap();

    dump_records(&mut file, [Value::from("one")]).unwrap();
    dump_object(&mut file, &Value::from("two")).unwrap();

    // Still ours to use
    file.seek(SeekFrom::Start(0)).unwrap();
    let values: Vec<Value> = load_records(&mut file)
        .unwrap()
        .collect::<spoolkit::Result<_>>()
        .unwrap();
    assert_eq!(values, vec![Value::from("one"), Value::from("two")]);
    file.write_all(b"tail").unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), file.stream_position().unwrap());
}

#[test]
fn test_adopted_stream_mode_is_advisory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("append.txt");
    std::fs::write(&path, "start").unwrap();

    let mut file = File::options().append(true).open(&path).unwrap();
    with_resource(&mut file, Some(OpenMode::WRITE_TEXT), |f| {
        assert!(!f.is_owned());
        f.write_all(b"+more")?;
        Ok(())
    })
    .unwrap();
    file.write_all(b"+after").unwrap();
    drop(file);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "start+more+after");
}

#[test]
fn test_default_mode_reads_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    std::fs::write(&path, "line one\nline two\n").unwrap();

    let text = with_resource(Resource::path(&path), None, |f| f.read_text()).unwrap();
    assert_eq!(text, "line one\nline two\n");

    let mut handle = ResourceHandle::open(&path, Some(OpenMode::READ_BINARY)).unwrap();
    let mut bytes = Vec::new();
    handle.read_to_end(&mut bytes).unwrap();
    handle.close().unwrap();
    assert_eq!(bytes, b"line one\nline two\n");
}

#[test]
fn test_mode_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modes.txt");

    let mode: OpenMode = "w".parse().unwrap();
    with_resource(&path, Some(mode), |f| Ok(f.write_all(b"abc")?)).unwrap();
    let mode: OpenMode = "ab".parse().unwrap();
    with_resource(&path, Some(mode), |f| Ok(f.write_all(b"def")?)).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
    assert!(matches!(
        "rw".parse::<OpenMode>(),
        Err(Error::InvalidMode(_))
    ));
}
