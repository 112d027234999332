//! Sequential unformatted records, as written by classic Fortran `write(unit)` statements.
//!
//! Every record is framed by a 4-byte little-endian length marker before and after its
//! payload. A record holds one or more items written back to back:
//!
//! | item       | encoding                                        |
//! |------------|-------------------------------------------------|
//! | `i32`      | 4 bytes                                         |
//! | `f32`      | 4 bytes                                         |
//! | `f64`      | 8 bytes                                         |
//! | `bool`     | 4-byte logical, zero is false                   |
//! | `String`   | 512 bytes, padded with spaces                   |
//! | `Vec<i32>` | the remainder of the record                     |
//! | `Vec<f64>` | the remainder of the record                     |
//!
//! Tuples of items are written and read as a single record.
use crate::error::RecordError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Width in bytes of fixed-width string items.
pub const STRING_WIDTH: usize = 512;

/// A view of the unconsumed part of a record payload.
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    /// Consumes `count` bytes for the named item.
    pub fn take(&mut self, item: &'static str, count: usize) -> Result<&'a [u8], RecordError> {
        if count > self.bytes.len() {
            return Err(RecordError::SizeMismatch {
                item,
                expected: count,
                found: self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(count);
        self.bytes = tail;
        Ok(head)
    }

    fn take_array<const M: usize>(&mut self, item: &'static str) -> Result<[u8; M], RecordError> {
        let mut array = [0; M];
        array.copy_from_slice(self.take(item, M)?);
        Ok(array)
    }

    fn take_rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.bytes)
    }
}

/// A value that can be stored as one item of a record.
pub trait RecordItem: Sized {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError>;

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError>;
}

impl RecordItem for i32 {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        buffer.extend_from_slice(&self.to_le_bytes());
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        Ok(i32::from_le_bytes(cursor.take_array("integer")?))
    }
}

impl RecordItem for f32 {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        buffer.extend_from_slice(&self.to_le_bytes());
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        Ok(f32::from_le_bytes(cursor.take_array("single precision real")?))
    }
}

impl RecordItem for f64 {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        buffer.extend_from_slice(&self.to_le_bytes());
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        Ok(f64::from_le_bytes(cursor.take_array("double precision real")?))
    }
}

impl RecordItem for bool {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        i32::from(*self).encode(buffer)
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        let value = i32::from_le_bytes(cursor.take_array("logical")?);
        Ok(value != 0)
    }
}

impl RecordItem for String {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        let bytes = self.as_bytes();
        if bytes.len() > STRING_WIDTH {
            return Err(RecordError::StringTooLong {
                length: bytes.len(),
                width: STRING_WIDTH,
            });
        }
        buffer.extend_from_slice(bytes);
        buffer.resize(buffer.len() + STRING_WIDTH - bytes.len(), b' ');
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        let bytes = cursor.take("string", STRING_WIDTH)?;
        let string = std::str::from_utf8(bytes).map_err(|_| RecordError::InvalidString)?;
        Ok(string.trim_end().to_string())
    }
}

impl RecordItem for Vec<i32> {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        for value in self {
            value.encode(buffer)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        decode_remainder(cursor, "integer array", 4)
    }
}

impl RecordItem for Vec<f64> {
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        for value in self {
            value.encode(buffer)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        decode_remainder(cursor, "double precision array", 8)
    }
}

fn decode_remainder<V: RecordItem>(
    cursor: &mut RecordCursor<'_>,
    item: &'static str,
    size: usize,
) -> Result<Vec<V>, RecordError> {
    let rest = cursor.take_rest();
    if rest.len() % size != 0 {
        return Err(RecordError::SizeMismatch {
            item,
            expected: rest.len() + size - rest.len() % size,
            found: rest.len(),
        });
    }
    let mut values = RecordCursor::new(rest);
    (0..rest.len() / size).map(|_| V::decode(&mut values)).collect()
}

/// A complete record: a single item or a tuple of items.
pub trait Record: Sized {
    fn encode_record(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError>;

    fn decode_record(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError>;
}

impl<I: RecordItem> Record for I {
    fn encode_record(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
        self.encode(buffer)
    }

    fn decode_record(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
        I::decode(cursor)
    }
}

macro_rules! impl_record_for_tuple {
    ($($item:ident),+) => {
        impl<$($item: RecordItem),+> Record for ($($item,)+) {
            #[allow(non_snake_case)]
            fn encode_record(&self, buffer: &mut Vec<u8>) -> Result<(), RecordError> {
                let ($($item,)+) = self;
                $($item.encode(buffer)?;)+
                Ok(())
            }

            fn decode_record(cursor: &mut RecordCursor<'_>) -> Result<Self, RecordError> {
                Ok(($($item::decode(cursor)?,)+))
            }
        }
    };
}

impl_record_for_tuple!(A, B);
impl_record_for_tuple!(A, B, C);
impl_record_for_tuple!(A, B, C, D);
impl_record_for_tuple!(A, B, C, D, E);
impl_record_for_tuple!(A, B, C, D, E, F);

/// Reads records one by one from a byte stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads the next record as raw payload bytes.
    pub fn read_payload(&mut self) -> Result<Vec<u8>, RecordError> {
        let leading = self.read_marker()?;
        // Grows only with the bytes actually present
        let mut payload = Vec::new();
        (&mut self.reader).take(u64::from(leading)).read_to_end(&mut payload)?;
        if payload.len() != leading as usize {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "record payload is truncated").into());
        }
        let trailing = self.read_marker()?;
        if leading != trailing {
            return Err(RecordError::MarkerMismatch { leading, trailing });
        }
        Ok(payload)
    }

    /// Reads the next record, which must consist of exactly the items of `Rec`.
    pub fn read<Rec: Record>(&mut self) -> Result<Rec, RecordError> {
        let payload = self.read_payload()?;
        let mut cursor = RecordCursor::new(&payload);
        let record = Rec::decode_record(&mut cursor)?;
        check_consumed(&cursor)?;
        Ok(record)
    }

    /// Reads the next record as an array of exactly `len` items.
    pub fn read_array<I: RecordItem>(&mut self, len: usize) -> Result<Vec<I>, RecordError> {
        let payload = self.read_payload()?;
        let mut cursor = RecordCursor::new(&payload);
        let mut values = Vec::with_capacity(len);
        for found in 0..len {
            match I::decode(&mut cursor) {
                Ok(value) => values.push(value),
                Err(RecordError::SizeMismatch { .. }) => {
                    return Err(RecordError::LengthMismatch { expected: len, found });
                }
                Err(err) => return Err(err),
            }
        }
        check_consumed(&cursor)?;
        Ok(values)
    }

    /// Skips the next record.
    pub fn skip(&mut self) -> Result<(), RecordError> {
        self.read_payload().map(|_| ())
    }

    fn read_marker(&mut self) -> Result<u32, RecordError> {
        let mut marker = [0; 4];
        self.reader.read_exact(&mut marker)?;
        Ok(u32::from_le_bytes(marker))
    }
}

fn check_consumed(cursor: &RecordCursor<'_>) -> Result<(), RecordError> {
    match cursor.remaining() {
        0 => Ok(()),
        remaining => Err(RecordError::TrailingBytes { remaining }),
    }
}

/// Writes records one by one to a byte stream.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
}

impl RecordWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: Vec::new(),
        }
    }

    pub fn write<Rec: Record>(&mut self, record: &Rec) -> Result<(), RecordError> {
        self.buffer.clear();
        record.encode_record(&mut self.buffer)?;
        self.write_buffer()
    }

    /// Writes the items of `values` as a single record.
    pub fn write_array<I: RecordItem>(&mut self, values: &[I]) -> Result<(), RecordError> {
        self.buffer.clear();
        for value in values {
            value.encode(&mut self.buffer)?;
        }
        self.write_buffer()
    }

    pub fn flush(&mut self) -> Result<(), RecordError> {
        Ok(self.writer.flush()?)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W, RecordError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_buffer(&mut self) -> Result<(), RecordError> {
        let len = self.buffer.len();
        let marker = u32::try_from(len).map_err(|_| RecordError::RecordTooLong(len))?;
        self.writer.write_all(&marker.to_le_bytes())?;
        self.writer.write_all(&self.buffer)?;
        self.writer.write_all(&marker.to_le_bytes())?;
        Ok(())
    }
}
