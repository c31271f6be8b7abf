//! Capture file source
//!
//! Provides `CaptureSource` - a sequential reader for raw analyzer captures
//! that yields [`Sample`]s in file order.
//!
//! A capture is a flat sequence of 9-byte records with no header or footer:
//!
//! | Offset | Size | Content                          |
//! |--------|------|----------------------------------|
//! | 0      | 8    | sequence number, little endian   |
//! | 8      | 1    | sample byte, one bit per probe   |
//!
//! The source reads through a fixed-size buffer. When a read needs more bytes
//! than are left, the remainder is moved to the front of the buffer and the
//! free space is refilled from the underlying reader.

use crate::runtime::sample::Sample;
use crate::{LpcError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Default size of the refill buffer
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Sequential sample source over a capture
///
/// Reads return `Ok(Some(_))` for a value, `Ok(None)` at end of stream and
/// `Err(_)` once the underlying reader failed. After a failure every further
/// read fails with [`LpcError::SourceFailed`].
pub struct CaptureSource<R> {
    name: String,
    reader: R,
    buffer: Box<[u8]>,
    /// Valid bytes in `buffer`
    len: usize,
    /// Next byte to hand out
    offset: usize,
    /// The reader returned 0 bytes on a refill
    reader_done: bool,
    error: bool,
    records_read: u64,
}

impl CaptureSource<File> {
    /// Open a capture file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| LpcError::Open {
            path: name.clone(),
            source,
        })?;

        let source = Self::from_reader(file, name, DEFAULT_BUFFER_SIZE)?;
        info!("Opened capture '{}'", source.name);
        Ok(source)
    }
}

impl<R: Read> CaptureSource<R> {
    /// Create a source over any reader
    pub fn new(reader: R) -> Result<Self> {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Create a source with a custom buffer size (at least one record)
    pub fn with_capacity(reader: R, capacity: usize) -> Result<Self> {
        Self::from_reader(reader, "capture".to_string(), capacity)
    }

    fn from_reader(reader: R, name: String, capacity: usize) -> Result<Self> {
        let mut source = Self {
            name,
            reader,
            buffer: vec![0u8; capacity.max(Sample::RECORD_SIZE)].into_boxed_slice(),
            len: 0,
            offset: 0,
            reader_done: false,
            error: false,
            records_read: 0,
        };

        // Read in the first chunk
        source.refill(1)?;
        if source.len == 0 {
            return Err(LpcError::EmptyCapture(source.name));
        }

        debug!(
            "[{}] Buffer of {} bytes, {} bytes initially",
            source.name,
            source.buffer.len(),
            source.len
        );
        Ok(source)
    }

    /// Set custom name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the reader is exhausted and every buffered byte was consumed
    pub fn is_eos(&self) -> bool {
        self.reader_done && self.offset >= self.len
    }

    /// Whether the underlying reader failed
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Complete records handed out so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn available(&self) -> usize {
        self.len - self.offset
    }

    /// Move the unread bytes to the front and read until `needed` bytes are
    /// buffered, the buffer is full or the reader is exhausted.
    fn refill(&mut self, needed: usize) -> Result<()> {
        let remaining = self.available();
        self.buffer.copy_within(self.offset..self.len, 0);
        self.offset = 0;
        self.len = remaining;

        while self.len < needed && self.len < self.buffer.len() {
            match self.reader.read(&mut self.buffer[self.len..]) {
                Ok(0) => {
                    self.reader_done = true;
                    break;
                }
                Ok(n) => self.len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = true;
                    return Err(LpcError::Io(e));
                }
            }
        }
        Ok(())
    }

    /// Make sure `count` bytes are buffered. Returns false at end of stream.
    fn ensure_data(&mut self, count: usize) -> Result<bool> {
        if self.error {
            return Err(LpcError::SourceFailed(self.name.clone()));
        }
        if self.available() >= count {
            return Ok(true);
        }
        if !self.reader_done {
            self.refill(count)?;
        }
        Ok(self.available() >= count)
    }

    /// Take `N` bytes out of the buffer
    fn take<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        if !self.ensure_data(N)? {
            return Ok(None);
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.offset..self.offset + N]);
        self.offset += N;
        Ok(Some(bytes))
    }

    /// Next byte of the capture
    pub fn read_u8(&mut self) -> Result<Option<u8>> {
        Ok(self.take::<1>()?.map(|[b]| b))
    }

    /// Next little-endian 64-bit value of the capture
    pub fn read_u64(&mut self) -> Result<Option<u64>> {
        Ok(self.take::<8>()?.map(u64::from_le_bytes))
    }

    /// Next complete sample record
    ///
    /// A partial record at the end of the capture is dropped with a warning
    /// and ends the stream.
    pub fn next_sample(&mut self) -> Result<Option<Sample>> {
        let Some(record) = self.take::<{ Sample::RECORD_SIZE }>()? else {
            let trailing = self.available();
            if trailing > 0 {
                warn!(
                    "[{}] Capture ends with a partial record ({} of {} bytes) after {} records",
                    self.name,
                    trailing,
                    Sample::RECORD_SIZE,
                    self.records_read
                );
                self.offset = self.len;
            }
            return Ok(None);
        };

        let mut seq_no = [0u8; 8];
        seq_no.copy_from_slice(&record[..8]);
        self.records_read += 1;
        Ok(Some(Sample::new(u64::from_le_bytes(seq_no), record[8])))
    }
}

impl<R: Read> Iterator for CaptureSource<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample().transpose()
    }
}
