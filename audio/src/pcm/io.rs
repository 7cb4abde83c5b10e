//! Byte-level I/O adapters.
//!
//! The header codec and the stream controller only need two narrow
//! capabilities: pull the next bytes of a source and push bytes to a sink.
//! [`ReaderSource`] and [`WriterSink`] bridge those to `io::Read` and
//! `io::Write`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// A sequential, read-only source of bytes.
pub trait ByteSource {
    /// Removes and returns up to `n` bytes. Fewer are returned only at the end
    /// of the source.
    fn pop(&mut self, n: usize) -> io::Result<Vec<u8>>;

    /// Returns the number of bytes not yet popped.
    fn bytes_remaining(&self) -> u64;
}

/// A sequential, append-only sink of bytes.
pub trait ByteSink {
    /// Appends all of `bytes`.
    fn push(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Returns the number of bytes pushed so far.
    fn bytes_written(&self) -> u64;
}

/// Wraps an `io::Read` of known length as a [`ByteSource`].
pub struct ReaderSource<R: Read> {
    reader: R,
    remaining: u64,
}

impl<R: Read> ReaderSource<R> {
    /// Creates a source reading at most `len` bytes from `reader`.
    pub fn new(reader: R, len: u64) -> Self {
        Self {
            reader,
            remaining: len,
        }
    }

    /// Consumes the source and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl ReaderSource<BufReader<File>> {
    /// Opens a file for sequential reading.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self::new(BufReader::new(file), len))
    }
}

impl ReaderSource<Cursor<Vec<u8>>> {
    /// Creates a source over an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let len = data.len() as u64;
        Self::new(Cursor::new(data), len)
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn pop(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let want = (n as u64).min(self.remaining) as usize;
        let mut buf = vec![0u8; want];
        let mut filled = 0;

        while filled < want {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        buf.truncate(filled);
        if filled < want {
            // The reader ended early; nothing more will come.
            self.remaining = 0;
        } else {
            self.remaining -= filled as u64;
        }
        Ok(buf)
    }

    fn bytes_remaining(&self) -> u64 {
        self.remaining
    }
}

/// Wraps an `io::Write` as a [`ByteSink`].
pub struct WriterSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> WriterSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<BufWriter<File>> {
    /// Creates (or truncates) a file for writing.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn push(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}
