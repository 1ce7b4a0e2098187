//! Growable read-ahead buffer for streaming input.
//!
//! The buffer keeps four offsets into one byte vector:
//!
//! ```text
//! 0 ... start ... pos ... limit ... data.len()
//!       token     read    valid     end of
//!       start     cursor  bytes     buffer
//! ```
//!
//! Bytes before `start` are dead and may be discarded by [`InputBuffer::compact`].
//! Refills append after `limit` in blocks of [`REFILL_BLOCK`] bytes; growth is
//! confined to [`InputBuffer::ensure_capacity`] so the parser never does
//! pointer arithmetic on the buffer itself.

use std::io::{self, Read};

/// Size of one refill read: 1 MiB.
pub const REFILL_BLOCK: usize = 1 << 20;

/// A sliding window over a byte stream.
pub struct InputBuffer<R> {
    reader: R,
    data: Vec<u8>,
    start: usize,
    pos: usize,
    limit: usize,
    /// The reader reported end of input.
    eof: bool,
    block: usize,
    consumed: usize,
}

impl<R: Read> InputBuffer<R> {
    /// Wrap a reader, refilling in [`REFILL_BLOCK`]-sized blocks.
    pub fn new(reader: R) -> Self {
        Self::with_block_size(reader, REFILL_BLOCK)
    }

    /// Wrap a reader with a custom refill block size (at least one byte).
    pub fn with_block_size(reader: R, block: usize) -> Self {
        Self {
            reader,
            data: Vec::new(),
            start: 0,
            pos: 0,
            limit: 0,
            eof: false,
            block: block.max(1),
            consumed: 0,
        }
    }

    /// Make room for at least `n` more bytes after the valid region,
    /// compacting first and growing the allocation only if that is not enough.
    pub fn ensure_capacity(&mut self, n: usize) {
        if self.data.len() - self.limit >= n {
            return;
        }
        self.compact();
        if self.data.len() - self.limit < n {
            self.data.resize(self.limit + n, 0);
        }
    }

    /// Shift the live range `start..limit` to the front of the buffer.
    pub fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.data.copy_within(self.start..self.limit, 0);
        self.pos -= self.start;
        self.limit -= self.start;
        self.start = 0;
    }

    /// Mark the current read position as the start of the live range.
    pub const fn mark(&mut self) {
        self.start = self.pos;
    }

    /// Look at the next byte without consuming it.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the underlying stream.
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.limit {
            self.mark();
            if !self.fill()? {
                return Ok(None);
            }
        }
        Ok(Some(self.data[self.pos]))
    }

    /// Consume and return the next byte.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the underlying stream.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.pos += 1;
            self.consumed += 1;
        }
        Ok(byte)
    }

    /// Total number of bytes consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of bytes read from the stream but not yet consumed.
    #[must_use]
    pub const fn buffered(&self) -> usize {
        self.limit - self.pos
    }

    /// Allocated size of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Read one block from the stream. Returns `false` at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        self.ensure_capacity(self.block);
        loop {
            match self.reader.read(&mut self.data[self.limit..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.limit += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
