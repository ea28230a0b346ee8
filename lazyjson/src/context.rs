// SPDX-License-Identifier: Apache-2.0

//! Input contexts: where bytes come from and where decoded literals go.
//!
//! All three contexts hand out literals that stay valid for as long as the context is
//! borrowed, so a callback may keep a field name while it recurses into a nested value.

use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use typed_arena::Arena;

use crate::reader::Reader;

/// Depth limit used when a context is built with `new`.
pub const DEFAULT_NESTING_LIMIT: usize = 32;

/// Bytes pulled from a [`Reader`] per call.
pub const STREAM_CHUNK_SIZE: usize = 64;

/// What kind of container a parent parser has already opened for its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedStatus {
    #[default]
    None,
    Object,
    Array,
}

/// Depth counter and pending-container flag shared by every context.
#[derive(Debug, Default)]
pub struct Nesting {
    status: Cell<NestedStatus>,
    level: Cell<usize>,
}

impl Nesting {
    pub fn status(&self) -> NestedStatus {
        self.status.get()
    }

    pub fn level(&self) -> usize {
        self.level.get()
    }

    /// Records that an opening delimiter was consumed on behalf of a child parse.
    pub fn begin_nested(&self, status: NestedStatus) {
        self.status.set(status);
        self.level.set(self.level.get().saturating_add(1));
    }

    pub fn reset_status(&self) {
        self.status.set(NestedStatus::None);
    }

    pub fn end_nested(&self) {
        self.level.set(self.level.get().saturating_sub(1));
    }

    /// Returns to the depth outside a container parse that started at `level`, and
    /// clears any pending container.
    pub fn leave(&self, level: usize) {
        self.status.set(NestedStatus::None);
        self.level.set(level.saturating_sub(1));
    }
}

/// A byte source plus scratch storage for decoded literals.
///
/// Methods take `&self`; contexts keep their cursor in cells, which also makes them
/// `!Sync`: one parse at a time, on one thread.
pub trait Context {
    /// Next input byte, or `None` at end of input. A NUL byte also ends the input.
    fn read(&self) -> Option<u8>;

    /// Number of bytes consumed so far.
    fn read_offset(&self) -> usize;

    /// Starts a new literal, discarding any unfinished one.
    fn begin_literal(&self);

    /// Appends a decoded byte to the current literal.
    ///
    /// # Panics
    /// Buffer-backed contexts panic if more bytes are written than were read; the
    /// scanner never does this.
    fn write(&self, byte: u8);

    /// Finishes the current literal and returns it.
    fn end_literal(&self) -> &[u8];

    fn nesting(&self) -> &Nesting;

    fn nesting_limit(&self) -> usize {
        DEFAULT_NESTING_LIMIT
    }
}

#[derive(Debug)]
struct InPlace<'a> {
    /// Not yet carved: the current literal starts at 0, unread input at `read`.
    rest: &'a mut [u8],
    read: usize,
    written: usize,
}

/// Parses a mutable buffer in place, without allocating.
///
/// Decoded literals are written over input that has already been read, then split off
/// the front of the buffer. The buffer's contents are garbage afterwards.
///
/// # Example
///
/// ```rust
/// use lazyjson::{parse_object, BufferContext};
///
/// let mut json = br#"{"name": "Alice"}"#.to_vec();
/// let ctx = BufferContext::new(&mut json);
/// let mut name = "";
/// parse_object(&ctx, |field, value| {
///     if field == "name" {
///         name = value.to()?;
///     }
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(name, "Alice");
/// ```
#[derive(Debug)]
pub struct BufferContext<'a, const LIMIT: usize = DEFAULT_NESTING_LIMIT> {
    buffer: RefCell<InPlace<'a>>,
    read_offset: Cell<usize>,
    nesting: Nesting,
}

impl<'a> BufferContext<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::with_limit(buffer)
    }
}

impl<'a, const LIMIT: usize> BufferContext<'a, LIMIT> {
    /// Like [`BufferContext::new`] with a nesting limit of `LIMIT`.
    pub fn with_limit(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer: RefCell::new(InPlace {
                rest: buffer,
                read: 0,
                written: 0,
            }),
            read_offset: Cell::new(0),
            nesting: Nesting::default(),
        }
    }
}

impl<const LIMIT: usize> Context for BufferContext<'_, LIMIT> {
    fn read(&self) -> Option<u8> {
        let mut buffer = self.buffer.borrow_mut();
        let byte = *buffer.rest.get(buffer.read)?;
        buffer.read += 1;
        self.read_offset.set(self.read_offset.get() + 1);
        (byte != 0).then_some(byte)
    }

    fn read_offset(&self) -> usize {
        self.read_offset.get()
    }

    fn begin_literal(&self) {
        self.buffer.borrow_mut().written = 0;
    }

    fn write(&self, byte: u8) {
        let mut buffer = self.buffer.borrow_mut();
        let at = buffer.written;
        if at >= buffer.read {
            panic!("literal write at {at} overran read position {}", buffer.read);
        }
        if let Some(slot) = buffer.rest.get_mut(at) {
            *slot = byte;
        }
        buffer.written = at + 1;
    }

    fn end_literal(&self) -> &[u8] {
        let mut buffer = self.buffer.borrow_mut();
        let written = buffer.written;
        let unread = core::mem::take(&mut buffer.rest);
        let (literal, rest) = unread.split_at_mut(written);
        buffer.rest = rest;
        buffer.read -= written;
        buffer.written = 0;
        literal
    }

    fn nesting(&self) -> &Nesting {
        &self.nesting
    }

    fn nesting_limit(&self) -> usize {
        LIMIT
    }
}

/// Parses a read-only buffer, copying decoded literals into scratch owned by the context.
///
/// Literal storage is a single chunk sized to the input, allocated when the context is
/// built. Decoded bytes are staged in a reusable buffer that grows to the longest literal.
pub struct ConstBufferContext<'a, const LIMIT: usize = DEFAULT_NESTING_LIMIT> {
    input: &'a [u8],
    read_offset: Cell<usize>,
    written: Cell<usize>,
    current: RefCell<Vec<u8>>,
    literals: Arena<u8>,
    nesting: Nesting,
}

impl<'a> ConstBufferContext<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_limit(input)
    }
}

impl<'a, const LIMIT: usize> ConstBufferContext<'a, LIMIT> {
    pub fn with_limit(input: &'a [u8]) -> Self {
        Self {
            input,
            read_offset: Cell::new(0),
            written: Cell::new(0),
            current: RefCell::new(Vec::new()),
            literals: Arena::with_capacity(input.len()),
            nesting: Nesting::default(),
        }
    }
}

impl<const LIMIT: usize> Context for ConstBufferContext<'_, LIMIT> {
    fn read(&self) -> Option<u8> {
        let offset = self.read_offset.get();
        let byte = *self.input.get(offset)?;
        self.read_offset.set(offset + 1);
        (byte != 0).then_some(byte)
    }

    fn read_offset(&self) -> usize {
        self.read_offset.get()
    }

    fn begin_literal(&self) {
        let mut current = self.current.borrow_mut();
        self.written.set(self.written.get() - current.len());
        current.clear();
    }

    fn write(&self, byte: u8) {
        let written = self.written.get();
        if written >= self.read_offset.get() {
            panic!(
                "literal write at {written} overran read position {}",
                self.read_offset.get()
            );
        }
        self.current.borrow_mut().push(byte);
        self.written.set(written + 1);
    }

    fn end_literal(&self) -> &[u8] {
        let mut current = self.current.borrow_mut();
        let literal = self.literals.alloc_extend(current.drain(..));
        literal
    }

    fn nesting(&self) -> &Nesting {
        &self.nesting
    }

    fn nesting_limit(&self) -> usize {
        LIMIT
    }
}

struct StreamInput<R: Reader> {
    reader: R,
    chunk: [u8; STREAM_CHUNK_SIZE],
    pos: usize,
    len: usize,
    finished: bool,
    error: Option<R::Error>,
}

impl<R: Reader> StreamInput<R> {
    fn next_byte(&mut self) -> Option<u8> {
        if self.pos >= self.len {
            if self.finished {
                return None;
            }
            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(count) => {
                    self.pos = 0;
                    self.len = count.min(STREAM_CHUNK_SIZE);
                }
                Err(err) => {
                    log::warn!("stream reader failed, treating as end of input");
                    self.error = Some(err);
                    self.finished = true;
                    return None;
                }
            }
        }
        let byte = *self.chunk.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}

/// Parses bytes pulled from a [`Reader`].
///
/// Each literal gets its own growable buffer; all of them are kept until the context is
/// dropped, so memory grows with the number of tokens parsed.
pub struct StreamContext<R: Reader, const LIMIT: usize = DEFAULT_NESTING_LIMIT> {
    input: RefCell<StreamInput<R>>,
    read_offset: Cell<usize>,
    current: RefCell<Vec<u8>>,
    tokens: Arena<Vec<u8>>,
    nesting: Nesting,
}

impl<R: Reader> StreamContext<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader)
    }
}

impl<R: Reader, const LIMIT: usize> StreamContext<R, LIMIT> {
    pub fn with_limit(reader: R) -> Self {
        Self {
            input: RefCell::new(StreamInput {
                reader,
                chunk: [0; STREAM_CHUNK_SIZE],
                pos: 0,
                len: 0,
                finished: false,
                error: None,
            }),
            read_offset: Cell::new(0),
            current: RefCell::new(Vec::new()),
            tokens: Arena::new(),
            nesting: Nesting::default(),
        }
    }

    /// Returns the reader error that ended the input early, if there was one.
    pub fn take_reader_error(&self) -> Option<R::Error> {
        self.input.borrow_mut().error.take()
    }
}

impl<R: Reader, const LIMIT: usize> Context for StreamContext<R, LIMIT> {
    fn read(&self) -> Option<u8> {
        let byte = self.input.borrow_mut().next_byte()?;
        self.read_offset.set(self.read_offset.get() + 1);
        (byte != 0).then_some(byte)
    }

    fn read_offset(&self) -> usize {
        self.read_offset.get()
    }

    fn begin_literal(&self) {
        self.current.borrow_mut().clear();
    }

    fn write(&self, byte: u8) {
        self.current.borrow_mut().push(byte);
    }

    fn end_literal(&self) -> &[u8] {
        let token = core::mem::take(&mut *self.current.borrow_mut());
        self.tokens.alloc(token).as_slice()
    }

    fn nesting(&self) -> &Nesting {
        &self.nesting
    }

    fn nesting_limit(&self) -> usize {
        LIMIT
    }
}
