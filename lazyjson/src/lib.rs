// SPDX-License-Identifier: Apache-2.0

//! A pull-style JSON parser that never builds a document tree.
//!
//! Parsing is driven by the caller: [`parse_object`] and [`parse_array`] walk one
//! container and hand each field or element to a callback as a [`Value`]. Scalars are
//! converted on demand with [`Value::to`]; nested containers are parsed by calling back
//! into the same context, or skipped with [`ignore`]. [`Dispatcher`] and [`dispatch`]
//! route fields by name.
//!
//! Input comes from one of three contexts:
//! * [`BufferContext`] unescapes strings in place inside a mutable buffer.
//! * [`ConstBufferContext`] reads a shared slice.
//! * [`StreamContext`] pulls chunks from a [`Reader`].
//!
//! ```rust
//! use lazyjson::{parse_object, ConstBufferContext};
//!
//! let ctx = ConstBufferContext::new(br#"{"name": "lazy", "stars": 3}"#);
//! let mut stars = 0;
//! parse_object(&ctx, |name, value| {
//!     if name == "stars" {
//!         stars = value.to()?;
//!     }
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(stars, 3);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod context;
pub use context::{
    BufferContext, ConstBufferContext, Context, NestedStatus, Nesting, StreamContext,
    DEFAULT_NESTING_LIMIT, STREAM_CHUNK_SIZE,
};

mod dispatch;
pub use dispatch::{
    dispatch, ignore, Dispatch, Dispatcher, DispatcherRun, HandlerInfo, HandlerKind,
};

mod escape_processor;

mod int_parser;

mod parse_error;
pub use parse_error::{ErrorReason, ParseError};

mod parser;
pub use parser::{parse_array, parse_object};

mod reader;
#[cfg(feature = "std")]
pub use reader::IoReader;
pub use reader::{ChunkReader, Reader};

mod scanner;
pub use scanner::{parse_string, parse_unquoted_value};

mod value;
pub use value::{FromValue, Value, ValueType};
