//! Infrastructure Layer: Marshal Format
//!
//! Encoder and decoder for the Ruby Marshal 4.8 stream.
//!
//! ## Overview
//!
//! - **[`encoding`](encoding/index.html)**: `Encoder`, which walks a heap
//!   graph once and assigns table indices on first sight
//! - **[`decoding`](decoding/index.html)**: `Decoder`, a recursive-descent
//!   reader that allocates each node before decoding its children
//! - **[`reference_table`](reference_table/index.html)**: object and symbol
//!   tables for both directions
//! - **[`class_registry`](class_registry/index.html)**: host-type mapping for
//!   caller-defined classes
//! - **[`options`](options/index.html)**: dump and load options
//! - **[`constants`](constants/index.html)**: header bytes and type tags
//!
//! ## Examples
//!
//! ```rust
//! use entities_marshal_data::{Heap, Object, Value};
//! use infrastructure_marshal_format::{Decoder, DumpOptions, Encoder, LoadOptions};
//!
//! let mut heap = Heap::new();
//! let id = heap.insert(Object::Array(vec![]));
//! heap.array_mut(id).unwrap().push(Value::Object(id));
//!
//! let bytes = Encoder::encode(&heap, &Value::Object(id), &DumpOptions::default()).unwrap();
//! assert_eq!(bytes, vec![4, 8, b'[', 6, b'@', 0]);
//!
//! let doc = Decoder::decode(&bytes, &LoadOptions::default()).unwrap();
//! let root = doc.root.as_object().unwrap();
//! assert_eq!(doc.heap.object(root), Some(&Object::Array(vec![Value::Object(root)])));
//! ```

/*
 * %CopyrightBegin%
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
 * %CopyrightEnd%
 */

pub mod class_registry;
pub mod constants;
pub mod decoding;
pub mod encoding;
pub mod options;
pub mod reference_table;

pub use class_registry::{ClassNameFallback, ClassRegistry, HostConstructor};
pub use decoding::{Decoder, FormatError};
pub use encoding::{EncodeError, Encoder};
pub use options::{
    ConfigurationError, DumpOptions, HashMode, IvarKeyMode, LoadOptions, NumericMode, StringMode,
    DEFAULT_MAX_DEPTH,
};
pub use reference_table::{ObjectKey, ObjectLinks, ObjectTable, SymbolLinks, SymbolTable};
