//! Entities Layer: Marshal Data
//!
//! This crate provides the value model for Ruby's Marshal format (version 4.8).
//! It defines every shape a Marshal stream can describe, and the heap that
//! gives objects identity so that sharing and cycles can be represented.
//!
//! ## Overview
//!
//! The `entities_marshal_data` crate is the innermost layer of the Marshal
//! codec. It has no knowledge of the byte format; the numeric codec and the
//! encoder/decoder in the infrastructure layer build on these types.
//!
//! ## Modules
//!
//! - **[`value`](value/index.html)**: The `Value` enum (immediates and heap
//!   handles) and the fixnum range constants.
//!
//! - **[`symbol`](symbol/index.html)**: Interned symbol names.
//!
//! - **[`object`](object/index.html)**: Heap object kinds: strings, arrays,
//!   hashes, plain objects, structs, classes and modules, user-defined and
//!   user-marshaled objects, wrapped built-ins, regexps and boxed numerics.
//!
//! - **[`heap`](heap/index.html)**: The `Heap` arena, `ObjectId` handles,
//!   `Node` metadata (`I` ivars, `e` extended modules) and `Document`.
//!
//! - **[`host`](host/index.html)**: The `HostObject` extension trait for
//!   caller-defined types.
//!
//! - **[`equivalence`](equivalence/index.html)**: Structural comparison of two
//!   value graphs up to handle renaming.
//!
//! ## Usage
//!
//! ```rust
//! use entities_marshal_data::{Heap, Object, Value};
//!
//! // a = []; a << a
//! let mut heap = Heap::new();
//! let id = heap.insert(Object::Array(vec![]));
//! heap.array_mut(id).unwrap().push(Value::Object(id));
//!
//! assert_eq!(heap.object(id), Some(&Object::Array(vec![Value::Object(id)])));
//! ```
//!
//! ## See Also
//!
//! - [`infrastructure_numeric_encoding`](../infrastructure_numeric_encoding/index.html):
//!   Fixnum, bignum and float sub-codecs
//! - [`infrastructure_marshal_format`](../infrastructure_marshal_format/index.html):
//!   Encoder and decoder

/*
 * %CopyrightBegin%
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Copyright Lee Barney 2025. All Rights Reserved.
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

pub mod value;
pub mod symbol;
pub mod object;
pub mod heap;
pub mod host;
pub mod equivalence;

// Re-export main types for convenience
pub use value::{in_fixnum_range, Value, FIXNUM_MAX, FIXNUM_MIN};
pub use symbol::Symbol;
pub use object::{
    Object, RegexpOptions, RubyClassValue, RubyHash, RubyObject, RubyRegexp, RubyString,
    RubyStruct, RubyUserDefined, RubyWrapped,
};
pub use heap::{Document, Heap, Node, ObjectId};
pub use host::{HostObject, HostRef};
pub use equivalence::{float_identical, graph_eq};
