//! API Facades Layer
//!
//! Public entry points for reading and writing Ruby Marshal 4.8 data.
//!
//! ```rust
//! use api_facades::{dump, load, DumpOptions, Heap, LoadOptions, Object, Value};
//!
//! // a = []; a << a
//! let mut heap = Heap::new();
//! let id = heap.insert(Object::Array(vec![]));
//! heap.array_mut(id).unwrap().push(Value::Object(id));
//!
//! let bytes = dump(&heap, &Value::Object(id), &DumpOptions::default()).unwrap();
//! let doc = load(&bytes, &LoadOptions::default()).unwrap();
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

pub mod marshal_facades;

// Re-export main facade types
pub use marshal_facades::*;

pub use entities_marshal_data::{
    graph_eq, Document, Heap, HostObject, HostRef, Node, Object, ObjectId, RegexpOptions,
    RubyClassValue, RubyHash, RubyObject, RubyRegexp, RubyString, RubyStruct, RubyUserDefined,
    RubyWrapped, Symbol, Value,
};
pub use infrastructure_marshal_format::{
    ClassRegistry, ConfigurationError, DumpOptions, EncodeError, FormatError, HashMode,
    IvarKeyMode, LoadOptions, NumericMode, StringMode,
};
