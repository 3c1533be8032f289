//! # just-tools - Object Graph Toolkit in Rust
//!
//! Generic operations over heterogeneous, possibly cyclic value graphs:
//! - Type classification of every value variant
//! - Deep copy with recursion limits and cycle preservation
//! - Structural equality with key filters, depth bounds and async blob payload comparison
//! - Shallow and deep merging
//! - Directive driven patching (`__remove__`, `__prepend__`, `__append__`)
//! - Deterministic indented representation
//! - Dynamic data structures whose records evaluate small scripts lazily
//!
//! ## Quick Start
//!
//! ### Copying and comparing
//!
//! ```
//! use just_tools::runner::ds::value::Value;
//! use just_tools::runner::ds::operations::copy::copy;
//! use just_tools::runner::ds::operations::test_and_comparison::equals;
//!
//! let graph = Value::new_record(vec![("a", Value::new_sequence(vec![Value::integer(1)]))]);
//! let duplicate = copy(&graph);
//! assert!(equals(&graph, &duplicate));
//! assert_ne!(graph, duplicate);
//! ```
//!
//! ### Patching
//!
//! ```
//! use just_tools::runner::ds::value::Value;
//! use just_tools::runner::ds::operations::modify::modify_object;
//! use just_tools::runner::ds::operations::represent::represent_object;
//!
//! let target = Value::new_record(vec![(
//!     "items",
//!     Value::new_sequence(vec![Value::integer(1), Value::integer(2)]),
//! )]);
//! let patch = Value::new_record(vec![(
//!     "items",
//!     Value::new_record(vec![("__append__", Value::new_sequence(vec![Value::integer(3)]))]),
//! )]);
//! modify_object(&target, &patch);
//! assert_eq!(represent_object(&target.get_property("items")), "[\n    1,\n    2,\n    3\n]");
//! ```
//!
//! ### Dynamic data structures
//!
//! Records carrying `__evaluate__` (an expression) or `__execute__` (a
//! statement list) are replaced by thunks which run their code against a
//! scope whenever they are read.
//!
//! ```
//! use just_tools::runner::ds::value::Value;
//! use just_tools::runner::eval::dynamic::{
//!     evaluate_dynamic_data_structure, resolve_dynamic_data_structure, scope_from,
//! };
//!
//! let graph = Value::new_record(vec![
//!     ("a", Value::integer(2)),
//!     ("b", Value::new_record(vec![("__evaluate__", Value::string("self.a * factor"))])),
//! ]);
//! let scope = scope_from(vec![("factor", Value::integer(21))]);
//! let evaluated = evaluate_dynamic_data_structure(&graph, &scope).unwrap();
//! let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
//! assert_eq!(resolved.get_property("b"), Value::integer(42));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar and AST of the dynamic script language
//! - **[`runner`]** - Graph engine
//!   - **[`runner::ds`]** - Value model and the structural operations
//!   - **[`runner::eval`]** - Script interpreter and the dynamic evaluator
//!   - **[`runner::sync`]** - Named locks and semaphores
//!   - **[`runner::config`]** - `ToolsConfig`
//!   - **[`runner::api`]** - The `Tools` facade

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate tracing;

pub mod parser;
pub mod runner;
