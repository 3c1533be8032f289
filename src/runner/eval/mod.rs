//! Evaluation of dynamic data structures.
//!
//! `expression` and `statement` interpret the restricted script language
//! parsed by `crate::parser`; `dynamic` wires that interpreter into value
//! graphs through lazy thunks.

pub mod dynamic;
pub mod expression;
pub mod statement;
pub mod types;

pub use dynamic::{
    evaluate_dynamic_data_structure, evaluate_dynamic_data_structure_with,
    resolve_dynamic_data_structure, unwrap_dynamic, DynamicOptions,
};
pub use types::{Completion, CompletionType, EvalContext};
