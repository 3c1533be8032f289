pub mod blob;
pub mod error;
pub mod function_object;
pub mod lazy;
pub mod object;
pub mod operations;
pub mod pattern;
pub mod temporal;
pub mod value;
