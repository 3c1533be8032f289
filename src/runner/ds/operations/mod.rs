pub mod convert;
pub mod copy;
pub mod extend;
pub mod modify;
pub mod represent;
pub mod test_and_comparison;
pub mod traversal;
pub mod type_conversion;
