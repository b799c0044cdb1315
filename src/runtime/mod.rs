pub mod primitives;
pub mod runtime_error;
