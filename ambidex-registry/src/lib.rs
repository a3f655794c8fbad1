#![doc = include_str!("../README.md")]

pub mod erased;
pub mod registry;

pub use erased::{DynErrback, OperationDyn};
pub use registry::{DispatchError, OperationSet};
