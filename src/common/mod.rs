//! Low-level shared utilities.

pub mod interp;

pub use interp::interp;
