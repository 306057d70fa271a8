//! Request handlers, one module per resource.

pub mod saves;
pub mod shares;
pub mod tools;
