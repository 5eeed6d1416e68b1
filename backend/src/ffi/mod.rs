//! Python bindings (enabled with the `pyo3` feature)

pub mod office;
pub mod types;
