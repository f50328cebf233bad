//! Validation rules, one module per concern. Each appends findings to a scope.
pub(crate) mod geology;
pub(crate) mod habitability;
pub(crate) mod orbits;
pub(crate) mod stellar;
pub(crate) mod zones;
