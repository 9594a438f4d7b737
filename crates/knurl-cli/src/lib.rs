//! Knurl CLI library — command implementations shared by the `knurl`
//! binary and the integration tests.

pub mod commands;
