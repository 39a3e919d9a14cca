//! Domain types, wire payloads and error taxonomy shared by the narrator client crates.

pub mod domain;
pub mod error;
pub mod protocol;
