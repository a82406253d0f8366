// linemark shared type definitions
// Each submodule defines types used across the library.

pub mod bookmark;
pub mod command;
pub mod errors;
