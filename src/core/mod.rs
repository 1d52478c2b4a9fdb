//! Core types & traits: contracts for tools, the language model and request errors.

pub mod error;
pub mod model;
pub mod tool;
