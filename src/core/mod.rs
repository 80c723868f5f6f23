//! Core template logic: model, parameters, naming, generation, output.

pub mod codegen;
pub mod config;
pub mod error;
pub mod naming;
pub mod render;
pub mod types;
