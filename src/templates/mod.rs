//! Template variants.

pub mod cluster;
pub mod dedicated;
pub mod production;
pub mod sandbox;
