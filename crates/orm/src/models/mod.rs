//! Typed models built on top of normalized records

pub mod account;

pub use account::*;
