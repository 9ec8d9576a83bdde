//! Relationships Module - Polymorphic detail relations and their resolution

pub mod metadata;
pub mod inference;
pub mod registry;
pub mod eager_loading;
pub mod resolver;

pub use metadata::*;
pub use registry::*;
pub use eager_loading::*;
pub use resolver::*;
