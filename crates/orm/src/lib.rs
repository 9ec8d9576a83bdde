//! # polymorph-orm: polymorphic detail associations
//!
//! An owning model (e.g. `Account`) references exactly one of several detail
//! models (`BankAccountDetails`, `CardDetails`) through a shared foreign key,
//! with a discriminator column choosing which. Storage attaches every detail
//! relation under its own alias; [`PolymorphicResolver::normalize`] collapses
//! them into a single `details` field.
//!
//! ```
//! use polymorph_orm::{DetailTypeRegistry, PolymorphicResolver, RawRecord};
//! use serde_json::json;
//!
//! let registry = DetailTypeRegistry::from_pairs([
//!     ("BankAccount", "bankAccountDetails"),
//!     ("Card", "cardDetails"),
//! ]).unwrap();
//! let resolver = PolymorphicResolver::new(registry);
//!
//! let raw = RawRecord::try_from(json!({
//!     "type": "BankAccount",
//!     "bankAccountDetails": {"bankName": "ABC"},
//!     "cardDetails": null,
//! })).unwrap();
//!
//! assert_eq!(
//!     resolver.normalize(&raw).into_value(),
//!     json!({"type": "BankAccount", "details": {"bankName": "ABC"}}),
//! );
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod record;
pub mod relationships;
pub mod storage;

pub use config::{ConfigError, ConfigSource, DetailTypeConfig, ResolverConfig};
pub use error::*;
pub use record::*;
pub use relationships::*;
pub use storage::*;
