//! # apidrift-schema — Schema Index & Structural Comparator
//!
//! Loads the schema dictionary of an OpenAPI document and compares live
//! JSON payloads against it, recording one [`Issue`] per mismatch.
//!
//! ## Observe, Never Abort
//!
//! The comparator is a pure recursive tree-walk: it never fails mid-walk.
//! Every unexpected shape (wrong type, undeclared field, missing required
//! field, out-of-set enum value, unexpected null) becomes an appended
//! [`Issue`], and the walk continues. Issues accumulate in an [`IssueLog`]
//! owned by the caller and passed `&mut` into each recursive call; there is
//! no shared mutable state.
//!
//! ## Scope
//!
//! Only the schema subset the game server's document actually uses is
//! modeled: `type`, `$ref`, `properties`, `additionalProperties`,
//! `required`, `items`, `enum`, `nullable`. References resolve only within
//! the document's own `components.schemas` section; external references are
//! silently treated as unresolved.

pub mod compare;
pub mod describe;
pub mod index;
pub mod issue;

pub use compare::Comparator;
pub use describe::{describe_schema, describe_value};
pub use index::{AdditionalProperties, SchemaIndex, SchemaNode, SpecError};
pub use issue::{Issue, IssueKind, IssueLog};
