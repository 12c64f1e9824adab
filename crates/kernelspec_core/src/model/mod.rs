//! Model-export representation consumed by the function-library hook.
//!
//! # Responsibility
//! - Describe an exported model as graph nodes plus function bodies.
//! - Keep a serde wire shape so host bindings can pass models as JSON.
//!
//! # Invariants
//! - Node attributes are string-valued and kept in sorted order.

pub mod exported_model;
