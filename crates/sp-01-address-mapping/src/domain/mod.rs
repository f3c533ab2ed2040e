//! # Domain Layer
//!
//! Pure mapping logic with no I/O: key construction, request validation,
//! outcome types and the error taxonomy.

pub mod entities;
pub mod errors;
pub mod keys;
pub mod validation;
