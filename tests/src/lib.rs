//! # Skate Provisioner Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs          # Literal request/response scenarios over JSON
//!     ├── convergence.rs        # Many engine instances, one store
//!     └── authenticated_flow.rs # nonce -> sign -> act through the runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sp-tests
//! cargo test -p sp-tests integration::convergence
//! cargo bench -p sp-tests
//! ```

#![allow(dead_code)]

pub mod integration;
