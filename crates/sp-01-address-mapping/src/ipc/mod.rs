//! # IPC Module
//!
//! JSON action boundary for the mapping engine.
//!
//! ## Modules
//!
//! - `payloads`: request and response shapes (field names are the wire contract)
//! - `handler`: `MappingRequestHandler`, dispatching requests to `AddressMappingApi`

pub mod handler;
pub mod payloads;

pub use handler::MappingRequestHandler;
pub use payloads::*;
