pub mod errors;
pub mod nonce;
pub mod signature;
