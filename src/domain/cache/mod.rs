//! Result cache contract and fingerprinting

mod key;
mod repository;

pub use key::Fingerprint;
pub use repository::ResultCache;
