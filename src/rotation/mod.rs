//! Rotation Module
//!
//! Persisted two-way credential rotation.

pub mod credentials;
pub mod rotator;
pub mod store;

pub use credentials::{CredentialPair, Credentials};
pub use rotator::KeyRotator;
pub use store::{FileRotationStore, MemoryRotationStore, RotationStore, DEFAULT_STATE_FILE};
