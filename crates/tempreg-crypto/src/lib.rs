//! Cryptographic primitives for the temporary registry.
//!
//! Provides domain-separated BLAKE3 hashing, Ed25519 keys, and the
//! [`KeyGenerator`] that mints a node identity (private key, peer id,
//! nickname) for each ephemeral environment.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod generator;
pub mod hasher;
pub mod signer;

pub use generator::{CryptoSource, KeyGenerator};
pub use hasher::ContentHasher;
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
