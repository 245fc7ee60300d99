//! Process-local memo of successful username decodes.
//!
//! # Invariants
//!
//! - Entries are created only after a decode has verified; failures are never
//!   cached.
//! - Nothing is persisted. The cache lives as long as the process.
//! - The cache is an explicit service handle injected into each
//!   [`FieldOrchestrator`](crate::field::FieldOrchestrator), never a global.

pub mod store;

pub use store::DecodeCache;
