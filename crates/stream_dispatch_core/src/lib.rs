//! Shared stream dispatch domain primitives.
//!
//! This crate owns the DynamoDB attribute wire format, envelope
//! classification, the pending-item query contract and the response shape.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod attributes;
pub mod envelope;
pub mod response;
pub mod scheduled;
