//! AWS-oriented adapters and handlers for the stream dispatcher.
//!
//! This crate owns runtime integration details (Lambda entry point, DynamoDB
//! access, logging setup) on top of the domain contracts in
//! `stream_dispatch_core`.

pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logging;
