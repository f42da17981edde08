//! iamflow Cloud
//!
//! This crate provides the identity-service abstraction for iamflow and the
//! provisioner that applies a declarative configuration through it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  iamflow CLI                     │
//! │             (iamflow apply / validate)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                iamflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Provisioner ──► OperationClient          │   │
//! │  │       │          trait IdentityService    │   │
//! │  │       ▼                                   │   │
//! │  │    Reporter ──► trait LogSink             │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │ aws-sdk-iam   │ │   in-memory   │
//! │   service     │ │   service     │
//! └───────────────┘ └───────────────┘
//! ```

pub mod action;
pub mod client;
pub mod error;
pub mod memory;
pub mod provider;
pub mod provision;
pub mod report;

// Re-exports
pub use action::{Operation, OperationResult, Params, params};
pub use client::OperationClient;
pub use error::{ProvisionError, Result, TransportError};
pub use memory::InMemoryIdentityService;
pub use provider::{IdentityService, SUPPORTED_SERVICES};
pub use provision::Provisioner;
pub use report::{
    EntityReport, EntityState, EventOutcome, KindSummary, LogSink, MemorySink, OperationEvent,
    Reporter, RunReport, TracingSink,
};
