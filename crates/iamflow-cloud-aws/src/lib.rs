//! AWS IAM service for iamflow
//!
//! This crate implements the IdentityService trait on top of `aws-sdk-iam`.
//! Credentials and region come from the standard AWS provider chain
//! (environment, shared config files, instance metadata).
//!
//! # Example
//!
//! ```ignore
//! use iamflow_cloud::{OperationClient, TracingSink};
//! use iamflow_cloud_aws::IamService;
//! use std::sync::Arc;
//!
//! let service = IamService::connect(Some("us-east-1")).await?;
//! let sink = Arc::new(TracingSink::for_service("iam"));
//! let client = OperationClient::new(Arc::new(service), sink);
//! ```

pub mod error;
pub mod provider;

pub use error::{AwsError, Result};
pub use provider::IamService;
