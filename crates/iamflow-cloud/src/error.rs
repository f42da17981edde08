//! Identity service error types

use thiserror::Error;

/// Local or transport-setup failures.
///
/// Remote-side failures are never reported through this type: they come back
/// as an [`OperationResult`](crate::OperationResult) with `ok == false`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown service: {requested} (available: {available})")]
    UnknownService { requested: String, available: String },

    #[error("Missing parameter {parameter} for {operation}")]
    MissingParameter {
        operation: String,
        parameter: String,
    },

    #[error("Request dispatch failed: {0}")]
    Dispatch(String),
}

/// Errors that reject a run before any operation is issued
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] iamflow_core::ConfigError),
}

pub type Result<T> = std::result::Result<T, TransportError>;
