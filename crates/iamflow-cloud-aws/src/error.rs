//! AWS service error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("No AWS region configured. Set --region or AWS_REGION")]
    MissingRegion,
}

pub type Result<T> = std::result::Result<T, AwsError>;
