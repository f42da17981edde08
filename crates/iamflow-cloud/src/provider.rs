//! Identity service trait definition

use crate::action::{Operation, OperationResult, Params};
use crate::error::Result;
use async_trait::async_trait;

/// Service names the client knows how to provision
pub const SUPPORTED_SERVICES: &[&str] = &["iam"];

/// Remote identity service abstraction
///
/// This is the stable operation-invocation seam in front of a cloud SDK.
/// Implementations perform exactly one request per call; signing, transport,
/// retries and timeouts are the SDK's business.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Returns the normalized service name (e.g., "iam")
    fn service(&self) -> &str;

    /// Returns the endpoint description for logs (e.g., the region)
    fn endpoint(&self) -> String;

    /// Issue one operation.
    ///
    /// Remote-side failures come back as `Ok` with `ok == false`;
    /// `Err` is reserved for local and transport failures.
    async fn call(&self, operation: Operation, params: &Params) -> Result<OperationResult>;
}
