//! Operation client
//!
//! Thin typed facade over an [`IdentityService`] that adds dry-run and
//! soft-fail logging.

use crate::action::{Operation, OperationResult, Params};
use crate::error::{Result, TransportError};
use crate::provider::{IdentityService, SUPPORTED_SERVICES};
use crate::report::LogSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::Level;

pub struct OperationClient {
    /// `None` in dry-run mode: nothing can reach the network
    backend: Option<Arc<dyn IdentityService>>,
    sink: Arc<dyn LogSink>,
    calls: AtomicUsize,
}

impl OperationClient {
    /// Live client delegating to `backend`
    pub fn new(backend: Arc<dyn IdentityService>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            backend: Some(backend),
            sink,
            calls: AtomicUsize::new(0),
        }
    }

    /// Client that only logs what it would do
    pub fn dry_run(sink: Arc<dyn LogSink>) -> Self {
        Self {
            backend: None,
            sink,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.backend.is_none()
    }

    /// Number of calls that reached the backend
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Check that `service` can be reached through this client
    pub fn preflight(&self, service: &str) -> Result<()> {
        let available: Vec<&str> = match &self.backend {
            Some(backend) => vec![backend.service()],
            None => SUPPORTED_SERVICES.to_vec(),
        };

        if available.contains(&service) {
            Ok(())
        } else {
            Err(TransportError::UnknownService {
                requested: service.to_string(),
                available: available.join(", "),
            })
        }
    }

    /// Issue an operation by its wire name
    pub async fn invoke(&self, operation: &str, params: &Params) -> Result<OperationResult> {
        let operation: Operation = operation.parse()?;
        self.call(operation, params).await
    }

    /// Issue a typed operation.
    ///
    /// Never fails for remote-side errors; those are logged and returned for
    /// the caller to judge.
    pub async fn call(&self, operation: Operation, params: &Params) -> Result<OperationResult> {
        self.sink.log(
            Level::INFO,
            &format!("Performing {} with {:?}", operation, params),
        );

        let Some(backend) = &self.backend else {
            return Ok(OperationResult::not_executed());
        };

        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = backend.call(operation, params).await?;

        if !result.ok {
            self.sink.log(
                Level::ERROR,
                &format!(
                    "Error code: {}, reason: {}",
                    result.status_code, result.reason
                ),
            );
            self.sink
                .log(Level::DEBUG, &format!("content: {}", result.body_text()));
        }

        Ok(result)
    }
}
