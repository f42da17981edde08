//! Run reporting
//!
//! The [`Reporter`] keeps an append-only record of every operation attempt
//! and writes each one to a [`LogSink`]. A [`RunReport`] aggregates the final
//! state of every entity.

use crate::action::Operation;
use chrono::{DateTime, Utc};
use iamflow_core::{Configuration, EntityKind};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Leveled logging capability required by the reporter
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Sink that forwards to `tracing`, tagged with a service-scoped logger name
pub struct TracingSink {
    logger: String,
}

impl TracingSink {
    pub fn new(logger: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
        }
    }

    /// Logger named after the service, e.g. `iamflow-iam`
    pub fn for_service(service: &str) -> Self {
        Self::new(format!("iamflow-{}", service))
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(logger = %self.logger, "{}", message),
            Level::WARN => tracing::warn!(logger = %self.logger, "{}", message),
            Level::INFO => tracing::info!(logger = %self.logger, "{}", message),
            Level::DEBUG => tracing::debug!(logger = %self.logger, "{}", message),
            _ => tracing::trace!(logger = %self.logger, "{}", message),
        }
    }
}

/// Sink that keeps every line in memory
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

/// Outcome of one operation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Succeeded,
    AlreadyExists,
    Failed,
    WouldPerform,
    TransportError,
}

impl EventOutcome {
    fn level(&self) -> Level {
        match self {
            EventOutcome::Succeeded | EventOutcome::WouldPerform => Level::INFO,
            EventOutcome::AlreadyExists => Level::WARN,
            EventOutcome::Failed | EventOutcome::TransportError => Level::ERROR,
        }
    }
}

impl std::fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventOutcome::Succeeded => write!(f, "succeeded"),
            EventOutcome::AlreadyExists => write!(f, "already-exists"),
            EventOutcome::Failed => write!(f, "failed"),
            EventOutcome::WouldPerform => write!(f, "would-perform"),
            EventOutcome::TransportError => write!(f, "transport-error"),
        }
    }
}

/// Record of one operation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationEvent {
    pub kind: EntityKind,
    pub name: String,
    pub action: Operation,
    pub outcome: EventOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Per-entity state: `Pending → Applying → {Applied | AlreadyExists | Failed}`,
/// or `Planned` when nothing was executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Pending,
    Applying,
    Applied,
    AlreadyExists,
    Failed,
    Planned,
}

impl EntityState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntityState::Pending | EntityState::Applying)
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityState::Pending => write!(f, "pending"),
            EntityState::Applying => write!(f, "applying"),
            EntityState::Applied => write!(f, "applied"),
            EntityState::AlreadyExists => write!(f, "already-exists"),
            EntityState::Failed => write!(f, "failed"),
            EntityState::Planned => write!(f, "planned"),
        }
    }
}

/// Final state of one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub kind: EntityKind,
    pub name: String,
    pub state: EntityState,
    pub error: Option<String>,
}

/// Result of a provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Entities in configuration order
    pub entities: Vec<EntityReport>,

    /// Reason the run stopped early, if it did
    pub aborted: Option<String>,

    pub dry_run: bool,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Report with every entity of `config` pending
    pub fn pending(config: &Configuration, dry_run: bool) -> Self {
        let groups = config
            .groups
            .iter()
            .map(|g| (EntityKind::Group, g.group_name.clone()));
        let users = config
            .users
            .iter()
            .map(|u| (EntityKind::User, u.user_name.clone()));
        let roles = config
            .roles
            .iter()
            .map(|r| (EntityKind::Role, r.role_name.clone()));

        Self {
            entities: groups
                .chain(users)
                .chain(roles)
                .map(|(kind, name)| EntityReport {
                    kind,
                    name,
                    state: EntityState::Pending,
                    error: None,
                })
                .collect(),
            aborted: None,
            dry_run,
            duration_ms: 0,
        }
    }

    pub fn entity(&self, kind: EntityKind, name: &str) -> Option<&EntityReport> {
        self.entities
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    pub(crate) fn set_state(&mut self, kind: EntityKind, name: &str, state: EntityState) {
        if let Some(entity) = self
            .entities
            .iter_mut()
            .find(|e| e.kind == kind && e.name == name)
        {
            entity.state = state;
        }
    }

    pub(crate) fn finish(&mut self, kind: EntityKind, name: &str, outcome: EntityOutcome) {
        if let Some(entity) = self
            .entities
            .iter_mut()
            .find(|e| e.kind == kind && e.name == name)
        {
            entity.state = outcome.state;
            entity.error = outcome.error;
        }
    }

    /// Stop the run: the entity being applied fails, the rest stay pending
    pub(crate) fn abort(&mut self, reason: String) {
        for entity in self
            .entities
            .iter_mut()
            .filter(|e| e.state == EntityState::Applying)
        {
            entity.state = EntityState::Failed;
            entity.error = Some(reason.clone());
        }
        self.aborted = Some(reason);
    }

    pub fn summary(&self, kind: EntityKind) -> KindSummary {
        let mut summary = KindSummary::default();
        for entity in self.entities.iter().filter(|e| e.kind == kind) {
            match entity.state {
                EntityState::Applied => summary.created += 1,
                EntityState::AlreadyExists => summary.already_existed += 1,
                EntityState::Failed => summary.failed += 1,
                EntityState::Planned => summary.planned += 1,
                EntityState::Pending | EntityState::Applying => summary.not_attempted += 1,
            }
        }
        summary
    }

    pub fn failed(&self) -> Vec<&EntityReport> {
        self.entities
            .iter()
            .filter(|e| e.state == EntityState::Failed)
            .collect()
    }

    /// True when no entity failed and the run was not aborted
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failed().is_empty()
    }
}

/// Terminal state and error of one entity
#[derive(Debug, Clone)]
pub(crate) struct EntityOutcome {
    pub state: EntityState,
    pub error: Option<String>,
}

impl EntityOutcome {
    pub fn done(state: EntityState) -> Self {
        Self { state, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: EntityState::Failed,
            error: Some(error.into()),
        }
    }
}

/// Counts for one entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindSummary {
    pub created: usize,
    pub already_existed: usize,
    pub failed: usize,
    pub planned: usize,
    pub not_attempted: usize,
}

impl std::fmt::Display for KindSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} already existed, {} failed",
            self.created, self.already_existed, self.failed
        )?;
        if self.planned > 0 {
            write!(f, ", {} planned", self.planned)?;
        }
        if self.not_attempted > 0 {
            write!(f, ", {} not attempted", self.not_attempted)?;
        }
        Ok(())
    }
}

/// Append-only event log for one run
pub struct Reporter {
    sink: Arc<dyn LogSink>,
    events: Vec<OperationEvent>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            events: Vec::new(),
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        self.sink.log(level, message);
    }

    pub fn dry_run_banner(&self) {
        self.log(
            Level::ERROR,
            "dry run is set. No action will be taken but this is what would be done...",
        );
    }

    /// Record one operation attempt
    pub fn record(
        &mut self,
        kind: EntityKind,
        name: &str,
        action: Operation,
        outcome: EventOutcome,
        detail: Option<&str>,
    ) {
        let event = OperationEvent {
            kind,
            name: name.to_string(),
            action,
            outcome,
            timestamp: Utc::now(),
        };

        let mut line = format!(
            "kind={} name={} action={} outcome={} at={}",
            event.kind,
            event.name,
            event.action,
            event.outcome,
            event.timestamp.to_rfc3339()
        );
        if let Some(detail) = detail {
            line.push_str(&format!(" detail=\"{}\"", detail));
        }

        self.sink.log(outcome.level(), &line);
        self.events.push(event);
    }

    /// Drop the events of a previous run
    pub fn reset(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[OperationEvent] {
        &self.events
    }

    pub fn count(&self, outcome: EventOutcome) -> usize {
        self.events.iter().filter(|e| e.outcome == outcome).count()
    }

    /// Run-end summary, emitted even after an abort
    pub fn summary(&self, report: &RunReport) {
        let level = if report.is_success() {
            Level::INFO
        } else {
            Level::ERROR
        };

        if let Some(reason) = &report.aborted {
            self.log(Level::ERROR, &format!("run aborted: {}", reason));
        }

        for (kind, label) in [
            (EntityKind::Group, "groups"),
            (EntityKind::User, "users"),
            (EntityKind::Role, "roles"),
        ] {
            self.log(level, &format!("{}: {}", label, report.summary(kind)));
        }

        for entity in report.failed() {
            self.log(
                Level::ERROR,
                &format!(
                    "{} {} failed: {}",
                    entity.kind,
                    entity.name,
                    entity.error.as_deref().unwrap_or("unknown error")
                ),
            );
        }

        self.log(
            level,
            &format!(
                "finished in {}ms ({} operations recorded)",
                report.duration_ms,
                self.events.len()
            ),
        );
    }
}
