//! Provisioner
//!
//! Turns a [`Configuration`] into an ordered sequence of operations and
//! aggregates the outcome of every entity. Entities are processed strictly in
//! configuration order, one remote call at a time: memberships depend on the
//! groups created earlier in the same run.

use crate::action::{
    ASSUME_ROLE_POLICY_DOCUMENT, GROUP_NAME, Operation, POLICY_DOCUMENT, POLICY_NAME, ROLE_NAME,
    USER_NAME, params,
};
use crate::client::OperationClient;
use crate::error::{ProvisionError, TransportError};
use crate::report::{EntityOutcome, EntityState, EventOutcome, Reporter, RunReport};
use iamflow_core::{
    Configuration, EntityKind, Group, PolicyError, PolicyRef, PolicyResolver, Role, User,
};
use std::time::Instant;
use tracing::Level;

/// Result of a single step within an entity
enum Step {
    Done,
    Conflict,
    Planned,
    Failed(String),
}

pub struct Provisioner {
    client: OperationClient,
    resolver: PolicyResolver,
    reporter: Reporter,
}

impl Provisioner {
    pub fn new(client: OperationClient, resolver: PolicyResolver, reporter: Reporter) -> Self {
        Self {
            client,
            resolver,
            reporter,
        }
    }

    pub fn client(&self) -> &OperationClient {
        &self.client
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Apply `config`.
    ///
    /// Returns `Err` only when the configuration is rejected, in which case no
    /// operation was issued. Everything else, including an aborted run, is
    /// described by the returned report. Each call starts with an empty event
    /// log and policy cache.
    pub async fn run(&mut self, config: &Configuration) -> Result<RunReport, ProvisionError> {
        let start = Instant::now();
        let dry_run = self.client.is_dry_run();

        // Events and resolved policies belong to a single run
        self.reporter.reset();
        self.resolver.clear();

        if dry_run {
            self.reporter.dry_run_banner();
        }

        // Logged here; the run aborts only after validation
        let preflight = self.client.preflight(&config.service_name());
        if let Err(e) = &preflight {
            self.reporter.log(Level::ERROR, &e.to_string());
        }

        if let Err(e) = config.validate() {
            self.reporter.log(Level::ERROR, &e.to_string());
            return Err(e.into());
        }

        let mut report = RunReport::pending(config, dry_run);

        let outcome = match preflight {
            Ok(()) => self.apply_all(config, &mut report).await,
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            self.reporter.log(Level::ERROR, &format!("aborting run: {}", e));
            report.abort(e.to_string());
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        self.reporter.summary(&report);
        Ok(report)
    }

    async fn apply_all(
        &mut self,
        config: &Configuration,
        report: &mut RunReport,
    ) -> Result<(), TransportError> {
        for group in &config.groups {
            self.begin(report, EntityKind::Group, &group.group_name);
            let outcome = self.apply_group(group).await?;
            self.end(report, EntityKind::Group, &group.group_name, outcome);
        }

        for user in &config.users {
            self.begin(report, EntityKind::User, &user.user_name);
            let outcome = self.apply_user(user).await?;
            self.end(report, EntityKind::User, &user.user_name, outcome);
        }

        for role in &config.roles {
            self.begin(report, EntityKind::Role, &role.role_name);
            let outcome = self.apply_role(role).await?;
            self.end(report, EntityKind::Role, &role.role_name, outcome);
        }

        Ok(())
    }

    fn begin(&self, report: &mut RunReport, kind: EntityKind, name: &str) {
        self.reporter
            .log(Level::DEBUG, &format!("{} {}: pending -> applying", kind, name));
        report.set_state(kind, name, EntityState::Applying);
    }

    fn end(&self, report: &mut RunReport, kind: EntityKind, name: &str, outcome: EntityOutcome) {
        self.reporter.log(
            Level::DEBUG,
            &format!("{} {}: applying -> {}", kind, name, outcome.state),
        );
        report.finish(kind, name, outcome);
    }

    async fn apply_group(&mut self, group: &Group) -> Result<EntityOutcome, TransportError> {
        let name = group.group_name.as_str();
        let document = match self.resolve(EntityKind::Group, name, &group.policy_document) {
            Ok(document) => document,
            Err(outcome) => return Ok(outcome),
        };

        let mut existed = false;
        match self
            .step(
                EntityKind::Group,
                name,
                Operation::CreateGroup,
                params([(GROUP_NAME, name)]),
            )
            .await?
        {
            Step::Failed(e) => return Ok(EntityOutcome::failed(e)),
            Step::Conflict => existed = true,
            Step::Done | Step::Planned => {}
        }

        let attach = params([
            (GROUP_NAME, name),
            (POLICY_NAME, group.policy_name.as_str()),
            (POLICY_DOCUMENT, document.as_str()),
        ]);
        if let Step::Failed(e) = self
            .step(EntityKind::Group, name, Operation::PutGroupPolicy, attach)
            .await?
        {
            return Ok(EntityOutcome::failed(e));
        }

        Ok(self.settled(existed))
    }

    async fn apply_user(&mut self, user: &User) -> Result<EntityOutcome, TransportError> {
        let name = user.user_name.as_str();

        let mut existed = false;
        match self
            .step(
                EntityKind::User,
                name,
                Operation::CreateUser,
                params([(USER_NAME, name)]),
            )
            .await?
        {
            Step::Failed(e) => return Ok(EntityOutcome::failed(e)),
            Step::Conflict => existed = true,
            Step::Done | Step::Planned => {}
        }

        for group in &user.groups {
            let membership = params([(USER_NAME, name), (GROUP_NAME, group.as_str())]);
            if let Step::Failed(e) = self
                .step(EntityKind::User, name, Operation::AddUserToGroup, membership)
                .await?
            {
                return Ok(EntityOutcome::failed(e));
            }
        }

        Ok(self.settled(existed))
    }

    async fn apply_role(&mut self, role: &Role) -> Result<EntityOutcome, TransportError> {
        let name = role.role_name.as_str();
        let assume = match self.resolve(EntityKind::Role, name, &role.assume_role_policy_document) {
            Ok(document) => document,
            Err(outcome) => return Ok(outcome),
        };
        let document = match self.resolve(EntityKind::Role, name, &role.policy_document) {
            Ok(document) => document,
            Err(outcome) => return Ok(outcome),
        };

        let mut existed = false;
        let create = params([
            (ROLE_NAME, name),
            (ASSUME_ROLE_POLICY_DOCUMENT, assume.as_str()),
        ]);
        match self
            .step(EntityKind::Role, name, Operation::CreateRole, create)
            .await?
        {
            Step::Failed(e) => return Ok(EntityOutcome::failed(e)),
            Step::Conflict => existed = true,
            Step::Done | Step::Planned => {}
        }

        let attach = params([
            (ROLE_NAME, name),
            (POLICY_NAME, role.policy_name.as_str()),
            (POLICY_DOCUMENT, document.as_str()),
        ]);
        if let Step::Failed(e) = self
            .step(EntityKind::Role, name, Operation::PutRolePolicy, attach)
            .await?
        {
            return Ok(EntityOutcome::failed(e));
        }

        Ok(self.settled(existed))
    }

    /// Terminal state of an entity whose steps all went through
    fn settled(&self, existed: bool) -> EntityOutcome {
        if self.client.is_dry_run() {
            EntityOutcome::done(EntityState::Planned)
        } else if existed {
            EntityOutcome::done(EntityState::AlreadyExists)
        } else {
            EntityOutcome::done(EntityState::Applied)
        }
    }

    fn resolve(
        &mut self,
        kind: EntityKind,
        name: &str,
        policy: &PolicyRef,
    ) -> Result<String, EntityOutcome> {
        self.resolver.resolve(policy).map_err(|e: PolicyError| {
            let message = format!("{} {}: policy {}: {}", kind, name, policy, e);
            self.reporter.log(Level::ERROR, &message);
            EntityOutcome::failed(message)
        })
    }

    async fn step(
        &mut self,
        kind: EntityKind,
        name: &str,
        operation: Operation,
        params: crate::action::Params,
    ) -> Result<Step, TransportError> {
        let result = match self.client.call(operation, &params).await {
            Ok(result) => result,
            Err(e) => {
                let detail = e.to_string();
                self.reporter.record(
                    kind,
                    name,
                    operation,
                    EventOutcome::TransportError,
                    Some(&detail),
                );
                return Err(e);
            }
        };

        if !result.executed {
            self.reporter
                .record(kind, name, operation, EventOutcome::WouldPerform, None);
            return Ok(Step::Planned);
        }

        if result.ok {
            self.reporter
                .record(kind, name, operation, EventOutcome::Succeeded, None);
            return Ok(Step::Done);
        }

        if operation.is_create() && result.is_conflict() {
            self.reporter.record(
                kind,
                name,
                operation,
                EventOutcome::AlreadyExists,
                Some("already exists, continuing"),
            );
            return Ok(Step::Conflict);
        }

        let detail = format!(
            "{} failed: {} {}",
            operation, result.status_code, result.reason
        );
        self.reporter
            .record(kind, name, operation, EventOutcome::Failed, Some(&detail));
        Ok(Step::Failed(detail))
    }
}
