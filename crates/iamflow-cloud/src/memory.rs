//! In-memory identity service
//!
//! Deterministic stand-in for the remote service with the same conflict
//! semantics (409 `EntityAlreadyExists`, 404 `NoSuchEntity`). Every call is
//! journaled, and faults can be injected per operation and entity name.

use crate::action::{
    ALREADY_EXISTS, GROUP_NAME, NO_SUCH_ENTITY, Operation, OperationResult, POLICY_DOCUMENT,
    POLICY_NAME, Params, ROLE_NAME, USER_NAME,
};
use crate::error::{Result, TransportError};
use crate::provider::IdentityService;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Directory {
    groups: BTreeSet<String>,
    users: BTreeSet<String>,
    roles: BTreeSet<String>,
    /// (user, group)
    memberships: BTreeSet<(String, String)>,
    /// (entity, policy name) -> document
    policies: BTreeMap<(String, String), String>,
}

#[derive(Debug, Clone)]
enum Fault {
    Remote { status_code: u16, reason: String },
    Transport(String),
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityService {
    directory: Mutex<Directory>,
    journal: Mutex<Vec<(Operation, Params)>>,
    faults: Mutex<HashMap<(Operation, String), Fault>>,
}

impl InMemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` on `entity` return a remote failure
    pub fn fail_on(&self, operation: Operation, entity: &str, status_code: u16, reason: &str) {
        self.lock_faults().insert(
            (operation, entity.to_string()),
            Fault::Remote {
                status_code,
                reason: reason.to_string(),
            },
        );
    }

    /// Make `operation` on `entity` fail before reaching the service
    pub fn break_transport_on(&self, operation: Operation, entity: &str, message: &str) {
        self.lock_faults().insert(
            (operation, entity.to_string()),
            Fault::Transport(message.to_string()),
        );
    }

    /// Calls received so far, in order
    pub fn journal(&self) -> Vec<(Operation, Params)> {
        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Calls received so far as `Operation(entity, ...)` strings
    pub fn call_log(&self) -> Vec<String> {
        self.journal()
            .iter()
            .map(|(op, params)| {
                let args: Vec<&str> = [USER_NAME, GROUP_NAME, ROLE_NAME, POLICY_NAME]
                    .iter()
                    .filter_map(|k| params.get(*k).map(String::as_str))
                    .collect();
                format!("{}({})", op, args.join(","))
            })
            .collect()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.lock_directory().groups.contains(name)
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.lock_directory().users.contains(name)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.lock_directory().roles.contains(name)
    }

    pub fn is_member(&self, user: &str, group: &str) -> bool {
        self.lock_directory()
            .memberships
            .contains(&(user.to_string(), group.to_string()))
    }

    pub fn policy(&self, entity: &str, policy_name: &str) -> Option<String> {
        self.lock_directory()
            .policies
            .get(&(entity.to_string(), policy_name.to_string()))
            .cloned()
    }

    fn lock_directory(&self) -> std::sync::MutexGuard<'_, Directory> {
        self.directory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_faults(&self) -> std::sync::MutexGuard<'_, HashMap<(Operation, String), Fault>> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn subject<'a>(operation: Operation, params: &'a Params) -> Result<&'a str> {
        let key = match operation {
            Operation::CreateGroup | Operation::PutGroupPolicy => GROUP_NAME,
            Operation::CreateUser | Operation::AddUserToGroup => USER_NAME,
            Operation::CreateRole | Operation::PutRolePolicy => ROLE_NAME,
        };
        operation.param(params, key)
    }

    fn apply(&self, operation: Operation, params: &Params) -> Result<OperationResult> {
        for key in operation.required_params() {
            operation.param(params, key)?;
        }

        let mut dir = self.lock_directory();
        let subject = Self::subject(operation, params)?.to_string();

        let result = match operation {
            Operation::CreateGroup => create(&mut dir.groups, &subject, "Group"),
            Operation::CreateUser => create(&mut dir.users, &subject, "User"),
            Operation::CreateRole => create(&mut dir.roles, &subject, "Role"),
            Operation::PutGroupPolicy | Operation::PutRolePolicy => {
                let (entities, label) = if operation == Operation::PutGroupPolicy {
                    (&dir.groups, "group")
                } else {
                    (&dir.roles, "role")
                };
                if entities.contains(&subject) {
                    let policy_name = operation.param(params, POLICY_NAME)?.to_string();
                    let document = operation.param(params, POLICY_DOCUMENT)?.to_string();
                    dir.policies.insert((subject, policy_name), document);
                    OperationResult::success(200, "{}")
                } else {
                    missing(label, &subject)
                }
            }
            Operation::AddUserToGroup => {
                let group = operation.param(params, GROUP_NAME)?.to_string();
                if !dir.users.contains(&subject) {
                    missing("user", &subject)
                } else if !dir.groups.contains(&group) {
                    missing("group", &group)
                } else {
                    dir.memberships.insert((subject, group));
                    OperationResult::success(200, "{}")
                }
            }
        };

        Ok(result)
    }
}

fn create(entities: &mut BTreeSet<String>, name: &str, label: &str) -> OperationResult {
    if entities.insert(name.to_string()) {
        OperationResult::success(200, format!(r#"{{"{}Name":"{}"}}"#, label, name))
    } else {
        OperationResult::failure(
            409,
            ALREADY_EXISTS,
            format!("{} with name {} already exists.", label, name),
        )
    }
}

fn missing(label: &str, name: &str) -> OperationResult {
    OperationResult::failure(
        404,
        NO_SUCH_ENTITY,
        format!("The {} with name {} cannot be found.", label, name),
    )
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    fn service(&self) -> &str {
        "iam"
    }

    fn endpoint(&self) -> String {
        "memory".to_string()
    }

    async fn call(&self, operation: Operation, params: &Params) -> Result<OperationResult> {
        let fault = Self::subject(operation, params)
            .ok()
            .and_then(|subject| self.lock_faults().get(&(operation, subject.to_string())).cloned());

        if let Some(Fault::Transport(message)) = &fault {
            return Err(TransportError::Dispatch(message.clone()));
        }

        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((operation, params.clone()));

        match fault {
            Some(Fault::Remote {
                status_code,
                reason,
            }) => Ok(OperationResult::failure(status_code, reason, "injected failure")),
            _ => self.apply(operation, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::params;

    #[tokio::test]
    async fn test_create_conflicts_on_second_call() {
        let service = InMemoryIdentityService::new();
        let p = params([(GROUP_NAME, "group1")]);

        assert!(service.call(Operation::CreateGroup, &p).await.unwrap().ok);
        let again = service.call(Operation::CreateGroup, &p).await.unwrap();
        assert_eq!(again.status_code, 409);
        assert_eq!(again.reason, ALREADY_EXISTS);
        assert!(service.has_group("group1"));
    }

    #[tokio::test]
    async fn test_membership_requires_both_entities() {
        let service = InMemoryIdentityService::new();
        service
            .call(Operation::CreateUser, &params([(USER_NAME, "user1")]))
            .await
            .unwrap();

        let p = params([(USER_NAME, "user1"), (GROUP_NAME, "group1")]);
        let result = service.call(Operation::AddUserToGroup, &p).await.unwrap();
        assert_eq!(result.status_code, 404);
        assert!(!service.is_member("user1", "group1"));
    }

    #[tokio::test]
    async fn test_missing_parameter() {
        let service = InMemoryIdentityService::new();
        let result = service
            .call(Operation::PutGroupPolicy, &params([(GROUP_NAME, "group1")]))
            .await;
        assert!(matches!(result, Err(TransportError::MissingParameter { .. })));
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let service = InMemoryIdentityService::new();
        service.fail_on(Operation::CreateUser, "user1", 500, "ServiceFailure");
        service.break_transport_on(Operation::CreateUser, "user2", "connection reset");

        let failed = service
            .call(Operation::CreateUser, &params([(USER_NAME, "user1")]))
            .await
            .unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.reason, "ServiceFailure");
        assert!(!service.has_user("user1"));

        let broken = service
            .call(Operation::CreateUser, &params([(USER_NAME, "user2")]))
            .await;
        assert!(matches!(broken, Err(TransportError::Dispatch(_))));
        assert_eq!(service.journal().len(), 1);
    }
}
