//! Operation types for identity provisioning

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Parameters of a single remote operation, keyed by the remote API's
/// parameter names (e.g. `GroupName`, `PolicyDocument`).
pub type Params = BTreeMap<String, String>;

pub const GROUP_NAME: &str = "GroupName";
pub const USER_NAME: &str = "UserName";
pub const ROLE_NAME: &str = "RoleName";
pub const POLICY_NAME: &str = "PolicyName";
pub const POLICY_DOCUMENT: &str = "PolicyDocument";
pub const ASSUME_ROLE_POLICY_DOCUMENT: &str = "AssumeRolePolicyDocument";

/// Build a [`Params`] map from key/value pairs
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Remote operations issued by the provisioner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    CreateGroup,
    PutGroupPolicy,
    CreateUser,
    AddUserToGroup,
    CreateRole,
    PutRolePolicy,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CreateGroup,
        Operation::PutGroupPolicy,
        Operation::CreateUser,
        Operation::AddUserToGroup,
        Operation::CreateRole,
        Operation::PutRolePolicy,
    ];

    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateGroup => "CreateGroup",
            Operation::PutGroupPolicy => "PutGroupPolicy",
            Operation::CreateUser => "CreateUser",
            Operation::AddUserToGroup => "AddUserToGroup",
            Operation::CreateRole => "CreateRole",
            Operation::PutRolePolicy => "PutRolePolicy",
        }
    }

    /// Parameters the remote side requires for this operation
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Operation::CreateGroup => &[GROUP_NAME],
            Operation::PutGroupPolicy => &[GROUP_NAME, POLICY_NAME, POLICY_DOCUMENT],
            Operation::CreateUser => &[USER_NAME],
            Operation::AddUserToGroup => &[USER_NAME, GROUP_NAME],
            Operation::CreateRole => &[ROLE_NAME, ASSUME_ROLE_POLICY_DOCUMENT],
            Operation::PutRolePolicy => &[ROLE_NAME, POLICY_NAME, POLICY_DOCUMENT],
        }
    }

    /// Whether the operation creates an entity (and may conflict)
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            Operation::CreateGroup | Operation::CreateUser | Operation::CreateRole
        )
    }

    /// Look up a required parameter
    pub fn param<'a>(&self, params: &'a Params, name: &str) -> crate::Result<&'a str> {
        params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TransportError::MissingParameter {
                operation: self.as_str().to_string(),
                parameter: name.to_string(),
            })
    }
}

impl FromStr for Operation {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| TransportError::UnknownOperation(s.to_string()))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error code the remote service returns when an entity already exists
pub const ALREADY_EXISTS: &str = "EntityAlreadyExists";

/// Error code the remote service returns when an entity is missing
pub const NO_SUCH_ENTITY: &str = "NoSuchEntity";

/// Reason carried by the synthetic dry-run result
pub const NOT_EXECUTED: &str = "NotExecuted (dry run)";

/// Result of one remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// HTTP status code (0 when nothing was executed)
    pub status_code: u16,

    /// Whether the call succeeded
    pub ok: bool,

    /// Status reason or remote error code
    pub reason: String,

    /// Response content
    pub body: Vec<u8>,

    /// False for the synthetic dry-run result
    pub executed: bool,
}

impl OperationResult {
    pub fn success(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            ok: true,
            reason: "OK".to_string(),
            body: body.into(),
            executed: true,
        }
    }

    pub fn failure(status_code: u16, reason: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            ok: false,
            reason: reason.into(),
            body: body.into(),
            executed: true,
        }
    }

    /// Synthetic result returned in dry-run mode
    pub fn not_executed() -> Self {
        Self {
            status_code: 0,
            ok: true,
            reason: NOT_EXECUTED.to_string(),
            body: Vec::new(),
            executed: false,
        }
    }

    /// The call failed because the entity already exists
    pub fn is_conflict(&self) -> bool {
        !self.ok && (self.status_code == 409 || self.reason == ALREADY_EXISTS)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
