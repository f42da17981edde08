//! IAM service implementation

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_iam::Client;
use aws_sdk_iam::config::Region;
use aws_sdk_iam::config::http::HttpResponse;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use iamflow_cloud::action::{
    ASSUME_ROLE_POLICY_DOCUMENT, GROUP_NAME, POLICY_DOCUMENT, POLICY_NAME, ROLE_NAME, USER_NAME,
};
use iamflow_cloud::{IdentityService, Operation, OperationResult, Params, TransportError};
use tracing::{debug, info};

/// AWS IAM backed by `aws-sdk-iam`
pub struct IamService {
    client: Client,
    region: String,
}

impl IamService {
    /// Load the AWS configuration and build a client.
    ///
    /// `region` overrides whatever the provider chain resolves.
    pub async fn connect(region: Option<&str>) -> Result<Self> {
        let loader = aws_config::defaults(BehaviorVersion::latest());
        let loader = match region {
            Some(region) => loader.region(Region::new(region.to_string())),
            None => loader,
        };
        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.to_string())
            .ok_or(AwsError::MissingRegion)?;

        info!(region = %region, "IAM client ready");

        Ok(Self {
            client: Client::new(&config),
            region,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl IdentityService for IamService {
    fn service(&self) -> &str {
        "iam"
    }

    fn endpoint(&self) -> String {
        format!("iam.amazonaws.com ({})", self.region)
    }

    async fn call(
        &self,
        operation: Operation,
        params: &Params,
    ) -> iamflow_cloud::Result<OperationResult> {
        debug!(operation = %operation, endpoint = %self.endpoint(), "sending request");

        match operation {
            Operation::CreateGroup => into_result(
                self.client
                    .create_group()
                    .group_name(operation.param(params, GROUP_NAME)?)
                    .send()
                    .await,
            ),
            Operation::PutGroupPolicy => into_result(
                self.client
                    .put_group_policy()
                    .group_name(operation.param(params, GROUP_NAME)?)
                    .policy_name(operation.param(params, POLICY_NAME)?)
                    .policy_document(operation.param(params, POLICY_DOCUMENT)?)
                    .send()
                    .await,
            ),
            Operation::CreateUser => into_result(
                self.client
                    .create_user()
                    .user_name(operation.param(params, USER_NAME)?)
                    .send()
                    .await,
            ),
            Operation::AddUserToGroup => into_result(
                self.client
                    .add_user_to_group()
                    .user_name(operation.param(params, USER_NAME)?)
                    .group_name(operation.param(params, GROUP_NAME)?)
                    .send()
                    .await,
            ),
            Operation::CreateRole => into_result(
                self.client
                    .create_role()
                    .role_name(operation.param(params, ROLE_NAME)?)
                    .assume_role_policy_document(
                        operation.param(params, ASSUME_ROLE_POLICY_DOCUMENT)?,
                    )
                    .send()
                    .await,
            ),
            Operation::PutRolePolicy => into_result(
                self.client
                    .put_role_policy()
                    .role_name(operation.param(params, ROLE_NAME)?)
                    .policy_name(operation.param(params, POLICY_NAME)?)
                    .policy_document(operation.param(params, POLICY_DOCUMENT)?)
                    .send()
                    .await,
            ),
        }
    }
}

/// Map an SDK response onto an [`OperationResult`].
///
/// Service errors carry an HTTP status and become `ok == false` results;
/// everything else (timeouts, signing, dispatch) is a transport failure.
fn into_result<O, E>(
    outcome: std::result::Result<O, SdkError<E, HttpResponse>>,
) -> iamflow_cloud::Result<OperationResult>
where
    O: std::fmt::Debug,
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match outcome {
        Ok(output) => Ok(OperationResult::success(200, format!("{:?}", output))),
        Err(SdkError::ServiceError(context)) => {
            let status = context.raw().status().as_u16();
            let err = context.err();
            Ok(remote_failure(status, err.code(), err.message()))
        }
        Err(e) => Err(TransportError::Dispatch(DisplayErrorContext(&e).to_string())),
    }
}

fn remote_failure(status: u16, code: Option<&str>, message: Option<&str>) -> OperationResult {
    OperationResult::failure(
        status,
        code.unwrap_or("Unknown"),
        message.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_iam::operation::create_group::{CreateGroupError, CreateGroupOutput};

    #[test]
    fn test_remote_failure_conflict() {
        let result = remote_failure(
            409,
            Some("EntityAlreadyExists"),
            Some("Group with name group1 already exists."),
        );
        assert!(!result.ok);
        assert!(result.is_conflict());
        assert_eq!(result.body_text(), "Group with name group1 already exists.");
    }

    #[test]
    fn test_remote_failure_without_metadata() {
        let result = remote_failure(500, None, None);
        assert_eq!(result.reason, "Unknown");
        assert!(result.body.is_empty());
        assert!(!result.is_conflict());
    }

    #[test]
    fn test_construction_failure_is_transport_error() {
        let outcome: std::result::Result<CreateGroupOutput, SdkError<CreateGroupError, HttpResponse>> =
            Err(SdkError::construction_failure("missing group name"));

        let result = into_result(outcome);
        assert!(matches!(result, Err(TransportError::Dispatch(_))));
    }

    #[tokio::test]
    async fn test_connect_uses_explicit_region() {
        let service = IamService::connect(Some("eu-west-1")).await.unwrap();
        assert_eq!(service.region(), "eu-west-1");
        assert_eq!(service.service(), "iam");
        assert!(service.endpoint().contains("eu-west-1"));
    }
}
