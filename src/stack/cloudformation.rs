//! AWS `CloudFormation` stack client.
//!
//! Reads stacks through the `CloudFormation` API and resolves the account
//! alias through IAM, falling back to the STS caller account.

use async_trait::async_trait;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::TemplateStage;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::{Result, StackError, StacklensError};

use super::client::StackClient;
use super::template::parse_template;
use super::types::{Output, Parameter, ResourceInstance, StackDescriptor, TemplateDocument};

/// Error codes meaning the credentials were rejected.
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
    "SignatureDoesNotMatch",
];

/// Error codes meaning the service is temporarily unable to answer.
const TRANSIENT_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "ServiceUnavailable",
    "InternalFailure",
    "InternalError",
    "RequestTimeout",
];

/// `CloudFormation`-backed stack client.
#[derive(Debug, Clone)]
pub struct CloudFormationStackClient {
    /// `CloudFormation` client.
    cfn: Client,
    /// IAM client, for the account alias.
    iam: aws_sdk_iam::Client,
    /// STS client, for the account id fallback.
    sts: aws_sdk_sts::Client,
    /// Region the clients are bound to.
    region: String,
}

impl CloudFormationStackClient {
    /// Creates a client from the default AWS configuration chain.
    pub async fn new(region: Option<&str>, profile: Option<&str>) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(region_str) = region {
            loader = loader.region(aws_config::Region::new(region_str.to_string()));
        }
        if let Some(profile_name) = profile {
            loader = loader.profile_name(profile_name);
        }
        let config = loader.load().await;

        Self::from_config(&config)
    }

    /// Creates a client from an existing SDK configuration.
    #[must_use]
    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        let region = config
            .region()
            .map(ToString::to_string)
            .unwrap_or_default();

        Self {
            cfn: Client::new(config),
            iam: aws_sdk_iam::Client::new(config),
            sts: aws_sdk_sts::Client::new(config),
            region,
        }
    }

    /// Resolves the account alias, falling back to the account id.
    ///
    /// Failures here never fail the describe; the cell is left empty.
    async fn account_alias(&self) -> String {
        match self.iam.list_account_aliases().send().await {
            Ok(output) => {
                if let Some(alias) = output.account_aliases().first() {
                    return alias.clone();
                }
                debug!("Account has no alias, falling back to account id");
            }
            Err(e) => {
                debug!("ListAccountAliases failed: {}", DisplayErrorContext(&e));
            }
        }

        match self.sts.get_caller_identity().send().await {
            Ok(identity) => identity.account().unwrap_or_default().to_string(),
            Err(e) => {
                warn!("Could not determine account: {}", DisplayErrorContext(&e));
                String::new()
            }
        }
    }
}

#[async_trait]
impl StackClient for CloudFormationStackClient {
    async fn get_stack(&self, name: &str) -> Result<StackDescriptor> {
        info!("Describing stack {name} in {}", self.region);

        let output = self
            .cfn
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| classify(name, e))?;

        let stack = output.stacks().first().ok_or_else(|| StackError::NotFound {
            stack: name.to_string(),
        })?;

        let parameters = stack
            .parameters()
            .iter()
            .map(|p| Parameter {
                name: p.parameter_key().unwrap_or_default().to_string(),
                actual_value: p.parameter_value().unwrap_or_default().to_string(),
                resolved_value: p.resolved_value().map(str::to_string),
            })
            .collect();

        let outputs = stack
            .outputs()
            .iter()
            .map(|o| Output {
                name: o.output_key().unwrap_or_default().to_string(),
                description: o.description().map(str::to_string),
                value: o.output_value().unwrap_or_default().to_string(),
                export_name: o.export_name().map(str::to_string),
            })
            .collect();

        let account_alias = self.account_alias().await;

        Ok(StackDescriptor {
            name: name.to_string(),
            region: self.region.clone(),
            account_alias,
            parameters,
            outputs,
        })
    }

    async fn get_template(
        &self,
        name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<TemplateDocument> {
        debug!("Fetching template for stack {name}");

        let output = self
            .cfn
            .get_template()
            .stack_name(name)
            .template_stage(TemplateStage::Original)
            .send()
            .await
            .map_err(|e| classify(name, e))?;

        let body = output
            .template_body()
            .ok_or_else(|| StackError::template(name, "control plane returned no template body"))?;

        parse_template(name, body, parameters)
    }

    async fn get_resources(&self, name: &str) -> Result<Vec<ResourceInstance>> {
        debug!("Listing resources of stack {name}");

        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let page = self
                .cfn
                .list_stack_resources()
                .stack_name(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify(name, e))?;
            pages += 1;

            resources.extend(page.stack_resource_summaries().iter().map(|summary| {
                ResourceInstance {
                    logical_id: summary.logical_resource_id().copy_out(),
                    resource_type: summary.resource_type().copy_out(),
                    physical_id: summary
                        .physical_resource_id()
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                }
            }));

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!("Found {} resources in {pages} page(s)", resources.len());
        Ok(resources)
    }

    fn backend_type(&self) -> &'static str {
        "cloudformation"
    }
}

/// Copies SDK text out into an owned `String`, whether the model marks the
/// member as required or optional.
trait CopyOut {
    fn copy_out(self) -> String;
}

impl CopyOut for &str {
    fn copy_out(self) -> String {
        self.to_string()
    }
}

impl CopyOut for Option<&str> {
    fn copy_out(self) -> String {
        self.unwrap_or_default().to_string()
    }
}

/// Maps an SDK failure onto the stack error taxonomy.
fn classify<E, R>(stack: &str, err: SdkError<E, R>) -> StacklensError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();

    let error = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StackError::transient(detail),
        _ => {
            let service = err.as_service_error();
            let code = service.and_then(|e| e.code()).unwrap_or_default();
            let message = service.and_then(|e| e.message()).unwrap_or_default();
            classify_code(stack, code, message, detail)
        }
    };

    error.into()
}

/// Maps a service error code onto the stack error taxonomy.
fn classify_code(stack: &str, code: &str, message: &str, detail: String) -> StackError {
    if code == "ValidationError" && message.contains("does not exist") {
        StackError::NotFound {
            stack: stack.to_string(),
        }
    } else if AUTH_CODES.contains(&code) {
        StackError::AuthFailure { message: detail }
    } else if TRANSIENT_CODES.contains(&code) {
        StackError::transient(detail)
    } else {
        StackError::api(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stack_is_not_found() {
        let err = classify_code(
            "empty-stack",
            "ValidationError",
            "Stack with id empty-stack does not exist",
            String::from("detail"),
        );
        assert!(matches!(err, StackError::NotFound { stack } if stack == "empty-stack"));
    }

    #[test]
    fn test_other_validation_errors_are_api_errors() {
        let err = classify_code("s", "ValidationError", "1 validation error", String::from("d"));
        assert!(matches!(err, StackError::Api { .. }));
    }

    #[test]
    fn test_auth_and_transient_codes() {
        let auth = classify_code("s", "ExpiredToken", "", String::from("expired"));
        assert!(matches!(auth, StackError::AuthFailure { .. }));

        let throttled = classify_code("s", "Throttling", "Rate exceeded", String::from("rate"));
        assert!(matches!(throttled, StackError::TransientBackend { .. }));
    }

    #[test]
    fn test_copy_out() {
        assert_eq!("Bucket".copy_out(), "Bucket");
        assert_eq!(Some("Queue").copy_out(), "Queue");
        assert_eq!(None::<&str>.copy_out(), "");
    }
}
