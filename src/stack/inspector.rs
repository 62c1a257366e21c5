//! Stack snapshot assembly.
//!
//! The inspector issues the three control plane reads in order, retrying
//! transient failures, and joins the results into one owned snapshot.

use tracing::{debug, info};

use crate::error::Result;
use crate::retry::RetryPolicy;

use super::client::StackClient;
use super::types::StackSnapshot;

/// Reads a stack's live state through a [`StackClient`].
#[derive(Debug)]
pub struct StackInspector<C> {
    /// Control plane client.
    client: C,
    /// Policy applied to each read.
    retry: RetryPolicy,
}

impl<C: StackClient> StackInspector<C> {
    /// Creates an inspector with the default retry policy.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reads stack, template and resources and joins them.
    ///
    /// The template is parsed with the stack's effective parameter values.
    /// The three reads are not atomic; the snapshot is best-effort.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last transient error
    /// once the retry budget is spent.
    pub async fn snapshot(&self, name: &str) -> Result<StackSnapshot> {
        info!("Inspecting stack {name} via {}", self.client.backend_type());

        let descriptor = self
            .retry
            .run("DescribeStack", || self.client.get_stack(name))
            .await?;

        let overrides = descriptor.parameter_overrides();
        debug!("Parsing template with {} parameter value(s)", overrides.len());

        let template = self
            .retry
            .run("GetTemplate", || self.client.get_template(name, &overrides))
            .await?;

        let resources = self
            .retry
            .run("ListStackResources", || self.client.get_resources(name))
            .await?;

        Ok(descriptor.into_snapshot(template, resources))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{StackError, StacklensError};
    use crate::stack::types::{
        Parameter, ResourceInstance, StackDescriptor, TemplateDocument,
    };
    use async_trait::async_trait;
    use mockall::mock;
    use std::collections::HashMap;
    use std::time::Duration;

    mock! {
        pub Client {}

        #[async_trait]
        impl StackClient for Client {
            async fn get_stack(&self, name: &str) -> Result<StackDescriptor>;
            async fn get_template(
                &self,
                name: &str,
                parameters: &HashMap<String, String>,
            ) -> Result<TemplateDocument>;
            async fn get_resources(&self, name: &str) -> Result<Vec<ResourceInstance>>;
            fn backend_type(&self) -> &'static str;
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(4, Duration::from_millis(1))
    }

    fn descriptor(name: &str) -> StackDescriptor {
        StackDescriptor {
            name: name.to_string(),
            region: String::from("eu-west-1"),
            account_alias: String::from("acme-prod"),
            parameters: vec![Parameter {
                name: String::from("secret"),
                actual_value: String::from("*****"),
                resolved_value: Some(String::from("actual-secret")),
            }],
            outputs: vec![],
        }
    }

    #[tokio::test]
    async fn test_snapshot_joins_reads() {
        let mut client = MockClient::new();
        client.expect_backend_type().return_const("mock");
        client
            .expect_get_stack()
            .times(1)
            .returning(|name| Ok(descriptor(name)));
        client
            .expect_get_template()
            .withf(|name, parameters| {
                name == "param-stack"
                    && parameters.get("secret").map(String::as_str) == Some("actual-secret")
            })
            .times(1)
            .returning(|_, _| Ok(TemplateDocument::default()));
        client.expect_get_resources().times(1).returning(|_| {
            Ok(vec![ResourceInstance {
                logical_id: String::from("Bucket"),
                resource_type: String::from("AWS::S3::Bucket"),
                physical_id: Some(String::from("param-stack-bucket-1a2b")),
            }])
        });

        let inspector = StackInspector::new(client).with_retry(fast_retry());
        let snapshot = inspector.snapshot("param-stack").await.expect("snapshot");

        assert_eq!(snapshot.name, "param-stack");
        assert_eq!(snapshot.account_alias, "acme-prod");
        assert_eq!(snapshot.parameters.len(), 1);
        assert_eq!(snapshot.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let mut client = MockClient::new();
        client.expect_backend_type().return_const("mock");
        let mut calls = 0;
        client.expect_get_stack().times(3).returning(move |name| {
            calls += 1;
            if calls <= 2 {
                Err(StackError::transient("Rate exceeded").into())
            } else {
                Ok(descriptor(name))
            }
        });
        client
            .expect_get_template()
            .times(1)
            .returning(|_, _| Ok(TemplateDocument::default()));
        client.expect_get_resources().times(1).returning(|_| Ok(vec![]));

        let inspector = StackInspector::new(client).with_retry(fast_retry());
        let snapshot = inspector.snapshot("flaky").await.expect("third attempt wins");

        assert_eq!(snapshot.name, "flaky");
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut client = MockClient::new();
        client.expect_backend_type().return_const("mock");
        client.expect_get_stack().times(1).returning(|name| {
            Err(StackError::NotFound {
                stack: name.to_string(),
            }
            .into())
        });
        client.expect_get_template().never();
        client.expect_get_resources().never();

        let inspector = StackInspector::new(client).with_retry(fast_retry());
        let result = inspector.snapshot("ghost").await;

        assert!(matches!(
            result,
            Err(StacklensError::Stack(StackError::NotFound { stack })) if stack == "ghost"
        ));
    }
}
