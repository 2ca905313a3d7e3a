//! # AWS Secrets Manager Client
//!
//! Implements [`SecretStore`] on top of the AWS Secrets Manager API.
//!
//! Credentials come from the SDK's default provider chain (environment,
//! OIDC web identity in CI, instance profile, ...). Region and endpoint can
//! be overridden, the latter for LocalStack or other mock servers.

use crate::constants::LIST_SECRETS_PAGE_SIZE;
use crate::provider::SecretStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::types::{Filter, FilterNameStringType};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use std::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};

/// Connection settings for [`AwsSecretsManager`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsStoreConfig {
    /// Region override; `None` uses `AWS_REGION` / profile resolution
    pub region: Option<String>,
    /// Endpoint override (e.g. `http://localhost:4566` for LocalStack)
    pub endpoint_url: Option<String>,
}

/// AWS Secrets Manager provider implementation
pub struct AwsSecretsManager {
    client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManager {
    /// Create a new AWS Secrets Manager client from the default credential chain
    pub async fn new(config: &AwsStoreConfig) -> Self {
        let sdk_config = create_sdk_config(config).await;
        Self::from_sdk_config(&sdk_config)
    }

    /// Create a client from an already-loaded SDK config
    #[must_use]
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        Self {
            client: SecretsManagerClient::new(sdk_config),
            region,
        }
    }
}

/// Load AWS SDK config, applying region and endpoint overrides
pub async fn create_sdk_config(config: &AwsStoreConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(region) = &config.region {
        info!("Using AWS region override: {}", region);
        builder = builder.region(aws_config::Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint_url {
        info!("Using AWS Secrets Manager endpoint override: {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    async fn list_secret_names(&self, scope: &str) -> Result<Vec<String>> {
        let span = info_span!(
            "aws.secret.list",
            scope = scope,
            region = self.region,
            operation.pages = field::Empty,
            operation.count = field::Empty,
        );
        let span_clone = span.clone();

        async move {
            let mut names = Vec::new();
            let mut next_token: Option<String> = None;
            let mut pages = 0_u32;

            loop {
                let page = self
                    .client
                    .list_secrets()
                    .max_results(LIST_SECRETS_PAGE_SIZE)
                    .filters(
                        Filter::builder()
                            .key(FilterNameStringType::Name)
                            .values(scope)
                            .build(),
                    )
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|e| {
                        anyhow!(
                            "Failed to list AWS secrets under {scope}: {}",
                            DisplayErrorContext(&e)
                        )
                    })?;
                pages += 1;

                names.extend(
                    page.secret_list()
                        .iter()
                        .filter_map(|entry| entry.name().map(ToString::to_string)),
                );

                match page.next_token() {
                    Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                    _ => break,
                }
            }

            span_clone.record("operation.pages", pages);
            span_clone.record("operation.count", names.len());
            debug!(
                provider = "aws",
                scope = scope,
                pages = pages,
                "Listed {} AWS secrets",
                names.len()
            );
            Ok(names)
        }
        .instrument(span)
        .await
    }

    async fn secret_exists(&self, secret_name: &str) -> Result<bool> {
        let span = tracing::debug_span!(
            "aws.secret.describe",
            secret.name = secret_name,
            region = self.region
        );

        async move {
            match self
                .client
                .describe_secret()
                .secret_id(secret_name)
                .send()
                .await
            {
                Ok(_) => Ok(true),
                Err(e)
                    if e.as_service_error()
                        .is_some_and(|se| se.is_resource_not_found_exception()) =>
                {
                    Ok(false)
                }
                Err(e) => Err(anyhow!(
                    "Failed to describe AWS secret {secret_name}: {}",
                    DisplayErrorContext(&e)
                )),
            }
        }
        .instrument(span)
        .await
    }

    async fn create_secret(
        &self,
        secret_name: &str,
        secret_value: &str,
        description: &str,
    ) -> Result<()> {
        let span = info_span!(
            "aws.secret.create",
            secret.name = secret_name,
            region = self.region,
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let result = self
                .client
                .create_secret()
                .name(secret_name)
                .description(description)
                .secret_string(secret_value)
                .send()
                .await;

            span_clone.record("operation.duration_ms", elapsed_ms(start));
            span_clone.record("operation.success", result.is_ok());

            result.map(|_| ()).map_err(|e| {
                warn!(
                    provider = "aws",
                    region = self.region,
                    secret_name = secret_name,
                    operation = "create",
                    error = %DisplayErrorContext(&e),
                    "Failed to create AWS secret"
                );
                anyhow!(
                    "Failed to create AWS secret {secret_name}: {}",
                    DisplayErrorContext(&e)
                )
            })
        }
        .instrument(span)
        .await
    }

    async fn update_secret(&self, secret_name: &str, secret_value: &str) -> Result<()> {
        let span = info_span!(
            "aws.secret.update",
            secret.name = secret_name,
            region = self.region,
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let result = self
                .client
                .update_secret()
                .secret_id(secret_name)
                .secret_string(secret_value)
                .send()
                .await;

            span_clone.record("operation.duration_ms", elapsed_ms(start));
            span_clone.record("operation.success", result.is_ok());

            result.map(|_| ()).map_err(|e| {
                warn!(
                    provider = "aws",
                    region = self.region,
                    secret_name = secret_name,
                    operation = "update",
                    error = %DisplayErrorContext(&e),
                    "Failed to update AWS secret"
                );
                anyhow!(
                    "Failed to update AWS secret {secret_name}: {}",
                    DisplayErrorContext(&e)
                )
            })
        }
        .instrument(span)
        .await
    }

    async fn delete_secret(&self, secret_name: &str) -> Result<()> {
        let span = info_span!(
            "aws.secret.delete",
            secret.name = secret_name,
            region = self.region,
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let result = self
                .client
                .delete_secret()
                .secret_id(secret_name)
                .force_delete_without_recovery(true)
                .send()
                .await;

            span_clone.record("operation.duration_ms", elapsed_ms(start));
            span_clone.record("operation.success", result.is_ok());

            result.map(|_| ()).map_err(|e| {
                anyhow!(
                    "Failed to delete AWS secret {secret_name}: {}",
                    DisplayErrorContext(&e)
                )
            })
        }
        .instrument(span)
        .await
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sdk_config_applies_region_override() {
        let config = AwsStoreConfig {
            region: Some("eu-west-1".to_string()),
            endpoint_url: Some("http://localhost:4566".to_string()),
        };
        let sdk_config = create_sdk_config(&config).await;
        assert_eq!(sdk_config.region().map(ToString::to_string).as_deref(), Some("eu-west-1"));
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:4566"));

        let store = AwsSecretsManager::from_sdk_config(&sdk_config);
        assert!(format!("{store:?}").contains("eu-west-1"));
    }

    #[test]
    fn test_default_store_config_has_no_overrides() {
        let config = AwsStoreConfig::default();
        assert!(config.region.is_none());
        assert!(config.endpoint_url.is_none());
    }
}
