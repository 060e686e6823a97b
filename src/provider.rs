//! The provider surface the host drives.
//!
//! [`ProviderService`] is the host-facing contract. [`TwingateProvider`]
//! implements it by dispatching each call on its resource or data source
//! type to the matching lifecycle in [`crate::resources`] or
//! [`crate::datasources`].

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{Client, HttpTransport, Transport};
use crate::config::ProviderConfig;
use crate::datasources::DataSourceKind;
use crate::error::ProviderError;
use crate::resources::ResourceKind;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::validate;

/// Operations a provider exposes to the host.
///
/// State and configuration travel as JSON objects described by the
/// provider's [`ProviderSchema`]. Diagnostics report problems the host
/// shows to the user; `Err` is for failures of the call itself.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// The provider's schema, covering every resource and data source.
    fn schema(&self) -> ProviderSchema;

    /// Resource and data source names, derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
        }
    }

    /// Validate the provider block before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Release whatever `configure` acquired.
    async fn stop(&self) -> Result<(), ProviderError>;

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Plan the changes moving a resource from `prior_state` to `proposed_state`.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a resource and return its state.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh a resource. `None` means it no longer exists.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError>;

    /// Update a resource in place and return its new state.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Bring an existing remote entity under management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError>;

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Read a data source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}

/// Twingate provider.
///
/// The API client is created by [`ProviderService::configure`] and shared by
/// every call until [`ProviderService::stop`].
pub struct TwingateProvider<T: Transport = HttpTransport> {
    client: RwLock<Option<Arc<Client<T>>>>,
}

impl<T: Transport> TwingateProvider<T> {
    /// An unconfigured provider.
    pub fn new() -> Self {
        Self {
            client: RwLock::new(None),
        }
    }

    /// A provider already holding `client`.
    pub fn with_client(client: Client<T>) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    async fn client(&self) -> Result<Arc<Client<T>>, ProviderError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(ProviderError::NotConfigured)
    }
}

impl<T: Transport> Default for TwingateProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse an operation result into diagnostics, logging failures.
fn diagnostics_of(result: Result<(), ProviderError>, what: &str) -> Vec<Diagnostic> {
    match result {
        Ok(()) => vec![],
        Err(e) => {
            warn!(error = %e, "{} is invalid", what);
            vec![e.to_diagnostic()]
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport> ProviderService for TwingateProvider<T> {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = ResourceKind::ALL
            .iter()
            .fold(schema, |schema, kind| schema.with_resource(kind.type_name(), kind.schema()));
        DataSourceKind::ALL.iter().fold(schema, |schema, kind| {
            schema.with_data_source(kind.type_name(), kind.schema())
        })
    }

    #[instrument(skip_all)]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validate(&ProviderConfig::schema(), &config);
        if diagnostics.is_empty() {
            diagnostics.extend(diagnostics_of(
                ProviderConfig::from_value(&config).and_then(|c| c.endpoint().map(drop)),
                "provider configuration",
            ));
        }
        Ok(diagnostics)
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match ProviderConfig::from_value(&config) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "Configure failed");
                return Ok(vec![e.to_diagnostic()]);
            }
        };

        let transport = match T::from_config(&config) {
            Ok(transport) => transport,
            Err(e) => {
                error!(error = %e, "Configure failed");
                return Ok(vec![e.to_diagnostic()]);
            }
        };

        info!(network = %config.network, url = %transport.url(), "Provider configured");
        *self.client.write().await = Some(Arc::new(Client::new(transport)));
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        *self.client.write().await = None;
        debug!("Provider stopped");
        Ok(())
    }

    #[instrument(skip(self, config))]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let diagnostics = validate(&kind.schema(), &config);
        if !diagnostics.is_empty() {
            return Ok(diagnostics);
        }
        Ok(diagnostics_of(kind.check(&config), resource_type))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let plan = PlanResult::compute(&kind.schema(), prior_state.as_ref(), &proposed_state);
        debug!(
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "Plan completed"
        );
        Ok(plan)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let client = self.client().await?;
        kind.create(&client, &planned_state).await.map_err(|e| {
            error!(error = %e, "Create failed");
            e
        })
    }

    #[instrument(skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let client = self.client().await?;
        let state = kind.read(&client, &current_state).await.map_err(|e| {
            error!(error = %e, "Read failed");
            e
        })?;
        if state.is_none() {
            info!("Resource is gone, clearing state");
        }
        Ok(state)
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let client = self.client().await?;
        kind.update(&client, &prior_state, &planned_state)
            .await
            .map_err(|e| {
                error!(error = %e, "Update failed");
                e
            })
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let client = self.client().await?;
        kind.delete(&client, &current_state).await.map_err(|e| {
            error!(error = %e, "Delete failed");
            e
        })
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let client = self.client().await?;
        let state = kind.import(&client, id).await.map_err(|e| {
            error!(error = %e, "Import failed");
            e
        })?;
        info!("Import completed");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    #[instrument(skip(self, config))]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let kind = DataSourceKind::from_type_name(data_source_type)?;
        let diagnostics = validate(&kind.schema(), &config);
        if !diagnostics.is_empty() {
            return Ok(diagnostics);
        }
        Ok(diagnostics_of(kind.check(&config), data_source_type))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let kind = DataSourceKind::from_type_name(data_source_type)?;
        let client = self.client().await?;
        kind.read(&client, &config).await.map_err(|e| {
            error!(error = %e, "Data source read failed");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_error_contains, assert_no_errors, mock_provider, MockTransport, ProviderTester,
    };
    use serde_json::json;

    #[test]
    fn test_metadata_lists_every_type() {
        let metadata = TwingateProvider::<MockTransport>::new().metadata();

        assert_eq!(
            metadata.resources,
            vec![
                "twingate_connector",
                "twingate_group",
                "twingate_remote_network",
                "twingate_resource",
                "twingate_service_account_key",
                "twingate_user",
            ]
        );
        assert_eq!(metadata.data_sources.len(), DataSourceKind::ALL.len());
        assert!(metadata.data_sources.contains(&"twingate_groups".to_string()));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let tester = ProviderTester::new(TwingateProvider::<MockTransport>::new());

        let err = tester
            .read("twingate_connector", json!({"id": "c1"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NotConfigured));
    }

    #[tokio::test]
    async fn test_configure_and_stop() {
        let tester = ProviderTester::new(TwingateProvider::<MockTransport>::new());

        tester
            .configure(json!({"api_token": "t", "network": "acme"}))
            .await
            .unwrap();
        let provider = tester.provider();
        assert!(provider.client().await.is_ok());

        provider.stop().await.unwrap();
        assert!(matches!(
            provider.client().await,
            Err(ProviderError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_configure_reports_bad_endpoint() {
        let provider = TwingateProvider::<HttpTransport>::new();

        let diagnostics = provider
            .configure(json!({"api_token": "t", "network": "not a host"}))
            .await
            .unwrap();

        assert_error_contains(&diagnostics, "invalid API url");
    }

    #[tokio::test]
    async fn test_validate_provider_config() {
        let provider = TwingateProvider::<MockTransport>::new();

        let diagnostics = provider
            .validate_provider_config(json!({"api_token": 1}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Invalid type for attribute 'api_token'");

        let diagnostics = provider
            .validate_provider_config(json!({"api_token": "t", "network": "acme"}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let transport = MockTransport::new();
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .create("twingate_widget", json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unknown resource type: twingate_widget");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_data_source_type() {
        let transport = MockTransport::new();
        let tester = ProviderTester::new(mock_provider(&transport));

        let err = tester
            .read_data_source("twingate_widgets", json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_import_wraps_state() {
        let transport = MockTransport::new().respond_with(
            r#"{"data":{"group":{"id":"g1","name":"devs","isActive":true,"type":"MANUAL"}}}"#,
        );
        let tester = ProviderTester::new(mock_provider(&transport));

        let imported = tester.import_resource("twingate_group", "g1").await.unwrap();

        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "twingate_group");
        assert_eq!(imported[0].state["name"], "devs");
    }
}
