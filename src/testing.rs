//! Testing utilities for the provider.
//!
//! [`MockTransport`] replays canned GraphQL responses and records every
//! request, so client calls and whole resource lifecycles can be exercised
//! without a network. [`ProviderTester`] drives a [`ProviderService`] the
//! way the host would.
//!
//! # Example
//!
//! ```ignore
//! use hemmer_provider_twingate::client::Client;
//! use hemmer_provider_twingate::testing::{MockTransport, ProviderTester};
//! use hemmer_provider_twingate::TwingateProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_group() {
//!     let transport = MockTransport::new()
//!         .respond_with(r#"{"data":{"groupCreate":{"ok":true,"entity":{"id":"g1","name":"devs"}}}}"#);
//!     let tester = ProviderTester::new(TwingateProvider::with_client(Client::new(transport)));
//!
//!     let state = tester.create("twingate_group", json!({"name": "devs"})).await.unwrap();
//!     assert_eq!(state["id"], "g1");
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::client::{Client, GraphqlRequest, Transport, TransportError};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{ProviderService, TwingateProvider};
use crate::schema::{Diagnostic, DiagnosticSeverity};
use crate::types::{ImportedResource, PlanResult};

/// Endpoint reported by [`MockTransport`].
pub const MOCK_URL: &str = "https://test.twingate.com/api/graphql/";

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Error(String),
}

#[derive(Debug, Default)]
struct Recorded {
    replies: VecDeque<Reply>,
    requests: Vec<GraphqlRequest>,
}

/// A [`Transport`] answering from a queue of canned replies.
///
/// Clones share the same queue and request log. A request arriving with
/// the queue empty fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Recorded>>,
}

impl MockTransport {
    /// A transport with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body.
    pub fn respond_with(self, body: impl Into<String>) -> Self {
        self.lock().replies.push_back(Reply::Body(body.into()));
        self
    }

    /// Queue a transport failure.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.lock().replies.push_back(Reply::Error(message.into()));
        self
    }

    /// Number of requests sent so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn from_config(_config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self::new())
    }

    fn url(&self) -> &str {
        MOCK_URL
    }

    async fn execute(&self, request: &GraphqlRequest) -> Result<Vec<u8>, TransportError> {
        let mut recorded = self.lock();
        recorded.requests.push(request.clone());
        match recorded.replies.pop_front() {
            Some(Reply::Body(body)) => Ok(body.into_bytes()),
            Some(Reply::Error(message)) => Err(TransportError::new(MOCK_URL, message)),
            None => Err(TransportError::new(MOCK_URL, "no response queued")),
        }
    }
}

/// A configured provider whose client talks to `transport`.
///
/// The provider gets a clone, so `transport` still sees every request.
pub fn mock_provider(transport: &MockTransport) -> TwingateProvider<MockTransport> {
    TwingateProvider::with_client(Client::new(transport.clone()))
}

/// A test harness driving a [`ProviderService`].
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Configure the provider.
    ///
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the final state after read. A resource that vanished before
    /// the read is reported as [`ProviderError::NotFound`].
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;

        let created_state = self
            .create(resource_type, plan_result.planned_state)
            .await?;

        self.read(resource_type, created_state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{} vanished after create", resource_type)))
    }

    /// Run a full update lifecycle: plan → update.
    ///
    /// Returns the state reported by the update.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;

        self.update(resource_type, prior_state, plan_result.planned_state)
            .await
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
