//! Hemmer Provider for Twingate
//!
//! Manages Twingate connectors, remote networks, users, groups, resources
//! and service account keys through the Twingate GraphQL API.
//!
//! # Overview
//!
//! - **[`client`]**: typed CRUD over a GraphQL [`Transport`]
//! - **[`model`]**: domain entities and closed enumerations
//! - **[`resources`]** and **[`datasources`]**: mapping between domain values
//!   and JSON resource state
//! - **[`ProviderService`]**: the lifecycle the Hemmer host drives, implemented
//!   by [`TwingateProvider`]
//! - **[`testing`]**: a recording [`testing::MockTransport`] and a
//!   [`testing::ProviderTester`] for lifecycle tests
//!
//! # Quick Start
//!
//! ```ignore
//! use hemmer_provider_twingate::{init_logging, ProviderService, TwingateProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = TwingateProvider::default();
//!     provider
//!         .configure(json!({"network": "acme", "api_token": "..."}))
//!         .await?;
//!
//!     let plan = provider
//!         .plan("twingate_remote_network", None, json!({"name": "office"}), json!({}))
//!         .await?;
//!     let state = provider
//!         .create("twingate_remote_network", plan.planned_state)
//!         .await?;
//!     tracing::info!(id = %state["id"], "created remote network");
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! | Attribute   | Environment          | Default        |
//! |-------------|----------------------|----------------|
//! | `api_token` | `TWINGATE_API_TOKEN` | required       |
//! | `network`   | `TWINGATE_NETWORK`   | required       |
//! | `url`       | `TWINGATE_URL`       | `twingate.com` |
//!
//! Requests go to `https://<network>.<url>/api/graphql/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod datasources;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;
pub mod testing;
pub mod types;
pub mod validation;

pub use client::{Client, ClientError, HttpTransport, Transport};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{ProviderService, TwingateProvider};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::validate;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

pub use serde_json;
pub use tracing;
