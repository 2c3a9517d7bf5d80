//! Sourcing Market
//!
//! Pricing and formatting service for an overseas sourcing storefront:
//! CNY exchange-rate lookup with a safe fallback, resale price
//! recommendation, competition-score labels, numeric coercion of scraped
//! values and a JSON-safe settings listing.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   HTTP handlers, routing, API key guard      │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   Currency lookup, pricing, settings, config │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │  Pricing rules, sanitizer, traits, errors    │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  Postgres settings store, tracing, metrics   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sourcing_market::api::create_router;
//! use sourcing_market::app::AppState;
//! use sourcing_market::infra::PostgresClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(PostgresClient::with_defaults(&database_url).await?);
//!     store.run_migrations().await?;
//!
//!     let state = Arc::new(AppState::new(store, api_key));
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
