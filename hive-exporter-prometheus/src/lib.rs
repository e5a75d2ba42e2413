//! Prometheus metrics exporter for HiveOS rigs.
//!
//! This crate polls the status document the HiveOS agent writes on every rig
//! and exposes per-GPU hashrate, temperatures, fan speeds and power draw via an
//! HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ last_stat.json  │────>│  StatusPoller   │────>│ MetricRegistry  │
//! │  (HiveOS agent) │     │ (read, decode)  │     │  (publish)      │
//! └─────────────────┘     └─────────────────┘     └────────┬────────┘
//!                                                          │
//!                                                 ┌────────v────────┐
//!                                                 │   HTTP Server   │
//!                                                 │   (/metrics)    │
//!                                                 └─────────────────┘
//! ```
//!
//! A document that cannot be read or decoded leaves the registry as it was, so
//! scrapes keep returning the last good values.
//!
//! # Usage
//!
//! ```bash
//! hive-exporter-prometheus --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod config;
pub mod http;
pub mod poller;
pub mod publisher;
pub mod registry;

pub use config::ExporterConfig;
pub use http::HttpServer;
pub use poller::{PollOutcome, StatusPoller};
pub use publisher::publish;
pub use registry::{MetricRegistry, SharedRegistry};
