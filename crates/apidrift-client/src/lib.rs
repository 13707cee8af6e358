//! # apidrift-client — Endpoint Driver
//!
//! The HTTP side of drift detection: a thin GET client with classified
//! errors, the fixed endpoint catalog of the game server's API surface,
//! and ID discovery for materializing `{id}` path templates.
//!
//! This crate knows nothing about schemas or comparison: it produces
//! decoded JSON values (or classified fetch errors) for the run loop to
//! feed into the comparator.
//!
//! ## Failure Discipline
//!
//! Fetch failures are never fatal. Every request is a single best-effort
//! attempt with a fixed 10-second timeout; the caller records the
//! classified error against the endpoint and moves on. No retry, no
//! backoff.

pub mod catalog;
pub mod discovery;
pub mod fetch;

pub use catalog::{catalog, Endpoint, IdSource};
pub use discovery::{discover_ids, DiscoveredIds, MAX_IDS_PER_SOURCE};
pub use fetch::{ApiClient, FetchError, FETCH_TIMEOUT};
