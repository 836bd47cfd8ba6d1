//! # Vectorize client
//!
//! Validating client for the Vectorize vector-database HTTP API.
//!
//! ```text
//! caller → validator → transformation (format / batch)
//!        → VectorizeClient::execute → service
//! ```
//!
//! Every operation takes a [`ConnectionConfig`] by reference and performs exactly one
//! request (the `*_batched` writes perform one per chunk). Nothing is cached or retried.
//!
//! ```no_run
//! use vectorize_lib::{ConnectionConfig, QueryRequest, VectorizeClient};
//!
//! # async fn run() -> Result<(), vectorize_lib::VectorizeError> {
//! let config = ConnectionConfig::from_env()?;
//! let client = VectorizeClient::new()?;
//! let hits = client
//!     .query_vectors(&config, "docs-1", &QueryRequest::new(vec![0.1, 0.2, 0.3]).top_k(3), Some(3))
//!     .await?;
//! println!("{} matches", hits.count);
//! # Ok(())
//! # }
//! ```

pub mod vector;

pub use vector::*;
