//! Typed HTTP client for the restaurant search backend.
//!
//! Exposes [`SearchClient`] with the two endpoints the results and detail
//! pages consume: `POST /hp/search` and `GET /hp/shops/{id}`.

pub mod client;
pub mod error;
pub mod types;

pub use client::SearchClient;
pub use error::ClientError;
pub use types::{SearchPage, SearchRequest};
