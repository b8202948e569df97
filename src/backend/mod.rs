pub mod client;
pub mod models;

pub use client::{BackendClient, FetchError, SeriesSource};
pub use models::SeriesResponse;
