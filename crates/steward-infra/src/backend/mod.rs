//! Backend CRUD client implementations.

pub mod http;

pub use http::HttpBackendClient;
