//! BackendClient trait definition.

use steward_types::error::BackendError;
use steward_types::intent::EntityKind;
use steward_types::params::ParameterSet;
use steward_types::record::Record;

/// The external CRUD service of record.
///
/// Every entity kind supports the same five operations. Ids are passed as
/// the string the user typed so malformed ids surface as backend validation
/// errors rather than resolver failures.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// Implementations live in steward-infra (e.g., `HttpBackendClient`).
pub trait BackendClient: Send + Sync {
    /// List every record of `kind`.
    fn list(
        &self,
        kind: EntityKind,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, BackendError>> + Send;

    /// Fetch one record. `Ok(None)` means the backend has no such record.
    fn get(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Record>, BackendError>> + Send;

    /// Create a record from the given fields. Returns the created record.
    fn create(
        &self,
        kind: EntityKind,
        fields: &ParameterSet,
    ) -> impl std::future::Future<Output = Result<Record, BackendError>> + Send;

    /// Update the given fields of record `id`. Returns the updated record.
    fn update(
        &self,
        kind: EntityKind,
        id: &str,
        fields: &ParameterSet,
    ) -> impl std::future::Future<Output = Result<Record, BackendError>> + Send;

    /// Permanently delete record `id`.
    fn delete(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}
