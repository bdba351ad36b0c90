//! Traits describing the schedule source backends and shared error type.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::AreaId;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the schedule source.
pub enum PortError {
    /// Network layer failed or the page answered with a non-success status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Fetch cycle did not finish before its deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    /// Area identifier was rejected by the source.
    #[error("Invalid area: {0}")]
    InvalidArea(AreaId),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Backend that supplies raw schedule markup for an area.
pub trait ScheduleSource: Send + Sync {
    /// Fetch the schedule page for `area`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the page cannot be retrieved.
    async fn fetch(&self, area: &AreaId) -> Result<String, PortError>;
}

#[async_trait]
/// Backend that checks whether an area has a schedule page at all.
pub trait AreaValidator: Send + Sync {
    /// Check that `area` resolves to a page listing collections.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the check itself could not be carried out.
    async fn validate(&self, area: &AreaId) -> Result<bool, PortError>;
}
