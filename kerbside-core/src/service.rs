//! High-level service facade used by clients.

use chrono::NaiveDateTime;

use crate::extractor::ScheduleExtractor;
use crate::model::{AreaId, ScheduleResult};
use crate::plugin::Provider;
use crate::ports::PortError;

/// Public entry point for validating areas and refreshing schedules.
pub struct KerbsideService {
    provider: Provider,
    extractor: ScheduleExtractor,
}

impl KerbsideService {
    /// Create a new service bound to the provided council provider.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self::with_extractor(provider, ScheduleExtractor::default())
    }

    /// Create a service with a custom extractor (e.g. a different rollover window).
    #[must_use]
    pub fn with_extractor(provider: Provider, extractor: ScheduleExtractor) -> Self {
        Self {
            provider,
            extractor,
        }
    }

    /// Display name of the council behind this service.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider.name
    }

    /// Check an area before it is used.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::InvalidArea`] when the area is empty or has no
    /// schedule page, or any transport error raised by the validator.
    pub async fn validate_area(&self, area: &AreaId) -> Result<(), PortError> {
        if area.is_empty() {
            return Err(PortError::InvalidArea(area.clone()));
        }

        if self.provider.validator.validate(area).await? {
            Ok(())
        } else {
            tracing::info!(%area, "area rejected by provider");
            Err(PortError::InvalidArea(area.clone()))
        }
    }

    /// Fetch the area's page and extract the next pickup per category.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the page could not be fetched. Problems with
    /// individual entries never fail the refresh.
    pub async fn refresh(
        &self,
        area: &AreaId,
        reference_now: NaiveDateTime,
    ) -> Result<ScheduleResult, PortError> {
        let markup = self.provider.source.fetch(area).await?;
        tracing::debug!(%area, bytes = markup.len(), "fetched schedule page");

        Ok(self.extractor.extract(&markup, reference_now))
    }
}
