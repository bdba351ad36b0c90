//! Bundle of ports implementing a single council provider.

use std::sync::Arc;

use crate::ports::{AreaValidator, ScheduleSource};

/// Collection of ports implementing a provider for one council.
pub struct Provider {
    /// Human-friendly council name.
    pub name: String,
    /// Implementation for fetching schedule pages.
    pub source: Arc<dyn ScheduleSource>,
    /// Implementation for checking area identifiers.
    pub validator: Arc<dyn AreaValidator>,
}
