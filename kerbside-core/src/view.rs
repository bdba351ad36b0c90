//! Read-time presentation of a stored pickup.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{AreaId, Category, CollectionRecord};

const ISO_DATE: &str = "%Y-%m-%d";
const WEEKDAY: &str = "%A";
const LONG_DATE: &str = "%A, %d %B";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Attributes derived from a pickup relative to "today".
///
/// Recompute on every read; the values go stale at midnight.
pub struct CollectionView {
    /// Category token, e.g. `food-waste`.
    pub waste_type: Category,
    /// Human-friendly category name.
    pub name: &'static str,
    /// Area the pickup belongs to.
    pub area_number: AreaId,
    /// Pickup date as `YYYY-MM-DD`.
    pub date: String,
    /// Weekday name of the pickup.
    pub day_of_week: String,
    /// Pickup date as e.g. `Wednesday, 08 October`.
    pub formatted_date: String,
    /// Whole days from `today` to the pickup.
    pub days_until: i64,
    /// Pickup is today.
    pub is_today: bool,
    /// Pickup is tomorrow.
    pub is_tomorrow: bool,
}

impl CollectionView {
    /// Derive the view of `record` as seen on `today`.
    #[must_use]
    pub fn new(record: &CollectionRecord, area: &AreaId, today: NaiveDate) -> Self {
        let days_until = (record.date - today).num_days();
        Self {
            waste_type: record.category,
            name: record.category.display_name(),
            area_number: area.clone(),
            date: record.date.format(ISO_DATE).to_string(),
            day_of_week: record.date.format(WEEKDAY).to_string(),
            formatted_date: record.date.format(LONG_DATE).to_string(),
            days_until,
            is_today: days_until == 0,
            is_tomorrow: days_until == 1,
        }
    }
}
