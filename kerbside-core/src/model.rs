//! Domain data structures for areas, waste categories, and collection schedules.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opaque identifier selecting which council area page to fetch.
pub struct AreaId(pub String);

impl AreaId {
    /// Build an identifier from user input, trimming surrounding whitespace.
    #[must_use]
    pub fn new<S: AsRef<str>>(raw: S) -> Self {
        AreaId(raw.as_ref().trim().to_owned())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Waste categories collected at the kerb.
pub enum Category {
    /// General waste bin.
    Rubbish,
    /// Recyclables bin.
    Recycle,
    /// Organic/food scraps bin.
    FoodWaste,
}

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Category; 3] = [Category::Rubbish, Category::Recycle, Category::FoodWaste];

    /// Token used by the council page (and by serialized output).
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Category::Rubbish => "rubbish",
            Category::Recycle => "recycle",
            Category::FoodWaste => "food-waste",
        }
    }

    /// Human-friendly name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Rubbish => "Rubbish",
            Category::Recycle => "Recycling",
            Category::FoodWaste => "Food Waste",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.token())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Category token that is not one of the known categories.
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.token() == token)
            .ok_or_else(|| UnknownCategory(token.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Next scheduled pickup for one category.
pub struct CollectionRecord {
    /// Date of the pickup.
    pub date: NaiveDate,
    /// Type of waste collected.
    pub category: Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of one fetch cycle: the earliest upcoming pickup per category.
///
/// Always carries exactly one slot per [`Category`]; an empty slot means no
/// upcoming entry was found in the page.
pub struct ScheduleResult {
    rubbish: Option<CollectionRecord>,
    recycle: Option<CollectionRecord>,
    #[serde(rename = "food-waste")]
    food_waste: Option<CollectionRecord>,
}

impl ScheduleResult {
    /// Record stored for a category, if any.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&CollectionRecord> {
        match category {
            Category::Rubbish => self.rubbish.as_ref(),
            Category::Recycle => self.recycle.as_ref(),
            Category::FoodWaste => self.food_waste.as_ref(),
        }
    }

    /// Iterate over all three slots in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Option<&CollectionRecord>)> {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
    }

    /// Check whether no category has an upcoming pickup.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, record)| record.is_none())
    }

    /// Fold a record in, keeping the earlier date for its category.
    ///
    /// Equal dates keep the record seen first.
    #[must_use]
    pub fn with_earliest(mut self, record: CollectionRecord) -> Self {
        let slot = self.slot_mut(record.category);
        if slot.is_none_or(|existing| record.date < existing.date) {
            *slot = Some(record);
        }
        self
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<CollectionRecord> {
        match category {
            Category::Rubbish => &mut self.rubbish,
            Category::Recycle => &mut self.recycle,
            Category::FoodWaste => &mut self.food_waste,
        }
    }
}

impl FromIterator<CollectionRecord> for ScheduleResult {
    fn from_iter<I: IntoIterator<Item = CollectionRecord>>(records: I) -> Self {
        records
            .into_iter()
            .fold(ScheduleResult::default(), ScheduleResult::with_earliest)
    }
}
