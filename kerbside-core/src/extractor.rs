//! Pulls the next collection date per category out of a council schedule page.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

use crate::model::{Category, CollectionRecord, ScheduleResult};
use crate::resolver::{DateResolver, ResolveError};

/// Class shared by every category icon on the page.
pub const ICON_MARKER_CLASS: &str = "acpl-icon";

// <p class="mb-0 lead"><span><i class="acpl-icon rubbish"></i> ... <b>Wednesday, 8 October</b></span></p>
static ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("p.mb-0.lead"));
static ICON: LazyLock<Selector> = LazyLock::new(|| selector("i.acpl-icon"));
static DATE: LazyLock<Selector> = LazyLock::new(|| selector("b, strong"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a collection line was left out of the result.
pub enum EntrySkip {
    /// No category icon inside the line.
    MissingIcon,
    /// No bold date text inside the line.
    MissingDate,
    /// Icon classes did not leave exactly one category token.
    AmbiguousCategory(Vec<String>),
    /// Token is not a known category.
    UnknownCategory(String),
    /// Date text could not be resolved.
    BadDate(ResolveError),
}

impl fmt::Display for EntrySkip {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrySkip::MissingIcon => formatter.write_str("missing category icon"),
            EntrySkip::MissingDate => formatter.write_str("missing date"),
            EntrySkip::AmbiguousCategory(tokens) => {
                write!(formatter, "ambiguous category classes {tokens:?}")
            }
            EntrySkip::UnknownCategory(token) => write!(formatter, "unknown category {token:?}"),
            EntrySkip::BadDate(err) => write!(formatter, "{err}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Extracts a [`ScheduleResult`] from raw page markup.
pub struct ScheduleExtractor {
    resolver: DateResolver,
}

impl ScheduleExtractor {
    /// Create an extractor using the given date resolver.
    #[must_use]
    pub fn new(resolver: DateResolver) -> Self {
        Self { resolver }
    }

    /// Scan `markup` and keep the earliest date seen for each category.
    ///
    /// Lines that are incomplete, carry an unknown category, or hold an
    /// unreadable date are skipped. Markup without any collection lines
    /// yields an empty result.
    #[must_use]
    pub fn extract(&self, markup: &str, reference_now: NaiveDateTime) -> ScheduleResult {
        let document = Html::parse_document(markup);

        document
            .select(&ENTRY)
            .filter_map(|entry| match self.parse_entry(entry, reference_now) {
                Ok(record) => Some(record),
                Err(skip) => {
                    tracing::debug!(reason = %skip, "skipping collection line");
                    None
                }
            })
            .collect()
    }

    fn parse_entry(
        &self,
        entry: ElementRef<'_>,
        reference_now: NaiveDateTime,
    ) -> Result<CollectionRecord, EntrySkip> {
        let icon = entry.select(&ICON).next().ok_or(EntrySkip::MissingIcon)?;
        let date_text = entry
            .select(&DATE)
            .next()
            .map(normalize_text)
            .filter(|text| !text.is_empty())
            .ok_or(EntrySkip::MissingDate)?;

        let category = category_of(icon)?;
        let date = self
            .resolver
            .resolve(&date_text, reference_now)
            .map_err(EntrySkip::BadDate)?;

        Ok(CollectionRecord { date, category })
    }
}

/// Extract with the default date resolver.
#[must_use]
pub fn extract(markup: &str, reference_now: NaiveDateTime) -> ScheduleResult {
    ScheduleExtractor::default().extract(markup, reference_now)
}

fn category_of(icon: ElementRef<'_>) -> Result<Category, EntrySkip> {
    let mut tokens: Vec<&str> = icon
        .value()
        .classes()
        .filter(|class| *class != ICON_MARKER_CLASS)
        .collect();
    tokens.sort_unstable();
    tokens.dedup();

    match tokens.as_slice() {
        [token] => token
            .parse()
            .map_err(|_unknown| EntrySkip::UnknownCategory((*token).to_owned())),
        _ => Err(EntrySkip::AmbiguousCategory(
            tokens.into_iter().map(str::to_owned).collect(),
        )),
    }
}

fn normalize_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(7, 0, 0))
            .expect("valid test timestamp")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn line(classes: &str, when: &str) -> String {
        format!(
            r#"<p class="mb-0 lead"><span class="d-flex"><i class="{classes}"></i><span class="ms-2"><b>{when}</b></span></span></p>"#
        )
    }

    fn page(lines: &[String]) -> String {
        format!(
            "<html><body><div class=\"collection\">{}</div></body></html>",
            lines.concat()
        )
    }

    fn date_of(result: &ScheduleResult, category: Category) -> Option<NaiveDate> {
        result.get(category).map(|record| record.date)
    }

    #[test]
    fn extracts_rubbish_and_recycling() {
        let markup = page(&[
            line("acpl-icon rubbish", "Wednesday, 8 October"),
            line("acpl-icon recycle", "Friday, 10 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 8)));
        assert_eq!(date_of(&result, Category::Recycle), Some(date(2025, 10, 10)));
        assert_eq!(date_of(&result, Category::FoodWaste), None);
    }

    #[test]
    fn earliest_entry_wins_regardless_of_order() {
        let early = line("acpl-icon food-waste", "Wednesday, 8 October");
        let late = line("acpl-icon food-waste", "Wednesday, 15 October");

        let forward = extract(&page(&[early.clone(), late.clone()]), at(2025, 10, 1));
        let backward = extract(&page(&[late, early]), at(2025, 10, 1));

        assert_eq!(date_of(&forward, Category::FoodWaste), Some(date(2025, 10, 8)));
        assert_eq!(forward, backward);
    }

    #[test]
    fn extraction_is_idempotent() {
        let markup = page(&[
            line("acpl-icon rubbish", "Monday, 6 October"),
            line("acpl-icon food-waste", "Monday, 6 October"),
        ]);

        assert_eq!(
            extract(&markup, at(2025, 10, 1)),
            extract(&markup, at(2025, 10, 1))
        );
    }

    #[test]
    fn page_without_entries_is_empty() {
        let result = extract("<html><body><p>No collections</p></body></html>", at(2025, 10, 1));
        assert!(result.is_empty());
        assert!(extract("", at(2025, 10, 1)).is_empty());
        assert!(extract("<p class=\"mb-0 lead\"><b>unclosed", at(2025, 10, 1)).is_empty());
    }

    #[test]
    fn unknown_category_is_ignored() {
        let markup = page(&[
            line("acpl-icon garden-waste", "Tuesday, 7 October"),
            line("acpl-icon rubbish", "Wednesday, 8 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 8)));
        assert_eq!(date_of(&result, Category::Recycle), None);
        assert_eq!(date_of(&result, Category::FoodWaste), None);
    }

    #[test]
    fn icon_with_two_category_classes_is_skipped() {
        let markup = page(&[
            line("acpl-icon rubbish recycle", "Tuesday, 7 October"),
            line("acpl-icon recycle", "Friday, 10 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), None);
        assert_eq!(date_of(&result, Category::Recycle), Some(date(2025, 10, 10)));
    }

    #[test]
    fn icon_without_category_class_is_skipped() {
        let markup = page(&[
            line("acpl-icon", "Tuesday, 7 October"),
            line("acpl-icon rubbish", "Wednesday, 8 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 8)));
        assert_eq!(date_of(&result, Category::Recycle), None);
        assert_eq!(date_of(&result, Category::FoodWaste), None);

        let fragment = Html::parse_fragment(&line("acpl-icon", "Tuesday, 7 October"));
        let icon = fragment.select(&ICON).next().expect("icon present");
        assert_eq!(category_of(icon), Err(EntrySkip::AmbiguousCategory(Vec::new())));
    }

    #[test]
    fn class_order_does_not_matter() {
        let markup = page(&[line("recycle acpl-icon", "Friday, 10 October")]);
        let result = extract(&markup, at(2025, 10, 1));
        assert_eq!(date_of(&result, Category::Recycle), Some(date(2025, 10, 10)));
    }

    #[test]
    fn incomplete_lines_are_skipped() {
        let markup = page(&[
            r#"<p class="mb-0 lead"><i class="acpl-icon rubbish"></i>no date here</p>"#.to_owned(),
            r#"<p class="mb-0 lead"><b>Wednesday, 8 October</b></p>"#.to_owned(),
            r#"<p class="mb-0 lead"><i class="acpl-icon recycle"></i><b>   </b></p>"#.to_owned(),
            line("acpl-icon food-waste", "Thursday, 9 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), None);
        assert_eq!(date_of(&result, Category::Recycle), None);
        assert_eq!(date_of(&result, Category::FoodWaste), Some(date(2025, 10, 9)));
    }

    #[test]
    fn unparseable_dates_are_skipped() {
        let markup = page(&[
            line("acpl-icon rubbish", "Wednesday, soon"),
            line("acpl-icon rubbish", "Wednesday, 15 October"),
        ]);

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 15)));
    }

    #[test]
    fn lines_outside_marker_container_are_ignored() {
        let markup = format!(
            "<div class=\"lead\">{}</div>{}",
            r#"<i class="acpl-icon rubbish"></i><b>Monday, 6 October</b>"#,
            line("acpl-icon rubbish", "Monday, 13 October"),
        );

        let result = extract(&markup, at(2025, 10, 1));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 13)));
    }

    #[test]
    fn year_end_pages_roll_into_january() {
        let markup = page(&[
            line("acpl-icon rubbish", "Tuesday, 30 December"),
            line("acpl-icon recycle", "Friday, 2 January"),
        ]);

        let result = extract(&markup, at(2025, 12, 28));

        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 12, 30)));
        assert_eq!(date_of(&result, Category::Recycle), Some(date(2026, 1, 2)));
    }

    #[test]
    fn date_text_split_across_nodes_is_joined() {
        let markup = page(&[line("acpl-icon rubbish", "Wednesday,\n   <span>8</span> October")]);
        let result = extract(&markup, at(2025, 10, 1));
        assert_eq!(date_of(&result, Category::Rubbish), Some(date(2025, 10, 8)));
    }
}
