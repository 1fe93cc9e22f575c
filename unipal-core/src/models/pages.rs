//! DTO shapes produced by the external page parsers.
//!
//! Each upstream system formats its timetable differently; these types
//! mirror the parsed page structure as-is. Reconciliation into the unified
//! model happens in the repository layer.

use serde::{Deserialize, Serialize};

// ============================================================================
// LMS (manabo) timetable grid
// ============================================================================

/// One occupied or empty cell of the LMS timetable grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManaboSlot {
    /// Day-of-week label, a single Japanese character.
    pub day: String,
    /// Class name; empty for an unoccupied cell.
    pub class_name: String,
    /// Detail-link URL, when the cell links to a class page.
    #[serde(default)]
    pub href: Option<String>,
}

/// One period row of the LMS grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaboPeriod {
    /// Period label, e.g. `"1"`.
    pub period: String,
    /// Cells for each day of the week.
    pub slots: Vec<ManaboSlot>,
}

/// The parsed LMS timetable page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManaboTimetable {
    /// Period rows in grid order.
    pub periods: Vec<ManaboPeriod>,
}

// ============================================================================
// Registration system (cubics) timetable
// ============================================================================

/// One occupied cell of the registration-system grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubicsSlot {
    /// Lesson code, the registration system's class identity.
    pub lesson_code: String,
    /// Classroom label.
    #[serde(default)]
    pub classroom: Option<String>,
    /// Detail-page URL.
    #[serde(default)]
    pub detail_url: Option<String>,
}

/// Day column header of the registration-system grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubicsDay {
    /// Day label, a single Japanese character.
    pub label: String,
}

/// One period row of the registration-system grid; one optional slot per
/// day column, in the same order as [`CubicsTimetable::days`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubicsPeriod {
    /// Period label, e.g. `"1"`.
    pub period_label: String,
    /// One entry per day column.
    pub slots: Vec<Option<CubicsSlot>>,
}

/// The parsed registration-system timetable page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CubicsTimetable {
    /// Day column headers.
    pub days: Vec<CubicsDay>,
    /// Period rows.
    pub periods: Vec<CubicsPeriod>,
}

impl CubicsTimetable {
    /// Looks up the slot for a day label and period label, if any.
    pub fn slot_for(&self, day_label: &str, period_label: &str) -> Option<&CubicsSlot> {
        let day_idx = self.days.iter().position(|d| d.label == day_label)?;
        let period = self
            .periods
            .iter()
            .find(|p| p.period_label == period_label)?;
        period.slots.get(day_idx)?.as_ref()
    }
}

// ============================================================================
// Portal (albo) timetable items
// ============================================================================

/// One class item from the portal's JSON timetable API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlboTimetableItem {
    /// Portal-internal numeric ID.
    pub id: String,
    /// Portal-internal UUID.
    pub uuid: String,
    /// The portal's class ID.
    pub class_id: String,
    /// Day of week, Sunday = 0.
    pub day_of_week: u8,
    /// Period number.
    pub time_number: u8,
    /// Instructor name.
    #[serde(default)]
    pub teacher: Option<String>,
    /// Room label.
    #[serde(default)]
    pub room: Option<String>,
    /// Campus name.
    #[serde(default)]
    pub campus: Option<String>,
}

/// The parsed portal timetable response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlboTimetable {
    /// All items for the current term.
    pub items: Vec<AlboTimetableItem>,
}

impl AlboTimetable {
    /// Looks up the item at a day index and period number, if any.
    pub fn item_for(&self, day_of_week: u8, time_number: &str) -> Option<&AlboTimetableItem> {
        self.items
            .iter()
            .find(|i| i.day_of_week == day_of_week && i.time_number.to_string() == time_number)
    }
}

// ============================================================================
// LMS class content tree
// ============================================================================

/// One content directory of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDirectory {
    /// Directory ID; `"0"` is the class top.
    pub directory_id: String,
    /// Directory title.
    pub title: String,
}

/// The parsed directory listing of a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDirectoryListing {
    /// Directories in page order.
    pub directories: Vec<ClassDirectory>,
}

/// A labeled duration row as scraped, e.g.
/// `("提出受付期間:", "9月22日(月) 10:00 ～ 9月29日(月) 23:59")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRow {
    /// Row label.
    pub label: String,
    /// Raw date-range string.
    pub value: String,
}

/// One entry of a directory's content list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassContentEntry {
    /// A distributed file.
    File {
        /// Whether the user's view marker is checked.
        is_done: bool,
        /// Instructor comment.
        comment: String,
        /// Scraped duration rows.
        durations: Vec<DurationRow>,
    },
    /// A report (submission) entry — the only kind that becomes an
    /// assignment.
    Report {
        /// Whether the user's view marker is checked.
        is_done: bool,
        /// Content entry ID; may be empty for malformed rows.
        content_id: String,
        /// Report title.
        title: String,
        /// Report description.
        description: String,
        /// Scraped duration rows.
        durations: Vec<DurationRow>,
    },
}

/// The parsed content list of one directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassContentListing {
    /// Entries in page order.
    pub contents: Vec<ClassContentEntry>,
}

/// One LMS news row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaboNewsItem {
    /// News title.
    pub title: String,
    /// Publication date string as scraped.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Detail-link URL.
    #[serde(default)]
    pub href: Option<String>,
}

/// The parsed LMS news list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManaboNews {
    /// News rows in page order.
    pub items: Vec<ManaboNewsItem>,
}

// ============================================================================
// Portal calendar & information (supplementary pages)
// ============================================================================

/// One event from the portal calendar API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlboCalendarEvent {
    /// Event UUID.
    pub uuid: String,
    /// Event title.
    pub title: String,
    /// ISO-8601 start.
    pub start: String,
    /// ISO-8601 end, when present.
    #[serde(default)]
    pub end: Option<String>,
}

/// The parsed portal calendar response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlboCalendar {
    /// Events in API order.
    pub events: Vec<AlboCalendarEvent>,
}

/// One notice from the portal information API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlboNotice {
    /// Notice UUID.
    pub uuid: String,
    /// Notice title.
    pub title: String,
    /// Publication date string.
    #[serde(default)]
    pub published_at: Option<String>,
}

/// The parsed portal information response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlboInformation {
    /// Notices in API order.
    pub notices: Vec<AlboNotice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubics_fixture() -> CubicsTimetable {
        CubicsTimetable {
            days: vec![
                CubicsDay { label: "月".into() },
                CubicsDay { label: "火".into() },
            ],
            periods: vec![CubicsPeriod {
                period_label: "1".into(),
                slots: vec![
                    Some(CubicsSlot {
                        lesson_code: "L001".into(),
                        classroom: Some("1425".into()),
                        detail_url: None,
                    }),
                    None,
                ],
            }],
        }
    }

    #[test]
    fn test_cubics_slot_lookup() {
        let grid = cubics_fixture();
        assert_eq!(grid.slot_for("月", "1").unwrap().lesson_code, "L001");
        assert!(grid.slot_for("火", "1").is_none());
        assert!(grid.slot_for("水", "1").is_none());
        assert!(grid.slot_for("月", "2").is_none());
    }

    #[test]
    fn test_albo_item_lookup_matches_period_as_string() {
        let timetable = AlboTimetable {
            items: vec![AlboTimetableItem {
                id: "1".into(),
                uuid: "u".into(),
                class_id: "c".into(),
                day_of_week: 1,
                time_number: 1,
                teacher: None,
                room: Some("1425".into()),
                campus: None,
            }],
        };
        assert!(timetable.item_for(1, "1").is_some());
        assert!(timetable.item_for(1, "2").is_none());
        assert!(timetable.item_for(2, "1").is_none());
    }
}
