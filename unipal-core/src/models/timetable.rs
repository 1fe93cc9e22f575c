//! Unified timetable model.
//!
//! One [`UnifiedClass`] per course, reconciled from up to three upstream
//! systems. The LMS class ID (`manabo_id`) is the primary identity; classes
//! the LMS links without an ID fall back to name-based identity.

use serde::{Deserialize, Serialize};

/// Default card color assigned to newly discovered classes.
pub const DEFAULT_CLASS_COLOR: &str = "#CCCCCC";

/// Day-of-week labels as scraped from the portals (single Japanese character)
/// mapped to the three-letter codes used in slot tokens.
const DAY_TABLE: [(char, &str); 7] = [
    ('日', "sun"),
    ('月', "mon"),
    ('火', "tue"),
    ('水', "wed"),
    ('木', "thu"),
    ('金', "fri"),
    ('土', "sat"),
];

/// Translates a scraped day label into its English three-letter code.
///
/// Unknown labels map to `"unknown"` so a malformed grid row degrades to a
/// harmless slot token instead of aborting the whole reconciliation.
pub fn day_code(label: &str) -> &'static str {
    label
        .chars()
        .next()
        .and_then(|c| DAY_TABLE.iter().find(|(day, _)| *day == c))
        .map_or("unknown", |(_, code)| code)
}

/// Translates a scraped day label into a 0-based day-of-week index
/// (Sunday = 0), as used by the portal's JSON timetable API.
pub fn day_index(label: &str) -> Option<u8> {
    let c = label.chars().next()?;
    DAY_TABLE
        .iter()
        .position(|(day, _)| *day == c)
        .map(|i| i as u8)
}

/// Builds a slot token such as `"mon-1"` from a day label and period.
pub fn slot_token(day_label: &str, period: &str) -> String {
    format!("{}-{}", day_code(day_label), period)
}

/// One user-attached course material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialItem {
    /// Display name of the material.
    pub name: String,
}

/// Per-class app data stored alongside the reconciled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAppData {
    /// Display color for the class card.
    pub color: String,
    /// Instructor name, when the portal provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    /// Room label from either secondary source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Campus name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    /// Course materials attached by the user.
    #[serde(default)]
    pub material: Vec<MaterialItem>,
    /// Portal-internal numeric ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albo_id: Option<String>,
    /// Portal-internal UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albo_uuid: Option<String>,
    /// Detail-page URL on the registration system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cubics_detail_url: Option<String>,
}

impl Default for ClassAppData {
    fn default() -> Self {
        Self {
            color: DEFAULT_CLASS_COLOR.to_string(),
            teacher: None,
            room: None,
            campus: None,
            material: Vec::new(),
            albo_id: None,
            albo_uuid: None,
            cubics_detail_url: None,
        }
    }
}

/// One reconciled class entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedClass {
    /// Class name as shown on the LMS grid.
    pub name: String,
    /// LMS class ID extracted from the slot's detail link. Empty when the
    /// LMS slot carried no usable link.
    pub manabo_id: String,
    /// Class ID on the portal, when matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albo_id: Option<String>,
    /// Lesson code on the registration system, when matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cubics_id: Option<String>,
    /// Occupied slots, `"{day}-{period}"`. Never contains duplicates.
    pub timetable: Vec<String>,
    /// App-side metadata.
    pub app_data: ClassAppData,
}

impl UnifiedClass {
    /// Adds a slot token unless it is already present.
    pub fn add_slot(&mut self, token: String) {
        if !self.timetable.contains(&token) {
            self.timetable.push(token);
        }
    }

    /// Returns true if this class is identified by `manabo_id`.
    pub fn has_manabo_id(&self) -> bool {
        !self.manabo_id.is_empty()
    }
}

/// The full reconciled timetable for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    /// Term token the timetable belongs to, e.g. `"2025S"`.
    pub term: String,
    /// Reconciled class list.
    pub classes: Vec<UnifiedClass>,
}

impl Timetable {
    /// Creates an empty timetable for the given term token.
    pub fn empty(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            classes: Vec::new(),
        }
    }

    /// Finds the class matching the given identity, if present.
    ///
    /// Identity is the LMS class ID when non-empty, otherwise the class name.
    pub fn find_class_mut(&mut self, manabo_id: &str, name: &str) -> Option<&mut UnifiedClass> {
        if manabo_id.is_empty() {
            self.classes.iter_mut().find(|c| c.name == name)
        } else {
            self.classes.iter_mut().find(|c| c.manabo_id == manabo_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_code_translation() {
        assert_eq!(day_code("月"), "mon");
        assert_eq!(day_code("土"), "sat");
        assert_eq!(day_code("?"), "unknown");
    }

    #[test]
    fn test_day_index_is_sunday_based() {
        assert_eq!(day_index("日"), Some(0));
        assert_eq!(day_index("水"), Some(3));
        assert_eq!(day_index("x"), None);
    }

    #[test]
    fn test_slot_token() {
        assert_eq!(slot_token("月", "1"), "mon-1");
    }

    #[test]
    fn test_add_slot_deduplicates() {
        let mut class = UnifiedClass {
            name: "X".into(),
            manabo_id: "123".into(),
            albo_id: None,
            cubics_id: None,
            timetable: vec!["mon-1".into()],
            app_data: ClassAppData::default(),
        };
        class.add_slot("mon-1".into());
        class.add_slot("wed-3".into());
        assert_eq!(class.timetable, vec!["mon-1", "wed-3"]);
    }

    #[test]
    fn test_find_class_falls_back_to_name() {
        let mut timetable = Timetable::empty("2025S");
        timetable.classes.push(UnifiedClass {
            name: "Unlinked Seminar".into(),
            manabo_id: String::new(),
            albo_id: None,
            cubics_id: None,
            timetable: vec![],
            app_data: ClassAppData::default(),
        });

        assert!(timetable.find_class_mut("", "Unlinked Seminar").is_some());
        assert!(timetable.find_class_mut("", "Other").is_none());
    }
}
