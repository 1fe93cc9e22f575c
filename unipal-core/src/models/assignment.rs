//! Assignment model.
//!
//! Assignments are discovered by walking each class's content directories on
//! the LMS and pushed to the backend once. The dedup hash keeps rediscovered
//! entries from being staged twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location of an assignment inside its class's content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    /// Content directory the assignment lives in.
    pub directory_id: String,
    /// Content entry ID within the directory.
    pub content_id: String,
    /// Assignment title as scraped.
    pub name: String,
}

/// App-side assignment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentAppData {
    /// Name of the directory the assignment was found in.
    pub directory_name: String,
    /// Display title.
    pub title: String,
    /// Scraped description, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One discovered assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// LMS class the assignment belongs to.
    pub manabo_id: String,
    /// Submission deadline, when one could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    /// When the user marked the assignment done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<DateTime<Utc>>,
    /// Location within the class content tree. `None` for assignments the
    /// backend stored without scrape provenance.
    pub class_detail: Option<ClassDetail>,
    /// App-side metadata.
    pub app_data: AssignmentAppData,
}

impl Assignment {
    /// Dedup key: `"{class}-{directory}-{content}"`.
    ///
    /// Assignments without [`ClassDetail`] have no scrape identity and return
    /// `None`; they are never candidates for re-staging.
    pub fn dedup_hash(&self) -> Option<String> {
        self.class_detail
            .as_ref()
            .map(|d| dedup_hash(&self.manabo_id, &d.directory_id, &d.content_id))
    }
}

/// Builds the dedup key from its parts.
pub fn dedup_hash(manabo_id: &str, directory_id: &str, content_id: &str) -> String {
    format!("{manabo_id}-{directory_id}-{content_id}")
}

/// Assignment list as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentList {
    /// Stored assignments.
    pub assignments: Vec<Assignment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_hash_shape() {
        assert_eq!(dedup_hash("123", "0", "r1"), "123-0-r1");
    }

    #[test]
    fn test_assignment_without_detail_has_no_hash() {
        let a = Assignment {
            manabo_id: "123".into(),
            due_at: None,
            done_at: None,
            class_detail: None,
            app_data: AssignmentAppData {
                directory_name: "dir".into(),
                title: "t".into(),
                description: None,
            },
        };
        assert!(a.dedup_hash().is_none());
    }
}
