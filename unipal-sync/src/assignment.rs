//! Assignment discovery and staging.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use unipal_core::{
    dedup_hash, Assignment, AssignmentAppData, AssignmentList, ClassDetail, CubicsTimetable,
    PageParser,
};
use unipal_providers::{AssignmentPatch, HubApiClient, ManaboParsers};
use unipal_store::CacheStore;

use crate::auth::AuthRepository;
use crate::content::{ClassContentRepository, DirectoryContent, DirectoryContents};
use crate::error::SyncError;
use crate::timetable::TimetableRepository;

const ASSIGNMENTS_CACHE_KEY: &str = "assignments";

/// Builds the stageable assignments found in one class's content tree,
/// skipping rows without a content ID and rows whose dedup hash is
/// already stored.
fn stage_from_contents(
    known_hashes: &HashSet<String>,
    manabo_id: &str,
    contents: Vec<DirectoryContents>,
) -> Vec<Assignment> {
    let mut staged = Vec::new();
    for directory in contents {
        let DirectoryContents {
            directory_id,
            directory_name,
            contents,
        } = directory;
        for entry in contents {
            let DirectoryContent::Report {
                content_id,
                title,
                description,
                duration,
                ..
            } = entry
            else {
                continue;
            };
            if content_id.is_empty() {
                continue;
            }
            let hash = dedup_hash(manabo_id, &directory_id, &content_id);
            if known_hashes.contains(&hash) {
                debug!(%hash, "Assignment already stored");
                continue;
            }
            staged.push(Assignment {
                manabo_id: manabo_id.to_string(),
                due_at: duration.deadline.end,
                done_at: None,
                class_detail: Some(ClassDetail {
                    directory_id: directory_id.clone(),
                    content_id,
                    name: title.clone(),
                }),
                app_data: AssignmentAppData {
                    directory_name: directory_name.clone(),
                    title,
                    description: Some(description),
                },
            });
        }
    }
    staged
}

/// Serves and refreshes the assignment list.
pub struct AssignmentRepository<MP, CP, AP> {
    contents: Arc<ClassContentRepository<MP>>,
    timetable: Arc<TimetableRepository<MP, CP, AP>>,
    hub_api: Arc<HubApiClient>,
    cache: Arc<CacheStore>,
    auth: Arc<AuthRepository>,
}

impl<MP, CP, AP> AssignmentRepository<MP, CP, AP>
where
    MP: ManaboParsers,
    CP: PageParser<CubicsTimetable>,
    AP: unipal_providers::AlboParsers,
{
    /// Creates the repository.
    pub fn new(
        contents: Arc<ClassContentRepository<MP>>,
        timetable: Arc<TimetableRepository<MP, CP, AP>>,
        hub_api: Arc<HubApiClient>,
        cache: Arc<CacheStore>,
        auth: Arc<AuthRepository>,
    ) -> Self {
        Self {
            contents,
            timetable,
            hub_api,
            cache,
            auth,
        }
    }

    /// Returns the stored assignments.
    ///
    /// With `cache_only` the cached list is served, empty when nothing is
    /// cached. Otherwise the backend copy is fetched and cached, falling
    /// back to any cached copy on failure.
    pub async fn assignments(&self, cache_only: bool) -> Result<AssignmentList, SyncError> {
        if cache_only {
            return Ok(self
                .cache
                .get::<AssignmentList>(ASSIGNMENTS_CACHE_KEY)
                .await?
                .map(|entry| entry.value)
                .unwrap_or_default());
        }

        let token = self.auth.id_token().await?;
        match self.hub_api.assignments(&token).await {
            Ok(list) => {
                if let Err(e) = self.cache.set(ASSIGNMENTS_CACHE_KEY, &list).await {
                    warn!(error = %e, "Failed to cache assignments");
                }
                Ok(list)
            }
            Err(err) => {
                if let Some(entry) = self
                    .cache
                    .get::<AssignmentList>(ASSIGNMENTS_CACHE_KEY)
                    .await?
                {
                    warn!("Backend assignments unavailable, serving cached copy");
                    return Ok(entry.value);
                }
                Err(err.into())
            }
        }
    }

    /// Walks every class in the current timetable, stages assignments not
    /// yet known to the backend, and pushes them in one request.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let (student_id, password) = self.auth.credentials().await?;
        let token = self.auth.id_token().await?;

        let stored = self.hub_api.assignments(&token).await?;
        let known_hashes: HashSet<String> = stored
            .assignments
            .iter()
            .filter_map(Assignment::dedup_hash)
            .collect();

        let timetable = self.timetable.timetable(false).await?;
        let mut staged = Vec::new();
        for class in &timetable.classes {
            // Name-identified classes have no LMS ID to walk.
            if class.manabo_id.is_empty() {
                continue;
            }
            let contents = self
                .contents
                .contents(&student_id, &password, &class.manabo_id)
                .await?;
            staged.extend(stage_from_contents(&known_hashes, &class.manabo_id, contents));
        }

        if staged.is_empty() {
            debug!("No new assignments discovered");
            return Ok(());
        }
        info!(count = staged.len(), "Staging discovered assignments");
        self.hub_api
            .post_assignments(&token, &AssignmentList { assignments: staged })
            .await?;
        Ok(())
    }

    /// Records a completion state change on the backend.
    pub async fn set_done(
        &self,
        assignment_id: &str,
        done_at: Option<DateTime<Utc>>,
    ) -> Result<(), SyncError> {
        let token = self.auth.id_token().await?;
        let patch = AssignmentPatch {
            done_at,
            ..AssignmentPatch::default()
        };
        self.hub_api
            .patch_assignment(&token, assignment_id, &patch)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentDuration;

    fn report(content_id: &str, title: &str) -> DirectoryContent {
        DirectoryContent::Report {
            is_done: false,
            content_id: content_id.into(),
            title: title.into(),
            description: "desc".into(),
            duration: ContentDuration::default(),
        }
    }

    fn tree(contents: Vec<DirectoryContent>) -> Vec<DirectoryContents> {
        vec![DirectoryContents {
            directory_id: "0".into(),
            directory_name: "クラストップ".into(),
            contents,
        }]
    }

    #[test]
    fn test_known_hash_is_never_restaged() {
        let known: HashSet<String> = ["123-0-r1".to_string()].into();
        let staged = stage_from_contents(
            &known,
            "123",
            tree(vec![report("r1", "Old"), report("r2", "New")]),
        );
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].dedup_hash().unwrap(), "123-0-r2");
        assert_eq!(staged[0].app_data.title, "New");
    }

    #[test]
    fn test_empty_content_id_is_skipped() {
        let staged = stage_from_contents(&HashSet::new(), "123", tree(vec![report("", "Broken")]));
        assert!(staged.is_empty());
    }

    #[test]
    fn test_files_are_not_assignments() {
        let staged = stage_from_contents(
            &HashSet::new(),
            "123",
            tree(vec![DirectoryContent::File {
                is_done: false,
                comment: String::new(),
                duration: ContentDuration::default(),
            }]),
        );
        assert!(staged.is_empty());
    }
}
