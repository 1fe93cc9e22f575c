//! Class content tree and bilingual deadline parsing.

use std::sync::Arc;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use regex::Regex;
use tracing::{instrument, warn};

use unipal_core::{ClassContentEntry, DurationRow};
use unipal_providers::{ManaboClient, ManaboParsers, ProviderError};

use crate::error::SyncError;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Synthetic directory prepended to every class; the LMS serves top-level
/// content under directory `"0"` without listing it.
const ROOT_DIRECTORY_ID: &str = "0";
const ROOT_DIRECTORY_TITLE: &str = "クラストップ";

const DEADLINE_LABEL: &str = "提出受付期間:";
const FILE_PUBLISH_LABEL: &str = "公開期間:";
const REPORT_PUBLISH_LABEL: &str = "受講期間:";

/// A half-open scraped date range; either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Range start.
    pub start: Option<DateTime<Utc>>,
    /// Range end.
    pub end: Option<DateTime<Utc>>,
}

/// Publish and deadline windows of one content entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDuration {
    /// When the entry is visible.
    pub publish: DateRange,
    /// When submissions are accepted.
    pub deadline: DateRange,
}

/// One content entry with its windows resolved.
#[derive(Debug, Clone)]
pub enum DirectoryContent {
    /// A distributed file.
    File {
        /// Whether the user's view marker is checked.
        is_done: bool,
        /// Instructor comment.
        comment: String,
        /// Resolved windows.
        duration: ContentDuration,
    },
    /// A report entry.
    Report {
        /// Whether the user's view marker is checked.
        is_done: bool,
        /// Content entry ID; may be empty for malformed rows.
        content_id: String,
        /// Report title.
        title: String,
        /// Report description.
        description: String,
        /// Resolved windows.
        duration: ContentDuration,
    },
}

/// All resolved contents of one class directory.
#[derive(Debug, Clone)]
pub struct DirectoryContents {
    /// Directory ID.
    pub directory_id: String,
    /// Directory title.
    pub directory_name: String,
    /// Entries in page order.
    pub contents: Vec<DirectoryContent>,
}

fn datetime_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:(\d{4})年)?\s*(\d{1,2})月(\d{1,2})日(?:\([^)]+\))?\s*(\d{1,2}):(\d{2})")
            .expect("datetime pattern compiles")
    })
}

fn parse_side(part: &str, current_year: i32) -> Option<DateTime<Utc>> {
    let caps = datetime_pattern().captures(part)?;
    let year = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(current_year);
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    jst.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a scraped Japanese date range such as
/// `"9月22日(月) 10:00 ～ 9月29日(月) 23:59"`.
///
/// The separator is `～` or `〜` and either side may be absent. Sides
/// without an explicit `年` take `current_year`; the portal omits the
/// year for dates in the current academic context.
pub fn parse_datetime_range(input: &str, current_year: i32) -> DateRange {
    let mut sides = input.splitn(2, ['～', '〜']);
    let start = sides.next().unwrap_or("").trim();
    let end = sides.next().unwrap_or("").trim();
    DateRange {
        start: parse_side(start, current_year),
        end: parse_side(end, current_year),
    }
}

fn current_jst_year() -> i32 {
    FixedOffset::east_opt(JST_OFFSET_SECS)
        .map_or_else(|| Utc::now().year(), |tz| Utc::now().with_timezone(&tz).year())
}

fn window(durations: &[DurationRow], label: &str, current_year: i32) -> DateRange {
    durations
        .iter()
        .find(|row| row.label == label)
        .map_or_else(DateRange::default, |row| {
            parse_datetime_range(&row.value, current_year)
        })
}

fn resolve_entry(entry: ClassContentEntry, current_year: i32) -> DirectoryContent {
    match entry {
        ClassContentEntry::File {
            is_done,
            comment,
            durations,
        } => DirectoryContent::File {
            is_done,
            comment,
            duration: ContentDuration {
                publish: window(&durations, FILE_PUBLISH_LABEL, current_year),
                deadline: window(&durations, DEADLINE_LABEL, current_year),
            },
        },
        ClassContentEntry::Report {
            is_done,
            content_id,
            title,
            description,
            durations,
        } => DirectoryContent::Report {
            is_done,
            content_id,
            title,
            description,
            duration: ContentDuration {
                publish: window(&durations, REPORT_PUBLISH_LABEL, current_year),
                deadline: window(&durations, DEADLINE_LABEL, current_year),
            },
        },
    }
}

/// Walks a class's content directories on the LMS.
pub struct ClassContentRepository<MP> {
    manabo: Arc<ManaboClient<MP>>,
}

impl<MP: ManaboParsers> ClassContentRepository<MP> {
    /// Creates the repository over the LMS client.
    pub fn new(manabo: Arc<ManaboClient<MP>>) -> Self {
        Self { manabo }
    }

    /// Fetches every directory's content list for one class.
    ///
    /// The directory listing itself is required. An individual directory
    /// whose content list fails to parse is skipped; transport failures
    /// abort the walk.
    #[instrument(skip_all, fields(class_id))]
    pub async fn contents(
        &self,
        student_id: &str,
        password: &str,
        class_id: &str,
    ) -> Result<Vec<DirectoryContents>, SyncError> {
        let listing = self
            .manabo
            .class_directory(student_id, password, class_id, ROOT_DIRECTORY_ID)
            .await?;

        let mut directories = vec![unipal_core::ClassDirectory {
            directory_id: ROOT_DIRECTORY_ID.into(),
            title: ROOT_DIRECTORY_TITLE.into(),
        }];
        directories.extend(listing.directories);

        let current_year = current_jst_year();

        let mut out = Vec::with_capacity(directories.len());
        for directory in directories {
            let fetched = self
                .manabo
                .class_content(student_id, password, class_id, &directory.directory_id)
                .await;
            let listing = match fetched {
                Ok(listing) => listing,
                Err(ProviderError::Parse(e)) => {
                    warn!(
                        directory_id = %directory.directory_id,
                        error = %e,
                        "Skipping directory with unparsable contents"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            out.push(DirectoryContents {
                directory_id: directory.directory_id,
                directory_name: directory.title,
                contents: listing
                    .contents
                    .into_iter()
                    .map(|entry| resolve_entry(entry, current_year))
                    .collect(),
            });
        }
        Ok(out)
    }
}
