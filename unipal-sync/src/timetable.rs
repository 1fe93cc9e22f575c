//! Timetable reconciliation.
//!
//! The LMS grid is the authoritative source: it decides which classes
//! exist and which slots they occupy. The registration system and the
//! portal only contribute metadata, and either may be missing without
//! failing a refresh.

use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, instrument, warn};

use unipal_core::{
    day_index, slot_token, AlboTimetable, ClassAppData, CubicsTimetable, ManaboTimetable,
    PageParser, Term, Timetable, UnifiedClass,
};
use unipal_providers::{AlboClient, AlboParsers, CubicsClient, HubApiClient, ManaboClient, ManaboParsers};
use unipal_store::{CacheStore, CacheEntry};

use crate::auth::AuthRepository;
use crate::error::SyncError;

const TIMETABLE_CACHE_KEY: &str = "class-timetable";

/// LMS class links look like `.../class/12345/`; the numeric part is the
/// class ID. Links without the pattern are used verbatim as identity.
fn class_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"class/(\d+)").expect("class ID pattern compiles"))
}

fn extract_manabo_id(href: Option<&str>) -> String {
    let Some(href) = href else {
        return String::new();
    };
    class_id_pattern()
        .captures(href)
        .and_then(|c| c.get(1))
        .map_or_else(|| href.to_string(), |m| m.as_str().to_string())
}

/// Merges the three upstream timetables into the unified model.
///
/// Walks the LMS grid row by row; each occupied cell either lands on an
/// existing class (same LMS ID, or same name when no ID exists) and adds
/// its slot token, or creates the class and seeds its metadata from
/// whatever the secondary sources know about that cell. Metadata is
/// seeded on first sight only.
pub fn reconcile(
    term: &str,
    manabo: &ManaboTimetable,
    cubics: Option<&CubicsTimetable>,
    albo: Option<&AlboTimetable>,
) -> Timetable {
    let mut timetable = Timetable::empty(term);

    for period in &manabo.periods {
        for slot in &period.slots {
            if slot.class_name.is_empty() {
                continue;
            }
            let token = slot_token(&slot.day, &period.period);
            let manabo_id = extract_manabo_id(slot.href.as_deref());

            if let Some(class) = timetable.find_class_mut(&manabo_id, &slot.class_name) {
                class.add_slot(token);
                continue;
            }

            let cubics_slot = cubics.and_then(|c| c.slot_for(&slot.day, &period.period));
            let albo_item = albo.and_then(|a| {
                day_index(&slot.day).and_then(|d| a.item_for(d, &period.period))
            });

            timetable.classes.push(UnifiedClass {
                name: slot.class_name.clone(),
                manabo_id,
                albo_id: albo_item.map(|i| i.class_id.clone()),
                cubics_id: cubics_slot.map(|c| c.lesson_code.clone()),
                timetable: vec![token],
                app_data: ClassAppData {
                    teacher: albo_item.and_then(|i| i.teacher.clone()),
                    room: albo_item
                        .and_then(|i| i.room.clone())
                        .or_else(|| cubics_slot.and_then(|c| c.classroom.clone())),
                    campus: albo_item.and_then(|i| i.campus.clone()),
                    albo_id: albo_item.map(|i| i.id.clone()),
                    albo_uuid: albo_item.map(|i| i.uuid.clone()),
                    cubics_detail_url: cubics_slot.and_then(|c| c.detail_url.clone()),
                    ..ClassAppData::default()
                },
            });
        }
    }

    timetable
}

/// Serves and refreshes the unified timetable.
pub struct TimetableRepository<MP, CP, AP> {
    manabo: Arc<ManaboClient<MP>>,
    cubics: Arc<CubicsClient<CP>>,
    albo: Arc<AlboClient<AP>>,
    hub_api: Arc<HubApiClient>,
    cache: Arc<CacheStore>,
    auth: Arc<AuthRepository>,
}

impl<MP, CP, AP> TimetableRepository<MP, CP, AP>
where
    MP: ManaboParsers,
    CP: PageParser<CubicsTimetable>,
    AP: AlboParsers,
{
    /// Creates the repository.
    pub fn new(
        manabo: Arc<ManaboClient<MP>>,
        cubics: Arc<CubicsClient<CP>>,
        albo: Arc<AlboClient<AP>>,
        hub_api: Arc<HubApiClient>,
        cache: Arc<CacheStore>,
        auth: Arc<AuthRepository>,
    ) -> Self {
        Self {
            manabo,
            cubics,
            albo,
            hub_api,
            cache,
            auth,
        }
    }

    /// Returns the stored timetable.
    ///
    /// With `cache_only` the cached value is served when it covers the
    /// current term, else [`SyncError::ShouldRefreshTimetable`]. Otherwise
    /// the backend copy is fetched and cached; on any backend failure a
    /// current-term cached copy is served instead.
    pub async fn timetable(&self, cache_only: bool) -> Result<Timetable, SyncError> {
        let term = Term::current().token();

        if cache_only {
            return match self.cached().await? {
                Some(entry) if entry.value.term == term => Ok(entry.value),
                _ => Err(SyncError::ShouldRefreshTimetable),
            };
        }

        let token = self.auth.id_token().await?;
        match self.hub_api.timetable(&token).await {
            Ok(timetable) => {
                if let Err(e) = self.cache.set(TIMETABLE_CACHE_KEY, &timetable).await {
                    warn!(error = %e, "Failed to cache timetable");
                }
                Ok(timetable)
            }
            Err(err) => {
                if let Some(entry) = self.cached().await? {
                    if entry.value.term == term {
                        warn!("Backend timetable unavailable, serving cached copy");
                        return Ok(entry.value);
                    }
                }
                Err(err.into())
            }
        }
    }

    async fn cached(&self) -> Result<Option<CacheEntry<Timetable>>, SyncError> {
        Ok(self.cache.get::<Timetable>(TIMETABLE_CACHE_KEY).await?)
    }

    /// Rebuilds the timetable from the upstream services and replaces the
    /// backend copy. The LMS fetch is required; the registration system
    /// and the portal are tolerated as absent.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<Timetable, SyncError> {
        let (student_id, password) = self.auth.credentials().await?;
        let token = self.auth.id_token().await?;

        let manabo = self.manabo.timetable(&student_id, &password).await?;
        let cubics = match self.cubics.timetable(&student_id, &password).await {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(error = %e, "Registration-system timetable unavailable");
                None
            }
        };
        let albo = match self.albo.timetable(&student_id, &password).await {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(error = %e, "Portal timetable unavailable");
                None
            }
        };

        let term = Term::current().token();
        let timetable = reconcile(&term, &manabo, cubics.as_ref(), albo.as_ref());
        info!(term = %term, classes = timetable.classes.len(), "Reconciled timetable");

        self.hub_api.put_timetable(&token, &timetable).await?;
        Ok(timetable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unipal_core::{
        AlboTimetableItem, CubicsDay, CubicsPeriod, CubicsSlot, ManaboPeriod, ManaboSlot,
    };

    fn manabo_slot(day: &str, name: &str, href: Option<&str>) -> ManaboSlot {
        ManaboSlot {
            day: day.into(),
            class_name: name.into(),
            href: href.map(String::from),
        }
    }

    #[test]
    fn test_href_id_extraction() {
        assert_eq!(
            extract_manabo_id(Some("https://lms.example.test/class/12345/")),
            "12345"
        );
        assert_eq!(
            extract_manabo_id(Some("https://lms.example.test/other")),
            "https://lms.example.test/other"
        );
        assert_eq!(extract_manabo_id(None), "");
    }

    #[test]
    fn test_single_slot_with_portal_metadata() {
        let manabo = ManaboTimetable {
            periods: vec![ManaboPeriod {
                period: "1".into(),
                slots: vec![
                    manabo_slot("月", "Algorithms", Some("/class/123/")),
                    manabo_slot("火", "", None),
                ],
            }],
        };
        let albo = AlboTimetable {
            items: vec![AlboTimetableItem {
                id: "9".into(),
                uuid: "u-9".into(),
                class_id: "a-123".into(),
                day_of_week: 1,
                time_number: 1,
                teacher: Some("Tanaka".into()),
                room: Some("1425".into()),
                campus: None,
            }],
        };

        let timetable = reconcile("2025S", &manabo, None, Some(&albo));

        assert_eq!(timetable.term, "2025S");
        assert_eq!(timetable.classes.len(), 1);
        let class = &timetable.classes[0];
        assert_eq!(class.manabo_id, "123");
        assert_eq!(class.timetable, vec!["mon-1"]);
        assert_eq!(class.albo_id.as_deref(), Some("a-123"));
        assert_eq!(class.app_data.room.as_deref(), Some("1425"));
        assert_eq!(class.app_data.teacher.as_deref(), Some("Tanaka"));
        assert_eq!(class.app_data.color, "#CCCCCC");
    }

    #[test]
    fn test_repeated_class_accumulates_slots_keeps_first_metadata() {
        let manabo = ManaboTimetable {
            periods: vec![
                ManaboPeriod {
                    period: "1".into(),
                    slots: vec![manabo_slot("月", "Algorithms", Some("/class/123/"))],
                },
                ManaboPeriod {
                    period: "3".into(),
                    slots: vec![manabo_slot("水", "Algorithms", Some("/class/123/"))],
                },
            ],
        };
        let cubics = CubicsTimetable {
            days: vec![CubicsDay { label: "水".into() }],
            periods: vec![CubicsPeriod {
                period_label: "3".into(),
                slots: vec![Some(CubicsSlot {
                    lesson_code: "L9".into(),
                    classroom: Some("late-room".into()),
                    detail_url: None,
                })],
            }],
        };

        let timetable = reconcile("2025S", &manabo, Some(&cubics), None);

        assert_eq!(timetable.classes.len(), 1);
        let class = &timetable.classes[0];
        assert_eq!(class.timetable, vec!["mon-1", "wed-3"]);
        // The second sighting does not overwrite metadata seeded (or not)
        // at first sight.
        assert_eq!(class.cubics_id, None);
        assert_eq!(class.app_data.room, None);
    }

    #[test]
    fn test_unlinked_classes_deduplicate_by_name() {
        let manabo = ManaboTimetable {
            periods: vec![ManaboPeriod {
                period: "2".into(),
                slots: vec![
                    manabo_slot("月", "Seminar", None),
                    manabo_slot("金", "Seminar", None),
                ],
            }],
        };

        let timetable = reconcile("2025F", &manabo, None, None);
        assert_eq!(timetable.classes.len(), 1);
        assert_eq!(timetable.classes[0].manabo_id, "");
        assert_eq!(timetable.classes[0].timetable, vec!["mon-2", "fri-2"]);
    }
}
