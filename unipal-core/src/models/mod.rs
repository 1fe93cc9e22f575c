//! Domain models for UniPal Sync.
//!
//! ## Submodules
//!
//! - [`term`] - Academic term tokens
//! - [`timetable`] - Unified timetable model and slot-token helpers
//! - [`assignment`] - Assignment model and dedup hashing
//! - [`pages`] - DTO shapes produced by the external page parsers

mod assignment;
mod pages;
mod term;
mod timetable;

pub use assignment::{dedup_hash, Assignment, AssignmentAppData, AssignmentList, ClassDetail};
pub use pages::{
    AlboCalendar, AlboCalendarEvent, AlboInformation, AlboNotice, AlboTimetable,
    AlboTimetableItem, ClassContentEntry, ClassContentListing, ClassDirectory,
    ClassDirectoryListing, CubicsDay, CubicsPeriod, CubicsSlot, CubicsTimetable, DurationRow,
    ManaboNews, ManaboNewsItem, ManaboPeriod, ManaboSlot, ManaboTimetable,
};
pub use term::{Semester, Term};
pub use timetable::{
    day_code, day_index, slot_token, ClassAppData, MaterialItem, Timetable, UnifiedClass,
    DEFAULT_CLASS_COLOR,
};
