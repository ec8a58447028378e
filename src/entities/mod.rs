//! CRM entities: contacts, deals, tasks and activities

pub mod macros;

pub mod activity;
pub mod contact;
pub mod deal;
pub mod task;

pub use activity::{Activity, ActivityType};
pub use contact::{Contact, ContactStatus};
pub use deal::{Deal, DealStage};
pub use task::{Task, TaskStatus};

use crate::core::field::FieldValue;
use chrono::NaiveDate;

/// Calendar dates read as UTC midnight
pub(crate) fn date_value(date: Option<NaiveDate>) -> Option<FieldValue> {
    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| FieldValue::DateTime(naive.and_utc()))
}

/// Record references read as integers
pub(crate) fn id_value(id: Option<u64>) -> Option<FieldValue> {
    id.map(|id| FieldValue::Integer(id as i64))
}
