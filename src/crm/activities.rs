//! Activity timeline

use crate::entities::{Activity, ActivityType};

/// Number of entries `recent` returns when no limit is given
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Activities newest first; entries without a timestamp go last
pub fn timeline(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities
}

/// One contact's activities, newest first
pub fn by_contact(activities: &[Activity], contact_id: u64) -> Vec<Activity> {
    timeline(
        activities
            .iter()
            .filter(|a| a.contact_id == Some(contact_id))
            .cloned()
            .collect(),
    )
}

/// Activities of one type, in insertion order
pub fn by_type(activities: &[Activity], kind: ActivityType) -> Vec<Activity> {
    activities.iter().filter(|a| a.kind == kind).cloned().collect()
}

/// The `limit` newest activities
pub fn recent(activities: &[Activity], limit: usize) -> Vec<Activity> {
    let mut newest = timeline(activities.to_vec());
    newest.truncate(limit);
    newest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn logged(kind: ActivityType, contact_id: u64, hour: u32) -> Activity {
        let mut activity = Activity::new(kind, format!("{} at {}", kind, hour), contact_id);
        activity.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 15, hour, 0, 0).unwrap());
        activity
    }

    fn activities() -> Vec<Activity> {
        vec![
            logged(ActivityType::Call, 1, 9),
            logged(ActivityType::Email, 2, 11),
            logged(ActivityType::Meeting, 1, 14),
            Activity::new(ActivityType::Note, "undated", 1),
        ]
    }

    #[test]
    fn test_timeline_newest_first() {
        let descriptions: Vec<String> = timeline(activities())
            .into_iter()
            .map(|a| a.description)
            .collect();
        assert_eq!(
            descriptions,
            vec!["meeting at 14", "email at 11", "call at 9", "undated"]
        );
    }

    #[test]
    fn test_by_contact() {
        let entries = by_contact(&activities(), 1);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, ActivityType::Meeting);
        assert!(by_contact(&activities(), 3).is_empty());
    }

    #[test]
    fn test_by_type_and_recent() {
        assert_eq!(by_type(&activities(), ActivityType::Email).len(), 1);

        let latest = recent(&activities(), 2);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[1].kind, ActivityType::Email);
    }
}
