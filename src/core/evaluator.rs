//! Condition evaluator
//!
//! Decides whether a record satisfies a list of conditions. Conditions are
//! combined with AND; an empty list matches everything. Evaluation is pure
//! apart from the reference time used by the relative date operators, which
//! is injected through [`Evaluator::new`].
//!
//! The evaluator never fails. A missing field, a value that cannot be read as
//! a number or date, or a malformed range all produce a non-match, while an
//! operator the evaluator does not recognize always matches.

use crate::core::compare::{
    compare_with, field_date, field_number, parse_date, parse_float, split_members, split_range,
    Outcome,
};
use crate::core::condition::Condition;
use crate::core::entity::Data;
use crate::core::field::{FieldCategory, FieldValue};
use crate::core::operator::Operator;
use crate::core::record::Record;
use crate::core::schema::FieldDef;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Evaluates conditions relative to a fixed reference time
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    now: DateTime<Utc>,
}

impl Evaluator {
    /// Create an evaluator whose `today`/`this_week`/`this_month` are relative to `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Create an evaluator reading the wall clock once
    pub fn at_current_time() -> Self {
        Self::new(Utc::now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Whether `record` satisfies every condition
    pub fn matches<R: Record + ?Sized>(&self, record: &R, conditions: &[Condition]) -> bool {
        conditions.iter().all(|condition| {
            let value = record.field(&condition.field);
            self.evaluate(value.as_ref(), condition, None).is_match()
        })
    }

    /// Records satisfying every condition, in their original order
    pub fn filter<R: Record + Clone>(&self, records: &[R], conditions: &[Condition]) -> Vec<R> {
        records
            .iter()
            .filter(|record| self.matches(*record, conditions))
            .cloned()
            .collect()
    }

    /// Test one condition against one field value
    ///
    /// `category` is the schema category of the field when known; it only
    /// changes the meaning of `between`, which compares dates on date fields.
    pub fn evaluate(
        &self,
        value: Option<&FieldValue>,
        condition: &Condition,
        category: Option<FieldCategory>,
    ) -> Outcome {
        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => return Outcome::NoMatch,
        };

        let expected = condition.value.as_str();
        match &condition.operator {
            Operator::Equals => Outcome::from_bool(lowered(value) == expected.to_lowercase()),
            Operator::NotEquals => Outcome::from_bool(lowered(value) != expected.to_lowercase()),
            Operator::Contains => {
                Outcome::from_bool(lowered(value).contains(&expected.to_lowercase()))
            }
            Operator::NotContains => {
                Outcome::from_bool(!lowered(value).contains(&expected.to_lowercase()))
            }
            Operator::StartsWith => {
                Outcome::from_bool(lowered(value).starts_with(&expected.to_lowercase()))
            }
            Operator::EndsWith => {
                Outcome::from_bool(lowered(value).ends_with(&expected.to_lowercase()))
            }
            Operator::Greater => compare_with(field_number(value), number(expected), |a, b| a > b),
            Operator::Less => compare_with(field_number(value), number(expected), |a, b| a < b),
            Operator::Between => {
                let (low, high) = split_range(expected);
                if category == Some(FieldCategory::Date) {
                    within(field_date(value), parse_date(low), parse_date(high))
                } else {
                    within(field_number(value), number(low), number(high))
                }
            }
            Operator::After => compare_with(field_date(value), parse_date(expected), |a, b| a > b),
            Operator::Before => {
                compare_with(field_date(value), parse_date(expected), |a, b| a < b)
            }
            Operator::Today => match field_date(value) {
                Some(date) => Outcome::from_bool(date.date_naive() == self.now.date_naive()),
                None => Outcome::NotComparable,
            },
            Operator::ThisWeek => {
                let start = self.now.date_naive()
                    - Duration::days(i64::from(self.now.weekday().num_days_from_sunday()));
                let end = day_start(start + Duration::days(7)).map(just_before);
                within(field_date(value), day_start(start), end)
            }
            Operator::ThisMonth => {
                let first = NaiveDate::from_ymd_opt(self.now.year(), self.now.month(), 1);
                let next = first.and_then(|date| {
                    if date.month() == 12 {
                        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                    } else {
                        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
                    }
                });
                within(
                    field_date(value),
                    first.and_then(day_start),
                    next.and_then(day_start).map(just_before),
                )
            }
            Operator::In => {
                let needle = lowered(value);
                Outcome::from_bool(split_members(expected).contains(&needle))
            }
            Operator::Unrecognized(_) => Outcome::Match,
        }
    }
}

/// Whether `record` satisfies every condition, evaluated at `now`
pub fn matches<R: Record + ?Sized>(
    record: &R,
    conditions: &[Condition],
    now: DateTime<Utc>,
) -> bool {
    Evaluator::new(now).matches(record, conditions)
}

/// Records satisfying every condition at `now`, in their original order
pub fn filter<R: Record + Clone>(
    records: &[R],
    conditions: &[Condition],
    now: DateTime<Utc>,
) -> Vec<R> {
    Evaluator::new(now).filter(records, conditions)
}

fn lowered(value: &FieldValue) -> String {
    value.to_text().to_lowercase()
}

fn number(text: &str) -> Option<f64> {
    parse_float(text).filter(|n| !n.is_nan())
}

fn within<T: PartialOrd>(value: Option<T>, low: Option<T>, high: Option<T>) -> Outcome {
    match (value, low, high) {
        (Some(v), Some(l), Some(h)) => Outcome::from_bool(l <= v && v <= h),
        _ => Outcome::NotComparable,
    }
}

fn day_start(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn just_before(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant - Duration::milliseconds(1)
}

/// Conditions resolved against an entity schema
///
/// Field names are looked up once at compile time. A condition naming a
/// field the schema does not know can never match.
pub struct CompiledFilter<T: 'static> {
    conditions: Vec<CompiledCondition<T>>,
}

struct CompiledCondition<T: 'static> {
    condition: Condition,
    field: Option<&'static FieldDef<T>>,
}

impl<T: Data> CompiledFilter<T> {
    pub fn compile(conditions: &[Condition]) -> Self {
        let schema = T::schema();
        let conditions = conditions
            .iter()
            .map(|condition| {
                let field = schema.field(&condition.field);
                if field.is_none() {
                    tracing::warn!(
                        entity = T::resource_name(),
                        field = %condition.field,
                        "Condition references an unknown field"
                    );
                }
                CompiledCondition {
                    condition: condition.clone(),
                    field,
                }
            })
            .collect();

        Self { conditions }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, record: &T, evaluator: &Evaluator) -> bool {
        self.conditions.iter().all(|compiled| match compiled.field {
            Some(def) => {
                let value = def.read(record);
                evaluator
                    .evaluate(value.as_ref(), &compiled.condition, Some(def.category))
                    .is_match()
            }
            None => false,
        })
    }

    /// Matching records, in their original order
    pub fn apply(&self, records: &[T], evaluator: &Evaluator) -> Vec<T> {
        records
            .iter()
            .filter(|record| self.matches(record, evaluator))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // Wednesday 2024-05-15, noon
    fn evaluator() -> Evaluator {
        Evaluator::new(at(2024, 5, 15, 12))
    }

    fn one(field: &str, operator: &str, value: &str) -> Vec<Condition> {
        vec![Condition::new(field, operator, value)]
    }

    #[test]
    fn test_empty_conditions_match_everything() {
        assert!(evaluator().matches(&json!({}), &[]));
        assert!(evaluator().matches(&json!({"name": "x"}), &[]));
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let record = json!({"status": "Contacted"});
        assert!(evaluator().matches(&record, &one("status", "equals", "contacted")));
        assert!(!evaluator().matches(&record, &one("status", "not_equals", "CONTACTED")));
    }

    #[test]
    fn test_equals_on_numbers_uses_text_form() {
        let record = json!({"value": 100.0, "probability": 75});
        assert!(evaluator().matches(&record, &one("value", "equals", "100")));
        assert!(evaluator().matches(&record, &one("probability", "equals", "75")));
    }

    #[test]
    fn test_text_operators() {
        let record = json!({"company": "Acme Corp"});
        let e = evaluator();
        assert!(e.matches(&record, &one("company", "contains", "ME c")));
        assert!(e.matches(&record, &one("company", "not_contains", "beta")));
        assert!(e.matches(&record, &one("company", "starts_with", "ac")));
        assert!(e.matches(&record, &one("company", "ends_with", "CORP")));
        assert!(!e.matches(&record, &one("company", "ends_with", "acme")));
    }

    #[test]
    fn test_greater_and_less() {
        let record = json!({"value": 5000});
        let e = evaluator();
        assert!(e.matches(&record, &one("value", "greater", "1000")));
        assert!(!e.matches(&record, &one("value", "less", "1000")));
        assert!(!e.matches(&record, &one("value", "greater", "5000")));
    }

    #[test]
    fn test_numeric_parse_failure_never_matches() {
        let e = evaluator();
        assert!(!e.matches(&json!({"value": "n/a"}), &one("value", "greater", "1")));
        assert!(!e.matches(&json!({"value": "n/a"}), &one("value", "less", "1")));
        assert!(!e.matches(&json!({"value": 10}), &one("value", "greater", "abc")));
        assert!(!e.matches(&json!({"value": 10}), &one("value", "less", "abc")));
    }

    #[test]
    fn test_between_is_inclusive() {
        let e = evaluator();
        let range = one("value", "between", "10,20");
        for v in [10, 15, 20] {
            assert!(e.matches(&json!({ "value": v }), &range), "{} should match", v);
        }
        for v in [9, 21] {
            assert!(!e.matches(&json!({ "value": v }), &range), "{} should not match", v);
        }
    }

    #[test]
    fn test_between_with_malformed_range() {
        let e = evaluator();
        assert!(!e.matches(&json!({"value": 15}), &one("value", "between", "10")));
        assert!(!e.matches(&json!({"value": 15}), &one("value", "between", "a,b")));
    }

    #[test]
    fn test_after_and_before_are_strict() {
        let record = json!({"closeDate": "2024-06-01T00:00:00Z"});
        let e = evaluator();
        assert!(e.matches(&record, &one("closeDate", "after", "2024-05-31")));
        assert!(!e.matches(&record, &one("closeDate", "after", "2024-06-01")));
        assert!(e.matches(&record, &one("closeDate", "before", "2024-06-02")));
        assert!(!e.matches(&record, &one("closeDate", "before", "2024-06-01")));
        assert!(!e.matches(&record, &one("closeDate", "before", "soon")));
    }

    #[test]
    fn test_today_uses_injected_time() {
        let record = json!({"closeDate": "2024-05-15T00:00:00Z"});
        assert!(evaluator().matches(&record, &one("closeDate", "today", "x")));

        let next_day = Evaluator::new(at(2024, 5, 16, 0));
        assert!(!next_day.matches(&record, &one("closeDate", "today", "x")));
    }

    #[test]
    fn test_this_week_runs_sunday_to_saturday() {
        let e = evaluator();
        let week = one("createdAt", "this_week", "x");
        assert!(e.matches(&json!({"createdAt": "2024-05-12T00:00:00Z"}), &week));
        assert!(e.matches(&json!({"createdAt": "2024-05-18T23:59:59Z"}), &week));
        assert!(!e.matches(&json!({"createdAt": "2024-05-11T23:59:59Z"}), &week));
        assert!(!e.matches(&json!({"createdAt": "2024-05-19T00:00:00Z"}), &week));
    }

    #[test]
    fn test_this_week_on_a_sunday() {
        let sunday = Evaluator::new(at(2024, 5, 12, 8));
        let week = one("createdAt", "this_week", "x");
        assert!(sunday.matches(&json!({"createdAt": "2024-05-12"}), &week));
        assert!(!sunday.matches(&json!({"createdAt": "2024-05-11"}), &week));
    }

    #[test]
    fn test_this_month_bounds() {
        let e = evaluator();
        let month = one("createdAt", "this_month", "x");
        assert!(e.matches(&json!({"createdAt": "2024-05-01"}), &month));
        assert!(e.matches(&json!({"createdAt": "2024-05-31T23:00:00Z"}), &month));
        assert!(!e.matches(&json!({"createdAt": "2024-06-01"}), &month));
        assert!(!e.matches(&json!({"createdAt": "2024-04-30T23:59:59Z"}), &month));
    }

    #[test]
    fn test_this_month_in_december() {
        let e = Evaluator::new(at(2024, 12, 20, 12));
        let month = one("createdAt", "this_month", "x");
        assert!(e.matches(&json!({"createdAt": "2024-12-31T12:00:00Z"}), &month));
        assert!(!e.matches(&json!({"createdAt": "2025-01-01"}), &month));
    }

    #[test]
    fn test_in_membership() {
        let e = evaluator();
        let cond = one("status", "in", "new, contacted");
        assert!(e.matches(&json!({"status": "Contacted"}), &cond));
        assert!(!e.matches(&json!({"status": "lost"}), &cond));
    }

    #[test]
    fn test_unknown_operator_always_matches() {
        let e = evaluator();
        assert!(e.matches(&json!({"name": "Bob"}), &one("name", "xyz", "anything")));
    }

    #[test]
    fn test_missing_field_fails_for_every_operator() {
        let e = evaluator();
        let record = json!({"name": "Bob", "company": null});
        for operator in Operator::KNOWN
            .iter()
            .map(|op| op.as_str().to_string())
            .chain(std::iter::once("xyz".to_string()))
        {
            assert!(
                !e.matches(&record, &one("email", &operator, "1,2")),
                "absent field matched under {}",
                operator
            );
            assert!(
                !e.matches(&record, &one("company", &operator, "1,2")),
                "null field matched under {}",
                operator
            );
        }
    }

    #[test]
    fn test_tag_lists_use_joined_text() {
        let record = json!({"tags": ["vip", "enterprise"]});
        let e = evaluator();
        assert!(e.matches(&record, &one("tags", "contains", "VIP")));
        assert!(e.matches(&record, &one("tags", "not_contains", "smb")));
        assert!(e.matches(&record, &one("tags", "equals", "vip,enterprise")));
    }

    #[test]
    fn test_filter_keeps_input_order() {
        let records = vec![
            json!({"stage": "proposal", "value": 100}),
            json!({"stage": "negotiation", "value": 5000}),
            json!({"stage": "prospecting", "value": 2500}),
        ];
        let kept = filter(&records, &one("value", "greater", "1000"), at(2024, 1, 1, 0));
        assert_eq!(kept, vec![records[1].clone(), records[2].clone()]);
        assert!(matches(&records[0], &[], at(2024, 1, 1, 0)));
    }

    #[test]
    fn test_between_on_date_category() {
        let e = evaluator();
        let value = FieldValue::from("2024-03-10T08:00:00Z");
        let condition = Condition::new("closeDate", "between", "2024-03-01,2024-03-31");
        assert!(e
            .evaluate(Some(&value), &condition, Some(FieldCategory::Date))
            .is_match());

        let outside = FieldValue::from("2024-04-02");
        assert!(!e
            .evaluate(Some(&outside), &condition, Some(FieldCategory::Date))
            .is_match());
    }

    #[test]
    fn test_date_parse_failure_is_not_comparable() {
        let condition = Condition::new("closeDate", "after", "2024-01-01");
        let outcome = evaluator().evaluate(Some(&FieldValue::from("someday")), &condition, None);
        assert_eq!(outcome, Outcome::NotComparable);
    }
}
