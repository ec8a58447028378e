//! Filter operators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a filter condition
///
/// Operators travel as snake_case strings (`"starts_with"`, `"this_week"`).
/// Names this build does not know are kept in [`Operator::Unrecognized`] so a
/// saved filter round-trips unchanged; such conditions always match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Greater,
    Less,
    Between,
    After,
    Before,
    Today,
    ThisWeek,
    ThisMonth,
    In,
    Unrecognized(String),
}

impl Operator {
    /// Every operator with a defined meaning, in builder order
    pub const KNOWN: [Operator; 15] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Greater,
        Operator::Less,
        Operator::Between,
        Operator::After,
        Operator::Before,
        Operator::Today,
        Operator::ThisWeek,
        Operator::ThisMonth,
        Operator::In,
    ];

    /// Parse a wire name; unknown names become `Unrecognized`
    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "greater" => Operator::Greater,
            "less" => Operator::Less,
            "between" => Operator::Between,
            "after" => Operator::After,
            "before" => Operator::Before,
            "today" => Operator::Today,
            "this_week" => Operator::ThisWeek,
            "this_month" => Operator::ThisMonth,
            "in" => Operator::In,
            other => Operator::Unrecognized(other.to_string()),
        }
    }

    /// Wire name of the operator
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Greater => "greater",
            Operator::Less => "less",
            Operator::Between => "between",
            Operator::After => "after",
            Operator::Before => "before",
            Operator::Today => "today",
            Operator::ThisWeek => "this_week",
            Operator::ThisMonth => "this_month",
            Operator::In => "in",
            Operator::Unrecognized(name) => name,
        }
    }

    /// Human-readable label used by condition builders
    pub fn label(&self) -> &str {
        match self {
            Operator::Equals => "Equals",
            Operator::NotEquals => "Not equals",
            Operator::Contains => "Contains",
            Operator::NotContains => "Does not contain",
            Operator::StartsWith => "Starts with",
            Operator::EndsWith => "Ends with",
            Operator::Greater => "Greater than",
            Operator::Less => "Less than",
            Operator::Between => "Between",
            Operator::After => "After",
            Operator::Before => "Before",
            Operator::Today => "Today",
            Operator::ThisWeek => "This week",
            Operator::ThisMonth => "This month",
            Operator::In => "In",
            Operator::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Operator::Unrecognized(_))
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        Operator::parse(&name)
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Operator::parse(name)
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Unrecognized(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
