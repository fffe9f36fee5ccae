//! Timetable placement rules.
//!
//! Hard rules that narrow where classes may start, beyond the calendar
//! itself. Used to steer recurring classes into conventional patterns,
//! e.g. three-session classes starting Monday (Mon/Wed/Fri) and
//! two-session classes starting Monday through Wednesday.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::CourseClass;

/// Restricts the first-session weekday of every class with a given
/// number of sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartDayRule {
    /// Classes with exactly this many sessions are affected.
    pub recurrences: u32,
    /// Permitted weekdays for the first session.
    pub days: Vec<Weekday>,
}

impl StartDayRule {
    /// Creates a rule.
    pub fn new(recurrences: u32, days: Vec<Weekday>) -> Self {
        Self { recurrences, days }
    }

    /// Three-session classes start Monday.
    pub fn monday_wednesday_friday() -> Self {
        Self::new(3, vec![Weekday::Mon])
    }

    /// Two-session classes start early in the week.
    pub fn early_pairs() -> Self {
        Self::new(2, vec![Weekday::Mon, Weekday::Tue, Weekday::Wed])
    }

    /// Whether this rule constrains `class`.
    pub fn applies_to(&self, class: &CourseClass) -> bool {
        class.recurrences == self.recurrences
    }

    /// Whether `class` may start on `day` under this rule.
    pub fn permits(&self, class: &CourseClass, day: Weekday) -> bool {
        !self.applies_to(class) || self.days.contains(&day)
    }
}

/// Whether every rule permits `class` to start on `day`.
pub fn rules_permit(rules: &[StartDayRule], class: &CourseClass, day: Weekday) -> bool {
    rules.iter().all(|r| r.permits(class, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_applies_by_recurrence() {
        let rule = StartDayRule::monday_wednesday_friday();
        let triple = CourseClass::new("6", "Linear Algebra I").with_recurrences(3);
        let pair = CourseClass::new("1", "Psych 101").with_recurrences(2);

        assert!(rule.applies_to(&triple));
        assert!(!rule.applies_to(&pair));
        assert!(rule.permits(&triple, Weekday::Mon));
        assert!(!rule.permits(&triple, Weekday::Tue));
        assert!(rule.permits(&pair, Weekday::Thu)); // unaffected
    }

    #[test]
    fn test_rules_permit_all() {
        let rules = vec![
            StartDayRule::monday_wednesday_friday(),
            StartDayRule::early_pairs(),
        ];
        let pair = CourseClass::new("1", "Psych 101").with_recurrences(2);
        assert!(rules_permit(&rules, &pair, Weekday::Tue));
        assert!(!rules_permit(&rules, &pair, Weekday::Thu));
        assert!(rules_permit(&[], &pair, Weekday::Sun));
    }

    #[test]
    fn test_rule_json() {
        let rule: StartDayRule =
            serde_json::from_str(r#"{"recurrences":3,"days":["Mon"]}"#).unwrap();
        assert_eq!(rule, StartDayRule::monday_wednesday_friday());
    }
}
