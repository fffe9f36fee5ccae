//! Class catalog generator.
//!
//! Produces random weekly catalogs for exercising the solvers. The
//! total weekly contact time is capped at a fraction of the calendar's
//! usable room time, so generated requests are usually (not always)
//! feasible.

use rand::prelude::*;
use tracing::debug;

use crate::models::{Calendar, CourseClass};
use crate::scheduler::ScheduleRequest;

/// Configuration for generating class catalogs.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Number of classes to draw.
    pub class_count: usize,
    /// Session lengths to pick from (minutes).
    pub duration_choices: Vec<u32>,
    /// Sessions per week (min, max).
    pub recurrence_range: (u32, u32),
    /// Subject names used to build class titles.
    pub subjects: Vec<&'static str>,
    /// Maximum booked fraction of usable room time.
    pub max_load: f64,
}

const SUBJECTS: [&str; 12] = [
    "Psych",
    "English",
    "Math",
    "Calculus",
    "Linear Algebra",
    "Sociology",
    "Biology",
    "Supply Chain",
    "Chemistry",
    "History",
    "Economics",
    "Statistics",
];

const LEVELS: [u32; 4] = [101, 200, 300, 400];

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl CatalogConfig {
    /// Few short classes, lots of slack.
    pub fn light() -> Self {
        Self {
            class_count: 6,
            duration_choices: vec![60, 90],
            recurrence_range: (1, 2),
            subjects: SUBJECTS.to_vec(),
            max_load: 0.5,
        }
    }

    /// Roughly the shape of the sample week.
    pub fn standard() -> Self {
        Self {
            class_count: 10,
            duration_choices: vec![60, 90, 120, 150, 180],
            recurrence_range: (1, 3),
            subjects: SUBJECTS.to_vec(),
            max_load: 0.8,
        }
    }

    /// Many classes, tight room.
    pub fn dense() -> Self {
        Self {
            class_count: 16,
            duration_choices: vec![60, 90, 120],
            recurrence_range: (2, 3),
            subjects: SUBJECTS.to_vec(),
            max_load: 0.9,
        }
    }

    /// Sets the number of classes.
    pub fn with_class_count(mut self, count: usize) -> Self {
        self.class_count = count;
        self
    }
}

/// Generator for class catalogs.
pub struct CatalogGenerator {
    config: CatalogConfig,
    rng: StdRng,
}

impl CatalogGenerator {
    /// Creates a generator with the given config and seed.
    pub fn new(config: CatalogConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates a request on `calendar`.
    pub fn generate_request(&mut self, calendar: Calendar) -> ScheduleRequest {
        let classes = self.generate_classes(&calendar);
        ScheduleRequest::new(calendar).with_classes(classes)
    }

    /// Draws up to `class_count` classes that fit the calendar.
    ///
    /// Stops early once the load cap would be exceeded even by the
    /// smallest possible class.
    pub fn generate_classes(&mut self, calendar: &Calendar) -> Vec<CourseClass> {
        let budget = (calendar.operating_minutes_per_day() as f64
            * calendar.day_count() as f64
            * self.config.max_load) as u32;
        // (r - 1) * gap must stay inside the horizon
        let gap = 2u32;
        let max_fit = (calendar.day_count() as u32).saturating_sub(1) / gap + 1;
        let (lo, hi) = self.config.recurrence_range;
        let hi = hi.min(max_fit).max(1);
        let lo = lo.clamp(1, hi);

        let block = calendar.block_minutes.max(1);
        let durations: Vec<u32> = self
            .config
            .duration_choices
            .iter()
            .copied()
            .filter(|d| *d > 0 && d % block == 0 && *d <= calendar.operating_day.duration_minutes())
            .collect();
        let Some(&shortest) = durations.iter().min() else {
            return Vec::new();
        };

        let mut used = 0u32;
        let mut names = std::collections::HashSet::new();
        let mut classes = Vec::with_capacity(self.config.class_count);

        for i in 0..self.config.class_count {
            let mut duration = durations.choose(&mut self.rng).copied().unwrap_or(shortest);
            let mut recurrences = self.rng.random_range(lo..=hi);

            if used + duration * recurrences > budget {
                duration = shortest;
                recurrences = lo;
            }
            if used + duration * recurrences > budget {
                debug!(generated = i, used, budget, "load cap reached");
                break;
            }
            used += duration * recurrences;

            let name = self.unique_name(&mut names);
            classes.push(
                CourseClass::new((i + 1).to_string(), name)
                    .with_duration_minutes(duration)
                    .with_recurrences(recurrences)
                    .with_gap_days(gap),
            );
        }

        classes
    }

    fn unique_name(&mut self, taken: &mut std::collections::HashSet<String>) -> String {
        for _ in 0..20 {
            let subject = self.config.subjects.choose(&mut self.rng).copied().unwrap_or("Class");
            let level = LEVELS.choose(&mut self.rng).copied().unwrap_or(101);
            let name = format!("{subject} {level}");
            if taken.insert(name.clone()) {
                return name;
            }
        }
        let name = format!("Elective {}", taken.len() + 1);
        taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_request;
    use chrono::NaiveDate;

    fn week() -> Calendar {
        Calendar::school_week(NaiveDate::from_ymd_opt(2017, 10, 16).unwrap())
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = CatalogGenerator::new(CatalogConfig::standard(), 42).generate_classes(&week());
        let b = CatalogGenerator::new(CatalogConfig::standard(), 42).generate_classes(&week());
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_request_validates() {
        for seed in 0..20 {
            let request = CatalogGenerator::new(CatalogConfig::dense(), seed).generate_request(week());
            assert!(!request.classes.is_empty());
            assert!(validate_request(&request).is_ok(), "seed {seed}");
        }
    }

    #[test]
    fn test_load_cap() {
        let cal = week();
        let cap = cal.operating_minutes_per_day() * cal.day_count() as u32;
        for seed in 0..10 {
            let classes = CatalogGenerator::new(CatalogConfig::dense().with_class_count(40), seed)
                .generate_classes(&cal);
            let load: u32 = classes.iter().map(|c| c.weekly_minutes()).sum();
            assert!(load as f64 <= cap as f64 * 0.9);
        }
    }

    #[test]
    fn test_recurrences_fit_short_horizon() {
        let day = NaiveDate::from_ymd_opt(2017, 10, 16).unwrap();
        let cal = Calendar::school_week(day).with_block_minutes(15);
        let cal = Calendar { last_day: day + chrono::Duration::days(2), ..cal };
        let classes = CatalogGenerator::new(CatalogConfig::dense(), 7).generate_classes(&cal);
        assert!(classes.iter().all(|c| c.recurrences <= 2));
    }

    #[test]
    fn test_unique_names() {
        let classes = CatalogGenerator::new(CatalogConfig::light(), 3).generate_classes(&week());
        let names: std::collections::HashSet<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), classes.len());
    }
}
