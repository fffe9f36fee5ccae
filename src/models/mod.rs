//! Timetabling domain models.
//!
//! Provides the core data types for describing a weekly classroom
//! timetabling problem and its solution.
//!
//! # Domain Mappings
//!
//! | classroom-scheduler | Meaning |
//! |---------------------|---------|
//! | Calendar | Operating dates, daily hours, breaks, block length |
//! | Block | One discrete chunk of the week |
//! | CourseClass | A class meeting N times per week |
//! | Session | One meeting of a class |
//! | Placement | All sessions of one class |
//! | Schedule | The full timetable |

mod calendar;
mod class;
mod constraint;
mod schedule;
mod timeline;

pub use calendar::{format_clock, parse_clock, Calendar, TimeWindow, MINUTES_PER_DAY};
pub use class::CourseClass;
pub use constraint::{rules_permit, StartDayRule};
pub use schedule::{Placement, Schedule, Session, Violation, ViolationType};
pub use timeline::{time_of_day_labels, Block, Timeline};
