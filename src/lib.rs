//! Weekly classroom timetabling on a discrete block grid.
//!
//! Places a catalog of recurring classes into a single shared room so
//! that no two sessions overlap, every session falls inside operating
//! hours, and recurring sessions keep the same clock time a fixed number
//! of days apart.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Calendar`, `Timeline`, `CourseClass`,
//!   `StartDayRule`, `Schedule`
//! - **`grid`**: Slot model: which (class, start block) pairs are admissible
//! - **`solver`**: Branch-and-bound search and an optional MILP backend
//! - **`scheduler`**: Request type, end-to-end scheduler, KPIs
//! - **`validation`**: Input integrity checks and timetable conflict detection
//! - **`generator`**: Seeded random catalogs
//!
//! # Example
//!
//! ```
//! use classroom_scheduler::scheduler::{ClassScheduler, ScheduleRequest};
//!
//! let request = ScheduleRequest::example_week();
//! let schedule = ClassScheduler::default().schedule(&request).unwrap();
//! for placement in schedule.sorted_by_start() {
//!     println!("{placement}");
//! }
//! ```

pub mod error;
pub mod generator;
pub mod grid;
pub mod models;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{ScheduleError, ScheduleResult};
