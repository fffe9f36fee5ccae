//! Slot grid: the discrete decision space of a timetable.
//!
//! A slot is a (class, start block) pair. Selecting a slot places every
//! session of the class: occurrence `k` occupies the blocks
//! `[start + k * gap, start + k * gap + blocks_needed)`, where `gap` is the
//! class's repetition gap converted to blocks.
//!
//! Most slots are fixed to zero up front: recurrences that run past the
//! horizon, sessions touching non-operating blocks, start-day rules, and
//! pins. What remains are the candidates a solver chooses from.

use tracing::debug;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{rules_permit, CourseClass, Timeline};
use crate::scheduler::ScheduleRequest;

/// Why a slot can never be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// A later occurrence falls past the end of the horizon.
    PartialRecurrence,
    /// An occupied block lies outside operating hours or in a break.
    OutsideOperatingHours,
    /// The first session's weekday is not permitted.
    StartDay,
    /// The class is pinned elsewhere.
    Pinned,
}

/// A (class, start block) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Class position in the request catalog.
    pub class: usize,
    /// Start block of the first session.
    pub start: usize,
}

/// Per-class geometry on the timeline.
#[derive(Debug, Clone)]
struct ClassShape {
    blocks_needed: usize,
    gap_blocks: usize,
    recurrences: usize,
}

impl ClassShape {
    fn of(class: &CourseClass, timeline: &Timeline) -> Self {
        Self {
            blocks_needed: class.blocks_needed(timeline.block_minutes()),
            gap_blocks: class.gap_blocks(timeline.blocks_per_day()),
            recurrences: class.recurrences as usize,
        }
    }

    /// Blocks occupied when starting at `start`, or `None` if any occurrence
    /// spills past `len`.
    fn occupancy(&self, start: usize, len: usize) -> Option<Vec<usize>> {
        let mut blocks =
            Vec::with_capacity(self.blocks_needed.saturating_mul(self.recurrences).min(len));
        for k in 0..self.recurrences {
            let first = start + k * self.gap_blocks;
            let last = first + self.blocks_needed;
            if last > len {
                return None;
            }
            blocks.extend(first..last);
        }
        Some(blocks)
    }
}

/// The candidate slots of a request.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    timeline: Timeline,
    shapes: Vec<ClassShape>,
    class_ids: Vec<String>,
    candidates: Vec<Vec<usize>>,
    pinned: Vec<bool>,
}

impl SlotGrid {
    /// Builds the grid, fixing inadmissible slots to zero.
    ///
    /// # Errors
    /// - [`ScheduleError::PinnedSlotUnavailable`] if a pin lands on an
    ///   inadmissible slot or off the block grid.
    /// - [`ScheduleError::NoCandidateSlots`] if a class cannot start anywhere.
    pub fn build(request: &ScheduleRequest) -> ScheduleResult<Self> {
        let timeline = Timeline::from_calendar(&request.calendar);
        let mut grid = Self {
            shapes: request
                .classes
                .iter()
                .map(|c| ClassShape::of(c, &timeline))
                .collect(),
            class_ids: request.classes.iter().map(|c| c.id.clone()).collect(),
            candidates: Vec::with_capacity(request.classes.len()),
            pinned: request.classes.iter().map(|c| c.pinned_start.is_some()).collect(),
            timeline,
        };

        for (ci, class) in request.classes.iter().enumerate() {
            let pinned_block = match class.pinned_start {
                Some(start) => Some(grid.timeline.index_of(start).ok_or_else(|| {
                    ScheduleError::PinnedSlotUnavailable {
                        class_id: class.id.clone(),
                        start,
                    }
                })?),
                None => None,
            };

            let list: Vec<usize> = (0..grid.timeline.len())
                .filter(|&b| grid.exclusion_with(request, ci, b, pinned_block).is_none())
                .collect();

            if let (Some(start), Some(block)) = (class.pinned_start, pinned_block) {
                if !list.contains(&block) {
                    return Err(ScheduleError::PinnedSlotUnavailable {
                        class_id: class.id.clone(),
                        start,
                    });
                }
            }
            if list.is_empty() {
                return Err(ScheduleError::NoCandidateSlots {
                    class_id: class.id.clone(),
                });
            }

            debug!(
                class = %class.id,
                candidates = list.len(),
                blocks_needed = grid.shapes[ci].blocks_needed,
                "slot candidates"
            );
            grid.candidates.push(list);
        }

        debug!(
            classes = grid.class_count(),
            blocks = grid.timeline.len(),
            slots = grid.candidate_count(),
            "slot grid built"
        );
        Ok(grid)
    }

    fn exclusion_with(
        &self,
        request: &ScheduleRequest,
        class: usize,
        start: usize,
        pinned_block: Option<usize>,
    ) -> Option<Exclusion> {
        let Some(blocks) = self.shapes[class].occupancy(start, self.timeline.len()) else {
            return Some(Exclusion::PartialRecurrence);
        };
        let timeline = self.timeline.blocks();
        if blocks.iter().any(|&b| !timeline[b].operating) {
            return Some(Exclusion::OutsideOperatingHours);
        }
        // A session must end on the day it starts.
        let per_session = self.shapes[class].blocks_needed.max(1);
        if blocks
            .chunks(per_session)
            .any(|s| timeline[s[0]].day != timeline[s[s.len() - 1]].day)
        {
            return Some(Exclusion::OutsideOperatingHours);
        }
        let course = &request.classes[class];
        let weekday = timeline[start].weekday();
        if !course.allows_start_on(weekday) || !rules_permit(&request.start_day_rules, course, weekday)
        {
            return Some(Exclusion::StartDay);
        }
        match pinned_block {
            Some(p) if p != start => Some(Exclusion::Pinned),
            _ => None,
        }
    }

    /// Why `(class, start)` is inadmissible, or `None` for a candidate.
    ///
    /// # Panics
    /// If `class` is not a catalog position of `request`, or `request` is
    /// not the request the grid was built from.
    pub fn exclusion(&self, request: &ScheduleRequest, class: usize, start: usize) -> Option<Exclusion> {
        let pinned_block = request.classes[class]
            .pinned_start
            .and_then(|s| self.timeline.index_of(s));
        self.exclusion_with(request, class, start, pinned_block)
    }

    /// Underlying timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.shapes.len()
    }

    /// Class ID at a catalog position.
    pub fn class_id(&self, class: usize) -> &str {
        &self.class_ids[class]
    }

    /// Candidate start blocks of a class, ascending.
    pub fn candidates(&self, class: usize) -> &[usize] {
        &self.candidates[class]
    }

    /// Total number of candidate slots.
    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().map(Vec::len).sum()
    }

    /// Whether the class is pinned.
    pub fn is_pinned(&self, class: usize) -> bool {
        self.pinned[class]
    }

    /// Sessions per week of a class.
    pub fn recurrences(&self, class: usize) -> usize {
        self.shapes[class].recurrences
    }

    /// Blocks per session of a class.
    pub fn blocks_needed(&self, class: usize) -> usize {
        self.shapes[class].blocks_needed
    }

    /// Blocks occupied by `(class, start)`, in occurrence order.
    ///
    /// Empty if the recurrences do not fit the horizon.
    pub fn occupied_blocks(&self, class: usize, start: usize) -> Vec<usize> {
        self.shapes[class]
            .occupancy(start, self.timeline.len())
            .unwrap_or_default()
    }

    /// Candidate slots whose occupancy covers `block`.
    pub fn affecting_slots(&self, block: usize) -> Vec<Slot> {
        let mut slots = Vec::new();
        for (class, starts) in self.candidates.iter().enumerate() {
            let shape = &self.shapes[class];
            for &start in starts {
                let hit = (0..shape.recurrences).any(|k| {
                    let first = start + k * shape.gap_blocks;
                    block >= first && block < first + shape.blocks_needed
                });
                if hit {
                    slots.push(Slot { class, start });
                }
            }
        }
        slots
    }

    /// For every block, the candidate slots covering it.
    ///
    /// Equivalent to calling [`affecting_slots`](Self::affecting_slots) for
    /// each block, in a single pass.
    pub fn coverage(&self) -> Vec<Vec<Slot>> {
        let mut cover: Vec<Vec<Slot>> = vec![Vec::new(); self.timeline.len()];
        for (class, starts) in self.candidates.iter().enumerate() {
            for &start in starts {
                for b in self.occupied_blocks(class, start) {
                    cover[b].push(Slot { class, start });
                }
            }
        }
        cover
    }
}
