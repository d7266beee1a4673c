//! Page windows and sampled result shapes.

use crate::model::label_path::LabelPathKind;
use crate::model::seed::Seed;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;

/// Sampling operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Creators,
    Programs,
    Works,
    Venues,
}

impl SampleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creators => "creators",
            Self::Programs => "programs",
            Self::Works => "works",
            Self::Venues => "venues",
        }
    }

    /// Label-path kinds this operation can filter by.
    pub fn accepted_filters(self) -> &'static [LabelPathKind] {
        match self {
            Self::Creators => &[LabelPathKind::Creator],
            Self::Programs => &[LabelPathKind::Venue, LabelPathKind::Program],
            Self::Works => &[LabelPathKind::Creator, LabelPathKind::Program],
            Self::Venues => &[],
        }
    }

    pub fn accepts(self, filter: LabelPathKind) -> bool {
        self.accepted_filters().contains(&filter)
    }
}

impl Display for SampleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offset/limit window over one seed's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub from: u32,
    pub count: NonZeroU32,
}

impl PageWindow {
    pub fn new(from: u32, count: NonZeroU32) -> Self {
        Self { from, count }
    }

    /// Window immediately following this one, with the same size.
    pub fn next(self) -> Self {
        Self {
            from: self.from.saturating_add(self.count.get()),
            count: self.count,
        }
    }
}

/// One sampled parent with its randomly drawn representative child.
///
/// `representative` is `None` when the parent has no visible child; that is a
/// regular outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledItem<P, C> {
    pub parent: P,
    pub representative: Option<C>,
}

/// Sampling result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePage<T> {
    /// Seed the ordering was drawn with; reuse it to request further windows.
    pub seed: Seed,
    /// Effective window after count clamping.
    pub window: PageWindow,
    /// Items in sampled order.
    pub items: Vec<T>,
}
