//! Label-path filters identifying an owner chain by slugs.
//!
//! # Responsibility
//! - Parse caller slugs (`owner/creator`, `owner/venue/program`) into
//!   fixed-arity tagged variants.
//! - Reject wrong segment counts and malformed segments at construction time,
//!   before any store access.
//!
//! # Invariants
//! - `Creator` and `Venue` paths carry exactly two segments, `Program` three.
//! - Segments are non-empty and start with a letter or digit.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static LABEL_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}._~-]*$").expect("valid label segment regex")
});

const SLUG_SEPARATOR: char = '/';

/// Owner-chain shape a label path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelPathKind {
    /// `owner/creator`
    Creator,
    /// `owner/venue`
    Venue,
    /// `owner/venue/program`
    Program,
}

impl LabelPathKind {
    /// Number of slug segments this kind requires.
    pub fn arity(self) -> usize {
        match self {
            Self::Creator | Self::Venue => 2,
            Self::Program => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Venue => "venue",
            Self::Program => "program",
        }
    }
}

impl Display for LabelPathKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label-path construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPathError {
    /// Segment count does not match the kind's arity.
    WrongArity {
        kind: LabelPathKind,
        expected: usize,
        actual: usize,
    },
    /// One segment is empty or contains disallowed characters.
    InvalidSegment {
        kind: LabelPathKind,
        position: usize,
    },
}

impl Display for LabelPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongArity {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{kind} label path requires {expected} segments, got {actual}"
            ),
            Self::InvalidSegment { kind, position } => {
                write!(f, "{kind} label path segment {position} is not a valid label")
            }
        }
    }
}

impl Error for LabelPathError {}

/// Equality filter on an owner chain. All segments must match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelPath {
    Creator {
        owner: String,
        creator: String,
    },
    Venue {
        owner: String,
        venue: String,
    },
    Program {
        owner: String,
        venue: String,
        program: String,
    },
}

impl LabelPath {
    pub fn creator(owner: &str, creator: &str) -> Result<Self, LabelPathError> {
        Self::from_segments(LabelPathKind::Creator, &[owner, creator])
    }

    pub fn venue(owner: &str, venue: &str) -> Result<Self, LabelPathError> {
        Self::from_segments(LabelPathKind::Venue, &[owner, venue])
    }

    pub fn program(owner: &str, venue: &str, program: &str) -> Result<Self, LabelPathError> {
        Self::from_segments(LabelPathKind::Program, &[owner, venue, program])
    }

    /// Parses a `/`-separated slug, e.g. `studio/ana` for a creator.
    pub fn from_slug(kind: LabelPathKind, slug: &str) -> Result<Self, LabelPathError> {
        let segments: Vec<&str> = slug.split(SLUG_SEPARATOR).collect();
        Self::from_segments(kind, &segments)
    }

    /// Builds a path from ordered segments, validating arity and syntax.
    pub fn from_segments<S: AsRef<str>>(
        kind: LabelPathKind,
        segments: &[S],
    ) -> Result<Self, LabelPathError> {
        if segments.len() != kind.arity() {
            return Err(LabelPathError::WrongArity {
                kind,
                expected: kind.arity(),
                actual: segments.len(),
            });
        }

        let mut owned = Vec::with_capacity(segments.len());
        for (position, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            if !LABEL_SEGMENT_RE.is_match(segment) {
                return Err(LabelPathError::InvalidSegment { kind, position });
            }
            owned.push(segment.to_string());
        }

        let mut segments = owned.into_iter();
        let mut next = || segments.next().unwrap_or_default();
        Ok(match kind {
            LabelPathKind::Creator => Self::Creator {
                owner: next(),
                creator: next(),
            },
            LabelPathKind::Venue => Self::Venue {
                owner: next(),
                venue: next(),
            },
            LabelPathKind::Program => Self::Program {
                owner: next(),
                venue: next(),
                program: next(),
            },
        })
    }

    pub fn kind(&self) -> LabelPathKind {
        match self {
            Self::Creator { .. } => LabelPathKind::Creator,
            Self::Venue { .. } => LabelPathKind::Venue,
            Self::Program { .. } => LabelPathKind::Program,
        }
    }

    /// Segments in owner-chain order.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Creator { owner, creator } => vec![owner.as_str(), creator.as_str()],
            Self::Venue { owner, venue } => vec![owner.as_str(), venue.as_str()],
            Self::Program {
                owner,
                venue,
                program,
            } => vec![owner.as_str(), venue.as_str(), program.as_str()],
        }
    }
}
