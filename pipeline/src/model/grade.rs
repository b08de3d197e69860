//! Letter grades shared by claims, sanads, and evidence sources.

use serde::{Deserialize, Serialize};

/// Evidentiary grade, A (strongest) through D (weakest).
///
/// Variant order is strength-descending, so `Ord` ranks D as the *greatest*
/// value: the strictest of a set of grades is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// All grades from strongest to weakest.
    pub const ALL: [Grade; 4] = [Grade::A, Grade::B, Grade::C, Grade::D];

    /// One step stronger, saturating at A.
    pub fn upgraded(self) -> Self {
        match self {
            Self::A | Self::B => Self::A,
            Self::C => Self::B,
            Self::D => Self::C,
        }
    }

    /// One step weaker, saturating at D.
    pub fn downgraded(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::C,
            Self::C | Self::D => Self::D,
        }
    }

    /// The stricter (weaker) of two grades.
    pub fn stricter(self, other: Self) -> Self {
        self.max(other)
    }

    /// Apply an optional cap. A cap only ever tightens the grade.
    pub fn capped_by(self, cap: Option<Grade>) -> Self {
        match cap {
            Some(cap) => self.stricter(cap),
            None => self,
        }
    }

    /// Parse a grade label as it appears on the wire.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
        }
    }
}

/// Strictest grade across an iterator of optional caps.
pub fn strictest_cap<I>(caps: I) -> Option<Grade>
where
    I: IntoIterator<Item = Option<Grade>>,
{
    caps.into_iter().flatten().max()
}
