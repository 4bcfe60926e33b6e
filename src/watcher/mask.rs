//! Event kinds and the per-object interest mask.

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a raw change reported by the OS.
///
/// `RenamedOld` and `RenamedNew` are the two halves of a rename and are
/// merged by the decoder into a single rename event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Added,
    Removed,
    Modified,
    RenamedOld,
    RenamedNew,
}

impl EventKind {
    const fn bit(self) -> u8 {
        match self {
            Self::Added => 1,
            Self::Removed => 1 << 1,
            Self::Modified => 1 << 2,
            Self::RenamedOld => 1 << 3,
            Self::RenamedNew => 1 << 4,
        }
    }
}

/// A user-facing interest flag. `Renamed` selects both rename halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Added,
    Removed,
    Modified,
    Renamed,
}

impl Interest {
    /// All interest flags, in display order.
    pub const ALL: [Interest; 4] = [
        Interest::Added,
        Interest::Removed,
        Interest::Modified,
        Interest::Renamed,
    ];

    fn mask(self) -> EventMask {
        match self {
            Self::Added => EventMask::ADDED,
            Self::Removed => EventMask::REMOVED,
            Self::Modified => EventMask::MODIFIED,
            Self::Renamed => EventMask::RENAMED,
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

impl FromStr for Interest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "removed" => Ok(Self::Removed),
            "modified" => Ok(Self::Modified),
            "renamed" => Ok(Self::Renamed),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// Set of event kinds a watched object cares about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Interest>", into = "Vec<Interest>")]
pub struct EventMask(u8);

impl EventMask {
    pub const EMPTY: Self = Self(0);
    pub const ADDED: Self = Self(EventKind::Added.bit());
    pub const REMOVED: Self = Self(EventKind::Removed.bit());
    pub const MODIFIED: Self = Self(EventKind::Modified.bit());
    pub const RENAMED: Self = Self(EventKind::RenamedOld.bit() | EventKind::RenamedNew.bit());
    pub const ALL: Self = Self(Self::ADDED.0 | Self::REMOVED.0 | Self::MODIFIED.0 | Self::RENAMED.0);

    #[must_use]
    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub fn has(self, interest: Interest) -> bool {
        let bits = interest.mask().0;
        self.0 & bits == bits
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The interest flags set in this mask.
    #[must_use]
    pub fn interests(self) -> Vec<Interest> {
        Interest::ALL.into_iter().filter(|i| self.has(*i)).collect()
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for EventMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl From<Interest> for EventMask {
    fn from(interest: Interest) -> Self {
        interest.mask()
    }
}

impl FromIterator<Interest> for EventMask {
    fn from_iter<I: IntoIterator<Item = Interest>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |mask, i| mask.union(i.into()))
    }
}

impl From<Vec<Interest>> for EventMask {
    fn from(interests: Vec<Interest>) -> Self {
        interests.into_iter().collect()
    }
}

impl From<EventMask> for Vec<Interest> {
    fn from(mask: EventMask) -> Self {
        mask.interests()
    }
}

impl fmt::Debug for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.interests()).finish()
    }
}

impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.interests().iter().map(ToString::to_string).collect();
        f.write_str(&names.join(","))
    }
}
