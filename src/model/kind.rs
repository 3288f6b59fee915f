/// Page kind and batch provenance definitions
use std::fmt;

/// The kind of page a target URL points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Search results or category index showing many deal cards
    Listing,

    /// A single deal's own page
    Detail,
}

impl PageKind {
    /// Returns the lowercase name used in logs and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Detail => "detail",
        }
    }

    /// Parses a page kind from its lowercase name
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "listing" => Some(Self::Listing),
            "detail" => Some(Self::Detail),
            _ => None,
        }
    }

    /// The provenance tag carried by a batch extracted from this kind of page
    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Listing => Provenance::Listing,
            Self::Detail => Provenance::Detail,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which page type produced a batch of candidate records
///
/// Detail pages are authoritative for every field. Listing pages are only
/// trusted for the volatile fields (temperature and comment count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Listing,
    Detail,
}

impl Provenance {
    /// Returns true if a batch with this provenance replaces whole records
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::Detail)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
