use serde::{Deserialize, Serialize};

/// The outreach and wellness programs the clinic runs projections for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    CorporateWellness,
    SchoolOutreach,
    AgeCareOutreach,
    SpecialNeedsOutreach,
}

impl ProgramKind {
    pub fn all() -> &'static [ProgramKind] {
        &[
            Self::CorporateWellness,
            Self::SchoolOutreach,
            Self::AgeCareOutreach,
            Self::SpecialNeedsOutreach,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorporateWellness => "wellness",
            Self::SchoolOutreach => "school",
            Self::AgeCareOutreach => "agecare",
            Self::SpecialNeedsOutreach => "special-needs",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wellness" => Some(Self::CorporateWellness),
            "school" => Some(Self::SchoolOutreach),
            "agecare" => Some(Self::AgeCareOutreach),
            "special-needs" => Some(Self::SpecialNeedsOutreach),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CorporateWellness => "Corporate Wellness",
            Self::SchoolOutreach => "School Outreach",
            Self::AgeCareOutreach => "Age Care Outreach",
            Self::SpecialNeedsOutreach => "Special Needs Outreach",
        }
    }

    /// Outreach programs are single-campaign projections driven by events.
    pub fn is_outreach(&self) -> bool {
        !matches!(self, Self::CorporateWellness)
    }

    /// Only the special-needs program sedates patients.
    pub fn includes_sedation(&self) -> bool {
        matches!(self, Self::SpecialNeedsOutreach)
    }
}

impl std::fmt::Display for ProgramKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
