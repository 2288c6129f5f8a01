use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A normalized listing merged from any provider.
///
/// `id` is globally unique across the merged set, prefixed by its source
/// (`gh-`, curated ids, `in-`, `int-`, `vol-`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub organization: String,
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    pub deadline: Deadline,
    pub eligibility: String,
    pub link: String,
    pub description: String,
    pub category: Category,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub trending: bool,
}

impl Opportunity {
    /// Case-insensitive substring match against title, description,
    /// organization, or any tag.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.organization.to_lowercase().contains(&term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }
}

/// Fixed category taxonomy used for category browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Education,
    Healthcare,
    Social,
    Environment,
    Global,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technology,
        Category::Education,
        Category::Healthcare,
        Category::Social,
        Category::Environment,
        Category::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Education => "Education",
            Category::Healthcare => "Healthcare",
            Category::Social => "Social",
            Category::Environment => "Environment",
            Category::Global => "Global",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Listing type. Providers report free-form strings in practice, so unknown
/// values are preserved verbatim instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityType {
    Internship,
    Job,
    Volunteer,
    Fellowship,
    Research,
    Program,
    OpenSource,
    Other(String),
}

impl OpportunityType {
    pub fn as_str(&self) -> &str {
        match self {
            OpportunityType::Internship => "Internship",
            OpportunityType::Job => "Job",
            OpportunityType::Volunteer => "Volunteer",
            OpportunityType::Fellowship => "Fellowship",
            OpportunityType::Research => "Research",
            OpportunityType::Program => "Program",
            OpportunityType::OpenSource => "Open Source",
            OpportunityType::Other(s) => s,
        }
    }
}

impl From<&str> for OpportunityType {
    fn from(s: &str) -> Self {
        match s {
            "Internship" => OpportunityType::Internship,
            "Job" => OpportunityType::Job,
            "Volunteer" => OpportunityType::Volunteer,
            "Fellowship" => OpportunityType::Fellowship,
            "Research" => OpportunityType::Research,
            "Program" => OpportunityType::Program,
            "Open Source" => OpportunityType::OpenSource,
            other => OpportunityType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OpportunityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OpportunityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpportunityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OpportunityType::from(s.as_str()))
    }
}

/// Application deadline: a calendar date or one of two sentinel values.
///
/// The sentinels serialize to the exact literals `"Ongoing"` and
/// `"Rolling Applications"` and must round-trip unchanged; they are never
/// reinterpreted as dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    Date(NaiveDate),
    Ongoing,
    RollingApplications,
}

pub const ONGOING: &str = "Ongoing";
pub const ROLLING_APPLICATIONS: &str = "Rolling Applications";

impl Deadline {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Deadline::Date(_))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Deadline::Ongoing => f.write_str(ONGOING),
            Deadline::RollingApplications => f.write_str(ROLLING_APPLICATIONS),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("deadline is neither an ISO date nor a known sentinel: {0}")]
pub struct ParseDeadlineError(pub String);

impl FromStr for Deadline {
    type Err = ParseDeadlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ONGOING => Ok(Deadline::Ongoing),
            ROLLING_APPLICATIONS => Ok(Deadline::RollingApplications),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Deadline::Date)
                .map_err(|_| ParseDeadlineError(other.to_string())),
        }
    }
}

impl Serialize for Deadline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Deadline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
