//! Typed views over item payloads.
//!
//! Payloads are stored as free-form JSON. When an item's layout is one we know,
//! the payload is parsed into the matching shape; anything that does not fit
//! stays available as [`ContentPayload::Raw`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ABOUT_LAYOUT: &str = "AboutLayout";
pub const WORK_LAYOUT: &str = "WorkLayout";
pub const SKILLS_LAYOUT: &str = "SkillsLayout";
pub const MINDSET_LAYOUT: &str = "MindsetLayout";
pub const SPORTS_LAYOUT: &str = "SportsLayout";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutData {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Skill level as either a label ("Advanced") or a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillLevel {
    Percent(u8),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: Option<SkillLevel>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<SkillCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindsetData {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub philosophy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsEvent {
    pub title: String,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub results: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub events: Vec<SportsEvent>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub current_sports: Vec<String>,
}

/// Payload of an item, typed by its layout key.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    About(AboutData),
    Work(WorkData),
    Skills(SkillsData),
    Mindset(MindsetData),
    Sports(SportsData),
    Raw(Value),
}

impl ContentPayload {
    /// Parse `data` into the shape `layout` expects. Unknown layouts and
    /// payloads that do not deserialize come back as `Raw`.
    pub fn parse(layout: &str, data: &Value) -> Self {
        let parsed = match layout {
            ABOUT_LAYOUT => serde_json::from_value(data.clone()).map(Self::About),
            WORK_LAYOUT => serde_json::from_value(data.clone()).map(Self::Work),
            SKILLS_LAYOUT => serde_json::from_value(data.clone()).map(Self::Skills),
            MINDSET_LAYOUT => serde_json::from_value(data.clone()).map(Self::Mindset),
            SPORTS_LAYOUT => serde_json::from_value(data.clone()).map(Self::Sports),
            _ => return Self::Raw(data.clone()),
        };

        parsed.unwrap_or_else(|e| {
            tracing::debug!(layout = %layout, error = %e, "payload does not match layout shape");
            Self::Raw(data.clone())
        })
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}
