use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Manually entered profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManualProfile {
    pub name: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
}

impl ManualProfile {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.education, &self.experience, &self.skills]
            .iter()
            .all(|f| f.trim().is_empty())
    }
}

/// Everything the user submitted in the profile step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileInput {
    pub cv_text: Option<String>,
    pub linkedin_url: Option<String>,
    pub manual: Option<ManualProfile>,
}

impl ProfileInput {
    /// The text handed to the summarizer. CV text wins over a LinkedIn URL,
    /// which wins over manual fields. `None` when nothing usable was given.
    pub fn summarizer_input(&self) -> Option<String> {
        if let Some(cv) = self.cv_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(cv.to_string());
        }
        if let Some(url) = self.linkedin_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(format!("LinkedIn URL: {}", url.trim()));
        }
        self.manual
            .as_ref()
            .filter(|m| !m.is_empty())
            .map(|m| format!("{}\n{}\nSkills: {}", m.education, m.experience, m.skills))
    }

    /// CV text, when the user provided one. Drives the strengths extraction.
    pub fn cv_text(&self) -> Option<&str> {
        self.cv_text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Where a competency match came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Needed for the user's latest role; level estimated from the summary.
    RoleNeeded,
    /// Among the strongest competencies found in the CV.
    CvStrength,
}

/// The user's standing on one competency, resolved against the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyMatch {
    pub competency: String,
    pub definition: String,
    pub level: u8,
    pub source: MatchSource,
    /// Level descriptors keyed `L1`..`L5`.
    pub levels: BTreeMap<String, String>,
}

impl CompetencyMatch {
    /// Percentage shown next to the level bar.
    pub fn match_percent(&self) -> u8 {
        (u32::from(self.level) * 100 / 5) as u8
    }
}

/// The `{competency, level}` pair handed to downstream agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompetencyLevel {
    pub competency: String,
    pub level: u8,
}

/// Output of the summary step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyProfile {
    pub latest_role: String,
    pub role_needed: Vec<CompetencyMatch>,
    pub cv_strengths: Vec<CompetencyMatch>,
    /// Both lists merged and deduplicated by name.
    pub combined: Vec<CompetencyLevel>,
}
