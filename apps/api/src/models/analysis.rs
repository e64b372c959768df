use serde::{Deserialize, Serialize};

/// One requirement extracted from a job description, scored against the CV summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRequirement {
    pub requirement: String,
    /// technical skill, soft skill, tool, experience, education or certification.
    pub category: String,
    pub reason: String,
    pub match_score: u8,
    pub match_explanation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Skill,
    Experience,
}

/// One competency or experience shortfall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GapRecord {
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub competency: String,
    /// Skill gaps only.
    pub current_level: Option<u8>,
    /// Skill gaps only.
    pub required_level: Option<u8>,
    pub explanation: String,
    pub recommendation: String,
    pub suggested_learning_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GapReport {
    pub job_title: String,
    pub gaps: Vec<GapRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekPlan {
    pub week: u8,
    pub focus_area: String,
    pub objectives: String,
    pub activities: Vec<String>,
    pub resources: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LearningPlan {
    pub plan: Vec<WeekPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_type_serializes_under_type_key() {
        let gap = GapRecord {
            gap_type: GapType::Experience,
            competency: "Stakeholder management".to_string(),
            current_level: None,
            required_level: None,
            explanation: "No client-facing work".to_string(),
            recommendation: "Volunteer for a client project".to_string(),
            suggested_learning_mode: Some("project".to_string()),
        };
        let json = serde_json::to_value(&gap).unwrap();
        assert_eq!(json["type"], "experience");
        assert!(json["current_level"].is_null());
    }
}
