use serde::{Deserialize, Serialize};

use crate::profile::admin_export::ValidationWarning;

/// Sections pulled out of a free-text resume. Every field is always present;
/// a section that could not be found is simply empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProfile {
    pub skills: Vec<String>,
    /// Normalized `"Company | Role"` lines.
    pub experience: Vec<String>,
    pub achievements: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    /// At most 500 characters.
    pub summary: String,
}

impl ResumeProfile {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.experience.is_empty()
            && self.achievements.is_empty()
            && self.education.is_empty()
            && self.certifications.is_empty()
            && self.summary.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "IT Support")]
    ItSupport,
    #[serde(rename = "HR/Recruitment")]
    HrRecruitment,
    Finance,
    Sales,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::ItSupport => "IT Support",
            Domain::HrRecruitment => "HR/Recruitment",
            Domain::Finance => "Finance",
            Domain::Sales => "Sales",
            Domain::General => "General",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
}

/// Percentage weighting across content tiers. The three fields always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    pub beginner: u8,
    pub intermediate: u8,
    pub expert: u8,
}

impl DifficultyDistribution {
    pub const fn new(beginner: u8, intermediate: u8, expert: u8) -> Self {
        Self {
            beginner,
            intermediate,
            expert,
        }
    }

    #[cfg(test)]
    pub fn total(&self) -> u32 {
        self.beginner as u32 + self.intermediate as u32 + self.expert as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub candidate_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub years_of_experience: f64,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRole {
    pub title: String,
    pub domain: Domain,
    pub level: Level,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenure {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub duration: Tenure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_in_role: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilters {
    pub include_topics: Vec<String>,
    pub exclude_topics: Vec<String>,
    pub emphasize_areas: Vec<String>,
    pub difficulty_distribution: DifficultyDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub personal_info: PersonalInfo,
    pub target_role: TargetRole,
    pub technical_skills: Vec<String>,
    pub work_experience: Vec<WorkExperience>,
    pub achievements: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub custom_question_filters: QuestionFilters,
}

/// The merged view of admin export + resume handed to the renderer.
/// Serializes as `{ "candidate": { ... } }`; advisory warnings stay out of the
/// embedded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedProfile {
    pub candidate: CandidateProfile,
    #[serde(skip)]
    pub warnings: Vec<ValidationWarning>,
}

/// Formats a years value the way a person would write it: `5`, `3.5`.
pub fn format_years(years: f64) -> String {
    if years.fract() == 0.0 && years.abs() < 1e15 {
        format!("{}", years as i64)
    } else {
        format!("{years}")
    }
}
