//! Skill Merger & Topic Mapper: combines admin export facts with resume
//! extraction into a `MergedProfile` and derives the question filters.
//!
//! Flow: admin skills + resume skills → dedup → topic mapping (pluggable
//! matcher over the injected table) → domain / level / emphasis / difficulty.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::profile::admin_export::{AdminExport, ValidationWarning};
use crate::profile::models::{
    CandidateProfile, DifficultyDistribution, Domain, Level, MergedProfile, QuestionFilters,
    ResumeProfile, TargetRole,
};
use crate::profile::topics::{SkillTopicMap, TopicMatcher};

/// Include/exclude topic sets, both in insertion order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMapping {
    pub include_topics: Vec<String>,
    pub exclude_topics: Vec<String>,
}

/// Domain rules in priority order: the first rule with any keyword present wins.
const DOMAIN_RULES: &[(Domain, &[&str])] = &[
    (Domain::ItSupport, &["servicenow", "windows", "active directory"]),
    (Domain::HrRecruitment, &["recruitment", "bgv"]),
    (Domain::Finance, &["sap", "accounting", "excel"]),
    (Domain::Sales, &["sales"]),
];

const GENERAL_KNOWLEDGE: &str = "General Knowledge";

// ────────────────────────────────────────────────────────────────────────────
// Merge
// ────────────────────────────────────────────────────────────────────────────

/// Builds the merged profile. Validation warnings (if `validate` is set) are
/// attached to the result; they never stop the merge.
pub fn merge_profile(
    export: &AdminExport,
    resume: &ResumeProfile,
    table: &SkillTopicMap,
    matcher: &dyn TopicMatcher,
    validate: bool,
) -> MergedProfile {
    info!("Merging admin console export and resume data...");

    let warnings: Vec<ValidationWarning> = if validate {
        export.validate()
    } else {
        Vec::new()
    };

    let technical_skills = merge_skills(&export.skills(), &resume.skills);
    let topics = map_skills_to_topics(&technical_skills, table, matcher);

    let personal_info = export.personal_info();
    let years = personal_info.years_of_experience;

    let target_role = TargetRole {
        title: personal_info.title.clone(),
        domain: determine_domain(&technical_skills),
        level: determine_level(years),
        description: resume.summary.clone(),
    };

    let custom_question_filters = QuestionFilters {
        include_topics: topics.include_topics,
        exclude_topics: topics.exclude_topics,
        emphasize_areas: determine_emphasized_areas(&technical_skills, &resume.achievements),
        difficulty_distribution: calculate_difficulty_distribution(years),
    };

    let candidate = CandidateProfile {
        personal_info,
        target_role,
        technical_skills,
        work_experience: export.work_experience(),
        achievements: resume.achievements.clone(),
        education: resume.education.clone(),
        certifications: resume.certifications.clone(),
        custom_question_filters,
    };

    info!(
        "Merged configuration created for {}",
        candidate.personal_info.full_name()
    );
    debug!(
        "Topics included: {} (matcher: {})",
        candidate.custom_question_filters.include_topics.len(),
        matcher.name()
    );
    debug!("Skills extracted: {}", candidate.technical_skills.len());

    MergedProfile {
        candidate,
        warnings,
    }
}

/// Admin skills first, then resume skills. Membership is tested on the
/// lowercased, trimmed form; the first-seen casing is kept.
pub fn merge_skills(admin: &[String], resume: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    admin
        .iter()
        .chain(resume.iter())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(String::from)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Topic mapping
// ────────────────────────────────────────────────────────────────────────────

/// Maps skills to include topics via `matcher` over every table keyword, and
/// applies the fixed exclusion heuristics to the joined skill text.
///
/// The two sets are computed independently and may overlap.
pub fn map_skills_to_topics(
    skills: &[String],
    table: &SkillTopicMap,
    matcher: &dyn TopicMatcher,
) -> TopicMapping {
    let mut include = OrderedSet::default();

    for skill in skills {
        let skill_lower = skill.trim().to_lowercase();
        if skill_lower.is_empty() {
            continue;
        }
        for entry in table.entries() {
            if matcher.matches(&skill_lower, &entry.keyword) {
                include.extend(entry.topics.iter().cloned());
            }
        }
    }

    let all_skills = joined_lower(skills);
    let mut exclude = OrderedSet::default();
    if !contains_any(&all_skills, &["macos", "mac os", "apple"]) {
        exclude.insert("macos".to_string());
    }
    if !all_skills.contains("linux") {
        exclude.insert("linux".to_string());
    }
    if !contains_any(&all_skills, &["python", "java", "c++"]) {
        exclude.insert("programming".to_string());
    }

    TopicMapping {
        include_topics: include.into_vec(),
        exclude_topics: exclude.into_vec(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derived fields
// ────────────────────────────────────────────────────────────────────────────

pub fn determine_domain(skills: &[String]) -> Domain {
    let text = joined_lower(skills);
    DOMAIN_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(domain, _)| *domain)
        .unwrap_or(Domain::General)
}

pub fn determine_level(years: f64) -> Level {
    if years <= 2.0 {
        Level::Beginner
    } else if years <= 5.0 {
        Level::Intermediate
    } else {
        Level::Expert
    }
}

/// Never empty: falls back to `["General Knowledge"]`.
pub fn determine_emphasized_areas(skills: &[String], achievements: &[String]) -> Vec<String> {
    let skills_text = joined_lower(skills);
    let achievements_text = joined_lower(achievements);
    let mut areas: Vec<&str> = Vec::new();

    if contains_any(&skills_text, &["servicenow", "sla"]) {
        areas.extend(["SLA Management", "Escalation Procedures"]);
    }
    if skills_text.contains("active directory") || has_token(&skills_text, "ad") {
        areas.push("Active Directory Administration");
    }
    if contains_any(&achievements_text, &["migration", "project"]) {
        areas.extend(["Project Management", "Large-scale Deployments"]);
    }
    if contains_any(&achievements_text, &["reduction", "improvement"]) {
        areas.extend(["Process Improvement", "Metrics and KPIs"]);
    }

    if areas.is_empty() {
        return vec![GENERAL_KNOWLEDGE.to_string()];
    }
    areas.into_iter().map(String::from).collect()
}

pub fn calculate_difficulty_distribution(years: f64) -> DifficultyDistribution {
    if years <= 1.0 {
        DifficultyDistribution::new(60, 40, 0)
    } else if years <= 3.0 {
        DifficultyDistribution::new(20, 70, 10)
    } else if years <= 5.0 {
        DifficultyDistribution::new(10, 60, 30)
    } else {
        DifficultyDistribution::new(5, 50, 45)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, item: String) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn extend(&mut self, items: impl IntoIterator<Item = String>) {
        for item in items {
            self.insert(item);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

fn joined_lower(items: &[String]) -> String {
    items.join(" ").to_lowercase()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Whole-word check; `ad` must not fire on "adobe" or "leadership".
fn has_token(text: &str, token: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word == token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::topics::{ExactMatcher, SubstringMatcher};
    use serde_json::json;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_windows_10_topics_and_default_exclusions() {
        let mapping = map_skills_to_topics(
            &skills(&["Windows 10"]),
            &SkillTopicMap::default(),
            &SubstringMatcher,
        );
        for topic in ["windows-support", "drivers", "performance", "windows-updates"] {
            assert!(
                mapping.include_topics.contains(&topic.to_string()),
                "missing {topic}"
            );
        }
        assert_eq!(mapping.exclude_topics, vec!["macos", "linux", "programming"]);
    }

    #[test]
    fn test_include_topics_have_no_duplicates() {
        let mapping = map_skills_to_topics(
            &skills(&["Windows 10 Administration", "Windows 11"]),
            &SkillTopicMap::default(),
            &SubstringMatcher,
        );
        let unique: HashSet<_> = mapping.include_topics.iter().collect();
        assert_eq!(unique.len(), mapping.include_topics.len());
        assert_eq!(mapping.include_topics[0], "windows-support");
    }

    #[test]
    fn test_mapping_is_idempotent_under_dedup() {
        let table = SkillTopicMap::default();
        let raw = skills(&["Excel", "excel", "Python", "DNS", "Excel", "Linux admin"]);
        let deduped = merge_skills(&raw, &[]);
        assert_eq!(
            map_skills_to_topics(&raw, &table, &SubstringMatcher),
            map_skills_to_topics(&deduped, &table, &SubstringMatcher)
        );
    }

    #[test]
    fn test_exclusions_respect_mentions() {
        let mapping = map_skills_to_topics(
            &skills(&["Linux", "Apple devices", "Java"]),
            &SkillTopicMap::default(),
            &SubstringMatcher,
        );
        assert!(mapping.exclude_topics.is_empty());
    }

    #[test]
    fn test_include_and_exclude_may_overlap() {
        // "python" is absent so `programming` is excluded, yet a custom table
        // keyword can still include it.
        let table = SkillTopicMap::from_json_str(
            r#"[{"keyword": "rust", "topics": ["programming"]}]"#,
        )
        .unwrap();
        let mapping = map_skills_to_topics(&skills(&["Rust"]), &table, &SubstringMatcher);
        assert!(mapping.include_topics.contains(&"programming".to_string()));
        assert!(mapping.exclude_topics.contains(&"programming".to_string()));
    }

    #[test]
    fn test_matcher_is_pluggable() {
        let table = SkillTopicMap::default();
        let fuzzy = map_skills_to_topics(&skills(&["Windows 10"]), &table, &SubstringMatcher);
        let exact = map_skills_to_topics(&skills(&["Windows 10"]), &table, &ExactMatcher);
        assert!(fuzzy.include_topics.len() >= exact.include_topics.len());
        assert_eq!(
            exact.include_topics,
            vec!["windows-support", "drivers", "performance", "windows-updates"]
        );
    }

    #[test]
    fn test_merge_skills_order_and_case_insensitive_dedup() {
        let merged = merge_skills(
            &skills(&["ServiceNow", "Windows 10"]),
            &skills(&["servicenow", " Excel ", "", "WINDOWS 10", "Outlook"]),
        );
        assert_eq!(merged, vec!["ServiceNow", "Windows 10", "Excel", "Outlook"]);
    }

    #[test]
    fn test_domain_priority_order() {
        assert_eq!(
            determine_domain(&skills(&["SAP", "ServiceNow"])),
            Domain::ItSupport
        );
        assert_eq!(
            determine_domain(&skills(&["BGV", "Excel"])),
            Domain::HrRecruitment
        );
        assert_eq!(determine_domain(&skills(&["Tally", "Excel"])), Domain::Finance);
        assert_eq!(determine_domain(&skills(&["B2B Sales"])), Domain::Sales);
        assert_eq!(determine_domain(&skills(&["Carpentry"])), Domain::General);
        assert_eq!(determine_domain(&[]), Domain::General);
    }

    #[test]
    fn test_level_and_distribution_boundaries() {
        for (years, level, dist) in [
            (0.0, Level::Beginner, (60, 40, 0)),
            (1.0, Level::Beginner, (60, 40, 0)),
            (2.0, Level::Beginner, (20, 70, 10)),
            (3.0, Level::Intermediate, (20, 70, 10)),
            (5.0, Level::Intermediate, (10, 60, 30)),
            (6.0, Level::Expert, (5, 50, 45)),
        ] {
            assert_eq!(determine_level(years), level, "level at {years}");
            assert_eq!(
                calculate_difficulty_distribution(years),
                DifficultyDistribution::new(dist.0, dist.1, dist.2),
                "distribution at {years}"
            );
        }
    }

    #[test]
    fn test_distribution_always_sums_to_100() {
        let mut years = 0.0;
        while years <= 40.0 {
            assert_eq!(calculate_difficulty_distribution(years).total(), 100);
            years += 0.25;
        }
    }

    #[test]
    fn test_emphasized_areas() {
        let areas = determine_emphasized_areas(
            &skills(&["ServiceNow", "AD administration"]),
            &skills(&["Led Windows 11 migration", "20% reduction in MTTR"]),
        );
        assert_eq!(
            areas,
            vec![
                "SLA Management",
                "Escalation Procedures",
                "Active Directory Administration",
                "Project Management",
                "Large-scale Deployments",
                "Process Improvement",
                "Metrics and KPIs",
            ]
        );
    }

    #[test]
    fn test_emphasized_areas_never_empty() {
        assert_eq!(
            determine_emphasized_areas(&skills(&["Adobe Photoshop"]), &[]),
            vec![GENERAL_KNOWLEDGE]
        );
    }

    #[test]
    fn test_merge_profile_end_to_end() {
        let export = AdminExport::new(json!({
            "adminConsoleExport": { "candidateDetails": {
                "recordInfo": { "candidateId": "C-7" },
                "personalInformation": { "fullName": "Ravi Kumar" },
                "employmentHistory": {
                    "totalExperience": { "years": 6 },
                    "currentCompany": {
                        "companyName": "Initech",
                        "designation": "Desktop Support Lead",
                        "skills": ["Windows 10", "Active Directory"]
                    }
                }
            } }
        }));
        let resume = ResumeProfile {
            skills: skills(&["windows 10", "VPN"]),
            achievements: skills(&["Cut ticket backlog: 40% reduction"]),
            summary: "Support lead.".to_string(),
            ..ResumeProfile::default()
        };

        let merged = merge_profile(
            &export,
            &resume,
            &SkillTopicMap::default(),
            &SubstringMatcher,
            true,
        );
        let c = &merged.candidate;

        assert!(merged.warnings.is_empty());
        assert_eq!(c.technical_skills, vec!["Windows 10", "Active Directory", "VPN"]);
        assert_eq!(c.target_role.title, "Desktop Support Lead");
        assert_eq!(c.target_role.domain, Domain::ItSupport);
        assert_eq!(c.target_role.level, Level::Expert);
        assert_eq!(c.target_role.description, "Support lead.");
        assert!(c
            .custom_question_filters
            .include_topics
            .contains(&"vpn-errors".to_string()));
        assert_eq!(
            c.custom_question_filters.difficulty_distribution,
            DifficultyDistribution::new(5, 50, 45)
        );
        assert!(c
            .custom_question_filters
            .emphasize_areas
            .contains(&"Process Improvement".to_string()));

        let doc = serde_json::to_value(&merged).unwrap();
        assert_eq!(doc["candidate"]["personalInfo"]["firstName"], "Ravi");
        assert_eq!(doc["candidate"]["targetRole"]["domain"], "IT Support");
        assert!(doc.get("warnings").is_none());
    }

    #[test]
    fn test_merge_profile_collects_warnings_without_failing() {
        let merged = merge_profile(
            &AdminExport::new(json!({})),
            &ResumeProfile::default(),
            &SkillTopicMap::default(),
            &SubstringMatcher,
            true,
        );
        assert_eq!(merged.warnings.len(), 3);
        assert_eq!(merged.candidate.personal_info.first_name, "Candidate");
        assert!(merged.candidate.technical_skills.is_empty());
    }
}
