//! Admin Export Reader/Validator.
//!
//! The export is an arbitrary nested JSON document. Nothing here rejects it:
//! missing fields become advisory warnings and defaults are substituted.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::profile::models::{PersonalInfo, Tenure, WorkExperience};

const DETAILS_ROOT: &str = "adminConsoleExport.candidateDetails";

/// Paths (relative to the export root) that should be present for a complete
/// profile. Absence is advisory only.
pub const REQUIRED_FIELDS: &[&str] = &[
    "adminConsoleExport.candidateDetails.recordInfo.candidateId",
    "adminConsoleExport.candidateDetails.personalInformation.fullName",
    "adminConsoleExport.candidateDetails.employmentHistory.currentCompany",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// Read-only view over a parsed admin console export.
#[derive(Debug, Clone)]
pub struct AdminExport {
    raw: Value,
}

impl AdminExport {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_nested(&self.raw, path)
    }

    fn detail(&self, path: &str) -> Option<&Value> {
        self.get(&format!("{DETAILS_ROOT}.{path}"))
    }

    /// Checks `REQUIRED_FIELDS`, logging each gap. Never blocks processing.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        debug!("Validating admin console export structure...");
        let warnings: Vec<ValidationWarning> = REQUIRED_FIELDS
            .iter()
            .filter(|field| is_missing(self.get(field)))
            .map(|field| {
                warn!("Missing field: {field}");
                ValidationWarning {
                    field: field.to_string(),
                    message: format!("Missing field: {field}"),
                }
            })
            .collect();

        if !warnings.is_empty() {
            warn!(
                "Admin console export validation failed ({} missing), proceeding with available data",
                warnings.len()
            );
        }
        warnings
    }

    /// Skills then tools of the current company, de-duplicated (exact match),
    /// first occurrence kept.
    pub fn skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for path in [
            "employmentHistory.currentCompany.skills",
            "employmentHistory.currentCompany.tools",
        ] {
            for skill in string_list(self.detail(path)) {
                if !skills.contains(&skill) {
                    skills.push(skill);
                }
            }
        }
        skills
    }

    pub fn years_of_experience(&self) -> f64 {
        number(self.detail("employmentHistory.totalExperience.years")).unwrap_or(0.0)
    }

    pub fn designation(&self) -> Option<String> {
        text(self.detail("employmentHistory.currentCompany.designation"))
    }

    pub fn personal_info(&self) -> PersonalInfo {
        let full_name = text(self.detail("personalInformation.fullName")).unwrap_or_default();
        let mut words = full_name.split_whitespace();
        let first_name = words
            .next()
            .map(String::from)
            .or_else(|| text(self.detail("personalInformation.preferredName")))
            .unwrap_or_else(|| "Candidate".to_string());
        let last_name = words.collect::<Vec<_>>().join(" ");

        PersonalInfo {
            candidate_id: text(self.detail("recordInfo.candidateId"))
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            first_name,
            last_name,
            email: first_text(&[
                self.detail("personalInformation.professionalEmail"),
                self.detail("personalInformation.personalEmail"),
            ]),
            phone: first_text(&[
                self.detail("personalInformation.phoneNumber"),
                self.detail("personalInformation.whatsappNumber"),
            ]),
            title: self
                .designation()
                .unwrap_or_else(|| "Professional".to_string()),
            years_of_experience: self.years_of_experience(),
        }
    }

    /// Current company (ongoing) followed by the most recent previous company.
    pub fn work_experience(&self) -> Vec<WorkExperience> {
        let mut experience = Vec::new();

        if let Some(current) = self
            .detail("employmentHistory.currentCompany")
            .filter(|v| is_truthy(v))
        {
            experience.push(WorkExperience {
                company: text(current.get("companyName"))
                    .unwrap_or_else(|| "Current Company".to_string()),
                position: text(current.get("designation"))
                    .unwrap_or_else(|| "Position".to_string()),
                duration: Tenure {
                    from: text(current.get("joiningDate")).unwrap_or_default(),
                    to: "present".to_string(),
                },
                years_in_role: Some(
                    number(get_nested(current, "experience.years")).unwrap_or(0.0),
                ),
            });
        }

        if let Some(previous) = self
            .detail("employmentHistory.previousCompany1")
            .filter(|v| is_truthy(v))
        {
            experience.push(WorkExperience {
                company: text(previous.get("companyName"))
                    .unwrap_or_else(|| "Previous Company".to_string()),
                position: text(previous.get("designation"))
                    .unwrap_or_else(|| "Position".to_string()),
                duration: Tenure {
                    from: text(previous.get("joiningDate")).unwrap_or_default(),
                    to: text(previous.get("lastWorkingDate")).unwrap_or_default(),
                },
                years_in_role: None,
            });
        }

        experience
    }
}

/// Walks a dotted path. Any missing intermediate key (or a non-container in
/// the middle of the path) yields `None`. Numeric segments index arrays.
pub fn get_nested<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// `null`, `""`, `[]` and `{}` count as missing, as does an absent key.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Company entries only need to be present: `{}` still yields an entry with
/// default fields. `null`, `false`, `0` and `""` do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Non-empty string, or a number rendered as text (ids are sometimes numeric).
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(candidates: &[Option<&Value>]) -> String {
    candidates
        .iter()
        .find_map(|v| text(*v))
        .unwrap_or_default()
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite() && *n >= 0.0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
