//! CLI `run` flow: admin export + optional resume → personalized HTML file.
//!
//! Steps are strictly sequential. Only the admin export and the base template
//! are mandatory; a resume that cannot be read is logged and skipped.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::profile::admin_export::AdminExport;
use crate::profile::extractor::extract_resume_profile;
use crate::profile::merger::merge_profile;
use crate::profile::models::{format_years, Domain, ResumeProfile};
use crate::profile::renderer::render;
use crate::profile::topics::{SkillTopicMap, TopicMatcher};
use crate::profile::writer::{output_file_name, write_output, WriteError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read admin console export {path}: {source}")]
    AdminExportUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("admin console export {path} is not valid JSON: {source}")]
    MalformedExport {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("base template not found: {path}")]
    TemplateMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub base_template: PathBuf,
    pub output_dir: PathBuf,
    pub auto_backup: bool,
    pub validate: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_template: config.base_template_file.clone(),
            output_dir: config.output_dir.clone(),
            auto_backup: config.auto_backup,
            validate: config.validate_before_generation,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub candidate_name: String,
    pub role: String,
    pub domain: Domain,
    pub years_of_experience: f64,
    pub skill_count: usize,
    pub topic_count: usize,
    pub warning_count: usize,
}

pub fn run(
    admin_path: &Path,
    resume_path: Option<&Path>,
    opts: &RunOptions,
    table: &SkillTopicMap,
    matcher: &dyn TopicMatcher,
) -> Result<RunSummary, PipelineError> {
    info!("Step 1: Reading admin console export...");
    let raw = std::fs::read_to_string(admin_path).map_err(|source| {
        error!("Cannot proceed without admin console export");
        PipelineError::AdminExportUnreadable {
            path: admin_path.display().to_string(),
            source,
        }
    })?;
    let export =
        AdminExport::from_json_str(&raw).map_err(|source| PipelineError::MalformedExport {
            path: admin_path.display().to_string(),
            source,
        })?;

    info!("Step 2: Reading resume file...");
    let resume = match resume_path {
        Some(path) => {
            let profile = read_resume(path)
                .map(|text| extract_resume_profile(&text))
                .unwrap_or_default();
            if profile.is_empty() {
                warn!("No resume sections recognized, using admin console data only");
            }
            profile
        }
        None => {
            info!("No resume file provided, using admin console data only");
            ResumeProfile::default()
        }
    };

    info!("Step 3: Merging data...");
    let merged = merge_profile(&export, &resume, table, matcher, opts.validate);

    info!("Step 4: Reading base template...");
    let base_html = std::fs::read_to_string(&opts.base_template).map_err(|source| {
        PipelineError::TemplateMissing {
            path: opts.base_template.display().to_string(),
            source,
        }
    })?;

    info!("Step 5: Generating personalized HTML...");
    let html = render(&base_html, &merged)?;

    info!("Step 6: Saving output file...");
    let candidate = &merged.candidate;
    let file_name = output_file_name(
        &candidate.personal_info.first_name,
        &candidate.personal_info.last_name,
        &candidate.target_role.title,
    );
    let outcome = write_output(&opts.output_dir.join(&file_name), &html, opts.auto_backup)?;

    let summary = RunSummary {
        output_path: outcome.path,
        backup_path: outcome.backup,
        candidate_name: candidate.personal_info.full_name(),
        role: candidate.target_role.title.clone(),
        domain: candidate.target_role.domain,
        years_of_experience: candidate.personal_info.years_of_experience,
        skill_count: candidate.technical_skills.len(),
        topic_count: candidate.custom_question_filters.include_topics.len(),
        warning_count: merged.warnings.len(),
    };

    info!("Generation complete");
    info!("Output file: {file_name}");
    info!("Location: {}", summary.output_path.display());
    info!("Candidate: {}", summary.candidate_name);
    info!("Role: {}", summary.role);
    info!("Domain: {}", summary.domain);
    info!(
        "Experience: {} years",
        format_years(summary.years_of_experience)
    );
    info!("Skills: {}", summary.skill_count);
    info!("Topics: {}", summary.topic_count);
    if let Some(backup) = &summary.backup_path {
        info!("Previous output backed up to {}", backup.display());
    }
    if summary.warning_count > 0 {
        warn!(
            "{} expected admin export field(s) were missing; defaults were used",
            summary.warning_count
        );
    }

    Ok(summary)
}

/// `.pdf` goes through text extraction, anything else is decoded as UTF-8
/// with invalid bytes replaced. Failures are logged and yield `None`.
fn read_resume(path: &Path) -> Option<String> {
    if !path.exists() {
        warn!(
            "Resume file not found: {}, proceeding without resume",
            path.display()
        );
        return None;
    }

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).map_err(|e| e.to_string())
    } else {
        std::fs::read(path)
            .map(|bytes| decode_lossy(path, &bytes))
            .map_err(|e| e.to_string())
    };

    match text {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                "Could not read resume {}: {e}, proceeding without resume",
                path.display()
            );
            None
        }
    }
}

fn decode_lossy(path: &Path, bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!(
            "Resume {} is not valid UTF-8; invalid bytes were replaced",
            path.display()
        );
    }
    text.into_owned()
}
