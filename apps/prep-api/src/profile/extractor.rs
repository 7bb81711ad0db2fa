//! Resume Section Extractor: pulls labeled sections out of free-text resumes.
//!
//! A section starts at a heading line (optionally qualified: "TECHNICAL SKILLS",
//! "WORK EXPERIENCE", "KEY ACHIEVEMENTS", "PROFESSIONAL SUMMARY") and runs until
//! the next section heading (any case), the next all-caps line, or the end of
//! the text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::profile::models::ResumeProfile;

pub const SUMMARY_MAX_CHARS: usize = 500;

fn heading_regex(word: &str) -> Regex {
    // One optional qualifier word, then the section word, then an optional
    // `: inline text`. Anchored to a whole line.
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:[a-z]+[ \t]+)?{word}[ \t]*(?::[ \t]*(?P<inline>[^\n]*))?$"
    ))
    .unwrap()
}

static SKILLS_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_regex("skills"));
static EXPERIENCE_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_regex("experience"));
static ACHIEVEMENTS_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_regex("achievements"));
static SUMMARY_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_regex("summary"));
static EDUCATION_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_regex("education"));
static CERTIFICATIONS_HEADING: LazyLock<Regex> =
    LazyLock::new(|| heading_regex("certifications?"));

fn section_headings() -> [&'static Regex; 6] {
    [
        &*SKILLS_HEADING,
        &*EXPERIENCE_HEADING,
        &*ACHIEVEMENTS_HEADING,
        &*SUMMARY_HEADING,
        &*EDUCATION_HEADING,
        &*CERTIFICATIONS_HEADING,
    ]
}

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[•▪\-\*]\s*(?P<item>\S.*?)\s*$").unwrap());

/// The captured region of one section.
#[derive(Debug)]
struct SectionBlock<'a> {
    /// Text after `HEADING:` on the heading line itself.
    inline: Option<&'a str>,
    lines: Vec<&'a str>,
}

/// Extracts a `ResumeProfile` from raw resume text. Never fails: sections that
/// cannot be found come back empty.
pub fn extract_resume_profile(text: &str) -> ResumeProfile {
    if text.trim().is_empty() {
        return ResumeProfile::default();
    }

    let text = text.replace("\r\n", "\n");

    let profile = ResumeProfile {
        skills: bullet_items(find_section(&text, &SKILLS_HEADING)),
        experience: experience_items(find_section(&text, &EXPERIENCE_HEADING)),
        achievements: bullet_items(find_section(&text, &ACHIEVEMENTS_HEADING)),
        education: bullet_items(find_section(&text, &EDUCATION_HEADING)),
        certifications: bullet_items(find_section(&text, &CERTIFICATIONS_HEADING)),
        summary: summary_text(find_section(&text, &SUMMARY_HEADING)),
    };

    debug!(
        "Extracted {} skills, {} achievements, {} experience lines from resume",
        profile.skills.len(),
        profile.achievements.len(),
        profile.experience.len()
    );

    profile
}

fn find_section<'a>(text: &'a str, heading: &Regex) -> Option<SectionBlock<'a>> {
    let caps = heading.captures(text)?;
    let whole = caps.get(0)?;
    let inline = caps
        .name("inline")
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty());

    let rest = &text[whole.end()..];
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let lines = rest
        .lines()
        .take_while(|line| !is_heading_line(line) && !is_section_heading(line))
        .collect();

    Some(SectionBlock { inline, lines })
}

fn is_section_heading(line: &str) -> bool {
    section_headings().iter().any(|re| re.is_match(line))
}

/// An all-caps line with at least two letters, e.g. `EDUCATION` or
/// `WORK EXPERIENCE:`. Bullet lines and `Company | Role` lines never qualify.
fn is_heading_line(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 2
        && trimmed
            .chars()
            .all(|c| c.is_uppercase() || c.is_whitespace() || matches!(c, '&' | '/' | ':' | '-'))
}

fn bullet_items(block: Option<SectionBlock<'_>>) -> Vec<String> {
    let Some(block) = block else {
        return Vec::new();
    };
    block
        .lines
        .iter()
        .filter_map(|line| BULLET_RE.captures(line))
        .filter_map(|caps| caps.name("item").map(|m| m.as_str().to_string()))
        .collect()
}

/// `Acme Corp | IT Analyst (2019 - 2021)` → `Acme Corp | IT Analyst`.
fn experience_items(block: Option<SectionBlock<'_>>) -> Vec<String> {
    let Some(block) = block else {
        return Vec::new();
    };
    block
        .lines
        .iter()
        .filter_map(|line| split_company_role(line))
        .map(|(company, role)| format!("{company} | {role}"))
        .collect()
}

fn split_company_role(line: &str) -> Option<(&str, &str)> {
    let line = match BULLET_RE.captures(line).and_then(|c| c.name("item")) {
        Some(item) => item.as_str(),
        None => line,
    };
    let (company, role) = line.split_once('|')?;
    let role = role.split('(').next().unwrap_or(role);
    let company = company.trim();
    let role = role.trim();
    if company.is_empty() || role.is_empty() {
        return None;
    }
    Some((company, role))
}

fn summary_text(block: Option<SectionBlock<'_>>) -> String {
    let Some(block) = block else {
        return String::new();
    };
    let mut parts: Vec<&str> = Vec::with_capacity(block.lines.len() + 1);
    if let Some(inline) = block.inline {
        parts.push(inline);
    }
    parts.extend(block.lines.iter().copied());
    parts
        .join("\n")
        .trim()
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect()
}
