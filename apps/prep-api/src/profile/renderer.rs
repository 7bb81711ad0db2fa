//! Template Renderer: injects a merged profile into the base HTML template.
//!
//! Three first-match-only substitutions: the metadata script block, the
//! welcome heading (an `<h1>` starting with "Welcome", else the first `<h1>`),
//! and the subtitle line. The markup is not validated.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{info, warn};

use crate::profile::models::{format_years, MergedProfile};

pub const METADATA_MARKER: &str = "<!-- METADATA -->";

static SCRIPT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script\b").unwrap());
static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<h1\b[^>]*>).*?(</h1\s*>)").unwrap());
static WELCOME_H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<h1\b[^>]*>)\s*Welcome\b.*?(</h1\s*>)").unwrap());
static SUBTITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<p\b[^>]*\bclass\s*=\s*"[^"]*\bsubtitle\b[^"]*"[^>]*>).*?(</p\s*>)"#)
        .unwrap()
});

/// Renders `base_html` for the given profile. Only fails if the profile
/// cannot be serialized.
pub fn render(base_html: &str, profile: &MergedProfile) -> Result<String, serde_json::Error> {
    info!("Generating personalized HTML...");

    let info = &profile.candidate.personal_info;
    let role = &profile.candidate.target_role;
    let welcome = format!(
        "Welcome, {}! Your {} Interview Preparation Path",
        info.first_name, role.title
    );
    let subtitle = format!(
        "{} domain | {} years of experience",
        role.domain,
        format_years(info.years_of_experience)
    );

    // Headings first, so embedded profile data is never matched.
    let heading = if WELCOME_H1_RE.is_match(base_html) {
        &*WELCOME_H1_RE
    } else {
        &*H1_RE
    };
    let html = replace_inner(heading, base_html, &welcome);
    let html = replace_inner(&SUBTITLE_RE, &html, &subtitle);

    let metadata = metadata_block(profile)?;
    let html = inject_metadata(&html, &metadata);

    info!("HTML generation complete");
    Ok(html)
}

/// Marker if present, else before the first `<script`, else before `</body>`.
fn inject_metadata(html: &str, metadata: &str) -> String {
    if html.contains(METADATA_MARKER) {
        return html.replacen(METADATA_MARKER, metadata, 1);
    }
    let anchor = SCRIPT_OPEN_RE
        .find(html)
        .or_else(|| BODY_CLOSE_RE.find(html))
        .map(|m| m.start());
    match anchor {
        Some(at) => format!("{}{}{}", &html[..at], metadata, &html[at..]),
        None => {
            warn!("Template has no metadata marker, <script> or </body>; metadata not injected");
            html.to_string()
        }
    }
}

fn replace_inner(re: &Regex, html: &str, text: &str) -> String {
    let escaped = escape_html(text);
    re.replacen(html, 1, |caps: &Captures| {
        format!("{}{}{}", &caps[1], escaped, &caps[2])
    })
    .into_owned()
}

fn metadata_block(profile: &MergedProfile) -> Result<String, serde_json::Error> {
    let candidate = &profile.candidate;
    let info = &candidate.personal_info;
    Ok(format!(
        "\n    <!-- PERSONALIZED METADATA -->\n    <script>\n      \
         const CANDIDATE_NAME = {};\n      \
         const CANDIDATE_ID = {};\n      \
         const TARGET_ROLE = {};\n      \
         const DOMAIN = {};\n      \
         const YEARS_EXPERIENCE = {};\n      \
         const TECHNICAL_SKILLS = {};\n      \
         const PERSONALIZED_CONFIG = {};\n    \
         </script>\n  ",
        js_literal(&info.full_name())?,
        js_literal(&info.candidate_id)?,
        js_literal(&candidate.target_role.title)?,
        js_literal(&candidate.target_role.domain)?,
        format_years(info.years_of_experience),
        js_literal(&candidate.technical_skills)?,
        js_literal(profile)?,
    ))
}

/// JSON is valid JS; `</` is escaped so data cannot close the script element.
fn js_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{
        CandidateProfile, DifficultyDistribution, Domain, Level, PersonalInfo, QuestionFilters,
        TargetRole,
    };

    fn profile(first: &str, title: &str) -> MergedProfile {
        MergedProfile {
            candidate: CandidateProfile {
                personal_info: PersonalInfo {
                    candidate_id: "C-9".to_string(),
                    first_name: first.to_string(),
                    last_name: "Sharma".to_string(),
                    email: String::new(),
                    phone: String::new(),
                    title: title.to_string(),
                    years_of_experience: 5.0,
                },
                target_role: TargetRole {
                    title: title.to_string(),
                    domain: Domain::ItSupport,
                    level: Level::Intermediate,
                    description: String::new(),
                },
                technical_skills: vec!["Windows 10".to_string()],
                work_experience: Vec::new(),
                achievements: Vec::new(),
                education: Vec::new(),
                certifications: Vec::new(),
                custom_question_filters: QuestionFilters {
                    include_topics: Vec::new(),
                    exclude_topics: Vec::new(),
                    emphasize_areas: vec!["General Knowledge".to_string()],
                    difficulty_distribution: DifficultyDistribution::new(10, 60, 30),
                },
            },
            warnings: Vec::new(),
        }
    }

    const TEMPLATE: &str = r#"<html><head><!-- METADATA --></head><body>
<h1 class="title">Welcome, Guest!</h1>
<p class="subtitle">Placeholder</p>
<h1>Second heading</h1>
<p class="subtitle">Second subtitle</p>
<script>init();</script>
</body></html>"#;

    #[test]
    fn test_marker_is_replaced_and_headings_personalized() {
        let html = render(TEMPLATE, &profile("Priya", "IT Support Engineer")).unwrap();

        assert!(!html.contains(METADATA_MARKER));
        assert!(html.contains("<!-- PERSONALIZED METADATA -->"));
        assert!(html.contains(r#"const CANDIDATE_NAME = "Priya Sharma";"#));
        assert!(html.contains("const YEARS_EXPERIENCE = 5;"));
        assert!(html.contains(r#"const DOMAIN = "IT Support";"#));
        assert!(html.contains(
            r#"<h1 class="title">Welcome, Priya! Your IT Support Engineer Interview Preparation Path</h1>"#
        ));
        assert!(html.contains(
            r#"<p class="subtitle">IT Support domain | 5 years of experience</p>"#
        ));
        // first match only
        assert!(html.contains("<h1>Second heading</h1>"));
        assert!(html.contains(r#"<p class="subtitle">Second subtitle</p>"#));
        // metadata landed in <head>, not before the body script
        let meta_at = html.find("PERSONALIZED METADATA").unwrap();
        assert!(meta_at < html.find("<body>").unwrap());
    }

    #[test]
    fn test_metadata_inserted_before_first_script_without_marker() {
        let template = "<body><h1>Hi</h1><script src=\"a.js\"></script><script>b()</script></body>";
        let html = render(template, &profile("Priya", "Analyst")).unwrap();
        let meta_at = html.find("<!-- PERSONALIZED METADATA -->").unwrap();
        let first_script = html.find("<script src=\"a.js\">").unwrap();
        assert!(meta_at < first_script);
        assert_eq!(html.matches("PERSONALIZED METADATA").count(), 1);
    }

    #[test]
    fn test_metadata_before_body_close_as_last_resort() {
        let html = render("<body><h1>x</h1></body>", &profile("Priya", "Analyst")).unwrap();
        assert!(html.ends_with("</script>\n  </body>"));
    }

    #[test]
    fn test_welcome_heading_preferred_over_branding_heading() {
        let template = "<body><h1>Acme Prep</h1><h1 id=\"w\">Welcome back</h1></body>";
        let html = render(template, &profile("Priya", "Analyst")).unwrap();
        assert!(html.contains("<h1>Acme Prep</h1>"));
        assert!(html.contains(
            r#"<h1 id="w">Welcome, Priya! Your Analyst Interview Preparation Path</h1>"#
        ));
    }

    #[test]
    fn test_template_without_anchors_passes_through() {
        let html = render("plain text", &profile("Priya", "Analyst")).unwrap();
        assert_eq!(html, "plain text");
    }

    #[test]
    fn test_inserted_text_is_escaped() {
        let html = render(TEMPLATE, &profile("<b>Eve</b>", "R&D </script>")).unwrap();
        assert!(html.contains("Welcome, &lt;b&gt;Eve&lt;/b&gt;! Your R&amp;D &lt;/script&gt;"));
        assert!(html.contains(r#"const TARGET_ROLE = "R&D <\/script>";"#));
        assert!(!html.contains("R&D </script>"));
    }

    #[test]
    fn test_personalized_config_embeds_full_document() {
        let html = render(TEMPLATE, &profile("Priya", "Analyst")).unwrap();
        assert!(html.contains(r#"const PERSONALIZED_CONFIG = {"candidate":{"personalInfo""#));
        assert!(html.contains(r#"const TECHNICAL_SKILLS = ["Windows 10"];"#));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
