// Prompt text for resume generation. The two system prompts differ only in the
// metric names and ranges the model is asked to report.

/// System prompt for the canonical route (metrics 90–100).
pub const RESUME_SYSTEM: &str = r#"You are a professional resume writer. You MUST:
1. Use the provided resume template structure EXACTLY - do not modify HTML tags, CSS, or element counts
2. Only replace text content within {{PLACEHOLDER}} tags
3. Return ONLY valid JSON (no markdown, no code blocks)
4. Include all mustIncludeSkills if provided
5. Ensure content is ATS-friendly and realistic
6. Match the job description requirements as closely as possible

JSON response must have exactly these keys:
{
  "filename": "FirstName_LastName_Role.pdf",
  "resumeHtml": "<!DOCTYPE html>...",
  "metrics": { "jdMatch": number 90-100, "atsFriendliness": number 90-100, "hrCatchiness": number 90-100, "chancesOfShortlisting": number 90-100 },
  "addedSkills": ["skill1", "skill2"],
  "targetMatch": number,
  "roleTitle": "string"
}"#;

/// System prompt for the legacy route (metrics 70–100, short metric names).
pub const LEGACY_RESUME_SYSTEM: &str = r#"You are a professional resume writer. You MUST:
1. Use the provided resume template structure EXACTLY - do not modify HTML tags, CSS, or element counts
2. Only replace text content within {{PLACEHOLDER}} tags
3. Return ONLY valid JSON (no markdown, no code blocks)
4. Include all mustIncludeSkills if provided
5. Ensure content is ATS-friendly and realistic
6. Match the job description requirements as closely as possible

JSON response must have exactly these keys:
{
  "filename": "FirstName_LastName_Role.pdf",
  "resumeHtml": "<!DOCTYPE html>...",
  "metrics": { "jdMatch": number 70-100, "ats": number 70-100, "hrCatchiness": number 70-100, "shortlistChance": number 70-100 },
  "addedSkills": ["skill1", "skill2"],
  "targetMatch": number,
  "roleTitle": "string"
}"#;

/// User prompt shared by both routes.
pub fn build_user_prompt(
    company_name: &str,
    job_description: &str,
    target_match: u8,
    must_include_skills: &[String],
    template_html: &str,
) -> String {
    let skills = if must_include_skills.is_empty() {
        "None".to_string()
    } else {
        must_include_skills.join(", ")
    };

    format!(
        "Generate a professional resume tailored to this job:

Company: {company_name}
Job Description: {job_description}
Target Match Score: {target_match}%
Must Include Skills: {skills}

Template to fill:
{template_html}

Requirements:
- Fill in the placeholders ({{{{CANDIDATE_NAME}}}}, {{{{CURRENT_ROLE}}}}, etc.)
- Ensure all mustIncludeSkills are present in the SKILLS section
- Make metrics realistic based on job fit (jdMatch should be around {target_match})
- Return ONLY the JSON object, nothing else"
    )
}
