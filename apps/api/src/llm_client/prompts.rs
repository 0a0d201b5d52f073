// Prompt templates for every generative-AI call. Placeholders are filled in a
// single pass by `fill_template`, so substituted text is never re-scanned.

/// Resume analysis. Placeholders: `{career_goal}`, `{resume_text}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "\
You are an experienced career coach and technical recruiter.
Evaluate the resume below against the target role \"{career_goal}\".

Return:
- resumeScore: an integer from 0 to 100 describing how well the resume fits the role.
- missingSkills: exactly three skills the candidate most needs for the role.
- recommendations.certifications: certifications that would close those gaps.
- recommendations.opportunities: concrete projects, internships or communities to pursue.
- summary: three sentences of candid, actionable feedback.

Resume:
\"\"\"
{resume_text}
\"\"\"";

/// Text extraction from an uploaded file sent as inline data.
pub const EXTRACTION_PROMPT: &str = "\
Extract all readable text from the attached resume document. \
Preserve section order and line breaks. \
Return only the extracted text, with no commentary.";

/// Search-grounded discovery. Placeholders: `{role}`, `{skills}`.
pub const DISCOVERY_PROMPT_TEMPLATE: &str = "\
Find currently available online courses and certifications that help someone \
become a {role}, focusing on these skills: {skills}.
Prefer well-known platforms such as Coursera, edX, Udemy, Udacity, Pluralsight, \
LinkedIn Learning, Kaggle, freeCodeCamp and official cloud-vendor training.
For each course give the title, the platform, the direct course URL, and if known \
the cost, duration and level.";

/// Structuring of discovery output. Placeholders: `{citations}`, `{raw_text}`.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = "\
Convert the research notes below into JSON matching the provided schema.
Only include courses and opportunities that are explicitly mentioned in the notes. \
Do NOT invent titles, providers or links. If a link is not stated, leave it empty.

Known source URLs:
{citations}

Research notes:
{raw_text}";

/// Replaces each `{name}` placeholder in one left-to-right pass. Unknown
/// placeholders and placeholder-like text inside substituted values are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
