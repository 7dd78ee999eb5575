// Prompt text for CV screening. The reply format requested here is the
// contract `scorer::parse_reply` depends on; change both together.

/// System message sent with every screening request.
pub const SCREENING_SYSTEM: &str = "You are a helpful HR assistant.";

/// Builds the user message comparing one CV against the job description.
/// Both texts are embedded verbatim.
pub fn build_screening_prompt(job_description: &str, cv_text: &str) -> String {
    format!(
        r#"
Compare this CV to the job description below.
Return only a match percentage (0–100) and a short explanation.

Job Description:
{job_description}

CV:
{cv_text}

Respond in this format:
Match Percentage: XX%
Explanation: ...
"#
    )
}
