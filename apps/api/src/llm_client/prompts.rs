// Prompt fragments for the compatibility analysis call.
// The model is asked for bare JSON; the client still strips fences if it disobeys.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Role and output contract for the model.
pub const ATS_SYSTEM: &str = "You are an expert Applicant Tracking System (ATS) and a \
    professional career coach. Your task is to analyze a resume against a job description. \
    Provide a compatibility score as a percentage (as a number, not a string), a concise \
    bulleted list of the candidate's strengths, and a concise bulleted list of actionable \
    areas for improvement.";

/// The exact reply schema. Field names are part of the parsing contract.
pub const RESPONSE_SCHEMA: &str = r#"Respond with a single JSON object and nothing else, using EXACTLY these fields:
{
  "compatibilityScore": <number from 0 to 100 representing the match>,
  "strengths": "<a brief introductory sentence followed by a concise bulleted summary of how the resume aligns with the key requirements>",
  "areasForImprovement": "<a brief introductory sentence followed by a concise bulleted list of actionable suggestions to improve the resume for this role>"
}
Do NOT include any text outside the JSON object."#;

/// API-side schema for the verdict. Both texts are declared as strings so the
/// model cannot answer with bullet arrays.
pub static VERDICT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "compatibilityScore": {
                "type": "NUMBER",
                "description": "A percentage score from 0 to 100 representing the match."
            },
            "strengths": {
                "type": "STRING",
                "description": "A brief introductory sentence followed by a concise bulleted summary of how the resume aligns with the key requirements."
            },
            "areasForImprovement": {
                "type": "STRING",
                "description": "A brief introductory sentence followed by a concise bulleted list of actionable suggestions."
            }
        },
        "required": ["compatibilityScore", "strengths", "areasForImprovement"]
    })
});

/// Builds the single instruction block sent to the model.
///
/// Both texts are cut to their character budgets first to bound request size.
pub fn build_analysis_prompt(
    resume_text: &str,
    job_description: &str,
    resume_budget: usize,
    job_budget: usize,
) -> String {
    let resume = truncate_chars(resume_text.trim(), resume_budget);
    let job = truncate_chars(job_description.trim(), job_budget);

    format!(
        "{ATS_SYSTEM}\n\n{RESPONSE_SCHEMA}\n\n\
         Analyze the following resume and job description and provide a compatibility analysis.\n\n\
         **Resume Text:**\n---\n{resume}\n---\n\n\
         **Job Description Text:**\n---\n{job}\n---\n"
    )
}

/// Returns at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
