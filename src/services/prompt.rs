//! Prompt templates for the decision step.
//!
//! Templates are fixed text so the exact prompt for a given claim and
//! evidence can be asserted in tests. Changing any wording requires a new
//! [`PROMPT_TEMPLATE_VERSION`].

use crate::domain::models::{Claim, EvidenceEntry};

/// Version tag of the templates in this module
pub const PROMPT_TEMPLATE_VERSION: &str = "fire-v1";

/// Rendered in place of results for a search that returned or recorded nothing
pub const NO_RESULT_MSG: &str = "No good Google Search result was found";

const EMPTY_KNOWLEDGE: &str = "N/A";

const DECIDE_INSTRUCTIONS: &str = r#"Instructions:
1. You are given a STATEMENT and the KNOWLEDGE gathered so far from Google Search.
2. Decide whether the KNOWLEDGE is sufficient to judge whether the STATEMENT is true.
3. If it is sufficient, give your final answer. Otherwise ask for ONE additional, focused Google Search query that would best help to verify the STATEMENT. Do not repeat a query that was already made.
4. Reply with a single JSON object and nothing else, in one of these two forms:
{"final_answer": "True" or "False", "confidence": <number between 0 and 1>, "rationale": "<one or two sentences>"}
{"search_query": "<your query>"}"#;

const FORCE_INSTRUCTIONS: &str = r#"Instructions:
1. You are given a STATEMENT and all the KNOWLEDGE gathered from Google Search.
2. No further searches are possible. You must give a final answer now, based only on the KNOWLEDGE and your own understanding.
3. If the KNOWLEDGE does not support the STATEMENT, answer False.
4. Reply with a single JSON object and nothing else:
{"final_answer": "True" or "False", "confidence": <number between 0 and 1>, "rationale": "<one or two sentences>"}"#;

const DECIDE_REFORMULATION: &str = r#"Your previous reply could not be understood. Reply again with ONLY one JSON object, either {"final_answer": "True" or "False", "confidence": <number between 0 and 1>, "rationale": "<text>"} or {"search_query": "<text>"}. Do not add any other text."#;

const FORCE_REFORMULATION: &str = r#"Your previous reply could not be understood. Reply again with ONLY one JSON object: {"final_answer": "True" or "False", "confidence": <number between 0 and 1>, "rationale": "<text>"}. Do not add any other text."#;

/// Prompt asking for a verdict or one more search query
pub fn render_prompt(claim: &Claim, evidence: &[EvidenceEntry]) -> String {
    render(DECIDE_INSTRUCTIONS, claim, evidence)
}

/// Prompt demanding a verdict with no further search allowed
pub fn render_forced_prompt(claim: &Claim, evidence: &[EvidenceEntry]) -> String {
    render(FORCE_INSTRUCTIONS, claim, evidence)
}

/// `prompt` followed by the stricter reply-format instruction used on retry
pub fn with_reformulation(prompt: &str, verdict_only: bool) -> String {
    let instruction = if verdict_only {
        FORCE_REFORMULATION
    } else {
        DECIDE_REFORMULATION
    };
    format!("{prompt}\n{instruction}\n")
}

/// Evidence block: one numbered section per entry, in insertion order
pub fn render_knowledge(evidence: &[EvidenceEntry]) -> String {
    if evidence.is_empty() {
        return EMPTY_KNOWLEDGE.to_string();
    }

    evidence
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_entry(entry: &EvidenceEntry) -> String {
    let mut lines = vec![format!("[{}] Query: {}", entry.step_index, entry.query)];

    if entry.results.is_empty() {
        lines.push(format!("- {NO_RESULT_MSG}"));
    }
    for result in &entry.results {
        let snippet = result.snippet.trim();
        if result.url.is_empty() {
            lines.push(format!("- {snippet}"));
        } else {
            lines.push(format!("- {snippet} [Source: {}]", result.url));
        }
    }

    lines.join("\n")
}

fn render(instructions: &str, claim: &Claim, evidence: &[EvidenceEntry]) -> String {
    format!(
        "{instructions}\n\nKNOWLEDGE:\n{}\n\nSTATEMENT:\n{claim}\n",
        render_knowledge(evidence)
    )
}
