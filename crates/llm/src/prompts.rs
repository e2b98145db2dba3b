//! Prompt templates for the use case assistant

use navigator_data::UseCaseRecord;
use std::fmt::Write;

/// System instructions for the assistant
pub const SYSTEM_PROMPT: &str = "You are an AI expert who helps users understand AI use cases. \
Provide concise, helpful responses about AI applications in business. \
Ground your answer in the use cases listed by the user when they are relevant, \
and cite companies by name.";

/// Numbered list of the retrieved use cases
pub fn context_block(records: &[&UseCaseRecord]) -> String {
    let mut block = String::new();
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(
            block,
            "{}. {} - {}\n   Business function: {}\n   AI type: {}\n   Outcome: {}",
            i + 1,
            record.company,
            record.use_case_name,
            record.business_function,
            record.ai_type,
            record.outcome
        );
        if let Some(url) = record.source_url() {
            let _ = writeln!(block, "   Source: {}", url);
        }
    }
    block
}

/// User message: retrieved use cases followed by the question
pub fn user_prompt(question: &str, records: &[&UseCaseRecord]) -> String {
    if records.is_empty() {
        return format!(
            "No matching use cases were found in the catalogue.\n\nQuestion: {}",
            question
        );
    }

    format!(
        "Relevant AI use cases from the catalogue:\n\n{}\nQuestion: {}",
        context_block(records),
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(company: &str, source_link: &str) -> UseCaseRecord {
        UseCaseRecord {
            company: company.to_string(),
            use_case_name: "Resume screening".to_string(),
            business_function: "HR".to_string(),
            ai_type: "NLP".to_string(),
            outcome: "Faster hiring".to_string(),
            source_link: source_link.to_string(),
            business_function_slug: "hr".to_string(),
            ai_type_slug: "nlp".to_string(),
        }
    }

    #[test]
    fn test_user_prompt_lists_records() {
        let a = record("Unilever", "https://example.com/unilever");
        let b = record("Hilton", "");
        let prompt = user_prompt("How is AI used in hiring?", &[&a, &b]);

        assert!(prompt.contains("1. Unilever - Resume screening"));
        assert!(prompt.contains("2. Hilton - Resume screening"));
        assert!(prompt.contains("Source: https://example.com/unilever"));
        assert_eq!(prompt.matches("Source:").count(), 1);
        assert!(prompt.ends_with("Question: How is AI used in hiring?"));
    }

    #[test]
    fn test_user_prompt_without_context() {
        let prompt = user_prompt("Anything on mining?", &[]);
        assert!(prompt.starts_with("No matching use cases"));
    }
}
