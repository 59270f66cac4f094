// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates for the three generative calls of a turn, plus the
//! overflow summary used by context retention.

use thoth_core::types::NO_CONTEXT;

/// Fixed instruction prepended to every answer prompt.
pub const SYSTEM_PROMPT: &str = r#"You are a helpful assistant that answers questions based on the provided context and your internal knowledge.
For each question, you should use the retrieved context and your internal knowledge to provide a comprehensive answer. If the context does not contain relevant information, rely on your internal knowledge to answer the question.
For each piece of information you use from the context, cite the source in parentheses from the provided source Example: (Source: <document.pdf>) or (Source: <hyperlink>).
If the fact is from your internal knowledge, cite it as (Source: Internal Knowledge).
If you don't know the answer, say you don't know."#;

const CLASSIFY_TEMPLATE: &str = r#"You are an expert context verifier. Given the existing context and a new question, determine if the question can be answered with the existing context or if additional information is needed.
Existing Context: {context}
New Question: {question}
Does the question require additional context to answer accurately?
**Respond with 'Yes' or 'No' only.**"#;

const COMPRESSION_TEMPLATE: &str = r#"Given the following context, only keep the information that is relevant to answer the question.

Context: {context}

Question: {question}

- Remove any irrelevant details.
- Remove any duplicate information.
- Remove any formatting or metadata that is not necessary for understanding the content.
- DO NOT remove the original source information which is formatted as (Source: ) in the context.
- Keep the source information with the content from that source. like this example: "The Eiffel Tower is located in Paris. (Source: https://en.wikipedia.org/wiki/Paris)"
- Provide the compressed context without any additional commentary."#;

const SUMMARY_TEMPLATE: &str = r#"The following context was gathered over several questions in one conversation. Condense it into a shorter block that keeps every distinct fact.

Context: {context}

- Merge duplicate facts into one statement.
- Keep each fact's source next to it, formatted as (Source: label).
- Drop facts only when they are repeated elsewhere in the context.
- Provide the condensed context without any additional commentary."#;

fn context_or_sentinel(context: Option<&str>) -> &str {
    match context {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_CONTEXT,
    }
}

/// Asks whether `question` needs more context than what the thread holds.
pub fn classify_prompt(context: Option<&str>, question: &str) -> String {
    CLASSIFY_TEMPLATE
        .replace("{context}", context_or_sentinel(context))
        .replace("{question}", question)
}

/// Asks the model to keep only the parts of `context` relevant to `question`.
pub fn compression_prompt(context: &str, question: &str) -> String {
    COMPRESSION_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Final answer prompt: system instruction, accumulated context, question.
pub fn answer_prompt(context: Option<&str>, question: &str) -> String {
    format!(
        "System: {SYSTEM_PROMPT}\nHuman: Context:{} \n\nQuestion: {question}",
        context_or_sentinel(context)
    )
}

/// Condenses older context blocks when the thread exceeds its budget.
pub fn summary_prompt(context: &str) -> String {
    SUMMARY_TEMPLATE.replace("{context}", context)
}

/// A classification reply counts as "needs context" only when it is exactly
/// `yes` after trimming and lowercasing.
pub fn parse_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase() == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_parsing_table() {
        let cases = [
            ("Yes", true),
            (" yes ", true),
            ("YES", true),
            ("yes\n", true),
            ("no", false),
            ("", false),
            ("maybe", false),
            ("Yes.", false),
            ("yes, it does", false),
            ("y", false),
            ("No", false),
        ];
        for (reply, expected) in cases {
            assert_eq!(parse_affirmative(reply), expected, "reply {reply:?}");
        }
    }

    #[test]
    fn classify_prompt_uses_sentinel_without_context() {
        let prompt = classify_prompt(None, "What is Rust?");
        assert!(prompt.contains("Existing Context: No context available"));
        assert!(prompt.contains("New Question: What is Rust?"));

        let blank = classify_prompt(Some("   "), "q");
        assert!(blank.contains(NO_CONTEXT));
    }

    #[test]
    fn classify_prompt_embeds_existing_context() {
        let prompt = classify_prompt(Some("Paris is in France. (Source: wiki)"), "q");
        assert!(prompt.contains("Existing Context: Paris is in France. (Source: wiki)"));
        assert!(!prompt.contains(NO_CONTEXT));
    }

    #[test]
    fn compression_prompt_keeps_citation_instruction() {
        let prompt = compression_prompt("fact (Source: a)", "why?");
        assert!(prompt.contains("Context: fact (Source: a)"));
        assert!(prompt.contains("Question: why?"));
        assert!(prompt.contains("DO NOT remove the original source information"));
    }

    #[test]
    fn answer_prompt_layout() {
        let prompt = answer_prompt(Some("ctx"), "question?");
        assert!(prompt.starts_with("System: You are a helpful assistant"));
        assert!(prompt.contains("(Source: Internal Knowledge)"));
        assert!(prompt.ends_with("Human: Context:ctx \n\nQuestion: question?"));

        let empty = answer_prompt(None, "question?");
        assert!(empty.ends_with("Context:No context available \n\nQuestion: question?"));
    }

    #[test]
    fn summary_prompt_embeds_context() {
        let prompt = summary_prompt("a (Source: x)");
        assert!(prompt.contains("Context: a (Source: x)"));
    }
}
