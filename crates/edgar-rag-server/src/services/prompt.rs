/// Formats a matched filing excerpt and a question into the fixed completion
/// prompt. Pure template substitution: identical inputs produce
/// byte-identical output.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "From the 10-K excerpt below:\n\n{context}\n\nCan you paraphrase an answer to the following question: {question}\n\nAnswer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_context_then_question() {
        let prompt = build_prompt("context X", "What risks?");
        let context_at = prompt.find("context X").unwrap();
        let question_at = prompt.find("What risks?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(
            build_prompt("context X", "What risks?"),
            build_prompt("context X", "What risks?")
        );
    }
}
