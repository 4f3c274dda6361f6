//! Prompt templates for question rewriting and answer synthesis.

/// Asks the model to turn a follow-up into a self-contained question.
pub const STANDALONE_QUESTION_PROMPT: &str = "Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

/// Answers a standalone question from retrieved context alone.
pub const STANDALONE_ANSWER_PROMPT: &str = "Answer the question based only on the following context:
{context}

Question: {question}";

/// Answers a question from the transcript plus retrieved context.
pub const CONTEXTUAL_ANSWER_PROMPT: &str = "Given the following chat history, context, and question please answer the question based only on the following context:

Chat History:
{chat_history}

Context:
{context}

Question: {question}";

/// Substitute `{name}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so braces inside a question or
/// retrieved chunk are left alone.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match replaced {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn standalone_question(chat_history: &str, question: &str) -> String {
    render(
        STANDALONE_QUESTION_PROMPT,
        &[("chat_history", chat_history), ("question", question)],
    )
}

pub fn standalone_answer(context: &str, question: &str) -> String {
    render(
        STANDALONE_ANSWER_PROMPT,
        &[("context", context), ("question", question)],
    )
}

pub fn contextual_answer(chat_history: &str, context: &str, question: &str) -> String {
    render(
        CONTEXTUAL_ANSWER_PROMPT,
        &[
            ("chat_history", chat_history),
            ("context", context),
            ("question", question),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_question_prompt() {
        let prompt = standalone_question("\nuser: What is X?\nassistant: A widget.", "Price?");
        assert!(prompt.starts_with("Given the following conversation"));
        assert!(prompt.contains("Chat History:\n\nuser: What is X?\nassistant: A widget.\n"));
        assert!(prompt.ends_with("Follow Up Input: Price?\nStandalone question:"));
    }

    #[test]
    fn test_contextual_answer_prompt() {
        let prompt = contextual_answer("\nuser: hi\nassistant: hello", "ctx", "q?");
        assert!(prompt.contains("Chat History:\n\nuser: hi\nassistant: hello\n\nContext:\nctx\n\nQuestion: q?"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let prompt = standalone_answer("{question}", "what is {x}?");
        assert_eq!(
            prompt,
            "Answer the question based only on the following context:\n{question}\n\nQuestion: what is {x}?"
        );
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(render("a {b} {c", &[("x", "y")]), "a {b} {c");
    }
}
