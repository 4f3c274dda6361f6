use crate::rag::generator::Generator;
use crate::types::{Conversation, Result, Turn};

/// A conversation bound to a generator.
///
/// Each answered question is appended to the history, so follow-ups are
/// resolved against everything said before them.
pub struct RagSession {
    generator: Generator,
    conversation: Conversation,
}

impl RagSession {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            conversation: Conversation::new(),
        }
    }

    /// Resume with an existing history.
    pub fn with_history(generator: Generator, conversation: Conversation) -> Self {
        Self {
            generator,
            conversation,
        }
    }

    /// Answer `question` and record the exchange.
    ///
    /// Contained failures are recorded like any other answer.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let answer = self
            .generator
            .answer_user_question(question, self.conversation.turns())
            .await?;
        self.conversation.push(Turn::new(question, answer.clone()));
        Ok(answer)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Answered turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}
