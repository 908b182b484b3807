//! Prompt assembly for the completion call.

use crate::chat::ChatMessage;

/// Assemble the final message sequence for the model.
///
/// Prepends a single system message built from the context block followed by
/// the persona instruction (context first, persona after — kept consistent
/// with the deployed behavior). The caller's history is appended unchanged;
/// a caller-supplied leading system message is not merged, so the assembled
/// sequence may legitimately contain two consecutive system entries.
pub fn assemble(persona: &str, context_block: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(format!("{}{}", context_block, persona)));
    messages.extend_from_slice(history);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_system_message_is_always_first() {
        let history = vec![
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ];
        let messages = assemble("persona", "context\n", &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "context\npersona");
        assert_eq!(messages[1].content, "question");
        assert_eq!(messages[2].content, "answer");
    }

    #[test]
    fn test_empty_context_leaves_persona_only() {
        let messages = assemble("persona", "", &[ChatMessage::user("q")]);
        assert_eq!(messages[0].content, "persona");
    }

    #[test]
    fn test_caller_system_message_is_kept_not_merged() {
        let history = vec![
            ChatMessage::system("caller rules"),
            ChatMessage::user("question"),
        ];
        let messages = assemble("persona", "", &history);

        // Two consecutive system entries are expected, not an error.
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "persona");
        assert_eq!(messages[1].role, Role::System);
        assert_eq!(messages[1].content, "caller rules");
    }

    #[test]
    fn test_input_history_is_not_mutated() {
        let history = vec![ChatMessage::user("question")];
        let _ = assemble("persona", "ctx", &history);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "question");
    }
}
