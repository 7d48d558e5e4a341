//! Markdown rendering for session transcripts and the title request.

use crate::core::message::History;

/// Section divider: a level-two heading surrounded by blank lines.
pub fn section(name: &str) -> String {
    format!("\n\n## {name}\n\n")
}

fn header(title: &str, timestamp: &str) -> String {
    format!("# {title}\n\n{timestamp}")
}

/// Transcript of a single prompt/response exchange.
pub fn render_one_shot(
    title: &str,
    timestamp: &str,
    prompt: &str,
    response: &str,
    system_prompt: &str,
) -> String {
    let mut content = header(title, timestamp);
    content.push_str(&section("prompt"));
    content.push_str(prompt);
    content.push_str(&section("response"));
    content.push_str(response);
    content.push_str(&section("system"));
    content.push_str(system_prompt);
    content
}

/// Transcript of an interactive conversation.
pub fn render_chat(title: &str, timestamp: &str, history: &History) -> String {
    let mut content = header(title, timestamp);
    content.push_str(&section("chat conversation"));
    content.push_str(&history.conversation_text());
    content.push_str(&section("system"));
    content.push_str(history.system_prompt());
    content
}

/// User message sent to the title persona.
pub fn title_request(history: &History) -> String {
    let mut request = section("system");
    request.push_str(history.system_prompt());
    request.push_str(&section("prompt"));
    request.push_str(&history.conversation_text());
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_sections_are_ordered() {
        let rendered = render_one_shot(
            "ping-pong",
            "2024-01-02--03-04-05-+0000",
            "ping",
            "pong",
            "You are Archie.",
        );
        assert_eq!(
            rendered,
            "# ping-pong\n\n2024-01-02--03-04-05-+0000\n\n## prompt\n\nping\n\n## response\n\npong\n\n## system\n\nYou are Archie."
        );
    }

    #[test]
    fn chat_transcript_lists_turns_then_system() {
        let mut history = History::new("You are Archie.");
        history.push_user("hello");
        history.push_assistant("hi there");

        let rendered = render_chat("greeting", "ts", &history);
        assert_eq!(
            rendered,
            "# greeting\n\nts\n\n## chat conversation\n\nuser:\nhello\n\nassistant:\nhi there\n\n\n\n## system\n\nYou are Archie."
        );
    }

    #[test]
    fn title_request_includes_system_and_conversation() {
        let mut history = History::new("You are Archie.");
        history.push_user("ping");
        history.push_assistant("pong");

        assert_eq!(
            title_request(&history),
            "\n\n## system\n\nYou are Archie.\n\n## prompt\n\nuser:\nping\n\nassistant:\npong\n\n"
        );
    }
}
