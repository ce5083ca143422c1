//! Flattening a conversation into a single text prompt.

use crate::conversation::Turn;

/// The coding-assistant persona used when no other instruction is given.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a coding assistant. \
Provide detailed, step-by-step guidance for writing code, troubleshooting \
errors, and solving coding-related queries across multiple programming \
languages and frameworks. Respond concisely but with clarity, and ensure \
explanations are beginner-friendly where necessary, while also addressing \
more advanced questions.";

/// How much of the prior conversation is replayed in each prompt.
///
/// The current message is always included, regardless of the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HistoryWindow {
    /// Replay every prior turn.
    #[default]
    Unbounded,
    /// Replay at most this many of the most recent prior turns.
    MaxTurns(usize),
    /// Replay the most recent prior turns whose rendered text fits in this
    /// many characters. Older turns are dropped whole, never cut.
    MaxChars(usize),
}

/// Renders a system instruction and the conversation into one prompt:
///
/// ```text
/// <instruction>
///
/// User: <message>
/// Assistant: <reply>
/// ...
/// User: <current message>
/// Assistant:
/// ```
///
/// Failed turns replay their error message in the assistant's position, the
/// same text the user saw. Only a turn still waiting for its outcome
/// contributes a bare `User:` line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PromptAssembler {
    instruction: String,
    window: HistoryWindow,
}

impl Default for PromptAssembler {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptAssembler {
    /// Creates an assembler with an unbounded history window.
    #[inline]
    pub fn new<S: Into<String>>(instruction: S) -> Self {
        Self {
            instruction: instruction.into(),
            window: HistoryWindow::Unbounded,
        }
    }

    /// Sets the history window.
    #[inline]
    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    /// Returns the system instruction.
    #[inline]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns the history window.
    #[inline]
    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    /// Assembles the prompt for `message`, given the turns before it.
    pub fn assemble(&self, history: &[Turn], message: &str) -> String {
        let rendered: Vec<String> = history.iter().map(render_turn).collect();
        let kept = self.windowed(&rendered);

        let mut prompt = String::with_capacity(
            self.instruction.len()
                + kept.iter().map(String::len).sum::<usize>()
                + message.len()
                + 24,
        );
        prompt.push_str(&self.instruction);
        prompt.push_str("\n\n");
        for turn in kept {
            prompt.push_str(turn);
        }
        prompt.push_str("User: ");
        prompt.push_str(message);
        prompt.push_str("\nAssistant:");
        prompt
    }

    fn windowed<'a>(&self, rendered: &'a [String]) -> &'a [String] {
        let start = match self.window {
            HistoryWindow::Unbounded => 0,
            HistoryWindow::MaxTurns(max) => rendered.len().saturating_sub(max),
            HistoryWindow::MaxChars(max) => {
                let mut used = 0;
                let mut start = rendered.len();
                for turn in rendered.iter().rev() {
                    used += turn.chars().count();
                    if used > max {
                        break;
                    }
                    start -= 1;
                }
                start
            }
        };
        &rendered[start..]
    }
}

fn render_turn(turn: &Turn) -> String {
    match turn.assistant_text() {
        Some(text) => {
            format!("User: {}\nAssistant: {}\n", turn.user_text(), text)
        }
        None => format!("User: {}\n", turn.user_text()),
    }
}

#[cfg(test)]
mod tests {
    use codemate_model::{ModelError, ModelReply};

    use super::*;
    use crate::conversation::Transcript;

    fn transcript_of(items: &[(&str, Result<&str, ModelError>)]) -> Transcript {
        let mut transcript = Transcript::new();
        for (input, result) in items {
            transcript.append(input.to_string());
            let result = result.clone().map(ModelReply::with_text);
            transcript.complete_last(result.into());
        }
        transcript
    }

    #[test]
    fn test_empty_history() {
        let assembler = PromptAssembler::new("Be brief.");
        assert_eq!(
            assembler.assemble(&[], "How do I reverse a list in Python?"),
            "Be brief.\n\nUser: How do I reverse a list in Python?\nAssistant:"
        );
    }

    #[test]
    fn test_replays_history() {
        let mut transcript = transcript_of(&[
            ("Hi", Ok("Hello!")),
            ("Oops", Err(ModelError::server(500, "internal error"))),
        ]);
        transcript.append("In flight".to_owned());

        let assembler = PromptAssembler::new("Be brief.");
        let prompt = assembler.assemble(transcript.turns(), "Next");
        assert_eq!(
            prompt,
            "Be brief.\n\n\
             User: Hi\nAssistant: Hello!\n\
             User: Oops\nAssistant: Error: 500 - internal error\n\
             User: In flight\n\
             User: Next\nAssistant:"
        );
        // Same input, same bytes.
        assert_eq!(assembler.assemble(transcript.turns(), "Next"), prompt);
    }

    #[test]
    fn test_max_turns_window() {
        let transcript = transcript_of(&[
            ("one", Ok("1")),
            ("two", Ok("2")),
            ("three", Ok("3")),
        ]);
        let assembler = PromptAssembler::new("S")
            .with_window(HistoryWindow::MaxTurns(2));
        assert_eq!(
            assembler.assemble(transcript.turns(), "four"),
            "S\n\nUser: two\nAssistant: 2\nUser: three\nAssistant: 3\n\
             User: four\nAssistant:"
        );

        let assembler = PromptAssembler::new("S")
            .with_window(HistoryWindow::MaxTurns(0));
        assert_eq!(
            assembler.assemble(transcript.turns(), "four"),
            "S\n\nUser: four\nAssistant:"
        );
    }

    #[test]
    fn test_max_chars_window() {
        // Each rendered turn is "User: xxx\nAssistant: y\n", 23 chars.
        let transcript = transcript_of(&[
            ("one", Ok("1")),
            ("two", Ok("2")),
            ("six", Ok("6")),
        ]);
        let assembler = PromptAssembler::new("S")
            .with_window(HistoryWindow::MaxChars(50));
        assert_eq!(
            assembler.assemble(transcript.turns(), "now"),
            "S\n\nUser: two\nAssistant: 2\nUser: six\nAssistant: 6\n\
             User: now\nAssistant:"
        );

        let assembler = PromptAssembler::new("S")
            .with_window(HistoryWindow::MaxChars(10));
        assert_eq!(
            assembler.assemble(transcript.turns(), "now"),
            "S\n\nUser: now\nAssistant:"
        );
    }

    #[test]
    fn test_default_instruction() {
        let prompt = PromptAssembler::default().assemble(&[], "Hi");
        assert!(prompt.starts_with("You are a coding assistant. Provide"));
        assert!(prompt.contains("more advanced questions.\n\nUser: Hi\n"));
    }
}
