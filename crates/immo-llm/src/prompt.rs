// Prompt text and canned replies for the real-estate chat.

/// Words that get the canned greeting instead of an API call.
const GREETINGS: &[&str] = &["hi", "hello", "hey", "howdy", "hola", "greetings"];

pub const GREETING_REPLY: &str =
    "Hello! How can I assist you with your real estate needs today? \u{1F60A}";

/// Appended when the model stopped at the token limit.
pub const TRUNCATION_NOTE: &str = "[Response truncated due to token limit]";

/// Return the static system prompt for every chat completion.
pub fn system_prompt() -> String {
    "You are a real estate expert with knowledge about properties and cities in Switzerland. \
     Your knowledge is limited to real estate matters and Swiss cities, their property prices, \
     and related services. Do not provide any information about yourself or any general \
     knowledge outside of real estate. When asked about yourself, respond by stating that you \
     are an AI chatbot for real estate queries in Switzerland."
        .to_string()
}

/// Whether the query is a greeting that deserves the canned reply.
///
/// Matches whole words only, so "which" or "they" do not count as greetings.
pub fn is_greeting(query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETINGS.contains(&word))
}

/// The message shown when the answer could not be produced.
pub fn apology(error: &str) -> String {
    format!("Sorry, I couldn't process your request. Error: {error}")
}

/// Final answer text, with a note when the model hit the token limit.
pub fn finish_answer(full_text: String, finish_reason: Option<&str>) -> String {
    if finish_reason == Some("length") {
        format!("{full_text}\n\n{TRUNCATION_NOTE}")
    } else {
        full_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_contains_key_elements() {
        let prompt = system_prompt();
        assert!(prompt.contains("real estate expert"));
        assert!(prompt.contains("Switzerland"));
        assert!(prompt.contains("AI chatbot"));
    }

    #[test]
    fn greetings_are_detected_case_insensitively() {
        assert!(is_greeting("Hi"));
        assert!(is_greeting("  HELLO there "));
        assert!(is_greeting("hey, any flats in Bern?"));
        assert!(is_greeting("Greetings!"));
    }

    #[test]
    fn greeting_words_inside_other_words_do_not_count() {
        assert!(!is_greeting("which city is cheapest?"));
        assert!(!is_greeting("they sell chalets"));
        assert!(!is_greeting("Show me a villa in Thun"));
        assert!(!is_greeting(""));
    }

    #[test]
    fn apology_includes_error() {
        assert_eq!(
            apology("timeout"),
            "Sorry, I couldn't process your request. Error: timeout"
        );
    }

    #[test]
    fn finish_answer_marks_truncation() {
        assert_eq!(finish_answer("abc".into(), Some("stop")), "abc");
        assert_eq!(finish_answer("abc".into(), None), "abc");
        assert_eq!(
            finish_answer("abc".into(), Some("length")),
            format!("abc\n\n{TRUNCATION_NOTE}")
        );
    }
}
