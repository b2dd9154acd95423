//! Prompt construction for the three exchange kinds: direct chat,
//! timer-driven intervention, and completion celebration.

use std::time::Duration;

/// The persona sent as the system instruction on every conversational call.
pub const PERSONA: &str = "You are a friendly AI study partner watching over a user \
working through problems in their notebook. When the user goes quiet you check in on \
them, but you must never reveal the answer. Probe how they are doing ('How is it \
going?', 'Does the problem statement make sense?') and hand out small hints that \
restart their thinking. Keep every reply short, one or two sentences.";

/// Builds the prompt delivered when the study timer fires.
pub fn intervention_prompt(problem_text: &str, duration: Duration) -> String {
    format!(
        "[System report] The user started working on the problem below {} seconds ago \
and has not pressed the complete button. The silence continues. Check in on them with \
a short prompt that restarts their thinking. Do not reveal the answer.\n\n\
[Problem]\n{}",
        duration.as_secs(),
        problem_text
    )
}

/// Builds the prompt delivered when the user completes their problem.
pub fn completion_prompt() -> String {
    "[System report] The user has just finished solving their problem! Celebrate with \
them and offer a few words of encouragement."
        .to_string()
}
