//! Prompt template wrapped around every user message

/// Fixed instructions placed before the user's query
const INSTRUCTIONS: &str = "
Respond to the user's query in this format:

[Natural Language Explanation]
{Optional Code Block (only if code examples are necessary)}
{Optional Formula (only for mathematical/scientific content)}

Follow these rules:
1. Use code blocks ONLY for executable code examples, never for text/descriptions
2. Use LaTeX ONLY for equations/formulas, not for text formatting
3. Prioritize clear text explanations unless technical precision is required
4. Avoid code/formulas for simple questions
";

/// Build the prompt sent upstream for `message`
///
/// The message is embedded verbatim; only the `Query:` line is user-controlled.
pub fn build_prompt(message: &str) -> String {
    format!("{INSTRUCTIONS}\nQuery: {message}\n")
}
