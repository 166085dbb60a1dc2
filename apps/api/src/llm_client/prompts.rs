// Shared prompt fragments and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// Output contract appended to every system prompt that expects structured data.
pub const JSON_ONLY_RULES: &str = "\
Always respond with valid JSON only, no markdown, no explanation.
If a field cannot be determined, use null for numbers and empty string for strings.";

/// Builds a structured-output system prompt: a role description followed by the JSON rules.
pub fn json_system_prompt(role: &str) -> String {
    format!("{}\n{JSON_ONLY_RULES}", role.trim_end())
}

/// Fills `{name}` placeholders in a prompt template in a single pass.
/// Substituted values are never re-scanned, so user text containing `{...}` stays literal.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values
            .iter()
            .find(|(name, _)| tail.starts_with(name) && tail[name.len()..].starts_with('}'));
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
