/// Strips one layer of markdown code fences (```json ... ``` or ``` ... ```) from LLM output.
///
/// The opening and closing fences are handled independently, so a response with only one
/// of them is still cleaned. Already-clean text passes through unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
