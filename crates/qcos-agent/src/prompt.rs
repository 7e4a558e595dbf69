use qcos_core::QcosError;

const METAPROGRAMMING_SYSTEM_INSTRUCTION: &str = "\
You are Agent Q, a metaprogramming assistant that edits the source code of \
the QCOS dashboard. You receive a file path, the file's current content, and \
a modification request. Return ONLY the full, updated content of the file: \
no explanations, no Markdown code fences, no text outside the file content.";

/// System instruction used for schema-constrained JSON completions.
pub const STRUCTURED_SYSTEM_INSTRUCTION: &str = "\
Respond with a single JSON value that conforms to the requested schema. \
Do not wrap it in Markdown and do not add commentary.";

/// Build the system instruction for file rewrites.
///
/// # Examples
///
/// ```
/// use qcos_agent::prompt::build_metaprogramming_system_prompt;
///
/// let prompt = build_metaprogramming_system_prompt();
/// assert!(prompt.contains("ONLY the full, updated content"));
/// ```
pub fn build_metaprogramming_system_prompt() -> String {
    METAPROGRAMMING_SYSTEM_INSTRUCTION.to_string()
}

/// Build the user prompt asking for a rewrite of `path`.
///
/// # Examples
///
/// ```
/// use qcos_agent::prompt::build_patch_prompt;
///
/// let prompt = build_patch_prompt("App.tsx", "add a title", "<div/>");
/// assert!(prompt.contains("File to modify: App.tsx"));
/// assert!(prompt.contains("<div/>"));
/// ```
pub fn build_patch_prompt(path: &str, request: &str, content: &str) -> String {
    format!(
        "File to modify: {path}\n\nModification request: \"{request}\"\n\n---\n\n\
         CURRENT FILE CONTENT:\n\n{content}"
    )
}

/// Turn a rewrite response into file content: drop a surrounding code fence
/// and trim.
pub fn clean_patch_response(response: &str) -> String {
    strip_code_fences(response).trim().to_string()
}

/// Parse a model response as JSON, tolerating a surrounding code fence.
///
/// # Errors
///
/// Returns [`QcosError::Llm`] when the text is not valid JSON.
///
/// # Examples
///
/// ```
/// use qcos_agent::prompt::parse_json_response;
///
/// let value = parse_json_response("```json\n{\"ok\": true}\n```").unwrap();
/// assert_eq!(value["ok"], true);
/// ```
pub fn parse_json_response(response: &str) -> Result<serde_json::Value, QcosError> {
    let cleaned = strip_code_fences(response);
    serde_json::from_str(cleaned)
        .map_err(|e| QcosError::Llm(format!("model returned malformed JSON: {e}")))
}

/// Strip one Markdown code fence (with an optional info string such as
/// `tsx` or `json`) from around `s`. Text without a complete fence is
/// returned trimmed.
pub fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    match inner.split_once('\n') {
        Some((info, body)) if !info.trim().contains(char::is_whitespace) => body.trim_end(),
        _ => inner.trim(),
    }
}
