use std::sync::OnceLock;

use super::schema::render_schema_contract;

/// Template used when the caller does not pick one.
pub const DEFAULT_TEMPLATE_SLUG: &str = "startup";

/// Longest accepted template slug.
pub const MAX_TEMPLATE_SLUG_CHARS: usize = 64;

/// Sections requested per page.
pub const MIN_SECTIONS: usize = 3;
pub const MAX_SECTIONS: usize = 5;

const SYSTEM_PROMPT_HEADER: &str = r#"
You are a website specification generator. Your ONLY role is to convert a
short description of a website into a site specification document.

RULES:
1. Output ONLY a single JSON object. No prose, no explanations, no Markdown fences.
2. The JSON MUST follow the schema below exactly. Use the given key names.
3. Every section "kind" MUST be one of the listed kinds. Never invent new kinds.
4. Every section "id" must be unique within its page.
5. Every page "slug" must be unique. The first page is the home page with slug "index".
6. Write all copy (titles, descriptions, button text) in the language of the request.

SCHEMA:
"#;

/// Fixed system instruction, including the full section schema contract.
///
/// Rendered once from the schema registry so the two cannot drift apart.
pub fn system_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(|| format!("{SYSTEM_PROMPT_HEADER}{}", render_schema_contract()))
}

/// Pick the template slug for a request.
///
/// Slugs are embedded in the prompt, so only `[a-z0-9-]` up to
/// `MAX_TEMPLATE_SLUG_CHARS` is accepted. Absent, blank or invalid input
/// selects the default.
pub fn resolve_template_slug(requested: Option<&str>) -> &str {
    match requested.map(str::trim) {
        Some(slug) if is_valid_slug(slug) => slug,
        Some(slug) if !slug.is_empty() => {
            tracing::warn!(
                slug_chars = slug.chars().count(),
                "Rejected template slug; using default"
            );
            DEFAULT_TEMPLATE_SLUG
        }
        _ => DEFAULT_TEMPLATE_SLUG,
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_TEMPLATE_SLUG_CHARS
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Build the per-request instruction.
pub fn build_user_prompt(user_prompt: &str, template_slug: &str) -> String {
    let request = strip_control_chars(user_prompt.trim());
    format!(
        r#"<request>
{request}
</request>

Create a site specification for the request above.
Use "{template_slug}" as the templateSlug.
Each page should have between {MIN_SECTIONS} and {MAX_SECTIONS} sections.
Respond with the JSON object only."#
    )
}

/// Drop control characters other than newline and tab.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
