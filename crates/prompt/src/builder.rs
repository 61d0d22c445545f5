//! Prompt builder for rendering the answer template.

use pdfqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template used to ask the completion model for an answer grounded in a
/// single retrieved chunk.
pub const ANSWER_TEMPLATE: &str =
    "Answer the question based on the context below.\n\nContext:\n{{context}}\n\nQuestion: {{query}}\n\nAnswer:";

/// Build the answer prompt from retrieved context and the user's question.
///
/// Both values are inserted verbatim: no escaping, trimming or truncation.
/// An oversized context is passed through and left for the completion
/// service to reject.
///
/// # Example
/// ```
/// use pdfqa_prompt::build_prompt;
///
/// let prompt = build_prompt("Leave is 20 days.", "How much leave?").unwrap();
/// assert!(prompt.ends_with("Question: How much leave?\n\nAnswer:"));
/// ```
pub fn build_prompt(context: &str, query: &str) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("query".to_string(), query.to_string());

    let rendered = render_template(ANSWER_TEMPLATE, &variables)?;

    tracing::debug!(
        context_chars = context.chars().count(),
        prompt_chars = rendered.chars().count(),
        "Built answer prompt"
    );

    Ok(rendered)
}

/// Render a Handlebars template with variables.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompt, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
