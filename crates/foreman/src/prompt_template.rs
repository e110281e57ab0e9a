use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Render an inline tera template against any serializable context
pub fn render_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    // Prompts are plain text, not HTML
    tera.autoescape_on(vec![]);
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    tera.render("inline_template", &context)
}
