use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPush {
    pub title: String,
    pub body: String,
}

/// Closed set of known templates. Unknown codes route to `Fallback`;
/// resolution degrades, it never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Welcome,
    Fallback,
}

impl TemplateKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "welcome" => TemplateKind::Welcome,
            _ => TemplateKind::Fallback,
        }
    }

    pub fn render_email(&self, variables: &HashMap<String, Value>) -> RenderedEmail {
        let subject =
            string_var(variables, "subject").unwrap_or_else(|| "Notification".to_string());

        let body = match self {
            TemplateKind::Welcome => format!(
                "<h1>Welcome {}</h1><p>Visit: {}</p>",
                string_var(variables, "name").unwrap_or_default(),
                string_var(variables, "link").unwrap_or_default(),
            ),
            TemplateKind::Fallback => format!(
                "<p>{}</p>",
                string_var(variables, "body").unwrap_or_else(|| "Hello".to_string())
            ),
        };

        RenderedEmail { subject, body }
    }

    /// Push content is variables-driven for every kind; the kind only
    /// differentiates email bodies.
    pub fn render_push(&self, variables: &HashMap<String, Value>) -> RenderedPush {
        let title = string_var(variables, "title").unwrap_or_else(|| "Notification".to_string());

        let body = string_var(variables, "body")
            .or_else(|| string_var(variables, "message"))
            .unwrap_or_else(|| "You have a notification".to_string());

        RenderedPush { title, body }
    }
}

/// Coerces a variable to text. Strings, numbers, and booleans render;
/// anything else reads as absent.
fn string_var(variables: &HashMap<String, Value>, key: &str) -> Option<String> {
    match variables.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn welcome_email_renders_name_and_link() {
        let variables = vars(&[
            ("name", Value::from("Ana")),
            ("link", Value::from("http://x")),
            ("subject", Value::from("Hi")),
        ]);

        let rendered = TemplateKind::from_code("welcome").render_email(&variables);

        assert_eq!(rendered.subject, "Hi");
        assert_eq!(rendered.body, "<h1>Welcome Ana</h1><p>Visit: http://x</p>");
    }

    #[test]
    fn unknown_code_falls_back_without_error() {
        let variables = vars(&[("body", Value::from("order shipped"))]);

        let rendered = TemplateKind::from_code("no-such-template").render_email(&variables);

        assert_eq!(rendered.subject, "Notification");
        assert_eq!(rendered.body, "<p>order shipped</p>");
    }

    #[test]
    fn fallback_email_defaults_to_hello() {
        let rendered = TemplateKind::Fallback.render_email(&HashMap::new());

        assert_eq!(rendered.body, "<p>Hello</p>");
    }

    #[test]
    fn missing_welcome_variables_render_empty() {
        let rendered = TemplateKind::Welcome.render_email(&HashMap::new());

        assert_eq!(rendered.subject, "Notification");
        assert_eq!(rendered.body, "<h1>Welcome </h1><p>Visit: </p>");
    }

    #[test]
    fn push_defaults_apply() {
        let rendered = TemplateKind::from_code("welcome").render_push(&HashMap::new());

        assert_eq!(rendered.title, "Notification");
        assert_eq!(rendered.body, "You have a notification");
    }

    #[test]
    fn push_body_prefers_body_over_message() {
        let variables = vars(&[
            ("body", Value::from("primary")),
            ("message", Value::from("secondary")),
        ]);

        let rendered = TemplateKind::Fallback.render_push(&variables);
        assert_eq!(rendered.body, "primary");

        let only_message = vars(&[("message", Value::from("secondary"))]);
        let rendered = TemplateKind::Fallback.render_push(&only_message);
        assert_eq!(rendered.body, "secondary");
    }

    #[test]
    fn numeric_variables_coerce_to_text() {
        let variables = vars(&[("body", Value::from(42))]);

        let rendered = TemplateKind::Fallback.render_push(&variables);
        assert_eq!(rendered.body, "42");
    }
}
