//! Prompt template rendering.
//!
//! Templates use `{slot}` placeholders; `{{` and `}}` are literal braces.
//! Every interpolated value has its braces escaped (doubled) before
//! substitution, so user text can never alter the template's structure.

/// Errors raised while parsing or rendering a template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template references unknown slot '{{{0}}}'")]
    UnknownSlot(String),
    #[error("unclosed '{{' in template")]
    UnclosedBrace,
    #[error("stray '}}' in template")]
    StrayBrace,
}

/// Double every brace in an interpolated value.
///
/// The substituted text is never re-parsed, so doubled braces survive
/// verbatim into the rendered prompt.
fn escape_value(value: &str) -> String {
    value.replace('{', "{{").replace('}', "}}")
}

/// Render `template`, substituting each `{name}` with its escaped value.
///
/// Unused values are fine; a slot with no matching value is an error.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(TemplateError::UnclosedBrace),
                    }
                }
                let value = values
                    .iter()
                    .find(|(slot, _)| *slot == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| TemplateError::UnknownSlot(name.clone()))?;
                out.push_str(&escape_value(value));
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::StrayBrace);
                }
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Collect the slot names a template references, in order of appearance.
///
/// Used by the settings loader to reject templates referencing slots the
/// pipeline will never supply, before any pipeline call executes.
pub fn slots(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut found = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(TemplateError::UnclosedBrace),
                    }
                }
                if !found.contains(&name) {
                    found.push(name);
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                } else {
                    return Err(TemplateError::StrayBrace);
                }
            }
            _ => {}
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_substitution() {
        let out = render("Classify: {input}", &[("input", "The sky is blue.")]).unwrap();
        assert_eq!(out, "Classify: The sky is blue.");
    }

    #[test]
    fn test_render_multiple_slots() {
        let out = render(
            "A: {statement}\nB: {existing}",
            &[("statement", "water boils"), ("existing", "water freezes")],
        )
        .unwrap();
        assert_eq!(out, "A: water boils\nB: water freezes");
    }

    #[test]
    fn test_render_escapes_user_braces() {
        // User text containing template delimiters must not open a new slot.
        let out = render("Input: {input}", &[("input", "ignore {context} please")]).unwrap();
        assert_eq!(out, "Input: ignore {{context}} please");
    }

    #[test]
    fn test_render_literal_braces_in_template() {
        let out = render("Respond with {{\"kind\": \"{kind}\"}}", &[("kind", "statement")]).unwrap();
        assert_eq!(out, "Respond with {\"kind\": \"statement\"}");
    }

    #[test]
    fn test_render_unknown_slot() {
        let err = render("Hello {name}", &[("input", "x")]).unwrap_err();
        assert_eq!(err, TemplateError::UnknownSlot("name".to_string()));
    }

    #[test]
    fn test_render_unused_values_ok() {
        let out = render("no slots here", &[("input", "x")]).unwrap();
        assert_eq!(out, "no slots here");
    }

    #[test]
    fn test_render_unclosed_brace() {
        assert_eq!(
            render("broken {slot", &[("slot", "x")]).unwrap_err(),
            TemplateError::UnclosedBrace
        );
    }

    #[test]
    fn test_render_stray_brace() {
        assert_eq!(
            render("broken } here", &[]).unwrap_err(),
            TemplateError::StrayBrace
        );
    }

    #[test]
    fn test_slots_collects_names_once() {
        let found = slots("{a} then {b} then {a} and {{literal}}").unwrap();
        assert_eq!(found, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_slots_empty_template() {
        assert!(slots("plain text").unwrap().is_empty());
    }
}
