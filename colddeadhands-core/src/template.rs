use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::{GeneratorError, Result};

/// Errors raised while filling in a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no value for placeholder '{name}' on line {line}")]
    MissingPlaceholder { name: String, line: usize },

    #[error("unclosed placeholder on line {line}")]
    UnclosedPlaceholder { line: usize },

    #[error("unmatched '}}' on line {line}")]
    UnmatchedBrace { line: usize },

    #[error("empty placeholder on line {line}")]
    EmptyPlaceholder { line: usize },
}

/// Named values for one template.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replace every `{name}` in `text` with its value. `{{` and `}}` produce
/// literal braces. Substituted values are not scanned again.
pub fn render_template(
    text: &str,
    subs: &Substitutions,
) -> std::result::Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(TemplateError::UnmatchedBrace { line }),
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | Some('\n') | None => {
                            return Err(TemplateError::UnclosedPlaceholder { line })
                        }
                        Some(ch) => name.push(ch),
                    }
                }
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder { line });
                }
                match subs.get(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::MissingPlaceholder { name, line }),
                }
            }
            '\n' => {
                line += 1;
                out.push('\n');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Render a named template, wrapping failures with the template's name.
pub fn render_named(name: &str, text: &str, subs: &Substitutions) -> Result<String> {
    render_template(text, subs).map_err(|source| GeneratorError::Template {
        template: name.to_string(),
        source,
    })
}

pub fn load_template(dir: &Path, file_name: &str) -> Result<String> {
    let path = dir.join(file_name);
    if !path.exists() {
        return Err(GeneratorError::Config(format!(
            "Template does not exist: {}",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}
