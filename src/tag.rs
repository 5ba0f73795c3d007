//! Name and default tags.
//!
//! Both tags are comma-separated lists. A literal comma inside a token is
//! written `\,`; no other escape sequence exists, so any other backslash is
//! kept as-is.

use crate::error::EnvcfgError;

/// Split a tag on unescaped commas, unescaping `\,` in each token.
pub fn split_tag(tag: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = tag.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push(',');
            }
            ',' => tokens.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    tokens.push(current);
    tokens
}

/// Source keys and positional defaults for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    names: Vec<String>,
    defaults: Option<Vec<String>>,
}

impl FieldSpec {
    /// Parse a field's tags.
    ///
    /// Returns `Ok(None)` when the name tag is empty: the field is not a
    /// population target. A default tag must carry exactly one value per
    /// name.
    pub fn parse(env: &str, default: Option<&str>) -> Result<Option<Self>, EnvcfgError> {
        if env.is_empty() {
            return Ok(None);
        }
        let names = split_tag(env);
        let defaults = match default {
            Some(tag) => {
                let defaults = split_tag(tag);
                if defaults.len() != names.len() {
                    return Err(EnvcfgError::DefaultCountMismatch {
                        names: env.to_string(),
                        defaults: tag.to_string(),
                        name_count: names.len(),
                        default_count: defaults.len(),
                    });
                }
                Some(defaults)
            }
            None => None,
        };
        Ok(Some(Self { names, defaults }))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The default for the name at `index`, if a default tag was given.
    pub fn default_at(&self, index: usize) -> Option<&str> {
        self.defaults.as_ref()?.get(index).map(String::as_str)
    }

    /// Number of source keys, which is also the parser arity.
    pub fn arity(&self) -> usize {
        self.names.len()
    }
}
