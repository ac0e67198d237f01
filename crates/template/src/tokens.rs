//! Literal `{{TOKEN}}` substitution

use crate::binding::{require_binding, value_to_f64, value_to_string};
use crate::format::format_currency;
use crate::Result;
use log::debug;
use serde_json::Value;

/// How a bound value is rendered into its token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Strings verbatim, numbers in their JSON form, null as empty
    Text,
    /// Coerced to a number and formatted with two decimals
    Currency,
}

/// A token and the data path that fills it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBinding {
    /// Token name without braces, e.g. `YEAR`
    pub token: &'static str,
    /// Binding expression, e.g. `$.employer.name`
    pub path: &'static str,
    pub kind: TokenKind,
}

impl TokenBinding {
    pub const fn text(token: &'static str, path: &'static str) -> Self {
        Self {
            token,
            path,
            kind: TokenKind::Text,
        }
    }

    pub const fn currency(token: &'static str, path: &'static str) -> Self {
        Self {
            token,
            path,
            kind: TokenKind::Currency,
        }
    }

    /// Look up and render this binding's value
    pub fn render(&self, data: &Value) -> Result<String> {
        let value = require_binding(self.path, data)?;
        Ok(match self.kind {
            TokenKind::Text => value_to_string(value),
            TokenKind::Currency => format_currency(value_to_f64(value)),
        })
    }
}

/// The marker for a token name: `YEAR` -> `{{YEAR}}`
pub fn marker(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Ordered token → replacement pairs
///
/// Replacements are applied in insertion order. Values are inserted as-is;
/// nothing is HTML-escaped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenTable {
    entries: Vec<(String, String)>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every binding eagerly; the first missing value is an error
    pub fn from_bindings(bindings: &[TokenBinding], data: &Value) -> Result<Self> {
        let mut table = Self::new();
        for binding in bindings {
            table.insert(binding.token, binding.render(data)?);
        }
        Ok(table)
    }

    /// Add a token, replacing the value of an existing one with the same name
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(token, _)| token == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(token, _)| token == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Token names in application order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// Replace every occurrence of every token in `html`
    ///
    /// Tokens absent from the markup are left alone.
    pub fn apply(&self, html: &str) -> String {
        let mut output = html.to_string();
        for (name, value) in &self.entries {
            let token = marker(name);
            let count = output.matches(token.as_str()).count();
            if count > 0 {
                output = output.replace(token.as_str(), value);
            }
            debug!("Substituted {token} x{count}");
        }
        output
    }
}
