//! Query statements and `{{placeholder}}` expansion.
//!
//! A [`Statement`] keeps both the raw source text and the final text after
//! placeholder expansion, so errors and `explain` output can show the user
//! what was actually searched.

use std::sync::OnceLock;

use regex::Regex;

// ============================================================================
// Query File
// ============================================================================

/// The file a query is embedded in, source of placeholder values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFile {
    path: String,
}

impl QueryFile {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn filename(&self) -> String {
        match self.path.rfind('/') {
            Some(index) => self.path[index + 1..].to_string(),
            None => self.path.clone(),
        }
    }

    pub fn folder(&self) -> String {
        match self.path.rfind('/') {
            Some(index) => self.path[..=index].to_string(),
            None => "/".to_string(),
        }
    }

    pub fn root(&self) -> String {
        match self.path.find('/') {
            Some(index) => self.path[..=index].to_string(),
            None => "/".to_string(),
        }
    }

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "query.file.path" => Some(self.path.clone()),
            "query.file.filename" => Some(self.filename()),
            "query.file.folder" => Some(self.folder()),
            "query.file.root" => Some(self.root()),
            _ => None,
        }
    }
}

// ============================================================================
// Placeholder Expansion
// ============================================================================

/// Bound on the expansion loop. A placeholder whose value itself contains
/// placeholder syntax would otherwise expand forever.
pub const PLACEHOLDER_EXPANSION_LIMIT: usize = 10;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder pattern is valid"))
}

/// Expand `{{...}}` placeholders against the query file's metadata.
///
/// Expansion repeats until the text is stable or
/// [`PLACEHOLDER_EXPANSION_LIMIT`] passes have run; hitting the cap is
/// reported as a circular reference. Unknown placeholder names are errors
/// naming the property.
pub fn expand_placeholders(text: &str, file: &QueryFile) -> Result<String, String> {
    let mut current = text.to_string();

    for _ in 0..PLACEHOLDER_EXPANSION_LIMIT {
        if !current.contains("{{") {
            return Ok(current);
        }

        let mut unknown: Option<String> = None;
        let expanded = placeholder_regex()
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                let name = caps[1].trim().to_string();
                match file.property(&name) {
                    Some(value) => value,
                    None => {
                        unknown.get_or_insert(name);
                        caps[0].to_string()
                    }
                }
            })
            .to_string();

        if let Some(name) = unknown {
            return Err(format!("there is no property '{name}'"));
        }
        if expanded == current {
            // Unmatched braces that are not placeholder syntax; leave them.
            return Ok(expanded);
        }
        current = expanded;
    }

    Err("placeholder expansion did not settle: circular reference?".to_string())
}

// ============================================================================
// Statement
// ============================================================================

/// One logical instruction line of a query, after continuation-joining and
/// placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    raw: String,
    final_text: String,
}

impl Statement {
    #[must_use]
    pub fn new(raw: impl Into<String>, final_text: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            final_text: final_text.into(),
        }
    }

    /// The statement as the user wrote it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The statement after placeholder expansion; this is what gets parsed.
    pub fn text(&self) -> &str {
        &self.final_text
    }

    /// Text suitable for explain output: the raw form, with the expansion
    /// appended when it differs.
    pub fn explain_text(&self) -> String {
        if self.raw == self.final_text {
            self.raw.clone()
        } else {
            format!("{} =>\n{}", self.raw, self.final_text)
        }
    }
}
