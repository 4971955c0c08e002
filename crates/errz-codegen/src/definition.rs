use crate::error::{CodegenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Broad classification of an error, as enumerated by the definition schema
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Validation,
    Timeout,
    Business,
    External,
    Internal,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Validation,
        Category::Timeout,
        Category::Business,
        Category::External,
        Category::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Validation => "validation",
            Category::Timeout => "timeout",
            Category::Business => "business",
            Category::External => "external",
            Category::Internal => "internal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared error, as written in a definition file.
///
/// Only `domain`, `code`, `msg` and `cause` are needed by the generators; the
/// remaining metadata is optional here and made mandatory (or not) by the
/// schema the files are validated against.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct ErrorDefinition {
    #[serde(default)]
    pub domain: String,
    pub code: String,
    pub msg: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default)]
    pub is_retryable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ErrorDefinition {
    /// Minimal definition with just the fields the generators require
    pub fn new(
        domain: impl Into<String>,
        code: impl Into<String>,
        msg: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            code: code.into(),
            msg: msg.into(),
            cause: cause.into(),
            ..Default::default()
        }
    }
}

/// Every loaded definition, keyed by error code.
///
/// Iteration order is unspecified. Anything that needs a stable order goes
/// through [`DefinitionSet::sorted_codes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionSet {
    defs: HashMap<String, ErrorDefinition>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, refusing to replace an existing code.
    ///
    /// On a clash the rejected definition is handed back untouched.
    pub fn insert_unique(
        &mut self,
        code: impl Into<String>,
        def: ErrorDefinition,
    ) -> std::result::Result<(), ErrorDefinition> {
        use std::collections::hash_map::Entry;

        match self.defs.entry(code.into()) {
            Entry::Occupied(_) => Err(def),
            Entry::Vacant(slot) => {
                slot.insert(def);
                Ok(())
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&ErrorDefinition> {
        self.defs.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.defs.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Codes in byte-wise ascending order
    pub fn sorted_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// `(code, definition)` pairs in byte-wise code order
    pub fn sorted(&self) -> Vec<(&str, &ErrorDefinition)> {
        self.sorted_codes()
            .into_iter()
            .filter_map(|code| self.defs.get(code).map(|def| (code, def)))
            .collect()
    }

    /// Split the set into one group per domain.
    ///
    /// Fails on the first definition with an empty domain; such a
    /// definition cannot be placed in the documentation tree. Domains that
    /// lower-case to the same name are rejected too, since their pages
    /// would be written to the same path.
    pub fn partition_by_domain(&self) -> Result<BTreeMap<String, DefinitionSet>> {
        let mut groups: BTreeMap<String, DefinitionSet> = BTreeMap::new();

        for (code, def) in self.sorted() {
            if def.domain.is_empty() {
                return Err(CodegenError::EmptyDomain {
                    code: code.to_string(),
                });
            }
            groups
                .entry(def.domain.clone())
                .or_default()
                .defs
                .insert(code.to_string(), def.clone());
        }

        let mut folded: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for domain in groups.keys() {
            folded
                .entry(domain.to_lowercase())
                .or_default()
                .push(domain.clone());
        }
        if let Some((name, domains)) = folded.into_iter().find(|(_, d)| d.len() > 1) {
            return Err(CodegenError::DomainCollision { name, domains });
        }

        Ok(groups)
    }
}

impl FromIterator<(String, ErrorDefinition)> for DefinitionSet {
    fn from_iter<I: IntoIterator<Item = (String, ErrorDefinition)>>(iter: I) -> Self {
        Self {
            defs: iter.into_iter().collect(),
        }
    }
}
