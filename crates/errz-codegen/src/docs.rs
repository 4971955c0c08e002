//! Markdown reference pages, one per domain.

use crate::definition::{DefinitionSet, ErrorDefinition};
use crate::error::{CodegenError, Result};
use dashmap::DashMap;
use std::fmt::Write;
use std::sync::Arc;

/// Characters that would make a domain unusable as a directory name
const DOMAIN_FORBIDDEN: &[char] = &[' ', '.', '/', '\\'];

/// Memoized domain → Markdown title header.
///
/// Safe to share between concurrently running doc generations. The cached
/// value is always identical to [`normalize_title`] for the same key.
#[derive(Debug, Default)]
pub struct TitleCache {
    titles: DashMap<String, Arc<str>>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the header for `domain`, computing it on first use
    pub fn get_or_normalize(&self, domain: &str) -> Arc<str> {
        if let Some(cached) = self.titles.get(domain) {
            return Arc::clone(cached.value());
        }

        let title: Arc<str> = normalize_title(domain).into();
        Arc::clone(
            self.titles
                .entry(domain.to_string())
                .or_insert(title)
                .value(),
        )
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Drop every cached title. Only needed to isolate tests.
    pub fn clear(&self) {
        self.titles.clear();
    }
}

/// Format a domain as a level-one Markdown header.
///
/// Each `-`-separated part is lower-cased and its first character
/// upper-cased: `order-PAYMENT` becomes `# Order-Payment Errors\n\n`.
/// Empty parts are kept as-is so the separators survive.
pub fn normalize_title(domain: &str) -> String {
    let parts: Vec<String> = domain
        .split('-')
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => {
                    let mut title = String::with_capacity(lower.len());
                    title.push(upper_single(first));
                    title.extend(chars);
                    title
                }
                None => String::new(),
            }
        })
        .collect();

    format!("# {} Errors\n\n", parts.join("-"))
}

/// Upper-case mapping of `c` when it is a single code point, else `c`.
///
/// Characters such as `ß` upper-case to more than one code point; those
/// are left alone so a title never grows.
fn upper_single(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Escape text for a Markdown table cell
pub fn escape_inline(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escape text for a Markdown paragraph or list item
pub fn escape_block(text: &str) -> String {
    text.replace('`', "\\`")
}

/// Wrap `text` in a Markdown code span.
///
/// The fence is one backtick longer than the longest backtick run inside
/// `text`, with padding when `text` starts or ends with a backtick.
pub fn code_span(text: &str) -> String {
    let longest = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

/// Reject domains that are empty, blank or unsafe as a path component
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.trim().is_empty() || domain.contains(DOMAIN_FORBIDDEN) {
        return Err(CodegenError::InvalidDomainName {
            domain: domain.to_string(),
        });
    }
    Ok(())
}

/// Generates the Markdown page for one domain.
///
/// Clones share one [`TitleCache`].
#[derive(Debug, Clone, Default)]
pub struct DocGenerator {
    titles: Arc<TitleCache>,
}

impl DocGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the page for `domain`, with `defs` already scoped to it
    pub fn generate(&self, domain: &str, defs: &DefinitionSet) -> Result<String> {
        validate_domain(domain)?;
        if defs.is_empty() {
            return Err(CodegenError::NoDefinitions);
        }

        let sorted = defs.sorted();

        // header + rows + details, roughly 300 bytes per error
        let mut out = String::with_capacity(500 + sorted.len() * 300);
        out.push_str(&self.titles.get_or_normalize(domain));

        out.push_str("| Code | Message |\n");
        out.push_str("|:-----:|:-----------:|\n");
        for (_, def) in &sorted {
            let _ = writeln!(out, "| {} | {} |", def.code, escape_inline(&def.msg));
        }

        out.push_str("\n---\n\n");

        for (code, def) in &sorted {
            write_details(&mut out, code, def);
            out.push('\n');
        }

        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        out.push('\n');

        Ok(out)
    }
}

fn write_details(out: &mut String, code: &str, def: &ErrorDefinition) {
    let _ = writeln!(out, "## {code}\n");
    let _ = writeln!(out, "- **Domain**: {}", def.domain);
    let _ = writeln!(out, "- **Code**: {}", def.code);
    let _ = writeln!(out, "- **Message**: {}", escape_block(&def.msg));
    let _ = writeln!(out, "- **Cause**: {}", escape_block(&def.cause));

    if let Some(status) = def.http_status {
        let _ = writeln!(out, "- **HTTP Status**: {status}");
    }
    if let Some(category) = def.category {
        let _ = writeln!(out, "- **Category**: {category}");
    }
    if let Some(severity) = def.severity {
        let _ = writeln!(out, "- **Severity**: {severity}");
    }
    let _ = writeln!(
        out,
        "- **Retryable**: {}",
        if def.is_retryable { "yes" } else { "no" }
    );
    if let Some(solution) = &def.solution {
        let _ = writeln!(out, "- **Solution**: {}", escape_block(solution));
    }
    if !def.tags.is_empty() {
        let tags: Vec<String> = def.tags.iter().map(|t| code_span(t)).collect();
        let _ = writeln!(out, "- **Tags**: {}", tags.join(", "));
    }
}
