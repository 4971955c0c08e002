use crate::definition::DefinitionSet;
use crate::error::{CodegenError, Result};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::BTreeMap;

mod consts;
mod output;
mod types;
mod utils;

/// Name of the record type declared in generated code
pub const RECORD_TYPE: &str = "ErrorDef";
/// Name of the aggregate static listing every generated constant
pub const ALL_ERRORS: &str = "ERRORS";

/// Code generator for error definition sets.
///
/// Output is a single self-contained Rust module: supporting enums, one
/// record type, one `pub const` per error code, an `ERRORS` slice and a
/// `find` lookup. Codes are sorted byte-wise before anything is emitted, so
/// the same set always yields byte-identical text.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    source_label: Option<String>,
}

impl CodeGenerator {
    /// Create a new code generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the input (usually the definitions directory) in the file header
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = Some(label.into());
        self
    }

    /// Generate the token stream for `defs`
    pub fn generate_tokens(&self, defs: &DefinitionSet) -> Result<TokenStream> {
        if defs.is_empty() {
            return Err(CodegenError::NoDefinitions);
        }

        let sorted = defs.sorted();
        let idents = self.const_idents(sorted.iter().map(|(code, _)| *code))?;

        let support = self.generate_support_types();
        let consts = sorted
            .iter()
            .zip(&idents)
            .map(|((_, def), ident)| self.generate_const(ident, def))
            .collect::<Vec<_>>();
        let aggregate = self.generate_aggregate(&idents);

        Ok(quote! {
            #support
            #(#consts)*
            #aggregate
        })
    }

    /// Generate formatted Rust source for `defs`
    pub fn generate(&self, defs: &DefinitionSet) -> Result<String> {
        let tokens = self.generate_tokens(defs)?;
        self.format_file(tokens)
    }

    /// Map each code to its constant identifier, rejecting collisions.
    ///
    /// Codes are expected in sorted order; the identifiers come back in the
    /// same order.
    fn const_idents<'a>(&self, codes: impl Iterator<Item = &'a str>) -> Result<Vec<syn::Ident>> {
        let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut idents = Vec::new();

        for code in codes {
            let name = utils::const_name(code);
            seen.entry(name.clone()).or_default().push(code.to_string());
            idents.push(utils::make_ident(&name));
        }

        if let Some((name, codes)) = seen.into_iter().find(|(_, codes)| codes.len() > 1) {
            return Err(CodegenError::NameCollision { name, codes });
        }

        Ok(idents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Category, ErrorDefinition, Severity};

    fn set(defs: Vec<ErrorDefinition>) -> DefinitionSet {
        defs.into_iter().map(|d| (d.code.clone(), d)).collect()
    }

    fn full_def() -> ErrorDefinition {
        ErrorDefinition {
            domain: "test".into(),
            code: "TT0001".into(),
            msg: "Something went wrong".into(),
            cause: "Unknown".into(),
            http_status: Some(500),
            category: Some(Category::Internal),
            severity: Some(Severity::High),
            solution: Some("Try again later".into()),
            is_retryable: false,
            tags: vec!["internal".into(), "retry".into()],
        }
    }

    /// Pull the string literal assigned to `field` in the constant named `name`
    fn literal_field(file: &syn::File, name: &str, field: &str) -> String {
        for item in &file.items {
            let syn::Item::Const(item) = item else {
                continue;
            };
            if item.ident != name {
                continue;
            }
            let syn::Expr::Struct(expr) = item.expr.as_ref() else {
                panic!("{name} is not a struct literal");
            };
            for fv in &expr.fields {
                let syn::Member::Named(member) = &fv.member else {
                    continue;
                };
                if member != field {
                    continue;
                }
                let syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }) = &fv.expr
                else {
                    panic!("{name}.{field} is not a string literal");
                };
                return lit.value();
            }
        }
        panic!("no field {field} on const {name}");
    }

    #[test]
    fn test_generate_basic() {
        let code = CodeGenerator::new().generate(&set(vec![full_def()])).unwrap();

        assert!(code.starts_with("// @generated by errz-codegen. DO NOT EDIT."));
        assert!(code.contains("pub struct ErrorDef {"));
        assert!(code.contains("pub const TT0001: ErrorDef = ErrorDef {"));
        assert!(code.contains("code: \"TT0001\""));
        assert!(code.contains("http_status: Some(500)"));
        assert!(code.contains("category: Some(Category::Internal)"));
        assert!(code.contains("severity: Some(Severity::High)"));
        assert!(code.contains("solution: Some(\"Try again later\")"));
        assert!(code.contains("tags: &[\"internal\", \"retry\"]"));
        assert!(code.contains("pub static ERRORS: &[&ErrorDef] = &[&TT0001];"));
        assert!(code.contains("pub fn find(code: &str) -> Option<&'static ErrorDef>"));
    }

    #[test]
    fn test_generate_sorted_one_const_per_code() {
        let defs = set(vec![
            ErrorDefinition::new("z", "ZE0001", "z", "z"),
            ErrorDefinition::new("a", "AE0001", "a", "a"),
            ErrorDefinition::new("a", "AE0002", "a", "a"),
        ]);

        let code = CodeGenerator::new().generate(&defs).unwrap();
        let file = syn::parse_file(&code).expect("generated code parses");

        let consts: Vec<String> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Const(c) => Some(c.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(consts, vec!["AE0001", "AE0002", "ZE0001"]);
        assert!(code.contains("&[&AE0001, &AE0002, &ZE0001]"));
    }

    #[test]
    fn test_generate_empty_input() {
        let err = CodeGenerator::new()
            .generate(&DefinitionSet::new())
            .unwrap_err();
        assert!(matches!(err, CodegenError::NoDefinitions));
        assert_eq!(err.to_string(), "no error definitions provided");
    }

    #[test]
    fn test_escaped_literals_round_trip() {
        let tricky = [
            "quote \" and newline \\n",
            "multi\nline \"message\"",
            "back\\slash\ttab",
            "unicode ünïcödé and 'single'",
        ];

        for (i, text) in tricky.iter().enumerate() {
            let code = format!("TT000{i}");
            let mut def = ErrorDefinition::new("test", code.clone(), *text, *text);
            def.solution = Some(text.to_string());

            let source = CodeGenerator::new().generate(&set(vec![def])).unwrap();
            let file = syn::parse_file(&source).expect("generated code parses");
            assert_eq!(literal_field(&file, &code, "msg"), *text);
            assert_eq!(literal_field(&file, &code, "cause"), *text);
        }
    }

    #[test]
    fn test_escape_in_source_text() {
        let def = ErrorDefinition::new("test", "TT0001", "quote \" and newline \\n", "c");
        let code = CodeGenerator::new().generate(&set(vec![def])).unwrap();
        assert!(code.contains(r#"msg: "quote \" and newline \\n""#));
    }

    #[test]
    fn test_deterministic_output() {
        let defs: Vec<_> = (0..50)
            .map(|i| ErrorDefinition::new("d", format!("AB{i:04}"), format!("m{i}"), "c"))
            .collect();

        let first = CodeGenerator::new().generate(&set(defs.clone())).unwrap();
        let reversed: Vec<_> = defs.into_iter().rev().collect();
        let second = CodeGenerator::new().generate(&set(reversed)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_name_collision() {
        let defs = set(vec![
            ErrorDefinition::new("d", "ab-0001", "m", "c"),
            ErrorDefinition::new("d", "AB_0001", "m", "c"),
        ]);
        let err = CodeGenerator::new().generate(&defs).unwrap_err();
        match err {
            CodegenError::NameCollision { name, codes } => {
                assert_eq!(name, "AB_0001");
                assert_eq!(codes, vec!["AB_0001", "ab-0001"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_source_label_in_header() {
        let code = CodeGenerator::new()
            .with_source_label("definitions")
            .generate(&set(vec![full_def()]))
            .unwrap();
        assert!(code.contains("// Source: definitions\n"));
    }
}
