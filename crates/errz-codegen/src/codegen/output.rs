use super::CodeGenerator;
use crate::error::{CodegenError, Result};
use proc_macro2::TokenStream;

impl CodeGenerator {
    /// Parse, pretty-print and add the generated-file header
    pub(super) fn format_file(&self, tokens: TokenStream) -> Result<String> {
        let file: syn::File =
            syn::parse2(tokens).map_err(|source| CodegenError::FormatError { source })?;
        let formatted = prettyplease::unparse(&file);

        // Add blank lines between top-level items for better readability
        let lines: Vec<&str> = formatted.lines().collect();
        let mut result_lines = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            result_lines.push(*line);

            // A top-level line closing an item: `}`, `};`, or a one-line static
            let top_level = !line.starts_with(char::is_whitespace) && !line.starts_with("//");
            let ends_item = top_level && (line.ends_with('}') || line.ends_with(';'));
            if ends_item && i + 1 < lines.len() && !lines[i + 1].is_empty() {
                result_lines.push("");
            }
        }

        let mut body = result_lines.join("\n");
        body.push('\n');

        Ok(format!("{}{}", self.header(), body))
    }

    fn header(&self) -> String {
        let source = match &self.source_label {
            Some(label) => format!("//\n// Source: {}\n", label),
            None => String::new(),
        };
        format!(
            "// @generated by errz-codegen. DO NOT EDIT.\n{source}//\n\
             // This file was automatically generated from error definition files.\n\
             // Any manual changes will be overwritten on the next regeneration.\n\n"
        )
    }
}
