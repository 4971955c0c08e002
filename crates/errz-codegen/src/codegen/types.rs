use super::CodeGenerator;
use super::utils::{make_ident, value_to_variant_name};
use crate::definition::{Category, Severity};
use proc_macro2::TokenStream;
use quote::quote;

impl CodeGenerator {
    /// Declarations every generated file carries: the category and severity
    /// enums and the shared `ErrorDef` record type.
    pub(super) fn generate_support_types(&self) -> TokenStream {
        let record = make_ident(super::RECORD_TYPE);

        let category = self.generate_str_enum(
            "Category",
            " Broad classification of an error",
            Category::ALL.iter().map(|c| c.as_str()),
        );
        let severity = self.generate_str_enum(
            "Severity",
            " How serious an error is",
            Severity::ALL.iter().map(|s| s.as_str()),
        );

        quote! {
            #category
            #severity

            /// A declared error, generated from its JSON definition
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct #record {
                pub domain: &'static str,
                pub code: &'static str,
                pub msg: &'static str,
                pub cause: &'static str,
                pub http_status: Option<u16>,
                pub category: Option<Category>,
                pub severity: Option<Severity>,
                pub solution: Option<&'static str>,
                pub is_retryable: bool,
                pub tags: &'static [&'static str],
            }

            impl ::core::fmt::Display for #record {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    write!(f, "[{}] {}", self.code, self.msg)
                }
            }

            impl ::std::error::Error for #record {}
        }
    }

    /// A fieldless enum whose variants map back to their schema strings
    fn generate_str_enum<'a>(
        &self,
        name: &str,
        doc: &str,
        values: impl Iterator<Item = &'a str>,
    ) -> TokenStream {
        let ident = make_ident(name);
        let (variants, strings): (Vec<_>, Vec<_>) = values
            .map(|value| (make_ident(&value_to_variant_name(value)), value))
            .unzip();

        quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum #ident {
                #(#variants),*
            }

            impl #ident {
                pub const fn as_str(&self) -> &'static str {
                    match self {
                        #(Self::#variants => #strings),*
                    }
                }
            }
        }
    }

    /// Variant path for a category value, e.g. `Category::Business`
    pub(super) fn category_tokens(&self, category: Category) -> TokenStream {
        let variant = make_ident(&value_to_variant_name(category.as_str()));
        quote!(Category::#variant)
    }

    /// Variant path for a severity value, e.g. `Severity::High`
    pub(super) fn severity_tokens(&self, severity: Severity) -> TokenStream {
        let variant = make_ident(&value_to_variant_name(severity.as_str()));
        quote!(Severity::#variant)
    }
}
