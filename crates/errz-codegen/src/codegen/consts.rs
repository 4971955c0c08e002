use super::CodeGenerator;
use super::utils::make_ident;
use crate::definition::ErrorDefinition;
use proc_macro2::{Literal, TokenStream};
use quote::quote;

impl CodeGenerator {
    /// `pub const <IDENT>: ErrorDef = ErrorDef { .. };` for one definition.
    ///
    /// Every string goes through `quote`'s literal conversion, which escapes
    /// quotes, backslashes and control characters, so the literal parses back
    /// to exactly the original value.
    pub(super) fn generate_const(&self, ident: &syn::Ident, def: &ErrorDefinition) -> TokenStream {
        let record = make_ident(super::RECORD_TYPE);
        let doc = format!(" `{}`: {}", def.code, def.msg.lines().next().unwrap_or_default());

        let ErrorDefinition {
            domain,
            code,
            msg,
            cause,
            ..
        } = def;

        let http_status = match def.http_status {
            Some(status) => {
                let status = Literal::u16_unsuffixed(status);
                quote!(Some(#status))
            }
            None => quote!(None),
        };
        let category = match def.category {
            Some(c) => {
                let c = self.category_tokens(c);
                quote!(Some(#c))
            }
            None => quote!(None),
        };
        let severity = match def.severity {
            Some(s) => {
                let s = self.severity_tokens(s);
                quote!(Some(#s))
            }
            None => quote!(None),
        };
        let solution = match &def.solution {
            Some(solution) => quote!(Some(#solution)),
            None => quote!(None),
        };
        let is_retryable = def.is_retryable;
        let tags = &def.tags;

        quote! {
            #[doc = #doc]
            pub const #ident: #record = #record {
                domain: #domain,
                code: #code,
                msg: #msg,
                cause: #cause,
                http_status: #http_status,
                category: #category,
                severity: #severity,
                solution: #solution,
                is_retryable: #is_retryable,
                tags: &[#(#tags),*],
            };
        }
    }

    /// The `ERRORS` slice, in the order given, plus a lookup by code
    pub(super) fn generate_aggregate(&self, idents: &[syn::Ident]) -> TokenStream {
        let record = make_ident(super::RECORD_TYPE);
        let all = make_ident(super::ALL_ERRORS);

        quote! {
            /// Every generated error, sorted by code
            pub static #all: &[&#record] = &[#(&#idents),*];

            /// Look up a generated error by its code
            pub fn find(code: &str) -> Option<&'static #record> {
                #all.iter().copied().find(|e| e.code == code)
            }
        }
    }
}
