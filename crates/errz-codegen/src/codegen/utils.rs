use heck::ToPascalCase;
use proc_macro2::Span;

/// Enum variant for a schema enum value: `business` → `Business`,
/// `rate-limited` → `RateLimited`
pub(super) fn value_to_variant_name(value: &str) -> String {
    let variant = value
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_pascal_case();

    match variant.chars().next() {
        None => "Unknown".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{variant}"),
        Some(_) => variant,
    }
}

/// Replace anything that cannot appear in an identifier with `_`.
///
/// A leading digit gets a `_` prefix; an empty input becomes `unknown`.
pub(super) fn sanitize_name(s: &str) -> String {
    if s.is_empty() {
        return "unknown".to_string();
    }

    let sanitized: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}

/// Constant name for an error code: `pm-0001` → `PM_0001`
pub(super) fn const_name(code: &str) -> String {
    sanitize_name(code).to_uppercase()
}

/// Identifier for `s`, falling back to a raw identifier for keywords
pub(super) fn make_ident(s: &str) -> syn::Ident {
    let sanitized = sanitize_name(s);
    if sanitized != s {
        tracing::warn!(original = s, sanitized = %sanitized, "identifier sanitized");
    }

    match syn::parse_str::<syn::Ident>(&sanitized) {
        Ok(ident) => ident,
        Err(_) => syn::Ident::new_raw(&sanitized, Span::call_site()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_name() {
        assert_eq!(const_name("PM0001"), "PM0001");
        assert_eq!(const_name("pm-0001"), "PM_0001");
        assert_eq!(const_name("0001"), "_0001");
    }

    #[test]
    fn test_value_to_variant_name() {
        assert_eq!(value_to_variant_name("business"), "Business");
        assert_eq!(value_to_variant_name("rate-limited"), "RateLimited");
        assert_eq!(value_to_variant_name("4xx"), "_4xx");
        assert_eq!(value_to_variant_name(""), "Unknown");
    }

    #[test]
    fn test_make_ident_keyword_is_raw() {
        assert_eq!(make_ident("match").to_string(), "r#match");
        assert_eq!(make_ident("PM0001").to_string(), "PM0001");
        assert_eq!(make_ident("pm-0001").to_string(), "pm_0001");
    }
}
