//! JSON Schema gate for definition files.
//!
//! The schema engine itself is the `jsonschema` crate; this module only
//! adapts it to the [`DocumentValidator`] seam and decorates failures with the
//! offending file path.

use crate::error::{CodegenError, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "- (root): {}", self.message)
        } else {
            write!(f, "- {}: {}", self.instance_path, self.message)
        }
    }
}

/// Every violation reported for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl FromIterator<Violation> for ValidationViolations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Checks a parsed JSON document against a fixed schema.
///
/// Returns every violation found; an empty collection means the document is
/// valid.
pub trait DocumentValidator: Send + Sync {
    fn validate(&self, document: &Value) -> ValidationViolations;
}

/// [`DocumentValidator`] backed by a compiled `jsonschema` validator
pub struct JsonSchemaValidator {
    schema_path: PathBuf,
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile a validator from a schema document already in memory
    pub fn from_value(schema: &Value, schema_path: impl Into<PathBuf>) -> Result<Self> {
        let schema_path = schema_path.into();
        let validator =
            jsonschema::validator_for(schema).map_err(|e| CodegenError::SchemaLoad {
                path: schema_path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            schema_path,
            validator,
        })
    }

    /// Load and compile the schema at `path`.
    ///
    /// The path is made absolute first so that error messages name the file
    /// unambiguously regardless of the working directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let abs = std::path::absolute(path).map_err(|e| CodegenError::SchemaLoad {
            path: path.to_path_buf(),
            reason: format!("failed to get absolute path: {e}"),
        })?;

        let content = std::fs::read_to_string(&abs).map_err(|e| CodegenError::SchemaLoad {
            path: abs.clone(),
            reason: format!("file not found: {e}"),
        })?;

        let schema: Value =
            serde_json::from_str(&content).map_err(|e| CodegenError::SchemaLoad {
                path: abs.clone(),
                reason: format!("invalid JSON: {e}"),
            })?;

        Self::from_value(&schema, abs)
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema_path", &self.schema_path)
            .finish_non_exhaustive()
    }
}

impl DocumentValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value) -> ValidationViolations {
        self.validator
            .iter_errors(document)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

/// Validate an already-parsed document, attributing failures to `path`
pub fn check_document(
    validator: &dyn DocumentValidator,
    document: &Value,
    path: &Path,
) -> Result<()> {
    let violations = validator.validate(document);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CodegenError::SchemaViolation {
            path: path.to_path_buf(),
            violations,
        })
    }
}

/// Read, parse and validate one definition file
pub async fn validate_file(validator: &dyn DocumentValidator, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CodegenError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| CodegenError::parse_error(e, path))?;

    check_document(validator, &document, path)
}

/// Validate every definition file in `dir`, stopping at the first invalid one
pub async fn validate_all_files(validator: &dyn DocumentValidator, dir: &Path) -> Result<()> {
    let files = crate::fs::find_definition_files(dir).await?;
    tracing::debug!(count = files.len(), dir = %dir.display(), "validating definition files");

    for path in &files {
        validate_file(validator, path).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        serde_json::from_str(include_str!("../schema/error_schema.json")).expect("schema json")
    }

    fn validator() -> JsonSchemaValidator {
        JsonSchemaValidator::from_value(&schema(), "error_schema.json").expect("compile schema")
    }

    #[test]
    fn test_valid_document_has_no_violations() {
        let doc = json!({
            "PM0001": {
                "domain": "payment",
                "code": "PM0001",
                "msg": "payment failed",
                "cause": "insufficient balance",
                "http_status": 400,
                "category": "business",
                "severity": "medium",
                "solution": "ask user to top-up balance",
                "is_retryable": false,
                "tags": ["payment", "user"]
            }
        });

        assert!(validator().validate(&doc).is_empty());
    }

    #[test]
    fn test_invalid_document_collects_all_violations() {
        let doc = json!({
            "PM0001": {
                "domain": "payment",
                "code": "INVALID_CODE",
                "msg": "",
                "http_status": 700,
                "category": "invalid_category",
                "severity": "unknown",
                "is_retryable": "not_a_boolean"
            }
        });

        let violations = validator().validate(&doc);
        assert!(violations.len() >= 6, "got {violations}");
        assert!(
            violations
                .violations()
                .iter()
                .any(|v| v.instance_path == "/PM0001/code")
        );
    }

    #[test]
    fn test_bad_key_and_extra_property_rejected() {
        let doc = json!({
            "bad-key": {}
        });
        assert!(!validator().validate(&doc).is_empty());
    }

    #[test]
    fn test_check_document_decorates_path() {
        let doc = json!({ "PM0001": { "code": "PM0001" } });
        let err = check_document(&validator(), &doc, Path::new("defs/payment.json")).unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("validation failed for defs/payment.json"));
        assert!(message.contains("JSON validation failed:\n- "));
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/additionalProperties".to_string(),
            message: "unexpected".to_string(),
        };
        assert_eq!(v.to_string(), "- (root): unexpected");
    }

    #[test]
    fn test_from_path_missing_schema() {
        let err = JsonSchemaValidator::from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, CodegenError::SchemaLoad { .. }));
    }
}
