use crate::definition::{DefinitionSet, ErrorDefinition};
use crate::error::{CodegenError, Result};
use crate::schema::{DocumentValidator, check_document};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Loads every definition file in a directory into one [`DefinitionSet`].
///
/// Files are read, validated and parsed concurrently, one task per file.
/// Each task owns the map it parsed; merging happens in [`load_dir`]'s join
/// loop, which is the only place the combined set is ever touched.
///
/// [`load_dir`]: DefinitionLoader::load_dir
#[derive(Clone)]
pub struct DefinitionLoader {
    validator: Arc<dyn DocumentValidator>,
}

/// The definitions parsed out of one file
#[derive(Debug)]
struct LoadedFile {
    path: PathBuf,
    defs: HashMap<String, ErrorDefinition>,
}

impl DefinitionLoader {
    pub fn new(validator: Arc<dyn DocumentValidator>) -> Self {
        Self { validator }
    }

    /// Load and merge all definition files directly inside `dir`.
    ///
    /// The first error observed wins. Tasks already running when it is
    /// latched are drained but nothing they produce is merged.
    ///
    /// When two files define the same code, the error names whichever of the
    /// two finished loading second. Completion order is not fixed, so with
    /// more than one duplicate the reported pair may change between runs.
    #[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn load_dir(&self, dir: impl AsRef<Path>) -> Result<DefinitionSet> {
        let dir = dir.as_ref();

        let files = crate::fs::find_definition_files(dir).await?;

        let mut tasks = JoinSet::new();
        for path in files {
            let validator = Arc::clone(&self.validator);
            tasks.spawn(async move { load_file(validator.as_ref(), path).await });
        }

        let mut result = DefinitionSet::new();
        let mut failure: Option<CodegenError> = None;

        while let Some(joined) = tasks.join_next().await {
            let loaded = match joined.map_err(CodegenError::from).and_then(|r| r) {
                Ok(loaded) => loaded,
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    } else {
                        tracing::warn!(error = %e, "discarding error after earlier failure");
                    }
                    continue;
                }
            };

            if failure.is_some() {
                continue;
            }

            if let Err(e) = merge(&mut result, loaded) {
                failure = Some(e);
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        tracing::info!(count = result.len(), dir = %dir.display(), "loaded error definitions");
        Ok(result)
    }
}

impl std::fmt::Debug for DefinitionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionLoader").finish_non_exhaustive()
    }
}

async fn load_file(validator: &dyn DocumentValidator, path: PathBuf) -> Result<LoadedFile> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CodegenError::ReadFile {
            path: path.clone(),
            source,
        })?;

    let document: Value =
        serde_json::from_str(&content).map_err(|e| CodegenError::parse_error(e, &path))?;
    check_document(validator, &document, &path)?;

    let defs: HashMap<String, ErrorDefinition> =
        serde_json::from_value(document).map_err(|e| CodegenError::parse_error(e, &path))?;
    if defs.is_empty() {
        return Err(CodegenError::EmptyDefinitionFile { path });
    }

    tracing::debug!(path = %path.display(), count = defs.len(), "parsed definition file");
    Ok(LoadedFile { path, defs })
}

/// Fold one file's definitions into the running set.
///
/// Stops at the first clashing code. Codes merged before the clash stay in
/// `result`, which the caller discards on error anyway.
fn merge(result: &mut DefinitionSet, loaded: LoadedFile) -> Result<()> {
    let LoadedFile { path, defs } = loaded;
    for (code, def) in defs {
        if result.insert_unique(code.clone(), def).is_err() {
            return Err(CodegenError::DuplicateCode { code, path });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ValidationViolations, Violation};

    /// Accepts every document
    struct AcceptAll;

    impl DocumentValidator for AcceptAll {
        fn validate(&self, _document: &Value) -> ValidationViolations {
            ValidationViolations::default()
        }
    }

    /// Rejects every document with one root-level violation
    struct RejectAll;

    impl DocumentValidator for RejectAll {
        fn validate(&self, _document: &Value) -> ValidationViolations {
            [Violation {
                instance_path: String::new(),
                schema_path: "/additionalProperties".to_string(),
                message: "rejected".to_string(),
            }]
            .into_iter()
            .collect()
        }
    }

    fn loader() -> DefinitionLoader {
        DefinitionLoader::new(Arc::new(AcceptAll))
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    const PAYMENT: &str = r#"{
        "PM0001": {
            "domain": "payment", "code": "PM0001",
            "msg": "payment failed", "cause": "insufficient balance"
        }
    }"#;

    #[tokio::test]
    async fn test_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "payment.json", PAYMENT);
        write(
            dir.path(),
            "payment2.json",
            r#"{"PM0002": {
                "domain": "payment", "code": "PM0002", "msg": "timeout", "cause": "slow"
            }}"#,
        );

        let set = loader().load_dir(dir.path()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.sorted_codes(), vec!["PM0001", "PM0002"]);
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "empty.json", "{}");

        let err = loader().load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, CodegenError::EmptyDefinitionFile { .. }));
        assert!(err.to_string().starts_with("no errors found in "));
        assert!(err.to_string().ends_with("empty.json"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", r#"{"PM0001": {"domain": "payment","#);

        let err = loader().load_dir(dir.path()).await.unwrap_err();
        match err {
            CodegenError::ParseError { path, .. } => assert!(path.ends_with("bad.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_within_merge() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", PAYMENT);
        write(dir.path(), "b.json", PAYMENT);

        let err = loader().load_dir(dir.path()).await.unwrap_err();
        match &err {
            CodegenError::DuplicateCode { code, path } => {
                assert_eq!(code, "PM0001");
                let name = path.file_name().unwrap().to_str().unwrap();
                assert!(name == "a.json" || name == "b.json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(
            err.to_string()
                .starts_with("duplicate error code detected: PM0001 in ")
        );
    }

    #[tokio::test]
    async fn test_empty_dir_loads_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let set = loader().load_dir(dir.path()).await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_schema_violation_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "payment.json", PAYMENT);

        let err = DefinitionLoader::new(Arc::new(RejectAll))
            .load_dir(dir.path())
            .await
            .unwrap_err();
        match &err {
            CodegenError::SchemaViolation { path, violations } => {
                assert_eq!(path, &dir.path().join("payment.json"));
                assert_eq!(violations.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().ends_with("JSON validation failed:\n- (root): rejected"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let dangling = dir.path().join("dangling.json");
        std::os::unix::fs::symlink(dir.path().join("missing-target"), &dangling).unwrap();

        let err = loader().load_dir(dir.path()).await.unwrap_err();
        match err {
            CodegenError::ReadFile { path, source } => {
                assert_eq!(path, dangling);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("definitions");

        let err = loader().load_dir(&missing).await.unwrap_err();
        match err {
            CodegenError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
