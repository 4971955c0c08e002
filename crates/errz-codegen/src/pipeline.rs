//! End-to-end generation: validate, load, generate code, generate docs.

use crate::codegen::CodeGenerator;
use crate::config::Config;
use crate::definition::DefinitionSet;
use crate::docs::DocGenerator;
use crate::error::{CodegenError, Result, StageExt};
use crate::loader::DefinitionLoader;
use crate::output;
use crate::schema::{self, DocumentValidator, JsonSchemaValidator};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// The operations the pipeline is built from.
///
/// [`FsOps`] is the real implementation. Tests substitute their own to
/// observe or fail individual steps.
pub trait GeneratorOps: Send + Sync + 'static {
    /// Validate every definition file in `dir` against the schema
    fn validate_all(&self, dir: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Load and merge every definition file in `dir`
    fn load(&self, dir: &Path) -> impl Future<Output = Result<DefinitionSet>> + Send;

    fn generate_code(&self, defs: &DefinitionSet) -> Result<String>;

    fn generate_docs(&self, domain: &str, defs: &DefinitionSet) -> Result<String>;

    fn write_code(&self, path: &Path, content: &str) -> Result<()>;

    /// Write one domain page under `out_dir`, returning the file written
    fn write_docs(&self, out_dir: &Path, domain: &str, content: &str) -> Result<PathBuf>;
}

/// Filesystem-backed [`GeneratorOps`]
#[derive(Debug, Clone)]
pub struct FsOps {
    validator: Arc<JsonSchemaValidator>,
    loader: DefinitionLoader,
    codegen: CodeGenerator,
    docs: DocGenerator,
}

impl FsOps {
    /// Compile the schema at `schema_path` and wire up the default generators
    pub fn new(schema_path: impl AsRef<Path>) -> Result<Self> {
        let validator = Arc::new(JsonSchemaValidator::from_path(schema_path)?);
        Ok(Self::with_validator(validator))
    }

    pub fn with_validator(validator: Arc<JsonSchemaValidator>) -> Self {
        let dyn_validator: Arc<dyn DocumentValidator> = validator.clone();
        Self {
            validator,
            loader: DefinitionLoader::new(dyn_validator),
            codegen: CodeGenerator::new(),
            docs: DocGenerator::new(),
        }
    }

    pub fn with_codegen(mut self, codegen: CodeGenerator) -> Self {
        self.codegen = codegen;
        self
    }
}

impl GeneratorOps for FsOps {
    async fn validate_all(&self, dir: &Path) -> Result<()> {
        schema::validate_all_files(self.validator.as_ref(), dir).await
    }

    async fn load(&self, dir: &Path) -> Result<DefinitionSet> {
        self.loader.load_dir(dir).await
    }

    fn generate_code(&self, defs: &DefinitionSet) -> Result<String> {
        self.codegen.generate(defs)
    }

    fn generate_docs(&self, domain: &str, defs: &DefinitionSet) -> Result<String> {
        self.docs.generate(domain, defs)
    }

    fn write_code(&self, path: &Path, content: &str) -> Result<()> {
        output::write_code_file(path, content)
    }

    fn write_docs(&self, out_dir: &Path, domain: &str, content: &str) -> Result<PathBuf> {
        output::write_markdown_file(out_dir, domain, content)
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of error definitions generated
    pub definitions: usize,
    /// Documented domains, sorted
    pub domains: Vec<String>,
    pub code_path: PathBuf,
    pub doc_paths: Vec<PathBuf>,
}

/// Paths for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    pub schema_path: PathBuf,
    pub definitions_dir: PathBuf,
    pub output_path: PathBuf,
    pub output_doc_dir: PathBuf,
}

/// Result of one of the two concurrent front-end tasks
enum FrontEnd {
    Validated,
    Loaded(DefinitionSet),
}

impl Generator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            schema_path: config.schema.clone(),
            definitions_dir: config.definitions.clone(),
            output_path: config.output.code.clone(),
            output_doc_dir: config.output.docs.clone(),
        }
    }

    /// Run against the real filesystem
    pub async fn run(&self) -> Result<Summary> {
        let label = self
            .definitions_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.definitions_dir.display().to_string());
        let ops = FsOps::new(&self.schema_path)?
            .with_codegen(CodeGenerator::new().with_source_label(label));
        self.run_with(Arc::new(ops)).await
    }

    /// Run with the given operations.
    ///
    /// Validation and loading run as two concurrent tasks. If either fails,
    /// the first failure to complete is returned and nothing is generated.
    /// Both tasks are always allowed to finish.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(definitions = %self.definitions_dir.display())
    )]
    pub async fn run_with<O: GeneratorOps>(&self, ops: Arc<O>) -> Result<Summary> {
        let defs = self.validate_and_load(&ops).await?;

        ops.generate_code(&defs)
            .and_then(|code| ops.write_code(&self.output_path, &code))
            .stage(|| format!("failed to write code to {}", self.output_path.display()))?;

        let groups = defs.partition_by_domain()?;

        let mut doc_paths = Vec::with_capacity(groups.len());
        for (domain, group) in &groups {
            let path = ops
                .generate_docs(domain, group)
                .and_then(|content| ops.write_docs(&self.output_doc_dir, domain, &content))
                .stage(|| format!("failed to write markdown for domain {domain:?}"))?;
            doc_paths.push(path);
        }

        tracing::info!(
            definitions = defs.len(),
            domains = groups.len(),
            "generation complete"
        );

        Ok(Summary {
            definitions: defs.len(),
            domains: groups.into_keys().collect(),
            code_path: self.output_path.clone(),
            doc_paths,
        })
    }

    async fn validate_and_load<O: GeneratorOps>(&self, ops: &Arc<O>) -> Result<DefinitionSet> {
        let mut tasks = JoinSet::new();

        {
            let ops = Arc::clone(ops);
            let dir = self.definitions_dir.clone();
            tasks.spawn(async move { ops.validate_all(&dir).await.map(|()| FrontEnd::Validated) });
        }
        {
            let ops = Arc::clone(ops);
            let dir = self.definitions_dir.clone();
            tasks.spawn(async move { ops.load(&dir).await.map(FrontEnd::Loaded) });
        }

        let mut defs = None;
        let mut failure: Option<CodegenError> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(CodegenError::from).and_then(|r| r) {
                Ok(FrontEnd::Validated) => {}
                Ok(FrontEnd::Loaded(loaded)) => defs = Some(loaded),
                Err(e) if failure.is_none() => failure = Some(e),
                Err(e) => tracing::warn!(error = %e, "discarding error after earlier failure"),
            }
        }

        match (failure, defs) {
            (Some(e), _) => Err(e),
            (None, Some(defs)) => Ok(defs),
            // a successful load always yields a set
            (None, None) => Err(CodegenError::NoDefinitions),
        }
    }
}
