use crate::schema::ValidationViolations;
use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading definitions or generating artifacts
#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    /// IO error on a directory or file that is not itself a definition
    #[error("IO error at {}", path.display())]
    #[diagnostic(code(errz::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A definition file could not be read
    #[error("read error at {}", path.display())]
    #[diagnostic(code(errz::read_error))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse definition JSON
    #[error("unmarshal error at {}", path.display())]
    #[diagnostic(
        code(errz::parse_error),
        help("Check that the file is a JSON object mapping error codes to definitions")
    )]
    ParseError {
        #[source]
        source: serde_json::Error,
        /// Path to the file that failed to parse
        path: PathBuf,
    },

    /// A path argument was empty or whitespace
    #[error("path cannot be empty")]
    #[diagnostic(code(errz::empty_path))]
    EmptyPath,

    /// The schema document could not be loaded or compiled
    #[error("cannot load schema {}: {reason}", path.display())]
    #[diagnostic(code(errz::schema_load))]
    SchemaLoad { path: PathBuf, reason: String },

    /// A definition file does not conform to the schema
    #[error("validation failed for {}: JSON validation failed:\n{violations}", path.display())]
    #[diagnostic(
        code(errz::schema_violation),
        help("Fix the listed fields so the file matches the error definition schema")
    )]
    SchemaViolation {
        path: PathBuf,
        violations: ValidationViolations,
    },

    /// The same code is defined more than once
    #[error("duplicate error code detected: {code} in {}", path.display())]
    #[diagnostic(
        code(errz::duplicate_code),
        help("Error codes must be unique across every definition file")
    )]
    DuplicateCode {
        code: String,
        /// File whose merge observed the clash
        path: PathBuf,
    },

    /// A definition file parsed to an empty object
    #[error("no errors found in {}", path.display())]
    #[diagnostic(code(errz::empty_file))]
    EmptyDefinitionFile { path: PathBuf },

    /// A definition has no domain, so it cannot be documented
    #[error("error code {code:?} has empty domain")]
    #[diagnostic(code(errz::empty_domain))]
    EmptyDomain { code: String },

    /// Domains that differ only by case would share one docs page
    #[error("domains {domains:?} collide on docs directory {name:?}")]
    #[diagnostic(
        code(errz::domain_collision),
        help("Docs directories are lower-cased; spell each domain the same way everywhere")
    )]
    DomainCollision {
        /// The shared lower-cased directory name
        name: String,
        /// Every domain spelling that maps to it, sorted
        domains: Vec<String>,
    },
    /// A generator was handed an empty definition set
    #[error("no error definitions provided")]
    #[diagnostic(code(errz::no_definitions))]
    NoDefinitions,

    /// Domain name unusable as a title or directory name
    #[error("domain name must be non-empty and alphanumeric: {domain:?}")]
    #[diagnostic(
        code(errz::invalid_domain),
        help("Domains may not contain spaces, '.', '/' or '\\'")
    )]
    InvalidDomainName { domain: String },

    /// Name collision
    #[error("Name collision: {name}")]
    #[diagnostic(
        code(errz::name_collision),
        help("Multiple codes would generate the same Rust identifier")
    )]
    NameCollision {
        /// The colliding identifier
        name: String,
        /// Codes that would generate this identifier
        codes: Vec<String>,
    },

    /// Code formatting error
    #[error("Failed to format generated code")]
    #[diagnostic(code(errz::format_error))]
    FormatError {
        #[source]
        source: syn::Error,
    },

    #[error("failed to create directory {}", path.display())]
    #[diagnostic(code(errz::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file {}", path.display())]
    #[diagnostic(code(errz::write_file))]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration
    #[error("invalid config: {message}")]
    #[diagnostic(code(errz::config))]
    Config { message: String },

    /// A pipeline step failed; `stage` says which one
    #[error("{stage}")]
    #[diagnostic(code(errz::stage))]
    Stage {
        stage: String,
        #[source]
        source: Box<CodegenError>,
    },

    /// A spawned task panicked or was aborted
    #[error("generation task failed")]
    #[diagnostic(code(errz::task))]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl CodegenError {
    /// Create a parse error with context
    pub fn parse_error(source: serde_json::Error, path: impl Into<PathBuf>) -> Self {
        Self::ParseError {
            source,
            path: path.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an error with a description of the step that produced it
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// Walk `Stage` wrappers down to the error that started the chain
    pub fn root(&self) -> &CodegenError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension for attaching a stage description to a fallible result
pub trait StageExt<T> {
    fn stage(self, stage: impl FnOnce() -> String) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| e.in_stage(stage()))
    }
}

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;
