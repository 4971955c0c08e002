use crate::error::{CodegenError, Result};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "errz.kdl";

/// Where to read definitions from and where to write generated artifacts.
///
/// ```kdl
/// schema "schema/error_schema.json"
/// definitions "definitions"
/// output {
///     code "src/errz_gen.rs"
///     docs "docs"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub schema: PathBuf,
    pub definitions: PathBuf,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Generated Rust source file
    pub code: PathBuf,
    /// Root directory for per-domain Markdown pages
    pub docs: PathBuf,
}

impl Config {
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text
            .parse::<kdl::KdlDocument>()
            .map_err(|e| CodegenError::config(format!("Failed to parse KDL: {}", e)))?;

        let mut schema: Option<PathBuf> = None;
        let mut definitions: Option<PathBuf> = None;
        let mut output: Option<OutputConfig> = None;

        for node in doc.nodes() {
            match node.name().value() {
                "schema" => schema = Some(path_arg(node)?),
                "definitions" => definitions = Some(path_arg(node)?),
                "output" => {
                    if output.is_some() {
                        return Err(CodegenError::config("Multiple output blocks found"));
                    }
                    output = Some(parse_output(node)?);
                }
                other => {
                    return Err(CodegenError::config(format!(
                        "Unknown config node: {}",
                        other
                    )));
                }
            }
        }

        Ok(Config {
            schema: schema.ok_or_else(|| CodegenError::config("Missing schema path"))?,
            definitions: definitions
                .ok_or_else(|| CodegenError::config("Missing definitions directory"))?,
            output: output.ok_or_else(|| CodegenError::config("Missing output block"))?,
        })
    }

    /// Read a config file; relative paths in it are taken relative to the
    /// directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_kdl(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Resolve every relative path against `base`
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            schema: resolve(self.schema),
            definitions: resolve(self.definitions),
            output: OutputConfig {
                code: resolve(self.output.code),
                docs: resolve(self.output.docs),
            },
        }
    }
}

fn path_arg(node: &kdl::KdlNode) -> Result<PathBuf> {
    let name = node.name().value();
    node.entries()
        .get(0)
        .and_then(|e| e.value().as_string())
        .map(PathBuf::from)
        .ok_or_else(|| CodegenError::config(format!("{} expects a string value", name)))
}

fn parse_output(node: &kdl::KdlNode) -> Result<OutputConfig> {
    let children = node
        .children()
        .ok_or_else(|| CodegenError::config("output block has no children"))?;

    let mut code: Option<PathBuf> = None;
    let mut docs: Option<PathBuf> = None;

    for child in children.nodes() {
        match child.name().value() {
            "code" => code = Some(path_arg(child)?),
            "docs" => docs = Some(path_arg(child)?),
            other => {
                return Err(CodegenError::config(format!(
                    "Unknown output field: {}",
                    other
                )));
            }
        }
    }

    Ok(OutputConfig {
        code: code.ok_or_else(|| CodegenError::config("Missing output code path"))?,
        docs: docs.ok_or_else(|| CodegenError::config("Missing output docs directory"))?,
    })
}
