use clap::Parser;
use errz_codegen::cli::GenArgs;
use errz_codegen::config::{Config, DEFAULT_CONFIG_FILE, OutputConfig};
use errz_codegen::pipeline::Generator;
use miette::{Result, miette};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = GenArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(&args)?;
    if args.verbose {
        println!("Loading definitions from {:?}...", config.definitions);
    }

    let generator = Generator::from_config(&config);
    let summary = generator.run().await?;

    println!(
        "Generated {} error definitions across {} domains",
        summary.definitions,
        summary.domains.len()
    );
    println!("  code: {}", summary.code_path.display());
    for path in &summary.doc_paths {
        println!("  docs: {}", path.display());
    }

    Ok(())
}

/// Merge the config file (explicit, or `errz.kdl` if present) with flags.
/// Flags win over file values.
fn resolve_config(args: &GenArgs) -> Result<Config> {
    let from_file = match &args.config {
        Some(path) => Some(Config::load(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            Some(Config::load(DEFAULT_CONFIG_FILE)?)
        }
        None => None,
    };

    let pick = |flag: &Option<PathBuf>, file: Option<&PathBuf>, what: &str| -> Result<PathBuf> {
        flag.clone()
            .or_else(|| file.cloned())
            .ok_or_else(|| {
                miette!(
                    "no {} given: pass it as a flag or set it in {}",
                    what,
                    DEFAULT_CONFIG_FILE
                )
            })
    };

    let file = from_file.as_ref();
    let config = Config {
        schema: pick(&args.schema, file.map(|c| &c.schema), "schema path")?,
        definitions: pick(
            &args.definitions,
            file.map(|c| &c.definitions),
            "definitions directory",
        )?,
        output: OutputConfig {
            code: pick(&args.output, file.map(|c| &c.output.code), "code output path")?,
            docs: pick(&args.docs, file.map(|c| &c.output.docs), "docs output directory")?,
        },
    };

    Ok(config)
}
