use clap::CommandFactory;
use clap_complete::{generate_to, shells};
use clap_mangen::Man;
use std::io::Result;
use std::path::{Path, PathBuf};

#[path = "src/cli.rs"]
mod cli;

const BIN_NAME: &str = "errz-gen";

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").unwrap_or_default());
    let mut cmd = cli::GenArgs::command();

    write_man_page(&out_dir.join("man"), &cmd)?;
    write_completions(&out_dir.join("completions"), &mut cmd)?;

    Ok(())
}

fn write_man_page(dir: &Path, cmd: &clap::Command) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut page = Vec::new();
    Man::new(cmd.clone()).render(&mut page)?;
    std::fs::write(dir.join(format!("{BIN_NAME}.1")), page)
}

fn write_completions(dir: &Path, cmd: &mut clap::Command) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    generate_to(shells::Bash, cmd, BIN_NAME, dir)?;
    generate_to(shells::Fish, cmd, BIN_NAME, dir)?;
    generate_to(shells::Zsh, cmd, BIN_NAME, dir)?;

    Ok(())
}
