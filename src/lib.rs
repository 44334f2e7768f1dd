use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use thiserror::Error;
use vm::VmWriter;

pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod vm;

#[cfg(feature = "analyzer")]
pub mod analyzer;
#[cfg(feature = "analyzer")]
pub use analyzer::{parse_tree_xml, tokenize_xml};

pub const SOURCE_EXTENSION: &str = "jack";
pub const OUTPUT_EXTENSION: &str = "vm";

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("input file or directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("input file must have a .jack extension: {}", .0.display())]
    WrongExtension(PathBuf),

    #[error("no .jack files found in directory: {}", .0.display())]
    NoSources(PathBuf),
}

/// Compiles the source of one class to VM text. Nothing is produced unless
/// the whole class compiles.
pub fn compile(input: &str) -> anyhow::Result<String> {
    let code = parser::compile_class(input, Vec::new())?;
    debug!("generated {} instructions", code.len());

    let mut writer = VmWriter::new(Vec::new());
    writer.write_all(&code)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Compiles `path` and writes the result next to it. The output file is only
/// created once compilation succeeded.
pub fn compile_file(path: &Path) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let code = compile(&text)?;

    let out = path.with_extension(OUTPUT_EXTENSION);
    fs::write(&out, code).with_context(|| format!("failed to write {}", out.display()))?;
    info!("compiled {} -> {}", path.display(), out.display());
    Ok(out)
}

/// Writes `<Name>T.xml` with the token stream of `path`.
#[cfg(feature = "analyzer")]
pub fn write_token_xml(path: &Path) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let xml = tokenize_xml(&text)?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let out = path.with_file_name(format!("{stem}T.xml"));
    fs::write(&out, xml).with_context(|| format!("failed to write {}", out.display()))?;
    info!("tokenized {} -> {}", path.display(), out.display());
    Ok(out)
}

/// Writes `<Name>.xml` with the parse tree of `path`.
#[cfg(feature = "analyzer")]
pub fn write_tree_xml(path: &Path) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let xml = parse_tree_xml(&text)?;

    let out = path.with_extension("xml");
    fs::write(&out, xml).with_context(|| format!("failed to write {}", out.display()))?;
    info!("parsed {} -> {}", path.display(), out.display());
    Ok(out)
}

fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Expands the CLI path into the list of sources to compile, sorted by name.
pub fn source_files(path: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    if !path.exists() {
        return Err(UsageError::NotFound(path.to_path_buf()).into());
    }

    if path.is_file() {
        if !is_source(path) {
            return Err(UsageError::WrongExtension(path.to_path_buf()).into());
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("failed to list {}", path.display()))? {
        let entry_path = entry?.path();
        if entry_path.is_file() && is_source(&entry_path) {
            files.push(entry_path);
        }
    }

    if files.is_empty() {
        return Err(UsageError::NoSources(path.to_path_buf()).into());
    }
    files.sort();
    Ok(files)
}
