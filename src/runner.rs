use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use thiserror::Error;

use crate::annotator::annotate;
use crate::config::{load_config, validate};
use crate::constants::{
    CONFIG_FILE_ENV, EXIT_SUCCESS, EXTRA_PROPERTIES_ENV, OUTPUT_FILE_PREFIX, REPORT_PATH_ENV,
};
use crate::document::Document;
use crate::types::AnnotateResult;

#[derive(Args, Clone, Debug)]
pub struct AnnotateArgs {
    #[arg(
        long,
        required = true,
        env = REPORT_PATH_ENV,
        help = "Path to the XML file with the tests report."
    )]
    pub report_path: PathBuf,
    #[arg(
        long,
        required = true,
        env = CONFIG_FILE_ENV,
        help = "Path to the YAML configuration file."
    )]
    pub config_file: PathBuf,
    #[arg(
        long,
        env = EXTRA_PROPERTIES_ENV,
        help = "Comma-separated list of extra testsuites properties in <property-name>:<value> format."
    )]
    pub extra_testsuites_properties: Option<String>,
    #[arg(
        long,
        help = "Value to override the output path. Defaults to processed-<report file name> next to the report."
    )]
    pub output_path: Option<PathBuf>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingFileError {
    #[error("Failed to locate xml report file: {0:?}")]
    Report(PathBuf),
    #[error("Failed to locate configuration file: {0:?}")]
    Config(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateRun {
    pub output_path: PathBuf,
    pub result: AnnotateResult,
}

pub fn run_annotate(args: AnnotateArgs) -> anyhow::Result<i32> {
    let AnnotateRun {
        output_path,
        result,
    } = annotate_report(args)?;

    log::info!(
        "Annotated {} of {} test cases ({} renamed)",
        result.annotated,
        result.test_cases,
        result.renamed
    );
    log::info!("Wrote processed report to {:?}", output_path);
    Ok(EXIT_SUCCESS)
}

pub fn annotate_report(args: AnnotateArgs) -> anyhow::Result<AnnotateRun> {
    let AnnotateArgs {
        report_path,
        config_file,
        extra_testsuites_properties,
        output_path,
    } = args;

    if !report_path.exists() {
        return Err(MissingFileError::Report(report_path).into());
    }
    if !config_file.exists() {
        return Err(MissingFileError::Config(config_file).into());
    }

    let output_path = match output_path {
        Some(output_path) => output_path,
        None => default_output_path(&report_path)?,
    };

    let config = load_config(&config_file)
        .with_context(|| format!("Failed to load configuration file {:?}", config_file))?;
    let config = validate(config, extra_testsuites_properties)?;
    log::info!("Annotating {:?} for project {}", report_path, config.project);

    let mut document = read_report(&report_path)?;
    let result = annotate(&mut document, &config)?;
    write_output(&document, &output_path)?;

    Ok(AnnotateRun {
        output_path,
        result,
    })
}

pub fn read_report<P: AsRef<Path>>(path: P) -> anyhow::Result<Document> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open xml report {:?}", path))?;
    Document::parse(BufReader::new(file))
        .with_context(|| format!("Failed to parse xml report {:?}", path))
}

/// Serializes the whole document before touching the output file.
pub fn write_output<P: AsRef<Path>>(document: &Document, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let bytes = document.to_bytes()?;
    fs::write(path, bytes).with_context(|| format!("Failed to write processed report {:?}", path))
}

pub fn default_output_path<P: AsRef<Path>>(report_path: P) -> anyhow::Result<PathBuf> {
    let report_path = report_path.as_ref();
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Report path {:?} has no file name", report_path))?;
    let mut output_name = std::ffi::OsString::from(OUTPUT_FILE_PREFIX);
    output_name.push(file_name);
    Ok(report_path.with_file_name(output_name))
}
