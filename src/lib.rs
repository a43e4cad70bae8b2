//! Gecko extension packager
//!
//! Turns an extension source tree into an XPI: the package contents are
//! collected in memory, locale catalogs are completed from the default
//! locale, `install.rdf` and `bootstrap.js` are generated, selected files are
//! preprocessed as templates, and the result is optionally signed before it
//! is written out as a ZIP archive.

pub mod assembler;
pub mod error;
pub mod locale;
pub mod models;
pub mod packager;
pub mod parser;
pub mod utils;
pub mod validator;

pub use error::PackagerError;
pub use models::{BuildConfig, BuildParams, LocaleSelection, Warning, WarningKind};
pub use packager::Files;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

const GENERAL_SECTION: &str = "general";
const MAPPING_SECTION: &str = "mapping";
const PREPROCESS_SECTION: &str = "preprocess";

/// Outcome of a build written to disk.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub path: PathBuf,
    pub version: String,
    pub file_count: usize,
    pub warnings: Vec<Warning>,
}

/// Values available to files listed in `[preprocess]`.
#[derive(Debug, Serialize)]
struct PreprocessParams<'a> {
    version: &'a str,
    release_build: bool,
    locales: &'a [String],
    basename: &'a str,
}

/// Locales packaged for `config`.
pub fn resolve_locales(config: &BuildConfig) -> Result<Vec<String>> {
    match &config.locales {
        LocaleSelection::Default => {
            locale::get_locales(&config.locales_dir(), false, &config.default_locale)
        }
        LocaleSelection::All => {
            locale::get_locales(&config.locales_dir(), true, &config.default_locale)
        }
        LocaleSelection::Explicit(locales) => {
            if let Some(invalid) = locales.iter().find(|l| !locale::is_locale_name(l)) {
                return Err(PackagerError::InvalidLocaleSelection(invalid.clone()).into());
            }
            Ok(locales.clone())
        }
    }
}

fn read_params(config: BuildConfig) -> Result<(BuildParams, Vec<Warning>)> {
    let locales = resolve_locales(&config)?;
    let metadata = parser::Metadata::read(&config.metadata_path())?;

    let build_num = match &config.build_num {
        Some(num) => num.clone(),
        None => utils::build_number(config.base_dir()),
    };
    let version = utils::get_build_version(
        metadata.get(GENERAL_SECTION, "version")?,
        config.release_build,
        &build_num,
    );

    let mut warnings = Vec::new();
    let contributors = assembler::get_contributors(&metadata, &mut warnings)?;

    let params = BuildParams {
        config,
        locales,
        version,
        metadata,
        contributors,
    };
    Ok((params, warnings))
}

/// Collect the complete package for `config` without writing anything.
pub fn assemble(config: BuildConfig) -> Result<(BuildParams, Files)> {
    let (params, warnings) = read_params(config)?;
    let config = &params.config;
    tracing::debug!(
        "Packaging {} version {} with locales {:?}",
        config.base_dir.display(),
        params.version,
        params.locales
    );

    let filter = packager::PathFilter::for_package(config.base_dir())?;
    let mut files =
        Files::new(filter).with_transform(locale::LocaleMacro::new(params.locales.clone()));
    for warning in warnings {
        files.add_warning(warning);
    }

    files.put(
        assembler::install_manifest::INSTALL_MANIFEST_PATH,
        assembler::create_manifest(&params)?,
    );
    files.read_mapped(params.metadata.items(MAPPING_SECTION))?;
    files.read(config.base_dir(), "", &["chrome"])?;
    for (name, path) in config.chrome_subdirs(&params.locales) {
        if path.is_dir() {
            files.read(&path, &format!("chrome/{}", name), &[])?;
        }
    }

    locale::import_locales(&params, &params.locales, &mut files)?;
    locale::fixup_locales(&params, &mut files)?;
    assembler::add_missing_files(&params, &mut files)?;

    let templates: Vec<String> = params
        .metadata
        .items(PREPROCESS_SECTION)
        .iter()
        .map(|item| item.key.clone())
        .collect();
    if !templates.is_empty() {
        let basename = params.metadata.get_opt(GENERAL_SECTION, "basename").unwrap_or("");
        files.preprocess(
            &templates,
            &PreprocessParams {
                version: &params.version,
                release_build: config.release_build,
                locales: &params.locales,
                basename,
            },
        )?;
    }

    validator::validate_package(&files)?;

    if let Some(key_file) = &config.key_file {
        packager::sign_files(&mut files, key_file)?;
    }

    Ok((params, files))
}

/// Build the archive in memory.
pub fn build_to_vec(config: BuildConfig) -> Result<(BuildParams, Vec<u8>)> {
    let (params, files) = assemble(config)?;
    let data = files.zip_to_vec()?;
    Ok((params, data))
}

/// Build the archive and write it to the configured output file, by default
/// `<basename>-<version>.xpi` in the working directory.
pub fn create_build(config: BuildConfig) -> Result<BuildOutput> {
    let (params, mut files) = assemble(config)?;
    let data = files.zip_to_vec()?;

    let path = match &params.config.out_file {
        Some(path) => path.clone(),
        None => {
            let basename = params.metadata.get(GENERAL_SECTION, "basename")?;
            PathBuf::from(utils::default_file_name(basename, &params.version, "xpi"))
        }
    };
    packager::write_archive(&path, &data)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} ({} files)", path.display(), files.len());
    Ok(BuildOutput {
        path,
        version: params.version,
        file_count: files.len(),
        warnings: files.take_warnings(),
    })
}
