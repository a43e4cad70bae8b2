//! Generation of files the extension runtime needs
//!
//! `install.rdf` is always generated. `bootstrap.js` is generated unless the
//! package ships its own: the package contents are scanned for the features
//! the bootstrap code has to wire up, and modules required from scripts are
//! pulled in from the module library until nothing new is required.

pub mod contributors;
pub mod install_manifest;

pub use contributors::get_contributors;
pub use install_manifest::{create_manifest, KNOWN_APPS};

use crate::models::{BuildParams, FileKind};
use crate::packager::Files;
use crate::parser::scripts::{find_window_type, ScriptScan};
use crate::utils::template;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::path::Path;

pub const BOOTSTRAP_PATH: &str = "bootstrap.js";
pub const CHROME_MANIFEST_PATH: &str = "chrome.manifest";
pub const PREFS_PATH: &str = "defaults/prefs.json";

const BOOTSTRAP_TEMPLATE: &str = include_str!("../../templates/bootstrap.js.tmpl");

/// Everything the bootstrap template is rendered with.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapData {
    pub has_chrome: bool,
    pub has_chrome_requires: bool,
    pub has_shutdown_handlers: bool,
    pub has_xml_http_request: bool,
    pub has_version_pref: bool,
    pub chrome_windows: Vec<String>,
    pub requires: BTreeSet<String>,
    pub metadata: BTreeMap<String, BTreeMap<String, String>>,
    pub multicompartment: bool,
    /// Application id -> application name
    pub applications: BTreeMap<String, String>,
}

pub struct ManifestAssembler<'a> {
    params: &'a BuildParams,
    data: BootstrapData,
}

impl<'a> ManifestAssembler<'a> {
    pub fn new(params: &'a BuildParams) -> Self {
        let data = BootstrapData {
            metadata: params.metadata.to_map(),
            multicompartment: params.config.multicompartment,
            applications: KNOWN_APPS
                .iter()
                .map(|(name, id)| (id.to_string(), name.to_string()))
                .collect(),
            ..BootstrapData::default()
        };
        Self { params, data }
    }

    pub fn data(&self) -> &BootstrapData {
        &self.data
    }

    /// Scan every packaged file.
    pub fn inspect(&mut self, files: &Files) -> Result<()> {
        for (name, content) in files.iter() {
            if name == CHROME_MANIFEST_PATH {
                self.data.has_chrome = true;
            } else if name == PREFS_PATH {
                self.data.has_version_pref = declares_version_pref(content)?;
            } else {
                match FileKind::from_path(name) {
                    FileKind::Script => {
                        self.check_script(name, content);
                    }
                    FileKind::Xul => {
                        if let Some(window_type) = find_window_type(&String::from_utf8_lossy(content)) {
                            self.data.chrome_windows.push(window_type);
                        }
                    }
                    FileKind::ChromeManifest | FileKind::Markup | FileKind::Other => {}
                }
            }
        }
        Ok(())
    }

    /// Record what a script needs, returning the modules it requires.
    fn check_script(&mut self, name: &str, content: &[u8]) -> Vec<String> {
        let scan = ScriptScan::scan(&String::from_utf8_lossy(content));
        if !scan.requires.is_empty() && name.starts_with("chrome/content/") {
            self.data.has_chrome_requires = true;
        }
        if name.starts_with("lib/") && scan.uses_xml_http_request {
            self.data.has_xml_http_request = true;
        }
        if (!name.contains('/') || name.starts_with("lib/")) && scan.registers_shutdown_handler {
            self.data.has_shutdown_handlers = true;
        }
        self.data.requires.extend(scan.requires.iter().cloned());
        scan.requires
    }

    /// Pull required modules missing from the package out of the module
    /// library, following their requirements in turn. Each module is looked
    /// at once, so require cycles terminate.
    pub fn resolve_modules(&mut self, files: &mut Files) -> Result<()> {
        let Some(library) = self.params.config.module_library.clone() else {
            return Ok(());
        };

        let mut queue: VecDeque<String> = self.data.requires.iter().cloned().collect();
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(module) = queue.pop_front() {
            if !visited.insert(module.clone()) {
                continue;
            }
            let module_file = module_path(&module);
            if files.contains(&module_file) {
                continue;
            }
            let source = library_path(&library, &module);
            if !source.is_file() {
                tracing::debug!("Module {} not found in {}", module, library.display());
                continue;
            }

            files.read(&source, &module_file, &[])?;
            let content = files.get(&module_file).map(<[u8]>::to_vec).unwrap_or_default();
            for required in self.check_script(&module_file, &content) {
                if !visited.contains(&required) {
                    queue.push_back(required);
                }
            }
        }
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        Ok(template::render("bootstrap.js.tmpl", BOOTSTRAP_TEMPLATE, false, &self.data)?)
    }
}

fn module_path(module: &str) -> String {
    format!("lib/{}.js", module)
}

fn library_path(library: &Path, module: &str) -> std::path::PathBuf {
    library.join("lib").join(format!("{}.js", module))
}

fn declares_version_pref(content: &[u8]) -> Result<bool> {
    let prefs: serde_json::Value = serde_json::from_slice(content)
        .with_context(|| format!("Failed to parse {}", PREFS_PATH))?;
    Ok(prefs
        .get("defaults")
        .and_then(|defaults| defaults.as_object())
        .map(|defaults| defaults.contains_key("currentVersion"))
        .unwrap_or(false))
}

/// Generate `bootstrap.js` unless the package already has one.
pub fn add_missing_files(params: &BuildParams, files: &mut Files) -> Result<()> {
    if files.contains(BOOTSTRAP_PATH) {
        return Ok(());
    }
    let mut assembler = ManifestAssembler::new(params);
    assembler.inspect(files)?;
    assembler.resolve_modules(files)?;
    let bootstrap = assembler.render()?;
    files.put(BOOTSTRAP_PATH, bootstrap);
    Ok(())
}
