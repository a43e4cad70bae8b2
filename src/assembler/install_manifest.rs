//! `install.rdf` generation

use crate::models::BuildParams;
use crate::parser::LocaleCatalog;
use crate::utils::template;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

pub const INSTALL_MANIFEST_PATH: &str = "install.rdf";
pub const COMPAT_SECTION: &str = "compat";
const LOCALE_META_FILE: &str = "meta.properties";

const INSTALL_MANIFEST_TEMPLATE: &str = include_str!("../../templates/install.rdf.tmpl");

/// Application name -> application id
pub const KNOWN_APPS: &[(&str, &str)] = &[
    ("conkeror", "{a79fe89b-6662-4ff4-8e88-09950ad4dfde}"),
    ("emusic", "dlm@emusic.com"),
    ("fennec", "{a23983c0-fd0e-11dc-95ff-0800200c9a66}"),
    ("fennec2", "{aa3c5121-dab2-40e2-81ca-7ea25febc110}"),
    ("firefox", "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}"),
    ("midbrowser", "{aa5ca914-c309-495d-91cf-3141bbb04115}"),
    ("prism", "prism@developer.mozilla.org"),
    ("seamonkey", "{92650c4d-4b8e-4d2a-b7eb-24ecf4f6b63a}"),
    ("songbird", "songbird@songbirdnest.com"),
    ("thunderbird", "{3550f703-e582-4d05-9a08-453d09bdfdc6}"),
    ("toolkit", "toolkit@mozilla.org"),
    ("adblockbrowser", "{55aba3ac-94d3-41a8-9e25-5c21fe874539}"),
];

pub fn known_app_id(name: &str) -> Option<&'static str> {
    KNOWN_APPS.iter().find(|(app, _)| *app == name).map(|(_, id)| *id)
}

/// Strings from a locale's `meta.properties`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocaleMetadata {
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
    pub translators: Vec<String>,
}

impl LocaleMetadata {
    fn from_catalog(catalog: &LocaleCatalog) -> Self {
        let values: BTreeMap<String, String> = catalog
            .entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut translators: Vec<String> = values
            .get("translator")
            .map(|t| {
                t.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        translators.sort_by_key(|name| name.to_lowercase());
        Self { values, translators }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetApplication {
    pub name: String,
    pub id: String,
    pub min_version: String,
    pub max_version: String,
}

#[derive(Debug, Serialize)]
struct InstallManifestData<'a> {
    version: &'a str,
    release_build: bool,
    multicompartment: bool,
    locales: &'a [String],
    default_locale: &'a str,
    metadata: BTreeMap<String, BTreeMap<String, String>>,
    contributors: &'a [String],
    locale_metadata: BTreeMap<String, LocaleMetadata>,
    target_applications: Vec<TargetApplication>,
}

/// Read `meta.properties` of every packaged locale and of the default locale,
/// which is always present so the manifest has fallback strings.
pub fn read_locale_metadata(params: &BuildParams) -> BTreeMap<String, LocaleMetadata> {
    let mut locales = params.locales.clone();
    if !locales.contains(&params.config.default_locale) {
        locales.push(params.config.default_locale.clone());
    }

    let mut result = BTreeMap::new();
    for locale in locales {
        let path = params.config.locales_dir().join(&locale).join(LOCALE_META_FILE);
        let metadata = fs::read_to_string(&path)
            .ok()
            .and_then(|text| LocaleCatalog::parse(&text, LOCALE_META_FILE).ok().flatten())
            .map(|catalog| LocaleMetadata::from_catalog(&catalog))
            .unwrap_or_default();
        result.insert(locale, metadata);
    }
    result
}

/// `[compat]` entries of the form `firefox = 3.6/8.0`; unknown applications
/// are left out.
pub fn target_applications(params: &BuildParams) -> Vec<TargetApplication> {
    params
        .metadata
        .items(COMPAT_SECTION)
        .iter()
        .filter_map(|item| {
            let id = known_app_id(&item.key)?;
            let (min, max) = item.value.split_once('/').unwrap_or((item.value.as_str(), ""));
            Some(TargetApplication {
                name: item.key.clone(),
                id: id.to_string(),
                min_version: min.trim().to_string(),
                max_version: max.trim().to_string(),
            })
        })
        .collect()
}

/// Render `install.rdf`.
pub fn create_manifest(params: &BuildParams) -> Result<String> {
    let data = InstallManifestData {
        version: &params.version,
        release_build: params.config.release_build,
        multicompartment: params.config.multicompartment,
        locales: &params.locales,
        default_locale: &params.config.default_locale,
        metadata: params.metadata.to_map(),
        contributors: &params.contributors,
        locale_metadata: read_locale_metadata(params),
        target_applications: target_applications(params),
    };
    Ok(template::render(
        "install.rdf.tmpl",
        INSTALL_MANIFEST_TEMPLATE,
        true,
        &data,
    )?)
}
