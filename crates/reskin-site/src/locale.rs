//! Site locales and the descriptor file of each one

use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "en";
const DESCRIPTOR: &str = "site.xml";

/// One site locale. The first configured locale is the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLocale {
    pub tag: String,
    pub is_default: bool,
}

impl SiteLocale {
    /// Language part of the tag (`fr` for `fr_CA`)
    pub fn language(&self) -> &str {
        self.tag
            .split(['_', '-'])
            .next()
            .unwrap_or(self.tag.as_str())
    }

    /// Descriptor of this locale under `site_directory`: `site.xml` for the
    /// default locale, otherwise `site_<language>.xml` when that file exists
    /// and `site.xml` when it does not
    pub fn descriptor_path(&self, site_directory: &Path) -> PathBuf {
        if !self.is_default {
            let localized = site_directory.join(format!("site_{}.xml", self.language()));
            if localized.is_file() {
                return localized;
            }
        }
        site_directory.join(DESCRIPTOR)
    }
}

impl fmt::Display for SiteLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Locales from a comma separated `locales` setting; none configured means
/// the single default locale
pub fn site_locales(configured: Option<&str>) -> Vec<SiteLocale> {
    let mut locales: Vec<SiteLocale> = Vec::new();
    for tag in configured.unwrap_or_default().split(',').map(str::trim) {
        if tag.is_empty() || locales.iter().any(|l| l.tag == tag) {
            continue;
        }
        locales.push(SiteLocale {
            tag: tag.to_string(),
            is_default: locales.is_empty(),
        });
    }
    if locales.is_empty() {
        locales.push(SiteLocale {
            tag: DEFAULT_LANGUAGE.to_string(),
            is_default: true,
        });
    }
    locales
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_when_unconfigured() {
        let locales = site_locales(None);
        assert_eq!(locales.len(), 1);
        assert!(locales[0].is_default);
        assert_eq!(locales[0].tag, DEFAULT_LANGUAGE);
        assert_eq!(site_locales(Some(" , ")).len(), 1);
    }

    #[test]
    fn test_first_configured_locale_is_default() {
        let locales = site_locales(Some("en, fr_CA,de,fr_CA"));
        let tags: Vec<&str> = locales.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["en", "fr_CA", "de"]);
        assert!(locales[0].is_default);
        assert!(!locales[1].is_default);
        assert_eq!(locales[1].language(), "fr");
    }

    #[test]
    fn test_descriptor_path_prefers_existing_localized_file() {
        let dir = tempfile::tempdir().unwrap();
        let locales = site_locales(Some("en,fr,de"));
        std::fs::write(dir.path().join("site_fr.xml"), "<project/>").unwrap();

        assert_eq!(locales[0].descriptor_path(dir.path()), dir.path().join("site.xml"));
        assert_eq!(locales[1].descriptor_path(dir.path()), dir.path().join("site_fr.xml"));
        assert_eq!(locales[2].descriptor_path(dir.path()), dir.path().join("site.xml"));
    }
}
