use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::CvData;
use crate::error::ContextError;

/// The most project identifiers a caller is expected to select.
pub const MAX_SELECTED_PROJECTS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

/// The content-density preset of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    #[default]
    Full,
    Short,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = ContextError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(ContextError::configuration(format!(
                "Unsupported language {:?}, expected one of \"en\" or \"fr\"",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = ContextError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ContextError::configuration(format!(
                "Unsupported theme {:?}, expected one of \"light\" or \"dark\"",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Version {
    type Err = ContextError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Version::Full),
            "short" => Ok(Version::Short),
            other => Err(ContextError::configuration(format!(
                "Unsupported version {:?}, expected one of \"full\" or \"short\"",
                other
            ))),
        }
    }
}

/// The caller-controlled booleans gating the three optional sections of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleSections {
    #[serde(default = "visible")]
    pub interests: bool,
    #[serde(default = "visible")]
    pub certifications: bool,
    #[serde(default = "visible")]
    pub extracurricular: bool,
}

fn visible() -> bool {
    true
}

impl Default for VisibleSections {
    fn default() -> Self {
        VisibleSections {
            interests: true,
            certifications: true,
            extracurricular: true,
        }
    }
}

impl VisibleSections {
    pub const NONE: VisibleSections = VisibleSections {
        interests: false,
        certifications: false,
        extracurricular: false,
    };

    /// Reads the flags out of an arbitrary JSON value. Unknown keys and flags which are not booleans
    /// leave the defaults in place and are reported as `Validation` warnings instead of failing.
    pub fn from_json_value(value: &serde_json::Value) -> (VisibleSections, Vec<ContextError>) {
        let mut visible_sections = VisibleSections::default();
        let mut warnings = Vec::new();

        let Some(flags) = value.as_object() else {
            if !value.is_null() {
                warnings.push(ContextError::validation(format!(
                    "The visible sections should be an object of booleans instead of {}, all sections are shown",
                    value
                )));
            }
            return (visible_sections, warnings);
        };
        for (key, flag) in flags.iter() {
            let section = match key.as_str() {
                "interests" => &mut visible_sections.interests,
                "certifications" => &mut visible_sections.certifications,
                "extracurricular" => &mut visible_sections.extracurricular,
                _ => {
                    warnings.push(ContextError::validation(format!(
                        "The section {:?} is not an optional section and its flag is ignored",
                        key
                    )));
                    continue;
                }
            };
            match flag.as_bool() {
                Some(flag) => *section = flag,
                None => warnings.push(ContextError::validation(format!(
                    "The flag of the section {:?} should be a boolean instead of {}, the section is shown",
                    key, flag
                ))),
            }
        }

        (visible_sections, warnings)
    }
}

/// The wire shape of the render options, where the visibility flags are kept as raw JSON
/// so that malformed flags do not fail the parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRenderOptions {
    #[serde(default)]
    theme: Theme,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    version: Version,
    #[serde(default)]
    selected_projects: Vec<String>,
    #[serde(default)]
    visible_sections: serde_json::Value,
}

impl From<RawRenderOptions> for RenderOptions {
    fn from(raw: RawRenderOptions) -> Self {
        let (visible_sections, warnings) = VisibleSections::from_json_value(&raw.visible_sections);
        for warning in warnings.iter() {
            log::warn!("{}", warning);
        }

        RenderOptions {
            theme: raw.theme,
            language: raw.language,
            version: raw.version,
            selected_projects: raw.selected_projects,
            visible_sections,
            warnings,
        }
    }
}

/// The complete input determining the content and appearance of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRenderOptions")]
pub struct RenderOptions {
    pub theme: Theme,
    pub language: Language,
    pub version: Version,
    pub selected_projects: Vec<String>,
    pub visible_sections: VisibleSections,
    /// The problems found in the visibility flags while parsing, carried over into the selection.
    #[serde(skip)]
    pub warnings: Vec<ContextError>,
}

impl RenderOptions {
    /// The default options with the first five projects of the data store selected.
    pub fn with_default_projects(data: &CvData) -> RenderOptions {
        RenderOptions {
            selected_projects: data.default_project_ids(MAX_SELECTED_PROJECTS),
            ..RenderOptions::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<RenderOptions, ContextError> {
        serde_json::from_str(json).map_err(|error| {
            ContextError::with_error(
                crate::error::ErrorKind::Configuration,
                "Unable to parse the render options",
                &error,
            )
        })
    }

    pub fn from_path(options_path: &Path) -> Result<RenderOptions, ContextError> {
        let options_content = std::fs::read_to_string(options_path).map_err(|error| {
            ContextError::with_error(
                crate::error::ErrorKind::Configuration,
                format!("Unable to read the render options {:?}", options_path),
                &error,
            )
        })?;

        RenderOptions::from_json_str(&options_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_the_wire_shape() {
        let options = RenderOptions::from_json_str(
            r#"{
                "theme": "dark",
                "language": "fr",
                "version": "short",
                "selectedProjects": ["real-estate", "hotel"],
                "visibleSections": { "interests": true, "certifications": false, "extracurricular": true }
            }"#,
        )
        .unwrap();

        assert_eq!(options.theme, Theme::Dark);
        assert_eq!(options.language, Language::Fr);
        assert_eq!(options.version, Version::Short);
        assert_eq!(options.selected_projects, vec!["real-estate", "hotel"]);
        assert!(!options.visible_sections.certifications);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options = RenderOptions::from_json_str("{}").unwrap();

        assert_eq!(options, RenderOptions::default());
        assert_eq!(options.visible_sections, VisibleSections::default());
    }

    #[test]
    fn unknown_language_is_a_configuration_error() {
        let error = RenderOptions::from_json_str(r#"{ "language": "de" }"#).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);

        let error = "de".parse::<Language>().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
        assert_eq!("FR".parse::<Language>().unwrap(), Language::Fr);
    }

    #[test]
    fn malformed_visibility_flags_are_warnings() {
        let options = RenderOptions::from_json_str(
            r#"{ "visibleSections": { "interests": "yes", "interest": false, "certifications": false } }"#,
        )
        .unwrap();

        assert!(options.visible_sections.interests);
        assert!(!options.visible_sections.certifications);
        assert!(options.visible_sections.extracurricular);
        assert_eq!(options.warnings.len(), 2);
        assert!(options
            .warnings
            .iter()
            .all(|warning| warning.kind == ErrorKind::Validation));
        assert!(options.warnings.iter().any(|warning| warning.context.contains("\"interest\"")));

        let options = RenderOptions::from_json_str(r#"{ "visibleSections": [true] }"#).unwrap();
        assert_eq!(options.visible_sections, VisibleSections::default());
        assert_eq!(options.warnings.len(), 1);
    }

    #[test]
    fn warnings_are_not_part_of_the_wire_shape() {
        let options =
            RenderOptions::from_json_str(r#"{ "visibleSections": { "hobbies": true } }"#).unwrap();
        assert_eq!(options.warnings.len(), 1);

        let json = serde_json::to_value(&options).unwrap();
        assert!(json.get("warnings").is_none());
        assert_eq!(json["visibleSections"]["interests"], true);
    }

    #[test]
    fn default_projects_are_the_first_five() {
        let data = CvData::builtin().unwrap();
        let options = RenderOptions::with_default_projects(&data);

        assert_eq!(
            options.selected_projects,
            vec![
                "real-estate",
                "agricultural",
                "hotel",
                "immunization",
                "task-management"
            ]
        );
    }
}
