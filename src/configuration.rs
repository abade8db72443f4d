use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ErrorKind};

/// The base of the file name given to the exported documents.
pub const DEFAULT_BASE_FILE_NAME: &str = "Junior_Donfack_CV";
/// The first half of the trailer `ID` of every exported document.
pub const DEFAULT_DOCUMENT_IDENTIFIER: &str = "4a756e696f72446f6e6661636b4356ff";

const FORBIDDEN_FILE_NAME_CHARACTERS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// The settings of the export which are not part of the render options: how the files are named,
/// the metadata written into them and where the data store is read from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfiguration {
    pub base_file_name: String,
    pub document_identifier: String,
    /// When absent, the instance identifier is derived from the render options.
    pub instance_identifier: Option<String>,
    /// When absent, the name of the person of the CV is used.
    pub author: Option<String>,
    pub creator: String,
    pub producer: String,
    /// When absent, the data store shipped with the crate is used.
    pub data_path: Option<PathBuf>,
}

impl Default for ExportConfiguration {
    fn default() -> Self {
        ExportConfiguration {
            base_file_name: DEFAULT_BASE_FILE_NAME.into(),
            document_identifier: DEFAULT_DOCUMENT_IDENTIFIER.into(),
            instance_identifier: None,
            author: None,
            creator: "vitae".into(),
            producer: format!("vitae {}", env!("CARGO_PKG_VERSION")),
            data_path: None,
        }
    }
}

impl ExportConfiguration {
    pub fn from_path(configuration_file_path: &Path) -> Result<Self, ContextError> {
        let configuration_file_contents = std::fs::read_to_string(configuration_file_path)
            .map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Configuration,
                    format!(
                        "Failed to read the configuration file {:?}",
                        configuration_file_path
                    ),
                    &error,
                )
            })?;
        let configuration: ExportConfiguration =
            serde_json::from_str(&configuration_file_contents).map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Configuration,
                    "Failed to parse the configuration file",
                    &error,
                )
            })?;
        configuration.validate()?;

        Ok(configuration)
    }

    /// Checks that the base file name can be used as is on every platform.
    pub fn validate(&self) -> Result<(), ContextError> {
        let forbidden = |character: char| {
            FORBIDDEN_FILE_NAME_CHARACTERS.contains(&character) || character.is_control()
        };
        if self.base_file_name.is_empty() || self.base_file_name.chars().any(forbidden) {
            return Err(ContextError::configuration(format!(
                "The base file name {:?} is not a valid file name",
                self.base_file_name
            )));
        }
        if self.document_identifier.is_empty() {
            return Err(ContextError::configuration(
                "The document identifier must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let configuration: ExportConfiguration =
            serde_json::from_str(r#"{ "baseFileName": "CV" }"#).unwrap();

        assert_eq!(configuration.base_file_name, "CV");
        assert_eq!(configuration.document_identifier, DEFAULT_DOCUMENT_IDENTIFIER);
        assert_eq!(configuration.data_path, None);
    }

    #[test]
    fn configuration_is_read_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "author": "J. D. A.", "instanceIdentifier": "00000000000000000000000000000000" }}"#
        )
        .unwrap();

        let configuration = ExportConfiguration::from_path(file.path()).unwrap();

        assert_eq!(configuration.author.as_deref(), Some("J. D. A."));
        assert_eq!(configuration.base_file_name, DEFAULT_BASE_FILE_NAME);
    }

    #[test]
    fn unreadable_or_invalid_configuration_is_a_configuration_error() {
        let error =
            ExportConfiguration::from_path(Path::new("/nonexistent/vitae.json")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);

        let configuration = ExportConfiguration {
            base_file_name: "../CV".into(),
            ..ExportConfiguration::default()
        };
        assert_eq!(
            configuration.validate().unwrap_err().kind,
            ErrorKind::Configuration
        );
    }
}
