use std::path::Path;

use crate::data::CvData;
use crate::error::ContextError;
use crate::options::Language;
use crate::translations::{TranslationTable, Translations};

/// The immutable inputs shared by every render: the CV data store and the translation table.
/// It is loaded once and then passed by reference into the export functions.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub data: CvData,
    pub translations: TranslationTable,
}

impl Catalog {
    pub fn new(data: CvData) -> Self {
        Catalog {
            data,
            translations: TranslationTable,
        }
    }

    /// The catalog built from the data store which ships with the crate.
    pub fn builtin() -> Result<Self, ContextError> {
        Ok(Catalog::new(CvData::builtin()?))
    }

    pub fn from_data_path(data_path: &Path) -> Result<Self, ContextError> {
        Ok(Catalog::new(CvData::from_path(data_path)?))
    }

    pub fn translations(&self, language: Language) -> &'static Translations {
        self.translations.get(language)
    }
}
