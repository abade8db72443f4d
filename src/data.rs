use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ErrorKind};
use crate::options::Language;

/// The built-in data store, embedded at compile time.
const BUILTIN_CV_DATA: &str = include_str!("../assets/cv_data.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub gitlab: String,
    #[serde(default)]
    pub website: String,
    /// A reference to a portrait, which is not rendered so far.
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: String,
    pub title: String,
    pub institution: String,
    #[serde(default)]
    pub location: String,
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub period: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEntry {
    pub id: String,
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtracurricularEntry {
    pub id: String,
    pub role: String,
    pub organization: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpokenLanguage {
    pub id: String,
    pub name: String,
    pub level: String,
}

/// A technology name together with a proficiency between 0 and 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub name: String,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillCategory {
    Languages,
    Frameworks,
    Databases,
    Tools,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Languages,
        SkillCategory::Frameworks,
        SkillCategory::Databases,
        SkillCategory::Tools,
    ];
}

/// The skills grouped by category. Skill names are technology names, so they are shared by all languages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    #[serde(default)]
    pub languages: Vec<SkillEntry>,
    #[serde(default)]
    pub frameworks: Vec<SkillEntry>,
    #[serde(default)]
    pub databases: Vec<SkillEntry>,
    #[serde(default)]
    pub tools: Vec<SkillEntry>,
}

impl Skills {
    pub fn category(&self, category: SkillCategory) -> &[SkillEntry] {
        match category {
            SkillCategory::Languages => &self.languages,
            SkillCategory::Frameworks => &self.frameworks,
            SkillCategory::Databases => &self.databases,
            SkillCategory::Tools => &self.tools,
        }
    }
}

/// Everything in the data store which is written in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedContent {
    pub personal_info: PersonalInfo,
    pub summary: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub languages_spoken: Vec<SpokenLanguage>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
    #[serde(default)]
    pub interests: Vec<InterestEntry>,
    #[serde(default)]
    pub extracurricular: Vec<ExtracurricularEntry>,
}

/// The CV data store: the language-neutral skills plus one `LocalizedContent` per language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    #[serde(default)]
    pub skills: Skills,
    pub locales: BTreeMap<Language, LocalizedContent>,
}

/// An entry which carries a stable identifier shared by all of its translations.
trait Identified {
    fn id(&self) -> &str;
}

macro_rules! impl_identified {
    ($($entry:ty),*) => {
        $(impl Identified for $entry {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(
    EducationEntry,
    ExperienceEntry,
    ProjectEntry,
    CertificationEntry,
    InterestEntry,
    ExtracurricularEntry,
    SpokenLanguage
);

impl CvData {
    /// Loads and validates the data store which ships with the crate.
    pub fn builtin() -> Result<CvData, ContextError> {
        CvData::from_json_str(BUILTIN_CV_DATA)
    }

    pub fn from_path(data_path: &Path) -> Result<CvData, ContextError> {
        let data_content = std::fs::read_to_string(data_path).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Configuration,
                format!("Unable to read the CV data {:?}", data_path),
                &error,
            )
        })?;

        CvData::from_json_str(&data_content)
    }

    /// Parses the data store and validates it, so that a malformed store is rejected at load time.
    pub fn from_json_str(json: &str) -> Result<CvData, ContextError> {
        let data: CvData = serde_json::from_str(json).map_err(|error| {
            ContextError::with_error(ErrorKind::Validation, "Unable to parse the CV data", &error)
        })?;
        data.validate()?;

        Ok(data)
    }

    /// Returns the content written in the given language.
    pub fn content(&self, language: Language) -> Result<&LocalizedContent, ContextError> {
        self.locales.get(&language).ok_or_else(|| {
            ContextError::configuration(format!(
                "The CV data has no content for the language {:?}",
                language.code()
            ))
        })
    }

    /// The identifiers of the first `count` projects, in data store order.
    pub fn default_project_ids(&self, count: usize) -> Vec<String> {
        self.locales
            .values()
            .next()
            .map(|content| {
                content
                    .projects
                    .iter()
                    .take(count)
                    .map(|project| project.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks the structural invariants of the data store: the skill levels are percentages and every
    /// language holds the same entries, identified by the same identifiers and in the same order.
    pub fn validate(&self) -> Result<(), ContextError> {
        for category in SkillCategory::ALL {
            for skill in self.skills.category(category) {
                if skill.name.trim().is_empty() {
                    return Err(ContextError::validation(format!(
                        "A skill in the category {:?} has no name",
                        category
                    )));
                }
                if skill.level > 100 {
                    return Err(ContextError::validation(format!(
                        "The skill {:?} has a level of {}, which exceeds 100",
                        skill.name, skill.level
                    )));
                }
            }
        }

        let mut locales = self.locales.iter();
        let Some((reference_language, reference)) = locales.next() else {
            return Err(ContextError::validation(
                "The CV data contains no language at all",
            ));
        };

        check_unique_identifiers(*reference_language, reference)?;
        for (language, content) in locales {
            check_unique_identifiers(*language, content)?;

            let reference = (*reference_language, reference);
            let other = (*language, content);
            check_alignment("education", reference, other, |content| &content.education)?;
            check_alignment("experience", reference, other, |content| &content.experience)?;
            check_alignment("projects", reference, other, |content| &content.projects)?;
            check_alignment("languagesSpoken", reference, other, |content| {
                &content.languages_spoken
            })?;
            check_alignment("certifications", reference, other, |content| {
                &content.certifications
            })?;
            check_alignment("interests", reference, other, |content| &content.interests)?;
            check_alignment("extracurricular", reference, other, |content| {
                &content.extracurricular
            })?;
        }

        Ok(())
    }
}

fn check_unique_identifiers(
    language: Language,
    content: &LocalizedContent,
) -> Result<(), ContextError> {
    fn unique<T: Identified>(
        entity: &str,
        language: Language,
        entries: &[T],
    ) -> Result<(), ContextError> {
        let mut seen = HashSet::new();
        for entry in entries {
            if entry.id().trim().is_empty() {
                return Err(ContextError::validation(format!(
                    "An entry of {:?} in the language {:?} has an empty identifier",
                    entity,
                    language.code()
                )));
            }
            if !seen.insert(entry.id()) {
                return Err(ContextError::validation(format!(
                    "The identifier {:?} appears twice in {:?} for the language {:?}",
                    entry.id(),
                    entity,
                    language.code()
                )));
            }
        }
        Ok(())
    }

    unique("education", language, &content.education)?;
    unique("experience", language, &content.experience)?;
    unique("projects", language, &content.projects)?;
    unique("languagesSpoken", language, &content.languages_spoken)?;
    unique("certifications", language, &content.certifications)?;
    unique("interests", language, &content.interests)?;
    unique("extracurricular", language, &content.extracurricular)
}

fn check_alignment<T: Identified>(
    entity: &str,
    (reference_language, reference): (Language, &LocalizedContent),
    (language, content): (Language, &LocalizedContent),
    entries: impl Fn(&LocalizedContent) -> &Vec<T>,
) -> Result<(), ContextError> {
    let reference_entries = entries(reference);
    let other_entries = entries(content);

    if reference_entries.len() != other_entries.len() {
        return Err(ContextError::validation(format!(
            "The {:?} entries differ in number: {} for {:?} but {} for {:?}",
            entity,
            reference_entries.len(),
            reference_language.code(),
            other_entries.len(),
            language.code()
        )));
    }

    for (index, (reference_entry, other_entry)) in
        reference_entries.iter().zip(other_entries).enumerate()
    {
        if reference_entry.id() != other_entry.id() {
            return Err(ContextError::validation(format!(
                "The {:?} entry at position {} is {:?} for {:?} but {:?} for {:?}",
                entity,
                index,
                reference_entry.id(),
                reference_language.code(),
                other_entry.id(),
                language.code()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_json() -> serde_json::Value {
        serde_json::from_str(BUILTIN_CV_DATA).unwrap()
    }

    #[test]
    fn builtin_data_is_valid_and_bilingual() {
        let data = CvData::builtin().unwrap();

        assert_eq!(
            data.locales.keys().copied().collect::<Vec<_>>(),
            Language::ALL.to_vec()
        );
        let english = data.content(Language::En).unwrap();
        let french = data.content(Language::Fr).unwrap();
        assert_eq!(english.projects.len(), 5);
        assert_eq!(english.experience.len(), french.experience.len());
        assert_ne!(english.summary, french.summary);
    }

    #[test]
    fn reordered_translation_is_rejected() {
        let mut json = builtin_json();
        let projects = json["locales"]["fr"]["projects"].as_array_mut().unwrap();
        projects.swap(0, 1);

        let error = CvData::from_json_str(&json.to_string()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(error.context.contains("projects"), "{}", error);
    }

    #[test]
    fn missing_translation_entry_is_rejected() {
        let mut json = builtin_json();
        json["locales"]["fr"]["experience"]
            .as_array_mut()
            .unwrap()
            .pop();

        let error = CvData::from_json_str(&json.to_string()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(error.context.contains("differ in number"), "{}", error);
    }

    #[test]
    fn skill_level_above_one_hundred_is_rejected() {
        let mut json = builtin_json();
        json["skills"]["tools"][0]["level"] = serde_json::json!(120);

        let error = CvData::from_json_str(&json.to_string()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut json = builtin_json();
        for language in ["en", "fr"] {
            json["locales"][language]["interests"][1]["id"] = serde_json::json!("reading");
        }

        let error = CvData::from_json_str(&json.to_string()).unwrap_err();
        assert!(error.context.contains("appears twice"), "{}", error);
    }

    #[test]
    fn missing_language_is_a_configuration_error() {
        let mut json = builtin_json();
        json["locales"].as_object_mut().unwrap().remove("fr");

        let data = CvData::from_json_str(&json.to_string()).unwrap();
        let error = data.content(Language::Fr).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }
}
