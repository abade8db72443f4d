use serde::Serialize;

use crate::data::SkillCategory;
use crate::options::Language;

/// The label strings which appear inside the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translations {
    pub summary: &'static str,
    pub education: &'static str,
    pub experience: &'static str,
    pub projects: &'static str,
    pub skills: &'static str,
    pub languages: &'static str,
    pub certifications: &'static str,
    pub interests: &'static str,
    pub extracurricular: &'static str,
    pub skill_languages: &'static str,
    pub skill_frameworks: &'static str,
    pub skill_databases: &'static str,
    pub skill_tools: &'static str,
}

impl Translations {
    pub fn skill_category(&self, category: SkillCategory) -> &'static str {
        match category {
            SkillCategory::Languages => self.skill_languages,
            SkillCategory::Frameworks => self.skill_frameworks,
            SkillCategory::Databases => self.skill_databases,
            SkillCategory::Tools => self.skill_tools,
        }
    }
}

pub const ENGLISH: Translations = Translations {
    summary: "Professional Summary",
    education: "Education",
    experience: "Professional Experience",
    projects: "Key Projects",
    skills: "Technical Skills",
    languages: "Languages",
    certifications: "Certifications",
    interests: "Interests",
    extracurricular: "Extracurricular Activities",
    skill_languages: "Languages",
    skill_frameworks: "Frameworks",
    skill_databases: "Databases",
    skill_tools: "Tools",
};

pub const FRENCH: Translations = Translations {
    summary: "Profil Professionnel",
    education: "Formation",
    experience: "Expérience Professionnelle",
    projects: "Projets Clés",
    skills: "Compétences Techniques",
    languages: "Langues",
    certifications: "Certifications",
    interests: "Centres d'Intérêt",
    extracurricular: "Activités Extrascolaires",
    skill_languages: "Langages",
    skill_frameworks: "Frameworks",
    skill_databases: "Bases de données",
    skill_tools: "Outils",
};

/// The translation table, mapping each supported language to its labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationTable;

impl TranslationTable {
    pub fn get(&self, language: Language) -> &'static Translations {
        match language {
            Language::En => &ENGLISH,
            Language::Fr => &FRENCH,
        }
    }
}
