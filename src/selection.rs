use std::collections::HashSet;

use crate::data::{
    CertificationEntry, CvData, EducationEntry, ExperienceEntry, ExtracurricularEntry,
    InterestEntry, PersonalInfo, ProjectEntry, SkillCategory, SkillEntry, SpokenLanguage,
};
use crate::error::ContextError;
use crate::options::{Language, RenderOptions, Version, VisibleSections, MAX_SELECTED_PROJECTS};

/// The most experience entries shown in the full version.
pub const FULL_EXPERIENCE_LIMIT: usize = 4;
/// The most experience entries shown in the short version.
pub const SHORT_EXPERIENCE_LIMIT: usize = 2;
/// The most projects shown, whatever the version.
pub const PROJECT_LIMIT: usize = 3;

const RESPONSIBILITY_LIMIT: usize = 3;
const HIGHLIGHT_LIMIT: usize = 2;
const EXTRACURRICULAR_LIMIT: usize = 2;

/// The skill categories shown in the full version. The tools stay in the data store only.
const FULL_SKILL_CATEGORIES: [SkillCategory; 3] = [
    SkillCategory::Languages,
    SkillCategory::Frameworks,
    SkillCategory::Databases,
];

/// The short version condenses the skills to these categories, each cut to the given length.
const SHORT_SKILL_LIMITS: [(SkillCategory, usize); 2] =
    [(SkillCategory::Languages, 5), (SkillCategory::Frameworks, 3)];

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEducation<'a> {
    pub entry: &'a EducationEntry,
    pub highlights: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedExperience<'a> {
    pub entry: &'a ExperienceEntry,
    pub responsibilities: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup<'a> {
    pub category: SkillCategory,
    pub skills: &'a [SkillEntry],
}

/// The exact slice of the data store which is going to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedContent<'a> {
    pub language: Language,
    pub version: Version,
    pub personal_info: &'a PersonalInfo,
    pub summary: &'a str,
    pub education: Vec<SelectedEducation<'a>>,
    pub experience: Vec<SelectedExperience<'a>>,
    pub projects: Vec<&'a ProjectEntry>,
    pub languages_spoken: &'a [SpokenLanguage],
    pub skills: Vec<SkillGroup<'a>>,
    pub certifications: &'a [CertificationEntry],
    pub interests: &'a [InterestEntry],
    pub extracurricular: &'a [ExtracurricularEntry],
    /// The visibility of the optional sections after the version has been taken into account.
    pub visible_sections: VisibleSections,
    /// Problems with the options which did not prevent the selection.
    pub warnings: Vec<ContextError>,
}

fn first<T>(entries: &[T], count: usize) -> &[T] {
    &entries[..entries.len().min(count)]
}

/// Narrows the data store to what a document rendered with the given options contains.
///
/// Unknown project identifiers are dropped and reported as warnings, next to the warnings raised by
/// malformed visibility flags; the only error is a language for which the data store holds no content.
pub fn select_content<'a>(
    data: &'a CvData,
    options: &RenderOptions,
) -> Result<SelectedContent<'a>, ContextError> {
    let content = data.content(options.language)?;
    // The visibility warnings were logged when the options were parsed
    let mut warnings = options.warnings.clone();
    let logged_warnings = warnings.len();

    let (experience_limit, visible_sections) = match options.version {
        Version::Short => (SHORT_EXPERIENCE_LIMIT, VisibleSections::NONE),
        Version::Full => (FULL_EXPERIENCE_LIMIT, options.visible_sections),
    };

    if options.selected_projects.len() > MAX_SELECTED_PROJECTS {
        warnings.push(ContextError::validation(format!(
            "{} projects were selected but at most {} are expected",
            options.selected_projects.len(),
            MAX_SELECTED_PROJECTS
        )));
    }
    let mut selected_identifiers = HashSet::new();
    for identifier in options.selected_projects.iter() {
        if !selected_identifiers.insert(identifier.as_str()) {
            warnings.push(ContextError::validation(format!(
                "The project {:?} was selected more than once",
                identifier
            )));
        } else if !content
            .projects
            .iter()
            .any(|project| &project.id == identifier)
        {
            warnings.push(ContextError::validation(format!(
                "The project {:?} does not exist for the language {:?} and is ignored",
                identifier,
                options.language.code()
            )));
        }
    }
    for warning in warnings.iter().skip(logged_warnings) {
        log::warn!("{}", warning);
    }

    // The data store order wins over the order of the selection
    let projects = content
        .projects
        .iter()
        .filter(|project| selected_identifiers.contains(project.id.as_str()))
        .take(PROJECT_LIMIT)
        .collect();

    let education = content
        .education
        .iter()
        .map(|entry| SelectedEducation {
            entry,
            highlights: first(&entry.highlights, HIGHLIGHT_LIMIT),
        })
        .collect();
    let experience = first(&content.experience, experience_limit)
        .iter()
        .map(|entry| SelectedExperience {
            entry,
            responsibilities: first(&entry.responsibilities, RESPONSIBILITY_LIMIT),
        })
        .collect();

    let skills = match options.version {
        Version::Full => FULL_SKILL_CATEGORIES
            .iter()
            .map(|category| SkillGroup {
                category: *category,
                skills: data.skills.category(*category),
            })
            .collect(),
        Version::Short => SHORT_SKILL_LIMITS
            .iter()
            .map(|(category, limit)| SkillGroup {
                category: *category,
                skills: first(data.skills.category(*category), *limit),
            })
            .collect(),
    };

    let selected_content = SelectedContent {
        language: options.language,
        version: options.version,
        personal_info: &content.personal_info,
        summary: &content.summary,
        education,
        experience,
        projects,
        languages_spoken: &content.languages_spoken,
        skills,
        certifications: if visible_sections.certifications {
            content.certifications.as_slice()
        } else {
            &[]
        },
        interests: if visible_sections.interests {
            content.interests.as_slice()
        } else {
            &[]
        },
        extracurricular: if visible_sections.extracurricular {
            first(&content.extracurricular, EXTRACURRICULAR_LIMIT)
        } else {
            &[]
        },
        visible_sections,
        warnings,
    };
    log::debug!(
        "Selected {} experience entries and {} projects for the language {:?}",
        selected_content.experience.len(),
        selected_content.projects.len(),
        options.language.code()
    );

    Ok(selected_content)
}

fn require(field: &str, value: &str) -> Result<(), ContextError> {
    if value.trim().is_empty() {
        return Err(ContextError::validation(format!(
            "The field `{}` is required but is empty",
            field
        )));
    }
    Ok(())
}

impl SelectedContent<'_> {
    /// Checks that every field which ends up in the document is present, so that a malformed entry
    /// is reported by name instead of being rendered as a blank.
    pub fn validate(&self) -> Result<(), ContextError> {
        require("personalInfo.name", &self.personal_info.name)?;
        require("personalInfo.title", &self.personal_info.title)?;
        require("personalInfo.email", &self.personal_info.email)?;
        require("summary", self.summary)?;

        for education in self.education.iter() {
            let entry = education.entry;
            require(&format!("education[{}].title", entry.id), &entry.title)?;
            require(
                &format!("education[{}].institution", entry.id),
                &entry.institution,
            )?;
            require(&format!("education[{}].period", entry.id), &entry.period)?;
        }
        for experience in self.experience.iter() {
            let entry = experience.entry;
            require(&format!("experience[{}].title", entry.id), &entry.title)?;
            require(&format!("experience[{}].company", entry.id), &entry.company)?;
            require(&format!("experience[{}].period", entry.id), &entry.period)?;
        }
        for project in self.projects.iter() {
            require(&format!("projects[{}].name", project.id), &project.name)?;
        }
        for language in self.languages_spoken.iter() {
            require(
                &format!("languagesSpoken[{}].name", language.id),
                &language.name,
            )?;
            require(
                &format!("languagesSpoken[{}].level", language.id),
                &language.level,
            )?;
        }
        for certification in self.certifications.iter() {
            require(
                &format!("certifications[{}].name", certification.id),
                &certification.name,
            )?;
        }
        for interest in self.interests.iter() {
            require(&format!("interests[{}].name", interest.id), &interest.name)?;
        }
        for activity in self.extracurricular.iter() {
            require(&format!("extracurricular[{}].role", activity.id), &activity.role)?;
            require(
                &format!("extracurricular[{}].organization", activity.id),
                &activity.organization,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::Theme;

    fn all_projects_options(language: Language, version: Version) -> RenderOptions {
        let data = CvData::builtin().unwrap();
        RenderOptions {
            language,
            version,
            ..RenderOptions::with_default_projects(&data)
        }
    }

    #[test]
    fn short_version_overrides_the_visibility_map() {
        let data = CvData::builtin().unwrap();
        let options = all_projects_options(Language::En, Version::Short);
        assert_eq!(options.visible_sections, VisibleSections::default());

        let content = select_content(&data, &options).unwrap();

        assert_eq!(content.visible_sections, VisibleSections::NONE);
        assert!(content.certifications.is_empty());
        assert!(content.interests.is_empty());
        assert!(content.extracurricular.is_empty());
        assert_eq!(content.experience.len(), SHORT_EXPERIENCE_LIMIT);
        assert_eq!(content.projects.len(), PROJECT_LIMIT);
    }

    #[test]
    fn full_version_caps_experience_and_projects_for_layout() {
        let data = CvData::builtin().unwrap();
        let content =
            select_content(&data, &all_projects_options(Language::Fr, Version::Full)).unwrap();

        assert_eq!(content.experience.len(), FULL_EXPERIENCE_LIMIT);
        assert_eq!(content.projects.len(), PROJECT_LIMIT);
        assert!(content
            .experience
            .iter()
            .all(|experience| experience.responsibilities.len() <= 3));
        let categories: Vec<_> = content.skills.iter().map(|group| group.category).collect();
        assert_eq!(
            categories,
            vec![
                SkillCategory::Languages,
                SkillCategory::Frameworks,
                SkillCategory::Databases
            ]
        );
        assert!(!content.interests.is_empty());
    }

    #[test]
    fn projects_keep_the_data_store_order() {
        let data = CvData::builtin().unwrap();
        let options = RenderOptions {
            selected_projects: vec!["hotel".into(), "real-estate".into()],
            ..RenderOptions::default()
        };

        let content = select_content(&data, &options).unwrap();
        let identifiers: Vec<_> = content.projects.iter().map(|project| &project.id).collect();

        assert_eq!(identifiers, vec!["real-estate", "hotel"]);
        assert!(content.warnings.is_empty());
    }

    #[test]
    fn unknown_projects_are_dropped_with_a_warning() {
        let data = CvData::builtin().unwrap();
        let options = RenderOptions {
            selected_projects: vec!["hotel".into(), "moon-base".into()],
            ..RenderOptions::default()
        };

        let content = select_content(&data, &options).unwrap();

        assert_eq!(content.projects.len(), 1);
        assert_eq!(content.projects[0].id, "hotel");
        assert_eq!(content.warnings.len(), 1);
        assert_eq!(content.warnings[0].kind, ErrorKind::Validation);
        assert!(content.warnings[0].context.contains("moon-base"));
    }

    #[test]
    fn too_many_and_duplicate_selections_are_warnings() {
        let data = CvData::builtin().unwrap();
        let mut selected_projects = data.default_project_ids(5);
        selected_projects.push("hotel".into());
        let options = RenderOptions {
            selected_projects,
            ..RenderOptions::default()
        };

        let content = select_content(&data, &options).unwrap();

        assert_eq!(content.warnings.len(), 2);
        assert_eq!(content.projects.len(), PROJECT_LIMIT);
    }

    #[test]
    fn short_version_condenses_the_skills() {
        let data = CvData::builtin().unwrap();
        let content =
            select_content(&data, &all_projects_options(Language::En, Version::Short)).unwrap();

        let categories: Vec<_> = content.skills.iter().map(|group| group.category).collect();
        assert_eq!(
            categories,
            vec![SkillCategory::Languages, SkillCategory::Frameworks]
        );
        assert_eq!(content.skills[0].skills.len(), 5);
        assert_eq!(content.skills[1].skills.len(), 3);
    }

    #[test]
    fn hidden_sections_are_empty_in_the_full_version() {
        let data = CvData::builtin().unwrap();
        let options = RenderOptions {
            theme: Theme::Dark,
            visible_sections: VisibleSections {
                interests: false,
                certifications: true,
                extracurricular: false,
            },
            ..RenderOptions::default()
        };

        let content = select_content(&data, &options).unwrap();

        assert!(content.interests.is_empty());
        assert!(content.extracurricular.is_empty());
        assert_eq!(content.certifications.len(), 1);
    }

    #[test]
    fn malformed_visibility_flags_reach_the_selection_as_warnings() {
        let data = CvData::builtin().unwrap();
        let options = RenderOptions::from_json_str(
            r#"{ "visibleSections": { "interest": false, "certifications": "no" } }"#,
        )
        .unwrap();

        let content = select_content(&data, &options).unwrap();

        assert_eq!(content.warnings.len(), 2);
        assert!(content
            .warnings
            .iter()
            .all(|warning| warning.kind == ErrorKind::Validation));
        assert_eq!(content.visible_sections, VisibleSections::default());
        assert!(!content.interests.is_empty());
        assert!(!content.certifications.is_empty());
    }

    #[test]
    fn validation_names_the_missing_field() {
        let mut data = CvData::builtin().unwrap();
        if let Some(content) = data.locales.get_mut(&Language::En) {
            content.experience[1].company = "  ".into();
        }

        let content = select_content(&data, &RenderOptions::default()).unwrap();
        let error = content.validate().unwrap_err();

        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(
            error.context.contains("experience[commercial-assistant].company"),
            "{}",
            error
        );
    }
}
