use serde::Serialize;

use crate::error::ContextError;
use crate::options::{Language, Theme, Version};
use crate::selection::SelectedContent;
use crate::translations::Translations;

/// The separator placed between the items of an inline list.
pub const LIST_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    LanguagesSpoken,
    Skills,
    Certifications,
    Interests,
    Summary,
    Education,
    Experience,
    Projects,
    Extracurricular,
}

/// The name, title and contact lines at the top of the first page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub name: String,
    pub title: String,
    /// Pairs of contact items, each written on one line in two halves.
    pub contact_rows: Vec<[String; 2]>,
}

/// A dated or labelled item, such as a job, a degree or a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub title: String,
    /// Written on the right of the title: a period, a role or a date.
    pub aside: Option<String>,
    /// Written under the title: an institution, a company or an issuer.
    pub subtitle: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub bullets: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Block {
    /// A label on the left with its value on the right, such as a spoken language and its level.
    Pair { label: String, value: String },
    /// A small uppercase heading inside a section.
    Caption { text: String },
    /// A skill name with its level and a bar whose fill is `level` percent of the track.
    SkillBar { name: String, level: u8 },
    Paragraph { text: String },
    Entry(Entry),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    /// The number of entries in the section, e.g. the number of jobs in the experience section.
    pub fn entry_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Entry(_)))
            .count()
    }
}

/// The in-memory representation of the CV before it is laid out: a header and two columns of sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTree {
    pub theme: Theme,
    pub language: Language,
    pub version: Version,
    pub header: Header,
    pub sidebar: Vec<Section>,
    pub main: Vec<Section>,
}

impl DocumentTree {
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sidebar.iter().chain(self.main.iter())
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections().find(|section| section.kind == kind)
    }

    /// The kinds of the sections in reading order, sidebar first.
    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections().map(|section| section.kind).collect()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Keeps the section only when it has something to show: empty sections are omitted entirely.
fn push_section(sections: &mut Vec<Section>, kind: SectionKind, title: &str, blocks: Vec<Block>) {
    if blocks.is_empty() {
        log::debug!("Omitting the empty section {:?}", kind);
        return;
    }
    sections.push(Section {
        kind,
        title: title.to_uppercase(),
        blocks,
    });
}

/// Maps the selected content onto the fixed layout of the CV: the header, the sidebar with the spoken
/// languages, skills, certifications and interests, and the main column with the summary, education,
/// experience, projects and extracurricular activities.
///
/// The content is validated first, so a missing field is reported instead of being rendered as a blank.
pub fn build_document(
    content: &SelectedContent<'_>,
    theme: Theme,
    translations: &Translations,
) -> Result<DocumentTree, ContextError> {
    content.validate()?;

    let personal_info = content.personal_info;
    let contact_items: Vec<&str> = [
        &personal_info.email,
        &personal_info.phone,
        &personal_info.location,
        &personal_info.website,
        &personal_info.linkedin,
        &personal_info.github,
    ]
    .into_iter()
    .map(|item| item.trim())
    .filter(|item| !item.is_empty())
    .collect();
    let header = Header {
        name: personal_info.name.clone(),
        title: personal_info.title.clone(),
        contact_rows: contact_items
            .chunks(2)
            .map(|pair| {
                [
                    pair[0].to_string(),
                    pair.get(1).map(|item| item.to_string()).unwrap_or_default(),
                ]
            })
            .collect(),
    };

    let mut sidebar = Vec::new();
    push_section(
        &mut sidebar,
        SectionKind::LanguagesSpoken,
        translations.languages,
        content
            .languages_spoken
            .iter()
            .map(|language| Block::Pair {
                label: language.name.clone(),
                value: language.level.clone(),
            })
            .collect(),
    );
    push_section(
        &mut sidebar,
        SectionKind::Skills,
        translations.skills,
        content
            .skills
            .iter()
            .filter(|group| !group.skills.is_empty())
            .flat_map(|group| {
                std::iter::once(Block::Caption {
                    text: translations.skill_category(group.category).to_uppercase(),
                })
                .chain(group.skills.iter().map(|skill| Block::SkillBar {
                    name: skill.name.clone(),
                    level: skill.level,
                }))
            })
            .collect(),
    );
    if content.visible_sections.certifications {
        push_section(
            &mut sidebar,
            SectionKind::Certifications,
            translations.certifications,
            content
                .certifications
                .iter()
                .map(|certification| {
                    Block::Entry(Entry {
                        title: certification.name.clone(),
                        subtitle: non_empty(&certification.issuer),
                        aside: certification.date.as_deref().and_then(non_empty),
                        ..Entry::default()
                    })
                })
                .collect(),
        );
    }
    if content.visible_sections.interests && !content.interests.is_empty() {
        let interests: Vec<&str> = content
            .interests
            .iter()
            .map(|interest| interest.name.as_str())
            .collect();
        push_section(
            &mut sidebar,
            SectionKind::Interests,
            translations.interests,
            vec![Block::Paragraph {
                text: interests.join(LIST_SEPARATOR),
            }],
        );
    }

    let mut main = Vec::new();
    push_section(
        &mut main,
        SectionKind::Summary,
        translations.summary,
        vec![Block::Paragraph {
            text: content.summary.trim().to_string(),
        }],
    );
    push_section(
        &mut main,
        SectionKind::Education,
        translations.education,
        content
            .education
            .iter()
            .map(|education| {
                Block::Entry(Entry {
                    title: education.entry.title.clone(),
                    aside: non_empty(&education.entry.period),
                    subtitle: non_empty(&education.entry.institution),
                    location: non_empty(&education.entry.location),
                    bullets: education.highlights.to_vec(),
                    ..Entry::default()
                })
            })
            .collect(),
    );
    push_section(
        &mut main,
        SectionKind::Experience,
        translations.experience,
        content
            .experience
            .iter()
            .map(|experience| {
                Block::Entry(Entry {
                    title: experience.entry.title.clone(),
                    aside: non_empty(&experience.entry.period),
                    subtitle: non_empty(&experience.entry.company),
                    location: non_empty(&experience.entry.location),
                    bullets: experience.responsibilities.to_vec(),
                    ..Entry::default()
                })
            })
            .collect(),
    );
    push_section(
        &mut main,
        SectionKind::Projects,
        translations.projects,
        content
            .projects
            .iter()
            .map(|project| {
                Block::Entry(Entry {
                    title: project.name.clone(),
                    aside: non_empty(&project.role),
                    description: non_empty(&project.description),
                    tags: project.technologies.clone(),
                    ..Entry::default()
                })
            })
            .collect(),
    );
    if content.visible_sections.extracurricular {
        push_section(
            &mut main,
            SectionKind::Extracurricular,
            translations.extracurricular,
            content
                .extracurricular
                .iter()
                .map(|activity| {
                    Block::Entry(Entry {
                        title: activity.role.clone(),
                        subtitle: non_empty(&activity.organization),
                        description: non_empty(&activity.description),
                        ..Entry::default()
                    })
                })
                .collect(),
        );
    }

    Ok(DocumentTree {
        theme,
        language: content.language,
        version: content.version,
        header,
        sidebar,
        main,
    })
}
