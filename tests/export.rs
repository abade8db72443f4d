use rand::{seq::SliceRandom as _, Rng};
use vitae::{
    catalog::Catalog,
    document::{build_document, Block, DocumentTree, SectionKind},
    error::ErrorKind,
    export::{self, Exporter, Progress},
    options::{Language, RenderOptions, Theme, Version, VisibleSections},
    selection::select_content,
};

fn skill_levels(catalog: &Catalog, options: &RenderOptions) -> Vec<u8> {
    let content = select_content(&catalog.data, options).unwrap();
    let tree = build_document(
        &content,
        options.theme,
        catalog.translations(options.language),
    )
    .unwrap();

    tree.sections()
        .flat_map(|section| section.blocks.iter())
        .filter_map(|block| match block {
            Block::SkillBar { level, .. } => Some(*level),
            _ => None,
        })
        .collect()
}

fn random_options(rng: &mut impl Rng, catalog: &Catalog) -> RenderOptions {
    let mut project_ids = catalog.data.default_project_ids(usize::MAX);
    project_ids.push("does-not-exist".into());
    project_ids.shuffle(rng);
    let project_count = rng.gen_range(0..=project_ids.len());

    RenderOptions {
        theme: *[Theme::Light, Theme::Dark].choose(rng).unwrap(),
        language: *Language::ALL.choose(rng).unwrap(),
        version: *[Version::Full, Version::Short].choose(rng).unwrap(),
        selected_projects: project_ids[..project_count].to_vec(),
        visible_sections: VisibleSections {
            interests: rng.gen_bool(0.5),
            certifications: rng.gen_bool(0.5),
            extracurricular: rng.gen_bool(0.5),
        },
        ..RenderOptions::default()
    }
}

#[test]
fn every_combination_of_options_is_downloaded_under_its_own_name() {
    let catalog = Catalog::builtin().unwrap();
    let output_directory = tempfile::tempdir().unwrap();
    let mut file_names = Vec::new();

    for theme in [Theme::Light, Theme::Dark] {
        for language in Language::ALL {
            for version in [Version::Full, Version::Short] {
                let options = RenderOptions {
                    theme,
                    language,
                    version,
                    ..RenderOptions::with_default_projects(&catalog.data)
                };
                let mut steps = Vec::new();
                let downloaded_cv = Exporter::new(&catalog)
                    .download_pdf_with_progress(&options, output_directory.path(), |progress| {
                        steps.push(progress)
                    })
                    .unwrap();

                assert_eq!(
                    steps,
                    vec![
                        Progress::PreparingData,
                        Progress::GeneratingPdf,
                        Progress::Downloading,
                        Progress::Complete
                    ]
                );
                let saved_bytes = std::fs::read(&downloaded_cv.path).unwrap();
                assert_eq!(saved_bytes.len(), downloaded_cv.size);
                assert!(saved_bytes.starts_with(b"%PDF-1.5"));
                let reloaded_document = lopdf::Document::load_mem(&saved_bytes).unwrap();
                assert!(!reloaded_document.get_pages().is_empty());

                file_names.push(downloaded_cv.filename);
            }
        }
    }

    file_names.sort();
    assert_eq!(
        file_names,
        vec![
            "Junior_Donfack_CV.pdf",
            "Junior_Donfack_CV_Dark.pdf",
            "Junior_Donfack_CV_FR.pdf",
            "Junior_Donfack_CV_FR_Dark.pdf",
            "Junior_Donfack_CV_Short.pdf",
            "Junior_Donfack_CV_Short_Dark.pdf",
            "Junior_Donfack_CV_Short_FR.pdf",
            "Junior_Donfack_CV_Short_FR_Dark.pdf",
        ]
    );
    // Only the saved documents are left in the directory
    let directory_entries = std::fs::read_dir(output_directory.path()).unwrap().count();
    assert_eq!(directory_entries, file_names.len());
}

#[test]
fn short_dark_french_document_with_two_projects() {
    let catalog = Catalog::builtin().unwrap();
    let options = RenderOptions::from_json_str(
        r#"{
            "theme": "dark",
            "language": "fr",
            "version": "short",
            "selectedProjects": ["hotel", "real-estate"]
        }"#,
    )
    .unwrap();

    assert_eq!(
        Exporter::new(&catalog).file_name(&options),
        "Junior_Donfack_CV_Short_FR_Dark.pdf"
    );

    let content = select_content(&catalog.data, &options).unwrap();
    let project_ids: Vec<_> = content
        .projects
        .iter()
        .map(|project| project.id.as_str())
        .collect();
    assert_eq!(project_ids, vec!["real-estate", "hotel"]);
    assert!(content.warnings.is_empty());

    let tree = build_document(&content, options.theme, catalog.translations(options.language))
        .unwrap();
    for kind in [
        SectionKind::Interests,
        SectionKind::Certifications,
        SectionKind::Extracurricular,
    ] {
        assert!(tree.section(kind).is_none(), "{:?}", kind);
    }
    assert_eq!(tree.section(SectionKind::Experience).unwrap().entry_count(), 2);
    assert_eq!(tree.section(SectionKind::Projects).unwrap().entry_count(), 2);

    let pdf_bytes = export::render_to_bytes(&catalog, &options).unwrap();
    assert!(lopdf::Document::load_mem(&pdf_bytes).is_ok());
}

#[test]
fn rendering_is_deterministic() {
    let catalog = Catalog::builtin().unwrap();
    let options = RenderOptions::with_default_projects(&catalog.data);

    let first_bytes = export::render_to_bytes(&catalog, &options).unwrap();
    let second_bytes = export::render_to_bytes(&catalog, &options).unwrap();

    similar_asserts::assert_eq!(
        String::from_utf8_lossy(&first_bytes),
        String::from_utf8_lossy(&second_bytes)
    );
}

#[test]
fn switching_the_language_keeps_the_structure() {
    let catalog = Catalog::builtin().unwrap();
    let english_options = RenderOptions::with_default_projects(&catalog.data);
    let french_options = RenderOptions {
        language: Language::Fr,
        ..english_options.clone()
    };

    let document = |options: &RenderOptions| {
        let content = select_content(&catalog.data, options).unwrap();
        build_document(&content, options.theme, catalog.translations(options.language)).unwrap()
    };
    let english_tree = document(&english_options);
    let french_tree = document(&french_options);
    assert_eq!(english_tree.section_kinds(), french_tree.section_kinds());

    for kind in [
        SectionKind::Summary,
        SectionKind::Education,
        SectionKind::Experience,
        SectionKind::Projects,
    ] {
        let english_title = &english_tree.section(kind).unwrap().title;
        let french_title = &french_tree.section(kind).unwrap().title;
        assert_ne!(english_title, french_title, "{:?}", kind);
    }
    assert_eq!(
        english_tree.section(SectionKind::Summary).unwrap().title,
        "PROFESSIONAL SUMMARY"
    );
    assert_eq!(
        french_tree.section(SectionKind::Summary).unwrap().title,
        "PROFIL PROFESSIONNEL"
    );

    let entry_titles = |tree: &DocumentTree, kind: SectionKind| -> Vec<String> {
        tree.section(kind)
            .unwrap()
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Entry(entry) => Some(entry.title.clone()),
                _ => None,
            })
            .collect()
    };
    let english_jobs = entry_titles(&english_tree, SectionKind::Experience);
    let french_jobs = entry_titles(&french_tree, SectionKind::Experience);
    assert_eq!(english_jobs.len(), french_jobs.len());
    assert!(!english_jobs.is_empty());
    for (english_job, french_job) in english_jobs.iter().zip(french_jobs.iter()) {
        assert_ne!(english_job, french_job);
    }
    assert_eq!(
        skill_levels(&catalog, &english_options),
        skill_levels(&catalog, &french_options)
    );
    assert!(!skill_levels(&catalog, &english_options).is_empty());
}

#[test]
fn random_options_always_render() {
    let catalog = Catalog::builtin().unwrap();
    let exporter = Exporter::new(&catalog);
    let mut rng = rand::thread_rng();

    for _ in 0..16 {
        let options = random_options(&mut rng, &catalog);

        let pdf_bytes = exporter
            .render_to_bytes(&options)
            .unwrap_or_else(|error| panic!("{} for {:?}", error, options));
        let reloaded_document = lopdf::Document::load_mem(&pdf_bytes).unwrap();
        assert!(!reloaded_document.get_pages().is_empty());

        let file_name = exporter.file_name(&options);
        assert!(file_name.starts_with("Junior_Donfack_CV"));
        assert!(file_name.ends_with(".pdf"));
        assert_eq!(
            file_name.contains("_Short"),
            options.version == Version::Short
        );
        assert_eq!(file_name.contains("_FR"), options.language == Language::Fr);
        assert_eq!(file_name.contains("_Dark"), options.theme == Theme::Dark);
    }
}

#[test]
fn preview_file_is_removed_when_revoked_or_dropped() {
    let catalog = Catalog::builtin().unwrap();
    let options = RenderOptions::default();

    let mut preview = export::preview_url(&catalog, &options).unwrap();
    let previewed_path = preview.path().unwrap().to_path_buf();
    assert!(preview.url().starts_with("file://"));
    assert!(std::fs::read(&previewed_path).unwrap().starts_with(b"%PDF"));
    preview.revoke().unwrap();
    assert!(preview.is_revoked());
    assert!(!previewed_path.exists());
    preview.revoke().unwrap();

    let preview = export::preview_url(&catalog, &options).unwrap();
    let previewed_path = preview.path().unwrap().to_path_buf();
    drop(preview);
    assert!(!previewed_path.exists());
}

#[test]
fn catalog_is_shared_between_threads() {
    let catalog = Catalog::builtin().unwrap();
    let options = RenderOptions {
        theme: Theme::Dark,
        ..RenderOptions::with_default_projects(&catalog.data)
    };

    let renditions: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| export::render_to_bytes(&catalog, &options).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(renditions.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn downloading_into_a_missing_directory_is_a_generation_error() {
    let catalog = Catalog::builtin().unwrap();
    let output_directory = tempfile::tempdir().unwrap();
    let missing_directory = output_directory.path().join("missing");

    let error = export::download_pdf(&catalog, &RenderOptions::default(), &missing_directory)
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Generation);
    assert!(!missing_directory.exists());
}
