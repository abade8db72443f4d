#![deny(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::configuration::ExportConfiguration;
use crate::document::build_document;
use crate::email::CvAttachment;
use crate::error::{ContextError, ErrorKind};
use crate::layout::layout_document;
use crate::options::{Language, RenderOptions, Theme, Version};
use crate::pdf::{DocumentInfo, PdfDocument};
use crate::selection::select_content;

/// The steps of an export, reported to the caller as they begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Progress {
    PreparingData,
    GeneratingPdf,
    Downloading,
    Complete,
}

impl Progress {
    pub fn message(&self) -> &'static str {
        match self {
            Progress::PreparingData => "Preparing CV data...",
            Progress::GeneratingPdf => "Generating PDF...",
            Progress::Downloading => "Downloading...",
            Progress::Complete => "Complete!",
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.message())
    }
}

/// The name of the file a document rendered with the given options is saved under:
/// the base, then `_Short` for the short version, `_FR` for French and `_Dark` for the dark theme.
pub fn file_name(base_file_name: &str, options: &RenderOptions) -> String {
    let mut file_name = base_file_name.to_string();
    if options.version == Version::Short {
        file_name.push_str("_Short");
    }
    if options.language == Language::Fr {
        file_name.push_str("_FR");
    }
    if options.theme == Theme::Dark {
        file_name.push_str("_Dark");
    }
    file_name.push_str(".pdf");

    file_name
}

/// The MD5 digest of the serialized render options, which identifies a rendition of the document
/// in the trailer `ID`. The same options always give the same fingerprint.
pub fn instance_identifier(options: &RenderOptions) -> Result<String, ContextError> {
    let serialized_options = serde_json::to_vec(options).map_err(|error| {
        ContextError::with_error(
            ErrorKind::Generation,
            "Failed to serialize the render options",
            &error,
        )
    })?;

    Ok(format!("{:x}", md5::compute(&serialized_options)))
}

/// The outcome of a download: where the document has been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedCv {
    pub filename: String,
    pub path: PathBuf,
    pub size: usize,
}

/// A `file://` URL to a temporary copy of a rendered document. The file is removed, and the URL
/// therefore revoked, when `revoke` is called or when the value is dropped.
#[derive(Debug)]
pub struct PreviewUrl {
    url: String,
    temporary_path: Option<tempfile::TempPath>,
}

impl PreviewUrl {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The path of the previewed file, or nothing once the URL has been revoked.
    pub fn path(&self) -> Option<&Path> {
        self.temporary_path.as_deref()
    }

    pub fn is_revoked(&self) -> bool {
        self.temporary_path.is_none()
    }

    /// Removes the previewed file. Revoking an already revoked URL does nothing.
    pub fn revoke(&mut self) -> Result<(), ContextError> {
        if let Some(temporary_path) = self.temporary_path.take() {
            log::debug!("Revoking the preview URL {}", self.url);
            temporary_path.close().map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Generation,
                    "Failed to remove the preview file",
                    &error,
                )
            })?;
        }

        Ok(())
    }
}

fn io_error(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> ContextError {
    let context = context.into();
    move |error| ContextError::with_error(ErrorKind::Generation, context, &error)
}

/// Renders the CV from a shared catalog with a given export configuration. Every operation shares the same
/// render step, and wraps whatever goes wrong in it into a single `Generation` error which keeps the cause.
#[derive(Debug, Clone)]
pub struct Exporter<'a> {
    catalog: &'a Catalog,
    configuration: ExportConfiguration,
}

impl<'a> Exporter<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Exporter::with_configuration(catalog, ExportConfiguration::default())
    }

    pub fn with_configuration(catalog: &'a Catalog, configuration: ExportConfiguration) -> Self {
        Exporter {
            catalog,
            configuration,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn configuration(&self) -> &ExportConfiguration {
        &self.configuration
    }

    pub fn file_name(&self, options: &RenderOptions) -> String {
        file_name(&self.configuration.base_file_name, options)
    }

    fn try_render(
        &self,
        options: &RenderOptions,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<Vec<u8>, ContextError> {
        on_progress(Progress::PreparingData);
        let content = select_content(&self.catalog.data, options)?;
        let tree = build_document(
            &content,
            options.theme,
            self.catalog.translations(options.language),
        )?;

        on_progress(Progress::GeneratingPdf);
        let layout = layout_document(&tree);
        let info = DocumentInfo {
            title: layout.title.clone(),
            author: self
                .configuration
                .author
                .clone()
                .unwrap_or_else(|| layout.author.clone()),
            subject: content.personal_info.title.clone(),
            creator: self.configuration.creator.clone(),
            producer: self.configuration.producer.clone(),
        };
        let instance_identifier = match &self.configuration.instance_identifier {
            Some(instance_identifier) => instance_identifier.clone(),
            None => instance_identifier(options)?,
        };
        let mut pdf_document = PdfDocument::from_layout(
            &layout,
            self.configuration.document_identifier.clone(),
            &instance_identifier,
            &info,
        )?;

        pdf_document.save_to_bytes()
    }

    fn render(
        &self,
        options: &RenderOptions,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<Vec<u8>, ContextError> {
        let pdf_bytes = self
            .try_render(options, on_progress)
            .map_err(|error| error.into_generation("Failed to generate the CV"))?;
        log::debug!(
            "Rendered the CV in {} bytes for {:?}",
            pdf_bytes.len(),
            options
        );

        Ok(pdf_bytes)
    }

    /// Renders the document and returns its bytes.
    pub fn render_to_bytes(&self, options: &RenderOptions) -> Result<Vec<u8>, ContextError> {
        self.render(options, &mut |_| {})
    }

    pub fn download_pdf(
        &self,
        options: &RenderOptions,
        directory: &Path,
    ) -> Result<DownloadedCv, ContextError> {
        self.download_pdf_with_progress(options, directory, |_| {})
    }

    /// Renders the document and saves it in the directory under the name derived from the options.
    /// The bytes are first written to a temporary file next to the destination, which is then renamed,
    /// so a failed download never leaves a partial file behind.
    pub fn download_pdf_with_progress(
        &self,
        options: &RenderOptions,
        directory: &Path,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<DownloadedCv, ContextError> {
        let pdf_bytes = self.render(options, &mut on_progress)?;
        let filename = self.file_name(options);
        let path = directory.join(&filename);

        on_progress(Progress::Downloading);
        let mut temporary_file = tempfile::Builder::new()
            .prefix(".vitae-")
            .suffix(".pdf.part")
            .tempfile_in(directory)
            .map_err(io_error(format!(
                "Failed to create a temporary file in {:?}",
                directory
            )))?;
        temporary_file
            .write_all(&pdf_bytes)
            .map_err(io_error("Failed to write the PDF document"))?;
        temporary_file
            .as_file()
            .sync_all()
            .map_err(io_error("Failed to flush the PDF document"))?;
        temporary_file.persist(&path).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Generation,
                format!("Failed to save the PDF document to {:?}", path),
                &error,
            )
        })?;
        on_progress(Progress::Complete);
        log::info!("Saved the CV to the path: {:?}", path);

        Ok(DownloadedCv {
            filename,
            path,
            size: pdf_bytes.len(),
        })
    }

    /// Renders the document into a temporary file and returns a URL to it.
    pub fn preview_url(&self, options: &RenderOptions) -> Result<PreviewUrl, ContextError> {
        let pdf_bytes = self.render(options, &mut |_| {})?;

        let mut temporary_file = tempfile::Builder::new()
            .prefix("vitae-preview-")
            .suffix(".pdf")
            .tempfile()
            .map_err(io_error("Failed to create the preview file"))?;
        temporary_file
            .write_all(&pdf_bytes)
            .map_err(io_error("Failed to write the preview file"))?;
        let temporary_path = temporary_file.into_temp_path();
        let url = format!("file://{}", temporary_path.display());
        log::debug!("Created the preview URL {}", url);

        Ok(PreviewUrl {
            url,
            temporary_path: Some(temporary_path),
        })
    }

    /// Renders the document and packages it as an attachment for an external mail relay.
    pub fn email_attachment(&self, options: &RenderOptions) -> Result<CvAttachment, ContextError> {
        let pdf_bytes = self.render_to_bytes(options)?;
        Ok(CvAttachment::from_pdf_bytes(self.file_name(options), &pdf_bytes))
    }
}

/// Renders the document with the default export configuration and returns its bytes.
pub fn render_to_bytes(
    catalog: &Catalog,
    options: &RenderOptions,
) -> Result<Vec<u8>, ContextError> {
    Exporter::new(catalog).render_to_bytes(options)
}

/// Renders the document with the default export configuration and saves it into the directory.
pub fn download_pdf(
    catalog: &Catalog,
    options: &RenderOptions,
    directory: &Path,
) -> Result<DownloadedCv, ContextError> {
    Exporter::new(catalog).download_pdf(options, directory)
}

/// Renders the document with the default export configuration and returns a URL to a temporary copy.
pub fn preview_url(catalog: &Catalog, options: &RenderOptions) -> Result<PreviewUrl, ContextError> {
    Exporter::new(catalog).preview_url(options)
}

/// Renders the document with the default export configuration and packages it as an e-mail attachment.
pub fn email_attachment(
    catalog: &Catalog,
    options: &RenderOptions,
) -> Result<CvAttachment, ContextError> {
    Exporter::new(catalog).email_attachment(options)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::data::CvData;

    #[test]
    fn file_names_follow_the_options() {
        let base = "Junior_Donfack_CV";
        assert_eq!(
            file_name(base, &RenderOptions::default()),
            "Junior_Donfack_CV.pdf"
        );

        let options = RenderOptions {
            theme: Theme::Dark,
            language: Language::Fr,
            version: Version::Short,
            ..RenderOptions::default()
        };
        assert_eq!(file_name(base, &options), "Junior_Donfack_CV_Short_FR_Dark.pdf");

        let options = RenderOptions {
            theme: Theme::Dark,
            ..RenderOptions::default()
        };
        assert_eq!(file_name(base, &options), "Junior_Donfack_CV_Dark.pdf");
    }

    #[test]
    fn instance_identifier_is_a_stable_fingerprint() {
        let options = RenderOptions::default();
        let identifier = instance_identifier(&options).unwrap();

        assert_eq!(identifier.len(), 32);
        assert!(identifier
            .chars()
            .all(|character| matches!(character, '0'..='9' | 'a'..='f')));
        assert_eq!(identifier, instance_identifier(&options).unwrap());

        // Parsing warnings are not serialized and leave the fingerprint unchanged
        let warned = RenderOptions::from_json_str(r#"{"visibleSections":{"hobbies":true}}"#)
            .unwrap();
        assert_eq!(warned.warnings.len(), 1);
        assert_eq!(identifier, instance_identifier(&warned).unwrap());

        let french = RenderOptions {
            language: Language::Fr,
            ..options
        };
        assert_ne!(identifier, instance_identifier(&french).unwrap());
    }

    #[test]
    fn progress_is_reported_in_order() {
        let catalog = Catalog::builtin().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let mut steps = Vec::new();

        Exporter::new(&catalog)
            .download_pdf_with_progress(&RenderOptions::default(), directory.path(), |step| {
                steps.push(step.message())
            })
            .unwrap();

        assert_eq!(
            steps,
            vec![
                "Preparing CV data...",
                "Generating PDF...",
                "Downloading...",
                "Complete!"
            ]
        );
    }

    #[test]
    fn failures_are_wrapped_into_a_generation_error() {
        let mut data = CvData::builtin().unwrap();
        data.locales.remove(&Language::Fr);
        let catalog = Catalog::new(data);
        let options = RenderOptions {
            language: Language::Fr,
            ..RenderOptions::default()
        };

        let error = render_to_bytes(&catalog, &options).unwrap_err();

        assert_eq!(error.kind, ErrorKind::Generation);
        assert_eq!(error.context, "Failed to generate the CV");
        assert!(error.source_error.is_some());
    }

    #[test]
    fn failed_download_leaves_no_file_behind() {
        let catalog = Catalog::builtin().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let missing_directory = directory.path().join("missing");

        let error = download_pdf(&catalog, &RenderOptions::default(), &missing_directory)
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Generation);
        assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
    }

    #[test]
    fn configured_identifiers_and_base_name_are_used() {
        let catalog = Catalog::builtin().unwrap();
        let configuration = ExportConfiguration {
            base_file_name: "CV".into(),
            instance_identifier: Some("00000000000000000000000000000000".into()),
            ..ExportConfiguration::default()
        };
        let exporter = Exporter::with_configuration(&catalog, configuration);

        assert_eq!(exporter.file_name(&RenderOptions::default()), "CV.pdf");
        let pdf_bytes = exporter.render_to_bytes(&RenderOptions::default()).unwrap();
        let document = lopdf::Document::load_mem(&pdf_bytes).unwrap();
        let identifiers = document.trailer.get(b"ID").unwrap().as_array().unwrap();
        assert_eq!(
            identifiers[1].as_str().unwrap(),
            b"00000000000000000000000000000000"
        );
    }
}
