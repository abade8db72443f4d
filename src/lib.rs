//! Vitae assembles a bilingual curriculum vitae from a static data store and exports it as a single A4 PDF document.
//!
//! A caller describes the document it wants through `RenderOptions` (theme, language, version, selected projects
//! and the visibility of the optional sections). The pipeline narrows the data store to the exact slice to render,
//! builds a document tree out of it, lays the tree out on A4 pages and finally serializes the pages into PDF bytes.
//! The bytes are then either returned as they are, saved into a directory, exposed through a temporary preview URL
//! or encoded as an e-mail attachment.
//!
//! Everything is deterministic: the same options always give byte-identical documents.

/// This module contains the `ContextError` type which is the error type used throughout this library.
///
/// The type carries a context message, the message of the error which caused it if any, and an `ErrorKind`
/// which tells apart invalid options or configuration, malformed content, and failures of the document generation.
pub mod error;

/// The render options: theme, language, version, selected projects and visible sections, with their defaults
/// and their JSON representation.
pub mod options;

/// The CV data store, which is partitioned by language and validated when loaded, so that every language holds
/// the same entries with the same identifiers in the same order.
pub mod data;

/// The labels written in the document for each language.
pub mod translations;

/// The `Catalog` holds the data store and the translation table, it is loaded once and passed by reference
/// into every render.
pub mod catalog;

/// The selection of the content to render out of the data store, depending on the render options.
///
/// # Introduction
///
/// The entry point of this module is `select_content`. The short version keeps the first two experience entries
/// and hides all the optional sections whatever the caller asked for, both versions keep at most three projects in
/// the order of the data store. Unknown project identifiers never fail the selection, they are reported as warnings.
pub mod selection;

/// The two style sheets of the document, one for each theme, and the typographic scale shared by both.
pub mod theme;

/// The widths of the standard Helvetica fonts, together with the `WinAnsiEncoding` used to write text with them
/// and the wrapping of text into lines.
pub mod metrics;

/// The document tree: a header, a sidebar and a main column made of sections of blocks.
/// It is built by `build_document` out of the selected content, empty and hidden sections being omitted.
pub mod document;

/// The layout of the document tree on pages.
///
/// # Introduction
///
/// The header is placed at the top of the first page, then the sidebar (35% of the width) and the main column
/// (the other 65%) are filled from the top down. Each column starts a new page when its next element does not fit,
/// a section title always staying with the first element of its section. The result is a list of pages of
/// positioned rectangles and text, which is what the `pdf` module draws.
pub mod layout;

/// The module where the `PdfDocument` interface for working with PDF documents is presented.
///
/// # Disclaimer
///
/// This work was partially adapted from the one of [fschutt](https://github.com/fschutt) for the crate [printpdf](https://github.com/fschutt/printpdf).
/// The reason why the crate `printpdf` could not be used as such is that it employs the random generation of parameters
/// such as the PDF identifier and the instance ID, which would make the output of the export unpredictable.
///
/// # Introduction
///
/// The main component of this module is the struct `PdfDocument`. It offers convenience functions
/// such as `add_page_with_layers`, `add_font`, `write_text_to_layer_in_page`, `fill_rectangle_in_layer_in_page`,
/// `write_all` and `save_to_bytes`. Text is written with the standard Type1 Helvetica fonts, which every PDF reader
/// provides, so no font file needs to be embedded. Each page holds a background layer and a content layer.
pub mod pdf;

/// The export configuration, read from a JSON file: the base of the file names, the identifiers and the metadata
/// of the documents, and an optional path to a data store replacing the built-in one.
pub mod configuration;

/// The export operations sharing one render step: `render_to_bytes`, `download_pdf`, `preview_url` and
/// `email_attachment`. Whatever goes wrong while rendering is reported as a single `Generation` error.
pub mod export;

/// The packaging of a rendered CV as a base64 e-mail attachment, and of the whole payload handed
/// to an external mail relay.
pub mod email;
