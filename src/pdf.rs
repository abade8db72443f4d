use lopdf::content::Operation;
use std::{collections::BTreeMap, io::BufWriter, mem};
use time::OffsetDateTime;

use crate::error::{ContextError, ErrorKind};
use crate::layout::{DrawOperation, LaidOutDocument};
use crate::metrics::{encode_text, StandardFont};

/// The index of the layer which receives the filled rectangles of a page.
pub const BACKGROUND_LAYER: usize = 0;
/// The index of the layer which receives the text of a page, drawn over the background.
pub const CONTENT_LAYER: usize = 1;

const LAYER_NAMES: [&str; 2] = ["Background", "Content"];

/// One layer of PDF data. It can be converted into a `lopdf::Stream` by calling `PdfLayer::into_stream`.
#[derive(Debug, Clone)]
pub struct PdfLayer {
    /// Name of the layer. Must be present for the optional content group.
    pub(crate) name: String,
    /// Stream objects in this layer. Usually, one layer equals to one stream.
    pub(crate) operations: Vec<Operation>,
}

impl PdfLayer {
    fn into_stream(self) -> Result<lopdf::Stream, ContextError> {
        // Construct the stream content from the actual underlying operations of the layer
        let stream_content = lopdf::content::Content {
            operations: self.operations,
        };
        let encoded_content = stream_content.encode().map_err(|error| {
            ContextError::with_error(
                ErrorKind::Generation,
                format!("Failed to encode the content of the PDF layer {:?}", self.name),
                &error,
            )
        })?;

        // Page contents should not be compressed
        Ok(lopdf::Stream::new(lopdf::Dictionary::new(), encoded_content).with_compression(false))
    }
}

/// A named reference to an OCG (Optional Content Group), which is parts of the PDF specification.
#[derive(Debug, Clone)]
pub struct OcgReference(String);

impl OcgReference {
    /// Creates a new OCG reference from an index.
    pub fn new(index: usize) -> Self {
        Self(format!("MC{index}"))
    }
}

/// The association between the OCG references and the actual PDF objects.
#[derive(Default, Debug, Clone)]
pub struct OcgLayersMap(Vec<(OcgReference, lopdf::Object)>);

impl OcgLayersMap {
    /// Adds a PDF object to the map for the OCG layers. Returns the reference to the added object.
    pub fn add_ocg(&mut self, object: lopdf::Object) -> OcgReference {
        let ocg_reference = OcgReference::new(self.0.len());
        self.0.push((ocg_reference.clone(), object));

        ocg_reference
    }
}

impl From<OcgLayersMap> for lopdf::Dictionary {
    fn from(value: OcgLayersMap) -> Self {
        let mut dictionary = lopdf::Dictionary::new();
        for (reference, object) in value.0 {
            dictionary.set(reference.0, object);
        }

        dictionary
    }
}

/// The representation of a PDF page. Utility functions are implemented for this struct
/// so that its content can be inserted into the underlying PDF document.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Page layers, drawn in order.
    pub layers: Vec<PdfLayer>,
}

impl PdfPage {
    /// Wraps each layer into its marked-content sequence and returns the resources of the page, which
    /// reference the optional content groups, together with the streams of the layers.
    ///
    /// # Arguments
    ///
    /// * `optional_content_groups` - The references to the OCG dictionaries of the layers, in the same order.
    fn collect_resources_and_streams(
        &self,
        optional_content_groups: Vec<lopdf::Object>,
    ) -> Result<(lopdf::Dictionary, Vec<lopdf::Stream>), ContextError> {
        use lopdf::Object::*;

        let mut ocg_layers = OcgLayersMap::default();
        let ocg_references: Vec<OcgReference> = optional_content_groups
            .into_iter()
            .map(|group| ocg_layers.add_ocg(group))
            .collect();
        let mut resource_dictionary = lopdf::Dictionary::new();
        resource_dictionary.set("Properties", Dictionary(ocg_layers.into()));

        let mut layer_streams = Vec::with_capacity(self.layers.len());
        for (index, layer) in self.layers.iter().enumerate() {
            let ocg_reference = ocg_references.get(index).ok_or_else(|| {
                ContextError::generation(format!(
                    "Unable to find the optional content group of the layer {:?}",
                    layer.name
                ))
            })?;

            // The BDC operator begins the marked-content sequence of the layer, the q/Q pair isolates
            // its graphics state
            let mut operations = Vec::with_capacity(layer.operations.len() + 4);
            operations.push(Operation::new(
                "BDC",
                vec![Name("OC".into()), Name(ocg_reference.0.clone().into())],
            ));
            operations.push(Operation::new("q", vec![]));
            operations.extend(layer.operations.iter().cloned());
            operations.push(Operation::new("Q", vec![]));
            operations.push(Operation::new("EMC", vec![]));

            let layer = PdfLayer {
                name: layer.name.clone(),
                operations,
            };
            layer_streams.push(layer.into_stream()?);
        }

        Ok((resource_dictionary, layer_streams))
    }
}

/// The entries of the document information dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
}

/// This struct represents the actual PDF document on a high-level. It is an interface to the actual underlying
/// `lopdf::Document` with the addition of the PDF pages, the document ID and the fonts used in the document.
pub struct PdfDocument {
    /// The fonts used by the document and the objects they are going to be stored in.
    fonts: BTreeMap<StandardFont, lopdf::ObjectId>,
    /// The underlying PDF document: this is a low-level interface and shouldn't be directly interacted with
    /// unless strictly necessary.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, it is used to in order to set the PDF `ID` tag.
    pub identifier: String,
    /// The pages of the PDF document.
    pub(crate) pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` by defaulting the underlying PDF document to version 1.5
    /// of the PDF specification and customly specifying the PDF identifier.
    pub fn new(pdf_document_identifier: String) -> Self {
        PdfDocument {
            fonts: BTreeMap::default(),
            inner_document: lopdf::Document::with_version("1.5"),
            identifier: pdf_document_identifier,
            pages: Vec::new(),
        }
    }

    /// Adds a page of the given width and height in points, with an empty background layer and an empty
    /// content layer. Returns the index of the page, to be passed to the functions which draw on it.
    pub fn add_page_with_layers(&mut self, page_width: f32, page_height: f32) -> usize {
        self.pages.push(PdfPage {
            width: page_width,
            height: page_height,
            layers: LAYER_NAMES
                .iter()
                .map(|name| PdfLayer {
                    name: name.to_string(),
                    operations: Vec::new(),
                })
                .collect(),
        });

        self.pages.len() - 1
    }

    /// Registers one of the standard fonts, so that text can be written with it.
    /// Registering the same font twice has no effect.
    pub fn add_font(&mut self, font: StandardFont) {
        if !self.fonts.contains_key(&font) {
            let font_object_id = self.inner_document.new_object_id();
            self.fonts.insert(font, font_object_id);
        }
    }

    /// Writes the text in the specified font and color at the given position, expressed in points from the
    /// bottom-left corner of the page. The text is encoded in the `WinAnsiEncoding` of the standard fonts.
    ///
    /// # Arguments
    ///
    /// * `page_index` - The index of the page to write the text to (should be previously obtained).
    /// * `layer_index` - The index of the layer to write the text to.
    /// * `color` - The RGB color employed for filling of the text.
    /// * `text` - The text to be written at the given layer in the given page.
    /// * `font` - The font to be used, which must have been registered with `add_font`.
    /// * `font_size` - The size of the font.
    /// * `caret_position` - The position of the start of the baseline of the text.
    #[allow(clippy::too_many_arguments)]
    pub fn write_text_to_layer_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        color: [f32; 3],
        text: &str,
        font: StandardFont,
        font_size: f32,
        caret_position: [f32; 2],
    ) -> Result<(), ContextError> {
        if !self.fonts.contains_key(&font) {
            return Err(ContextError::generation(format!(
                "The font {} has not been added to the document",
                font.base_font()
            )));
        }

        let [x, y] = caret_position;
        let [red, green, blue] = color;
        self.add_operations_to_layer_in_page(
            layer_index,
            page_index,
            vec![
                Operation::new("BT", vec![]), // Begin text section
                Operation::new("Tf", vec![font.resource_name().into(), font_size.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new(
                    "rg",
                    vec![red, green, blue]
                        .into_iter()
                        .map(lopdf::Object::Real)
                        .collect(),
                ),
                Operation::new(
                    "Tj",
                    vec![lopdf::Object::String(
                        encode_text(text),
                        lopdf::StringFormat::Hexadecimal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        )
    }

    /// Fills the rectangle whose bottom-left corner is at `(x, y)` with the given color, in points.
    pub fn fill_rectangle_in_layer_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        color: [f32; 3],
        rectangle: [f32; 4],
    ) -> Result<(), ContextError> {
        let [x, y, width, height] = rectangle;
        let [red, green, blue] = color;
        self.add_operations_to_layer_in_page(
            layer_index,
            page_index,
            vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "rg",
                    vec![red, green, blue]
                        .into_iter()
                        .map(lopdf::Object::Real)
                        .collect(),
                ),
                Operation::new(
                    "re",
                    vec![x.into(), y.into(), width.into(), height.into()],
                ),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
            ],
        )
    }

    /// Write the operations so far specified to the PDF file and finalize it.
    ///
    /// The instance ID is the second half of the trailer `ID`, it is expected to be 32 characters long.
    /// The creation and modification dates are fixed to the Unix epoch, so the same pages with the same
    /// identifiers always produce the same bytes.
    pub fn write_all(
        &mut self,
        instance_id: &str,
        info: &DocumentInfo,
    ) -> Result<(), ContextError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        let text = |value: &str| String(encode_text(value), Literal);
        let epoch = to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH);
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            ("CreationDate", String(epoch.clone().into_bytes(), Literal)),
            ("ModDate", String(epoch.into_bytes(), Literal)),
            ("Title", text(&info.title)),
            ("Author", text(&info.author)),
            ("Creator", text(&info.creator)),
            ("Producer", text(&info.producer)),
            ("Subject", text(&info.subject)),
            (
                "Identifier",
                String(self.identifier.clone().into_bytes(), Literal),
            ),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        // Construct the catalog, required by the PDF specification
        let pages_id = self.inner_document.new_object_id();
        let mut catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);

        let mut pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
        ]);

        // Construct the array which explains the intents of the optional content groups
        let intent_array_id = self
            .inner_document
            .add_object(Array(vec![Name("View".into()), Name("Design".into())]));

        // Insert one optional content group per layer of each page
        let mut page_optional_content_groups = Vec::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            let groups: Vec<lopdf::Object> = page
                .layers
                .iter()
                .map(|layer| {
                    let ocg_dictionary = lopdf::Dictionary::from_iter(vec![
                        ("Type", Name("OCG".into())),
                        ("Name", String(layer.name.clone().into_bytes(), Literal)),
                        ("Intent", Reference(intent_array_id)),
                    ]);
                    Reference(self.inner_document.add_object(Dictionary(ocg_dictionary)))
                })
                .collect();
            page_optional_content_groups.push(groups);
        }
        let all_optional_content_groups: Vec<lopdf::Object> = page_optional_content_groups
            .iter()
            .flatten()
            .cloned()
            .collect();

        catalog.set(
            "OCProperties",
            Dictionary(lopdf::Dictionary::from_iter(vec![
                ("OCGs", Array(all_optional_content_groups.clone())),
                (
                    "D",
                    Dictionary(lopdf::Dictionary::from_iter(vec![
                        ("Order", Array(all_optional_content_groups.clone())),
                        ("RBGroups", Array(vec![])),
                        ("ON", Array(all_optional_content_groups)),
                    ])),
                ),
            ])),
        );
        let catalog_id = self.inner_document.add_object(catalog);

        self.inner_document
            .trailer
            .set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(instance_id.as_bytes().to_vec(), Literal),
            ]),
        );

        let fonts_dictionary = self.insert_fonts_into_document();
        let fonts_dictionary_id = self.inner_document.add_object(fonts_dictionary);

        let mut page_ids = Vec::<lopdf::Object>::with_capacity(self.pages.len());
        for (page, optional_content_groups) in
            self.pages.iter().zip(page_optional_content_groups)
        {
            let media_box: lopdf::Object =
                vec![0.into(), 0.into(), page.width.into(), page.height.into()].into();
            let mut page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                ("MediaBox", media_box.clone()),
                ("TrimBox", media_box.clone()),
                ("CropBox", media_box),
                ("Parent", Reference(pages_id)),
            ]);

            let (mut resource_dictionary, layer_streams) =
                page.collect_resources_and_streams(optional_content_groups)?;
            resource_dictionary.set("Font", Reference(fonts_dictionary_id));
            let resources_page_id = self
                .inner_document
                .add_object(Dictionary(resource_dictionary));
            page_dictionary.set("Resources", Reference(resources_page_id));

            // Merge the streams of the individual layers into the single content stream of the page
            let mut merged_layer_streams = Vec::<u8>::new();
            for mut stream in layer_streams {
                merged_layer_streams.append(&mut stream.content);
            }
            let merged_layer_stream =
                lopdf::Stream::new(lopdf::Dictionary::new(), merged_layer_streams)
                    .with_compression(false);
            let page_content_id = self.inner_document.add_object(merged_layer_stream);
            page_dictionary.set("Contents", Reference(page_content_id));

            let page_id = self.inner_document.add_object(page_dictionary);
            page_ids.push(Reference(page_id))
        }

        pages.set::<_, lopdf::Object>("Kids".to_string(), page_ids.into());
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }

    /// Save the `PdfDocument` to bytes in order for it to be written to a file or further processed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, ContextError> {
        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Generation,
                "Error while saving the PDF document to bytes",
                &error,
            )
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Converts the fonts into a dictionary and inserts them into the document.
    fn insert_fonts_into_document(&mut self) -> lopdf::Dictionary {
        use lopdf::Object::*;

        let mut font_dictionary = lopdf::Dictionary::new();
        for (font, font_object_id) in self.fonts.iter() {
            let type1_font = lopdf::Dictionary::from_iter(vec![
                ("Type", Name("Font".into())),
                ("Subtype", Name("Type1".into())),
                ("BaseFont", Name(font.base_font().into())),
                ("Encoding", Name("WinAnsiEncoding".into())),
            ]);
            self.inner_document
                .objects
                .insert(*font_object_id, Dictionary(type1_font));
            font_dictionary.set(font.resource_name(), Reference(*font_object_id));
        }

        font_dictionary
    }

    /// This function is responsible for adding the given operations to the specified layer and page.
    fn add_operations_to_layer_in_page(
        &mut self,
        layer_index: usize,
        page_index: usize,
        operations: Vec<Operation>,
    ) -> Result<(), ContextError> {
        let pdf_layer_reference = self.get_mut_layer_in_page(layer_index, page_index)?;
        pdf_layer_reference.operations.extend(operations);

        Ok(())
    }

    // Retrieve the specified layer in the given page via the respective indices.
    fn get_mut_layer_in_page(
        &mut self,
        layer_index: usize,
        page_index: usize,
    ) -> Result<&mut PdfLayer, ContextError> {
        let pdf_page = self.pages.get_mut(page_index).ok_or_else(|| {
            ContextError::generation(format!("Failed to find the page with index {}", page_index))
        })?;
        let pdf_layer = pdf_page.layers.get_mut(layer_index).ok_or_else(|| {
            ContextError::generation(format!(
                "Failed to find the layer with index {}",
                layer_index
            ))
        })?;

        Ok(pdf_layer)
    }

    /// Draws a laid out document: each page receives its rectangles in the background layer and its text
    /// in the content layer, then the document is finalized with the given instance ID.
    pub fn from_layout(
        layout: &LaidOutDocument,
        document_identifier: String,
        instance_identifier: &str,
        info: &DocumentInfo,
    ) -> Result<PdfDocument, ContextError> {
        let mut pdf_document = PdfDocument::new(document_identifier);
        for font in StandardFont::ALL {
            pdf_document.add_font(font);
        }

        for page in layout.pages.iter() {
            let page_index =
                pdf_document.add_page_with_layers(layout.page_width, layout.page_height);
            for (layer_index, operations) in [
                (BACKGROUND_LAYER, &page.background),
                (CONTENT_LAYER, &page.content),
            ] {
                for operation in operations.iter() {
                    match operation {
                        DrawOperation::FillRectangle {
                            x,
                            y,
                            width,
                            height,
                            color,
                        } => pdf_document.fill_rectangle_in_layer_in_page(
                            page_index,
                            layer_index,
                            color.to_rgb(),
                            [*x, *y, *width, *height],
                        )?,
                        DrawOperation::Text {
                            x,
                            y,
                            text,
                            font,
                            size,
                            color,
                        } => pdf_document.write_text_to_layer_in_page(
                            page_index,
                            layer_index,
                            color.to_rgb(),
                            text,
                            *font,
                            *size,
                            [*x, *y],
                        )?,
                    }
                }
            }
        }
        log::debug!(
            "Drew {} page(s) into the PDF document {:?}",
            pdf_document.pages.len(),
            pdf_document.identifier
        );

        pdf_document.write_all(instance_identifier, info)?;
        Ok(pdf_document)
    }
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}
