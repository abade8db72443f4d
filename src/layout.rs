#![warn(clippy::unwrap_used)]

use crate::document::{Block, DocumentTree, Entry, Header, Section, LIST_SEPARATOR};
use crate::metrics::{text_width, wrap_text, StandardFont};
use crate::theme::{style_sheet, typography, Color, StyleSheet};

/// The width of an A4 page in points.
pub const A4_WIDTH: f32 = 595.2756;
/// The height of an A4 page in points.
pub const A4_HEIGHT: f32 = 841.8898;
/// The share of the page width taken by the sidebar, the main column takes the rest.
pub const SIDEBAR_RATIO: f32 = 0.35;

const BULLET: &str = "•";
const BULLET_INDENT: f32 = 8.0;
const ASIDE_GAP: f32 = 6.0;
const TITLE_RULE_THICKNESS: f32 = 0.75;

/// A drawing primitive in PDF coordinates, where the origin is the bottom-left corner of the page.
/// The `y` of a text is its baseline, the `y` of a rectangle is its bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOperation {
    FillRectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font: StandardFont,
        size: f32,
        color: Color,
    },
}

/// The operations of a page, split between what is drawn behind the text and the text itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub background: Vec<DrawOperation>,
    pub content: Vec<DrawOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub title: String,
    pub author: String,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<LaidOutPage>,
}

impl LaidOutDocument {
    /// Every piece of text of the document, page after page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.content.iter())
            .filter_map(|operation| match operation {
                DrawOperation::Text { text, .. } => Some(text.as_str()),
                DrawOperation::FillRectangle { .. } => None,
            })
    }
}

/// A mark positioned relatively to the top of the fragment it belongs to, with `y` growing downwards.
#[derive(Debug, Clone)]
enum Mark {
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: StandardFont,
        size: f32,
        color: Color,
    },
    Rectangle {
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

impl Mark {
    /// Converts the mark into a draw operation once the top of its fragment on the page is known.
    fn place(self, fragment_top: f32, page_height: f32) -> DrawOperation {
        match self {
            Mark::Text {
                x,
                baseline,
                text,
                font,
                size,
                color,
            } => DrawOperation::Text {
                x,
                y: page_height - (fragment_top + baseline),
                text,
                font,
                size,
                color,
            },
            Mark::Rectangle {
                x,
                top,
                width,
                height,
                color,
            } => DrawOperation::FillRectangle {
                x,
                y: page_height - (fragment_top + top + height),
                width,
                height,
                color,
            },
        }
    }
}

/// A run of marks which is never split across two pages.
#[derive(Debug, Clone, Default)]
struct Fragment {
    height: f32,
    /// Spacing added after the fragment, which is not needed for it to fit on a page.
    space_after: f32,
    /// Whether the fragment has to be placed on the same page as the one that follows it.
    keep_with_next: bool,
    marks: Vec<Mark>,
}

impl Fragment {
    fn space(&mut self, amount: f32) {
        self.height += amount;
    }

    fn text_at(
        &mut self,
        x: f32,
        baseline: f32,
        text: &str,
        font: StandardFont,
        size: f32,
        color: Color,
    ) {
        if text.is_empty() {
            return;
        }
        self.marks.push(Mark::Text {
            x,
            baseline,
            text: text.to_string(),
            font,
            size,
            color,
        });
    }

    /// Appends the text broken into as many lines as needed to fit in `width`.
    fn wrapped(
        &mut self,
        x: f32,
        width: f32,
        text: &str,
        font: StandardFont,
        size: f32,
        color: Color,
    ) {
        for line in wrap_text(text, font, size, width) {
            let baseline = self.height + size;
            self.text_at(x, baseline, &line, font, size, color);
            self.height += size * typography::LINE_HEIGHT;
        }
    }

    /// Appends the text with a short piece of text aligned on the right of its first line.
    /// When the two would not fit side by side, the aside goes on its own line under the text.
    #[allow(clippy::too_many_arguments)]
    fn with_aside(
        &mut self,
        x: f32,
        width: f32,
        text: &str,
        font: StandardFont,
        size: f32,
        color: Color,
        aside: Option<(&str, StandardFont, f32, Color)>,
    ) {
        let Some((aside, aside_font, aside_size, aside_color)) = aside else {
            self.wrapped(x, width, text, font, size, color);
            return;
        };
        let aside_width = text_width(aside, aside_font, aside_size);
        let available = width - aside_width - ASIDE_GAP;
        if available < width * 0.4 {
            self.wrapped(x, width, text, font, size, color);
            self.wrapped(x, width, aside, aside_font, aside_size, aside_color);
            return;
        }

        let line_size = size.max(aside_size);
        let baseline = self.height + line_size;
        self.text_at(
            x + width - aside_width,
            baseline,
            aside,
            aside_font,
            aside_size,
            aside_color,
        );
        let lines = wrap_text(text, font, size, available);
        if lines.is_empty() {
            self.height += line_size * typography::LINE_HEIGHT;
        }
        for (index, line) in lines.iter().enumerate() {
            let line_height = if index == 0 { line_size } else { size };
            let baseline = self.height + line_height;
            self.text_at(x, baseline, line, font, size, color);
            self.height += line_height * typography::LINE_HEIGHT;
        }
    }

    fn rectangle(&mut self, x: f32, width: f32, height: f32, color: Color) {
        self.marks.push(Mark::Rectangle {
            x,
            top: self.height,
            width,
            height,
            color,
        });
        self.height += height;
    }
}

/// The placement and the colors of one of the two columns.
#[derive(Debug, Clone)]
struct Column {
    x: f32,
    width: f32,
    text: Color,
    muted: Color,
    accent: Color,
    title: Color,
    entry_title_size: f32,
    detail_size: f32,
    subtitle_size: f32,
    body_size: f32,
}

impl Column {
    fn sidebar(style: &StyleSheet, page_width: f32) -> Column {
        Column {
            x: typography::PADDING,
            width: page_width * SIDEBAR_RATIO - 2.0 * typography::PADDING,
            text: style.sidebar_text,
            muted: style.sidebar_muted,
            accent: style.sidebar_muted,
            title: style.sidebar_text,
            entry_title_size: typography::SIDEBAR_ITEM,
            detail_size: typography::SIDEBAR_DETAIL,
            subtitle_size: typography::SIDEBAR_DETAIL,
            body_size: typography::SIDEBAR_ITEM,
        }
    }

    fn main(style: &StyleSheet, page_width: f32) -> Column {
        let sidebar_width = page_width * SIDEBAR_RATIO;
        Column {
            x: sidebar_width + typography::PADDING,
            width: page_width - sidebar_width - 2.0 * typography::PADDING,
            text: style.main_text,
            muted: style.main_muted,
            accent: style.accent,
            title: style.accent,
            entry_title_size: typography::ENTRY_TITLE,
            detail_size: typography::ENTRY_DETAIL,
            subtitle_size: typography::ENTRY_SUBTITLE,
            body_size: typography::ENTRY_DESCRIPTION,
        }
    }

    fn title_fragment(&self, title: &str) -> Fragment {
        let mut fragment = Fragment {
            keep_with_next: true,
            ..Fragment::default()
        };
        fragment.wrapped(
            self.x,
            self.width,
            title,
            StandardFont::HelveticaBold,
            typography::SECTION_TITLE,
            self.title,
        );
        fragment.space(2.0);
        fragment.rectangle(self.x, self.width, TITLE_RULE_THICKNESS, self.title);
        fragment.space(typography::ITEM_GAP);
        fragment
    }

    fn paragraph_fragments(&self, text: &str, size: f32, color: Color) -> Vec<Fragment> {
        wrap_text(text, StandardFont::Helvetica, size, self.width)
            .into_iter()
            .map(|line| {
                let mut fragment = Fragment::default();
                fragment.text_at(self.x, size, &line, StandardFont::Helvetica, size, color);
                fragment.height = size * typography::LINE_HEIGHT;
                fragment
            })
            .collect()
    }

    fn entry_fragments(&self, entry: &Entry) -> Vec<Fragment> {
        let mut head = Fragment::default();
        head.with_aside(
            self.x,
            self.width,
            &entry.title,
            StandardFont::HelveticaBold,
            self.entry_title_size,
            self.text,
            entry.aside.as_deref().map(|aside| {
                (aside, StandardFont::Helvetica, self.detail_size, self.muted)
            }),
        );
        if let Some(subtitle) = &entry.subtitle {
            head.wrapped(
                self.x,
                self.width,
                subtitle,
                StandardFont::Helvetica,
                self.subtitle_size,
                self.accent,
            );
        }
        if let Some(location) = &entry.location {
            head.wrapped(
                self.x,
                self.width,
                location,
                StandardFont::HelveticaOblique,
                self.detail_size,
                self.muted,
            );
        }

        let mut fragments = vec![head];
        if let Some(description) = &entry.description {
            fragments.extend(self.paragraph_fragments(description, self.body_size, self.text));
        }
        for bullet in entry.bullets.iter() {
            let mut fragment = Fragment::default();
            fragment.text_at(
                self.x,
                self.body_size,
                BULLET,
                StandardFont::Helvetica,
                self.body_size,
                self.accent,
            );
            fragment.wrapped(
                self.x + BULLET_INDENT,
                self.width - BULLET_INDENT,
                bullet,
                StandardFont::Helvetica,
                self.body_size,
                self.text,
            );
            fragments.push(fragment);
        }
        if !entry.tags.is_empty() {
            let mut fragment = Fragment::default();
            fragment.space(1.0);
            fragment.wrapped(
                self.x,
                self.width,
                &entry.tags.join(LIST_SEPARATOR),
                StandardFont::HelveticaOblique,
                typography::TAGS,
                self.accent,
            );
            fragments.push(fragment);
        }

        if fragments.len() > 1 {
            fragments[0].keep_with_next = true;
        }
        fragments
    }

    fn block_fragments(&self, block: &Block, style: &StyleSheet) -> Vec<Fragment> {
        let mut fragments = match block {
            Block::Pair { label, value } => {
                let mut fragment = Fragment::default();
                fragment.with_aside(
                    self.x,
                    self.width,
                    label,
                    StandardFont::HelveticaBold,
                    self.entry_title_size,
                    self.text,
                    Some((
                        value.as_str(),
                        StandardFont::Helvetica,
                        self.detail_size,
                        self.muted,
                    )),
                );
                vec![fragment]
            }
            Block::Caption { text } => {
                let mut fragment = Fragment {
                    keep_with_next: true,
                    ..Fragment::default()
                };
                fragment.wrapped(
                    self.x,
                    self.width,
                    text,
                    StandardFont::HelveticaBold,
                    self.detail_size,
                    self.muted,
                );
                fragment.space(1.0);
                return vec![fragment];
            }
            Block::SkillBar { name, level } => {
                let level = (*level).min(100);
                let mut fragment = Fragment::default();
                fragment.with_aside(
                    self.x,
                    self.width,
                    name,
                    StandardFont::Helvetica,
                    typography::SKILL_NAME,
                    self.text,
                    Some((
                        format!("{}%", level).as_str(),
                        StandardFont::Helvetica,
                        typography::SKILL_LEVEL,
                        self.muted,
                    )),
                );
                fragment.space(1.0);
                let top = fragment.height;
                fragment.marks.push(Mark::Rectangle {
                    x: self.x,
                    top,
                    width: self.width,
                    height: typography::BAR_HEIGHT,
                    color: style.bar_track,
                });
                if level > 0 {
                    fragment.marks.push(Mark::Rectangle {
                        x: self.x,
                        top,
                        width: self.width * level as f32 / 100.0,
                        height: typography::BAR_HEIGHT,
                        color: style.bar_fill,
                    });
                }
                fragment.space(typography::BAR_HEIGHT);
                vec![fragment]
            }
            Block::Paragraph { text } => self.paragraph_fragments(text, self.body_size, self.text),
            Block::Entry(entry) => self.entry_fragments(entry),
        };
        if let Some(last) = fragments.last_mut() {
            last.space_after += typography::ITEM_GAP;
        }
        fragments
    }

    fn section_fragments(&self, sections: &[Section], style: &StyleSheet) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        for section in sections {
            fragments.push(self.title_fragment(&section.title));
            for block in section.blocks.iter() {
                fragments.extend(self.block_fragments(block, style));
            }
            if let Some(last) = fragments.last_mut() {
                last.keep_with_next = false;
                last.space_after += typography::SECTION_GAP;
            }
        }
        fragments
    }
}

/// The vertical bounds of the columns, measured from the top of the page.
#[derive(Debug, Clone, Copy)]
struct PageGeometry {
    page_height: f32,
    first_page_top: f32,
    continuation_top: f32,
    bottom: f32,
}

/// Places the fragments of a column from the top down, starting a new page whenever the next group of
/// fragments which must stay together does not fit. Returns the operations of the column for each page.
fn paginate(fragments: Vec<Fragment>, geometry: PageGeometry) -> Vec<Vec<DrawOperation>> {
    let mut pages = Vec::new();
    let mut current_page = Vec::new();
    let mut page_top = geometry.first_page_top;
    let mut caret = page_top;

    let mut fragments = fragments.into_iter();
    while let Some(fragment) = fragments.next() {
        let mut group = vec![fragment];
        while group.last().map_or(false, |fragment| fragment.keep_with_next) {
            match fragments.next() {
                Some(next) => group.push(next),
                None => break,
            }
        }

        let group_height: f32 = group
            .iter()
            .enumerate()
            .map(|(index, fragment)| {
                if index + 1 < group.len() {
                    fragment.height + fragment.space_after
                } else {
                    fragment.height
                }
            })
            .sum();
        if caret + group_height > geometry.bottom && caret > page_top {
            log::debug!(
                "Breaking the column onto page {} at {:.1}pt",
                pages.len() + 2,
                caret
            );
            pages.push(std::mem::take(&mut current_page));
            page_top = geometry.continuation_top;
            caret = page_top;
        }

        for fragment in group {
            current_page.extend(
                fragment
                    .marks
                    .into_iter()
                    .map(|mark| mark.place(caret, geometry.page_height)),
            );
            caret += fragment.height + fragment.space_after;
        }
    }
    pages.push(current_page);

    pages
}

/// Lays out the header and returns its operations along with its height.
fn layout_header(header: &Header, style: &StyleSheet, page_width: f32) -> (Fragment, f32) {
    let margin = 2.0 * typography::PADDING;
    let inner_width = page_width - 2.0 * margin;

    let mut fragment = Fragment::default();
    fragment.space(1.5 * typography::PADDING);
    fragment.wrapped(
        margin,
        inner_width,
        &header.name,
        StandardFont::HelveticaBold,
        typography::NAME,
        style.primary,
    );
    fragment.wrapped(
        margin,
        inner_width,
        &header.title,
        StandardFont::Helvetica,
        typography::TITLE,
        style.header_title,
    );
    fragment.space(4.0);

    let cell_width = inner_width / 2.0 - ASIDE_GAP;
    let size = typography::CONTACT;
    for row in header.contact_rows.iter() {
        let cells: Vec<Vec<String>> = row
            .iter()
            .map(|cell| wrap_text(cell, StandardFont::Helvetica, size, cell_width))
            .collect();
        let row_lines = cells.iter().map(|lines| lines.len()).max().unwrap_or(0);
        for (column_index, lines) in cells.iter().enumerate() {
            let x = margin + column_index as f32 * inner_width / 2.0;
            for (line_index, line) in lines.iter().enumerate() {
                let baseline =
                    fragment.height + line_index as f32 * size * typography::LINE_HEIGHT + size;
                fragment.text_at(
                    x,
                    baseline,
                    line,
                    StandardFont::Helvetica,
                    size,
                    style.header_contact,
                );
            }
        }
        fragment.height += row_lines as f32 * size * typography::LINE_HEIGHT;
    }
    fragment.space(typography::PADDING);

    let height = fragment.height;
    (fragment, height)
}

fn page_background(
    style: &StyleSheet,
    page_width: f32,
    page_height: f32,
    band_top: f32,
) -> Vec<DrawOperation> {
    vec![
        DrawOperation::FillRectangle {
            x: 0.0,
            y: 0.0,
            width: page_width,
            height: page_height,
            color: style.page_background,
        },
        DrawOperation::FillRectangle {
            x: 0.0,
            y: 0.0,
            width: page_width * SIDEBAR_RATIO,
            height: page_height - band_top,
            color: style.sidebar_background,
        },
    ]
}

/// Positions every element of the document on A4 pages: the header on top of the first page, then the
/// sidebar and the main column side by side. Each column flows onto new pages independently, and every
/// page repeats the page background and the sidebar band.
pub fn layout_document(tree: &DocumentTree) -> LaidOutDocument {
    layout_document_with_size(tree, A4_WIDTH, A4_HEIGHT)
}

/// Same as `layout_document`, but on pages of the given size in points.
pub fn layout_document_with_size(
    tree: &DocumentTree,
    page_width: f32,
    page_height: f32,
) -> LaidOutDocument {
    let style = style_sheet(tree.theme);

    let (header, header_height) = layout_header(&tree.header, style, page_width);
    let band_top = header_height + typography::RULE_THICKNESS;
    let geometry = PageGeometry {
        page_height,
        first_page_top: band_top + 1.5 * typography::PADDING,
        continuation_top: 2.0 * typography::PADDING,
        bottom: page_height - 2.0 * typography::PADDING,
    };

    let sidebar = Column::sidebar(style, page_width);
    let main = Column::main(style, page_width);
    let mut sidebar_pages = paginate(sidebar.section_fragments(&tree.sidebar, style), geometry)
        .into_iter();
    let mut main_pages = paginate(main.section_fragments(&tree.main, style), geometry).into_iter();
    let page_count = sidebar_pages.len().max(main_pages.len());

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let mut page = LaidOutPage::default();
        if page_index == 0 {
            page.background = page_background(style, page_width, page_height, band_top);
            page.background.push(DrawOperation::FillRectangle {
                x: 0.0,
                y: page_height - header_height,
                width: page_width,
                height: header_height,
                color: style.header_background,
            });
            page.background.push(DrawOperation::FillRectangle {
                x: 0.0,
                y: page_height - band_top,
                width: page_width,
                height: typography::RULE_THICKNESS,
                color: style.primary,
            });
            page.content.extend(
                header
                    .marks
                    .iter()
                    .cloned()
                    .map(|mark| mark.place(0.0, page_height)),
            );
        } else {
            page.background = page_background(style, page_width, page_height, 0.0);
        }

        // The rectangles of the skill bars belong behind the text
        for operation in sidebar_pages
            .next()
            .into_iter()
            .chain(main_pages.next())
            .flatten()
        {
            match operation {
                DrawOperation::FillRectangle { .. } => page.background.push(operation),
                DrawOperation::Text { .. } => page.content.push(operation),
            }
        }
        pages.push(page);
    }
    log::info!("Laid out the document on {} page(s)", pages.len());

    LaidOutDocument {
        title: format!("{} - CV", tree.header.name),
        author: tree.header.name.clone(),
        page_width,
        page_height,
        pages,
    }
}
