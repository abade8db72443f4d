use crate::options::Theme;

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Builds a color from its `0xRRGGBB` notation.
    pub const fn from_hex(hex: u32) -> Color {
        Color {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    /// The color components in the 0 to 1 range used by the PDF color operators.
    pub fn to_rgb(self) -> [f32; 3] {
        [
            self.red as f32 / 255.0,
            self.green as f32 / 255.0,
            self.blue as f32 / 255.0,
        ]
    }
}

/// The colors of one theme.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    pub page_background: Color,
    pub header_background: Color,
    /// The color of the name and of the rule under the header.
    pub primary: Color,
    pub header_title: Color,
    pub header_contact: Color,
    pub sidebar_background: Color,
    pub sidebar_text: Color,
    pub sidebar_muted: Color,
    pub bar_track: Color,
    pub bar_fill: Color,
    pub main_text: Color,
    pub main_muted: Color,
    /// The color of the main section titles, subtitles, bullets and technologies.
    pub accent: Color,
}

pub const LIGHT: StyleSheet = StyleSheet {
    page_background: Color::from_hex(0xffffff),
    header_background: Color::from_hex(0xf8fafc),
    primary: Color::from_hex(0x2563eb),
    header_title: Color::from_hex(0x1e293b),
    header_contact: Color::from_hex(0x64748b),
    sidebar_background: Color::from_hex(0x2563eb),
    sidebar_text: Color::from_hex(0xffffff),
    sidebar_muted: Color::from_hex(0xcbd5e1),
    // White at 20% opacity over the sidebar
    bar_track: Color::from_hex(0x5182ef),
    bar_fill: Color::from_hex(0x60a5fa),
    main_text: Color::from_hex(0x1e293b),
    main_muted: Color::from_hex(0x64748b),
    accent: Color::from_hex(0x2563eb),
};

pub const DARK: StyleSheet = StyleSheet {
    page_background: Color::from_hex(0x0f172a),
    header_background: Color::from_hex(0x1e293b),
    primary: Color::from_hex(0x06b6d4),
    header_title: Color::from_hex(0xffffff),
    header_contact: Color::from_hex(0xcbd5e1),
    sidebar_background: Color::from_hex(0x1e3a8a),
    sidebar_text: Color::from_hex(0xffffff),
    sidebar_muted: Color::from_hex(0xcbd5e1),
    // White at 20% opacity over the sidebar
    bar_track: Color::from_hex(0x4b61a1),
    bar_fill: Color::from_hex(0x06b6d4),
    main_text: Color::from_hex(0xe2e8f0),
    main_muted: Color::from_hex(0x94a3b8),
    accent: Color::from_hex(0x06b6d4),
};

/// Font sizes and spacing in points, shared by both themes.
pub mod typography {
    pub const NAME: f32 = 16.0;
    pub const TITLE: f32 = 9.0;
    pub const CONTACT: f32 = 6.5;
    pub const SECTION_TITLE: f32 = 9.0;
    pub const SUMMARY: f32 = 7.5;
    pub const ENTRY_TITLE: f32 = 8.5;
    pub const ENTRY_SUBTITLE: f32 = 7.5;
    pub const ENTRY_DETAIL: f32 = 6.5;
    pub const ENTRY_DESCRIPTION: f32 = 7.5;
    pub const TAGS: f32 = 7.0;
    pub const SIDEBAR_ITEM: f32 = 7.5;
    pub const SIDEBAR_DETAIL: f32 = 6.5;
    pub const SKILL_NAME: f32 = 6.5;
    pub const SKILL_LEVEL: f32 = 5.5;

    pub const BAR_HEIGHT: f32 = 3.0;
    pub const RULE_THICKNESS: f32 = 1.5;
    pub const PADDING: f32 = 10.0;
    pub const SECTION_GAP: f32 = 10.0;
    pub const ITEM_GAP: f32 = 5.0;
    pub const LINE_HEIGHT: f32 = 1.3;
}

pub fn style_sheet(theme: Theme) -> &'static StyleSheet {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_are_split_into_components() {
        let color = Color::from_hex(0x2563eb);

        assert_eq!((color.red, color.green, color.blue), (0x25, 0x63, 0xeb));
        assert_eq!(Color::from_hex(0xffffff).to_rgb(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn themes_use_distinct_style_sheets() {
        assert_ne!(style_sheet(Theme::Light), style_sheet(Theme::Dark));
        assert_eq!(
            style_sheet(Theme::Dark).page_background,
            Color::from_hex(0x0f172a)
        );
    }
}
