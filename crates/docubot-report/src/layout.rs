//! Page model and the vertical-cursor layout engine.
//!
//! Coordinates are in points with the origin at the top-left corner of
//! the page; `y` grows downwards. Text width is measured in character
//! columns of `char_width` points each.

use docubot_core::RiskColor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub title_band: f32,
    pub header_height: f32,
    pub line_height: f32,
    pub footer_band: f32,
    /// Advance of one character of the embedded monospace face at body size.
    pub char_width: f32,
}

impl Default for PageGeometry {
    /// A4 portrait, 10pt body text.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: 40.0,
            title_band: 80.0,
            header_height: 26.0,
            line_height: 14.0,
            footer_band: 36.0,
            char_width: 6.1,
        }
    }
}

impl PageGeometry {
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Usable width in character columns (at least one).
    pub fn columns(&self) -> usize {
        ((self.usable_width() / self.char_width).floor() as usize).max(1)
    }

    /// Lowest `y` content may reach before the footer band.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin - self.footer_band
    }
}

/// What to do when content runs past the bottom of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// Start a new page; every page gets a footer.
    #[default]
    Paged,
    /// Keep everything on one page, running past its bottom edge if needed.
    SinglePage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    TitleBand,
    Subtitle,
    SectionHeader,
    Line,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Muted,
    Accent,
    Inverse,
    Risk(RiskColor),
}

/// One positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub x: f32,
    /// Top of the element's slot.
    pub y: f32,
    /// Indent in character columns from the left margin.
    pub indent: usize,
    pub text: String,
    pub tone: Tone,
    pub bold: bool,
    pub size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Report {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.elements().any(|e| e.text.contains(needle))
    }
}

/// Greedy word wrap to `max_chars` columns.
///
/// Words are packed onto a line until the next one would not fit, then the
/// line is flushed. A word longer than `max_chars` gets a line of its own
/// and is not split. Explicit newlines start a new line; blank input lines
/// are kept as empty lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }
        lines.push(line);
    }
    lines
}

pub(crate) const TITLE_SIZE: f32 = 18.0;
pub(crate) const HEADER_SIZE: f32 = 13.0;
pub(crate) const BODY_SIZE: f32 = 10.0;
pub(crate) const FOOTER_SIZE: f32 = 8.0;

/// Vertical cursor that places elements and breaks pages.
pub(crate) struct Cursor {
    geometry: PageGeometry,
    pagination: Pagination,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl Cursor {
    pub(crate) fn new(geometry: PageGeometry, pagination: Pagination) -> Self {
        Self {
            geometry,
            pagination,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.margin,
        }
    }

    pub(crate) fn columns(&self) -> usize {
        self.geometry.columns()
    }

    /// Fixed-height band at the top of the first page.
    pub(crate) fn title_band(&mut self, title: &str, subtitle: &str) {
        let g = self.geometry;
        self.push(
            ElementKind::TitleBand,
            0,
            g.margin * 0.6,
            title,
            Tone::Inverse,
            true,
            TITLE_SIZE,
        );
        self.push(
            ElementKind::Subtitle,
            0,
            g.margin * 0.6 + TITLE_SIZE + 6.0,
            subtitle,
            Tone::Inverse,
            false,
            BODY_SIZE,
        );
        self.y = g.title_band + g.line_height;
    }

    pub(crate) fn header(&mut self, text: &str, tone: Tone) {
        // Keep a header together with at least its first line.
        self.ensure_room(self.geometry.header_height + self.geometry.line_height);
        let y = self.y;
        self.push(ElementKind::SectionHeader, 0, y, text, tone, true, HEADER_SIZE);
        self.y += self.geometry.header_height;
    }

    pub(crate) fn line(&mut self, text: &str, indent: usize, tone: Tone, bold: bool) {
        self.ensure_room(self.geometry.line_height);
        let y = self.y;
        self.push(ElementKind::Line, indent, y, text, tone, bold, BODY_SIZE);
        self.y += self.geometry.line_height;
    }

    /// Wrap `text` to the usable width minus `indent` and emit each line.
    pub(crate) fn paragraph(&mut self, text: &str, indent: usize, tone: Tone) {
        let width = self.columns().saturating_sub(indent).max(1);
        for line in wrap_text(text, width) {
            self.line(&line, indent, tone, false);
        }
    }

    pub(crate) fn gap(&mut self, height: f32) {
        self.y += height;
    }

    /// Close the last page and stamp every page with its footer.
    pub(crate) fn finish(mut self, footer: impl Fn(usize, usize) -> String) -> Vec<Page> {
        let last = std::mem::take(&mut self.current);
        self.pages.push(last);

        let g = self.geometry;
        let total = self.pages.len();
        let footer_y = match self.pagination {
            Pagination::Paged => g.height - g.margin - g.footer_band / 2.0,
            Pagination::SinglePage => (g.height - g.margin - g.footer_band / 2.0).max(self.y),
        };
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.elements.push(Element {
                kind: ElementKind::Footer,
                x: g.margin,
                y: footer_y,
                indent: 0,
                text: footer(i + 1, total),
                tone: Tone::Muted,
                bold: false,
                size: FOOTER_SIZE,
            });
        }
        self.pages
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.pagination == Pagination::SinglePage {
            return;
        }
        let g = self.geometry;
        let fresh_page = self.y <= g.margin;
        if !fresh_page && self.y + needed > g.content_bottom() {
            let full = std::mem::take(&mut self.current);
            self.pages.push(full);
            self.y = g.margin;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: ElementKind,
        indent: usize,
        y: f32,
        text: &str,
        tone: Tone,
        bold: bool,
        size: f32,
    ) {
        let x = self.geometry.margin + indent as f32 * self.geometry.char_width;
        self.current.elements.push(Element {
            kind,
            x,
            y,
            indent,
            text: text.to_string(),
            tone,
            bold,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn greedy_wrap_packs_words() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
    }

    #[test]
    fn long_word_gets_its_own_line_unmodified() {
        let lines = wrap_text("see supercalifragilistic now", 8);
        assert_eq!(lines, vec!["see", "supercalifragilistic", "now"]);
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let lines = wrap_text("Договор аренды квартиры", 14);
        assert_eq!(lines, vec!["Договор аренды", "квартиры"]);
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        assert_eq!(wrap_text("one\n\ntwo", 20), vec!["one", "", "two"]);
        assert!(wrap_text("", 20).is_empty());
    }

    #[test]
    fn paged_cursor_breaks_before_footer_band() {
        let g = PageGeometry::default();
        let mut cursor = Cursor::new(g, Pagination::Paged);
        cursor.title_band("Title", "Subtitle");
        for i in 0..200 {
            cursor.line(&format!("line {i}"), 0, Tone::Normal, false);
        }
        let pages = cursor.finish(|n, total| format!("{n}/{total}"));
        assert!(pages.len() > 1);
        for page in &pages {
            for el in page.elements.iter().filter(|e| e.kind == ElementKind::Line) {
                assert!(el.y + g.line_height <= g.content_bottom());
            }
        }
        let last_footer = pages.last().unwrap().elements.last().unwrap();
        assert_eq!(last_footer.kind, ElementKind::Footer);
        assert_eq!(last_footer.text, format!("{}/{}", pages.len(), pages.len()));
    }

    #[test]
    fn single_page_cursor_never_breaks() {
        let mut cursor = Cursor::new(PageGeometry::default(), Pagination::SinglePage);
        for i in 0..200 {
            cursor.line(&format!("line {i}"), 0, Tone::Normal, false);
        }
        let pages = cursor.finish(|_, _| String::new());
        assert_eq!(pages.len(), 1);
        let footer = pages[0].elements.last().unwrap();
        assert!(footer.y > PageGeometry::default().height);
    }

    proptest! {
        #[test]
        fn wrapped_lines_fit_or_are_single_words(
            text in "[a-zа-я ]{0,300}",
            width in 1usize..60,
        ) {
            for line in wrap_text(&text, width) {
                prop_assert!(line.chars().count() <= width || !line.contains(' '));
            }
        }

        #[test]
        fn wrap_preserves_words_in_order(text in "[a-z ]{0,300}", width in 1usize..60) {
            let wrapped = wrap_text(&text, width).join(" ");
            let before: Vec<&str> = text.split_whitespace().collect();
            let after: Vec<&str> = wrapped.split_whitespace().collect();
            prop_assert_eq!(before, after);
        }
    }
}
