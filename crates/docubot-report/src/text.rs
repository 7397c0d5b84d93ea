//! Plain-text serialization of a [`Report`]; pages are separated by form
//! feeds.

use crate::layout::{ElementKind, Report};

impl Report {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push('\u{000C}');
            }
            for el in &page.elements {
                match el.kind {
                    ElementKind::TitleBand => {
                        out.push_str(&el.text);
                        out.push('\n');
                        out.push_str(&"=".repeat(el.text.chars().count()));
                        out.push('\n');
                    }
                    ElementKind::Subtitle => {
                        out.push_str(&el.text);
                        out.push_str("\n\n");
                    }
                    ElementKind::SectionHeader => {
                        out.push('\n');
                        out.push_str(&el.text);
                        out.push('\n');
                        out.push_str(&"-".repeat(el.text.chars().count()));
                        out.push('\n');
                    }
                    ElementKind::Line => {
                        out.push_str(&" ".repeat(el.indent));
                        out.push_str(&el.text);
                        out.push('\n');
                    }
                    ElementKind::Footer => {
                        out.push('\n');
                        out.push_str(&el.text);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}
