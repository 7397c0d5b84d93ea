//! PDF serialization with lopdf.
//!
//! Text is set in the embedded monospace faces from `font.rs`. When
//! none is available the built-in Helvetica pair is used instead; those
//! use WinAnsi encoding, so only Latin-1 survives and other characters
//! are written as `?`.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::ReportError;
use crate::font::{EmbeddedFont, embedded_faces};
use crate::layout::{Element, ElementKind, Page, PageGeometry, Report, Tone};

const ACCENT: (f32, f32, f32) = (0.05, 0.58, 0.53);
const TEXT: (f32, f32, f32) = (0.1, 0.1, 0.12);
const MUTED: (f32, f32, f32) = (0.45, 0.45, 0.5);

impl Report {
    pub fn to_pdf(&self) -> Result<Vec<u8>, ReportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let [mut regular, mut bold] = fonts()?;
        let regular_id = doc.new_object_id();
        let bold_id = doc.new_object_id();
        let resources = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![
                ("F1", Object::Reference(regular_id)),
                ("F2", Object::Reference(bold_id)),
            ])),
        )]));

        let g = self.geometry;
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = Content {
                operations: page_operations(page, &g, &mut regular, &mut bold),
            };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(g.width),
                        Object::Real(g.height),
                    ]),
                ),
                ("Resources", Object::Reference(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            page_ids.push(page_id);
        }
        // Widths and ToUnicode cover only the glyphs the pages used.
        regular.write(&mut doc, regular_id);
        bold.write(&mut doc, bold_id);

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// A font resource and the encoder its text strings go through.
enum PdfFont {
    Embedded(EmbeddedFont),
    Builtin(&'static str),
}

impl PdfFont {
    fn show(&mut self, text: &str) -> Object {
        match self {
            PdfFont::Embedded(font) => Object::String(font.encode(text), StringFormat::Hexadecimal),
            PdfFont::Builtin(_) => Object::String(win_ansi(text), StringFormat::Literal),
        }
    }

    fn write(&self, doc: &mut Document, id: ObjectId) {
        match self {
            PdfFont::Embedded(font) => font.write(doc, id),
            PdfFont::Builtin(base) => {
                let font = Dictionary::from_iter(vec![
                    ("Type", Object::Name(b"Font".to_vec())),
                    ("Subtype", Object::Name(b"Type1".to_vec())),
                    ("BaseFont", Object::Name(base.as_bytes().to_vec())),
                    ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
                ]);
                doc.objects.insert(id, Object::Dictionary(font));
            }
        }
    }
}

/// Regular and bold resources, `F1` and `F2`.
fn fonts() -> Result<[PdfFont; 2], ReportError> {
    Ok(match embedded_faces() {
        Some(faces) => [
            PdfFont::Embedded(EmbeddedFont::new(faces.regular)?),
            PdfFont::Embedded(EmbeddedFont::new(faces.bold)?),
        ],
        None => [
            PdfFont::Builtin("Helvetica"),
            PdfFont::Builtin("Helvetica-Bold"),
        ],
    })
}

fn page_operations(
    page: &Page,
    g: &PageGeometry,
    regular: &mut PdfFont,
    bold: &mut PdfFont,
) -> Vec<Operation> {
    let mut ops = Vec::new();

    if page.elements.iter().any(|e| e.kind == ElementKind::TitleBand) {
        // Band fill across the top of the page.
        ops.extend(fill_color(ACCENT));
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(0.0),
                Object::Real(g.height - g.title_band),
                Object::Real(g.width),
                Object::Real(g.title_band),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    for el in &page.elements {
        let (name, font) = if el.bold {
            ("F2", &mut *bold)
        } else {
            ("F1", &mut *regular)
        };
        ops.extend(text_operations(el, g, name, font));
    }
    ops
}

fn text_operations(
    el: &Element,
    g: &PageGeometry,
    name: &str,
    font: &mut PdfFont,
) -> Vec<Operation> {
    // Slot top → baseline, flipped into PDF's bottom-left origin.
    let baseline = g.height - el.y - el.size;
    let mut ops = vec![Operation::new("BT", vec![])];
    ops.extend(fill_color(tone_rgb(el.tone)));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(name.as_bytes().to_vec()), Object::Real(el.size)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(el.x), Object::Real(baseline)],
    ));
    ops.push(Operation::new("Tj", vec![font.show(&el.text)]));
    ops.push(Operation::new("ET", vec![]));
    ops
}

fn fill_color((r, g, b): (f32, f32, f32)) -> Vec<Operation> {
    vec![Operation::new(
        "rg",
        vec![Object::Real(r), Object::Real(g), Object::Real(b)],
    )]
}

fn tone_rgb(tone: Tone) -> (f32, f32, f32) {
    match tone {
        Tone::Normal => TEXT,
        Tone::Muted => MUTED,
        Tone::Accent => ACCENT,
        Tone::Inverse => (1.0, 1.0, 1.0),
        Tone::Risk(color) => color.rgb(),
    }
}

/// Map text onto WinAnsi bytes; unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '—' => 0x97,
            '–' => 0x96,
            '€' => 0x80,
            c if (c as u32) < 0x80 && !c.is_control() => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pagination, ReportConfig, ReportRenderer};
    use docubot_core::{Language, Locale, normalize};
    use serde_json::json;

    fn report(summary_words: usize, pagination: Pagination, language: Language) -> Report {
        let result = normalize(&json!({
            "document_type": "invoice",
            "risk_flags": [{
                "level": "medium",
                "category": "deadline",
                "description": "Payment due in 3 days",
                "suggestion": "Pay early"
            }],
            "summary": "word ".repeat(summary_words),
            "confidence_score": 0.9
        }))
        .unwrap();
        ReportRenderer::new(ReportConfig {
            pagination,
            ..ReportConfig::default()
        })
        .render(&result, &Locale::new(language))
    }

    fn referenced<'a>(doc: &'a Document, dict: &Dictionary, key: &[u8]) -> &'a Dictionary {
        let id = dict.get(key).and_then(Object::as_reference).unwrap();
        doc.get_dictionary(id).unwrap()
    }

    #[test]
    fn pdf_has_one_page_per_report_page() {
        let report = report(2000, Pagination::Paged, Language::En);
        assert!(report.pages.len() > 1);

        let bytes = report.to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), report.pages.len());
    }

    #[test]
    fn short_report_is_single_page_pdf() {
        let bytes = report(10, Pagination::Paged, Language::En).to_pdf().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn russian_report_embeds_unicode_font() {
        let bytes = report(10, Pagination::Paged, Language::Ru).to_pdf().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let type0: Vec<&Dictionary> = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter(|d| {
                d.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice())
            })
            .collect();
        assert_eq!(type0.len(), 2);

        for font in type0 {
            let encoding = font.get(b"Encoding").and_then(Object::as_name).unwrap();
            assert_eq!(encoding, b"Identity-H");

            let descendants = font.get(b"DescendantFonts").and_then(Object::as_array).unwrap();
            let cid_id = descendants[0].as_reference().unwrap();
            let cid_font = doc.get_dictionary(cid_id).unwrap();
            let descriptor = referenced(&doc, cid_font, b"FontDescriptor");
            let file_id = descriptor.get(b"FontFile2").and_then(Object::as_reference).unwrap();
            let file = doc.get_object(file_id).and_then(Object::as_stream).unwrap();
            assert!(file.dict.get(b"Length1").is_ok());
            assert!(!file.content.is_empty());

            let cmap_id = font.get(b"ToUnicode").and_then(Object::as_reference).unwrap();
            let cmap = doc.get_object(cmap_id).and_then(Object::as_stream).unwrap();
            let text = cmap
                .decompressed_content()
                .unwrap_or_else(|_| cmap.content.clone());
            // Cyrillic headings map back to U+04xx.
            assert!(String::from_utf8(text).unwrap().contains("> <04"));
        }
    }

    #[test]
    fn builtin_fallback_writes_winansi_type1() {
        let mut font = PdfFont::Builtin("Helvetica");
        let shown = font.show("Café");
        assert_eq!(
            shown,
            Object::String(vec![b'C', b'a', b'f', 0xE9], StringFormat::Literal)
        );

        let mut doc = Document::with_version("1.5");
        let id = doc.new_object_id();
        font.write(&mut doc, id);
        let dict = doc.get_dictionary(id).unwrap();
        assert_eq!(dict.get(b"Subtype").and_then(Object::as_name).unwrap(), b"Type1");
        assert_eq!(
            dict.get(b"Encoding").and_then(Object::as_name).unwrap(),
            b"WinAnsiEncoding"
        );
    }

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(win_ansi("Amount: 1,000 RUB"), b"Amount: 1,000 RUB".to_vec());
        assert_eq!(
            win_ansi("Café — ok"),
            vec![b'C', b'a', b'f', 0xE9, b' ', 0x97, b' ', b'o', b'k']
        );
        assert_eq!(win_ansi("Риски"), b"?????".to_vec());
    }
}
