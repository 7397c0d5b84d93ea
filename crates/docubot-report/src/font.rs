//! TrueType faces embedded into PDF reports as Type0 fonts.
//!
//! Faces come from the fonts bundled with `typst-assets`. Text is written
//! as two-byte glyph ids under `Identity-H`, with a ToUnicode map so the
//! text stays searchable and copyable.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};
use ttf_parser::{Face, GlyphId, name_id};

use crate::ReportError;

static FACES: OnceLock<Option<FacePair>> = OnceLock::new();

/// Font files for the regular and bold text faces.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FacePair {
    pub regular: &'static [u8],
    pub bold: &'static [u8],
}

/// The bundled regular and bold faces, or `None` when no bundled face covers
/// Cyrillic.
pub(crate) fn embedded_faces() -> Option<FacePair> {
    *FACES.get_or_init(load_faces)
}

fn load_faces() -> Option<FacePair> {
    let mut regular = None;
    let mut bold = None;
    for data in typst_assets::fonts() {
        // Collections cannot be embedded as a single FontFile2.
        if ttf_parser::fonts_in_collection(data).is_some() {
            continue;
        }
        let Ok(face) = Face::parse(data, 0) else {
            continue;
        };
        if !usable(&face) {
            continue;
        }
        let slot = if face.is_bold() { &mut bold } else { &mut regular };
        slot.get_or_insert(data);
    }

    let Some(regular) = regular else {
        warn!("no bundled font covers Cyrillic; PDF text is limited to Latin-1");
        return None;
    };
    debug!(bold = bold.is_some(), "embedded PDF faces loaded");
    Some(FacePair {
        regular,
        bold: bold.unwrap_or(regular),
    })
}

fn usable(face: &Face<'_>) -> bool {
    face.tables().glyf.is_some()
        && !face.is_italic()
        && !face.is_oblique()
        && face.glyph_index('Ж').is_some()
}

/// One embedded face, collecting the glyphs the page content uses.
pub(crate) struct EmbeddedFont {
    data: &'static [u8],
    face: Face<'static>,
    used: BTreeMap<u16, char>,
}

impl EmbeddedFont {
    pub(crate) fn new(data: &'static [u8]) -> Result<Self, ReportError> {
        Ok(Self {
            data,
            face: Face::parse(data, 0)?,
            used: BTreeMap::new(),
        })
    }

    /// Glyph ids for `text`, big-endian, two bytes each. Characters the
    /// face lacks become glyph 0.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let gid = match self.face.glyph_index(c) {
                Some(GlyphId(gid)) => {
                    self.used.entry(gid).or_insert(c);
                    gid
                }
                None => 0,
            };
            out.extend_from_slice(&gid.to_be_bytes());
        }
        out
    }

    /// Write the Type0 font dictionary under `id`, with its descendant
    /// font, descriptor, font file and ToUnicode map.
    pub(crate) fn write(&self, doc: &mut Document, id: ObjectId) {
        let face = &self.face;
        let name = postscript_name(face);

        let file = doc.add_object(
            Stream::new(
                Dictionary::from_iter(vec![("Length1", Object::Integer(self.data.len() as i64))]),
                self.data.to_vec(),
            )
            .with_compression(false),
        );

        let bbox = face.global_bounding_box();
        let mut flags = 32;
        if face.is_monospaced() {
            flags |= 1;
        }
        let descriptor = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", Object::Name(name.clone())),
            ("Flags", Object::Integer(flags)),
            (
                "FontBBox",
                Object::Array(
                    [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max]
                        .into_iter()
                        .map(|v| Object::Integer(self.scale(v)))
                        .collect(),
                ),
            ),
            ("ItalicAngle", Object::Integer(0)),
            ("Ascent", Object::Integer(self.scale(face.ascender()))),
            ("Descent", Object::Integer(self.scale(face.descender()))),
            (
                "CapHeight",
                Object::Integer(self.scale(face.capital_height().unwrap_or(face.ascender()))),
            ),
            ("StemV", Object::Integer(if face.is_bold() { 120 } else { 80 })),
            ("FontFile2", Object::Reference(file)),
        ]));

        let widths = self
            .used
            .keys()
            .flat_map(|&gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
                [
                    Object::Integer(gid.into()),
                    Object::Array(vec![Object::Integer(self.scale(advance))]),
                ]
            })
            .collect();
        let cid_font = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", Object::Name(name.clone())),
            (
                "CIDSystemInfo",
                Object::Dictionary(Dictionary::from_iter(vec![
                    ("Registry", Object::String(b"Adobe".to_vec(), StringFormat::Literal)),
                    ("Ordering", Object::String(b"Identity".to_vec(), StringFormat::Literal)),
                    ("Supplement", Object::Integer(0)),
                ])),
            ),
            ("FontDescriptor", Object::Reference(descriptor)),
            ("W", Object::Array(widths)),
            ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
        ]));

        let to_unicode = doc.add_object(Stream::new(Dictionary::new(), self.to_unicode()));
        let font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", Object::Name(name)),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            ("DescendantFonts", Object::Array(vec![Object::Reference(cid_font)])),
            ("ToUnicode", Object::Reference(to_unicode)),
        ]);
        doc.objects.insert(id, Object::Dictionary(font));
    }

    /// Font units to PDF glyph space (1000 per em).
    fn scale(&self, units: impl Into<i32>) -> i64 {
        let per_em = f32::from(self.face.units_per_em().max(1));
        (units.into() as f32 * 1000.0 / per_em).round() as i64
    }

    fn to_unicode(&self) -> Vec<u8> {
        let mut cmap = String::from(CMAP_HEADER);
        let entries: Vec<(&u16, &char)> = self.used.iter().collect();
        // bfchar blocks hold at most 100 entries.
        for block in entries.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", block.len()));
            for (gid, c) in block {
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str(CMAP_FOOTER);
        cmap.into_bytes()
    }
}

const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
";

const CMAP_FOOTER: &str = "endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

fn postscript_name(face: &Face<'_>) -> Vec<u8> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|n| n.to_string())
        .map(|s| {
            s.bytes()
                .filter(|b| b.is_ascii_graphic() && !b"[](){}<>/%#".contains(b))
                .collect::<Vec<u8>>()
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| b"DocubotMono".to_vec())
}
