use super::{DocumentEngine, DrawText, EngineError, FontFace, PageDraw, PageSize, SourceDocument};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

const US_LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};
const MAX_PARENT_DEPTH: usize = 10;
const REGULAR_FONT_KEY: &str = "F1";
const BOLD_FONT_KEY: &str = "F2";

/// Document engine over PDF files, backed by lopdf.
///
/// Built documents use the standard Helvetica and Helvetica-Bold faces with
/// WinAnsi encoding; characters WinAnsi cannot represent are written as `?`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfEngine;

struct PdfSource {
    document: Document,
    page_numbers: Vec<u32>,
    page_sizes: Vec<PageSize>,
}

impl SourceDocument for PdfSource {
    fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    fn full_text(&self) -> Result<String, EngineError> {
        self.document
            .extract_text(&self.page_numbers)
            .map_err(|err| EngineError::Text(err.to_string()))
    }

    fn page_text(&self, index: usize) -> Result<String, EngineError> {
        let number = self
            .page_numbers
            .get(index)
            .ok_or(EngineError::PageOutOfRange(index))?;
        self.document
            .extract_text(&[*number])
            .map_err(|err| EngineError::Text(format!("page {number}: {err}")))
    }
}

impl DocumentEngine for PdfEngine {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn SourceDocument>, EngineError> {
        let document =
            Document::load_mem(bytes).map_err(|err| EngineError::Load(err.to_string()))?;
        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(EngineError::NoPages);
        }

        let mut page_numbers = Vec::with_capacity(pages.len());
        let mut page_sizes = Vec::with_capacity(pages.len());
        for (number, page_id) in pages {
            page_numbers.push(number);
            page_sizes.push(page_size(&document, page_id));
        }
        debug!(pages = page_numbers.len(), "loaded pdf source");

        Ok(Box::new(PdfSource {
            document,
            page_numbers,
            page_sizes,
        }))
    }

    fn build(&self, pages: &[PageDraw]) -> Result<Vec<u8>, EngineError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font_dictionary("Helvetica"));
        let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT_KEY => regular_id,
                BOLD_FONT_KEY => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let PageSize { width, height } = page.size;
            if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
                return Err(EngineError::Build(format!(
                    "page {} has unsupported size {width}x{height}",
                    index + 1
                )));
            }

            let content: Content<Vec<Operation>> = Content {
                operations: page.commands.iter().flat_map(text_operations).collect(),
            };
            let encoded = content
                .encode()
                .map_err(|err| EngineError::Build(format!("page {}: {err}", index + 1)))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), (width as f32).into(), (height as f32).into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|err| EngineError::Build(err.to_string()))?;
        debug!(pages = pages.len(), bytes = out.len(), "built pdf");
        Ok(out)
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn text_operations(command: &DrawText) -> Vec<Operation> {
    let font_key = match command.face {
        FontFace::Regular => REGULAR_FONT_KEY,
        FontFace::Bold => BOLD_FONT_KEY,
    };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font_key.into(), (command.size as f32).into()]),
        Operation::new(
            "rg",
            vec![
                (command.color.r as f32).into(),
                (command.color.g as f32).into(),
                (command.color.b as f32).into(),
            ],
        ),
        Operation::new("Td", vec![(command.x as f32).into(), (command.y as f32).into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(&command.text))]),
        Operation::new("ET", vec![]),
    ]
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => win_ansi_extra(ch).unwrap_or(b'?'),
        })
        .collect()
}

// WinAnsi codes 0x80..=0x9F; 0x81, 0x8D, 0x8F, 0x90 and 0x9D are unassigned.
fn win_ansi_extra(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

fn page_size(document: &Document, page_id: ObjectId) -> PageSize {
    document
        .get_object(page_id)
        .ok()
        .and_then(|page| media_box(document, page, MAX_PARENT_DEPTH))
        .unwrap_or(US_LETTER)
}

// MediaBox is inheritable, so walk up the page tree until one is found.
fn media_box(document: &Document, node: &Object, depth: usize) -> Option<PageSize> {
    if depth == 0 {
        return None;
    }
    let dict = node.as_dict().ok()?;

    if let Ok(value) = dict.get(b"MediaBox") {
        let resolved = match value {
            Object::Reference(id) => document.get_object(*id).ok(),
            other => Some(other),
        };
        if let Some(size) = resolved.and_then(size_from_box) {
            return Some(size);
        }
    }

    let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    let parent = document.get_object(parent_id).ok()?;
    media_box(document, parent, depth - 1)
}

fn size_from_box(value: &Object) -> Option<PageSize> {
    let values = value.as_array().ok()?;
    let coords: Vec<f64> = values
        .iter()
        .filter_map(|item| item.as_float().ok())
        .map(f64::from)
        .collect();
    if coords.len() != 4 {
        return None;
    }
    Some(PageSize {
        width: (coords[2] - coords[0]).abs(),
        height: (coords[3] - coords[1]).abs(),
    })
}
