//! PDF rendering of the comparison table.
//!
//! Builds a plain A4 document with the standard Helvetica fonts: a title,
//! the compared sources, the four-column table with a shaded header row and
//! a summary line. Long tables continue on new pages with the header
//! repeated.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, ObjectId, Stream, StringFormat};

use crate::error::{OrderCheckError, Result};

use super::COLUMNS;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const ROW_HEIGHT: i64 = 20;
const COLUMN_WIDTHS: [i64; 4] = [120, 130, 130, 80];
const FONT_SIZE: i64 = 11;
const TITLE_SIZE: i64 = 14;

/// Text lines and table rows to lay out.
pub(super) struct PdfTable<'a> {
    pub title: &'a str,
    pub subtitle: Option<String>,
    pub rows: Vec<[String; 4]>,
    pub summary: String,
}

/// Encode text for the WinAnsi standard fonts; characters outside Latin-1
/// become `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn int(value: i64) -> Object {
    Object::Integer(value)
}

/// Operations of one page under construction.
struct PageOps {
    ops: Vec<Operation>,
    y: i64,
}

impl PageOps {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn text(&mut self, font: &str, size: i64, x: i64, y: i64, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), int(size)]));
        self.ops.push(Operation::new("Td", vec![int(x), int(y)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(latin1(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn line(&mut self, font: &str, size: i64, text: &str) {
        self.y -= size + 6;
        let y = self.y;
        self.text(font, size, MARGIN, y, text);
    }

    fn fits_row(&self) -> bool {
        self.y - ROW_HEIGHT >= MARGIN
    }

    fn row(&mut self, cells: &[String], header: bool) {
        self.y -= ROW_HEIGHT;
        let y = self.y;
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            if header {
                self.ops.push(Operation::new("g", vec![Object::Real(0.9)]));
                self.ops
                    .push(Operation::new("re", vec![int(x), int(y), int(width), int(ROW_HEIGHT)]));
                self.ops.push(Operation::new("f", vec![]));
                self.ops.push(Operation::new("g", vec![int(0)]));
            }
            self.ops
                .push(Operation::new("re", vec![int(x), int(y), int(width), int(ROW_HEIGHT)]));
            self.ops.push(Operation::new("S", vec![]));

            let font = if header { "F2" } else { "F1" };
            self.text(font, FONT_SIZE, x + 4, y + 6, cell);
            x += width;
        }
    }
}

impl PdfTable<'_> {
    fn pages(&self) -> Vec<PageOps> {
        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut pages = Vec::new();

        let mut page = PageOps::new();
        page.line("F2", TITLE_SIZE, self.title);
        if let Some(subtitle) = &self.subtitle {
            page.line("F1", FONT_SIZE, subtitle);
        }
        page.y -= 10;
        page.row(&header, true);

        for cells in &self.rows {
            if !page.fits_row() {
                pages.push(page);
                page = PageOps::new();
                page.row(&header, true);
            }
            page.row(cells, false);
        }

        page.y -= 10;
        if page.y - FONT_SIZE - 6 < MARGIN {
            pages.push(page);
            page = PageOps::new();
        }
        page.line("F1", FONT_SIZE, &self.summary);
        pages.push(page);
        pages
    }

    /// Serialize the table into PDF bytes.
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in self.pages() {
            let content = Content { operations: page.ops };
            let encoded = content
                .encode()
                .map_err(|e| OrderCheckError::Report(format!("cannot encode PDF page: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
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
                "Resources" => resources_id,
                "MediaBox" => vec![int(0), int(0), int(PAGE_WIDTH), int(PAGE_HEIGHT)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| OrderCheckError::Report(format!("cannot write PDF: {e}")))?;
        Ok(bytes)
    }
}
