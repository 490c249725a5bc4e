use super::OutputWriter;
use super::helvetica::{self, char_width};
use crate::config::Output;
use crate::error::{Error, Result};
use crate::util::ensure_dir;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;

/// One Helvetica text page per input page, wrapped to the margins,
/// spilling onto extra pages when a page fills up.
pub struct PdfWriter {
    filename: String,
    font_size: i64,
    margin: i64,
    line_height: i64,
}

impl PdfWriter {
    pub fn new(cfg: &Output) -> Self {
        Self {
            filename: cfg.pdf_filename.clone(),
            font_size: i64::from(cfg.font_size.max(1)),
            margin: i64::from(cfg.margin_pt.min(200)),
            line_height: i64::from(cfg.line_height_pt.max(1)),
        }
    }

    /// Usable line width in thousandths of the font size.
    pub fn max_line_width(&self) -> u32 {
        let usable = PAGE_WIDTH - 2 * self.margin;
        u32::try_from(usable * 1000 / self.font_size).unwrap_or(u32::MAX).max(1)
    }

    fn lines_per_page(&self) -> usize {
        let usable = PAGE_HEIGHT - 2 * self.margin - self.font_size;
        (usable / self.line_height + 1).max(1) as usize
    }

    /// Lays out one input text as one or more sheets of wrapped lines.
    pub fn layout(&self, text: &str) -> Vec<Vec<String>> {
        let width = self.max_line_width();
        let per_page = self.lines_per_page();

        let lines: Vec<String> = text
            .split('\n')
            .flat_map(|l| wrap_line(l.trim_end_matches('\r'), width))
            .collect();

        let mut sheets: Vec<Vec<String>> = lines.chunks(per_page).map(<[String]>::to_vec).collect();
        if sheets.is_empty() {
            sheets.push(Vec::new());
        }
        sheets
    }

    fn build(&self, pages: &[String]) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]));

        let mut kids = Vec::new();
        for (i, text) in pages.iter().enumerate() {
            let sheets = self.layout(text);
            debug!("page {}: {} sheet(s)", i + 1, sheets.len());
            for sheet in sheets {
                let page_id = self.add_sheet(&mut doc, pages_id, resources_id, &sheet)?;
                kids.push(Object::Reference(page_id));
            }
        }

        let count = kids.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(count)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        Ok(doc)
    }

    fn add_sheet(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        resources_id: ObjectId,
        lines: &[String],
    ) -> Result<ObjectId> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(self.font_size)],
            ),
            Operation::new("TL", vec![Object::Integer(self.line_height)]),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(self.margin),
                    Object::Integer(PAGE_HEIGHT - self.margin - self.font_size),
                ],
            ),
        ];
        for line in lines {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(helvetica::encode(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|e| Error::Output {
                path: self.filename.clone(),
                reason: format!("encoding content stream: {e}"),
            })?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH),
                    Object::Integer(PAGE_HEIGHT),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        Ok(doc.add_object(page))
    }
}

impl OutputWriter for PdfWriter {
    fn write(&self, pages: &[String], out_dir: &Path) -> Result<PathBuf> {
        ensure_dir(out_dir).map_err(|e| Error::output(out_dir, format!("{e:#}")))?;
        let path = out_dir.join(&self.filename);
        let mut doc = self.build(pages)?;
        doc.save(&path).map_err(|e| Error::output(&path, e))?;
        info!("wrote {} pages to {}", pages.len(), path.display());
        Ok(path)
    }
}

/// Greedy word wrap to `max_width` (thousandths of the font size, Helvetica
/// metrics). Words wider than a line are split between glyphs.
pub fn wrap_line(line: &str, max_width: u32) -> Vec<String> {
    let max_width = max_width.max(1);
    let space = char_width(' ');
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0u32;

    for word in line.split_whitespace() {
        let mut word = word.to_string();
        let mut word_width = helvetica::text_width(&word);

        if word_width > max_width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let mut piece = String::new();
            let mut piece_width = 0u32;
            for c in word.chars() {
                let w = char_width(c);
                if !piece.is_empty() && piece_width + w > max_width {
                    out.push(std::mem::take(&mut piece));
                    piece_width = 0;
                }
                piece.push(c);
                piece_width += w;
            }
            word = piece;
            word_width = piece_width;
        }

        if !current.is_empty() && current_width + space + word_width > max_width {
            out.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(&word);
        current_width += word_width;
    }

    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}
