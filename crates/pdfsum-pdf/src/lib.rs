use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

use pdfsum_core::{BackendError, PdfBackend};

mod cmap;
mod font;

use font::FontDecoder;

/// Kerning offset in a `TJ` array (thousandths of text space) at or beyond
/// which a word break is assumed.
const TJ_SPACE_THRESHOLD: f32 = -250.0;

/// Nesting limit for form XObjects drawn from inside other forms.
const MAX_FORM_DEPTH: usize = 16;

/// One element of a page's text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextItem {
    /// A string shown by a text-showing operator.
    Text(String),
    /// End of a line on which text was shown. Reported as an empty string.
    EndOfLine,
    /// Marked-content boundary; carries no string.
    MarkedContent,
}

impl TextItem {
    /// The item's string, or `None` for items that carry no text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TextItem::Text(s) => Some(s),
            TextItem::EndOfLine => Some(""),
            TextItem::MarkedContent => None,
        }
    }
}

/// Text content of a single page, in content-stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub items: Vec<TextItem>,
}

impl PageText {
    /// Whether any text-showing operator ran on this page.
    pub fn has_text(&self) -> bool {
        self.items.iter().any(|i| matches!(i, TextItem::Text(_)))
    }

    /// Strings of all text-carrying items joined with single spaces.
    pub fn joined(&self) -> String {
        self.items
            .iter()
            .filter_map(TextItem::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// lopdf-based implementation of [`PdfBackend`].
///
/// Pure Rust, so documents are parsed in memory without native libraries.
/// Shown strings are decoded through the current font: its `/ToUnicode`
/// CMap when present, otherwise its simple-font `/Encoding` (WinAnsi,
/// MacRoman, Standard and so on) via lopdf's encoding tables. Composite
/// `Identity-H`/`Identity-V` fonts without a `/ToUnicode` CMap fall back to
/// reading two-byte codes as UTF-16BE. Text inside form XObjects is
/// included where the form is drawn.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }

    /// Load `bytes` and return the text items of every page in page order.
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, BackendError> {
        let document =
            Document::load_mem(bytes).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let pages = document.get_pages();
        tracing::debug!(pages = pages.len(), bytes = bytes.len(), "loaded PDF");

        let mut out = Vec::with_capacity(pages.len());
        for (page_number, page_id) in pages {
            let page = document_page_items(&document, page_id).map_err(|e| {
                BackendError::ExtractionError(format!("page {page_number}: {e}"))
            })?;
            out.push(page);
        }
        Ok(out)
    }
}

impl PdfBackend for LopdfBackend {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        let pages = self.extract_pages(bytes)?;
        Ok(join_pages(&pages))
    }
}

/// Concatenate pages: each page's joined text followed by `\n`.
///
/// Returns an empty string when no page has any text.
pub fn join_pages(pages: &[PageText]) -> String {
    if !pages.iter().any(PageText::has_text) {
        return String::new();
    }
    let mut out = String::new();
    for page in pages {
        out.push_str(&page.joined());
        out.push('\n');
    }
    out
}

/// Decode a bare content stream into text items.
///
/// No resources are available, so every string is decoded with the default
/// font decoder and `Do` draws nothing.
pub fn page_items(content: &[u8]) -> Result<PageText, lopdf::Error> {
    let mut collector = TextCollector::new(None);
    collector.walk(content, &[])?;
    Ok(collector.finish())
}

/// Text items of one page of `document`, with fonts and form XObjects
/// resolved through the page's resources.
pub fn document_page_items(
    document: &Document,
    page_id: ObjectId,
) -> Result<PageText, lopdf::Error> {
    let content = document.get_page_content(page_id)?;
    let resources = page_resources(document, page_id);
    let mut collector = TextCollector::new(Some(document));
    collector.walk(&content, &resources)?;
    Ok(collector.finish())
}

/// The page's own resource dictionary followed by inherited ones.
fn page_resources(document: &Document, page_id: ObjectId) -> Vec<&Dictionary> {
    let (inline, ids) = document.get_page_resources(page_id);
    inline
        .into_iter()
        .chain(ids.into_iter().filter_map(|id| document.get_dictionary(id).ok()))
        .collect()
}

/// Look `name` up in the `category` sub-dictionary (`/Font`, `/XObject`) of
/// the first resource dictionary that has it.
fn lookup_resource<'a>(
    document: &'a Document,
    resources: &[&'a Dictionary],
    category: &[u8],
    name: &[u8],
) -> Option<(Option<ObjectId>, &'a Object)> {
    resources.iter().copied().find_map(|res| {
        let (_, group) = document.dereference(res.get(category).ok()?).ok()?;
        let entry = group.as_dict().ok()?.get(name).ok()?;
        document.dereference(entry).ok()
    })
}

struct TextCollector<'a> {
    document: Option<&'a Document>,
    items: Vec<TextItem>,
    line_has_text: bool,
    font: Rc<FontDecoder>,
    /// Fonts saved by `q`, restored by `Q`.
    saved_fonts: Vec<Rc<FontDecoder>>,
    font_cache: HashMap<ObjectId, Rc<FontDecoder>>,
    /// Forms currently being walked, innermost last.
    open_forms: Vec<ObjectId>,
}

impl<'a> TextCollector<'a> {
    fn new(document: Option<&'a Document>) -> Self {
        Self {
            document,
            items: Vec::new(),
            line_has_text: false,
            font: Rc::new(FontDecoder::default()),
            saved_fonts: Vec::new(),
            font_cache: HashMap::new(),
            open_forms: Vec::new(),
        }
    }

    fn finish(self) -> PageText {
        PageText { items: self.items }
    }

    fn walk(&mut self, content: &[u8], resources: &[&'a Dictionary]) -> Result<(), lopdf::Error> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let content = Content::decode(content)?;

        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.font = self.resolve_font(resources, name);
                    }
                }
                "q" => self.saved_fonts.push(self.font.clone()),
                "Q" => {
                    if let Some(font) = self.saved_fonts.pop() {
                        self.font = font;
                    }
                }
                "Tj" => {
                    let text = op.operands.first().and_then(|o| self.font.decode_object(o));
                    if let Some(text) = text {
                        self.show(text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        let text = decode_tj_array(&self.font, parts);
                        self.show(text);
                    }
                }
                "'" => {
                    self.end_line();
                    let text = op.operands.first().and_then(|o| self.font.decode_object(o));
                    if let Some(text) = text {
                        self.show(text);
                    }
                }
                "\"" => {
                    self.end_line();
                    let text = op.operands.get(2).and_then(|o| self.font.decode_object(o));
                    if let Some(text) = text {
                        self.show(text);
                    }
                }
                "Td" | "TD" => {
                    if moves_vertically(op) {
                        self.end_line();
                    }
                }
                "T*" | "Tm" | "ET" => self.end_line(),
                "BMC" | "BDC" | "EMC" => self.items.push(TextItem::MarkedContent),
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.walk_form(resources, name);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn resolve_font(&mut self, resources: &[&'a Dictionary], name: &[u8]) -> Rc<FontDecoder> {
        let found = self
            .document
            .and_then(|doc| Some((doc, lookup_resource(doc, resources, b"Font", name)?)));
        let Some((doc, (id, object))) = found else {
            tracing::debug!(font = %String::from_utf8_lossy(name), "font not in resources");
            return Rc::new(FontDecoder::default());
        };
        if let Some(cached) = id.and_then(|id| self.font_cache.get(&id)) {
            return cached.clone();
        }
        let decoder = match object.as_dict() {
            Ok(font) => Rc::new(FontDecoder::from_font(doc, font)),
            Err(_) => Rc::new(FontDecoder::default()),
        };
        if let Some(id) = id {
            self.font_cache.insert(id, decoder.clone());
        }
        decoder
    }

    /// Walk the content of the form XObject `name`, if it is one. Images and
    /// unknown names draw no text.
    fn walk_form(&mut self, resources: &[&'a Dictionary], name: &[u8]) {
        let Some(doc) = self.document else {
            return;
        };
        let Some((Some(id), object)) = lookup_resource(doc, resources, b"XObject", name) else {
            return;
        };
        let Ok(stream) = object.as_stream() else {
            return;
        };
        if stream.dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Form".as_slice()) {
            return;
        }
        if self.open_forms.contains(&id) || self.open_forms.len() >= MAX_FORM_DEPTH {
            tracing::warn!(?id, depth = self.open_forms.len(), "skipping recursive form XObject");
            return;
        }

        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let mut scope = Vec::with_capacity(resources.len() + 1);
        if let Ok((_, own)) = stream
            .dict
            .get(b"Resources")
            .and_then(|o| doc.dereference(o))
            && let Ok(own) = own.as_dict()
        {
            scope.push(own);
        }
        scope.extend_from_slice(resources);

        // A form runs inside an implicit q/Q pair
        let font = self.font.clone();
        let saved_depth = self.saved_fonts.len();
        self.open_forms.push(id);
        if let Err(e) = self.walk(&content, &scope) {
            tracing::warn!(?id, error = %e, "cannot decode form XObject content");
        }
        self.open_forms.pop();
        self.saved_fonts.truncate(saved_depth);
        self.font = font;
    }

    fn show(&mut self, text: String) {
        self.items.push(TextItem::Text(text));
        self.line_has_text = true;
    }

    fn end_line(&mut self) {
        if self.line_has_text {
            self.items.push(TextItem::EndOfLine);
            self.line_has_text = false;
        }
    }
}

fn moves_vertically(op: &Operation) -> bool {
    op.operands
        .get(1)
        .and_then(|o| o.as_float().ok())
        .map(|ty| ty != 0.0)
        .unwrap_or(false)
}

fn decode_tj_array(font: &FontDecoder, parts: &[Object]) -> String {
    let mut out = String::new();
    for part in parts {
        if let Some(text) = font.decode_object(part) {
            out.push_str(&text);
        } else if let Ok(offset) = part.as_float()
            && offset <= TJ_SPACE_THRESHOLD
            && !out.ends_with(' ')
        {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &PageText) -> Vec<Option<&str>> {
        page.items.iter().map(TextItem::as_str).collect()
    }

    #[test]
    fn single_line_ends_with_empty_item() {
        let page = page_items(b"BT /F1 24 Tf 100 700 Td (Hello) Tj ET").unwrap();
        assert_eq!(texts(&page), vec![Some("Hello"), Some("")]);
        assert_eq!(page.joined(), "Hello ");
    }

    #[test]
    fn line_moves_split_lines() {
        let page = page_items(b"BT 72 720 Td (One) Tj 0 -14 Td (Two) Tj T* (Three) Tj ET").unwrap();
        assert_eq!(
            page.items,
            vec![
                TextItem::Text("One".into()),
                TextItem::EndOfLine,
                TextItem::Text("Two".into()),
                TextItem::EndOfLine,
                TextItem::Text("Three".into()),
                TextItem::EndOfLine,
            ]
        );
    }

    #[test]
    fn horizontal_move_keeps_line() {
        let page = page_items(b"BT (Left) Tj 50 0 Td (Right) Tj ET").unwrap();
        assert_eq!(texts(&page), vec![Some("Left"), Some("Right"), Some("")]);
    }

    #[test]
    fn tj_array_inserts_space_on_large_gap() {
        let page = page_items(b"BT [(Hel) -20 (lo) -400 (World)] TJ ET").unwrap();
        assert_eq!(page.items[0], TextItem::Text("Hello World".into()));
    }

    #[test]
    fn marked_content_is_filtered_from_join() {
        let page =
            page_items(b"/Span <</MCID 0>> BDC BT (A) Tj ET EMC").unwrap();
        assert_eq!(page.items.first(), Some(&TextItem::MarkedContent));
        assert_eq!(page.items.last(), Some(&TextItem::MarkedContent));
        assert_eq!(page.joined(), "A ");
    }

    #[test]
    fn quote_operators_move_to_next_line() {
        let page = page_items(b"BT (First) Tj (Second) ' 1 2 (Third) \" ET").unwrap();
        assert_eq!(
            texts(&page),
            vec![
                Some("First"),
                Some(""),
                Some("Second"),
                Some(""),
                Some("Third"),
                Some("")
            ]
        );
    }

    #[test]
    fn empty_content_has_no_items() {
        assert!(page_items(b"").unwrap().items.is_empty());
        assert!(page_items(b"  \n").unwrap().items.is_empty());
        let graphics_only = page_items(b"0 0 m 100 100 l S").unwrap();
        assert!(!graphics_only.has_text());
    }

    #[test]
    fn utf16_strings_are_decoded() {
        let page = page_items(b"BT <FEFF004800E9> Tj ET").unwrap();
        assert_eq!(page.items[0], TextItem::Text("Hé".into()));
    }

    #[test]
    fn unresolved_font_still_shows_text() {
        // Fonts cannot resolve without resources; text still comes through
        let page = page_items(b"q BT /F9 10 Tf (Kept) Tj ET Q BT (After) Tj ET").unwrap();
        assert_eq!(page.joined(), "Kept  After ");
    }

    #[test]
    fn do_without_document_draws_nothing() {
        let page = page_items(b"/Fm0 Do").unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn join_pages_without_text_is_empty() {
        let pages = vec![PageText::default(), PageText {
            items: vec![TextItem::MarkedContent],
        }];
        assert_eq!(join_pages(&pages), "");
    }

    #[test]
    fn join_pages_keeps_blank_pages_as_segments() {
        let pages = vec![
            PageText {
                items: vec![TextItem::Text("A".into()), TextItem::EndOfLine],
            },
            PageText::default(),
        ];
        assert_eq!(join_pages(&pages), "A \n\n");
    }

    #[test]
    fn non_pdf_bytes_fail_to_open() {
        let err = LopdfBackend::new()
            .extract_text(b"just some notes, not a PDF")
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }
}
