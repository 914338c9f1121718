use std::panic::{catch_unwind, AssertUnwindSafe};

use super::ExtractFailure;

/// A document whose text can be pulled out one page at a time
pub trait PagedDocument {
    fn page_count(&self) -> usize;

    /// Text of the page at `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String, String>;
}

/// lopdf-backed PDF
pub struct PdfDocument {
    doc: lopdf::Document,
    /// 1-based page numbers in document order
    pages: Vec<u32>,
}

impl PdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, String> {
        // lopdf can panic on malformed cross-reference tables
        let doc = catch_unwind(AssertUnwindSafe(|| lopdf::Document::load_mem(bytes)))
            .map_err(|_| "PDF parser panicked - file is likely malformed".to_string())?
            .map_err(|e| e.to_string())?;

        let pages = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, pages })
    }
}

impl PagedDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, String> {
        let page_number = self
            .pages
            .get(index)
            .copied()
            .ok_or_else(|| format!("page index {index} out of range"))?;

        self.doc
            .extract_text(&[page_number])
            .map_err(|e| e.to_string())
    }
}

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractFailure> {
    if bytes.is_empty() {
        return Err(ExtractFailure::Empty);
    }

    let doc = PdfDocument::load(bytes).map_err(ExtractFailure::Parse)?;
    collect_pages(&doc)
}

/// Concatenates page texts with newlines. A page that errors (or panics) is
/// logged and skipped; only an empty overall result fails.
pub(crate) fn collect_pages(doc: &dyn PagedDocument) -> Result<String, ExtractFailure> {
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(ExtractFailure::NoPages);
    }

    let mut parts: Vec<String> = Vec::with_capacity(page_count);
    for index in 0..page_count {
        match catch_unwind(AssertUnwindSafe(|| doc.page_text(index))) {
            Ok(Ok(text)) => {
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            Ok(Err(e)) => {
                log::warn!("Failed to extract text from PDF page {index}: {e}");
            }
            Err(_) => {
                log::warn!("PDF page {index} panicked during extraction, skipping");
            }
        }
    }

    let text = parts.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractFailure::NoText);
    }

    log::debug!("PDF extracted: {} of {page_count} pages had text", parts.len());
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory pages; `Err` entries simulate pages the parser chokes on
    struct FakePages(Vec<Result<&'static str, &'static str>>);

    impl PagedDocument for FakePages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, index: usize) -> Result<String, String> {
            self.0[index].map(str::to_string).map_err(str::to_string)
        }
    }

    struct PanickyPage;

    impl PagedDocument for PanickyPage {
        fn page_count(&self) -> usize {
            2
        }

        fn page_text(&self, index: usize) -> Result<String, String> {
            if index == 0 {
                panic!("bad glyph table");
            }
            Ok("survivor".to_string())
        }
    }

    #[test]
    fn test_bad_middle_page_is_skipped() {
        let doc = FakePages(vec![
            Ok("Page one text"),
            Err("unsupported filter"),
            Ok("Page three text"),
        ]);
        assert_eq!(
            collect_pages(&doc).unwrap(),
            "Page one text\nPage three text"
        );
    }

    #[test]
    fn test_blank_pages_are_dropped() {
        let doc = FakePages(vec![Ok("  "), Ok("Only page"), Ok("\n")]);
        assert_eq!(collect_pages(&doc).unwrap(), "Only page");
    }

    #[test]
    fn test_zero_pages_fails() {
        assert_eq!(collect_pages(&FakePages(vec![])), Err(ExtractFailure::NoPages));
    }

    #[test]
    fn test_all_pages_failing_is_no_text() {
        let doc = FakePages(vec![Err("a"), Err("b")]);
        assert_eq!(collect_pages(&doc), Err(ExtractFailure::NoText));
    }

    #[test]
    fn test_panicking_page_is_skipped() {
        assert_eq!(collect_pages(&PanickyPage).unwrap(), "survivor");
    }

    #[test]
    fn test_empty_buffer_fails_before_parsing() {
        assert_eq!(extract(&[]), Err(ExtractFailure::Empty));
    }

    #[test]
    fn test_garbage_is_not_a_pdf() {
        assert!(extract(b"hello world").is_err());
    }
}
