use lopdf::{Document as LopdfDocument, Object};

/// Concatenated, decoded content streams of page `page_number` (1-based).
pub fn page_content(doc: &LopdfDocument, page_number: u32) -> String {
    let pages = doc.get_pages();
    let Some(page_id) = pages.get(&page_number) else {
        return String::new();
    };
    doc.get_page_content(*page_id)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Number of color image XObjects in the document (soft masks excluded).
pub fn color_image_count(doc: &LopdfDocument) -> usize {
    doc.objects
        .values()
        .filter(|object| match object {
            Object::Stream(stream) => {
                stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
                    && stream.dict.get(b"ColorSpace").and_then(Object::as_name).ok()
                        == Some(b"DeviceRGB".as_slice())
            }
            _ => false,
        })
        .count()
}

/// `Do` operators on a page, in content order.
pub fn image_draws(content: &str) -> usize {
    content.lines().filter(|line| line.trim_end().ends_with(" Do")).count()
}

#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $expected:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $expected,
            "Expected {} pages, found {}",
            $expected,
            $pdf.page_count()
        );
    };
}

#[macro_export]
macro_rules! assert_page_contains {
    ($pdf:expr, $page:expr, $needle:expr) => {
        let content = $crate::common::pdf_assertions::page_content(&$pdf.doc, $page);
        assert!(
            content.contains($needle),
            "Expected page {} to contain {:?}, content was:\n{}",
            $page,
            $needle,
            content
        );
    };
}
