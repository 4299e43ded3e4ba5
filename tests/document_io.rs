//! Document engine seam exercised against real files on disk.

use std::io::Write;

use pdfview::document::Pdf;
use pdfview::test_utils::blank_pdf;
use tempfile::NamedTempFile;

fn pdf_file(pages: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("create temp pdf");
    file.write_all(&blank_pdf(pages)).expect("write temp pdf");
    file.flush().expect("flush temp pdf");
    file
}

#[test]
fn open_reports_page_count_and_aspect() {
    let file = pdf_file(7);
    let doc = Pdf::open(file.path()).expect("open");

    assert_eq!(doc.page_count(), 7);
    // US Letter: 612 x 792 points.
    assert!((doc.aspect_ratio() - 612.0 / 792.0).abs() < 1e-4);
}

#[test]
fn page_extent_matches_media_box() {
    let file = pdf_file(2);
    let doc = Pdf::open(file.path()).expect("open");

    let (width, height) = doc.page_extent(1).expect("extent");
    assert!((width - 612.0).abs() < 1e-3);
    assert!((height - 792.0).abs() < 1e-3);
}

#[test]
fn render_hits_the_exact_target_size() {
    let file = pdf_file(1);
    let doc = Pdf::open(file.path()).expect("open");

    // A quarter of the intrinsic size, chosen so the scale is exact.
    let image = doc.render(0, 153, 198).expect("render");

    assert_eq!(image.width, 153);
    assert_eq!(image.height, 198);
    assert_eq!(image.pixels.len(), 153 * 198 * 3);
}

#[test]
fn reopening_the_same_path_round_trips() {
    let file = pdf_file(5);

    let first = Pdf::open(file.path()).expect("first open");
    let page_count = first.page_count();
    let aspect = first.aspect_ratio();
    drop(first);

    let second = Pdf::open(file.path()).expect("second open");
    assert_eq!(second.page_count(), page_count);
    assert_eq!(second.aspect_ratio(), aspect);
}

#[test]
fn zero_page_document_is_an_open_failure() {
    let file = pdf_file(0);
    assert!(Pdf::open(file.path()).is_err());
}

#[test]
fn garbage_input_fails_without_panicking() {
    let mut file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("create temp file");
    file.write_all(b"not a pdf at all").expect("write");
    file.flush().expect("flush");

    assert!(Pdf::open(file.path()).is_err());
}
