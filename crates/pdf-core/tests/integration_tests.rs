//! Integration tests for pdf-core
//!
//! These tests write real documents and read them back with lopdf.

use pdf_core::{Align, Color, DocumentInfo, PageSize, PdfDocument, PdfError, StandardFont};
use std::io::Cursor;

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&page]).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_text_round_trip() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let page = doc.add_page();
    doc.set_font(StandardFont::HelveticaBold, 14.0);
    doc.insert_text("P9 Report", page, 72.0, 100.0, Align::Left)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let content = page_content(&bytes, 1);

    assert!(content.contains("/F2 14 Tf"));
    assert!(content.contains("(P9 Report) Tj"));
    // 841.89 - 100 = 741.89
    assert!(content.contains("72.00 741.89 Td"));
}

#[test]
fn test_font_resources_are_registered_per_page() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let first = doc.add_page();
    let second = doc.add_page();
    doc.set_font(StandardFont::Helvetica, 10.0);
    doc.insert_text("one", first, 10.0, 10.0, Align::Left).unwrap();
    doc.set_font(StandardFont::HelveticaOblique, 10.0);
    doc.insert_text("two", second, 10.0, 10.0, Align::Left).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(loaded.get_pages().len(), 2);

    let page_two = loaded.get_pages()[&2];
    let page_dict = loaded.get_dictionary(page_two).unwrap();
    let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert_eq!(fonts.len(), 1);
    assert!(fonts.has(b"F3"));
}

#[test]
fn test_right_alignment_offsets_by_width() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let page = doc.add_page();
    doc.set_font(StandardFont::Helvetica, 10.0);
    // "00" is 2 * 5.56 = 11.12pt wide
    doc.insert_text("00", page, 100.0, 50.0, Align::Right).unwrap();

    let bytes = doc.to_bytes().unwrap();
    assert!(page_content(&bytes, 1).contains("88.88 791.89 Td"));
}

#[test]
fn test_rectangles_and_lines() {
    let mut doc = PdfDocument::new(PageSize::Custom(200.0, 100.0));
    let page = doc.add_page();
    doc.fill_rect(page, 10.0, 10.0, 50.0, 20.0, Color::from_rgb(240, 240, 240))
        .unwrap();
    doc.stroke_rect(page, 10.0, 10.0, 50.0, 20.0, Color::black(), 0.5)
        .unwrap();
    doc.draw_line(page, 0.0, 50.0, 200.0, 50.0, Color::gray(), 1.0)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let content = page_content(&bytes, 1);
    assert!(content.contains("10.00 70.00 50.00 20.00 re\nf"));
    assert!(content.contains("10.00 70.00 50.00 20.00 re\nS"));
    assert!(content.contains("0.00 50.00 m\n200.00 50.00 l"));
}

#[test]
fn test_image_embedding_is_deduplicated() {
    let png = png_bytes(40, 20);
    let mut doc = PdfDocument::new(PageSize::A4);
    let page = doc.add_page();

    assert_eq!(doc.image_dimensions(&png).unwrap(), (40, 20));
    doc.insert_image(&png, page, 0.0, 0.0, 100.0, 50.0).unwrap();
    doc.insert_image(&png, page, 0.0, 200.0, 10.0, 10.0).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let images = loaded
        .objects
        .values()
        .filter(|obj| {
            obj.as_stream()
                .ok()
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(|s| s.as_name().ok())
                == Some(b"Image".as_slice())
        })
        .count();
    assert_eq!(images, 1);

    let content = page_content(&bytes, 1);
    assert_eq!(content.matches("/Im1 Do").count(), 2);
}

#[test]
fn test_invalid_image_is_rejected() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let page = doc.add_page();
    let result = doc.insert_image(b"not an image", page, 0.0, 0.0, 10.0, 10.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_document_info() {
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.add_page();
    doc.set_info(DocumentInfo {
        producer: Some("KRA Document Generator".to_string()),
        title: Some("P9".to_string()),
        creation_date: Some("D:20250101120000".to_string()),
    });

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let info_id = loaded.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = loaded.get_dictionary(info_id).unwrap();

    match info.get(b"Producer").unwrap() {
        lopdf::Object::String(bytes, _) => assert_eq!(bytes, b"KRA Document Generator"),
        other => panic!("unexpected producer object: {other:?}"),
    }
}

#[test]
fn test_save_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = PdfDocument::new(PageSize::Letter);
    let page = doc.add_page();
    doc.insert_text("stable", page, 10.0, 10.0, Align::Center)
        .unwrap();

    let path = dir.path().join("out.pdf");
    doc.save(&path).unwrap();
    let first = lopdf::Document::load(&path).unwrap();
    doc.save(&path).unwrap();
    let second = lopdf::Document::load(&path).unwrap();

    assert_eq!(first.get_pages().len(), 1);
    assert_eq!(second.get_pages().len(), 1);
}
