#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use lopdf::{Object, Stream, dictionary};

pub fn cmd() -> Command {
    Command::cargo_bin("pdfcrop").unwrap()
}

/// Create a US Letter PDF with one page per content stream, Helvetica as /F1.
pub fn pdf_with_pages(contents: &[&[u8]]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        };
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(contents.len() as i64),
    });

    for &pid in &page_ids {
        if let Ok(page_obj) = doc.get_object_mut(pid) {
            if let Ok(dict) = page_obj.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write PDF bytes to a temporary file and return the handle.
pub fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

/// `/CropBox` of every page of the PDF at `path`, `None` where absent.
pub fn crop_boxes(path: &Path) -> Vec<Option<[f64; 4]>> {
    let doc = lopdf::Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let dict = doc.get_object(id).unwrap().as_dict().unwrap();
            dict.get(b"CropBox").ok().map(|obj| {
                let values: Vec<f64> = obj
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| match v {
                        Object::Integer(i) => *i as f64,
                        Object::Real(r) => f64::from(*r),
                        other => panic!("non-numeric crop box entry {other:?}"),
                    })
                    .collect();
                [values[0], values[1], values[2], values[3]]
            })
        })
        .collect()
}

pub fn assert_box_approx(actual: [f64; 4], expected: [f64; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-3, "expected {expected:?}, got {actual:?}");
    }
}
