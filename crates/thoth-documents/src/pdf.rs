// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extraction from PDF files.
//!
//! Pages are read in order. Text comes from the string operands of each
//! page's text-showing operators; line moves and text-object ends become line
//! breaks. Pages whose content cannot be decoded are skipped with a warning.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use thoth_core::ThothError;
use tracing::{debug, warn};

fn document_error(path: &Path, message: impl Into<String>) -> ThothError {
    ThothError::Document {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Extract the text of every readable page, one blank line between pages.
///
/// Fails with [`ThothError::Document`] when the file is not a loadable PDF or
/// no page yields any text.
pub fn extract_text(path: &Path) -> Result<String, ThothError> {
    let doc = Document::load(path)
        .map_err(|e| document_error(path, format!("failed to load PDF: {e}")))?;
    let pages = doc.get_pages();
    debug!(path = %path.display(), pages = pages.len(), "extracting PDF text");

    let mut extracted = Vec::new();
    for (page_number, page_id) in pages {
        match page_text(&doc, page_id) {
            Ok(text) if !text.is_empty() => extracted.push(text),
            Ok(_) => debug!(page = page_number, "PDF page has no text"),
            Err(e) => warn!(
                path = %path.display(),
                page = page_number,
                error = %e,
                "skipping unreadable PDF page"
            ),
        }
    }

    if extracted.is_empty() {
        return Err(document_error(path, "no text content extracted from PDF"));
    }
    Ok(extracted.join("\n\n"))
}

fn page_text(doc: &Document, page_id: ObjectId) -> Result<String, lopdf::Error> {
    let content = Content::decode(&doc.get_page_content(page_id)?)?;
    let mut raw = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" => push_strings(&mut raw, operation.operands.first()),
            "'" | "\"" => {
                raw.push('\n');
                push_strings(&mut raw, operation.operands.last());
            }
            "T*" | "ET" => raw.push('\n'),
            "Td" | "TD" => raw.push(' '),
            _ => {}
        }
    }
    Ok(normalize(&raw))
}

fn push_strings(out: &mut String, operand: Option<&Object>) {
    match operand {
        Some(Object::String(bytes, _)) => out.push_str(&decode_pdf_string(bytes)),
        // TJ arrays interleave strings with kerning offsets.
        Some(Object::Array(items)) => {
            for item in items {
                if let Object::String(bytes, _) = item {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
        }
        _ => {}
    }
}

/// UTF-16BE when the string carries a byte-order mark, Latin-1 otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Collapse runs of whitespace within lines and drop blank lines.
fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes a minimal PDF with one Courier text line per entry of each page.
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, pages: &[&[&str]]) {
    use lopdf::content::Operation;
    use lopdf::{Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![0.into(), 0.into(), 612.into(), 792.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save test PDF");
}
