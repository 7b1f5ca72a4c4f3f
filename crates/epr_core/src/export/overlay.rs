//! Text overlay onto existing PDF pages.
//!
//! # Responsibility
//! - Load a template document and stamp placed lines onto its first page.
//! - Register the overlay font on the page without disturbing existing
//!   resources.
//!
//! # Invariants
//! - Existing page content is kept byte-for-byte and wrapped in `q`/`Q`,
//!   so its graphics state cannot affect the overlay.
//! - The overlay is appended as the last content stream and drawn on top.

use super::error::OverlayError;
use super::layout::{OverlayLayout, PlacedLine};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// US Letter height, used when no MediaBox is found in the page tree.
const FALLBACK_PAGE_HEIGHT: f32 = 792.0;
const FONT_RESOURCE_PREFIX: &str = "EprHelv";
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Stamps `lines_for_height(page_height)` onto the first page of `template`
/// and returns the serialized document.
pub fn render_overlay<F>(
    template: &[u8],
    layout: &OverlayLayout,
    lines_for_height: F,
) -> Result<Vec<u8>, OverlayError>
where
    F: FnOnce(f32) -> Vec<PlacedLine>,
{
    let mut doc = Document::load_mem(template)?;
    let page_id = first_page(&doc)?;

    let page_height = match page_height(&doc, page_id)? {
        Some(height) => height,
        None => {
            log::warn!(
                "event=pdf_overlay module=export status=fallback reason=missing_media_box height={}",
                FALLBACK_PAGE_HEIGHT
            );
            FALLBACK_PAGE_HEIGHT
        }
    };
    let lines = lines_for_height(page_height);

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_name = register_font(&mut doc, page_id, font_id)?;

    let content = text_content(&font_name, layout.font_size, &lines).encode()?;
    overlay_content(&mut doc, page_id, content)?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn first_page(doc: &Document) -> Result<ObjectId, OverlayError> {
    doc.get_pages()
        .into_iter()
        .next()
        .map(|(_, page_id)| page_id)
        .ok_or(OverlayError::NoPages)
}

/// Height of the page's (possibly inherited) MediaBox, `|ury - lly|`.
///
/// This is the box height, not its top edge: the layout places the first
/// baseline at `height - top_offset` even when the MediaBox origin is not
/// zero. Changing this to `ury` also moves every expected y in the layout
/// and export tests.
fn page_height(doc: &Document, page_id: ObjectId) -> Result<Option<f32>, OverlayError> {
    let Some(media_box) = inherited_entry(doc, page_id, b"MediaBox")? else {
        return Ok(None);
    };

    let bounds = resolve(doc, media_box)?.as_array()?;
    if bounds.len() != 4 {
        return Err(OverlayError::InvalidPage(format!(
            "MediaBox has {} entries, expected 4",
            bounds.len()
        )));
    }
    let lower = number(resolve(doc, &bounds[1])?)?;
    let upper = number(resolve(doc, &bounds[3])?)?;
    Ok(Some((upper - lower).abs()))
}

/// Walks the page tree upwards until `key` is found.
fn inherited_entry<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, OverlayError> {
    let mut current = Some(page_id);
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let Some(node_id) = current else {
            return Ok(None);
        };
        let node = doc.get_object(node_id)?.as_dict()?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Err(OverlayError::InvalidPage(
        "page tree is deeper than supported".to_string(),
    ))
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, OverlayError> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

fn number(object: &Object) -> Result<f32, OverlayError> {
    match object {
        Object::Integer(value) => Ok(*value as f32),
        Object::Real(value) => Ok(*value as f32),
        other => Err(OverlayError::InvalidPage(format!(
            "expected a number in MediaBox, found {other:?}"
        ))),
    }
}

/// Adds `font_id` to the page font resources under a fresh name.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, OverlayError> {
    let resources_id = indirect_resources(doc, page_id)?;
    let font_entry = doc
        .get_object(resources_id)?
        .as_dict()?
        .get(b"Font")
        .ok()
        .cloned();

    match font_entry {
        Some(Object::Reference(fonts_id)) => {
            let fonts = doc.get_object_mut(fonts_id)?.as_dict_mut()?;
            let name = unused_font_name(fonts);
            fonts.set(name.clone(), font_id);
            Ok(name)
        }
        Some(Object::Dictionary(mut fonts)) => {
            let name = unused_font_name(&fonts);
            fonts.set(name.clone(), font_id);
            doc.get_object_mut(resources_id)?
                .as_dict_mut()?
                .set("Font", fonts);
            Ok(name)
        }
        _ => {
            let name = FONT_RESOURCE_PREFIX.to_string();
            let mut fonts = Dictionary::new();
            fonts.set(name.clone(), font_id);
            doc.get_object_mut(resources_id)?
                .as_dict_mut()?
                .set("Font", fonts);
            Ok(name)
        }
    }
}

/// Returns the id of the page's resource dictionary, materializing inline or
/// inherited resources as an indirect object owned by the page.
fn indirect_resources(doc: &mut Document, page_id: ObjectId) -> Result<ObjectId, OverlayError> {
    let own_entry = doc
        .get_object(page_id)?
        .as_dict()?
        .get(b"Resources")
        .ok()
        .cloned();

    let resources = match own_entry {
        Some(Object::Reference(id)) => return Ok(id),
        Some(Object::Dictionary(dict)) => dict,
        _ => match inherited_entry(doc, page_id, b"Resources")? {
            Some(entry) => resolve(doc, entry)?.as_dict()?.clone(),
            None => Dictionary::new(),
        },
    };

    let resources_id = doc.add_object(resources);
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", resources_id);
    Ok(resources_id)
}

fn unused_font_name(fonts: &Dictionary) -> String {
    let mut suffix = 0usize;
    loop {
        let candidate = if suffix == 0 {
            FONT_RESOURCE_PREFIX.to_string()
        } else {
            format!("{FONT_RESOURCE_PREFIX}{suffix}")
        };
        if !fonts.has(candidate.as_bytes()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn text_content(font_name: &str, font_size: f32, lines: &[PlacedLine]) -> Content {
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("g", vec![0.into()]),
    ];

    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font_name.as_bytes().to_vec()), font_size.into()],
        ));
        operations.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                line.x.into(),
                line.y.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&line.text),
                StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    operations.push(Operation::new("Q", vec![]));
    Content { operations }
}

/// Appends `content_stream` to the page, drawn on top of the existing content.
fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), OverlayError> {
    let existing = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(other) => {
                return Err(OverlayError::InvalidPage(format!(
                    "page {page_id:?} has unsupported /Contents {other:?}"
                )));
            }
            Err(_) => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if !existing.is_empty() {
        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(restore_id));
    }
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, content_stream));
    contents.push(Object::Reference(overlay_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Encodes text for a WinAnsi Helvetica font.
///
/// Control characters become spaces so each value stays on one line; other
/// characters without a WinAnsi code point become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            _ if ch.is_control() => b' ',
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::encode_win_ansi;

    #[test]
    fn encode_win_ansi_keeps_latin1_and_maps_typographic_quotes() {
        assert_eq!(encode_win_ansi("José"), b"Jos\xe9".to_vec());
        assert_eq!(encode_win_ansi("“ok”"), b"\x93ok\x94".to_vec());
    }

    #[test]
    fn encode_win_ansi_flattens_control_characters_and_replaces_unknown() {
        assert_eq!(encode_win_ansi("a\nb\tc"), b"a b c".to_vec());
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }
}
