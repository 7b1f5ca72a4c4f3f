#![allow(dead_code)]

use epr_core::{TemplateRegistry, DEFAULT_TEMPLATE_KEY};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;

/// Builds a template with `num_pages` pages. Each page carries its own
/// MediaBox and a shared resources reference.
pub fn template_pdf(num_pages: u32, width: i64, height: i64, label: &str) -> Vec<u8> {
    boxed_template_pdf(num_pages, [0, 0, width, height], label)
}

/// Like [`template_pdf`] with an explicit `[llx, lly, urx, ury]` MediaBox.
pub fn boxed_template_pdf(num_pages: u32, media_box: [i64; 4], label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids: Vec<Object> = Vec::new();
    for index in 1..=num_pages {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            label_content(&format!("{label} {index}")),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.iter().map(|&v| Object::from(v)).collect::<Vec<_>>(),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id.into());
    }

    finish(&mut doc, pages_id, page_ids, dictionary! {})
}

/// Builds a one-page template whose MediaBox and Resources are inherited
/// from the page tree root and whose content is a single stream.
pub fn inherited_template_pdf(width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, label_content("Inherited form")));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    finish(
        &mut doc,
        pages_id,
        vec![page_id.into()],
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        },
    )
}

fn label_content(text: &str) -> Vec<u8> {
    Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    }
    .encode()
    .unwrap()
}

fn finish(
    doc: &mut Document,
    pages_id: ObjectId,
    page_ids: Vec<Object>,
    mut pages_dict: lopdf::Dictionary,
) -> Vec<u8> {
    pages_dict.set("Type", "Pages");
    pages_dict.set("Count", page_ids.len() as i64);
    pages_dict.set("Kids", page_ids);
    doc.objects.insert(pages_id, pages_dict.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Writes a US Letter template for every built-in key into `dir`.
pub fn install_builtin_templates(dir: &Path) -> TemplateRegistry {
    let registry = TemplateRegistry::builtin(dir);
    for descriptor in registry.descriptors() {
        let label = format!("{} form", descriptor.key);
        std::fs::write(
            registry.asset_path(descriptor),
            template_pdf(2, 612, 792, &label),
        )
        .unwrap();
    }
    assert!(registry.contains(DEFAULT_TEMPLATE_KEY));
    registry
}

/// A `Tj` string drawn on a page, with the text matrix origin in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub text: String,
    pub origin: Option<(f32, f32)>,
}

/// Decodes the first page of `pdf` and returns every `Tj` string in order.
pub fn first_page_text(pdf: &[u8]) -> Vec<DrawnText> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();

    let mut origin = None;
    let mut drawn = Vec::new();
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tm" => {
                origin = Some((
                    number(&operation.operands[4]),
                    number(&operation.operands[5]),
                ));
            }
            "Td" => {
                origin = Some((
                    number(&operation.operands[0]),
                    number(&operation.operands[1]),
                ));
            }
            "Tj" => {
                if let Object::String(bytes, _) = &operation.operands[0] {
                    drawn.push(DrawnText {
                        text: String::from_utf8_lossy(bytes).into_owned(),
                        origin,
                    });
                }
            }
            _ => {}
        }
    }
    drawn
}

/// Page count of a serialized document.
pub fn page_count(pdf: &[u8]) -> usize {
    Document::load_mem(pdf).unwrap().get_pages().len()
}

fn number(object: &Object) -> f32 {
    match object {
        Object::Integer(value) => *value as f32,
        Object::Real(value) => *value as f32,
        other => panic!("expected number, found {other:?}"),
    }
}
