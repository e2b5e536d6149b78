//! Small lopdf-built documents for unit tests.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Adds a Helvetica font object and returns its id.
pub(crate) fn add_helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Adds a 1x1 grey image XObject and returns its id.
pub(crate) fn add_image(doc: &mut Document) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1i64,
            "Height" => 1i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        vec![0u8],
    ))
}

/// Adds a form XObject placed at `(100, 300)` that draws `(ORDER-1)` in
/// Helvetica 12 at its origin.
pub(crate) fn add_form(doc: &mut Document, font_id: ObjectId) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![(-10).into(), (-10).into(), 200.into(), 50.into()],
            "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 300.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        },
        b"BT /F1 12 Tf 0 0 Td (ORDER-1) Tj ET".to_vec(),
    ))
}

/// Single-page document of `width x height` whose resources are `/F1`
/// (Helvetica), `/F2` (Times-Roman), `/Im0` (an image) and `/Fm0` (see
/// [`add_form`]).
pub(crate) fn single_page(width: i64, height: i64, content: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = add_helvetica(&mut doc);
    let times_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
        "Encoding" => "WinAnsiEncoding",
    });
    let image_id = add_image(&mut doc);
    let form_id = add_form(&mut doc, font_id);
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id, "F2" => times_id },
        "XObject" => dictionary! { "Im0" => image_id, "Fm0" => form_id },
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => resources,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("failed to save test PDF");
    bytes
}
