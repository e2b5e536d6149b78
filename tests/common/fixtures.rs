//! Test fixtures and PDF builders.
//!
//! Provides a builder for multi-page test PDFs with text, images and
//! vector shapes placed at known coordinates, following the Builder
//! pattern for clean test setup.

#![allow(dead_code)]

use anyhow::Result;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// One page under construction.
#[derive(Debug, Clone)]
struct TestPage {
    media_box: Vec<f64>,
    content: Vec<String>,
}

/// A form XObject to register under `/<name>`.
#[derive(Debug, Clone)]
struct TestForm {
    name: String,
    matrix: [f64; 6],
    content: String,
}

/// Builder for creating test PDFs with content at known positions.
///
/// Every page shares one resource dictionary (an indirect object) with
/// Helvetica as `/F1`, Times-Roman as `/F2`, a Helvetica whose `/Widths`
/// make every glyph 1000 units wide as `/F3`, a small image as `/Im0`,
/// and the forms added with [`form`](Self::form).
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let bytes = TestPdfBuilder::new()
///     .page(600.0, 850.0)
///     .text(72.0, 700.0, 12.0, "Order ORDER-1")
///     .image(100.0, 50.0, 200.0, 100.0)
///     .build_bytes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestPdfBuilder {
    pages: Vec<TestPage>,
    forms: Vec<TestForm>,
}

fn reals(values: &[f64]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v as _)).collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl TestPdfBuilder {
    /// Creates an empty builder; call [`page`](Self::page) before adding content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new page of the given size.
    pub fn page(mut self, width: f64, height: f64) -> Self {
        self.pages.push(TestPage {
            media_box: vec![0.0, 0.0, width, height],
            content: Vec::new(),
        });
        self
    }

    /// Starts a new page whose `/MediaBox` is the given array as is,
    /// malformed or not.
    pub fn page_with_media_box(mut self, media_box: &[f64]) -> Self {
        self.pages.push(TestPage {
            media_box: media_box.to_vec(),
            content: Vec::new(),
        });
        self
    }

    /// Starts a new page whose MediaBox does not start at the origin.
    pub fn page_at(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.pages.push(TestPage {
            media_box: vec![x, y, x + width, y + height],
            content: Vec::new(),
        });
        self
    }

    fn current(&mut self) -> &mut TestPage {
        if self.pages.is_empty() {
            self.pages.push(TestPage {
                media_box: vec![0.0, 0.0, 612.0, 792.0],
                content: Vec::new(),
            });
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Adds a line of Helvetica text with its baseline starting at `(x, y)`.
    pub fn text(self, x: f64, y: f64, size: f64, text: &str) -> Self {
        self.text_in("F1", x, y, size, text)
    }

    /// Adds a line of text in font resource `font` (`F1`, `F2` or `F3`).
    pub fn text_in(mut self, font: &str, x: f64, y: f64, size: f64, text: &str) -> Self {
        let op = format!(
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            font,
            size,
            x,
            y,
            escape(text)
        );
        self.current().content.push(op);
        self
    }

    /// Registers a form XObject `/<name>` with the given `/Matrix`, drawing
    /// `content` with the shared resources. Draw it with `raw("/<name> Do")`.
    pub fn form(mut self, name: &str, matrix: [f64; 6], content: &str) -> Self {
        self.forms.push(TestForm {
            name: name.to_string(),
            matrix,
            content: content.to_string(),
        });
        self
    }

    /// Draws `/Im0` scaled into the given rectangle.
    pub fn image(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        let op = format!("q {} 0 0 {} {} {} cm /Im0 Do Q", width, height, x, y);
        self.current().content.push(op);
        self
    }

    /// Fills a rectangle in blue.
    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        let op = format!("q 0 0 1 rg {} {} {} {} re f Q", x, y, width, height);
        self.current().content.push(op);
        self
    }

    /// Appends raw content stream text.
    pub fn raw(mut self, content: &str) -> Self {
        self.current().content.push(content.to_string());
        self
    }

    /// Builds the PDF in memory.
    pub fn build_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2i64,
                "Height" => 2i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8i64,
            },
            vec![0u8, 255, 255, 0],
        ));
        let times_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
            "Encoding" => "WinAnsiEncoding",
        });
        let wide_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
            "FirstChar" => 32i64,
            "LastChar" => 126i64,
            "Widths" => vec![Object::Integer(1000); 95],
        });
        let fonts = dictionary! { "F1" => font_id, "F2" => times_id, "F3" => wide_id };

        let mut xobjects = dictionary! { "Im0" => image_id };
        for form in &self.forms {
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => reals(&[-1000.0, -1000.0, 5000.0, 5000.0]),
                    "Matrix" => reals(&form.matrix),
                    "Resources" => dictionary! {
                        "Font" => fonts.clone(),
                        "XObject" => dictionary! { "Im0" => image_id },
                    },
                },
                form.content.clone().into_bytes(),
            ));
            xobjects.set(form.name.as_str(), form_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = page.content.join("\n");
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let media_box = reals(&page.media_box);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(&self, output_path: &Path) -> Result<PathBuf> {
        std::fs::write(output_path, self.build_bytes()?)?;
        Ok(output_path.to_path_buf())
    }
}

/// The single-page order confirmation used across tests: 600x850 with the
/// order number once, the customer name twice, a footer image and a logo.
pub fn order_confirmation() -> TestPdfBuilder {
    TestPdfBuilder::new()
        .page(600.0, 850.0)
        .image(40.0, 760.0, 120.0, 60.0)
        .text(72.0, 700.0, 14.0, "Order confirmation ORDER-1")
        .text(72.0, 660.0, 12.0, "Bill to: Torod Customer")
        .text(72.0, 420.0, 12.0, "Ship to: Torod Customer")
        .text(72.0, 380.0, 12.0, "Thank you for your purchase")
        .image(200.0, 40.0, 200.0, 80.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pages() {
        let bytes = TestPdfBuilder::new()
            .page(100.0, 100.0)
            .text(10.0, 10.0, 12.0, "a (b)")
            .page(200.0, 300.0)
            .build_bytes()
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
