//! In-memory PDF document.
//!
//! The object structure is held by `lopdf`, which also writes the overlay
//! streams. Page layout and content removal go through MuPDF.

use super::backend::{self, RemovalMarks};
use super::layout::PageLayout;
use super::{number_array, resolve};
use crate::error::{RedactorError, RedactorResult};
use crate::geometry::{PageGeometry, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};

/// A parsed PDF document with its pages in order.
pub struct PdfDocument {
    inner: lopdf::Document,
    /// Page object ids, indexed by 0-based page number.
    page_ids: Vec<ObjectId>,
    geometries: Vec<PageGeometry>,
    layouts: Vec<PageLayout>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// One page: its geometry plus what is drawn on it.
#[derive(Debug, Clone)]
pub struct PdfPage {
    index: usize,
    geometry: PageGeometry,
    layout: PageLayout,
}

impl PdfPage {
    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number, as used in messages.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Fails with [`RedactorError::UnsupportedFeature`] when some of the
    /// page's text could not be mapped to Unicode.
    pub fn check_text(&self) -> RedactorResult<()> {
        match &self.layout.unsupported {
            Some(feature) => Err(RedactorError::UnsupportedFeature {
                feature: feature.clone(),
                page: Some(self.number()),
            }),
            None => Ok(()),
        }
    }
}

impl PdfDocument {
    /// Parses a PDF from memory.
    ///
    /// The header may be preceded by up to [`super::HEADER_SEARCH_WINDOW`]
    /// bytes of junk, which are dropped; offsets in the file are read
    /// relative to the header.
    pub fn load(bytes: &[u8]) -> RedactorResult<Self> {
        let start = super::header_offset(bytes)
            .ok_or_else(|| RedactorError::parse("missing %PDF- header", None))?;
        let bytes = &bytes[start..];
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| RedactorError::parse(format!("failed to parse PDF: {}", e), None))?;

        if inner.trailer.get(b"Encrypt").is_ok() {
            return Err(RedactorError::parse(
                "encrypted documents are not supported",
                None,
            ));
        }

        // get_pages is keyed by 1-based page number
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        let mut doc = Self {
            inner,
            page_ids,
            geometries: Vec::new(),
            layouts: Vec::new(),
        };
        let geometries = (0..doc.page_count())
            .map(|index| doc.read_geometry(index))
            .collect::<RedactorResult<Vec<_>>>()?;
        doc.geometries = geometries;
        doc.layouts = backend::extract_layouts(bytes, &doc.geometries)?;
        log::debug!("loaded {} page(s)", doc.page_count());
        Ok(doc)
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn page_id(&self, index: usize) -> RedactorResult<ObjectId> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            RedactorError::parse(
                format!(
                    "page index {} out of range (document has {} pages)",
                    index,
                    self.page_ids.len()
                ),
                None,
            )
        })
    }

    fn page_dict(&self, index: usize) -> RedactorResult<&Dictionary> {
        let id = self.page_id(index)?;
        self.inner
            .get_object(id)
            .and_then(|obj| obj.as_dict())
            .map_err(|e| {
                RedactorError::parse(format!("page dictionary: {}", e), Some(index + 1))
            })
    }

    fn page_dict_mut(&mut self, index: usize) -> RedactorResult<&mut Dictionary> {
        let id = self.page_id(index)?;
        self.inner
            .get_object_mut(id)
            .and_then(|obj| obj.as_dict_mut())
            .map_err(|e| {
                RedactorError::parse(format!("page dictionary: {}", e), Some(index + 1))
            })
    }

    /// Looks up `key` on the page, walking up the page tree via `/Parent`.
    fn inherited(&self, index: usize, key: &[u8]) -> RedactorResult<Option<&Object>> {
        let mut dict = self.page_dict(index)?;
        // page trees are shallow; the bound only guards against cycles
        for _ in 0..64 {
            if let Ok(value) = dict.get(key) {
                return Ok(resolve(&self.inner, value));
            }
            match dict.get(b"Parent").ok().and_then(|p| resolve(&self.inner, p)) {
                Some(Object::Dictionary(parent)) => dict = parent,
                _ => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Page size and view of a page.
    pub fn geometry(&self, index: usize) -> RedactorResult<PageGeometry> {
        self.page_id(index)?;
        Ok(self.geometries[index])
    }

    /// An inherited page box, `None` when absent.
    fn page_box(&self, index: usize, key: &[u8]) -> RedactorResult<Option<Rect>> {
        let Some(obj) = self.inherited(index, key)? else {
            return Ok(None);
        };
        let name = String::from_utf8_lossy(key);
        let values = number_array(&self.inner, obj)
            .ok_or_else(|| RedactorError::parse(format!("invalid /{}", name), Some(index + 1)))?;
        let [x0, y0, x1, y1] = values.as_slice() else {
            return Err(RedactorError::parse(
                format!("/{} has {} entries, expected 4", name, values.len()),
                Some(index + 1),
            ));
        };
        Ok(Some(Rect::from_corners(*x0, *y0, *x1, *y1)))
    }

    /// Geometry from the (possibly inherited) `/MediaBox`, `/CropBox` and
    /// `/Rotate`.
    fn read_geometry(&self, index: usize) -> RedactorResult<PageGeometry> {
        let media_box = self
            .page_box(index, b"MediaBox")?
            .ok_or_else(|| RedactorError::parse("missing /MediaBox", Some(index + 1)))?;
        let crop_box = self.page_box(index, b"CropBox")?;
        let rotate = match self.inherited(index, b"Rotate")? {
            Some(Object::Integer(value)) => *value,
            Some(Object::Real(value)) => *value as i64,
            _ => 0,
        };
        PageGeometry::from_media_box(media_box)
            .and_then(|geometry| geometry.with_view(crop_box, rotate))
            .map_err(|e| e.on_page(index + 1))
    }

    /// Resolved copy of the page's resource dictionary.
    pub fn resources(&self, index: usize) -> RedactorResult<Dictionary> {
        match self.inherited(index, b"Resources")? {
            Some(Object::Dictionary(dict)) => Ok(dict.clone()),
            Some(_) => Err(RedactorError::parse(
                "/Resources is not a dictionary",
                Some(index + 1),
            )),
            None => Ok(Dictionary::new()),
        }
    }

    /// Object ids of the page's content streams, in drawing order.
    fn content_ids(&mut self, index: usize) -> RedactorResult<Vec<ObjectId>> {
        let contents = self.page_dict(index)?.get(b"Contents").ok().cloned();
        let items = match contents {
            None => return Ok(Vec::new()),
            Some(Object::Reference(id)) => match self.inner.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(items)) => items,
            Some(Object::Stream(stream)) => {
                vec![Object::Reference(self.inner.add_object(stream))]
            }
            Some(_) => {
                return Err(RedactorError::parse(
                    "/Contents is not a stream or array",
                    Some(index + 1),
                ))
            }
        };
        items
            .iter()
            .map(|item| {
                item.as_reference().map_err(|_| {
                    RedactorError::parse(
                        "/Contents array item is not a reference",
                        Some(index + 1),
                    )
                })
            })
            .collect()
    }

    /// Decoded content stream bytes, all streams joined in order.
    pub fn content_bytes(&self, index: usize) -> RedactorResult<Vec<u8>> {
        let page = index + 1;
        let streams: Vec<&Stream> = match self.page_dict(index)?.get(b"Contents") {
            Err(_) => return Ok(Vec::new()),
            Ok(obj) => match resolve(&self.inner, obj) {
                Some(Object::Stream(stream)) => vec![stream],
                Some(Object::Array(items)) => items
                    .iter()
                    .map(|item| match resolve(&self.inner, item) {
                        Some(Object::Stream(stream)) => Ok(stream),
                        _ => Err(RedactorError::parse(
                            "/Contents array item is not a stream",
                            Some(page),
                        )),
                    })
                    .collect::<RedactorResult<_>>()?,
                _ => {
                    return Err(RedactorError::parse(
                        "/Contents is not a stream or array",
                        Some(page),
                    ))
                }
            },
        };

        let mut content = Vec::new();
        for stream in streams {
            let bytes = if stream.dict.get(b"Filter").is_ok() {
                stream.decompressed_content().map_err(|e| {
                    RedactorError::parse(format!("failed to decompress content: {}", e), Some(page))
                })?
            } else {
                stream.content.clone()
            };
            if !content.is_empty() {
                content.push(b'\n');
            }
            content.extend_from_slice(&bytes);
        }
        Ok(content)
    }

    /// Decoded content operations of a page.
    pub fn operations(&self, index: usize) -> RedactorResult<Vec<Operation>> {
        let bytes = self.content_bytes(index)?;
        Content::decode(&bytes)
            .map(|content| content.operations)
            .map_err(|e| {
                RedactorError::parse(format!("failed to decode content stream: {}", e), Some(index + 1))
            })
    }

    /// A page with its layout as it was when the document was loaded.
    pub fn page(&self, index: usize) -> RedactorResult<PdfPage> {
        let geometry = self.geometry(index)?;
        Ok(PdfPage {
            index,
            geometry,
            layout: self.layouts[index].clone(),
        })
    }

    /// Deletes everything drawn under the given page-local rectangles,
    /// `(page index, rectangles)`, and reloads the document from the
    /// result. Nothing is painted.
    ///
    /// On error the document is left as it was.
    pub fn remove_content(&mut self, areas: &[(usize, Vec<Rect>)]) -> RedactorResult<()> {
        let marks = areas
            .iter()
            .map(|(index, rects)| {
                Ok(RemovalMarks {
                    page: *index,
                    geometry: self.geometry(*index)?,
                    rects: rects.clone(),
                })
            })
            .collect::<RedactorResult<Vec<_>>>()?;

        let mut bytes = Vec::new();
        self.inner
            .save_to(&mut bytes)
            .map_err(|e| RedactorError::parse(format!("failed to serialize PDF: {}", e), None))?;
        let redacted = backend::apply_redactions(&bytes, &marks)?;

        let reloaded = Self::load(&redacted)?;
        if reloaded.page_count() != self.page_count() {
            return Err(RedactorError::parse(
                format!(
                    "content removal changed the page count from {} to {}",
                    self.page_count(),
                    reloaded.page_count()
                ),
                None,
            ));
        }
        *self = reloaded;
        Ok(())
    }

    /// Keeps the existing content streams untouched, isolates them in
    /// `q … Q`, and appends `overlay` after them.
    pub fn append_overlay(&mut self, index: usize, overlay: Vec<Operation>) -> RedactorResult<()> {
        let existing = self.content_ids(index)?;

        let mut closing = vec![Operation::new("Q", vec![])];
        closing.extend(overlay);
        let closing = Content {
            operations: closing,
        }
        .encode()?;

        let open_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close_id = self.inner.add_object(Stream::new(Dictionary::new(), closing));

        let mut contents = vec![Object::Reference(open_id)];
        contents.extend(existing.into_iter().map(Object::Reference));
        contents.push(Object::Reference(close_id));
        self.page_dict_mut(index)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Registers `font` under `/Font /<name>` in the page's own resources.
    ///
    /// Inherited or shared resource dictionaries are copied onto the page
    /// first so other pages are not affected.
    pub fn add_font_resource(&mut self, index: usize, name: &str, font: Dictionary) -> RedactorResult<()> {
        let font_id = self.inner.add_object(font);
        self.edit_resource_category(index, b"Font", |fonts| {
            fonts.set(name, Object::Reference(font_id));
        })
    }

    fn edit_resource_category<F>(&mut self, index: usize, category: &[u8], edit: F) -> RedactorResult<()>
    where
        F: FnOnce(&mut Dictionary),
    {
        let mut resources = self.resources(index)?;
        let mut entries = match resources.get(category).ok().and_then(|o| resolve(&self.inner, o)) {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        edit(&mut entries);
        resources.set(category.to_vec(), Object::Dictionary(entries));
        self.page_dict_mut(index)?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// Serializes the document.
    ///
    /// Objects no longer reachable from the trailer (content streams and
    /// images replaced during removal) are dropped so they do not survive
    /// in the output file.
    pub fn save(&mut self) -> RedactorResult<Vec<u8>> {
        let pruned = self.inner.prune_objects();
        log::debug!("pruned {} unreachable objects", pruned.len());

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| RedactorError::parse(format!("failed to serialize PDF: {}", e), None))?;
        Ok(buffer)
    }
}
