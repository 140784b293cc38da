//! lopdf-based document model.
//!
//! [`LopdfDocument`] opens a PDF with [lopdf](https://crates.io/crates/lopdf),
//! resolves inherited page boxes and rewrites `/CropBox` entries.

use std::io::Write;
use std::path::Path;

use lopdf::{Dictionary, Object, ObjectId};
use pdfcrop_core::{CropError, DocumentModel, Rect};
use tracing::{debug, warn};

use crate::error::BackendError;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page ObjectIds in page order (index = 0-based page number).
    page_ids: Vec<ObjectId>,
    was_encrypted: bool,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .field("was_encrypted", &self.was_encrypted)
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse a PDF from memory.
    ///
    /// Encrypted documents are decrypted with the empty user password and
    /// saved unencrypted.
    ///
    /// # Errors
    ///
    /// [`BackendError::Parse`] for malformed input, [`BackendError::Encrypted`]
    /// when the document needs a password.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let mut inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        let was_encrypted = inner.is_encrypted();
        if was_encrypted {
            inner
                .decrypt("")
                .map_err(|e| BackendError::Encrypted(format!("empty password rejected: {e}")))?;
            inner.trailer.remove(b"Encrypt");
            debug!("decrypted document with empty password");
        }

        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        if page_ids.is_empty() {
            warn!("document has no pages");
        }

        Ok(Self {
            inner,
            page_ids,
            was_encrypted,
        })
    }

    /// Read and parse a PDF file.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Whether the input was encrypted (and has been decrypted).
    pub fn was_encrypted(&self) -> bool {
        self.was_encrypted
    }

    /// Object id of the page at 0-based `index`.
    pub fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    /// Media box of a page, inherited through `/Parent` if needed.
    pub fn page_media_box(&self, index: usize) -> Result<Rect, BackendError> {
        let page_id = self.page_id(index)?;
        let obj = resolve_inherited(&self.inner, page_id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
        rect_from_object(&self.inner, obj)
    }

    /// Crop box of a page if one is set on the page or an ancestor.
    pub fn page_crop_box(&self, index: usize) -> Result<Option<Rect>, BackendError> {
        let page_id = self.page_id(index)?;
        match resolve_inherited(&self.inner, page_id, b"CropBox")? {
            Some(obj) => rect_from_object(&self.inner, obj).map(Some),
            None => Ok(None),
        }
    }

    /// Write `/CropBox` on the page dictionary itself.
    pub fn set_crop_box(&mut self, index: usize, rect: Rect) -> Result<(), BackendError> {
        let page_id = self.page_id(index)?;
        let dict = self
            .inner
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        dict.set(
            "CropBox",
            vec![
                Object::Real(rect.min_x as f32),
                Object::Real(rect.min_y as f32),
                Object::Real(rect.max_x as f32),
                Object::Real(rect.max_y as f32),
            ],
        );
        Ok(())
    }

    /// Resources dictionary of a page, inherited through `/Parent`.
    pub fn page_resources(&self, page_id: ObjectId) -> Result<&Dictionary, BackendError> {
        match resolve_inherited(&self.inner, page_id, b"Resources")? {
            Some(obj) => resolve(&self.inner, obj)
                .as_dict()
                .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
            None => {
                static EMPTY_DICT: std::sync::LazyLock<Dictionary> =
                    std::sync::LazyLock::new(Dictionary::new);
                Ok(&EMPTY_DICT)
            }
        }
    }

    /// Decoded bytes of a page's content, with array streams concatenated.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>, BackendError> {
        let page_dict = self
            .inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => resolve(&self.inner, obj),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(stream) => decode_stream(stream),
            Object::Array(items) => {
                let mut content = Vec::new();
                for item in items {
                    let stream = resolve(&self.inner, item).as_stream().map_err(|e| {
                        BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                    })?;
                    let bytes = decode_stream(stream)?;
                    if !content.is_empty() {
                        content.push(b'\n');
                    }
                    content.extend_from_slice(&bytes);
                }
                Ok(content)
            }
            _ => Err(BackendError::Parse(
                "/Contents is not a stream or array".to_string(),
            )),
        }
    }

    /// Serialize the document.
    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<(), BackendError> {
        self.inner
            .save_to(target)
            .map_err(|e| BackendError::Parse(format!("failed to write PDF: {e}")))?;
        Ok(())
    }

    /// Serialize the document to a file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl DocumentModel for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn media_box(&self, index: usize) -> Result<Rect, CropError> {
        Ok(self.page_media_box(index)?)
    }

    fn set_crop_box(&mut self, index: usize, rect: Rect) -> Result<(), CropError> {
        Ok(LopdfDocument::set_crop_box(self, index, rect)?)
    }
}

/// Follow an indirect reference; other objects are returned as is.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Numbers of an array object, `None` if any element is not a number.
pub(crate) fn number_array(doc: &lopdf::Document, obj: &Object) -> Option<Vec<f64>> {
    resolve(doc, obj)
        .as_array()
        .ok()?
        .iter()
        .map(|o| object_to_f64(resolve(doc, o)).ok())
        .collect()
}

fn rect_from_object(doc: &lopdf::Document, obj: &Object) -> Result<Rect, BackendError> {
    match number_array(doc, obj).as_deref() {
        Some([x0, y0, x1, y1]) => Ok(Rect::new(*x0, *y0, *x1, *y1)),
        Some(values) => Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            values.len()
        ))),
        None => Err(BackendError::Parse(format!(
            "box is not a numeric array: {obj:?}"
        ))),
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Parent chains deeper than this are cyclic.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree /Parent chain is cyclic".into()))
}

/// Decode a stream, decompressing if it has a filter.
pub(crate) fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}
