//! Document-wide font cache and glyph outline provider.
//!
//! Font dictionaries are loaded on first use and assigned a [`FontRef`].
//! Each loaded font knows its glyph widths (for text advance) and one of
//! three outline sources:
//!
//! - Type 3 fonts: the `d1` glyph box of each char proc;
//! - embedded TrueType/OpenType programs: glyph boxes read with ttf-parser;
//! - everything else: a box from the advance width and the font's
//!   ascent/descent.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use pdfcrop_core::{CropError, Ctm, FontOutlineProvider, FontRef, GlyphOutline, OutlineKind, Rect};
use tracing::{debug, trace, warn};
use ttf_parser::{Face, GlyphId, PlatformId};

use crate::lopdf_backend::{decode_stream, number_array, object_to_f64, resolve};
use crate::standard_fonts::{self, StandardFont};

const DEFAULT_ASCENT: f64 = 750.0;
const DEFAULT_DESCENT: f64 = -250.0;
const DEFAULT_WIDTH: f64 = 600.0;
const DEFAULT_CID_WIDTH: f64 = 1000.0;
/// Longest `c_first c_last w` run accepted from a `/W` array.
const MAX_CID_RANGE: u32 = 0x1_0000;
/// Single-byte codes that advance without inking: space and no-break space.
const BLANK_CODES: [u32; 2] = [0x20, 0xA0];

/// Glyph widths in glyph space units.
#[derive(Debug)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing: f64,
    },
    Standard(&'static StandardFont),
    Cid {
        default: f64,
        map: HashMap<u32, f64>,
    },
}

impl Widths {
    fn get(&self, code: u32) -> f64 {
        match self {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Standard(font) => font.width(code),
            Widths::Cid { default, map } => map.get(&code).copied().unwrap_or(*default),
        }
    }
}

/// Code to glyph id mapping of an embedded font program.
#[derive(Debug)]
enum GlyphMap {
    /// Single-byte codes through the font's `cmap`.
    SimpleCmap,
    /// CID equals glyph id.
    CidIdentity,
    /// `/CIDToGIDMap` stream, indexed by CID.
    CidTable(Vec<u16>),
}

#[derive(Debug)]
struct EmbeddedFace {
    data: Vec<u8>,
    units_per_em: u16,
    glyph_map: GlyphMap,
    boxes: RwLock<HashMap<u32, Option<Rect>>>,
}

impl EmbeddedFace {
    fn parse(data: Vec<u8>, glyph_map: GlyphMap) -> Option<Self> {
        let units_per_em = match Face::parse(&data, 0) {
            Ok(face) => face.units_per_em(),
            Err(e) => {
                warn!("embedded font program is unusable: {e}");
                return None;
            }
        };
        Some(Self {
            data,
            units_per_em,
            glyph_map,
            boxes: RwLock::new(HashMap::new()),
        })
    }

    fn glyph_box(&self, code: u32) -> Option<Rect> {
        if let Some(cached) = self
            .boxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&code)
        {
            return *cached;
        }
        let computed = self.compute_box(code);
        self.boxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code, computed);
        computed
    }

    fn compute_box(&self, code: u32) -> Option<Rect> {
        let face = Face::parse(&self.data, 0).ok()?;
        let gid = match &self.glyph_map {
            GlyphMap::SimpleCmap => simple_glyph_id(&face, code)?,
            GlyphMap::CidIdentity => GlyphId(u16::try_from(code).ok()?),
            GlyphMap::CidTable(table) => GlyphId(*table.get(code as usize)?),
        };
        if gid.0 == 0 {
            return None;
        }
        let bbox = face.glyph_bounding_box(gid)?;
        Some(Rect::new(
            bbox.x_min.into(),
            bbox.y_min.into(),
            bbox.x_max.into(),
            bbox.y_max.into(),
        ))
    }
}

/// Look up a single-byte code in the `cmap` the way viewers do for
/// non-CID TrueType fonts: symbolic (3,0) with the `0xF000` page,
/// Mac Roman (1,0), then Unicode (3,1) treating the code as Latin-1.
fn simple_glyph_id(face: &Face<'_>, code: u32) -> Option<GlyphId> {
    let cmap = face.tables().cmap?;
    let subtables: Vec<_> = cmap.subtables.into_iter().collect();
    let find = |platform: PlatformId, encoding: u16| {
        subtables
            .iter()
            .find(|s| s.platform_id == platform && s.encoding_id == encoding)
    };

    if let Some(symbol) = find(PlatformId::Windows, 0) {
        for candidate in [code, 0xF000 + code, 0xF100 + code, 0xF200 + code] {
            if let Some(gid) = symbol.glyph_index(candidate) {
                return Some(gid);
            }
        }
    }
    if let Some(gid) = find(PlatformId::Macintosh, 0).and_then(|s| s.glyph_index(code)) {
        return Some(gid);
    }
    find(PlatformId::Windows, 1).and_then(|s| s.glyph_index(code))
}

#[derive(Debug)]
enum Outlines {
    Procedural {
        font_bbox: Rect,
        glyphs: HashMap<u32, Rect>,
    },
    Embedded(EmbeddedFace),
    Metrics {
        ascent: f64,
        descent: f64,
    },
}

/// A font dictionary resolved into widths and outlines.
#[derive(Debug)]
pub struct LoadedFont {
    name: String,
    font_matrix: Ctm,
    two_byte: bool,
    widths: Widths,
    outlines: Outlines,
}

impl LoadedFont {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn font_matrix(&self) -> Ctm {
        self.font_matrix
    }

    /// Whether show-text strings use 2-byte codes (Type 0 fonts).
    pub fn two_byte(&self) -> bool {
        self.two_byte
    }

    /// Horizontal advance of `code` in text space per unit font size.
    pub fn advance(&self, code: u32) -> f64 {
        self.widths.get(code) * self.font_matrix.a
    }

    /// Split a show-text string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match *pair {
                    [hi, lo] => u32::from(u16::from_be_bytes([hi, lo])),
                    [single] => u32::from(single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Glyph-space outline of `code`, `None` when nothing is drawn.
    pub fn outline(&self, code: u32) -> Option<GlyphOutline> {
        match &self.outlines {
            Outlines::Procedural { font_bbox, glyphs } => {
                glyphs.get(&code).map(|bounds| GlyphOutline {
                    bounds: *bounds,
                    kind: OutlineKind::Procedural {
                        font_bbox: *font_bbox,
                    },
                })
            }
            Outlines::Embedded(face) => face.glyph_box(code).map(|bounds| GlyphOutline {
                bounds,
                kind: OutlineKind::Scaled {
                    units_per_em: face.units_per_em,
                },
            }),
            Outlines::Metrics { ascent, descent } => {
                if !self.two_byte && BLANK_CODES.contains(&code) {
                    return None;
                }
                let width = self.widths.get(code);
                (width > 0.0)
                    .then(|| GlyphOutline::vector(Rect::new(0.0, *descent, width, *ascent)))
            }
        }
    }

    fn fallback(name: String) -> Self {
        Self {
            name,
            font_matrix: Ctm::scale(0.001, 0.001),
            two_byte: false,
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing: DEFAULT_WIDTH,
            },
            outlines: Outlines::Metrics {
                ascent: DEFAULT_ASCENT,
                descent: DEFAULT_DESCENT,
            },
        }
    }
}

#[derive(Debug, Default)]
struct FontTable {
    by_object: HashMap<ObjectId, FontRef>,
    fonts: Vec<Arc<LoadedFont>>,
}

/// Lazily populated cache of the fonts of one document.
///
/// Safe to share between page workers; lookups take a read lock and only
/// the first use of a font dictionary takes the write lock.
#[derive(Debug, Default)]
pub struct FontCache {
    table: RwLock<FontTable>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, FontTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FontTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of fonts loaded so far.
    pub fn len(&self) -> usize {
        self.read().fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, font: FontRef) -> Option<Arc<LoadedFont>> {
        self.read().fonts.get(font.0).cloned()
    }

    /// Resolve a font resource (usually an indirect reference) to a
    /// [`FontRef`], loading it on first use. Unreadable font dictionaries
    /// load as a default-metrics font.
    pub fn load(&self, doc: &lopdf::Document, font_obj: &Object) -> FontRef {
        let id = match font_obj {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        if let Some(font) = id.and_then(|id| self.read().by_object.get(&id).copied()) {
            return font;
        }

        let loaded = match resolve(doc, font_obj).as_dict() {
            Ok(dict) => load_font(doc, dict),
            Err(_) => {
                warn!("font resource is not a dictionary: {font_obj:?}");
                LoadedFont::fallback(String::new())
            }
        };
        debug!(name = loaded.name.as_str(), "loaded font");

        let mut table = self.write();
        if let Some(font) = id.and_then(|id| table.by_object.get(&id).copied()) {
            return font;
        }
        let font = FontRef(table.fonts.len());
        table.fonts.push(Arc::new(loaded));
        if let Some(id) = id {
            table.by_object.insert(id, font);
        }
        font
    }
}

impl FontOutlineProvider for FontCache {
    fn font_matrix(&self, font: FontRef) -> Ctm {
        self.get(font)
            .map_or(Ctm::scale(0.001, 0.001), |f| f.font_matrix)
    }

    fn outline_for(&self, font: FontRef, code: u32) -> Result<GlyphOutline, CropError> {
        let outline = self.get(font).and_then(|f| f.outline(code));
        if outline.is_none() {
            trace!(font = font.0, code, "no glyph outline");
        }
        outline.ok_or(CropError::FontOutlineUnavailable { font: font.0, code })
    }
}

fn load_font(doc: &lopdf::Document, dict: &Dictionary) -> LoadedFont {
    let name = name_of(doc, dict, b"BaseFont").unwrap_or_default();
    match name_of(doc, dict, b"Subtype").as_deref() {
        Some("Type3") => type3_font(doc, dict, name),
        Some("Type0") => type0_font(doc, dict, name),
        _ => simple_font(doc, dict, name),
    }
}

fn simple_font(doc: &lopdf::Document, dict: &Dictionary, name: String) -> LoadedFont {
    let descriptor = dict_of(doc, dict, b"FontDescriptor");
    let standard = standard_fonts::lookup(&name);

    let missing = descriptor
        .and_then(|d| number_of(doc, d, b"MissingWidth"))
        .unwrap_or(0.0);
    let widths = match (dict.get(b"Widths").ok(), standard) {
        (Some(widths), _) => Widths::Simple {
            first_char: number_of(doc, dict, b"FirstChar").map_or(0, |c| c.max(0.0) as u32),
            widths: number_array(doc, widths).unwrap_or_default(),
            missing,
        },
        (None, Some(font)) => Widths::Standard(font),
        (None, None) => Widths::Simple {
            first_char: 0,
            widths: Vec::new(),
            missing: DEFAULT_WIDTH,
        },
    };

    let outlines = descriptor
        .and_then(|d| embedded_program(doc, d))
        .and_then(|data| EmbeddedFace::parse(data, GlyphMap::SimpleCmap))
        .map(Outlines::Embedded)
        .unwrap_or_else(|| metrics_outlines(doc, descriptor, standard));

    LoadedFont {
        name,
        font_matrix: Ctm::scale(0.001, 0.001),
        two_byte: false,
        widths,
        outlines,
    }
}

fn type0_font(doc: &lopdf::Document, dict: &Dictionary, name: String) -> LoadedFont {
    let Some(descendant) = dict
        .get(b"DescendantFonts")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())
        .and_then(|fonts| fonts.first())
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        warn!(font = name.as_str(), "Type0 font without a descendant font");
        let mut font = LoadedFont::fallback(name);
        font.two_byte = true;
        return font;
    };

    let widths = Widths::Cid {
        default: number_of(doc, descendant, b"DW").unwrap_or(DEFAULT_CID_WIDTH),
        map: descendant
            .get(b"W")
            .ok()
            .and_then(|w| resolve(doc, w).as_array().ok())
            .map(|items| cid_widths(doc, items))
            .unwrap_or_default(),
    };

    let descriptor = dict_of(doc, descendant, b"FontDescriptor");
    let outlines = descriptor
        .and_then(|d| embedded_program(doc, d))
        .and_then(|data| EmbeddedFace::parse(data, cid_glyph_map(doc, descendant)))
        .map(Outlines::Embedded)
        .unwrap_or_else(|| metrics_outlines(doc, descriptor, None));

    LoadedFont {
        name,
        font_matrix: Ctm::scale(0.001, 0.001),
        two_byte: true,
        widths,
        outlines,
    }
}

fn type3_font(doc: &lopdf::Document, dict: &Dictionary, name: String) -> LoadedFont {
    let font_matrix = dict
        .get(b"FontMatrix")
        .ok()
        .and_then(|m| number_array(doc, m))
        .and_then(|m| <[f64; 6]>::try_from(m).ok())
        .map_or(Ctm::scale(0.001, 0.001), Ctm::from_array);

    // An empty /FontBBox means glyph boxes are not clipped.
    let font_bbox = dict
        .get(b"FontBBox")
        .ok()
        .and_then(|b| number_array(doc, b))
        .and_then(|b| <[f64; 4]>::try_from(b).ok())
        .map(|[x0, y0, x1, y1]| Rect::new(x0, y0, x1, y1))
        .filter(|r| r.width() > 0.0 && r.height() > 0.0)
        .unwrap_or(Rect::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX));

    let char_procs = dict_of(doc, dict, b"CharProcs");
    let mut glyphs = HashMap::new();
    if let Some(procs) = char_procs {
        for (code, glyph_name) in encoding_differences(doc, dict) {
            let Some(stream) = procs
                .get(&glyph_name)
                .ok()
                .and_then(|o| resolve(doc, o).as_stream().ok())
            else {
                continue;
            };
            if let Some(bbox) = decode_stream(stream).ok().and_then(|b| d1_box(&b)) {
                glyphs.insert(code, bbox);
            }
        }
    }

    LoadedFont {
        name,
        font_matrix,
        two_byte: false,
        widths: Widths::Simple {
            first_char: number_of(doc, dict, b"FirstChar").map_or(0, |c| c.max(0.0) as u32),
            widths: dict
                .get(b"Widths")
                .ok()
                .and_then(|w| number_array(doc, w))
                .unwrap_or_default(),
            missing: 0.0,
        },
        outlines: Outlines::Procedural { font_bbox, glyphs },
    }
}

/// Glyph box declared by the `d1` operator of a Type 3 char proc.
/// `d0` glyphs declare no box.
fn d1_box(content: &[u8]) -> Option<Rect> {
    let content = Content::decode(content).ok()?;
    let op = content.operations.iter().find(|op| op.operator == "d1")?;
    let values: Vec<f64> = op
        .operands
        .iter()
        .map(|o| object_to_f64(o).ok())
        .collect::<Option<_>>()?;
    match values[..] {
        [_, _, llx, lly, urx, ury] => Some(Rect::new(llx, lly, urx, ury)),
        _ => None,
    }
}

/// Code to glyph name pairs of an `/Encoding` `/Differences` array.
fn encoding_differences(doc: &lopdf::Document, dict: &Dictionary) -> Vec<(u32, Vec<u8>)> {
    let Some(items) = dict_of(doc, dict, b"Encoding")
        .and_then(|enc| enc.get(b"Differences").ok())
        .and_then(|d| resolve(doc, d).as_array().ok())
    else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut code: u32 = 0;
    for item in items {
        match item {
            Object::Integer(start) => code = u32::try_from(*start).unwrap_or(0),
            Object::Name(glyph) => {
                out.push((code, glyph.clone()));
                let Some(next) = code.checked_add(1) else {
                    warn!("/Differences code overflows, rest ignored");
                    break;
                };
                code = next;
            }
            _ => {}
        }
    }
    out
}

/// Parse a CID font `/W` array: `c [w1 w2 ...]` and `c_first c_last w` runs.
fn cid_widths(doc: &lopdf::Document, items: &[Object]) -> HashMap<u32, f64> {
    let mut map = HashMap::new();
    let number = |o: &Object| object_to_f64(resolve(doc, o)).ok();
    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(&items[i]) else {
            break;
        };
        let first = first.max(0.0) as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(ws)) => {
                for (k, w) in ws.iter().enumerate() {
                    let Some(cid) = u32::try_from(k).ok().and_then(|k| first.checked_add(k)) else {
                        warn!(first, "/W run overflows the CID range, rest ignored");
                        return map;
                    };
                    if let Some(w) = number(w) {
                        map.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Ok(last), Some(w)) = (object_to_f64(last), items.get(i + 2).and_then(number))
                else {
                    break;
                };
                let last = (last.max(0.0) as u32).min(first.saturating_add(MAX_CID_RANGE));
                for cid in first..=last {
                    map.insert(cid, w);
                }
                i += 3;
            }
            None => break,
        }
    }
    map
}

fn cid_glyph_map(doc: &lopdf::Document, descendant: &Dictionary) -> GlyphMap {
    match descendant.get(b"CIDToGIDMap").map(|o| resolve(doc, o)) {
        Ok(Object::Stream(stream)) => match decode_stream(stream) {
            Ok(bytes) => GlyphMap::CidTable(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect(),
            ),
            Err(e) => {
                warn!("unreadable /CIDToGIDMap, assuming Identity: {e}");
                GlyphMap::CidIdentity
            }
        },
        _ => GlyphMap::CidIdentity,
    }
}

/// Embedded TrueType (`/FontFile2`) or OpenType (`/FontFile3` with
/// `/Subtype /OpenType`) program bytes.
fn embedded_program(doc: &lopdf::Document, descriptor: &Dictionary) -> Option<Vec<u8>> {
    let stream = match descriptor.get(b"FontFile2") {
        Ok(obj) => resolve(doc, obj).as_stream().ok()?,
        Err(_) => {
            let stream = resolve(doc, descriptor.get(b"FontFile3").ok()?)
                .as_stream()
                .ok()?;
            let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
            if subtype != b"OpenType" {
                return None;
            }
            stream
        }
    };
    match decode_stream(stream) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("failed to decode embedded font program: {e}");
            None
        }
    }
}

fn metrics_outlines(
    doc: &lopdf::Document,
    descriptor: Option<&Dictionary>,
    standard: Option<&'static StandardFont>,
) -> Outlines {
    let declared = |key: &[u8]| {
        descriptor
            .and_then(|d| number_of(doc, d, key))
            .filter(|v| *v != 0.0)
    };
    Outlines::Metrics {
        ascent: declared(b"Ascent")
            .or(standard.map(|s| f64::from(s.ascent)))
            .unwrap_or(DEFAULT_ASCENT),
        descent: declared(b"Descent")
            .or(standard.map(|s| f64::from(s.descent)))
            .unwrap_or(DEFAULT_DESCENT),
    }
}

fn name_of(doc: &lopdf::Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let name = resolve(doc, dict.get(key).ok()?).as_name().ok()?;
    Some(String::from_utf8_lossy(name).into_owned())
}

fn number_of(doc: &lopdf::Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    object_to_f64(resolve(doc, dict.get(key).ok()?)).ok()
}

fn dict_of<'a>(doc: &'a lopdf::Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    resolve(doc, dict.get(key).ok()?).as_dict().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Stream, dictionary};

    fn add_font(doc: &mut Document, font: Dictionary) -> Object {
        Object::Reference(doc.add_object(font))
    }

    #[test]
    fn standard_font_metrics_box() {
        let mut doc = Document::with_version("1.5");
        let font_obj = add_font(
            &mut doc,
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
        );
        let cache = FontCache::new();
        let font = cache.load(&doc, &font_obj);

        let outline = cache.outline_for(font, u32::from(b'A')).unwrap();
        assert_eq!(outline.kind, OutlineKind::Vector);
        assert_eq!(outline.bounds, Rect::new(0.0, -207.0, 667.0, 718.0));
        let loaded = cache.get(font).unwrap();
        assert!((loaded.advance(u32::from(b'A')) - 0.667).abs() < 1e-9);
        assert_eq!(cache.font_matrix(font), Ctm::scale(0.001, 0.001));
    }

    #[test]
    fn same_object_loads_once() {
        let mut doc = Document::with_version("1.5");
        let helv = add_font(
            &mut doc,
            dictionary! { "Subtype" => "Type1", "BaseFont" => "Helvetica" },
        );
        let times = add_font(
            &mut doc,
            dictionary! { "Subtype" => "Type1", "BaseFont" => "Times-Roman" },
        );
        let cache = FontCache::new();
        let a = cache.load(&doc, &helv);
        let b = cache.load(&doc, &helv);
        let c = cache.load(&doc, &times);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(c).unwrap().name(), "Times-Roman");
    }

    #[test]
    fn explicit_widths_and_descriptor_metrics() {
        let mut doc = Document::with_version("1.5");
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "Ascent" => 800,
            "Descent" => -200,
            "MissingWidth" => 0,
        });
        let font_obj = add_font(
            &mut doc,
            dictionary! {
                "Subtype" => "TrueType",
                "BaseFont" => "Unembedded",
                "FirstChar" => 65,
                "Widths" => vec![500.into(), 0.into()],
                "FontDescriptor" => descriptor,
            },
        );
        let cache = FontCache::new();
        let font = cache.load(&doc, &font_obj);

        let a = cache.outline_for(font, 65).unwrap();
        assert_eq!(a.bounds, Rect::new(0.0, -200.0, 500.0, 800.0));
        // zero width and codes outside /Widths draw nothing
        assert!(cache.outline_for(font, 66).is_err());
        assert!(cache.outline_for(font, 32).is_err());
    }

    #[test]
    fn type3_glyph_boxes_from_d1() {
        let mut doc = Document::with_version("1.5");
        let square = doc.add_object(Stream::new(
            dictionary! {},
            b"1000 0 0 0 750 750 d1 0 0 750 750 re f".to_vec(),
        ));
        let blank = doc.add_object(Stream::new(dictionary! {}, b"500 0 d0".to_vec()));
        let font_obj = add_font(
            &mut doc,
            dictionary! {
                "Subtype" => "Type3",
                "FontMatrix" => vec![
                    Object::Real(0.001), 0.into(), 0.into(), Object::Real(0.001), 0.into(), 0.into(),
                ],
                "FontBBox" => vec![0.into(), 0.into(), 700.into(), 1000.into()],
                "FirstChar" => 97,
                "Widths" => vec![1000.into(), 500.into()],
                "CharProcs" => dictionary! { "square" => square, "blank" => blank },
                "Encoding" => dictionary! {
                    "Differences" => vec![97.into(), Object::Name(b"square".to_vec()), Object::Name(b"blank".to_vec())],
                },
            },
        );
        let cache = FontCache::new();
        let font = cache.load(&doc, &font_obj);

        let outline = cache.outline_for(font, 97).unwrap();
        assert_eq!(outline.bounds, Rect::new(0.0, 0.0, 750.0, 750.0));
        let (clipped, _) = outline.glyph_space();
        assert_eq!(clipped, Rect::new(0.0, 0.0, 700.0, 750.0));
        assert!(cache.outline_for(font, 98).is_err());
        assert!((cache.get(font).unwrap().advance(97) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn type0_uses_two_byte_codes_and_w_array() {
        let mut doc = Document::with_version("1.5");
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 900,
            "W" => vec![
                10.into(), Object::Array(vec![100.into(), 200.into()]),
                20.into(), 25.into(), 300.into(),
            ],
        });
        let font_obj = add_font(
            &mut doc,
            dictionary! {
                "Subtype" => "Type0",
                "BaseFont" => "SomeCJK",
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![descendant.into()],
            },
        );
        let cache = FontCache::new();
        let loaded = cache.get(cache.load(&doc, &font_obj)).unwrap();

        assert!(loaded.two_byte());
        assert_eq!(loaded.codes(&[0x00, 0x0A, 0x01, 0x00]), vec![10, 256]);
        assert!((loaded.advance(11) - 0.2).abs() < 1e-9);
        assert!((loaded.advance(22) - 0.3).abs() < 1e-9);
        assert!((loaded.advance(5) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn cid_width_runs() {
        let doc = Document::with_version("1.5");
        let items: Vec<Object> = vec![
            1.into(),
            Object::Array(vec![Object::Real(250.5)]),
            3.into(),
            5.into(),
            700.into(),
        ];
        let map = cid_widths(&doc, &items);
        assert_eq!(map.get(&1), Some(&250.5));
        assert_eq!(map.get(&4), Some(&700.0));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn broken_font_resource_falls_back() {
        let doc = Document::with_version("1.5");
        let cache = FontCache::new();
        let font = cache.load(&doc, &Object::Integer(7));
        let outline = cache.outline_for(font, 65).unwrap();
        assert_eq!(outline.bounds, Rect::new(0.0, -250.0, 600.0, 750.0));
    }

    #[test]
    fn unknown_font_ref_is_unavailable() {
        let cache = FontCache::new();
        assert!(cache.is_empty());
        assert_eq!(
            cache.outline_for(FontRef(9), 65).unwrap_err(),
            CropError::FontOutlineUnavailable { font: 9, code: 65 }
        );
    }

    /// 2048 units per em; `H` is the box (100,0)-(900,1400), space is empty.
    const BOX_GLYPHS_TTF: &[u8] = include_bytes!("../tests/fixtures/box-glyphs.ttf");

    #[test]
    fn embedded_truetype_glyph_boxes() {
        let face = EmbeddedFace::parse(BOX_GLYPHS_TTF.to_vec(), GlyphMap::SimpleCmap).unwrap();
        assert_eq!(face.units_per_em, 2048);
        let h = face.glyph_box(u32::from(b'H')).unwrap();
        assert_eq!(h, Rect::new(100.0, 0.0, 900.0, 1400.0));
        // space has no outline
        assert!(face.glyph_box(32).is_none());
        // unmapped code
        assert!(face.glyph_box(u32::from(b'Q')).is_none());
        // cached second lookup agrees
        assert_eq!(face.glyph_box(u32::from(b'H')), Some(h));
    }

    #[test]
    fn embedded_font_outline_is_scaled_by_units_per_em() {
        let mut doc = Document::with_version("1.5");
        let program = doc.add_object(Stream::new(dictionary! {}, BOX_GLYPHS_TTF.to_vec()));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontFile2" => program,
        });
        let font_obj = add_font(
            &mut doc,
            dictionary! {
                "Subtype" => "TrueType",
                "BaseFont" => "BoxGlyphs",
                "FirstChar" => 32,
                "Widths" => vec![500.into()],
                "FontDescriptor" => descriptor,
            },
        );
        let cache = FontCache::new();
        let font = cache.load(&doc, &font_obj);

        let outline = cache.outline_for(font, u32::from(b'H')).unwrap();
        assert_eq!(outline.kind, OutlineKind::Scaled { units_per_em: 2048 });
        let (bounds, pre) = outline.glyph_space();
        let glyph = bounds.transform(&pre);
        assert!((glyph.min_x - 100.0 * 1000.0 / 2048.0).abs() < 1e-9);
        assert!((glyph.max_y - 1400.0 * 1000.0 / 2048.0).abs() < 1e-9);
        assert!(cache.outline_for(font, 32).is_err());
    }

    #[test]
    fn metrics_fallback_leaves_spaces_blank() {
        let mut doc = Document::with_version("1.5");
        let font_obj = add_font(
            &mut doc,
            dictionary! { "Subtype" => "Type1", "BaseFont" => "Helvetica" },
        );
        let cache = FontCache::new();
        let font = cache.load(&doc, &font_obj);

        assert!(cache.outline_for(font, 32).is_err());
        assert!(cache.outline_for(font, 0xA0).is_err());
        // still advances
        assert!(cache.get(font).unwrap().advance(32) > 0.0);
    }

    #[test]
    fn cid_width_array_at_top_of_range_stops_parsing() {
        let doc = Document::with_version("1.5");
        let items: Vec<Object> = vec![
            Object::Integer(i64::from(u32::MAX)),
            Object::Array(vec![500.into(), 600.into()]),
            1.into(),
            Object::Array(vec![700.into()]),
        ];
        let map = cid_widths(&doc, &items);
        assert_eq!(map.get(&u32::MAX), Some(&500.0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn differences_at_top_of_range_stop_parsing() {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Subtype" => "Type3",
            "Encoding" => dictionary! {
                "Differences" => vec![
                    Object::Integer(i64::from(u32::MAX)),
                    Object::Name(b"last".to_vec()),
                    Object::Name(b"overflow".to_vec()),
                ],
            },
        });
        let dict = doc.get_object(font_id).unwrap().as_dict().unwrap();
        let pairs = encoding_differences(&doc, dict);
        assert_eq!(pairs, vec![(u32::MAX, b"last".to_vec())]);
    }

    #[test]
    fn garbage_font_program_is_rejected() {
        assert!(EmbeddedFace::parse(vec![0, 1, 2, 3], GlyphMap::CidIdentity).is_none());
    }
}
