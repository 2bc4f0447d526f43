// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX page renderer: pulls the embedded pictures out of a .docx package
// and materialises each distinct, decodable one in the page cache.
//
// Picture order: relationships referenced from word/document.xml in order of
// first reference, then unreferenced image relationships in .rels order, then
// any remaining parts under word/media/.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::{Locator, PageImageSet};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

use crate::cache::PageCache;
use crate::image::codec::probe_dimensions;
use crate::integrity::{Fingerprint, fingerprint};

const CACHE_PREFIX: &str = "docx_img";
const FALLBACK_EXTENSION: &str = "bin";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const MEDIA_PREFIX: &str = "word/media/";
const IMAGE_RELATIONSHIP_SUFFIX: &str = "/relationships/image";

type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Extension for a picture content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some("bmp"),
        _ => None,
    }
}

/// Extracts embedded pictures from DOCX packages.
#[derive(Debug, Clone)]
pub struct DocxImageExtractor {
    cache: PageCache,
}

impl DocxImageExtractor {
    /// Extractor materialising pictures into `cache`.
    pub fn new(cache: PageCache) -> Self {
        Self { cache }
    }

    /// Extract the pictures of the DOCX at `locator`; empty when the file
    /// cannot be read or is not a zip package.
    #[instrument(skip(self), fields(locator = %locator))]
    pub fn render(&self, locator: &Locator) -> PageImageSet {
        let data = match std::fs::read(locator.as_path()) {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "Cannot read DOCX");
                return PageImageSet::new();
            }
        };
        self.render_bytes(&data).unwrap_or_else(|err| {
            warn!(error = %err, "Cannot open DOCX");
            PageImageSet::new()
        })
    }

    /// Extract the pictures of an in-memory DOCX package.
    #[instrument(skip(self, data), fields(bytes_len = data.len()))]
    pub fn render_bytes(&self, data: &[u8]) -> Result<PageImageSet> {
        let mut package = ZipArchive::new(Cursor::new(data))
            .map_err(|err| ScanshelfError::Docx(format!("not a DOCX package: {err}")))?;

        let content_types = ContentTypes::read(&mut package);
        let parts = picture_parts(&mut package);
        debug!(candidates = parts.len(), "Picture parts located");

        let mut set = PageImageSet::new();
        let mut emitted: HashSet<Fingerprint> = HashSet::new();

        for (index, part) in parts.iter().enumerate() {
            let bytes = match read_part(&mut package, part) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(index, part, error = %err, "Picture part unreadable");
                    set.skip(index, err.to_string());
                    continue;
                }
            };

            let digest = fingerprint(&bytes);
            if emitted.contains(&digest) {
                debug!(index, part, "Duplicate picture skipped");
                continue;
            }

            let extension = part_extension(part)
                .or_else(|| content_types.lookup(part).and_then(extension_for_content_type))
                .unwrap_or(FALLBACK_EXTENSION);

            match self.materialise(index, extension, &bytes) {
                Ok(locator) => {
                    emitted.insert(digest);
                    set.pages.push(locator);
                }
                Err(err) => {
                    warn!(index, part, error = %err, "Picture skipped");
                    set.skip(index, err.to_string());
                }
            }
        }

        info!(
            pictures = set.len(),
            skipped = set.skipped.len(),
            "DOCX pictures extracted"
        );
        Ok(set)
    }

    /// Write to the cache, then check the file is a decodable raster.
    fn materialise(&self, index: usize, extension: &str, bytes: &[u8]) -> Result<Locator> {
        let locator = self.cache.store(CACHE_PREFIX, index, extension, bytes)?;
        if let Err(err) = probe_dimensions(bytes) {
            if let Err(remove_err) = std::fs::remove_file(locator.as_path()) {
                debug!(error = %remove_err, "Could not remove rejected picture");
            }
            return Err(err);
        }
        Ok(locator)
    }
}

// -- Package structure --------------------------------------------------------

fn read_part(package: &mut Package<'_>, name: &str) -> Result<Vec<u8>> {
    let mut entry = package
        .by_name(name)
        .map_err(|err| ScanshelfError::Docx(format!("{name}: {err}")))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Lower-cased extension of a part name, if it maps to a known picture type.
fn part_extension(part: &str) -> Option<&'static str> {
    let (_, extension) = part.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" | "jpe" => Some("jpg"),
        "gif" => Some("gif"),
        "bmp" => Some("bmp"),
        "tif" | "tiff" => Some("tiff"),
        "webp" => Some("webp"),
        _ => None,
    }
}

/// `[Content_Types].xml`: per-extension defaults and per-part overrides.
#[derive(Debug, Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn read(package: &mut Package<'_>) -> Self {
        let mut types = Self::default();
        let Ok(xml) = read_part(package, CONTENT_TYPES_PART) else {
            warn!("Package has no [Content_Types].xml");
            return types;
        };

        for_each_element(&xml, |name, attrs| match name {
            b"Default" => {
                if let (Some(ext), Some(ty)) = (attrs.get("Extension"), attrs.get("ContentType")) {
                    types
                        .defaults
                        .insert(ext.to_ascii_lowercase(), ty.clone());
                }
            }
            b"Override" => {
                if let (Some(part), Some(ty)) = (attrs.get("PartName"), attrs.get("ContentType")) {
                    types
                        .overrides
                        .insert(part.trim_start_matches('/').to_string(), ty.clone());
                }
            }
            _ => {}
        });
        types
    }

    fn lookup(&self, part: &str) -> Option<&str> {
        if let Some(ty) = self.overrides.get(part) {
            return Some(ty);
        }
        let (_, extension) = part.rsplit_once('.')?;
        self.defaults
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Ordered, de-duplicated list of picture part names.
fn picture_parts(package: &mut Package<'_>) -> Vec<String> {
    let relationships = image_relationships(package);
    let referenced = referenced_relationship_ids(package);

    let mut ordered: Vec<String> = Vec::new();
    let mut push = |part: &str| {
        if !ordered.iter().any(|existing| existing == part) {
            ordered.push(part.to_string());
        }
    };

    for id in &referenced {
        if let Some((_, target)) = relationships.iter().find(|(rel_id, _)| rel_id == id) {
            push(target);
        }
    }
    for (_, target) in &relationships {
        push(target);
    }

    let media: Vec<String> = package
        .file_names()
        .filter(|name| name.starts_with(MEDIA_PREFIX) && !name.ends_with('/'))
        .map(str::to_string)
        .collect();
    for name in &media {
        push(name);
    }

    ordered
}

/// `(relationship id, part name)` for every internal image relationship of
/// the main document, in .rels order.
fn image_relationships(package: &mut Package<'_>) -> Vec<(String, String)> {
    let Ok(xml) = read_part(package, DOCUMENT_RELS_PART) else {
        debug!("Document has no relationships part");
        return Vec::new();
    };

    let mut relationships = Vec::new();
    for_each_element(&xml, |name, attrs| {
        if name != b"Relationship" {
            return;
        }
        let is_image = attrs
            .get("Type")
            .is_some_and(|ty| ty.ends_with(IMAGE_RELATIONSHIP_SUFFIX));
        let is_external = attrs
            .get("TargetMode")
            .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
        if let (true, false, Some(id), Some(target)) =
            (is_image, is_external, attrs.get("Id"), attrs.get("Target"))
        {
            relationships.push((id.clone(), resolve_target("word", target)));
        }
    });
    relationships
}

/// Relationship ids of pictures drawn in the document body, in order.
fn referenced_relationship_ids(package: &mut Package<'_>) -> Vec<String> {
    let Ok(xml) = read_part(package, DOCUMENT_PART) else {
        warn!("Package has no word/document.xml");
        return Vec::new();
    };

    let mut ids = Vec::new();
    for_each_element(&xml, |name, attrs| {
        let id = match name {
            // DrawingML: <a:blip r:embed="rId5"/>
            b"blip" => attrs.get("embed"),
            // VML: <v:imagedata r:id="rId6"/>
            b"imagedata" => attrs.get("id"),
            _ => None,
        };
        if let Some(id) = id {
            ids.push(id.clone());
        }
    });
    ids
}

/// Resolve a relationship target relative to the source part's folder.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Call `visit` with the local name and local-named attributes of every
/// start or empty element. Parsing stops quietly at the first XML error.
fn for_each_element<F>(xml: &[u8], mut visit: F)
where
    F: FnMut(&[u8], &HashMap<String, String>),
{
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                let attrs: HashMap<String, String> = element
                    .attributes()
                    .flatten()
                    .map(|attr| {
                        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        (key, value)
                    })
                    .collect();
                visit(element.local_name().as_ref(), &attrs);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!(error = %err, "XML parse error");
                break;
            }
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::image::codec::tests::solid_png;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Zip `parts` into a package.
    pub(crate) fn package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start part");
            writer.write_all(bytes).expect("write part");
        }
        writer.finish().expect("finish").into_inner()
    }

    const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/media/blob" ContentType="image/png"/>
</Types>"#;

    const RELS: &[u8] = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/first.png"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/second.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/copy.png"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/broken.png"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="http://example.invalid/x.png" TargetMode="External"/>
</Relationships>"#;

    const DOCUMENT: &[u8] = br#"<?xml version="1.0"?>
<w:document xmlns:w="w" xmlns:a="a" xmlns:r="r" xmlns:v="v">
  <w:body>
    <w:p><w:r><a:blip r:embed="rId2"/></w:r></w:p>
    <w:p><w:r><v:imagedata r:id="rId1"/></w:r></w:p>
    <w:p><w:r><a:blip r:embed="rId2"/></w:r></w:p>
  </w:body>
</w:document>"#;

    fn extractor(dir: &std::path::Path) -> DocxImageExtractor {
        DocxImageExtractor::new(PageCache::new(dir.join("cache")))
    }

    fn sample_docx() -> Vec<u8> {
        let first = solid_png(10, 20);
        let second = solid_png(30, 10);
        let blob = solid_png(7, 7);
        package(&[
            (CONTENT_TYPES_PART, CONTENT_TYPES),
            (DOCUMENT_RELS_PART, RELS),
            (DOCUMENT_PART, DOCUMENT),
            ("word/media/first.png", first.as_slice()),
            ("word/media/second.png", second.as_slice()),
            ("word/media/copy.png", first.as_slice()),
            ("word/media/broken.png", &b"corrupt picture"[..]),
            ("word/media/blob", blob.as_slice()),
        ])
    }

    #[test]
    fn pictures_follow_document_order_without_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = extractor(dir.path()).render_bytes(&sample_docx()).expect("extract");

        let dims: Vec<(u32, u32)> = set
            .pages
            .iter()
            .map(|page| probe_dimensions(&std::fs::read(page.as_path()).expect("read")).expect("probe"))
            .collect();
        // second (referenced first), first, copy is a duplicate of first,
        // broken fails validation, blob comes from word/media.
        assert_eq!(dims, vec![(30, 10), (10, 20), (7, 7)]);
        assert_eq!(set.skipped.len(), 1);
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = extractor(dir.path()).render_bytes(&sample_docx()).expect("extract");
        let last = set.pages.last().expect("blob emitted");
        assert_eq!(
            last.as_path().extension().and_then(|e| e.to_str()),
            Some("png")
        );
    }

    #[test]
    fn rejected_pictures_leave_no_cache_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = extractor(dir.path()).render_bytes(&sample_docx()).expect("extract");
        let files = std::fs::read_dir(dir.path().join("cache")).expect("cache").count();
        assert_eq!(files, set.len());
    }

    #[test]
    fn non_zip_input_yields_empty_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain text").expect("write");
        assert!(extractor(dir.path()).render(&Locator::from_path(path)).is_empty());
    }

    #[test]
    fn content_type_table() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for_content_type("image/x-bmp"), Some("bmp"));
        assert_eq!(extension_for_content_type("image/x-emf"), None);
    }

    #[test]
    fn targets_resolve_against_word_folder() {
        assert_eq!(resolve_target("word", "media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("word", "../media/a.png"), "media/a.png");
        assert_eq!(resolve_target("word", "/word/media/b.png"), "word/media/b.png");
    }
}
