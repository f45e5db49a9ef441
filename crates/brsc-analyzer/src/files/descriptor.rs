//! Component descriptor file model.
//!
//! A descriptor is an XML manifest: a root `<component>` element with a
//! `name` and optional `extends` attribute, and `<script uri="pkg:/..."/>`
//! children. Corruption at the level of the root tag is unrecoverable and
//! aborts the enclosing batch; anything below that surfaces as diagnostics.

use crate::error::EngineError;
use brsc_ast::{catalog, Diagnostic, PkgPath, Position, Range};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// A script-import reference from a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    /// Normalized package path (case preserved).
    pub pkg_path: PkgPath,
    /// Range of the uri attribute value in the descriptor.
    pub range: Range,
}

/// A parsed component descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorFile {
    pub path_absolute: PathBuf,
    pub pkg_path: PkgPath,
    pub component_name: String,
    pub parent_name: Option<String>,
    /// Range of the `extends` attribute value; zero when absent.
    pub parent_name_range: Range,
    pub script_imports: Vec<FileReference>,
    pub diagnostics: Vec<Diagnostic>,
    /// Absolute path of the resolved parent descriptor, when linked.
    parent: Option<PathBuf>,
}

impl DescriptorFile {
    /// Parse a descriptor. Returns an [`EngineError`] when the XML is not
    /// well-formed at the root-tag level, the root element is not
    /// `component`, or the component carries no name.
    pub fn parse(
        path_absolute: impl Into<PathBuf>,
        pkg_path: PkgPath,
        text: &str,
    ) -> Result<Self, EngineError> {
        let path_absolute = path_absolute.into();
        let corrupt = |message: String| EngineError::CorruptDescriptor {
            path: path_absolute.clone(),
            message,
        };

        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let index = LineIndex::new(text);
        let mut reader = Reader::from_str(text);

        let mut component_name: Option<String> = None;
        let mut parent_name: Option<String> = None;
        let mut parent_name_range = Range::zero();
        let mut script_imports = Vec::new();
        let mut diagnostics = Vec::new();
        let mut saw_root = false;
        // Byte cursor for locating attribute values in the raw text
        let mut cursor = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                    let tag = element.name();
                    let tag = String::from_utf8_lossy(tag.as_ref()).to_string();
                    if !saw_root {
                        if !tag.eq_ignore_ascii_case("component") {
                            return Err(corrupt(format!(
                                "expected root element 'component', found '{}'",
                                tag
                            )));
                        }
                        saw_root = true;
                        cursor = text.find("<").unwrap_or(0);
                        let (name, extends) =
                            read_component_attributes(&element, text, &index, &mut cursor)
                                .map_err(corrupt)?;
                        component_name =
                            Some(name.ok_or_else(|| {
                                corrupt("component element has no 'name' attribute".to_string())
                            })?);
                        if let Some((value, range)) = extends {
                            parent_name = Some(value);
                            parent_name_range = range;
                        }
                    } else if tag.eq_ignore_ascii_case("script") {
                        let tag_start = text[cursor..]
                            .find("<script")
                            .map(|at| cursor + at)
                            .unwrap_or(cursor);
                        cursor = tag_start;
                        let reference =
                            read_script_reference(&element, text, &index, &mut cursor, tag_start);
                        script_imports.push(reference);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    if !saw_root {
                        return Err(corrupt(err.to_string()));
                    }
                    let position = index.position(reader.buffer_position() as usize);
                    diagnostics.push(
                        catalog::syntax_error(format!("malformed descriptor XML: {}", err))
                            .at(Range::new(position, position))
                            .in_file(&path_absolute),
                    );
                    break;
                }
            }
        }

        let component_name =
            component_name.ok_or_else(|| corrupt("no root element found".to_string()))?;

        Ok(Self {
            path_absolute,
            pkg_path,
            component_name,
            parent_name,
            parent_name_range,
            script_imports,
            diagnostics,
            parent: None,
        })
    }

    /// The resolved parent descriptor's absolute path, when linked.
    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// True when the descriptor names a parent component, linked or not.
    pub fn wants_parent(&self) -> bool {
        self.parent_name.is_some()
    }

    /// Link the resolved parent. Returns true when the pointer changed.
    pub fn attach_parent(&mut self, parent: impl Into<PathBuf>) -> bool {
        let parent = parent.into();
        if self.parent.as_ref() == Some(&parent) {
            return false;
        }
        self.parent = Some(parent);
        true
    }

    /// Drop the resolved parent. Returns true when a parent was linked.
    pub fn detach_parent(&mut self) -> bool {
        self.parent.take().is_some()
    }
}

/// Read `name` and `extends` from the component element, resolving the
/// range of the `extends` value.
#[allow(clippy::type_complexity)]
fn read_component_attributes(
    element: &BytesStart<'_>,
    text: &str,
    index: &LineIndex,
    cursor: &mut usize,
) -> Result<(Option<String>, Option<(String, Range)>), String> {
    let mut name = None;
    let mut extends = None;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let value = String::from_utf8_lossy(&attribute.value).to_string();
        match attribute.key.as_ref() {
            b"name" => {
                let _ = value_range(text, index, cursor, &value);
                name = Some(value);
            }
            b"extends" => {
                let range = value_range(text, index, cursor, &value).unwrap_or_default();
                extends = Some((value, range));
            }
            _ => {}
        }
    }
    Ok((name, extends))
}

/// Read the `uri` attribute of a script element. A script tag with no uri
/// (or an unreadable one) yields an empty reference at the tag position so
/// the scope validator can flag it.
fn read_script_reference(
    element: &BytesStart<'_>,
    text: &str,
    index: &LineIndex,
    cursor: &mut usize,
    tag_start: usize,
) -> FileReference {
    for attribute in element.attributes().flatten() {
        if attribute.key.as_ref() == b"uri" {
            let value = String::from_utf8_lossy(&attribute.value).to_string();
            let range = value_range(text, index, cursor, &value).unwrap_or_default();
            return FileReference {
                pkg_path: PkgPath::new(&value),
                range,
            };
        }
    }
    let position = index.position(tag_start);
    FileReference {
        pkg_path: PkgPath::new(""),
        range: Range::new(position, position),
    }
}

/// Locate the next quoted occurrence of `value` at or after the cursor and
/// return the range of the value (quotes excluded), advancing the cursor.
fn value_range(text: &str, index: &LineIndex, cursor: &mut usize, value: &str) -> Option<Range> {
    let needle = format!("\"{}\"", value);
    let at = text[*cursor..].find(&needle)? + *cursor;
    let start = at + 1;
    let end = start + value.len();
    *cursor = end + 1;
    Some(Range::new(index.position(start), index.position(end)))
}

/// Byte-offset to line/character conversion.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Position::new(line as u32, (offset - self.line_starts[line]) as u32)
    }
}
