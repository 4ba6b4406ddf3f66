//! ZIP container abstraction for OOXML packages.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Decode an XML part to a string.
///
/// A UTF-8 byte order mark is stripped. Other encodings are rejected: byte
/// offsets into the decoded text are used to splice the part back together,
/// so the text must be the part's exact UTF-8 content.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// OOXML container over a ZIP archive.
///
/// Reads XML parts and writes a copy of the package with selected parts
/// replaced.
pub struct OoxmlContainer {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wordlens::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("document.docx")?;
    /// # Ok::<(), wordlens::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part from the archive as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Write a copy of the package with the given parts replaced.
    ///
    /// Untouched entries are copied without recompression. Entry order is
    /// preserved.
    pub fn rewrite(&self, replacements: &HashMap<String, Vec<u8>>) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            match replacements.get(file.name()) {
                Some(data) => {
                    let name = file.name().to_string();
                    drop(file);
                    writer.start_file(name, options)?;
                    writer.write_all(data)?;
                }
                None => writer.raw_copy_file(file)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_xml_strips_bom() {
        let bom_xml = format!("\u{feff}{}", "<a/>");
        let container = OoxmlContainer::from_bytes(package(&[("part.xml", &bom_xml)])).unwrap();
        assert_eq!(container.read_xml("part.xml").unwrap(), "<a/>");
        assert!(container.exists("part.xml"));
        assert!(matches!(
            container.read_xml("missing.xml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_rewrite_replaces_only_named_parts() {
        let data = package(&[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        let mut replacements = HashMap::new();
        replacements.insert("b.xml".to_string(), b"<b>new</b>".to_vec());
        let rewritten = OoxmlContainer::from_bytes(container.rewrite(&replacements).unwrap()).unwrap();

        assert_eq!(rewritten.list_files(), vec!["a.xml", "b.xml"]);
        assert_eq!(rewritten.read_xml("a.xml").unwrap(), "<a/>");
        assert_eq!(rewritten.read_xml("b.xml").unwrap(), "<b>new</b>");
    }

    #[test]
    fn test_invalid_archive() {
        assert!(matches!(
            OoxmlContainer::from_bytes(b"not a zip".to_vec()),
            Err(Error::ZipArchive(_))
        ));
    }
}
