use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{PlyError, PlyFormat};

/// A scalar property of the vertex element, in on-disk order.
///
/// The type token is kept exactly as written; it is resolved against
/// [`ScalarType`](crate::ScalarType) when a row layout is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub type_token: String,
    pub name: String,
}

impl PropertyDef {
    pub fn new(type_token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_token: type_token.into(),
            name: name.into(),
        }
    }
}

/// An element declared ahead of `vertex`. Its rows would sit in front of the
/// vertex payload, which this reader does not skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedingElement {
    pub name: String,
    pub count: usize,
}

/// Parsed PLY header, restricted to what the vertex converter needs.
#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub format: String,
    pub version: String,
    pub vertex_count: usize,
    pub vertex_properties: Vec<PropertyDef>,
    pub comments: Vec<String>,
    pub header_lines: Vec<String>,
    pub preceding_elements: Vec<PrecedingElement>,
    pub data_start_offset: u64,
}

struct HeaderLines<R> {
    reader: R,
    buf: Vec<u8>,
    bytes_read: u64,
}

impl<R: BufRead> HeaderLines<R> {
    fn next_line(&mut self) -> Result<String, PlyError> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Err(PlyError::TruncatedHeader {
                reason: "unexpected end of file before end_header".to_string(),
            });
        }
        let line_start = self.bytes_read;
        self.bytes_read += n as u64;

        if !self.buf.is_ascii() {
            return Err(PlyError::TruncatedHeader {
                reason: format!("non-ASCII bytes in header line at offset {line_start}"),
            });
        }
        let line = String::from_utf8_lossy(&self.buf);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn parse_format_line(line: &str) -> Result<(String, String), PlyError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["format", fmt, version] => Ok((fmt.to_string(), version.to_string())),
        _ => Err(PlyError::InvalidFormatLine {
            line: line.to_string(),
        }),
    }
}

/// Header state after the `format` line: which element is open and what the
/// vertex element has declared so far.
#[derive(Default)]
struct VertexScan {
    in_vertex: bool,
    vertex_count: Option<usize>,
    properties: Vec<PropertyDef>,
    comments: Vec<String>,
    preceding_elements: Vec<PrecedingElement>,
}

impl VertexScan {
    fn consume(&mut self, line: &str) -> Result<(), PlyError> {
        let invalid = || PlyError::InvalidHeaderLine {
            line: line.to_string(),
        };
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.first().copied() {
            Some("comment") => {
                self.comments.push(parts[1..].join(" "));
            }
            Some("element") => {
                let [_, name, count] = parts.as_slice() else {
                    return Err(invalid());
                };
                let count = count.parse::<usize>().map_err(|_| invalid())?;

                self.in_vertex = *name == "vertex";
                if self.in_vertex {
                    if self.vertex_count.is_some() {
                        return Err(PlyError::DuplicateVertexElement {
                            line: line.to_string(),
                        });
                    }
                    self.vertex_count = Some(count);
                } else if self.vertex_count.is_none() {
                    self.preceding_elements.push(PrecedingElement {
                        name: name.to_string(),
                        count,
                    });
                }
            }
            Some("property") if self.in_vertex => match parts.as_slice() {
                [_, "list", ..] => {
                    return Err(PlyError::UnsupportedListProperty {
                        line: line.to_string(),
                    });
                }
                [_, type_token, name] => {
                    self.properties.push(PropertyDef::new(*type_token, *name));
                }
                _ => return Err(invalid()),
            },
            // Properties of other elements, obj_info and blank lines.
            _ => {}
        }
        Ok(())
    }
}

impl PlyHeader {
    /// Parse the header from a buffered stream.
    ///
    /// On success the stream is positioned at `data_start_offset`, the first
    /// byte after the `end_header` line.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, PlyError> {
        let mut lines = HeaderLines {
            reader,
            buf: Vec::new(),
            bytes_read: 0,
        };
        let mut header_lines = Vec::new();

        let first = lines.next_line()?;
        if first != "ply" {
            return Err(PlyError::NotPlyFile { found: first });
        }
        header_lines.push(first);

        let format_line = lines.next_line()?;
        let (format, version) = parse_format_line(&format_line)?;
        header_lines.push(format_line);

        let mut scan = VertexScan::default();
        loop {
            let line = lines.next_line()?;
            if line.trim() == "end_header" {
                header_lines.push(line);
                break;
            }
            scan.consume(&line)?;
            header_lines.push(line);
        }

        let vertex_count = scan.vertex_count.ok_or(PlyError::MissingVertexElement)?;

        let header = PlyHeader {
            format,
            version,
            vertex_count,
            vertex_properties: scan.properties,
            comments: scan.comments,
            header_lines,
            preceding_elements: scan.preceding_elements,
            data_start_offset: lines.bytes_read,
        };
        tracing::debug!(
            format = %header.format,
            vertex_count = header.vertex_count,
            properties = header.vertex_properties.len(),
            data_start_offset = header.data_start_offset,
            "parsed PLY header"
        );
        Ok(header)
    }

    /// Open `path` and parse its header.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlyError> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    /// Resolve the format token into a binary byte order.
    pub fn binary_format(&self) -> Result<PlyFormat, PlyError> {
        PlyFormat::parse(&self.format)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.vertex_properties.iter().map(|p| p.name.as_str())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property_names().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn parse(text: &[u8]) -> Result<PlyHeader, PlyError> {
        PlyHeader::parse(Cursor::new(text))
    }

    #[test]
    fn test_parse_simple_header() {
        let header_text = b"ply
format binary_little_endian 1.0
comment exported by a splat trainer
element vertex 3
property float x
property float y
property float z
property uchar red
element face 1
property list uchar int vertex_indices
end_header
";

        let header = parse(header_text).unwrap();

        assert_eq!(header.format, "binary_little_endian");
        assert_eq!(header.version, "1.0");
        assert_eq!(header.vertex_count, 3);
        assert_eq!(header.comments, vec!["exported by a splat trainer"]);
        assert_eq!(
            header.vertex_properties,
            vec![
                PropertyDef::new("float", "x"),
                PropertyDef::new("float", "y"),
                PropertyDef::new("float", "z"),
                PropertyDef::new("uchar", "red"),
            ]
        );
        assert_eq!(header.data_start_offset, header_text.len() as u64);
        assert_eq!(header.header_lines.len(), 11);
        assert!(header.preceding_elements.is_empty());
        assert_eq!(header.binary_format().unwrap(), PlyFormat::BinaryLittleEndian);
        assert!(header.has_property("red"));
        assert!(!header.has_property("vertex_indices"));
    }

    #[test]
    fn test_stream_left_at_payload() {
        let mut data = b"ply\r\nformat binary_big_endian 1.0\r\nelement vertex 1\r\nproperty uchar a\r\nend_header\r\n".to_vec();
        let header_len = data.len() as u64;
        data.extend_from_slice(&[7, 8, 9]);

        let mut cursor = Cursor::new(data);
        let header = PlyHeader::parse(&mut cursor).unwrap();
        assert_eq!(header.data_start_offset, header_len);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![7, 8, 9]);
    }

    #[test]
    fn test_not_ply() {
        let err = parse(b"plyx\nformat binary_little_endian 1.0\n").unwrap_err();
        assert!(matches!(err, PlyError::NotPlyFile { found } if found == "plyx"));
    }

    #[test]
    fn test_invalid_format_line() {
        for text in [
            &b"ply\nformat binary_little_endian\nend_header\n"[..],
            b"ply\nformat binary_little_endian 1.0 extra\nend_header\n",
            b"ply\nelement vertex 1\nend_header\n",
        ] {
            let err = parse(text).unwrap_err();
            assert!(matches!(err, PlyError::InvalidFormatLine { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_ascii_format_is_parsed_but_not_binary() {
        let header =
            parse(b"ply\nformat ascii 1.0\nelement vertex 0\nend_header\n").unwrap();
        assert!(matches!(
            header.binary_format(),
            Err(PlyError::UnsupportedFormat(f)) if f == "ascii"
        ));
    }

    #[test]
    fn test_truncated_header() {
        let err = parse(b"ply\nformat binary_little_endian 1.0\nelement vertex 2\n").unwrap_err();
        assert!(matches!(err, PlyError::TruncatedHeader { .. }));

        let err = parse(b"").unwrap_err();
        assert!(matches!(err, PlyError::TruncatedHeader { .. }));

        let err = parse(b"ply\nformat binary_little_endian 1.0\ncomment caf\xc3\xa9\nend_header\n")
            .unwrap_err();
        match err {
            PlyError::TruncatedHeader { reason } => {
                assert!(reason.ends_with("at offset 36"), "{reason}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_vertex_element() {
        let err = parse(
            b"ply\nformat binary_little_endian 1.0\nelement face 2\nproperty list uchar int idx\nend_header\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlyError::MissingVertexElement));
    }

    #[test]
    fn test_list_property_in_vertex() {
        let err = parse(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nproperty list uchar float f_rest\nend_header\n",
        )
        .unwrap_err();
        match err {
            PlyError::UnsupportedListProperty { line } => {
                assert_eq!(line, "property list uchar float f_rest")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_elements_not_collected() {
        let header = parse(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nelement extra 4\nproperty float x_extra\nend_header\n",
        )
        .unwrap();
        assert_eq!(header.vertex_count, 1);
        assert_eq!(header.vertex_properties, vec![PropertyDef::new("float", "x")]);
        assert!(header.preceding_elements.is_empty());
    }

    #[test]
    fn test_preceding_elements_flagged() {
        let header = parse(
            b"ply\nformat binary_little_endian 1.0\nelement camera 2\nproperty float fov\nelement vertex 1\nproperty float x\nend_header\n",
        )
        .unwrap();
        assert_eq!(
            header.preceding_elements,
            vec![PrecedingElement {
                name: "camera".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_malformed_element_and_property_lines() {
        let err = parse(b"ply\nformat binary_little_endian 1.0\nelement vertex\nend_header\n")
            .unwrap_err();
        assert!(matches!(err, PlyError::InvalidHeaderLine { .. }));

        let err = parse(b"ply\nformat binary_little_endian 1.0\nelement vertex -1\nend_header\n")
            .unwrap_err();
        assert!(matches!(err, PlyError::InvalidHeaderLine { .. }));

        let err = parse(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float\nend_header\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlyError::InvalidHeaderLine { .. }));
    }

    #[test]
    fn test_duplicate_vertex_element() {
        let err = parse(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nelement vertex 2\nend_header\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlyError::DuplicateVertexElement { .. }));
    }
}
