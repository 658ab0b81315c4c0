use core::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a PLY file: first line is {found:?}")]
    NotPlyFile { found: String },

    #[error("Invalid format line in header: {line:?}")]
    InvalidFormatLine { line: String },

    #[error("Truncated PLY header: {reason}")]
    TruncatedHeader { reason: String },

    #[error("No vertex element found in header")]
    MissingVertexElement,

    #[error("Vertex element declared more than once: {line:?}")]
    DuplicateVertexElement { line: String },

    #[error("List properties are not supported for vertex. Found: {line:?}")]
    UnsupportedListProperty { line: String },

    #[error("Invalid header line: {line:?}")]
    InvalidHeaderLine { line: String },

    #[error("Unsupported PLY format for binary parsing: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported PLY scalar type: {0}")]
    UnsupportedScalarType(String),

    #[error("Elements declared before vertex, payload offsets would be misread: {names:?}")]
    PrecedingElements { names: Vec<String> },

    #[error(
        "Unexpected EOF while reading vertex data at {row}/{vertex_count}: \
         expected {expected} bytes, got {actual}"
    )]
    TruncatedVertexData {
        row: usize,
        vertex_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Missing column for output: {0}")]
    MissingColumn(String),

    #[error("Column {name} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Serde error: {0}")]
    Serde(String),
}

impl serde::de::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}

impl serde::ser::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}
