//! Converts binary PLY point clouds into a fixed vertex-only layout.
//!
//! Only the `vertex` element is read. Its scalar properties are decoded into
//! `f32` columns, projected onto a [`TargetSchema`] (by default [`SCHEME_B`],
//! the 17-float Gaussian splat layout with zeroed normals) and written back
//! as `binary_little_endian 1.0`.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use splat_convert::{project, read_vertex_table, write_vertex_table, PlyHeader, SCHEME_B};
//!
//! let mut data = b"ply
//! format binary_little_endian 1.0
//! element vertex 1
//! property float x
//! property float y
//! property float z
//! end_header
//! ".to_vec();
//! for v in [1.0f32, 2.0, 3.0] {
//!     data.extend_from_slice(&v.to_le_bytes());
//! }
//!
//! let mut reader = Cursor::new(data);
//! let header = PlyHeader::parse(&mut reader).unwrap();
//! let table = read_vertex_table(reader, &header).unwrap();
//! let out = project(&table, &SCHEME_B);
//!
//! let mut bytes = Vec::new();
//! write_vertex_table(&mut bytes, header.vertex_count, &SCHEME_B, &out).unwrap();
//! assert!(bytes.starts_with(b"ply\nformat binary_little_endian 1.0\nelement vertex 1\n"));
//! ```

pub mod de;
pub mod ser;

mod convert;
mod error;
mod header;
mod scalar;
mod schema;
mod table;

pub use convert::{
    convert, convert_with_options, print_summary, summarize, ConversionReport, ConvertOptions,
    HeaderSummary, WriteMode,
};
pub use de::{read_vertex_table, read_vertex_table_at};
pub use error::PlyError;
pub use header::{PlyHeader, PrecedingElement, PropertyDef};
pub use scalar::{row_width, PlyFormat, ScalarType};
pub use schema::{project, TargetField, TargetSchema, ZeroPolicy, SCHEME_B};
pub use ser::{header_text, validate_columns, write_vertex_table};
pub use table::VertexTable;
