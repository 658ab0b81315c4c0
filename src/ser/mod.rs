mod row;

pub mod val_writer;

use std::io::Write;

use byteorder::LittleEndian;
use serde::Serialize;

use crate::ser::row::{OutputRow, RowSerializer};
use crate::ser::val_writer::BinValWriter;
use crate::{PlyError, TargetSchema, VertexTable};

/// Check that `table` holds every schema column with exactly `vertex_count`
/// rows.
pub fn validate_columns(
    vertex_count: usize,
    schema: &TargetSchema,
    table: &VertexTable,
) -> Result<(), PlyError> {
    for name in schema.names() {
        let column = table
            .column(name)
            .ok_or_else(|| PlyError::MissingColumn(name.to_string()))?;
        if column.len() != vertex_count {
            return Err(PlyError::RowCountMismatch {
                name: name.to_string(),
                expected: vertex_count,
                actual: column.len(),
            });
        }
    }
    Ok(())
}

/// The ASCII header for a vertex-only `binary_little_endian 1.0` file.
pub fn header_text(vertex_count: usize, schema: &TargetSchema) -> String {
    let mut lines = vec![
        "ply".to_string(),
        "format binary_little_endian 1.0".to_string(),
        format!("element vertex {vertex_count}"),
    ];
    for field in schema.fields {
        lines.push(format!("property {} {}", field.data_type, field.name));
    }
    lines.push("end_header".to_string());

    let mut header = lines.join("\n");
    header.push('\n');
    header
}

/// Write a vertex-only binary little-endian PLY file.
///
/// Columns are validated before anything is written. Rows follow the header
/// directly, fields in schema order with no padding.
pub fn write_vertex_table<W: Write>(
    mut writer: W,
    vertex_count: usize,
    schema: &TargetSchema,
    table: &VertexTable,
) -> Result<(), PlyError> {
    validate_columns(vertex_count, schema, table)?;

    let columns = schema
        .names()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| PlyError::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    writer.write_all(header_text(vertex_count, schema).as_bytes())?;

    let mut ser = RowSerializer::new(
        BinValWriter::<_, LittleEndian>::new(&mut writer),
        schema.fields,
    );
    for index in 0..vertex_count {
        OutputRow {
            fields: schema.fields,
            columns: &columns,
            index,
        }
        .serialize(&mut ser)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCHEME_B;

    fn full_table(vertex_count: usize) -> VertexTable {
        VertexTable::from_columns(
            vertex_count,
            SCHEME_B
                .names()
                .enumerate()
                .map(|(i, name)| (name, vec![i as f32; vertex_count])),
        )
    }

    #[test]
    fn test_header_text() {
        let text = header_text(3, &SCHEME_B);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], "ply");
        assert_eq!(lines[1], "format binary_little_endian 1.0");
        assert_eq!(lines[2], "element vertex 3");
        assert_eq!(lines[3], "property float x");
        assert_eq!(lines[19], "property float rot_3");
        assert_eq!(lines[20], "end_header");
        assert!(text.ends_with("end_header\n"));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_payload_layout() {
        let mut buf = Vec::new();
        write_vertex_table(&mut buf, 2, &SCHEME_B, &full_table(2)).unwrap();

        let header_len = header_text(2, &SCHEME_B).len();
        assert_eq!(buf.len(), header_len + 2 * 68);

        let payload = &buf[header_len..];
        for row in 0..2 {
            for field in 0..17 {
                let at = row * 68 + field * 4;
                let value = f32::from_le_bytes(payload[at..at + 4].try_into().unwrap());
                assert_eq!(value, field as f32);
            }
        }
    }

    #[test]
    fn test_missing_column_writes_nothing() {
        let table = VertexTable::from_columns(
            1,
            SCHEME_B
                .names()
                .filter(|n| *n != "opacity")
                .map(|n| (n, vec![0.0])),
        );

        let mut buf = Vec::new();
        let err = write_vertex_table(&mut buf, 1, &SCHEME_B, &table).unwrap_err();
        assert!(matches!(err, PlyError::MissingColumn(name) if name == "opacity"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_row_count_mismatch_writes_nothing() {
        let mut table = full_table(2);
        table.insert_column("scale_1", vec![1.0]);

        let mut buf = Vec::new();
        match write_vertex_table(&mut buf, 2, &SCHEME_B, &table).unwrap_err() {
            PlyError::RowCountMismatch {
                name,
                expected,
                actual,
            } => assert_eq!((name.as_str(), expected, actual), ("scale_1", 2, 1)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_zero_rows() {
        let mut buf = Vec::new();
        write_vertex_table(&mut buf, 0, &SCHEME_B, &full_table(0)).unwrap();
        assert_eq!(buf, header_text(0, &SCHEME_B).into_bytes());
    }
}
