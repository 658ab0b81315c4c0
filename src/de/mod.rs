mod row;

pub mod val_reader;

use std::collections::HashMap;
use std::fmt;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::de::{DeserializeSeed, MapAccess, Visitor};
use serde::Deserializer;

use crate::de::row::{RowDeserializer, RowLayout};
use crate::de::val_reader::BinValReader;
use crate::{PlyError, PlyFormat, PlyHeader, VertexTable};

/// Decode the vertex payload from a stream positioned at the first payload
/// byte, e.g. the reader that was just handed to [`PlyHeader::parse`].
///
/// Every value is narrowed to `f32`. When a name is declared twice, the
/// later property wins.
pub fn read_vertex_table<R: Read>(reader: R, header: &PlyHeader) -> Result<VertexTable, PlyError> {
    let format = header.binary_format()?;

    if !header.preceding_elements.is_empty() {
        tracing::warn!(
            elements = ?header.preceding_elements,
            "elements declared before vertex; their bytes are read as vertex data"
        );
    }

    match format {
        PlyFormat::BinaryLittleEndian => read_rows::<_, LittleEndian>(reader, header),
        PlyFormat::BinaryBigEndian => read_rows::<_, BigEndian>(reader, header),
    }
}

/// Seek to `header.data_start_offset` and decode the vertex payload.
pub fn read_vertex_table_at<R: Read + Seek>(
    mut reader: R,
    header: &PlyHeader,
) -> Result<VertexTable, PlyError> {
    reader.seek(SeekFrom::Start(header.data_start_offset))?;
    read_vertex_table(reader, header)
}

const PREALLOC_ROWS: usize = 1 << 16;

fn read_rows<R: Read, E: ByteOrder>(
    mut reader: R,
    header: &PlyHeader,
) -> Result<VertexTable, PlyError> {
    let layout = RowLayout::new(&header.vertex_properties)?;
    let vertex_count = header.vertex_count;
    tracing::debug!(
        row_width = layout.row_width,
        columns = layout.column_names.len(),
        vertex_count,
        "decoding vertex rows"
    );

    // Columns grow as rows arrive; the declared count is not trusted for
    // allocation.
    let capacity = vertex_count.min(PREALLOC_ROWS);
    let mut columns: Vec<Vec<f32>> = layout
        .column_names
        .iter()
        .map(|_| Vec::with_capacity(capacity))
        .collect();
    if columns.is_empty() {
        return Ok(VertexTable::new(vertex_count));
    }
    let mut row_buf = vec![0u8; layout.row_width];

    for row in 0..vertex_count {
        let actual = read_full(&mut reader, &mut row_buf)?;
        if actual != layout.row_width {
            return Err(PlyError::TruncatedVertexData {
                row,
                vertex_count,
                expected: layout.row_width,
                actual,
            });
        }

        for column in columns.iter_mut() {
            column.push(0.0);
        }
        let mut de = RowDeserializer::new(BinValReader::<_, E>::new(row_buf.as_slice()), &layout);
        ColumnSink {
            slots: &layout.slots,
            columns: &mut columns,
            row,
        }
        .deserialize(&mut de)?;
    }

    Ok(VertexTable::from_columns(
        vertex_count,
        layout.column_names.iter().cloned().zip(columns),
    ))
}

/// Fill `buf` as far as the stream allows, returning the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, PlyError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Stores one decoded row into its column slots.
struct ColumnSink<'a> {
    slots: &'a HashMap<String, usize>,
    columns: &'a mut [Vec<f32>],
    row: usize,
}

impl<'de> DeserializeSeed<'de> for ColumnSink<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ColumnSink<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a vertex row of named scalar properties")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(slot) = map.next_key_seed(SlotSeed(self.slots))? {
            // serde's numeric conversion into f32 is the narrowing step.
            let value: f32 = map.next_value()?;
            self.columns[slot][self.row] = value;
        }
        Ok(())
    }
}

struct SlotSeed<'a>(&'a HashMap<String, usize>);

impl<'de> DeserializeSeed<'de> for SlotSeed<'_> {
    type Value = usize;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

impl<'de> Visitor<'de> for SlotSeed<'_> {
    type Value = usize;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a declared property name")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        self.0
            .get(v)
            .copied()
            .ok_or_else(|| E::custom(format!("undeclared property {v}")))
    }
}
