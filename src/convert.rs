use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{
    de::read_vertex_table, schema::project, ser::write_vertex_table, PlyError, PlyHeader,
    TargetSchema, SCHEME_B,
};

/// How the output file reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write straight to the output path. A failure part way through leaves
    /// a truncated file behind.
    #[default]
    Direct,
    /// Write to a temporary file next to the output and rename it into place
    /// once the whole file has been written.
    Atomic,
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    pub write_mode: WriteMode,
    /// Fail on inputs that declare elements before `vertex` instead of
    /// reading their bytes as vertex data.
    pub strict_layout: bool,
    pub schema: &'static TargetSchema,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Direct,
            strict_layout: false,
            schema: &SCHEME_B,
        }
    }
}

/// What a conversion kept, dropped and filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub vertex_count: usize,
    pub source_properties: Vec<String>,
    /// Source columns with no counterpart in the schema.
    pub dropped_properties: Vec<String>,
    /// Schema fields the source did not provide, written as zero.
    pub defaulted_fields: Vec<String>,
}

/// Convert `input` into a scheme B file at `output`.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(), PlyError> {
    convert_with_options(input, output, &ConvertOptions::default()).map(|_| ())
}

pub fn convert_with_options(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionReport, PlyError> {
    let input = input.as_ref();
    let output = output.as_ref();
    let _span = tracing::info_span!("convert", input = %input.display()).entered();

    let mut reader = BufReader::new(File::open(input)?);
    let header = PlyHeader::parse(&mut reader)?;
    if options.strict_layout && !header.preceding_elements.is_empty() {
        return Err(PlyError::PrecedingElements {
            names: header
                .preceding_elements
                .iter()
                .map(|e| e.name.clone())
                .collect(),
        });
    }

    let source = read_vertex_table(reader, &header)?;
    let schema = options.schema;
    let projected = project(&source, schema);
    let vertex_count = header.vertex_count;

    match options.write_mode {
        WriteMode::Direct => {
            let file = File::create(output)?;
            write_vertex_table(BufWriter::new(file), vertex_count, schema, &projected)?;
        }
        WriteMode::Atomic => {
            let dir = match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut tmp = NamedTempFile::new_in(dir)?;
            write_vertex_table(BufWriter::new(tmp.as_file_mut()), vertex_count, schema, &projected)?;
            tmp.as_file_mut().sync_all()?;
            tmp.persist(output).map_err(|e| PlyError::Io(e.error))?;
        }
    }

    let report = ConversionReport {
        vertex_count,
        source_properties: source.names().map(str::to_string).collect(),
        dropped_properties: source
            .names()
            .filter(|name| schema.field(name).is_none())
            .map(str::to_string)
            .collect(),
        defaulted_fields: schema
            .names()
            .filter(|name| !source.contains(name))
            .map(str::to_string)
            .collect(),
    };
    tracing::info!(
        output = %output.display(),
        vertex_count,
        schema = schema.name,
        dropped = report.dropped_properties.len(),
        defaulted = report.defaulted_fields.len(),
        "converted vertex table"
    );
    Ok(report)
}

/// One-line description of a PLY file's vertex element.
#[derive(Debug, Clone)]
pub struct HeaderSummary {
    pub path: PathBuf,
    pub format: String,
    pub vertex_count: usize,
    pub property_names: Vec<String>,
}

impl fmt::Display for HeaderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy());
        writeln!(
            f,
            "{}: format={} vertex={} props={}",
            file_name,
            self.format,
            self.vertex_count,
            self.property_names.len()
        )?;
        write!(f, "  [{}]", self.property_names.join(", "))
    }
}

pub fn summarize(path: impl AsRef<Path>) -> Result<HeaderSummary, PlyError> {
    let path = path.as_ref();
    let header = PlyHeader::from_path(path)?;
    Ok(HeaderSummary {
        path: path.to_path_buf(),
        format: header.format.clone(),
        vertex_count: header.vertex_count,
        property_names: header.property_names().map(str::to_string).collect(),
    })
}

/// Write `summary` followed by a newline.
pub fn print_summary(mut out: impl Write, summary: &HeaderSummary) -> std::io::Result<()> {
    writeln!(out, "{summary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let summary = HeaderSummary {
            path: PathBuf::from("PLY/teaser.ply"),
            format: "binary_little_endian".to_string(),
            vertex_count: 12,
            property_names: vec!["x".to_string(), "y".to_string()],
        };
        assert_eq!(
            summary.to_string(),
            "teaser.ply: format=binary_little_endian vertex=12 props=2\n  [x, y]"
        );
    }
}
