//! Fixed output layouts and the projection of decoded vertex tables onto them.
//!
//! A layout is plain data: an ordered list of fields, each with its PLY type
//! and a zero policy. New layouts are new constants; [`project`] and the
//! writer treat every [`TargetSchema`] the same way.

use crate::{ScalarType, VertexTable};

/// What the projector does with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPolicy {
    /// Copied from the source when present, zero otherwise.
    Default,
    /// Always zero, whatever the source holds.
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetField {
    pub name: &'static str,
    pub data_type: ScalarType,
    pub zero_policy: ZeroPolicy,
}

impl TargetField {
    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            data_type: ScalarType::F32,
            zero_policy: ZeroPolicy::Default,
        }
    }

    pub const fn forced_zero(name: &'static str) -> Self {
        Self {
            name,
            data_type: ScalarType::F32,
            zero_policy: ZeroPolicy::Force,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSchema {
    pub name: &'static str,
    pub fields: &'static [TargetField],
}

impl TargetSchema {
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }

    pub fn field(&self, name: &str) -> Option<&TargetField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Bytes per encoded row.
    pub fn row_width(&self) -> usize {
        self.fields.iter().map(|f| f.data_type.size_bytes()).sum()
    }
}

/// Scheme B: position, normals (always zero), DC color, opacity, scale and
/// rotation, all `float`. Higher-order SH terms are dropped.
pub const SCHEME_B: TargetSchema = TargetSchema {
    name: "scheme_b",
    fields: &[
        TargetField::float("x"),
        TargetField::float("y"),
        TargetField::float("z"),
        TargetField::forced_zero("nx"),
        TargetField::forced_zero("ny"),
        TargetField::forced_zero("nz"),
        TargetField::float("f_dc_0"),
        TargetField::float("f_dc_1"),
        TargetField::float("f_dc_2"),
        TargetField::float("opacity"),
        TargetField::float("scale_0"),
        TargetField::float("scale_1"),
        TargetField::float("scale_2"),
        TargetField::float("rot_0"),
        TargetField::float("rot_1"),
        TargetField::float("rot_2"),
        TargetField::float("rot_3"),
    ],
};

/// Build the output table for `schema` from a decoded source table.
///
/// Fields present in the source are copied by name, absent ones become zero
/// columns, and [`ZeroPolicy::Force`] fields are then zeroed for every row.
pub fn project(source: &VertexTable, schema: &TargetSchema) -> VertexTable {
    let vertex_count = source.vertex_count();
    let mut out = VertexTable::new(vertex_count);

    for field in schema.fields {
        let values = match source.column(field.name) {
            Some(values) => values.to_vec(),
            None => vec![0.0; vertex_count],
        };
        out.insert_column(field.name, values);
    }

    for field in schema.fields {
        if field.zero_policy == ZeroPolicy::Force {
            if let Some(values) = out.column_mut(field.name) {
                values.fill(0.0);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_b_layout() {
        let names: Vec<_> = SCHEME_B.names().collect();
        assert_eq!(
            names,
            vec![
                "x", "y", "z", "nx", "ny", "nz", "f_dc_0", "f_dc_1", "f_dc_2", "opacity",
                "scale_0", "scale_1", "scale_2", "rot_0", "rot_1", "rot_2", "rot_3",
            ]
        );
        assert!(SCHEME_B.fields.iter().all(|f| f.data_type == ScalarType::F32));
        assert_eq!(SCHEME_B.row_width(), 68);

        let forced: Vec<_> = SCHEME_B
            .fields
            .iter()
            .filter(|f| f.zero_policy == ZeroPolicy::Force)
            .map(|f| f.name)
            .collect();
        assert_eq!(forced, vec!["nx", "ny", "nz"]);
    }

    #[test]
    fn test_project_copies_defaults_and_forces() {
        let source = VertexTable::from_columns(
            2,
            [
                ("x", vec![1.0, 4.0]),
                ("nx", vec![0.7, -0.7]),
                ("opacity", vec![0.25, 0.5]),
                ("f_rest_0", vec![9.0, 9.0]),
            ],
        );

        let out = project(&source, &SCHEME_B);
        assert_eq!(out.vertex_count(), 2);
        assert_eq!(out.names().collect::<Vec<_>>(), SCHEME_B.names().collect::<Vec<_>>());
        assert_eq!(out.column("x").unwrap(), &[1.0, 4.0]);
        assert_eq!(out.column("opacity").unwrap(), &[0.25, 0.5]);
        assert_eq!(out.column("nx").unwrap(), &[0.0, 0.0]);
        assert_eq!(out.column("y").unwrap(), &[0.0, 0.0]);
        assert_eq!(out.column("rot_3").unwrap(), &[0.0, 0.0]);
        assert!(!out.contains("f_rest_0"));
    }

    #[test]
    fn test_project_custom_schema() {
        const FIELDS: &[TargetField] = &[TargetField::float("a"), TargetField::forced_zero("b")];
        let schema = TargetSchema {
            name: "custom",
            fields: FIELDS,
        };
        let source = VertexTable::from_columns(1, [("a", vec![3.0]), ("b", vec![5.0])]);

        let out = project(&source, &schema);
        assert_eq!(out.column("a").unwrap(), &[3.0]);
        assert_eq!(out.column("b").unwrap(), &[0.0]);
    }
}
