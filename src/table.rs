/// Named `f32` columns, one value per vertex.
///
/// Columns keep insertion order. Inserting a name that already exists
/// replaces that column in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexTable {
    vertex_count: usize,
    columns: Vec<(String, Vec<f32>)>,
}

impl VertexTable {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            columns: Vec::new(),
        }
    }

    /// Build a table from existing columns without checking their lengths.
    /// Lengths are validated when the table is written.
    pub fn from_columns<I, S>(vertex_count: usize, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut table = Self::new(vertex_count);
        for (name, values) in columns {
            table.insert_column(name, values);
        }
        table
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f32>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f32]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f32>> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = VertexTable::from_columns(2, [("x", vec![1.0, 2.0]), ("y", vec![3.0, 4.0])]);
        table.insert_column("x", vec![5.0, 6.0]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(table.column("x"), Some(&[5.0, 6.0][..]));
        assert!(table.column("z").is_none());
    }
}
