use std::collections::HashMap;

use serde::{
    de::{value::StrDeserializer, DeserializeSeed, MapAccess, Visitor},
    Deserializer,
};

use crate::{de::val_reader::ScalarReader, header::PropertyDef, PlyError, ScalarType};

/// Resolved on-disk layout of one vertex row.
#[derive(Debug)]
pub(crate) struct RowLayout {
    pub properties: Vec<(String, ScalarType)>,
    /// Distinct property names, first occurrence order.
    pub column_names: Vec<String>,
    pub slots: HashMap<String, usize>,
    pub row_width: usize,
}

impl RowLayout {
    pub fn new(defs: &[PropertyDef]) -> Result<Self, PlyError> {
        let mut properties = Vec::with_capacity(defs.len());
        let mut column_names = Vec::new();
        let mut slots = HashMap::new();

        for def in defs {
            let data_type = ScalarType::parse(&def.type_token)?;
            if !slots.contains_key(&def.name) {
                slots.insert(def.name.clone(), column_names.len());
                column_names.push(def.name.clone());
            }
            properties.push((def.name.clone(), data_type));
        }

        let row_width = properties.iter().map(|(_, ty)| ty.size_bytes()).sum();
        Ok(Self {
            properties,
            column_names,
            slots,
            row_width,
        })
    }
}

pub(crate) struct RowDeserializer<'a, E: ScalarReader> {
    pub val_reader: E,
    pub layout: &'a RowLayout,
}

impl<'a, E: ScalarReader> RowDeserializer<'a, E> {
    pub fn new(val_reader: E, layout: &'a RowLayout) -> Self {
        Self { val_reader, layout }
    }
}

impl<'de, E: ScalarReader> Deserializer<'de> for &mut RowDeserializer<'_, E> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(RowMapAccess {
            parent: self,
            current_property: 0,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 i64 u64 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

struct RowMapAccess<'a, 'l, E: ScalarReader> {
    parent: &'a mut RowDeserializer<'l, E>,
    current_property: usize,
}

impl<'de, E: ScalarReader> MapAccess<'de> for RowMapAccess<'_, '_, E> {
    type Error = PlyError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((name, _)) = self.parent.layout.properties.get(self.current_property) else {
            return Ok(None);
        };
        seed.deserialize(StrDeserializer::<PlyError>::new(name))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let Some(&(_, data_type)) = self.parent.layout.properties.get(self.current_property)
        else {
            return Err(serde::de::Error::custom("value requested past the last property"));
        };
        self.current_property += 1;

        seed.deserialize(ValueDeserializer {
            val_reader: &mut self.parent.val_reader,
            data_type,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.parent.layout.properties.len() - self.current_property)
    }
}

struct ValueDeserializer<'a, E: ScalarReader> {
    val_reader: &'a mut E,
    data_type: ScalarType,
}

impl<'de, E: ScalarReader> Deserializer<'de> for ValueDeserializer<'_, E> {
    type Error = PlyError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.data_type {
            ScalarType::I8 => visitor.visit_i8(self.val_reader.read_i8()?),
            ScalarType::U8 => visitor.visit_u8(self.val_reader.read_u8()?),
            ScalarType::I16 => visitor.visit_i16(self.val_reader.read_i16()?),
            ScalarType::U16 => visitor.visit_u16(self.val_reader.read_u16()?),
            ScalarType::I32 => visitor.visit_i32(self.val_reader.read_i32()?),
            ScalarType::U32 => visitor.visit_u32(self.val_reader.read_u32()?),
            ScalarType::F32 => visitor.visit_f32(self.val_reader.read_f32()?),
            ScalarType::F64 => visitor.visit_f64(self.val_reader.read_f64()?),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Declared properties are always present.
        visitor.visit_some(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 u8 i16 u16 i32 u32 f32 f64 i128 i64 u128 u64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::val_reader::BinValReader;
    use byteorder::LittleEndian;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Point {
        x: f32,
        y: f64,
        label: u8,
    }

    #[test]
    fn test_row_into_struct() {
        let layout = RowLayout::new(&[
            PropertyDef::new("float", "x"),
            PropertyDef::new("uchar", "label"),
            PropertyDef::new("float64", "y"),
        ])
        .unwrap();
        assert_eq!(layout.row_width, 13);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.push(9);
        bytes.extend_from_slice(&(-2.25f64).to_le_bytes());

        let mut de = RowDeserializer::new(BinValReader::<_, LittleEndian>::new(&bytes[..]), &layout);
        let point = Point::deserialize(&mut de).unwrap();
        assert_eq!(
            point,
            Point {
                x: 1.5,
                y: -2.25,
                label: 9
            }
        );
    }

    #[test]
    fn test_layout_duplicate_names_share_a_slot() {
        let layout = RowLayout::new(&[
            PropertyDef::new("float", "a"),
            PropertyDef::new("short", "b"),
            PropertyDef::new("double", "a"),
        ])
        .unwrap();
        assert_eq!(layout.column_names, vec!["a", "b"]);
        assert_eq!(layout.slots["a"], 0);
        assert_eq!(layout.row_width, 14);
    }

    #[test]
    fn test_layout_rejects_unknown_type() {
        let err = RowLayout::new(&[PropertyDef::new("half", "x")]).unwrap_err();
        assert!(matches!(err, PlyError::UnsupportedScalarType(t) if t == "half"));
    }
}
