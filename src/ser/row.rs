use crate::{schema::TargetField, ser::val_writer::ScalarWriter, PlyError};

use serde::{
    ser::{Impossible, SerializeStruct},
    Serialize, Serializer,
};

/// One output row, serialized as a struct whose fields follow the schema.
pub(crate) struct OutputRow<'a> {
    pub fields: &'a [TargetField],
    pub columns: &'a [&'a [f32]],
    pub index: usize,
}

impl Serialize for OutputRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut row = serializer.serialize_struct("vertex", self.fields.len())?;
        for (field, column) in self.fields.iter().zip(self.columns) {
            row.serialize_field(field.name, &column[self.index])?;
        }
        row.end()
    }
}

pub(crate) struct RowSerializer<'a, W: ScalarWriter> {
    pub val_writer: W,
    pub fields: &'a [TargetField],
}

impl<'a, W: ScalarWriter> RowSerializer<'a, W> {
    pub fn new(val_writer: W, fields: &'a [TargetField]) -> Self {
        Self { val_writer, fields }
    }
}

fn not_a_row() -> PlyError {
    serde::ser::Error::custom("PLY rows must be structs")
}

impl<'s, 'a, W: ScalarWriter> Serializer for &'s mut RowSerializer<'a, W> {
    type Ok = ();
    type Error = PlyError;

    type SerializeSeq = Impossible<(), PlyError>;
    type SerializeTuple = Impossible<(), PlyError>;
    type SerializeTupleStruct = Impossible<(), PlyError>;
    type SerializeTupleVariant = Impossible<(), PlyError>;
    type SerializeMap = Impossible<(), PlyError>;
    type SerializeStruct = RowStructSerializer<'s, 'a, W>;
    type SerializeStructVariant = Impossible<(), PlyError>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_row())
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_row())
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_a_row())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_a_row())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(RowStructSerializer {
            parent: self,
            current_field: 0,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_a_row())
    }
}

pub(crate) struct RowStructSerializer<'s, 'a, W: ScalarWriter> {
    parent: &'s mut RowSerializer<'a, W>,
    current_field: usize,
}

impl<W: ScalarWriter> SerializeStruct for RowStructSerializer<'_, '_, W> {
    type Ok = ();
    type Error = PlyError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let Some(field) = self.parent.fields.get(self.current_field).copied() else {
            return Err(PlyError::Serde(format!("unexpected field {key} past the schema end")));
        };
        if field.name != key {
            return Err(PlyError::Serde(format!(
                "field {key} out of order, expected {}",
                field.name
            )));
        }
        self.current_field += 1;

        value.serialize(PropertySerializer {
            val_writer: &mut self.parent.val_writer,
            field,
        })
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        match self.parent.fields.get(self.current_field) {
            Some(field) => Err(PlyError::MissingColumn(field.name.to_string())),
            None => Ok(()),
        }
    }
}

/// Encodes a single numeric value as its field's declared type.
struct PropertySerializer<'a, W: ScalarWriter> {
    val_writer: &'a mut W,
    field: TargetField,
}

impl<W: ScalarWriter> PropertySerializer<'_, W> {
    fn write(self, val: f64) -> Result<(), PlyError> {
        self.val_writer.write_as(self.field.data_type, val)
    }

    fn unsupported(&self, what: &str) -> PlyError {
        PlyError::Serde(format!("{what} is not a scalar for field {}", self.field.name))
    }
}

impl<W: ScalarWriter> Serializer for PropertySerializer<'_, W> {
    type Ok = ();
    type Error = PlyError;
    type SerializeSeq = Impossible<(), PlyError>;
    type SerializeTuple = Impossible<(), PlyError>;
    type SerializeTupleStruct = Impossible<(), PlyError>;
    type SerializeTupleVariant = Impossible<(), PlyError>;
    type SerializeMap = Impossible<(), PlyError>;
    type SerializeStruct = Impossible<(), PlyError>;
    type SerializeStructVariant = Impossible<(), PlyError>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("i64"))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.write(v.into())
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("u64"))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        // Straight through for float fields so NaN payloads survive.
        if self.field.data_type == crate::ScalarType::F32 {
            return self.val_writer.write_f32(v);
        }
        self.write(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.write(v)
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("char"))
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("str"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("unit_struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(self.unsupported("unit_variant"))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(self.unsupported("newtype_variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(self.unsupported("list"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(self.unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(self.unsupported("tuple_struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(self.unsupported("tuple_variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(self.unsupported("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(self.unsupported("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(self.unsupported("struct_variant"))
    }
}
