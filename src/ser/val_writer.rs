use std::io::Write;
use std::marker::PhantomData;

use byteorder::ByteOrder;
use byteorder::WriteBytesExt;

use crate::{PlyError, ScalarType};

pub struct BinValWriter<W: Write, E: ByteOrder> {
    writer: W,
    _endian: PhantomData<E>,
}

impl<W: Write, E: ByteOrder> BinValWriter<W, E> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            writer,
            _endian: PhantomData,
        }
    }
}

pub trait ScalarWriter {
    fn write_i8(&mut self, val: i8) -> Result<(), PlyError>;
    fn write_u8(&mut self, val: u8) -> Result<(), PlyError>;
    fn write_i16(&mut self, val: i16) -> Result<(), PlyError>;
    fn write_u16(&mut self, val: u16) -> Result<(), PlyError>;
    fn write_i32(&mut self, val: i32) -> Result<(), PlyError>;
    fn write_u32(&mut self, val: u32) -> Result<(), PlyError>;
    fn write_f32(&mut self, val: f32) -> Result<(), PlyError>;
    fn write_f64(&mut self, val: f64) -> Result<(), PlyError>;

    /// Encode `val` as `data_type`. Integer targets saturate.
    fn write_as(&mut self, data_type: ScalarType, val: f64) -> Result<(), PlyError> {
        match data_type {
            ScalarType::I8 => self.write_i8(val as i8),
            ScalarType::U8 => self.write_u8(val as u8),
            ScalarType::I16 => self.write_i16(val as i16),
            ScalarType::U16 => self.write_u16(val as u16),
            ScalarType::I32 => self.write_i32(val as i32),
            ScalarType::U32 => self.write_u32(val as u32),
            ScalarType::F32 => self.write_f32(val as f32),
            ScalarType::F64 => self.write_f64(val),
        }
    }
}

impl<W: Write, E: ByteOrder> ScalarWriter for BinValWriter<W, E> {
    fn write_i8(&mut self, val: i8) -> Result<(), PlyError> {
        Ok(self.writer.write_i8(val)?)
    }

    fn write_u8(&mut self, val: u8) -> Result<(), PlyError> {
        Ok(self.writer.write_u8(val)?)
    }

    fn write_i16(&mut self, val: i16) -> Result<(), PlyError> {
        Ok(self.writer.write_i16::<E>(val)?)
    }

    fn write_u16(&mut self, val: u16) -> Result<(), PlyError> {
        Ok(self.writer.write_u16::<E>(val)?)
    }

    fn write_i32(&mut self, val: i32) -> Result<(), PlyError> {
        Ok(self.writer.write_i32::<E>(val)?)
    }

    fn write_u32(&mut self, val: u32) -> Result<(), PlyError> {
        Ok(self.writer.write_u32::<E>(val)?)
    }

    fn write_f32(&mut self, val: f32) -> Result<(), PlyError> {
        Ok(self.writer.write_f32::<E>(val)?)
    }

    fn write_f64(&mut self, val: f64) -> Result<(), PlyError> {
        Ok(self.writer.write_f64::<E>(val)?)
    }
}
