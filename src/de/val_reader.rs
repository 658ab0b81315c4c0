use std::io::Read;
use std::marker::PhantomData;

use byteorder::ByteOrder;
use byteorder::ReadBytesExt;

use crate::PlyError;

pub struct BinValReader<R: Read, E: ByteOrder> {
    reader: R,
    _endian: PhantomData<E>,
}

impl<R: Read, E: ByteOrder> BinValReader<R, E> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            _endian: PhantomData,
        }
    }
}

pub trait ScalarReader {
    fn read_i8(&mut self) -> Result<i8, PlyError>;
    fn read_u8(&mut self) -> Result<u8, PlyError>;
    fn read_i16(&mut self) -> Result<i16, PlyError>;
    fn read_u16(&mut self) -> Result<u16, PlyError>;
    fn read_i32(&mut self) -> Result<i32, PlyError>;
    fn read_u32(&mut self) -> Result<u32, PlyError>;
    fn read_f32(&mut self) -> Result<f32, PlyError>;
    fn read_f64(&mut self) -> Result<f64, PlyError>;
}

impl<R: Read, E: ByteOrder> ScalarReader for BinValReader<R, E> {
    fn read_i8(&mut self) -> Result<i8, PlyError> {
        Ok(self.reader.read_i8()?)
    }

    fn read_u8(&mut self) -> Result<u8, PlyError> {
        Ok(self.reader.read_u8()?)
    }

    fn read_i16(&mut self) -> Result<i16, PlyError> {
        Ok(self.reader.read_i16::<E>()?)
    }

    fn read_u16(&mut self) -> Result<u16, PlyError> {
        Ok(self.reader.read_u16::<E>()?)
    }

    fn read_i32(&mut self) -> Result<i32, PlyError> {
        Ok(self.reader.read_i32::<E>()?)
    }

    fn read_u32(&mut self) -> Result<u32, PlyError> {
        Ok(self.reader.read_u32::<E>()?)
    }

    fn read_f32(&mut self) -> Result<f32, PlyError> {
        Ok(self.reader.read_f32::<E>()?)
    }

    fn read_f64(&mut self) -> Result<f64, PlyError> {
        Ok(self.reader.read_f64::<E>()?)
    }
}
