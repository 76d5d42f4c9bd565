//! A window of a byte buffer addressed through the 16-bit Z80 address space

use crate::error::{Error, Result};

/// An Image is the part of a caller-supplied buffer being disassembled.
///
/// Address `a` maps to buffer index `offset + (a - origin)`. Only the
/// `length` bytes from `offset` onwards are visible through `window_from`,
/// while the `read_*` family reaches the whole buffer so that scripts may
/// inspect bytes on either side of the window.
#[derive(Clone, Copy, Debug)]
pub struct Image<'a> {
    data: &'a [u8],
    offset: usize,
    origin: u16,
    length: usize,
}

impl<'a> Image<'a> {
    pub fn new(data: &'a [u8], offset: usize, origin: u16, length: usize) -> Result<Self> {
        let fits_buffer = offset
            .checked_add(length)
            .map(|end| end <= data.len())
            .unwrap_or(false);
        let fits_space = origin as usize + length <= 0x10000;

        if !fits_buffer || !fits_space {
            return Err(Error::OutOfBounds {
                offset,
                length,
                origin,
                available: data.len(),
            });
        }

        Ok(Image {
            data,
            offset,
            origin,
            length,
        })
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// One past the last address of the window.
    pub fn end(&self) -> u32 {
        self.origin as u32 + self.length as u32
    }

    /// Whether `address` lies inside the disassembled window.
    pub fn contains(&self, address: u32) -> bool {
        address >= self.origin as u32 && address < self.end()
    }

    fn index(&self, address: u32) -> Option<usize> {
        let index = self.offset as i64 + address as i64 - self.origin as i64;

        if index >= 0 && (index as usize) < self.data.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Read one byte anywhere in the backing buffer.
    pub fn read_byte(&self, address: u32) -> Option<u8> {
        self.index(address).map(|i| self.data[i])
    }

    /// Read a 16-bit value, little-endian unless `big_endian` is set.
    pub fn read_word(&self, address: u32, big_endian: bool) -> Option<u16> {
        let first = self.read_byte(address)? as u16;
        let second = self.read_byte(address + 1)? as u16;

        Some(if big_endian {
            first << 8 | second
        } else {
            second << 8 | first
        })
    }

    pub fn read_bytes(&self, address: u32, count: usize) -> Option<&'a [u8]> {
        let start = self.index(address)?;
        let end = start.checked_add(count)?;

        self.data.get(start..end)
    }

    /// All bytes from `address` to the end of the window.
    pub fn window_from(&self, address: u32) -> &'a [u8] {
        if !self.contains(address) {
            return &[];
        }

        let start = self.offset + (address - self.origin as u32) as usize;
        &self.data[start..self.offset + self.length]
    }
}
