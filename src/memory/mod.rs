//! The read-only object code image under disassembly

mod image;

pub use image::Image;

#[cfg(test)]
mod tests;
