//! Processor architectures understood by the disassembler

pub mod z80;
