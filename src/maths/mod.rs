//! Numeral rendering and parsing in the four bases a listing can use

mod numeral;

pub use numeral::*;
