//! Listing lines and the renderers that turn them into text

mod line;
mod markup;
mod text;
mod traits;

pub use line::*;
pub use markup::Markup;
pub use text::PlainText;
pub use traits::Listing;
