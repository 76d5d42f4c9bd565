//! Annotation directives: the address-ranged instructions that steer how a
//! listing is formatted, which blocks are rendered by scripts, and where
//! comments go.

mod codec;
mod directive;
mod format;
mod overlay;

pub use codec::parse_directives;
pub use directive::*;
pub use format::*;
pub use overlay::Overlay;
