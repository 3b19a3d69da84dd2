pub mod accessor;
pub mod errors;
pub mod model;
pub mod sanitize;
pub mod tree;

pub use accessor::child_text;
pub use errors::XmlError;
pub use model::{read_feed, SourceFeed, SourceProduct, SourceVariant};
pub use sanitize::{clean, clean_text};
pub use tree::{parse_document, write_document, Element};

#[cfg(test)]
mod tests;
