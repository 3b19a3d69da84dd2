use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document ended with {open} unclosed element(s), innermost <{innermost}>")]
    UnexpectedEof { open: usize, innermost: String },

    #[error("document does not contain a root element")]
    MissingRoot,

    #[error("failed to write XML: {0}")]
    Write(String),
}
