pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod transform;
