use std::path::PathBuf;

use feedshift_parser::read_feed;
use feedshift_transfer::{publish, SessionConnector};
use tracing::info;

use crate::error::Result;
use crate::fetch::FeedSource;
use crate::render::render_feed;
use crate::settings::{Settings, TransformSettings};
use crate::transform::transform_feed;

#[derive(Debug, Clone)]
pub struct ConvertedFeed {
    pub xml: String,
    pub products: usize,
    pub variants: usize,
    pub images: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Also write the rendered feed to this local path.
    pub local_copy: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub products: usize,
    pub variants: usize,
    pub images: usize,
    pub bytes: usize,
    pub published: bool,
}

/// Parses a vendor feed document and renders it in the destination schema.
pub fn convert_document(content: &str, settings: &TransformSettings) -> Result<ConvertedFeed> {
    let source = read_feed(content)?;
    info!(
        products = source.products.len(),
        scripts = source.scripts.len(),
        "parsed source feed"
    );

    let output = transform_feed(&source, settings.invalid_vat)?;
    let xml = render_feed(&output)?;

    Ok(ConvertedFeed {
        products: output.products.len(),
        variants: output.variant_count(),
        images: output.image_count(),
        xml,
    })
}

/// One fetch, convert and publish cycle over already validated settings.
///
/// Without a destination connector the upload is skipped (dry run). A failed
/// upload is not an error here; it shows up as `published == false` in the
/// summary after the publisher has logged the cause.
pub fn run(
    settings: &Settings,
    source: &dyn FeedSource,
    destination: Option<&dyn SessionConnector>,
    options: &RunOptions,
) -> Result<RunSummary> {
    let raw = source.fetch()?;
    let converted = convert_document(&raw, &settings.transform)?;
    info!(
        products = converted.products,
        variants = converted.variants,
        images = converted.images,
        bytes = converted.xml.len(),
        "converted feed"
    );

    if let Some(path) = &options.local_copy {
        std::fs::write(path, converted.xml.as_bytes())?;
        info!(path = %path.display(), "wrote local copy");
    }

    let published = match destination {
        Some(connector) => publish(
            connector,
            &settings.destination.publish_target(),
            converted.xml.as_bytes(),
        ),
        None => {
            info!("dry run, skipping upload");
            false
        }
    };

    Ok(RunSummary {
        products: converted.products,
        variants: converted.variants,
        images: converted.images,
        bytes: converted.xml.len(),
        published,
    })
}
