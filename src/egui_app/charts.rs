//! Turning chart references from the service into textures and PNG files.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use egui::{ColorImage, TextureHandle, TextureOptions};
use thiserror::Error;

use crate::types::{ChartImage, ChartKind, ChartSet};

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Error)]
pub enum ChartDecodeError {
    #[error("Chart is a remote URL, not inline image data")]
    NotInline,
    #[error("Chart data URI is not base64 encoded")]
    NotBase64,
    #[error("Chart data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Chart image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Raw image bytes behind an inline `data:image/...;base64,` reference.
pub fn inline_bytes(chart: &ChartImage) -> Result<Vec<u8>, ChartDecodeError> {
    let reference = chart.reference.trim();
    let Some(rest) = reference.strip_prefix(DATA_URI_PREFIX) else {
        return Err(ChartDecodeError::NotInline);
    };
    let (_, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(ChartDecodeError::NotBase64)?;
    Ok(STANDARD.decode(payload.trim())?)
}

pub fn decode_color_image(bytes: &[u8]) -> Result<ColorImage, ChartDecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Write the chart as a PNG, re-encoding when the service sent another format.
pub fn save_png(chart: &ChartImage, path: &Path) -> Result<(), ChartDecodeError> {
    let bytes = inline_bytes(chart)?;
    let write_error = |source| ChartDecodeError::Write {
        path: path.display().to_string(),
        source,
    };
    if image::guess_format(&bytes).ok() == Some(image::ImageFormat::Png) {
        return std::fs::write(path, bytes).map_err(write_error);
    }
    image::load_from_memory(&bytes)?
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(ChartDecodeError::from)
}

enum CachedChart {
    Texture(TextureHandle),
    Unavailable(String),
}

/// Decoded textures for the current chart set, rebuilt when references change.
#[derive(Default)]
pub struct ChartTextures {
    entries: BTreeMap<ChartKind, (String, CachedChart)>,
}

impl ChartTextures {
    /// Drop textures for charts that are no longer present.
    pub fn retain(&mut self, charts: Option<&ChartSet>) {
        match charts {
            Some(charts) => self.entries.retain(|kind, (reference, _)| {
                charts
                    .get(kind)
                    .is_some_and(|chart| &chart.reference == reference)
            }),
            None => self.entries.clear(),
        }
    }

    /// Texture for `kind`, decoding on first use. Errors are cached per reference.
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        kind: ChartKind,
        chart: &ChartImage,
    ) -> Result<&TextureHandle, &str> {
        let stale = self
            .entries
            .get(&kind)
            .is_none_or(|(reference, _)| reference != &chart.reference);
        if stale {
            let cached = match inline_bytes(chart).and_then(|bytes| decode_color_image(&bytes)) {
                Ok(image) => CachedChart::Texture(ctx.load_texture(
                    format!("chart_{}", kind.wire_key()),
                    image,
                    TextureOptions::LINEAR,
                )),
                Err(err) => {
                    tracing::warn!("Could not decode {} chart: {err}", kind.wire_key());
                    CachedChart::Unavailable(err.to_string())
                }
            };
            self.entries.insert(kind, (chart.reference.clone(), cached));
        }
        match self.entries.get(&kind).map(|(_, cached)| cached) {
            Some(CachedChart::Texture(texture)) => Ok(texture),
            Some(CachedChart::Unavailable(message)) => Err(message.as_str()),
            None => Err("Chart not loaded"),
        }
    }
}
