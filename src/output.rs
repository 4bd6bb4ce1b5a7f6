//! PNG output and file path generation

use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::figure::Raster;
use crate::palette::Palette;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convert palette indices to opaque RGBA pixels.
pub fn raster_to_image(raster: &Raster, palette: &Palette) -> RgbaImage {
    let width = raster.width() as u32;
    RgbaImage::from_fn(width, raster.height() as u32, |x, y| {
        let index = raster.pixels()[(y * width + x) as usize];
        palette.rgba(index)
    })
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Scale by an integer factor with nearest-neighbor sampling. Factors of 0
/// and 1 return the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Where a rendered figure is written.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o`, project `demo.json`, figure `title` | `demo_title.png` |
/// | `-o out.png`, single figure | `out.png` |
/// | `-o out.png`, several figures | `out_{name}.png` |
/// | `-o dir/` | `dir/{name}.png` |
pub fn generate_output_path(
    input: &Path,
    figure_name: &str,
    output_arg: Option<&Path>,
    is_single: bool,
) -> PathBuf {
    let (base, stem) = match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                return output.join(format!("{}.png", figure_name));
            }
            if is_single {
                return output.to_path_buf();
            }
            (output, output.file_stem().and_then(|s| s.to_str()).unwrap_or("output"))
        }
        None => (input, input.file_stem().and_then(|s| s.to_str()).unwrap_or("output")),
    };

    let file_name = format!("{}_{}.png", stem, figure_name);
    match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
