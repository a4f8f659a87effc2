use std::path::Path;
use std::rc::Rc;

use image::{ DynamicImage, GenericImageView };

use crate::engine::backend::GlBackend;
use crate::engine::error::{ RenderError, Result };

/// 8-bit pixels straight out of the decoder, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 3 (RGB) or 4 (RGBA).
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decodes `path`. Anything other than 8-bit RGB or RGBA is widened to RGBA.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| RenderError::Resource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_dynamic(image))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, pixels) = match image {
            DynamicImage::ImageRgb8(rgb) => (3, rgb.into_raw()),
            DynamicImage::ImageRgba8(rgba) => (4, rgba.into_raw()),
            other => (4, other.into_rgba8().into_raw()),
        };
        Self { width, height, channels, pixels }
    }

    /// Checks that the channel count is 3 or 4 and that `pixels` holds exactly
    /// one tightly packed image of that size.
    pub fn validate(&self) -> Result<()> {
        if self.channels != 3 && self.channels != 4 {
            return Err(RenderError::InvalidImage(format!("{} channels, expected 3 or 4", self.channels)));
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|texels| texels.checked_mul(self.channels as usize));
        if expected != Some(self.pixels.len()) {
            return Err(
                RenderError::InvalidImage(
                    format!(
                        "{} bytes for a {}x{} image with {} channels",
                        self.pixels.len(),
                        self.width,
                        self.height,
                        self.channels
                    )
                )
            );
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(RenderError::InvalidImage(format!("{}x{} is too large", self.width, self.height)));
        }
        Ok(())
    }

    /// GL pixel format matching the channel count.
    pub fn gl_format(&self) -> u32 {
        if self.channels == 4 { glow::RGBA } else { glow::RGB }
    }
}

/// A 2D texture, immutable once uploaded.
pub struct Texture<G: GlBackend> {
    gl: Rc<G>,
    texture: Option<G::Texture>,
    width: u32,
    height: u32,
    channels: u8,
}

impl<G: GlBackend> Texture<G> {
    pub fn load(gl: Rc<G>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = DecodedImage::open(path)?;
        let texture = Self::from_image(gl, &image)?;
        log::info!(
            "loaded texture {} ({}x{}, {} channels)",
            path.display(),
            texture.width,
            texture.height,
            texture.channels
        );
        Ok(texture)
    }

    /// Uploads `image` with nearest filtering and repeat wrapping, then
    /// generates mipmaps. Leaves no 2D texture bound.
    ///
    /// A malformed image is rejected before any GPU object is created.
    pub fn from_image(gl: Rc<G>, image: &DecodedImage) -> Result<Self> {
        image.validate()?;
        let handle = gl.create_texture().map_err(RenderError::Allocation)?;
        gl.bind_texture(glow::TEXTURE_2D, Some(handle));

        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);

        let format = image.gl_format();
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            format as i32,
            image.width as i32,
            image.height as i32,
            format,
            glow::UNSIGNED_BYTE,
            &image.pixels
        );
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(Self {
            gl,
            texture: Some(handle),
            width: image.width,
            height: image.height,
            channels: image.channels,
        })
    }

    /// Binds to texture unit 0.
    pub fn bind(&self) {
        if let Some(texture) = self.texture {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn cleanup(&mut self) {
        if let Some(texture) = self.texture.take() {
            self.gl.delete_texture(texture);
        }
    }
}

impl<G: GlBackend> Drop for Texture<G> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
