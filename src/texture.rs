//! Texture loading, sampling, and CPU sphere rendering.
//!
//! Texture files are decoded on a worker thread and handed back over a
//! channel. Bodies whose texture is missing or broken are drawn as a flat
//! shaded sphere in their fallback color.

use egui::Color32;
use nalgebra::{Matrix3, Vector3};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use thiserror::Error;

pub const AMBIENT_INTENSITY: f64 = 0.2;
pub const SUN_LIGHT_INTENSITY: f64 = 1.5;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Clone)]
pub struct BodyTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl BodyTexture {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgb8();
        let width = img.width();
        let height = img.height();
        let pixels: Vec<[u8; 3]> = img.pixels().map(|p| p.0).collect();
        Ok(Self { width, height, pixels })
    }

    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let bytes = read_file(path)?;
        Self::from_bytes(&bytes).map_err(|source| TextureError::Decode { path: path.to_path_buf(), source })
    }

    pub fn downscale(&self, factor: u32) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let new_width = (self.width / factor).max(1);
        let new_height = (self.height / factor).max(1);
        let mut pixels = Vec::with_capacity((new_width * new_height) as usize);

        for y in 0..new_height {
            for x in 0..new_width {
                let mut sum = [0u32; 3];
                let mut count = 0u32;
                for dy in 0..factor {
                    for dx in 0..factor {
                        let sx = x * factor + dx;
                        let sy = y * factor + dy;
                        if sx >= self.width || sy >= self.height {
                            continue;
                        }
                        let px = self.pixels[(sy * self.width + sx) as usize];
                        for c in 0..3 {
                            sum[c] += px[c] as u32;
                        }
                        count += 1;
                    }
                }
                let count = count.max(1);
                pixels.push([(sum[0] / count) as u8, (sum[1] / count) as u8, (sum[2] / count) as u8]);
            }
        }
        Self { width: new_width, height: new_height, pixels }
    }

    /// Downscale by the smallest integer factor that fits `max_width`.
    pub fn fit_width(self, max_width: u32) -> Self {
        if max_width == 0 || self.width <= max_width {
            return self;
        }
        self.downscale(self.width.div_ceil(max_width))
    }

    pub fn sample(&self, u: f64, v: f64) -> [u8; 3] {
        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Radial ring strip: column 0 is the inner edge, the last column the outer edge.
pub struct RingTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl RingTexture {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let width = img.width();
        let height = img.height();
        let pixels: Vec<[u8; 4]> = img.pixels().map(|p| p.0).collect();
        Ok(Self { width, height, pixels })
    }

    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let bytes = read_file(path)?;
        Self::from_bytes(&bytes).map_err(|source| TextureError::Decode { path: path.to_path_buf(), source })
    }

    /// Color at radial fraction `t` in `[0, 1]`, taken from the middle row.
    pub fn sample_radial(&self, t: f64) -> [u8; 4] {
        let x = ((t.clamp(0.0, 1.0) * self.width as f64) as u32).min(self.width.saturating_sub(1));
        let y = self.height / 2;
        self.pixels[(y * self.width + x) as usize]
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, TextureError> {
    std::fs::read(path).map_err(|source| TextureError::Read { path: path.to_path_buf(), source })
}

#[derive(Clone)]
pub enum LoadedTexture {
    Body(Arc<BodyTexture>),
    Ring(Arc<RingTexture>),
}

pub enum TextureLoadState {
    Loading,
    Loaded(LoadedTexture),
    Failed(String),
}

fn is_ring_file(file: &str) -> bool {
    file.ends_with(".png") && file.contains("ring")
}

fn load_texture_file(dir: &Path, file: &str, max_width: u32) -> Result<LoadedTexture, TextureError> {
    let path = dir.join(file);
    if is_ring_file(file) {
        Ok(LoadedTexture::Ring(Arc::new(RingTexture::load(&path)?)))
    } else {
        Ok(LoadedTexture::Body(Arc::new(BodyTexture::load(&path)?.fit_width(max_width))))
    }
}

/// Every texture the scene uses, keyed by file name.
pub struct TextureLibrary {
    states: HashMap<&'static str, TextureLoadState>,
    rx: Option<mpsc::Receiver<(&'static str, Result<LoadedTexture, TextureError>)>>,
}

impl TextureLibrary {
    /// Start decoding `files` from `dir` on a worker thread.
    pub fn spawn(dir: PathBuf, files: Vec<&'static str>, max_width: u32) -> Self {
        let states = files.iter().map(|f| (*f, TextureLoadState::Loading)).collect();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for file in files {
                let result = load_texture_file(&dir, file, max_width);
                if tx.send((file, result)).is_err() {
                    break;
                }
            }
        });
        Self { states, rx: Some(rx) }
    }

    /// Drain finished decodes. Returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let Some(rx) = &self.rx else {
            return 0;
        };
        let mut arrived = 0;
        loop {
            match rx.try_recv() {
                Ok((file, Ok(texture))) => {
                    log::debug!("loaded texture {file}");
                    self.states.insert(file, TextureLoadState::Loaded(texture));
                    arrived += 1;
                }
                Ok((file, Err(err))) => {
                    log::warn!("{err}; drawing {file} with its fallback color");
                    self.states.insert(file, TextureLoadState::Failed(err.to_string()));
                    arrived += 1;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    for state in self.states.values_mut() {
                        if matches!(state, TextureLoadState::Loading) {
                            *state = TextureLoadState::Failed("texture loader stopped".to_string());
                        }
                    }
                    self.rx = None;
                    break;
                }
            }
        }
        arrived
    }

    pub fn pending(&self) -> usize {
        self.states.values().filter(|s| matches!(s, TextureLoadState::Loading)).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.states.iter().filter_map(|(file, state)| match state {
            TextureLoadState::Failed(reason) => Some((*file, reason.as_str())),
            _ => None,
        })
    }

    pub fn body(&self, file: &str) -> Option<&BodyTexture> {
        match self.states.get(file) {
            Some(TextureLoadState::Loaded(LoadedTexture::Body(tex))) => Some(tex.as_ref()),
            _ => None,
        }
    }

    pub fn ring(&self, file: &str) -> Option<&RingTexture> {
        match self.states.get(file) {
            Some(TextureLoadState::Loaded(LoadedTexture::Ring(tex))) => Some(tex.as_ref()),
            _ => None,
        }
    }
}

/// How one sphere sprite is lit and colored.
#[derive(Clone, Copy, Debug)]
pub struct SphereShading {
    /// Unit vector toward the light in view space; `None` renders unlit.
    pub light_dir: Option<Vector3<f64>>,
    /// Per-channel multiplier, white for no tint.
    pub tint: [u8; 3],
}

fn lambert(normal: &Vector3<f64>, light_dir: Option<&Vector3<f64>>) -> f64 {
    match light_dir {
        Some(l) => (AMBIENT_INTENSITY + SUN_LIGHT_INTENSITY * normal.dot(l).max(0.0)).min(1.0),
        None => 1.0,
    }
}

/// Render a textured sphere seen head-on into a square image.
///
/// `orientation` maps body-local directions into view space. Without a
/// texture every pixel uses `fallback`.
pub fn render_sphere(
    texture: Option<&BodyTexture>,
    fallback: [u8; 3],
    size: usize,
    orientation: &Matrix3<f64>,
    shading: SphereShading,
) -> egui::ColorImage {
    let mut pixels = vec![Color32::TRANSPARENT; size * size];
    let center = size as f64 / 2.0;
    let radius = center;
    let inv_rot = orientation.transpose();
    let light = shading.light_dir.as_ref();

    for py in 0..size {
        for px in 0..size {
            let dx = px as f64 + 0.5 - center;
            let dy = py as f64 + 0.5 - center;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq >= radius * radius {
                continue;
            }
            let z = (radius * radius - dist_sq).sqrt() / radius;
            let normal = Vector3::new(dx / radius, -dy / radius, z);

            let [r, g, b] = match texture {
                Some(tex) => {
                    let v = inv_rot * normal;
                    let lat = v.y.clamp(-1.0, 1.0).asin();
                    let lon = (-v.z).atan2(v.x);
                    tex.sample((lon + PI) / (2.0 * PI), (PI / 2.0 - lat) / PI)
                }
                None => fallback,
            };

            let shade = lambert(&normal, light);
            let channel = |c: u8, t: u8| (c as f64 * shade * t as f64 / 255.0).round().clamp(0.0, 255.0) as u8;
            pixels[py * size + px] = Color32::from_rgb(
                channel(r, shading.tint[0]),
                channel(g, shading.tint[1]),
                channel(b, shading.tint[2]),
            );
        }
    }

    egui::ColorImage {
        size: [size, size],
        pixels,
        source_size: egui::Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(img: image::DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        bytes
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> BodyTexture {
        BodyTexture { width, height, pixels: vec![rgb; (width * height) as usize] }
    }

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn decodes_png_bytes() {
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let tex = BodyTexture::from_bytes(&encode_png(image::DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.sample(0.99, 0.99), [10, 20, 30]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(BodyTexture::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BodyTexture::load(&dir.path().join("nope.jpg")).err().unwrap();
        assert!(matches!(err, TextureError::Read { .. }));
    }

    #[test]
    fn fit_width_downscales_wide_textures() {
        let tex = solid(100, 50, [1, 2, 3]).fit_width(40);
        assert_eq!(tex.width, 33);
        assert_eq!(tex.pixels.len(), (tex.width * tex.height) as usize);
        assert_eq!(solid(8, 4, [0; 3]).fit_width(40).width, 8);
    }

    #[test]
    fn ring_samples_by_radius() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 10]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 200]));
        let ring = RingTexture::from_bytes(&encode_png(image::DynamicImage::ImageRgba8(img))).unwrap();
        assert_eq!(ring.sample_radial(0.0), [255, 0, 0, 10]);
        assert_eq!(ring.sample_radial(1.0), [0, 0, 255, 200]);
    }

    #[test]
    fn unlit_sphere_keeps_texture_color_and_transparent_corners() {
        let tex = solid(8, 4, [200, 100, 50]);
        let shading = SphereShading { light_dir: None, tint: WHITE };
        let img = render_sphere(Some(&tex), [0; 3], 16, &Matrix3::identity(), shading);
        assert_eq!(img.pixels[0], Color32::TRANSPARENT);
        assert_eq!(img.pixels[8 * 16 + 8], Color32::from_rgb(200, 100, 50));
    }

    #[test]
    fn lit_sphere_is_dim_on_the_far_side() {
        let shading = SphereShading { light_dir: Some(Vector3::new(1.0, 0.0, 0.0)), tint: WHITE };
        let img = render_sphere(None, [200, 200, 200], 32, &Matrix3::identity(), shading);
        let lit = img.pixels[16 * 32 + 30];
        let dark = img.pixels[16 * 32 + 1];
        assert_eq!(lit.r(), 200);
        // Only ambient light reaches the far side.
        assert_eq!(dark.r(), 40);
    }

    #[test]
    fn tint_scales_channels() {
        let shading = SphereShading { light_dir: None, tint: [255, 180, 120] };
        let img = render_sphere(None, [255, 255, 255], 8, &Matrix3::identity(), shading);
        assert_eq!(img.pixels[4 * 8 + 4], Color32::from_rgb(255, 180, 120));
    }

    #[test]
    fn library_reports_missing_files_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([9, 9, 9]));
        std::fs::write(dir.path().join("earth.jpg"), encode_png(image::DynamicImage::ImageRgb8(img))).unwrap();

        let mut library = TextureLibrary::spawn(dir.path().to_path_buf(), vec!["earth.jpg", "mars.jpg"], 1024);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while library.pending() > 0 {
            library.poll();
            assert!(std::time::Instant::now() < deadline, "textures never finished loading");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(library.body("earth.jpg").is_some());
        assert!(library.body("mars.jpg").is_none());
        let failed: Vec<_> = library.failed().map(|(f, _)| f).collect();
        assert_eq!(failed, vec!["mars.jpg"]);
    }
}
