//! 3D scene view drawn into an `egui_plot` canvas.
//!
//! Bodies are CPU-rendered sphere sprites placed at their perspective
//! projection and painted far to near. Orbit paths, the starfield, Saturn's
//! ring and the name labels are plot lines, points, polygons and text.

use crate::math::{rotation_y, OrbitCamera, Projected};
use crate::scene::{BodyKind, Scene, SceneBody};
use crate::starfield::fade_alpha;
use crate::texture::{render_sphere, SphereShading, TextureLibrary};
use eframe::egui;
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints, Points, Polygon, Text};
use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

const ORBIT_SEGMENTS: usize = 128;
const RING_SEGMENTS: usize = 64;
const RING_BANDS: usize = 6;
const DRAG_SENSITIVITY: f64 = 0.005;

const ORBIT_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(70, 70, 70, 70);
const CANDIDATE_ORBIT_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 140, 200);
const RING_FALLBACK: [u8; 4] = [205, 185, 150, 150];

/// One texture handle per scene body, re-rendered every frame as the bodies
/// spin and move relative to the light.
#[derive(Default)]
pub struct BodySprites {
    handles: Vec<Option<egui::TextureHandle>>,
}

impl BodySprites {
    pub fn update(&mut self, ctx: &egui::Context, scene: &Scene, textures: &TextureLibrary, sprite_size: usize) {
        self.handles.resize_with(scene.bodies().len(), || None);
        for (idx, body) in scene.bodies().iter().enumerate() {
            let image = render_body(scene, body, textures, sprite_size);
            match &mut self.handles[idx] {
                Some(handle) => handle.set(image, egui::TextureOptions::LINEAR),
                slot @ None => {
                    let name = format!("sprite_{}", body.descriptor.name.to_lowercase());
                    *slot = Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR));
                }
            }
        }
    }

    fn get(&self, idx: usize) -> Option<&egui::TextureHandle> {
        self.handles.get(idx).and_then(Option::as_ref)
    }
}

fn render_body(scene: &Scene, body: &SceneBody, textures: &TextureLibrary, size: usize) -> egui::ColorImage {
    let transform = scene.transform(body);
    let orientation = scene.camera.rotation * rotation_y(transform.spin);
    let light_dir = if body.is_lit() {
        let toward_sun = scene.camera.to_view(&-transform.position);
        toward_sun.try_normalize(1e-9)
    } else {
        None
    };
    let tint = match body.kind {
        BodyKind::Candidate => scene.candidate_tint().color(),
        _ => [255, 255, 255],
    };
    render_sphere(
        textures.body(body.descriptor.texture),
        body.descriptor.fallback_color,
        size,
        &orientation,
        SphereShading { light_dir, tint },
    )
}

fn gray(level: u8, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(level, level, level, alpha)
}

fn draw_stars(plot_ui: &mut egui_plot::PlotUi, scene: &Scene) {
    let camera = &scene.camera;
    let (near, far) = scene.star_shell;
    let mut buckets: BTreeMap<(u8, u8), Vec<[f64; 2]>> = BTreeMap::new();
    for star in &scene.stars {
        let Some(p) = camera.project(&star.position) else {
            continue;
        };
        let radius = (star.size * 45.0 / p.depth).clamp(0.5, 2.0);
        let alpha = star.brightness * fade_alpha(p.depth, near, far + camera.distance);
        let key = ((radius * 2.0).round() as u8, (alpha * 4.0).round().clamp(1.0, 4.0) as u8);
        buckets.entry(key).or_default().push([p.x, p.y]);
    }
    for ((radius, alpha), pts) in buckets {
        plot_ui.points(
            Points::new("", pts)
                .color(gray(255, alpha * 60 + 15))
                .radius(radius as f32 / 2.0)
                .filled(true),
        );
    }
}

/// Project a closed world-space polyline, splitting it wherever a point is
/// culled.
fn projected_segments(camera: &OrbitCamera, world: impl Iterator<Item = Vector3<f64>>) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for p in world {
        match camera.project(&p) {
            Some(proj) => current.push([proj.x, proj.y]),
            None => {
                if current.len() > 1 {
                    segments.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }
    segments
}

fn draw_orbits(plot_ui: &mut egui_plot::PlotUi, scene: &Scene) {
    for (body, radius) in scene.orbit_paths() {
        let circle = (0..=ORBIT_SEGMENTS).map(|i| {
            let a = TAU * i as f64 / ORBIT_SEGMENTS as f64;
            Vector3::new(radius * a.cos(), 0.0, radius * a.sin())
        });
        let (color, width) = if body.kind == BodyKind::Candidate {
            (CANDIDATE_ORBIT_COLOR.gamma_multiply(0.6), 1.5)
        } else {
            (ORBIT_COLOR, 1.0)
        };
        for segment in projected_segments(&scene.camera, circle) {
            plot_ui.line(Line::new("", PlotPoints::new(segment)).color(color).width(width));
        }
    }
}

struct RingQuad {
    points: Vec<[f64; 2]>,
    color: egui::Color32,
    in_front: bool,
}

fn ring_quads(scene: &Scene, body: &SceneBody, center_depth: f64, textures: &TextureLibrary) -> Vec<RingQuad> {
    let Some(ring) = body.descriptor.ring else {
        return Vec::new();
    };
    let texture = textures.ring(ring.texture);
    let center = scene.transform(body).position;
    let (inner, outer) = (ring.inner_radius(), ring.outer_radius());
    let mut quads = Vec::with_capacity(RING_SEGMENTS * RING_BANDS);
    for band in 0..RING_BANDS {
        let t0 = band as f64 / RING_BANDS as f64;
        let t1 = (band + 1) as f64 / RING_BANDS as f64;
        let (r0, r1) = (inner + (outer - inner) * t0, inner + (outer - inner) * t1);
        let [r, g, b, a] = texture.map(|tex| tex.sample_radial((t0 + t1) / 2.0)).unwrap_or(RING_FALLBACK);
        if a == 0 {
            continue;
        }
        let color = egui::Color32::from_rgba_unmultiplied(r, g, b, a);
        for seg in 0..RING_SEGMENTS {
            let a0 = TAU * seg as f64 / RING_SEGMENTS as f64;
            let a1 = TAU * (seg + 1) as f64 / RING_SEGMENTS as f64;
            let corners = [(r0, a0), (r1, a0), (r1, a1), (r0, a1)]
                .map(|(r, a)| center + Vector3::new(r * a.cos(), 0.0, r * a.sin()));
            let projected: Option<Vec<Projected>> = corners.iter().map(|c| scene.camera.project(c)).collect();
            let Some(projected) = projected else {
                continue;
            };
            let depth = projected.iter().map(|p| p.depth).sum::<f64>() / 4.0;
            quads.push(RingQuad {
                points: projected.iter().map(|p| [p.x, p.y]).collect(),
                color,
                in_front: depth < center_depth,
            });
        }
    }
    quads
}

fn draw_ring_half(plot_ui: &mut egui_plot::PlotUi, quads: &[RingQuad], in_front: bool) {
    for quad in quads.iter().filter(|q| q.in_front == in_front) {
        plot_ui.polygon(
            Polygon::new("", PlotPoints::new(quad.points.clone()))
                .fill_color(quad.color)
                .stroke(egui::Stroke::NONE),
        );
    }
}

/// Draw the scene and apply orbit-control input to the camera.
pub fn draw_scene_view(ui: &mut egui::Ui, scene: &mut Scene, sprites: &BodySprites, textures: &TextureLibrary) {
    let available = ui.available_size();
    let aspect = (available.x / available.y.max(1.0)).max(0.1) as f64;

    let plot = Plot::new("scene_view")
        .data_aspect(1.0)
        .width(available.x)
        .height(available.y)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .cursor_color(egui::Color32::TRANSPARENT);

    let view: &Scene = scene;
    let response = plot.show(ui, |plot_ui| {
        plot_ui.set_plot_bounds(egui_plot::PlotBounds::from_min_max([-aspect, -1.0], [aspect, 1.0]));

        draw_stars(plot_ui, view);
        draw_orbits(plot_ui, view);

        let mut visible: Vec<(usize, &SceneBody, Projected)> = view
            .bodies()
            .iter()
            .enumerate()
            .filter_map(|(idx, body)| {
                let p = view.camera.project(&view.transform(body).position)?;
                Some((idx, body, p))
            })
            .collect();
        visible.sort_by(|a, b| b.2.depth.total_cmp(&a.2.depth));

        for (idx, body, p) in visible {
            let quads = ring_quads(view, body, p.depth, textures);
            draw_ring_half(plot_ui, &quads, false);

            if let Some(handle) = sprites.get(idx) {
                let size = (2.0 * view.camera.projected_radius(body.descriptor.size, p.depth)) as f32;
                plot_ui.image(PlotImage::new("", handle.id(), PlotPoint::new(p.x, p.y), [size, size]));
            }

            draw_ring_half(plot_ui, &quads, true);

            if let Some(label) = view.camera.project(&view.label_anchor(body)) {
                let font_size = (14.0 * 50.0 / label.depth).clamp(9.0, 16.0) as f32;
                let color = if body.kind == BodyKind::Candidate {
                    CANDIDATE_ORBIT_COLOR
                } else {
                    egui::Color32::WHITE
                };
                plot_ui.text(
                    Text::new(
                        "",
                        PlotPoint::new(label.x, label.y),
                        egui::RichText::new(body.descriptor.name).size(font_size),
                    )
                    .color(color)
                    .anchor(egui::Align2::CENTER_BOTTOM),
                );
            }
        }
    });

    if response.response.dragged() && !response.response.drag_started() {
        let drag = response.response.drag_delta();
        scene.camera.orbit(drag.x as f64 * DRAG_SENSITIVITY, drag.y as f64 * DRAG_SENSITIVITY);
    }

    if response.response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            scene.camera.zoom(1.0 + scroll as f64 * 0.001);
        }
        if let Some(touch) = ui.input(|i| i.multi_touch()) {
            scene.camera.zoom(touch.zoom_delta as f64);
        }
    }
}
