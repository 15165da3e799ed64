//! Application shell and eframe integration.
//!
//! Owns the scene, the UI state and the background workers, and drives them
//! from the egui update loop.

use crate::candidate::CandidateParameters;
use crate::celestial::texture_files;
use crate::config::AppConfig;
use crate::drawing::{draw_scene_view, BodySprites};
use crate::prediction::{BackendStatusState, PredictionClient, PredictionReport, PredictionRequester};
use crate::scene::Scene;
use crate::texture::TextureLibrary;
use eframe::egui;
use std::sync::Arc;

/// Everything the side panel reads and edits.
pub(crate) struct UiState {
    pub(crate) params: CandidateParameters,
    pub(crate) requester: PredictionRequester,
    pub(crate) last_report: Option<PredictionReport>,
    pub(crate) backend: BackendStatusState,
}

impl UiState {
    pub(crate) fn new(params: CandidateParameters) -> Self {
        Self {
            params,
            requester: PredictionRequester::default(),
            last_report: None,
            backend: BackendStatusState::Unknown,
        }
    }

    /// Start a prediction for the current parameters. The previous report is
    /// cleared once the request is on its way.
    pub(crate) fn predict(&mut self, client: &Arc<PredictionClient>) -> bool {
        let started = self.requester.submit(client, self.params);
        if started {
            self.last_report = None;
        }
        started
    }

    /// Collect finished background work. Returns `true` if anything arrived.
    pub(crate) fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some((result, elapsed)) = self.requester.poll() {
            self.last_report = Some(PredictionReport::new(result, elapsed));
            changed = true;
        }
        changed |= self.backend.poll();
        changed
    }
}

pub(crate) struct App {
    ui_state: UiState,
    scene: Scene,
    client: Arc<PredictionClient>,
    textures: TextureLibrary,
    sprites: BodySprites,
    sprite_size: usize,
}

impl App {
    pub(crate) fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let client = Arc::new(PredictionClient::new(&config.backend_url, config.request.timeouts()));
        log::info!("using classifier backend at {}", client.base_url());

        let textures = TextureLibrary::spawn(config.assets_dir.clone(), texture_files(), config.scene.max_texture_width);
        let mut ui_state = UiState::new(config.candidate);
        ui_state.backend.check(&client);

        Self {
            scene: Scene::new(&config.scene, &config.candidate),
            ui_state,
            client,
            textures,
            sprites: BodySprites::default(),
            sprite_size: config.scene.sprite_size,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals({
            let mut vis = egui::Visuals::dark();
            let black = egui::Color32::BLACK;
            vis.window_fill = black;
            vis.panel_fill = black;
            vis.extreme_bg_color = black;
            vis.faint_bg_color = egui::Color32::from_gray(15);
            vis
        });

        self.textures.poll();
        self.ui_state.poll();

        self.scene.tick(ctx.input(|i| i.time));
        self.sprites.update(ctx, &self.scene, &self.textures, self.sprite_size);

        egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                let actions = self.ui_state.show_settings(ui, &self.client, &self.textures);
                if actions.params_changed && self.scene.sync_candidate(&self.ui_state.params) {
                    log::debug!("candidate node updated");
                }
                if actions.reset_camera {
                    self.scene.camera.reset();
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                draw_scene_view(ui, &mut self.scene, &self.sprites, &self.textures);
            });

        // Orbits animate every frame, which also keeps in-flight requests polled.
        ctx.request_repaint();
    }
}
