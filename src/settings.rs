//! Side-panel UI: candidate sliders, prediction, backend status and view
//! controls.

use crate::app::UiState;
use crate::candidate::CandidateParam;
use crate::prediction::{BackendStatusState, PredictionClient};
use crate::texture::TextureLibrary;
use eframe::egui;
use std::sync::Arc;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 90, 80);
const ONLINE_COLOR: egui::Color32 = egui::Color32::from_rgb(110, 200, 120);

/// What the panel asked the app to do this frame.
#[derive(Default)]
pub(crate) struct PanelActions {
    pub(crate) params_changed: bool,
    pub(crate) reset_camera: bool,
}

impl UiState {
    pub(crate) fn show_settings(
        &mut self,
        ui: &mut egui::Ui,
        client: &Arc<PredictionClient>,
        textures: &TextureLibrary,
    ) -> PanelActions {
        let mut actions = PanelActions::default();

        ui.heading("Exoplanet Simulator");
        ui.add_space(4.0);

        for param in CandidateParam::ALL {
            let mut value = self.params.get(param);
            ui.label(param.label());
            let response = ui
                .add(
                    egui::Slider::new(&mut value, param.range())
                        .step_by(param.step())
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text(param.key());
            if response.changed() && self.params.set(param, value) {
                actions.params_changed = true;
            }
        }
        let tint = crate::candidate::stellar_tint(self.params.stellar_temp_k);
        let [r, g, b] = tint.color();
        ui.horizontal(|ui| {
            ui.label("Host star:");
            ui.label(egui::RichText::new(tint.label()).color(egui::Color32::from_rgb(r, g, b)));
        });

        ui.add_space(6.0);
        let in_flight = self.requester.is_in_flight();
        let label = if in_flight { "Predicting..." } else { "Predict" };
        if ui.add_enabled(!in_flight, egui::Button::new(label)).clicked() {
            self.predict(client);
        }
        if in_flight {
            ui.horizontal(|ui| {
                ui.spinner();
                if let Some(elapsed) = self.requester.elapsed() {
                    ui.label(egui::RichText::new(format!("{:.1} s", elapsed.as_secs_f64())).weak());
                }
            });
        }

        if let Some(report) = &self.last_report {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(format!("Prediction: {}", report.result.label())).strong());
            for line in report.result.formatted_probabilities() {
                ui.label(line);
            }
            if let Some(message) = report.result.error_message() {
                ui.label(egui::RichText::new(message).color(ERROR_COLOR));
            }
            ui.label(egui::RichText::new(report.summary()).weak().small());
        }

        ui.separator();
        ui.label(egui::RichText::new("Backend").strong());
        ui.label(egui::RichText::new(client.base_url()).monospace());
        match &self.backend {
            BackendStatusState::Unknown => {
                ui.label("Not checked");
            }
            BackendStatusState::Checking(_) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Checking...");
                });
            }
            BackendStatusState::Reported(status) => {
                let color = if status.is_online() { ONLINE_COLOR } else { ERROR_COLOR };
                ui.label(egui::RichText::new(&status.status).color(color));
                if !status.message.is_empty() {
                    ui.label(egui::RichText::new(&status.message).weak());
                }
            }
            BackendStatusState::Unreachable(err) => {
                ui.label(egui::RichText::new("unreachable").color(ERROR_COLOR));
                ui.label(egui::RichText::new(err).weak().small());
            }
        }
        if ui.add_enabled(!self.backend.is_checking(), egui::Button::new("Check backend")).clicked() {
            self.backend.check(client);
        }

        ui.separator();
        ui.label(egui::RichText::new("View").strong());
        if ui.button("Reset camera").clicked() {
            actions.reset_camera = true;
        }
        let pending = textures.pending();
        if pending > 0 {
            ui.label(egui::RichText::new(format!("Loading textures ({pending})")).weak());
        }
        let failed = textures.failed().count();
        if failed > 0 {
            ui.label(egui::RichText::new(format!("{failed} texture(s) missing, using flat colors")).weak())
                .on_hover_text(textures.failed().map(|(f, _)| f).collect::<Vec<_>>().join(", "));
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            let hash = env!("GIT_HASH");
            let version = if hash.is_empty() {
                format!("v{}", env!("CARGO_PKG_VERSION"))
            } else {
                format!("v{} ({hash})", env!("CARGO_PKG_VERSION"))
            };
            ui.label(egui::RichText::new(version).weak().small());
        });

        actions
    }
}
