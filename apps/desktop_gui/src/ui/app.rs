use arboard::Clipboard;
use client_core::NarratorSettings;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{find_voice, VoiceId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorCategory, UiEvent},
    orchestration::NarrationController,
    reducer::{NarrationEvent, NarrationState},
};

pub const SETTINGS_STORAGE_KEY: &str = "narrator_gui.settings";

const WARNING_TEXT_COLOR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(254, 226, 226);
const ERROR_STROKE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

/// Settings that survive restarts through eframe storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedNarratorSettings {
    pub last_voice: Option<String>,
}

pub struct NarratorApp {
    controller: NarrationController,
    ui_rx: Receiver<UiEvent>,
    status_banner: Option<StatusBanner>,
    playback_active: bool,
}

impl NarratorApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &NarratorSettings,
        persisted: Option<PersistedNarratorSettings>,
    ) -> Self {
        // A remembered voice only counts if the current table still offers it.
        let voice_id = persisted
            .and_then(|p| p.last_voice)
            .filter(|id| find_voice(&settings.voices, id).is_some())
            .map(VoiceId::new)
            .unwrap_or_else(|| settings.default_voice.clone());

        let state = NarrationState::new(settings.voices.clone(), voice_id, settings.max_chars);
        Self {
            controller: NarrationController::new(state, cmd_tx),
            ui_rx,
            status_banner: None,
            playback_active: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.controller.set_status(message),
                UiEvent::NarrationFinished {
                    generation,
                    outcome,
                } => {
                    let succeeded = outcome.is_ok();
                    let accepted = self.controller.state().accepts_response(generation);
                    self.controller.handle(NarrationEvent::ResponseReceived {
                        generation,
                        outcome,
                    });
                    if accepted && succeeded {
                        self.playback_active = false;
                        self.controller.set_status("Audio ready");
                    }
                }
                UiEvent::AudioSaved(path) => {
                    let message = format!("Saved audio to {}", path.display());
                    self.controller.set_status(message.clone());
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Info,
                        message,
                    });
                }
                UiEvent::PlaybackStarted => {
                    self.playback_active = true;
                    self.controller.set_status("Playing");
                }
                UiEvent::PlaybackFinished => {
                    self.playback_active = false;
                    self.controller.set_status("Playback finished");
                }
                UiEvent::Error(err) => self.show_error(err),
            }
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        if err.category() == UiErrorCategory::Playback {
            self.playback_active = false;
        }
        self.controller.set_status(err.message().to_string());
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: err.banner_text(),
        });
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.heading(egui::RichText::new("Book Narrator").strong().size(28.0));
            ui.weak("Convert your text into audio with ease!");
        });
        ui.add_space(6.0);
        ui.separator();
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Info => (
                    egui::Color32::from_rgb(38, 78, 62),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(86, 150, 118)),
                ),
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let stats = self.controller.state().stats();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Enter Text:").strong().size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let counter = egui::RichText::new(self.controller.state().counter_label()).small();
                if stats.over_threshold {
                    ui.label(counter.color(WARNING_TEXT_COLOR));
                } else {
                    ui.label(counter.weak());
                }
            });
        });

        let mut text = self.controller.state().text().to_string();
        let response = ui.add(
            egui::TextEdit::multiline(&mut text)
                .id_salt("narration_text")
                .hint_text("Enter your text here...")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.controller.handle(NarrationEvent::TextChanged(text));
        }
    }

    fn show_voice_select(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Select Voice:").strong().size(16.0));

        let state = self.controller.state();
        let mut selected = state.voice_id().clone();
        let selected_label = find_voice(state.voices(), selected.as_str())
            .map(|voice| voice.name.clone())
            .unwrap_or_else(|| selected.to_string());
        let voices = state.voices().to_vec();

        egui::ComboBox::from_id_salt("voice_select")
            .selected_text(selected_label)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for voice in &voices {
                    ui.selectable_value(&mut selected, voice.id.clone(), voice.name.as_str())
                        .on_hover_text(voice.description.as_str());
                }
            });

        if let Some(voice) = find_voice(&voices, selected.as_str()) {
            ui.weak(voice.description.as_str());
        }

        if &selected != self.controller.state().voice_id() {
            self.controller.handle(NarrationEvent::VoiceSelected(selected));
        }
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        let submitting = self.controller.state().is_submitting();
        ui.horizontal(|ui| {
            let label = if submitting {
                "Processing..."
            } else {
                "Generate Audio"
            };
            let generate = egui::Button::new(egui::RichText::new(label).strong().size(16.0))
                .min_size(egui::vec2((ui.available_width() - 110.0).max(120.0), 40.0));
            if ui.add_enabled(!submitting, generate).clicked() {
                self.controller.handle(NarrationEvent::SubmitRequested);
            }
            if submitting {
                ui.spinner();
            }

            let clear = egui::Button::new("Clear").min_size(egui::vec2(90.0, 40.0));
            if ui.add(clear).clicked() {
                self.controller.handle(NarrationEvent::ClearRequested);
                self.playback_active = false;
                self.controller.stop_playback();
            }
        });
    }

    fn show_narration_error(&self, ui: &mut egui::Ui) {
        let Some(message) = self.controller.state().error_message() else {
            return;
        };
        ui.add_space(10.0);
        egui::Frame::NONE
            .fill(ERROR_FILL)
            .stroke(egui::Stroke::new(1.0, ERROR_STROKE))
            .corner_radius(4.0)
            .inner_margin(egui::Margin::symmetric(12, 10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new(message).color(ERROR_TEXT));
            });
    }

    fn show_audio_panel(&mut self, ui: &mut egui::Ui) {
        let Some(panel) = self.controller.state().audio_panel() else {
            return;
        };
        let audio_url = panel.audio_url.to_string();
        let download_label = format!("Download Audio ({})", panel.download_filename);

        ui.add_space(16.0);
        egui::Frame::NONE
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(10.0)
            .inner_margin(egui::Margin::symmetric(16, 14))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.heading("Generated Audio");
                ui.add_space(4.0);
                ui.hyperlink_to(audio_url.as_str(), audio_url.as_str());
                ui.add_space(8.0);

                ui.horizontal_wrapped(|ui| {
                    if cfg!(feature = "audio-playback") {
                        if self.playback_active {
                            if ui.button("⏹ Stop").clicked() {
                                self.controller.stop_playback();
                                self.playback_active = false;
                                self.controller.set_status("Playback stopped");
                            }
                        } else if ui.button("▶ Play").clicked() {
                            self.controller.request_playback();
                        }
                    }

                    if ui.button(download_label).clicked() {
                        self.controller.request_download();
                    }

                    if ui.button("Copy link").clicked() {
                        match Clipboard::new().and_then(|mut c| c.set_text(audio_url.clone())) {
                            Ok(()) => self.controller.set_status("Audio link copied"),
                            Err(err) => {
                                tracing::warn!("clipboard unavailable: {err}");
                                self.controller.set_status("Clipboard unavailable");
                            }
                        }
                    }
                });
            });
    }

    fn show_status_line(&self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.separator();
        ui.horizontal_wrapped(|ui| {
            ui.small("Status:");
            ui.small(egui::RichText::new(self.controller.status()).weak());
        });
    }
}

impl eframe::App for NarratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let submit_shortcut =
            ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter));
        if submit_shortcut {
            self.controller.handle(NarrationEvent::SubmitRequested);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 8.0);
                self.show_header(ui);
                self.show_status_banner(ui);
                self.show_text_input(ui);
                ui.add_space(8.0);
                self.show_voice_select(ui);
                ui.add_space(12.0);
                self.show_actions(ui);
                self.show_narration_error(ui);
                self.show_audio_panel(ui);
                self.show_status_line(ui);
            });
        });

        if self.controller.state().is_submitting() || self.playback_active {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedNarratorSettings {
            last_voice: Some(self.controller.state().voice_id().to_string()),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
