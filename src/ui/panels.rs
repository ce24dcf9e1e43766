use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use radiomics_batch::data::model::FeatureType;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui
                .add_enabled(!state.is_busy(), egui::Button::new("Load settings…"))
                .clicked()
            {
                open_settings_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "bin width {}, header {:?}",
            state.settings.engine.bin_width, state.settings.header_mode
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder pickers
// ---------------------------------------------------------------------------

/// Image / mask / output folder rows with browse buttons.
pub fn path_panel(ui: &mut Ui, state: &mut AppState) {
    let enabled = !state.is_busy();
    egui::Grid::new("paths")
        .num_columns(3)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Image Path:");
            ui.add(egui::TextEdit::singleline(&mut state.image_dir).desired_width(360.0));
            if ui.add_enabled(enabled, egui::Button::new("Browse")).clicked() {
                if let Some(dir) = pick_folder("Select Image Folder") {
                    state.set_image_dir(&dir);
                }
            }
            ui.end_row();

            ui.label("Mask Path:");
            ui.add(egui::TextEdit::singleline(&mut state.mask_dir).desired_width(360.0));
            if ui.add_enabled(enabled, egui::Button::new("Browse")).clicked() {
                if let Some(dir) = pick_folder("Select Mask Folder") {
                    state.set_mask_dir(&dir);
                }
            }
            ui.end_row();

            ui.label("Output Path:");
            ui.add(egui::TextEdit::singleline(&mut state.output_dir).desired_width(360.0));
            if ui.add_enabled(enabled, egui::Button::new("Browse")).clicked() {
                if let Some(dir) = pick_folder("Select Output Folder") {
                    state.output_dir = dir.display().to_string();
                }
            }
            ui.end_row();

            ui.label("");
            ui.label("");
            ui.label(state.detected_label());
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One button per feature type, plus a spinner while a batch runs.
pub fn action_panel(ui: &mut Ui, state: &mut AppState) {
    let enabled = !state.is_busy();
    ui.horizontal(|ui: &mut Ui| {
        for feature_type in FeatureType::BUTTONS {
            let text = format!("Extract {} Features", feature_type.label());
            if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                let ctx = ui.ctx().clone();
                state.start_batch(feature_type, move || ctx.request_repaint());
            }
        }
        if state.is_busy() {
            ui.spinner();
        }
    });
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

pub fn console(ui: &mut Ui, state: &AppState) {
    ui.label("Output Console:");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            ui.add(
                egui::TextEdit::multiline(&mut state.console.as_str())
                    .font(egui::TextStyle::Monospace)
                    .desired_width(f32::INFINITY),
            );
        });
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

fn pick_folder(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new().set_title(title).pick_folder()
}

pub fn open_settings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load extraction settings")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_settings(&path);
    }
}
