use eframe::egui;

use radiomics_batch::settings::ExtractorSettings;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExtractorApp {
    pub state: AppState,
}

impl ExtractorApp {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for ExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_worker();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Folder pickers and actions ----
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            panels::path_panel(ui, &mut self.state);
            ui.separator();
            panels::action_panel(ui, &mut self.state);
            ui.add_space(4.0);
        });

        // ---- Central panel: console ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::console(ui, &self.state);
        });
    }
}
