use eframe::egui;

use crate::state::{AppState, UiEvent};
use crate::ui::{panels, Events};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyEdaApp {
    pub state: AppState,
}

impl RustyEdaApp {
    /// Files dropped onto the window become uploads.
    fn collect_dropped_files(ctx: &egui::Context, events: &mut Events) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                events.push(UiEvent::OpenFile(path));
            } else if let Some(bytes) = file.bytes {
                events.push(UiEvent::DropFile {
                    name: file.name,
                    bytes,
                });
            }
        }
    }
}

impl eframe::App for RustyEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Events = Vec::new();
        Self::collect_dropped_files(ctx, &mut events);

        // ---- Top panel: title bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: data source + filter ----
        egui::SidePanel::left("source_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state, &mut events);
            });

        // ---- Central panel: analysis sections ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("analysis")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::central_panel(ui, &self.state, &mut events);
                });
        });

        if !events.is_empty() {
            for event in events {
                log::debug!("ui event: {event:?}");
                self.state.handle(event);
            }
            ctx.request_repaint();
        }
    }
}
