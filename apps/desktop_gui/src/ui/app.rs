use std::collections::VecDeque;

use client_core::{Action, Effect, FailureSink, TracingFailureSink, ViewState};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::widgets;

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Decode => "Response",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

pub struct DesktopGuiApp {
    state: ViewState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    sink: Box<dyn FailureSink>,
    api_base_url: String,
    status: String,
    last_error: Option<UiError>,
}

impl DesktopGuiApp {
    /// Builds the app and issues the initial list request.
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self::with_sink(cmd_tx, ui_rx, api_base_url, Box::new(TracingFailureSink))
    }

    pub fn with_sink(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: impl Into<String>,
        sink: Box<dyn FailureSink>,
    ) -> Self {
        let mut app = Self {
            state: ViewState::new(),
            cmd_tx,
            ui_rx,
            sink,
            api_base_url: api_base_url.into(),
            status: "Loading cars...".to_string(),
            last_error: None,
        };
        app.dispatch(Action::Refresh);
        app
    }

    /// Runs `action` and everything it triggers: requests go to the worker,
    /// failures go to the sink. Requests the worker cannot take are completed
    /// here as transport failures so nothing stays in flight.
    fn dispatch(&mut self, action: Action) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            for effect in self.state.update(action) {
                match effect {
                    Effect::Send(request) => {
                        if let Err((request, reason)) =
                            dispatch_backend_command(&self.cmd_tx, request, &mut self.status)
                        {
                            tracing::warn!(
                                operation = request.operation().as_str(),
                                "request not queued: {reason}"
                            );
                            pending.push_back(request.abandon(reason));
                        }
                    }
                    Effect::Report(failure) => {
                        self.sink.report(&failure);
                        self.last_error = Some(UiError::from_failure(&failure));
                    }
                }
            }
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::Completed(action) => {
                    let list_loaded = matches!(action, Action::CarsLoaded { outcome: Ok(_), .. });
                    let was_loading = self.state.is_loading();
                    self.dispatch(action);
                    // A superseded list leaves the newer request in flight.
                    if list_loaded && was_loading && !self.state.is_loading() {
                        self.last_error = None;
                    }
                }
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.status = err.message().to_string();
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.small(egui::RichText::new(&self.api_base_url).weak());
            ui.separator();
            match &self.last_error {
                Some(err) => {
                    let text = format!("{}: {}", err_label(err.category()), err.hint());
                    ui.small(egui::RichText::new(text).color(egui::Color32::from_rgb(175, 96, 96)))
                        .on_hover_text(err.message());
                }
                None => {
                    ui.small(&self.status);
                }
            }
        });
    }

    fn show_car_list(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading("Car List");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.state.is_loading(), egui::Button::new("Refresh"))
                    .clicked()
                {
                    actions.push(Action::Refresh);
                }
                if self.state.is_loading() {
                    ui.spinner();
                }
            });
        });
        ui.add_space(6.0);

        if self.state.cars().is_empty() {
            ui.label(egui::RichText::new("No cars yet.").weak());
            return;
        }

        let can_edit = !self.state.is_submitting();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for car in self.state.cars() {
                    widgets::car_card(ui, car, can_edit, self.state.is_deleting(&car.id), actions);
                    ui.add_space(6.0);
                }
            });
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.show_status_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading("Car CRUD App"));
            ui.add_space(8.0);
            widgets::notice_banner(ui, self.state.notices(), &mut actions);
            widgets::car_form(ui, &self.state, &mut actions);
            ui.add_space(12.0);
            ui.separator();
            self.show_car_list(ui, &mut actions);
        });

        widgets::delete_confirmation(ctx, &self.state, &mut actions);

        for action in actions {
            self.dispatch(action);
        }

        if self.state.is_loading() || self.state.is_submitting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_core::{Failure, FailureKind, FormField, Operation, RecordingFailureSink, Request};
    use crossbeam_channel::bounded;
    use shared::domain::{Car, CarId};

    use super::*;

    fn civic() -> Car {
        Car {
            id: CarId::Number(1),
            model: "Civic".to_string(),
            year: 2020,
            color: "red".to_string(),
            price: 15000.5,
        }
    }

    fn next_request(cmd_rx: &Receiver<BackendCommand>) -> Request {
        let BackendCommand::Execute(request) = cmd_rx.try_recv().expect("queued request");
        request
    }

    #[test]
    fn startup_queues_initial_list_request() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let app = DesktopGuiApp::new(cmd_tx, ui_rx, "http://localhost:8000");

        assert!(matches!(next_request(&cmd_rx), Request::FetchCars { .. }));
        assert!(app.state.is_loading());
    }

    #[test]
    fn completed_list_replaces_cars() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let mut app = DesktopGuiApp::new(cmd_tx, ui_rx, "http://localhost:8000");
        let Request::FetchCars { token } = next_request(&cmd_rx) else {
            panic!("expected list request");
        };

        ui_tx
            .send(UiEvent::Completed(Action::CarsLoaded {
                token,
                outcome: Ok(vec![civic()]),
            }))
            .expect("send");
        app.process_ui_events();

        assert_eq!(app.state.cars(), &[civic()]);
        assert!(!app.state.is_loading());
    }

    #[test]
    fn disconnected_worker_fails_requests_instead_of_hanging() {
        let (cmd_tx, cmd_rx) = bounded(8);
        drop(cmd_rx);
        let (_ui_tx, ui_rx) = bounded(8);
        let sink = Arc::new(RecordingFailureSink::new());
        let mut app = DesktopGuiApp::with_sink(
            cmd_tx,
            ui_rx,
            "http://localhost:8000",
            Box::new(Arc::clone(&sink)),
        );

        assert!(!app.state.is_loading());
        let failures = sink.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].operation, Operation::List);
        assert_eq!(failures[0].kind, FailureKind::Transport);
        assert_eq!(
            app.last_error.as_ref().map(UiError::category),
            Some(UiErrorCategory::Transport)
        );

        for (field, value) in [
            (FormField::Model, "Civic"),
            (FormField::Year, "2020"),
            (FormField::Color, "red"),
            (FormField::Price, "100"),
        ] {
            app.dispatch(Action::SetField {
                field,
                value: value.to_string(),
            });
        }
        app.dispatch(Action::Submit);

        assert!(!app.state.is_submitting());
        assert_eq!(app.state.form().model, "Civic");
        assert_eq!(sink.failures().last().map(|f| f.operation), Some(Operation::Create));
    }

    #[test]
    fn superseded_list_does_not_clear_error() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let mut app = DesktopGuiApp::new(cmd_tx, ui_rx, "http://localhost:8000");
        let Request::FetchCars { token: first } = next_request(&cmd_rx) else {
            panic!("expected list request");
        };

        app.dispatch(Action::Refresh);
        let Request::FetchCars { token: second } = next_request(&cmd_rx) else {
            panic!("expected list request");
        };
        let failure = Failure::new(Operation::Delete, FailureKind::Transport, "connection reset");
        app.last_error = Some(UiError::from_failure(&failure));

        ui_tx
            .send(UiEvent::Completed(Action::CarsLoaded {
                token: first,
                outcome: Ok(vec![civic()]),
            }))
            .expect("send");
        app.process_ui_events();
        assert!(app.last_error.is_some());
        assert!(app.state.cars().is_empty());

        ui_tx
            .send(UiEvent::Completed(Action::CarsLoaded {
                token: second,
                outcome: Ok(vec![civic()]),
            }))
            .expect("send");
        app.process_ui_events();
        assert!(app.last_error.is_none());
        assert_eq!(app.state.cars(), &[civic()]);
    }
}
