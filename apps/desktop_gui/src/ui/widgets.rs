use chrono::Local;
use client_core::{Action, FormField, Notice, NoticeLevel, ViewState, DELETE_CONFIRMATION};
use shared::domain::Car;

const EDIT_FILL: egui::Color32 = egui::Color32::from_rgb(202, 138, 4);
const DELETE_FILL: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);

/// Model, year, color and price inputs plus the submit row. Locked while a
/// save is in flight.
pub fn car_form(ui: &mut egui::Ui, state: &ViewState, actions: &mut Vec<Action>) {
    let locked = state.is_submitting();
    let mut submit_requested = false;

    for field in FormField::ALL {
        let mut value = state.form().get(field).to_string();
        let response = ui.add_enabled(
            !locked,
            egui::TextEdit::singleline(&mut value)
                .hint_text(field.placeholder())
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            actions.push(Action::SetField { field, value });
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit_requested = true;
        }
        ui.add_space(4.0);
    }

    ui.horizontal(|ui| {
        let submit = egui::Button::new(egui::RichText::new(state.submit_label()).strong());
        if ui.add_enabled(!locked, submit).clicked() {
            submit_requested = true;
        }
        if state.editing().is_some() {
            let cancel = ui.add_enabled(!locked, egui::Button::new("Cancel"));
            if cancel.clicked() {
                actions.push(Action::CancelEdit);
            }
        }
        if locked {
            ui.spinner();
        }
    });

    if submit_requested {
        actions.push(Action::Submit);
    }
}

pub fn car_card(
    ui: &mut egui::Ui,
    car: &Car,
    can_edit: bool,
    deleting: bool,
    actions: &mut Vec<Action>,
) {
    egui::Frame::group(ui.style())
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(car.title()).strong().size(16.0));
                    ui.label(car.color_label());
                    ui.label(car.price_label());
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let delete = egui::Button::new(
                        egui::RichText::new(if deleting { "Deleting..." } else { "Delete" })
                            .color(egui::Color32::WHITE),
                    )
                    .fill(DELETE_FILL);
                    if ui.add_enabled(!deleting, delete).clicked() {
                        actions.push(Action::RequestDelete(car.id.clone()));
                    }

                    let edit = egui::Button::new(
                        egui::RichText::new("Edit").color(egui::Color32::WHITE),
                    )
                    .fill(EDIT_FILL);
                    if ui.add_enabled(can_edit, edit).clicked() {
                        actions.push(Action::BeginEdit(car.clone()));
                    }
                });
            });
        });
}

/// Blocks the rest of the window until the pending delete is answered.
pub fn delete_confirmation(ctx: &egui::Context, state: &ViewState, actions: &mut Vec<Action>) {
    let Some(id) = state.pending_delete() else {
        return;
    };
    let car = state.cars().iter().find(|car| &car.id == id);

    let modal = egui::Modal::new(egui::Id::new("confirm_delete_car")).show(ctx, |ui| {
        ui.set_max_width(320.0);
        ui.label(egui::RichText::new(DELETE_CONFIRMATION).strong());
        if let Some(car) = car {
            ui.label(car.title());
        }
        ui.add_space(8.0);

        let mut answer = None;
        ui.horizontal(|ui| {
            let confirm = egui::Button::new(
                egui::RichText::new("Delete").color(egui::Color32::WHITE),
            )
            .fill(DELETE_FILL);
            if ui.add(confirm).clicked() {
                answer = Some(Action::ConfirmDelete);
            }
            if ui.button("Cancel").clicked() {
                answer = Some(Action::DeclineDelete);
            }
        });
        answer
    });

    match modal.inner {
        Some(action) => actions.push(action),
        None if modal.should_close() => actions.push(Action::DeclineDelete),
        None => {}
    }
}

pub fn notice_banner<'a>(
    ui: &mut egui::Ui,
    notices: impl Iterator<Item = &'a Notice>,
    actions: &mut Vec<Action>,
) {
    for notice in notices {
        let (fill, stroke) = match notice.level {
            NoticeLevel::Info => (
                egui::Color32::from_rgb(30, 83, 56),
                egui::Color32::from_rgb(74, 160, 110),
            ),
            NoticeLevel::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Color32::from_rgb(175, 96, 96),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, stroke))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(&notice.message).color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Dismiss").clicked() {
                            actions.push(Action::DismissNotice(notice.id));
                        }
                        ui.label(
                            egui::RichText::new(
                                notice
                                    .raised_at
                                    .with_timezone(&Local)
                                    .format("%H:%M:%S")
                                    .to_string(),
                            )
                            .small()
                            .color(egui::Color32::LIGHT_GRAY),
                        );
                    });
                });
            });
        ui.add_space(4.0);
    }
}
