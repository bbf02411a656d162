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

fn corolla() -> Car {
    Car {
        id: CarId::Number(2),
        model: "Corolla".to_string(),
        year: 2018,
        color: "blue".to_string(),
        price: 9000.0,
    }
}

fn fill_form(state: &mut ViewState, model: &str, year: &str, color: &str, price: &str) {
    for (field, value) in [
        (FormField::Model, model),
        (FormField::Year, year),
        (FormField::Color, color),
        (FormField::Price, price),
    ] {
        assert!(state
            .update(Action::SetField {
                field,
                value: value.to_string(),
            })
            .is_empty());
    }
}

fn sent(effects: Vec<Effect>) -> Request {
    match effects.as_slice() {
        [Effect::Send(request)] => request.clone(),
        other => panic!("expected exactly one request, got {other:?}"),
    }
}

fn fetch_token(effects: Vec<Effect>) -> RequestToken {
    match sent(effects) {
        Request::FetchCars { token } => token,
        other => panic!("expected a list request, got {other:?}"),
    }
}

fn transport_failure(operation: Operation) -> Failure {
    Failure::new(operation, FailureKind::Transport, "connection refused")
}

#[test]
fn begin_edit_copies_fields_and_marks_car() {
    let mut state = ViewState::new();
    assert_eq!(state.mode(), EditMode::Idle);
    assert_eq!(state.submit_label(), "Add Car");

    assert!(state.update(Action::BeginEdit(civic())).is_empty());

    assert_eq!(state.mode(), EditMode::Editing(CarId::Number(1)));
    assert_eq!(state.submit_label(), "Update Car");
    assert_eq!(
        state.form(),
        &FormState {
            model: "Civic".to_string(),
            year: "2020".to_string(),
            color: "red".to_string(),
            price: "15000.5".to_string(),
        }
    );
}

#[test]
fn begin_edit_again_replaces_selection() {
    let mut state = ViewState::new();
    state.update(Action::BeginEdit(civic()));
    state.update(Action::BeginEdit(corolla()));

    assert_eq!(state.editing(), Some(&CarId::Number(2)));
    assert_eq!(state.form().model, "Corolla");
    assert_eq!(state.form().price, "9000");
}

#[test]
fn cancel_edit_returns_to_idle_with_empty_form() {
    let mut state = ViewState::new();
    state.update(Action::BeginEdit(civic()));
    state.update(Action::CancelEdit);

    assert_eq!(state.mode(), EditMode::Idle);
    assert!(state.form().is_empty());
}

#[test]
fn cancel_edit_while_idle_keeps_draft() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "2020", "", "");
    state.update(Action::CancelEdit);
    assert_eq!(state.form().model, "Civic");
}

#[test]
fn submit_without_marker_creates_with_coerced_fields() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "2020", "red", "15000.50");

    let request = sent(state.update(Action::Submit));
    let Request::CreateCar { fields, .. } = request else {
        panic!("expected create, got {request:?}");
    };
    assert_eq!(
        fields,
        CarFields {
            model: "Civic".to_string(),
            year: Some(2020),
            color: "red".to_string(),
            price: Some(15000.5),
        }
    );
    assert!(state.is_submitting());
}

#[test]
fn submit_while_editing_updates_full_record() {
    let mut state = ViewState::new();
    state.update(Action::BeginEdit(civic()));
    state.update(Action::SetField {
        field: FormField::Color,
        value: "black".to_string(),
    });

    let request = sent(state.update(Action::Submit));
    assert_eq!(
        request,
        Request::UpdateCar {
            token: RequestToken(1),
            id: CarId::Number(1),
            fields: CarFields {
                model: "Civic".to_string(),
                year: Some(2020),
                color: "black".to_string(),
                price: Some(15000.5),
            },
        }
    );
}

#[test]
fn submit_sends_unparseable_numbers_as_missing_values() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "twenty", "red", "cheap");

    let Request::CreateCar { fields, .. } = sent(state.update(Action::Submit)) else {
        panic!("expected create");
    };
    assert_eq!(fields.year, None);
    assert_eq!(fields.price, None);
}

#[test]
fn submit_with_blank_field_is_refused_locally() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "2020", "  ", "100");

    assert!(state.update(Action::Submit).is_empty());
    assert!(!state.is_submitting());
    let notice = state.notices().last().expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Color is required");
}

#[test]
fn successful_save_clears_form_and_refreshes() {
    let mut state = ViewState::new();
    state.update(Action::BeginEdit(civic()));
    let Request::UpdateCar { token, .. } = sent(state.update(Action::Submit)) else {
        panic!("expected update");
    };

    let effects = state.update(Action::CarSaved {
        token,
        outcome: Ok(civic()),
    });

    assert!(matches!(sent(effects), Request::FetchCars { .. }));
    assert_eq!(state.mode(), EditMode::Idle);
    assert!(state.form().is_empty());
    assert!(!state.is_submitting());
    assert_eq!(
        state.notices().last().map(|notice| notice.message.as_str()),
        Some("Civic (2020) updated")
    );
}

#[test]
fn failed_save_keeps_form_and_marker() {
    let mut state = ViewState::new();
    state.update(Action::BeginEdit(civic()));
    state.update(Action::SetField {
        field: FormField::Price,
        value: "14000".to_string(),
    });
    let before = state.form().clone();
    let Request::UpdateCar { token, .. } = sent(state.update(Action::Submit)) else {
        panic!("expected update");
    };

    let failure = transport_failure(Operation::Update);
    let effects = state.update(Action::CarSaved {
        token,
        outcome: Err(failure.clone()),
    });

    assert_eq!(effects, vec![Effect::Report(failure)]);
    assert_eq!(state.form(), &before);
    assert_eq!(state.editing(), Some(&CarId::Number(1)));
    assert!(!state.is_submitting());
    assert_eq!(
        state.notices().last().map(|notice| notice.level),
        Some(NoticeLevel::Error)
    );
}

#[test]
fn form_is_locked_while_save_in_flight() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "2020", "red", "100");
    sent(state.update(Action::Submit));

    assert!(state.update(Action::Submit).is_empty());
    state.update(Action::SetField {
        field: FormField::Model,
        value: "Accord".to_string(),
    });
    state.update(Action::BeginEdit(corolla()));

    assert_eq!(state.form().model, "Civic");
    assert_eq!(state.mode(), EditMode::Idle);
}

#[test]
fn save_completion_with_unknown_token_is_ignored() {
    let mut state = ViewState::new();
    fill_form(&mut state, "Civic", "2020", "red", "100");
    sent(state.update(Action::Submit));

    let effects = state.update(Action::CarSaved {
        token: RequestToken(99),
        outcome: Ok(civic()),
    });

    assert!(effects.is_empty());
    assert!(state.is_submitting());
    assert_eq!(state.form().model, "Civic");
}

#[test]
fn superseded_list_completion_is_ignored() {
    let mut state = ViewState::new();
    let first = fetch_token(state.update(Action::Refresh));
    let second = fetch_token(state.update(Action::Refresh));
    assert!(second > first);

    assert!(state
        .update(Action::CarsLoaded {
            token: second,
            outcome: Ok(vec![corolla()]),
        })
        .is_empty());
    assert!(state
        .update(Action::CarsLoaded {
            token: first,
            outcome: Ok(vec![civic()]),
        })
        .is_empty());

    assert_eq!(state.cars(), &[corolla()]);
    assert!(!state.is_loading());
}

#[test]
fn stale_list_failure_is_reported_without_notice() {
    let mut state = ViewState::new();
    let first = fetch_token(state.update(Action::Refresh));
    fetch_token(state.update(Action::Refresh));

    let failure = transport_failure(Operation::List);
    let effects = state.update(Action::CarsLoaded {
        token: first,
        outcome: Err(failure.clone()),
    });

    assert_eq!(effects, vec![Effect::Report(failure)]);
    assert_eq!(state.notices().count(), 0);
    assert!(state.is_loading());
}

#[test]
fn failed_list_keeps_previous_cars() {
    let mut state = ViewState::new();
    let token = fetch_token(state.update(Action::Refresh));
    state.update(Action::CarsLoaded {
        token,
        outcome: Ok(vec![civic(), corolla()]),
    });

    let token = fetch_token(state.update(Action::Refresh));
    let effects = state.update(Action::CarsLoaded {
        token,
        outcome: Err(transport_failure(Operation::List)),
    });

    assert!(matches!(effects.as_slice(), [Effect::Report(_)]));
    assert_eq!(state.cars(), &[civic(), corolla()]);
}

#[test]
fn declined_delete_sends_nothing() {
    let mut state = ViewState::new();
    state.update(Action::RequestDelete(CarId::Number(1)));
    assert_eq!(state.pending_delete(), Some(&CarId::Number(1)));

    assert!(state.update(Action::DeclineDelete).is_empty());
    assert_eq!(state.pending_delete(), None);
    assert!(state.update(Action::ConfirmDelete).is_empty());
}

#[test]
fn duplicate_delete_is_suppressed_while_in_flight() {
    let mut state = ViewState::new();
    state.update(Action::RequestDelete(CarId::Number(1)));
    assert_eq!(
        sent(state.update(Action::ConfirmDelete)),
        Request::DeleteCar {
            id: CarId::Number(1)
        }
    );
    assert!(state.is_deleting(&CarId::Number(1)));

    state.update(Action::RequestDelete(CarId::Number(1)));
    assert_eq!(state.pending_delete(), None);
    assert!(state.update(Action::ConfirmDelete).is_empty());
}

#[test]
fn delete_completion_always_refreshes() {
    let mut state = ViewState::new();
    state.update(Action::RequestDelete(CarId::Number(1)));
    sent(state.update(Action::ConfirmDelete));

    let failure = Failure::new(Operation::Delete, FailureKind::Decode, "expected value");
    let effects = state.update(Action::CarDeleted {
        id: CarId::Number(1),
        outcome: Err(failure.clone()),
    });

    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::Report(failure));
    assert!(matches!(
        effects[1],
        Effect::Send(Request::FetchCars { .. })
    ));
    assert!(!state.is_deleting(&CarId::Number(1)));
}

#[test]
fn abandoned_request_completes_as_transport_failure() {
    let mut state = ViewState::new();
    let request = sent(state.update(Action::Refresh));

    let effects = state.update(request.abandon("backend worker disconnected"));

    let [Effect::Report(failure)] = effects.as_slice() else {
        panic!("expected a report, got {effects:?}");
    };
    assert_eq!(failure.operation, Operation::List);
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(!state.is_loading());
}

#[test]
fn notices_are_capped_and_dismissable() {
    let mut state = ViewState::new();
    for _ in 0..(MAX_NOTICES + 2) {
        state.update(Action::Submit);
    }
    assert_eq!(state.notices().count(), MAX_NOTICES);

    let first = state.notices().next().map(|notice| notice.id).expect("notice");
    assert_eq!(first, 3);
    state.update(Action::DismissNotice(first));
    assert_eq!(state.notices().count(), MAX_NOTICES - 1);
    assert!(state.notices().all(|notice| notice.id != first));
}
