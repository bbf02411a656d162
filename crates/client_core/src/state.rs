//! Client state for the car list and the reducer that moves it.
//!
//! [`ViewState::update`] is the only place state changes. It never performs
//! I/O; network work and failure reporting come back as [`Effect`]s for the
//! caller to run, and their completions are fed back in as [`Action`]s.

use std::{
    collections::{BTreeSet, VecDeque},
    fmt,
};

use chrono::{DateTime, Utc};
use shared::{
    domain::{Car, CarId},
    protocol::CarFields,
};
use tracing::debug;

use crate::{
    coerce::{coerce_price, coerce_year},
    sink::{Failure, FailureKind, Operation},
};

pub const MAX_NOTICES: usize = 5;
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this car?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Model,
    Year,
    Color,
    Price,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Model,
        FormField::Year,
        FormField::Color,
        FormField::Price,
    ];

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Model => "Car Model",
            FormField::Year => "Year",
            FormField::Color => "Color",
            FormField::Price => "Price",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placeholder())
    }
}

/// Raw form text. Numbers stay text until [`FormState::to_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub model: String,
    pub year: String,
    pub color: String,
    pub price: String,
}

impl FormState {
    pub fn from_car(car: &Car) -> Self {
        Self {
            model: car.model.clone(),
            year: car.year.to_string(),
            color: car.color.clone(),
            price: car.price.to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Model => &self.model,
            FormField::Year => &self.year,
            FormField::Color => &self.color,
            FormField::Price => &self.price,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Model => self.model = value,
            FormField::Year => self.year = value,
            FormField::Color => self.color = value,
            FormField::Price => self.price = value,
        }
    }

    /// First field left blank, in form order.
    pub fn first_missing(&self) -> Option<FormField> {
        FormField::ALL
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        FormField::ALL
            .into_iter()
            .all(|field| self.get(field).is_empty())
    }

    pub fn to_fields(&self) -> CarFields {
        CarFields {
            model: self.model.clone(),
            year: coerce_year(&self.year),
            color: self.color.clone(),
            price: coerce_price(&self.price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Idle,
    Editing(CarId),
}

/// Generation number attached to a request; only the newest one of a kind counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    FetchCars {
        token: RequestToken,
    },
    CreateCar {
        token: RequestToken,
        fields: CarFields,
    },
    UpdateCar {
        token: RequestToken,
        id: CarId,
        fields: CarFields,
    },
    DeleteCar {
        id: CarId,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::FetchCars { .. } => Operation::List,
            Request::CreateCar { .. } => Operation::Create,
            Request::UpdateCar { .. } => Operation::Update,
            Request::DeleteCar { .. } => Operation::Delete,
        }
    }

    /// Completion for a request that could not be handed to the transport.
    pub fn abandon(self, message: impl Into<String>) -> Action {
        let failure = Failure::new(self.operation(), FailureKind::Transport, message);
        match self {
            Request::FetchCars { token } => Action::CarsLoaded {
                token,
                outcome: Err(failure),
            },
            Request::CreateCar { token, .. } | Request::UpdateCar { token, .. } => {
                Action::CarSaved {
                    token,
                    outcome: Err(failure),
                }
            }
            Request::DeleteCar { id } => Action::CarDeleted {
                id,
                outcome: Err(failure),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(Request),
    Report(Failure),
}

#[derive(Debug, Clone)]
pub enum Action {
    Refresh,
    SetField {
        field: FormField,
        value: String,
    },
    BeginEdit(Car),
    CancelEdit,
    Submit,
    RequestDelete(CarId),
    ConfirmDelete,
    DeclineDelete,
    CarsLoaded {
        token: RequestToken,
        outcome: Result<Vec<Car>, Failure>,
    },
    CarSaved {
        token: RequestToken,
        outcome: Result<Car, Failure>,
    },
    CarDeleted {
        id: CarId,
        outcome: Result<(), Failure>,
    },
    DismissNotice(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ViewState {
    cars: Vec<Car>,
    form: FormState,
    editing: Option<CarId>,
    pending_delete: Option<CarId>,
    notices: VecDeque<Notice>,
    next_token: u64,
    next_notice_id: u64,
    list_in_flight: Option<RequestToken>,
    submit_in_flight: Option<RequestToken>,
    deletes_in_flight: BTreeSet<CarId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn editing(&self) -> Option<&CarId> {
        self.editing.as_ref()
    }

    pub fn mode(&self) -> EditMode {
        match &self.editing {
            Some(id) => EditMode::Editing(id.clone()),
            None => EditMode::Idle,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing.is_some() {
            "Update Car"
        } else {
            "Add Car"
        }
    }

    pub fn pending_delete(&self) -> Option<&CarId> {
        self.pending_delete.as_ref()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn is_loading(&self) -> bool {
        self.list_in_flight.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_in_flight.is_some()
    }

    pub fn is_deleting(&self, id: &CarId) -> bool {
        self.deletes_in_flight.contains(id)
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Refresh => vec![self.fetch()],
            Action::SetField { field, value } => {
                if self.form_locked("set_field") {
                    return Vec::new();
                }
                self.form.set(field, value);
                Vec::new()
            }
            Action::BeginEdit(car) => {
                if self.form_locked("begin_edit") {
                    return Vec::new();
                }
                self.form = FormState::from_car(&car);
                self.editing = Some(car.id);
                Vec::new()
            }
            Action::CancelEdit => {
                if self.form_locked("cancel_edit") {
                    return Vec::new();
                }
                if self.editing.take().is_some() {
                    self.form = FormState::default();
                }
                Vec::new()
            }
            Action::Submit => self.submit(),
            Action::RequestDelete(id) => {
                if self.deletes_in_flight.contains(&id) {
                    debug!(car_id = %id, "delete already in flight; ignoring request");
                } else {
                    self.pending_delete = Some(id);
                }
                Vec::new()
            }
            Action::ConfirmDelete => {
                let Some(id) = self.pending_delete.take() else {
                    return Vec::new();
                };
                if !self.deletes_in_flight.insert(id.clone()) {
                    debug!(car_id = %id, "delete already in flight; ignoring confirmation");
                    return Vec::new();
                }
                vec![Effect::Send(Request::DeleteCar { id })]
            }
            Action::DeclineDelete => {
                self.pending_delete = None;
                Vec::new()
            }
            Action::CarsLoaded { token, outcome } => self.cars_loaded(token, outcome),
            Action::CarSaved { token, outcome } => self.car_saved(token, outcome),
            Action::CarDeleted { id, outcome } => {
                self.deletes_in_flight.remove(&id);
                let mut effects = match outcome {
                    Ok(()) => {
                        self.notify(NoticeLevel::Info, "Car deleted");
                        Vec::new()
                    }
                    Err(failure) => self.fail(failure),
                };
                effects.push(self.fetch());
                effects
            }
            Action::DismissNotice(id) => {
                self.notices.retain(|notice| notice.id != id);
                Vec::new()
            }
        }
    }

    fn form_locked(&self, action: &'static str) -> bool {
        if self.submit_in_flight.is_some() {
            debug!(action, "form locked while a save is in flight");
            return true;
        }
        false
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    fn fetch(&mut self) -> Effect {
        let token = self.issue_token();
        self.list_in_flight = Some(token);
        Effect::Send(Request::FetchCars { token })
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.submit_in_flight.is_some() {
            debug!("save already in flight; ignoring submit");
            return Vec::new();
        }
        if let Some(field) = self.form.first_missing() {
            self.notify(NoticeLevel::Error, format!("{field} is required"));
            return Vec::new();
        }

        let fields = self.form.to_fields();
        let token = self.issue_token();
        self.submit_in_flight = Some(token);
        let request = match &self.editing {
            Some(id) => Request::UpdateCar {
                token,
                id: id.clone(),
                fields,
            },
            None => Request::CreateCar { token, fields },
        };
        vec![Effect::Send(request)]
    }

    fn cars_loaded(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<Car>, Failure>,
    ) -> Vec<Effect> {
        if self.list_in_flight != Some(token) {
            debug!(token = token.0, "ignoring superseded car list");
            return match outcome {
                Ok(_) => Vec::new(),
                Err(failure) => vec![Effect::Report(failure)],
            };
        }
        self.list_in_flight = None;

        match outcome {
            Ok(cars) => {
                self.cars = cars;
                Vec::new()
            }
            Err(failure) => self.fail(failure),
        }
    }

    fn car_saved(&mut self, token: RequestToken, outcome: Result<Car, Failure>) -> Vec<Effect> {
        if self.submit_in_flight != Some(token) {
            debug!(token = token.0, "ignoring completion of an unknown save");
            return Vec::new();
        }
        self.submit_in_flight = None;

        match outcome {
            Ok(car) => {
                let verb = if self.editing.is_some() {
                    "updated"
                } else {
                    "added"
                };
                self.form = FormState::default();
                self.editing = None;
                self.notify(NoticeLevel::Info, format!("{} {verb}", car.title()));
                vec![self.fetch()]
            }
            Err(failure) => self.fail(failure),
        }
    }

    fn fail(&mut self, failure: Failure) -> Vec<Effect> {
        self.notify(NoticeLevel::Error, failure.summary());
        vec![Effect::Report(failure)]
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.next_notice_id += 1;
        self.notices.push_back(Notice {
            id: self.next_notice_id,
            level,
            message: message.into(),
            raised_at: Utc::now(),
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
