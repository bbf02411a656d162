use std::collections::VecDeque;

use async_trait::async_trait;
use shared::{
    domain::{Car, CarId},
    protocol::CarFields,
};
use tracing::{debug, info};

pub mod coerce;
pub mod config;
pub mod error;
pub mod sink;
pub mod state;
pub mod transport;

pub use error::ClientError;
pub use sink::{
    Failure, FailureKind, FailureSink, Operation, RecordingFailureSink, TracingFailureSink,
};
pub use state::{
    Action, EditMode, Effect, FormField, FormState, Notice, NoticeLevel, Request, RequestToken,
    ViewState, DELETE_CONFIRMATION,
};
pub use transport::HttpCarApi;

/// The `/cars` collection resource.
#[async_trait]
pub trait CarApi: Send + Sync {
    async fn list_cars(&self) -> Result<Vec<Car>, ClientError>;
    async fn create_car(&self, fields: &CarFields) -> Result<Car, ClientError>;
    async fn update_car(&self, id: &CarId, fields: &CarFields) -> Result<Car, ClientError>;
    async fn delete_car(&self, id: &CarId) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: CarApi + ?Sized> CarApi for std::sync::Arc<T> {
    async fn list_cars(&self) -> Result<Vec<Car>, ClientError> {
        (**self).list_cars().await
    }

    async fn create_car(&self, fields: &CarFields) -> Result<Car, ClientError> {
        (**self).create_car(fields).await
    }

    async fn update_car(&self, id: &CarId, fields: &CarFields) -> Result<Car, ClientError> {
        (**self).update_car(id, fields).await
    }

    async fn delete_car(&self, id: &CarId) -> Result<(), ClientError> {
        (**self).delete_car(id).await
    }
}

/// Blocking yes/no question asked before a delete goes out.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    AlreadyInFlight,
}

/// Runs one request against the api and turns the result into the completion
/// action for [`ViewState::update`].
pub async fn execute<A: CarApi + ?Sized>(api: &A, request: Request) -> Action {
    let operation = request.operation();
    debug!(operation = operation.as_str(), "executing car api request");
    match request {
        Request::FetchCars { token } => {
            let outcome = api
                .list_cars()
                .await
                .map_err(|err| Failure::from_error(operation, &err));
            if let Ok(cars) = &outcome {
                info!(token = token.0, count = cars.len(), "loaded cars");
            }
            Action::CarsLoaded { token, outcome }
        }
        Request::CreateCar { token, fields } => Action::CarSaved {
            token,
            outcome: api
                .create_car(&fields)
                .await
                .map_err(|err| Failure::from_error(operation, &err)),
        },
        Request::UpdateCar { token, id, fields } => Action::CarSaved {
            token,
            outcome: api
                .update_car(&id, &fields)
                .await
                .map_err(|err| Failure::from_error(operation, &err)),
        },
        Request::DeleteCar { id } => {
            let outcome = api
                .delete_car(&id)
                .await
                .map_err(|err| Failure::from_error(operation, &err));
            Action::CarDeleted { id, outcome }
        }
    }
}

const REQUEST_CANCELLED: &str = "request cancelled before it completed";

/// Held across the await on a save or delete. If the awaiting future is
/// dropped first, the request is completed as a transport failure so the
/// form and the per-car delete lock are released.
struct InFlight<'a, S: FailureSink> {
    state: &'a mut ViewState,
    sink: &'a S,
    abandoned: Option<Action>,
}

impl<'a, S: FailureSink> InFlight<'a, S> {
    fn arm(state: &'a mut ViewState, sink: &'a S, abandoned: Action) -> Self {
        Self {
            state,
            sink,
            abandoned: Some(abandoned),
        }
    }

    fn disarm(mut self) {
        self.abandoned = None;
    }
}

impl<S: FailureSink> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let Some(action) = self.abandoned.take() else {
            return;
        };
        for effect in self.state.update(action) {
            match effect {
                Effect::Report(failure) => self.sink.report(&failure),
                Effect::Send(request) => debug!(
                    operation = request.operation().as_str(),
                    "dropping follow-up of a cancelled request"
                ),
            }
        }
    }
}

/// Sequential driver over [`ViewState`]: each call runs its requests and the
/// follow-up refresh to completion before returning.
pub struct CarListClient<A: CarApi, S: FailureSink = TracingFailureSink> {
    api: A,
    sink: S,
    state: ViewState,
}

impl<A: CarApi> CarListClient<A, TracingFailureSink> {
    pub fn new(api: A) -> Self {
        Self::with_sink(api, TracingFailureSink)
    }
}

impl<A: CarApi, S: FailureSink> CarListClient<A, S> {
    pub fn with_sink(api: A, sink: S) -> Self {
        Self {
            api,
            sink,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn cars(&self) -> &[Car] {
        self.state.cars()
    }

    pub fn form(&self) -> &FormState {
        self.state.form()
    }

    pub fn editing(&self) -> Option<&CarId> {
        self.state.editing()
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.apply_local(Action::SetField {
            field,
            value: value.into(),
        });
    }

    pub fn begin_edit(&mut self, car: &Car) {
        self.apply_local(Action::BeginEdit(car.clone()));
    }

    pub fn cancel_edit(&mut self) {
        self.apply_local(Action::CancelEdit);
    }

    pub fn dismiss_notice(&mut self, id: u64) {
        self.apply_local(Action::DismissNotice(id));
    }

    /// Replaces the in-memory list with the server's. On failure the previous
    /// list stays and the failure goes to the sink.
    pub async fn list(&mut self) -> &[Car] {
        let requests = self.apply(Action::Refresh);
        self.drain(requests).await;
        self.state.cars()
    }

    /// Creates a car, or updates the one being edited, from the current form.
    pub async fn submit(&mut self) -> Result<Car, ClientError> {
        let missing = self.state.form().first_missing();
        let mut requests = self.apply(Action::Submit);
        if let Some(field) = missing {
            return Err(ClientError::MissingField(field));
        }

        let request = match requests.pop_front() {
            Some(request @ (Request::CreateCar { .. } | Request::UpdateCar { .. })) => request,
            other => {
                requests.extend(other);
                self.drain(requests).await;
                return Err(ClientError::Busy);
            }
        };

        let operation = request.operation();
        let in_flight = InFlight::arm(
            &mut self.state,
            &self.sink,
            request.clone().abandon(REQUEST_CANCELLED),
        );
        let (token, result) = match request {
            Request::CreateCar { token, fields } => (token, self.api.create_car(&fields).await),
            Request::UpdateCar { token, id, fields } => {
                (token, self.api.update_car(&id, &fields).await)
            }
            Request::FetchCars { .. } | Request::DeleteCar { .. } => return Err(ClientError::Busy),
        };
        in_flight.disarm();

        let outcome = match &result {
            Ok(car) => Ok(car.clone()),
            Err(err) => Err(Failure::from_error(operation, err)),
        };
        requests.extend(self.apply(Action::CarSaved { token, outcome }));
        self.drain(requests).await;
        result
    }

    /// Asks `prompt` first; nothing is sent when it says no.
    pub async fn delete(
        &mut self,
        id: &CarId,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<DeleteOutcome, ClientError> {
        if self.state.is_deleting(id) {
            return Ok(DeleteOutcome::AlreadyInFlight);
        }

        self.apply_local(Action::RequestDelete(id.clone()));
        if !prompt.confirm(DELETE_CONFIRMATION) {
            self.apply_local(Action::DeclineDelete);
            info!(car_id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let mut requests: VecDeque<Request> = self
            .apply(Action::ConfirmDelete)
            .into_iter()
            .filter(|request| !matches!(request, Request::DeleteCar { id: queued } if queued == id))
            .collect();

        let in_flight = InFlight::arm(
            &mut self.state,
            &self.sink,
            Request::DeleteCar { id: id.clone() }.abandon(REQUEST_CANCELLED),
        );
        let result = self.api.delete_car(id).await;
        in_flight.disarm();

        let outcome = match &result {
            Ok(()) => Ok(()),
            Err(err) => Err(Failure::from_error(Operation::Delete, err)),
        };
        requests.extend(self.apply(Action::CarDeleted {
            id: id.clone(),
            outcome,
        }));
        self.drain(requests).await;
        result.map(|()| DeleteOutcome::Deleted)
    }

    fn apply(&mut self, action: Action) -> VecDeque<Request> {
        let mut requests = VecDeque::new();
        for effect in self.state.update(action) {
            match effect {
                Effect::Send(request) => requests.push_back(request),
                Effect::Report(failure) => self.sink.report(&failure),
            }
        }
        requests
    }

    fn apply_local(&mut self, action: Action) {
        let requests = self.apply(action);
        debug_assert!(requests.is_empty(), "local action produced requests");
    }

    async fn drain(&mut self, mut requests: VecDeque<Request>) {
        while let Some(request) = requests.pop_front() {
            let action = execute(&self.api, request).await;
            requests.extend(self.apply(action));
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
