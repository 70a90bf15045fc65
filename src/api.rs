use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::bus::EventBus;
use crate::constants::app::READY_STATUS;
use crate::error::{AppError, StoreError, SubmitError};
use crate::events::Event;
use crate::orders::types::schedule_format;
use crate::orders::{FormState, OrderDefaults, OrderRowInput, OrderTable, RowId, RowPatch, RunMode};
use crate::services::SubmissionService;
use crate::store::{AccountStore, ApiAccount, OrderSink};

pub struct AppState {
    pub table: Mutex<OrderTable>,
    pub submissions: SubmissionService,
    pub sink: Arc<dyn OrderSink>,
    pub accounts: AccountStore,
    pub bus: EventBus,
    pub status: Arc<Mutex<String>>,
}

impl AppState {
    pub async fn new(
        sink: Arc<dyn OrderSink>,
        accounts: AccountStore,
        defaults: OrderDefaults,
        bus: EventBus,
    ) -> Result<Arc<Self>, SubmitError> {
        let submissions = SubmissionService::new(sink.clone(), defaults, bus.clone()).await?;
        let status = Arc::new(Mutex::new(READY_STATUS.to_string()));
        spawn_status_listener(bus.clone(), status.clone());

        Ok(Arc::new(Self {
            table: Mutex::new(OrderTable::new()),
            submissions,
            sink,
            accounts,
            bus,
            status,
        }))
    }

    fn table(&self) -> MutexGuard<'_, OrderTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn status_message(&self) -> String {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Mirror every desk event into the status line.
fn spawn_status_listener(bus: EventBus, status: Arc<Mutex<String>>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let msg = event.status_message();
                    *status.lock().unwrap_or_else(|e| e.into_inner()) = msg;
                }
                Err(RecvError::Lagged(n)) => warn!("[DESK] Status line skipped {} event(s)", n),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/orders", get(get_orders))
        .route("/orders/rows", post(add_row))
        .route("/orders/rows/remove", post(remove_rows))
        .route("/orders/rows/{id}", patch(update_row))
        .route("/orders/run", put(set_run))
        .route("/orders/clear", post(clear_orders))
        .route("/orders/submit", post(submit_orders))
        .route("/batches", get(get_batches))
        .route("/accounts", post(save_account))
        .route("/accounts/active", get(get_account))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> Result<(), AppError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Order desk listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
            }
        })
        .await?;
    Ok(())
}

#[derive(Serialize)]
pub struct RowView {
    pub id: RowId,
    pub index: usize,
    #[serde(flatten)]
    pub input: OrderRowInput,
    pub limit_price_enabled: bool,
}

#[derive(Serialize)]
pub struct OrderFormView {
    pub rows: Vec<RowView>,
    pub run_mode: RunMode,
    #[serde(with = "schedule_format")]
    pub scheduled_at: NaiveDateTime,
    pub schedule_visible: bool,
    #[serde(flatten)]
    pub form: FormState,
}

impl OrderFormView {
    pub fn from_table(table: &OrderTable) -> Self {
        let rows = table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| RowView {
                id: row.id,
                index: idx + 1,
                input: row.input.clone(),
                limit_price_enabled: row.input.limit_price_enabled(),
            })
            .collect();
        Self {
            rows,
            run_mode: table.run_mode(),
            scheduled_at: table.scheduled_at(),
            schedule_visible: table.schedule_visible(),
            form: table.form_state(),
        }
    }
}

fn form_view(state: &AppState) -> Json<OrderFormView> {
    Json(OrderFormView::from_table(&state.table()))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({"status": state.status_message()}))
}

async fn get_orders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    form_view(&state)
}

async fn add_row(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.table().add_row();
    (StatusCode::CREATED, form_view(&state))
}

#[derive(Deserialize)]
struct RemoveRows {
    ids: Vec<RowId>,
}

async fn remove_rows(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RemoveRows>,
) -> impl IntoResponse {
    state.table().remove_rows(&body.ids);
    form_view(&state)
}

async fn update_row(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(patch): Json<RowPatch>,
) -> impl IntoResponse {
    let result = state.table().update_row(RowId(id), patch);
    match result {
        Ok(()) => form_view(&state).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response(),
    }
}

#[derive(Deserialize)]
struct RunSettings {
    run_mode: Option<RunMode>,
    #[serde(default, with = "schedule_format::option")]
    scheduled_at: Option<NaiveDateTime>,
}

async fn set_run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunSettings>,
) -> impl IntoResponse {
    {
        let mut table = state.table();
        if let Some(mode) = body.run_mode {
            table.set_run_mode(mode);
        }
        if let Some(at) = body.scheduled_at {
            table.set_scheduled_at(at);
        }
    }
    form_view(&state)
}

async fn clear_orders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.table().clear();
    form_view(&state)
}

async fn submit_orders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (rows, plan) = {
        let table = state.table();
        (table.inputs(), table.run_plan())
    };

    match state.submissions.submit(&rows, plan).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(SubmitError::Validation(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": errors.messages()})),
        )
            .into_response(),
        Err(e) => {
            error!("[DESK] Submission failed: {}", e);
            internal_error(e)
        }
    }
}

async fn get_batches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.sink.batches().await {
        Ok(batches) => Json(batches).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": e.to_string()})),
    )
        .into_response()
}

async fn get_account(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let accounts = state.accounts.clone();
    match tokio::task::spawn_blocking(move || accounts.load()).await {
        Ok(Ok(Some(account))) => Json(account.masked()).into_response(),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No API account saved yet."})),
        )
            .into_response(),
        Ok(Err(e)) => internal_error(e),
        Err(e) => internal_error(e),
    }
}

async fn save_account(
    State(state): State<Arc<AppState>>,
    Json(account): Json<ApiAccount>,
) -> impl IntoResponse {
    let accounts = state.accounts.clone();
    match tokio::task::spawn_blocking(move || accounts.save(account)).await {
        Ok(Ok(saved)) => {
            state.bus.notify(Event::AccountSaved {
                name: saved.name.clone(),
            });
            (StatusCode::CREATED, Json(saved.masked())).into_response()
        }
        Ok(Err(StoreError::InvalidAccount(reason))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": reason})),
        )
            .into_response(),
        Ok(Err(e)) => internal_error(e),
        Err(e) => internal_error(e),
    }
}
