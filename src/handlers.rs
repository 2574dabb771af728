use crate::calendar::{build_year, TARGET_YEAR};
use crate::errors::AppError;
use crate::ledger::today_key;
use crate::models::{ActivityResponse, EditRequest, ResetActivityRequest, TimerResponse};
use crate::state::{AppState, Inner};
use crate::storage::{DURATION_KEY, RECORD_KEY};
use crate::timer::{format_clock, Phase, Tick};
use crate::ui::render_index;
use axum::{extract::State, response::Html, Json};
use chrono::Utc;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let inner = state.inner.lock().await;
    let today = today_key();
    let today_count = inner.ledger.count_on(&today);
    let months = build_year(TARGET_YEAR, &inner.ledger);
    Html(render_index(
        &today,
        today_count,
        &months,
        &timer_observation(&inner),
    ))
}

pub async fn get_timer(State(state): State<AppState>) -> Json<TimerResponse> {
    let inner = state.inner.lock().await;
    Json(timer_observation(&inner))
}

pub async fn timer_start(State(state): State<AppState>) -> Json<TimerResponse> {
    let response = {
        let mut inner = state.inner.lock().await;
        inner.engine.start_at(Utc::now());
        timer_observation(&inner)
    };
    if response.phase == Phase::Running {
        state.schedule_ticks().await;
    }
    Json(response)
}

pub async fn timer_pause(State(state): State<AppState>) -> Json<TimerResponse> {
    // Cancel the schedule before touching the engine so a concurrent tick
    // cannot race the final snapshot.
    state.cancel_ticks().await;
    let mut inner = state.inner.lock().await;
    if inner.engine.pause_at(Utc::now()) == Tick::Completed {
        inner.complete_session();
        inner.store.persist_detached();
        state.schedule_rearm();
    }
    Json(timer_observation(&inner))
}

pub async fn timer_reset(State(state): State<AppState>) -> Json<TimerResponse> {
    state.cancel_ticks().await;
    let mut inner = state.inner.lock().await;
    inner.engine.reset();
    Json(timer_observation(&inner))
}

pub async fn edit_begin(State(state): State<AppState>) -> Json<TimerResponse> {
    let mut inner = state.inner.lock().await;
    inner.engine.begin_edit();
    Json(timer_observation(&inner))
}

pub async fn edit_commit(
    State(state): State<AppState>,
    Json(payload): Json<EditRequest>,
) -> Json<TimerResponse> {
    let mut inner = state.inner.lock().await;
    if let Some(minutes) = inner.engine.commit_edit(&payload.value) {
        inner.store.set(DURATION_KEY, minutes.to_string());
        inner.store.persist_detached();
        info!("session duration set to {minutes} minutes");
    }
    Json(timer_observation(&inner))
}

pub async fn edit_cancel(State(state): State<AppState>) -> Json<TimerResponse> {
    let mut inner = state.inner.lock().await;
    inner.engine.cancel_edit();
    Json(timer_observation(&inner))
}

pub async fn get_activity(State(state): State<AppState>) -> Json<ActivityResponse> {
    let inner = state.inner.lock().await;
    Json(activity_observation(&inner))
}

/// Destructive and confirmation-gated: the page shows the prompt, this
/// endpoint refuses to act without the explicit flag.
pub async fn activity_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetActivityRequest>,
) -> Result<Json<ActivityResponse>, AppError> {
    if !payload.confirm {
        return Err(AppError::bad_request("reset requires confirmation"));
    }
    let mut inner = state.inner.lock().await;
    inner.ledger.reset_all();
    let record = inner.ledger.to_json();
    inner.store.set(RECORD_KEY, record);
    inner.store.persist_detached();
    inner.generation += 1;
    info!("activity record cleared");
    Ok(Json(activity_observation(&inner)))
}

fn timer_observation(inner: &Inner) -> TimerResponse {
    let remaining = inner.engine.remaining_at(Utc::now());
    TimerResponse {
        phase: inner.engine.phase(),
        duration_minutes: inner.engine.duration_minutes(),
        total_seconds: inner.engine.total_seconds(),
        remaining_seconds: remaining,
        display: format_clock(remaining),
        generation: inner.generation,
        sessions_completed: inner.sessions_completed,
        last_completed: inner.last_completed.clone(),
    }
}

fn activity_observation(inner: &Inner) -> ActivityResponse {
    ActivityResponse {
        today: today_key(),
        generation: inner.generation,
        days: inner.ledger.days().clone(),
    }
}
