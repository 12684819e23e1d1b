use crate::api::AppState;
use crate::api::dto::message::{MessageDto, SendMessageRequest, TimeWindowQuery};
use crate::domain::filter::TimeWindow;
use crate::domain::message::Message;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

fn parse_timestamp(name: &str, value: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| AppError::BadRequest(format!("Invalid {name} timestamp '{value}': {e}")))
}

fn path_window(start: &str, end: &str) -> Result<TimeWindow> {
    Ok(TimeWindow::new(Some(parse_timestamp("start", start)?), Some(parse_timestamp("end", end)?)))
}

fn to_dtos(messages: Vec<Message>) -> Json<Vec<MessageDto>> {
    Json(messages.into_iter().map(Into::into).collect())
}

/// Lists all messages, optionally bounded by `?start=&end=`.
///
/// # Errors
/// Returns `AppError::BadRequest` if the window is inverted.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(window): Query<TimeWindowQuery>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list(window.into()).await?;
    Ok(to_dtos(messages))
}

/// Lists all messages sent within `[start, end]`.
///
/// # Errors
/// Returns `AppError::BadRequest` if a bound is not RFC 3339 or the window is inverted.
pub async fn list_messages_in_window(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list(path_window(&start, &end)?).await?;
    Ok(to_dtos(messages))
}

/// Fetches one message by id.
///
/// # Errors
/// Returns `AppError::NotFound` if the message does not exist.
pub async fn get_message(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let message = state.message_service.get(id).await?;
    Ok(Json(MessageDto::from(message)))
}

/// Lists the distinct recipient addresses.
///
/// # Errors
/// Returns `AppError::Database` if the store fails.
pub async fn list_recipients(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.message_service.list_recipients().await?))
}

/// Lists a recipient's messages, optionally bounded by `?start=&end=`.
///
/// # Errors
/// Returns `AppError::BadRequest` if the window is inverted.
pub async fn list_recipient_messages(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(window): Query<TimeWindowQuery>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list_for_recipient(&address, window.into(), false).await?;
    Ok(to_dtos(messages))
}

/// Lists a recipient's messages sent within `[start, end]`.
///
/// # Errors
/// Returns `AppError::BadRequest` if a bound is not RFC 3339 or the window is inverted.
pub async fn list_recipient_messages_in_window(
    State(state): State<AppState>,
    Path((address, start, end)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list_for_recipient(&address, path_window(&start, &end)?, false).await?;
    Ok(to_dtos(messages))
}

/// Lists a recipient's unread messages, optionally bounded by `?start=&end=`.
///
/// # Errors
/// Returns `AppError::BadRequest` if the window is inverted.
pub async fn list_recipient_unread(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(window): Query<TimeWindowQuery>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list_for_recipient(&address, window.into(), true).await?;
    Ok(to_dtos(messages))
}

/// Lists a recipient's unread messages sent within `[start, end]`.
///
/// # Errors
/// Returns `AppError::BadRequest` if a bound is not RFC 3339 or the window is inverted.
pub async fn list_recipient_unread_in_window(
    State(state): State<AppState>,
    Path((address, start, end)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.list_for_recipient(&address, path_window(&start, &end)?, true).await?;
    Ok(to_dtos(messages))
}

/// Marks the listed messages as read and returns the ids that were found.
///
/// # Errors
/// Returns `AppError::NotFound` if none of the ids exist.
pub async fn mark_read(State(state): State<AppState>, Json(ids): Json<Vec<Uuid>>) -> Result<impl IntoResponse> {
    Ok(Json(state.message_service.mark_read(&ids).await?))
}

/// Marks the listed messages as unread and returns the ids that were found.
///
/// # Errors
/// Returns `AppError::NotFound` if none of the ids exist.
pub async fn mark_unread(State(state): State<AppState>, Json(ids): Json<Vec<Uuid>>) -> Result<impl IntoResponse> {
    Ok(Json(state.message_service.mark_unread(&ids).await?))
}

/// Sends a message.
///
/// # Errors
/// Returns `AppError::BadRequest` if either address is invalid.
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state
        .message_service
        .send(payload.content, &payload.recipient_address, &payload.sender_address)
        .await?;

    let location = format!("/v1/messages/{}", message.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(MessageDto::from(message))))
}

/// Deletes one message.
///
/// # Errors
/// Returns `AppError::NotFound` if the message does not exist.
pub async fn delete_message(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    state.message_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the listed messages and returns the ids that were found.
///
/// # Errors
/// Returns `AppError::NotFound` if none of the ids exist.
pub async fn delete_messages(State(state): State<AppState>, Json(ids): Json<Vec<Uuid>>) -> Result<impl IntoResponse> {
    Ok(Json(state.message_service.delete_many(&ids).await?))
}
