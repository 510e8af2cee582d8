use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::instrument;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::households::dto::{
    AddMemberRequest, CreateHouseholdRequest, HouseholdResponse, ItemResponse, JoinCodeResponse,
    JoinRequest, NewItemRequest,
};
use crate::households::preparedness::PreparednessStatus;
use crate::households::repo::MemberRecord;
use crate::households::services::{self, NewHousehold, NewItem};
use crate::state::AppState;

pub fn household_routes() -> Router<AppState> {
    Router::new()
        .route("/households", post(create_household).get(list_households))
        .route("/households/:id", delete(delete_household))
        .route("/households/join", post(join_household))
        .route("/households/:id/join-code", post(regenerate_join_code))
        .route("/households/:id/preparedness", get(preparedness))
}

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/households/:id/members",
            get(list_members).post(add_member),
        )
        .route(
            "/households/:id/members/:user_id",
            delete(remove_member),
        )
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/households/:id/items", get(list_items).post(add_item))
        .route("/households/:id/items/:item_id", delete(remove_item))
}

#[instrument(skip(state, payload))]
async fn create_household(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateHouseholdRequest>,
) -> Result<(StatusCode, Json<HouseholdResponse>), ApiError> {
    let household = services::create_household(
        &state.db,
        user_id,
        NewHousehold {
            name: payload.name,
            latitude: payload.latitude,
            longitude: payload.longitude,
            extra_adults: payload.extra_adults,
            extra_children: payload.extra_children,
            extra_pets: payload.extra_pets,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(household.into())))
}

#[instrument(skip(state))]
async fn list_households(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<HouseholdResponse>>, ApiError> {
    let households = services::list_households(&state.db, user_id).await?;
    Ok(Json(households.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
async fn delete_household(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    services::delete_household(&state.db, user_id, household_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
async fn join_household(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<HouseholdResponse>, ApiError> {
    let household = services::redeem_join_code(&state.db, user_id, &payload.code).await?;
    Ok(Json(household.into()))
}

#[instrument(skip(state))]
async fn regenerate_join_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
) -> Result<Json<JoinCodeResponse>, ApiError> {
    let code = services::generate_join_code(&state.db, user_id, household_id).await?;
    Ok(Json(JoinCodeResponse { code }))
}

#[instrument(skip(state))]
async fn preparedness(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
) -> Result<Json<PreparednessStatus>, ApiError> {
    let status = services::preparedness_status(
        &state.db,
        user_id,
        household_id,
        &state.config.preparedness,
    )
    .await?;
    Ok(Json(status))
}

#[instrument(skip(state))]
async fn list_members(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    let members = services::list_members(&state.db, user_id, household_id).await?;
    Ok(Json(members))
}

#[instrument(skip(state, payload))]
async fn add_member(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<StatusCode, ApiError> {
    services::add_member(
        &state.db,
        user_id,
        household_id,
        &payload.email,
        payload.is_admin,
    )
    .await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((household_id, target_user)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    services::remove_member(&state.db, user_id, household_id, target_user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = services::list_items(&state.db, user_id, household_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(household_id): Path<i64>,
    Json(payload): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = services::add_item(
        &state.db,
        user_id,
        household_id,
        NewItem {
            category_id: payload.category_id,
            name: payload.name,
            amount: payload.amount,
            kcal_per_unit: payload.kcal_per_unit,
            expires_at: payload.expires_at,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

#[instrument(skip(state))]
async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((household_id, item_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    services::remove_item(&state.db, user_id, household_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
