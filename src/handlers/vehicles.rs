use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::vehicle::{self, ListingStatus, ListingType};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub listing_type: Option<ListingType>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub title: String,
    pub listing_type: ListingType,
    pub price: Option<f64>,
    pub price_per_day: Option<f64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub location: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub price_per_day: Option<f64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<ListingStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// List active, non-deleted vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let mut select = vehicle::Entity::find()
        .filter(vehicle::Column::IsDeleted.eq(false))
        .filter(vehicle::Column::Status.eq(ListingStatus::Active));

    if let Some(listing_type) = query.listing_type {
        select = select.filter(vehicle::Column::ListingType.eq(listing_type));
    }
    if let Some(available) = query.available {
        select = select.filter(vehicle::Column::IsAvailable.eq(available));
    }

    let vehicles = select
        .order_by_desc(vehicle::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(vehicles))
}

/// Get vehicle details
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(state.db.as_ref())
        .await?
        .filter(|v| !v.is_deleted)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    Ok(Json(vehicle))
}

/// List the broker's own listings, including hidden ones
pub async fn my_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::CreatedBy.eq(claims.sub))
        .filter(vehicle::Column::IsDeleted.eq(false))
        .order_by_desc(vehicle::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(vehicles))
}

/// Create a listing (broker)
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    if payload.title.trim().is_empty() || payload.location.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and location are required".to_string(),
        ));
    }

    if payload.price.is_some_and(|p| p <= 0.0) || payload.price_per_day.is_some_and(|p| p <= 0.0) {
        return Err(AppError::BadRequest(
            "prices must be positive".to_string(),
        ));
    }

    let new_vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        listing_type: Set(payload.listing_type),
        price: Set(payload.price),
        price_per_day: Set(payload.price_per_day),
        brand: Set(payload.brand),
        model: Set(payload.model),
        year: Set(payload.year),
        location: Set(payload.location.trim().to_string()),
        description: Set(payload.description),
        status: Set(ListingStatus::Active),
        is_available: Set(true),
        is_deleted: Set(false),
        created_by: Set(claims.sub),
        ..Default::default()
    };

    let vehicle = new_vehicle.insert(state.db.as_ref()).await?;
    Ok(Json(vehicle))
}

async fn find_owned_vehicle(
    state: &AppState,
    claims: &Claims,
    vehicle_id: Uuid,
) -> AppResult<vehicle::Model> {
    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(state.db.as_ref())
        .await?
        .filter(|v| !v.is_deleted)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if vehicle.created_by != claims.sub {
        return Err(AppError::Forbidden(
            "You can only manage your own listings".to_string(),
        ));
    }

    Ok(vehicle)
}

/// Update a listing (broker, owner only)
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = find_owned_vehicle(&state, &claims, vehicle_id).await?;

    if payload.price.is_some_and(|p| p <= 0.0) || payload.price_per_day.is_some_and(|p| p <= 0.0) {
        return Err(AppError::BadRequest(
            "prices must be positive".to_string(),
        ));
    }

    let mut active: vehicle::ActiveModel = vehicle.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(Some(price));
    }
    if let Some(price_per_day) = payload.price_per_day {
        active.price_per_day = Set(Some(price_per_day));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(model) = payload.model {
        active.model = Set(Some(model));
    }
    if let Some(year) = payload.year {
        active.year = Set(Some(year));
    }
    if let Some(location) = payload.location {
        active.location = Set(location.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(state.db.as_ref()).await?;
    Ok(Json(updated))
}

/// Soft-delete a listing (broker, owner only). Bookings keep their history.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let vehicle = find_owned_vehicle(&state, &claims, vehicle_id).await?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(state.db.as_ref()).await?;

    Ok(Json(serde_json::json!({ "message": "Vehicle removed" })))
}

/// Flip the broker-level availability toggle (owner only)
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = find_owned_vehicle(&state, &claims, vehicle_id).await?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    active.is_available = Set(payload.is_available);
    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(state.db.as_ref()).await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use crate::utils::locks::VehicleLocks;
    use crate::Config;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    fn state_with(db: DatabaseConnection) -> AppState {
        AppState {
            db: std::sync::Arc::new(db),
            config: Config {
                database_url: String::new(),
                db_max_connections: 1,
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 24,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
            },
            vehicle_locks: VehicleLocks::new(),
        }
    }

    fn broker_claims(sub: Uuid) -> Claims {
        Claims {
            sub,
            email: "broker@example.com".to_string(),
            role: UserRole::Broker,
            exp: 0,
            iat: 0,
        }
    }

    fn listing(owner: Uuid) -> vehicle::Model {
        vehicle::Model {
            id: Uuid::new_v4(),
            title: "Honda City 2022".to_string(),
            listing_type: ListingType::Rent,
            price: None,
            price_per_day: Some(2500.0),
            brand: Some("Honda".to_string()),
            model: Some("City".to_string()),
            year: Some(2022),
            location: "Kochi".to_string(),
            description: None,
            status: ListingStatus::Active,
            is_available: true,
            is_deleted: false,
            created_by: owner,
            created_at: Utc::now().fixed_offset(),
            updated_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn update_rejects_non_owner() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let v = listing(owner);
        let vehicle_id = v.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![v]])
            .into_connection();

        let err = update_vehicle(
            State(state_with(db)),
            Extension(broker_claims(stranger)),
            Path(vehicle_id),
            Json(UpdateVehicleRequest {
                title: Some("Hijacked".to_string()),
                price: None,
                price_per_day: None,
                brand: None,
                model: None,
                year: None,
                location: None,
                description: None,
                status: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = create_vehicle(
            State(state_with(db)),
            Extension(broker_claims(Uuid::new_v4())),
            Json(CreateVehicleRequest {
                title: "   ".to_string(),
                listing_type: ListingType::Rent,
                price: None,
                price_per_day: Some(2500.0),
                brand: None,
                model: None,
                year: None,
                location: "Kochi".to_string(),
                description: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_is_soft() {
        let owner = Uuid::new_v4();
        let v = listing(owner);
        let vehicle_id = v.id;
        let mut deleted = v.clone();
        deleted.is_deleted = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![v]])
            .append_query_results([vec![deleted]])
            .into_connection();

        let result = delete_vehicle(
            State(state_with(db)),
            Extension(broker_claims(owner)),
            Path(vehicle_id),
        )
        .await;

        assert!(result.is_ok());
    }
}
