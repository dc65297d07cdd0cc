use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::vehicle::{self, ListingStatus, ListingType};
use crate::error::{AppError, AppResult};
use crate::utils::dates::{day_count, parse_calendar_date, ranges_overlap};
use crate::utils::jwt::Claims;
use crate::utils::pricing::{snapshot_rate, total_price};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub vehicle_id: Uuid,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub pickup_location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleSummary {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub price_per_day: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub vehicle: Option<VehicleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_location: String,
    pub price_per_day: f64,
    pub days: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<FixedOffset>,
}

fn build_response(
    b: booking::Model,
    vehicle: Option<&vehicle::Model>,
    user: Option<&Claims>,
) -> BookingResponse {
    BookingResponse {
        id: b.id,
        vehicle: vehicle.map(|v| VehicleSummary {
            id: v.id,
            title: v.title.clone(),
            location: v.location.clone(),
            price_per_day: v.price_per_day,
        }),
        user: user.map(|c| UserSummary {
            id: c.sub,
            email: c.email.clone(),
        }),
        start_date: b.start_date,
        end_date: b.end_date,
        pickup_location: b.pickup_location,
        price_per_day: b.price_per_day,
        days: b.days,
        total_price: b.total_price,
        status: b.status,
        created_at: b.created_at,
    }
}

/// Normalize both dates to calendar days and require a strictly positive
/// range (same-day bookings are disallowed, minimum one day).
fn parse_range(start_raw: &str, end_raw: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = parse_calendar_date(start_raw)
        .ok_or_else(|| AppError::InvalidRange("start_date is not a valid date".to_string()))?;
    let end = parse_calendar_date(end_raw)
        .ok_or_else(|| AppError::InvalidRange("end_date is not a valid date".to_string()))?;

    if day_count(start, end) <= 0 {
        return Err(AppError::InvalidRange(
            "End date must be after start date".to_string(),
        ));
    }

    Ok((start, end))
}

/// Look up a vehicle that can be booked: exists, not soft-deleted,
/// actively listed, and configured for rental.
async fn find_rentable_vehicle(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
) -> AppResult<vehicle::Model> {
    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(db)
        .await?
        .filter(|v| !v.is_deleted && v.status == ListingStatus::Active)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if vehicle.listing_type != ListingType::Rent {
        return Err(AppError::WrongListingType(
            "This vehicle is not for rent".to_string(),
        ));
    }

    Ok(vehicle)
}

/// Find a non-cancelled booking of the vehicle whose range collides with
/// the candidate `[start, end)`. The query narrows to the vehicle's
/// blocking bookings; the range decision itself runs through
/// `ranges_overlap`, so a booking ending on the day another starts does
/// not block it.
async fn find_overlapping(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Option<booking::Model>> {
    let blocking = booking::Entity::find()
        .filter(booking::Column::VehicleId.eq(vehicle_id))
        .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
        .all(db)
        .await?;

    Ok(blocking
        .into_iter()
        .find(|b| ranges_overlap(start, end, b.start_date, b.end_date)))
}

/// Public pre-flight availability check, applying the same vehicle checks
/// as booking creation so the preview matches what create will enforce
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> AppResult<Json<CheckResponse>> {
    let (start, end) = parse_range(&query.start_date, &query.end_date)?;
    find_rentable_vehicle(state.db.as_ref(), query.vehicle_id).await?;

    let overlap = find_overlapping(state.db.as_ref(), query.vehicle_id, start, end).await?;

    Ok(Json(CheckResponse {
        available: overlap.is_none(),
    }))
}

/// Create a booking. The availability check and the insert run under the
/// vehicle's lock; without it two callers could both observe a free range
/// and both persist.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let (start, end) = parse_range(&payload.start_date, &payload.end_date)?;

    let vehicle = find_rentable_vehicle(state.db.as_ref(), payload.vehicle_id).await?;

    // Broker-level toggle, independent of date-based bookings
    if !vehicle.is_available {
        return Err(AppError::Unavailable("Vehicle is not available".to_string()));
    }

    let _guard = state.vehicle_locks.acquire(vehicle.id).await;

    if find_overlapping(state.db.as_ref(), vehicle.id, start, end)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Selected dates are not available".to_string(),
        ));
    }

    let rate = snapshot_rate(vehicle.price_per_day)?;
    let days = day_count(start, end);
    let total = total_price(rate, days);

    let pickup_location = payload
        .pickup_location
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| vehicle.location.clone());

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        user_id: Set(claims.sub),
        start_date: Set(start),
        end_date: Set(end),
        pickup_location: Set(pickup_location),
        price_per_day: Set(rate),
        days: Set(days as i32),
        total_price: Set(total),
        status: Set(BookingStatus::Confirmed),
        ..Default::default()
    };

    let created = new_booking.insert(state.db.as_ref()).await?;

    tracing::info!(
        booking_id = %created.id,
        vehicle_id = %vehicle.id,
        user_id = %claims.sub,
        days = created.days,
        "booking created"
    );

    Ok(Json(build_response(created, Some(&vehicle), Some(&claims))))
}

/// List the caller's bookings, newest first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(claims.sub))
        .order_by_desc(booking::Column::CreatedAt)
        .all(state.db.as_ref())
        .await?;

    let vehicle_ids: Vec<Uuid> = bookings.iter().map(|b| b.vehicle_id).collect();
    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::Id.is_in(vehicle_ids))
        .all(state.db.as_ref())
        .await?;

    let responses: Vec<BookingResponse> = bookings
        .into_iter()
        .map(|b| {
            let vehicle = vehicles.iter().find(|v| v.id == b.vehicle_id);
            build_response(b, vehicle, None)
        })
        .collect();

    Ok(Json(responses))
}

/// Cancel a booking. Only the owner may cancel; cancelling a booking that
/// is already cancelled is a no-op so retries are safe.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Verify ownership
    if booking.user_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }

    if booking.status.is_cancelled() {
        return Ok(Json(serde_json::json!({ "message": "Booking cancelled" })));
    }

    let cancelled = booking.status.cancel();
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(cancelled);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(state.db.as_ref()).await?;

    Ok(Json(serde_json::json!({ "message": "Booking cancelled" })))
}
