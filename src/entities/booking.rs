use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking lifecycle state. Rentals are confirmed immediately on creation;
/// `Pending` is reserved for an approval step that is not wired up.
/// State only changes through the transition helpers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// A non-cancelled booking blocks its date range.
    pub fn blocks_dates(self) -> bool {
        self != BookingStatus::Cancelled
    }

    /// Transition to `Confirmed`. Only valid from `Pending`.
    pub fn confirm(self) -> Option<BookingStatus> {
        match self {
            BookingStatus::Pending => Some(BookingStatus::Confirmed),
            BookingStatus::Confirmed | BookingStatus::Cancelled => None,
        }
    }

    /// Transition to `Cancelled`. Cancelling an already-cancelled booking
    /// yields the same terminal state, so repeated cancels are a no-op.
    pub fn cancel(self) -> BookingStatus {
        BookingStatus::Cancelled
    }

    pub fn is_cancelled(self) -> bool {
        self == BookingStatus::Cancelled
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    /// Calendar dates, half-open: the end date is the checkout day and is
    /// not occupied by this booking.
    pub start_date: Date,
    pub end_date: Date,
    pub pickup_location: String,
    /// Snapshot of the vehicle's rate at booking time. Never recomputed,
    /// so later price edits leave historical bookings untouched.
    pub price_per_day: f64,
    pub days: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_and_pending_block_dates() {
        assert!(BookingStatus::Confirmed.blocks_dates());
        assert!(BookingStatus::Pending.blocks_dates());
        assert!(!BookingStatus::Cancelled.blocks_dates());
    }

    #[test]
    fn cancel_is_terminal_and_repeatable() {
        let cancelled = BookingStatus::Confirmed.cancel();
        assert!(cancelled.is_cancelled());
        // Second cancel lands in the same state.
        assert!(cancelled.cancel().is_cancelled());
    }

    #[test]
    fn confirm_only_from_pending() {
        assert_eq!(BookingStatus::Pending.confirm(), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::Confirmed.confirm(), None);
        assert_eq!(BookingStatus::Cancelled.confirm(), None);
    }
}
