use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260815_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ListingType::Enum)
                    .values([ListingType::Rent, ListingType::Sale])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(ListingStatus::Enum)
                    .values([ListingStatus::Active, ListingStatus::Hidden])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(string_len(Vehicle::Title, 200).not_null())
                    .col(
                        ColumnDef::new(Vehicle::ListingType)
                            .custom(ListingType::Enum)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vehicle::Price).double().null())
                    .col(ColumnDef::new(Vehicle::PricePerDay).double().null())
                    .col(ColumnDef::new(Vehicle::Brand).string_len(100).null())
                    .col(ColumnDef::new(Vehicle::Model).string_len(100).null())
                    .col(ColumnDef::new(Vehicle::Year).integer().null())
                    .col(string_len(Vehicle::Location, 200).not_null())
                    .col(ColumnDef::new(Vehicle::Description).text().null())
                    .col(
                        ColumnDef::new(Vehicle::Status)
                            .custom(ListingStatus::Enum)
                            .not_null(),
                    )
                    .col(boolean(Vehicle::IsAvailable).not_null().default(true))
                    .col(boolean(Vehicle::IsDeleted).not_null().default(false))
                    .col(uuid(Vehicle::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_owner")
                            .from(Vehicle::Table, Vehicle::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ListingStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ListingType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    Title,
    ListingType,
    Price,
    PricePerDay,
    Brand,
    Model,
    Year,
    Location,
    Description,
    Status,
    IsAvailable,
    IsDeleted,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum ListingType {
    #[sea_orm(iden = "listing_type")]
    Enum,
    #[sea_orm(iden = "rent")]
    Rent,
    #[sea_orm(iden = "sale")]
    Sale,
}

#[derive(DeriveIden)]
pub enum ListingStatus {
    #[sea_orm(iden = "listing_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "hidden")]
    Hidden,
}
