use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Profiles share their id with the hosted auth user
        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(uuid(UserProfile::Id).primary_key())
                    .col(string_len(UserProfile::FullName, 100).not_null().default(""))
                    .col(string_len(UserProfile::PhoneNumber, 30).not_null().default(""))
                    .col(string_len(UserProfile::Email, 255).not_null())
                    .col(string_len_null(UserProfile::EmergencyContact, 100))
                    .col(big_integer(UserProfile::WalletBalance).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(UserProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(UserProfile::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupportMessage::Table)
                    .if_not_exists()
                    .col(uuid(SupportMessage::Id).primary_key())
                    .col(uuid_null(SupportMessage::UserId))
                    .col(string_len(SupportMessage::UserEmail, 255).not_null())
                    .col(string_len(SupportMessage::UserName, 100).not_null())
                    .col(string_len(SupportMessage::Subject, 200).not_null())
                    .col(text(SupportMessage::Message).not_null())
                    .col(string_len(SupportMessage::Status, 20).not_null().default("pending"))
                    .col(
                        timestamp_with_time_zone(SupportMessage::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupportMessage::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserProfile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserProfile {
    #[sea_orm(iden = "user_profiles")]
    Table,
    Id,
    FullName,
    PhoneNumber,
    Email,
    EmergencyContact,
    WalletBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum SupportMessage {
    #[sea_orm(iden = "support_messages")]
    Table,
    Id,
    UserId,
    UserEmail,
    UserName,
    Subject,
    Message,
    Status,
    CreatedAt,
}
