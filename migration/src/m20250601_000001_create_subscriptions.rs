use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    ServiceName,
    Price,
    UserId,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::ServiceName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Price)
                            .integer()
                            .not_null()
                            .check(Expr::col(Subscriptions::Price).gt(0)),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::StartDate).date().not_null())
                    .col(ColumnDef::new(Subscriptions::EndDate).date().null())
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_user_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Subscriptions::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
