//! Initial schema migration.
//!
//! Every row table carries a mandatory `tenant_id` column; there is no
//! tenant table here because tenants are owned by the auth layer.
//!
//! - `tenant_config`: one row per tenant (currency, start-of-month day)
//! - `recurring_rules`: recurring expense templates
//! - `expenses`: standalone and materialized expenses
//! - `categories`: ordered per-tenant category names

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum TenantConfig {
    Table,
    TenantId,
    Currency,
    StartDay,
}

#[derive(Iden)]
enum RecurringRules {
    Table,
    Id,
    TenantId,
    Name,
    AmountMinor,
    Currency,
    Category,
    StartDate,
    Interval,
    Occurrences,
    Tags,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    TenantId,
    RecurringId,
    Name,
    Category,
    AmountMinor,
    Currency,
    Date,
    Tags,
    Source,
    Card,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    TenantId,
    Name,
    Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Tenant config
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TenantConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantConfig::TenantId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantConfig::Currency).string().not_null())
                    .col(ColumnDef::new(TenantConfig::StartDay).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Recurring rules
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecurringRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecurringRules::TenantId).string().not_null())
                    .col(ColumnDef::new(RecurringRules::Name).string().not_null())
                    .col(
                        ColumnDef::new(RecurringRules::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringRules::Currency).string().not_null())
                    .col(ColumnDef::new(RecurringRules::Category).string().not_null())
                    .col(
                        ColumnDef::new(RecurringRules::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringRules::Interval).string().not_null())
                    .col(
                        ColumnDef::new(RecurringRules::Occurrences)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringRules::Tags).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recurring_rules-tenant_id")
                    .table(RecurringRules::Table)
                    .col(RecurringRules::TenantId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        // `recurring_id` is a weak reference: past instances outlive their rule.
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::TenantId).string().not_null())
                    .col(ColumnDef::new(Expenses::RecurringId).string())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Tags).text())
                    .col(ColumnDef::new(Expenses::Source).string())
                    .col(ColumnDef::new(Expenses::Card).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-tenant_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::TenantId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-tenant_id-recurring_id")
                    .table(Expenses::Table)
                    .col(Expenses::TenantId)
                    .col(Expenses::RecurringId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::TenantId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Position).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-categories-tenant_id-name")
                    .table(Categories::Table)
                    .col(Categories::TenantId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-tenant_id-position")
                    .table(Categories::Table)
                    .col(Categories::TenantId)
                    .col(Categories::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TenantConfig::Table).to_owned())
            .await?;
        Ok(())
    }
}
