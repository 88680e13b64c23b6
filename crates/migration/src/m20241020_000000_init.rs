//! Initial schema:
//!
//! - `users`: participants, referenced by email
//! - `expenses`: one row per recorded expense
//! - `expense_participants`: the shares of each expense, in input order

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    Mobile,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Description,
    TotalMinor,
    SplitMethod,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseParticipants {
    Table,
    Id,
    ExpenseId,
    Position,
    UserId,
    ShareMinor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Mobile).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Expenses
        // ───────────────────────────────────────────────────────────────────
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
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::TotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::SplitMethod).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expense participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseParticipants::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::ShareMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-expense_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-user_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_participants-expense_id-position-unique")
                    .table(ExpenseParticipants::Table)
                    .col(ExpenseParticipants::ExpenseId)
                    .col(ExpenseParticipants::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_participants-user_id")
                    .table(ExpenseParticipants::Table)
                    .col(ExpenseParticipants::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenseParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
