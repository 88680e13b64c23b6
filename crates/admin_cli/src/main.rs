use std::{error::Error, str::FromStr};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, ExpenseNewCmd, RawParticipant, StoredExpense, UserNewCmd};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "sharesplit_admin")]
#[command(about = "Admin utilities for Sharesplit (users, expenses, balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./sharesplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Expense(Expense),
    /// Print how much every user owes across all expenses.
    Balances,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    mobile: Option<String>,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List,
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    description: String,
    /// Total amount in currency units, e.g. `100.50`.
    #[arg(long)]
    total: Decimal,
    /// `equal`, `exact` or `percentage`.
    #[arg(long)]
    method: String,
    /// `email` or `email=share`, repeated once per participant.
    #[arg(long = "participant", required = true, value_parser = parse_participant)]
    participants: Vec<RawParticipant>,
}

fn parse_participant(raw: &str) -> Result<RawParticipant, String> {
    match raw.split_once('=') {
        None => Ok(RawParticipant::new(raw.trim(), None)),
        Some((reference, share)) => {
            let share = Decimal::from_str(share.trim())
                .map_err(|err| format!("invalid share \"{share}\": {err}"))?;
            Ok(RawParticipant::new(reference.trim(), Some(share)))
        }
    }
}

fn print_expense(stored: &StoredExpense) {
    let expense = &stored.expense;
    println!(
        "{} {} \"{}\" {} ({})",
        stored.id,
        expense.created_at.format("%Y-%m-%d %H:%M"),
        expense.description,
        expense.total,
        expense.split_method,
    );
    for participant in &expense.participants {
        println!("    {:<30} {:>10}", participant.user.email, participant.share);
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let mut cmd = UserNewCmd::new(args.name, args.email);
            if let Some(mobile) = args.mobile {
                cmd = cmd.mobile(mobile);
            }
            let user = engine.create_user(cmd).await?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.list_users().await? {
                println!(
                    "{} {:<30} {} {}",
                    user.id,
                    user.email,
                    user.name,
                    user.mobile.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) => {
            let cmd = ExpenseNewCmd::new(args.description, args.total, args.method)
                .participants(args.participants);
            let stored = engine.create_expense(cmd).await?;
            print_expense(&stored);
        }
        Command::Expense(Expense {
            command: ExpenseCommand::List,
        }) => {
            for stored in engine.list_expenses().await? {
                print_expense(&stored);
            }
        }
        Command::Balances => {
            for balance in engine.balances().await? {
                println!(
                    "{:<30} {:>10} ({} expenses)",
                    balance.user.email, balance.owed, balance.expenses
                );
            }
        }
    }

    Ok(())
}
