use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use store::{Currency, ExpenseDraft, Flow, Interval, MoneyCents, RuleSpec};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "expenses")]
#[command(about = "Admin utilities for the tenant-scoped expense store")]
pub struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    /// Overrides `database.url` from the settings.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Tenant every store command acts on.
    #[arg(long, short, global = true)]
    pub tenant: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ordered category list.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },
    /// Recurring rules and their generated expenses.
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommand,
    },
    /// Tenant currency and start-of-month day.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Apply or inspect schema migrations.
    Migrate {
        #[command(subcommand)]
        command: MigrateCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateCommand {
    Up,
    /// Roll back every applied migration.
    Down,
    /// Drop all tables and apply every migration again.
    Fresh,
    Status,
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommand {
    List,
    /// Replace the category list, keeping the given order.
    Set {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    List,
    Show {
        id: Uuid,
    },
    /// Show the expenses generated from a rule.
    Instances {
        id: Uuid,
    },
    Create(RuleArgs),
    Update {
        id: Uuid,
        /// Regenerate past instances too.
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        rule: RuleArgs,
    },
    Delete {
        id: Uuid,
        /// Delete past instances too.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpensesCommand {
    List,
    Get { id: Uuid },
    Add(ExpenseArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        expense: ExpenseArgs,
    },
    Remove {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    /// Values new tenants start from.
    Defaults,
    /// Currency, start day, categories and rules together.
    Settings,
    Currency {
        currency: Currency,
    },
    StartDay {
        day: u8,
    },
}

#[derive(Args, Debug)]
pub struct RuleArgs {
    #[arg(long)]
    pub name: String,
    /// Amount in major units, e.g. `-12.50`.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: MoneyCents,
    #[arg(long, value_parser = parse_flow)]
    pub flow: Option<Flow>,
    #[arg(long)]
    pub currency: Option<Currency>,
    #[arg(long)]
    pub category: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// First occurrence, `YYYY-MM-DD` or RFC 3339.
    #[arg(long, value_parser = parse_date)]
    pub start: DateTime<Utc>,
    #[arg(long)]
    pub interval: Interval,
    #[arg(long)]
    pub occurrences: u32,
}

impl From<RuleArgs> for RuleSpec {
    fn from(args: RuleArgs) -> Self {
        let mut spec = RuleSpec::new(
            args.name,
            args.amount,
            args.category,
            args.start,
            args.interval,
            args.occurrences,
        )
        .tags(args.tags);
        spec.flow = args.flow;
        spec.currency = args.currency;
        spec
    }
}

#[derive(Args, Debug)]
pub struct ExpenseArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: MoneyCents,
    #[arg(long, value_parser = parse_flow)]
    pub flow: Option<Flow>,
    #[arg(long)]
    pub currency: Option<Currency>,
    #[arg(long)]
    pub category: String,
    #[arg(long, value_parser = parse_date)]
    pub date: DateTime<Utc>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub card: Option<String>,
}

impl From<ExpenseArgs> for ExpenseDraft {
    fn from(args: ExpenseArgs) -> Self {
        ExpenseDraft {
            flow: args.flow,
            currency: args.currency,
            source: args.source,
            card: args.card,
            ..ExpenseDraft::new(args.name, args.category, args.amount, args.date).tags(args.tags)
        }
    }
}

fn parse_flow(raw: &str) -> Result<Flow, String> {
    Flow::try_from(raw).map_err(|err| err.to_string())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD or RFC 3339"))
}
