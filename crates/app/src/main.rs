use clap::Parser;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use store::{ExpenseDraft, RuleSpec, Store};

use cli::{
    CategoriesCommand, Cli, Command, ConfigCommand, ExpensesCommand, MigrateCommand, RulesCommand,
};

mod cli;
mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "expenses={level},store={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url.clone());
    let db = sea_orm::Database::connect(url.as_str()).await?;
    if let Command::Migrate { command } = cli.command {
        return migrate(&db, command).await;
    }

    Migrator::up(&db, None).await?;
    let store = Store::builder()
        .database(db)
        .defaults(settings.defaults)
        .build()?;

    if let Command::Config {
        command: ConfigCommand::Defaults,
    } = cli.command
    {
        return print_json(store.defaults());
    }

    let tenant = cli
        .tenant
        .ok_or("--tenant is required for this command")?;
    run(&store, &tenant, cli.command).await
}

async fn migrate(db: &DatabaseConnection, command: MigrateCommand) -> Result<(), BoxError> {
    match command {
        MigrateCommand::Up => Migrator::up(db, None).await?,
        MigrateCommand::Down => Migrator::down(db, None).await?,
        MigrateCommand::Fresh => Migrator::fresh(db).await?,
        MigrateCommand::Status => Migrator::status(db).await?,
    }
    tracing::info!(?command, "migration command finished");
    Ok(())
}

async fn run(store: &Store, tenant: &str, command: Command) -> Result<(), BoxError> {
    match command {
        Command::Categories { command } => match command {
            CategoriesCommand::List => print_json(&store.categories(tenant).await?),
            CategoriesCommand::Set { names } => {
                store.reconcile_categories(tenant, &names).await?;
                print_json(&store.categories(tenant).await?)
            }
        },
        Command::Rules { command } => match command {
            RulesCommand::List => print_json(&store.recurring_rules(tenant).await?),
            RulesCommand::Show { id } => print_json(&store.recurring_rule(tenant, id).await?),
            RulesCommand::Instances { id } => print_json(&store.rule_instances(tenant, id).await?),
            RulesCommand::Create(args) => {
                let rule = store
                    .create_recurring_rule(tenant, &RuleSpec::from(args))
                    .await?;
                tracing::info!(rule_id = %rule.id, "created recurring rule");
                print_json(&rule)
            }
            RulesCommand::Update { id, all, rule } => {
                store
                    .update_recurring_rule(tenant, id, &RuleSpec::from(rule), all)
                    .await?;
                print_json(&store.recurring_rule(tenant, id).await?)
            }
            RulesCommand::Delete { id, all } => {
                store.delete_recurring_rule(tenant, id, all).await?;
                tracing::info!(rule_id = %id, all, "deleted recurring rule");
                Ok(())
            }
        },
        Command::Expenses { command } => match command {
            ExpensesCommand::List => print_json(&store.list_expenses(tenant).await?),
            ExpensesCommand::Get { id } => print_json(&store.get_expense(tenant, id).await?),
            ExpensesCommand::Add(args) => {
                print_json(&store.add_expense(tenant, &ExpenseDraft::from(args)).await?)
            }
            ExpensesCommand::Update { id, expense } => {
                store
                    .update_expense(tenant, id, &ExpenseDraft::from(expense))
                    .await?;
                print_json(&store.get_expense(tenant, id).await?)
            }
            ExpensesCommand::Remove { ids } => {
                let removed = store.remove_expenses(tenant, &ids).await?;
                tracing::info!(removed, "removed expenses");
                Ok(())
            }
        },
        Command::Config { command } => match command {
            ConfigCommand::Show => print_json(&store.tenant_config(tenant).await?),
            ConfigCommand::Defaults => print_json(store.defaults()),
            ConfigCommand::Settings => print_json(&store.tenant_settings(tenant).await?),
            ConfigCommand::Currency { currency } => {
                store.update_currency(tenant, currency).await?;
                print_json(&store.tenant_config(tenant).await?)
            }
            ConfigCommand::StartDay { day } => {
                store.update_start_day(tenant, day).await?;
                print_json(&store.tenant_config(tenant).await?)
            }
        },
        Command::Migrate { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
