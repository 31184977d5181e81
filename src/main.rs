use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use kakebo::{
    parse_amount, parse_date, Backend, Category, Movement, MovementStore, Settings, SqliteStore,
    Summary,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kakebo", version)]
#[command(about = "Personal income and expense tracker (CSV or SQLite)")]
#[command(after_help = "Categories: 1=NECESSITY, 2=CULTURE, 3=LEISURE_VICE, 4=EXTRAS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Create the movements file or database
    Init,
    /// Record money received
    Income {
        concept: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: f64,
    },
    /// Record money spent
    Expense {
        concept: String,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: f64,
        /// Code (1-4) or name, e.g. `extras`
        category: Category,
    },
    /// List movements, optionally within a date range
    List {
        #[arg(value_parser = parse_date, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Expenses strictly above a threshold (sqlite only)
    Above {
        #[arg(value_parser = parse_amount)]
        threshold: f64,
    },
    /// Delete a movement by id (sqlite only)
    Delete { id: i64 },
    /// Totals per direction and category, as JSON
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    init_logging(&settings.log_level);

    match cli.command {
        Command::Init => run_init(&settings),
        Command::Income { concept, date, amount } => {
            submit(&settings, &Movement::income(concept, date, amount)?)
        }
        Command::Expense { concept, date, amount, category } => {
            submit(&settings, &Movement::expense(concept, date, amount, category)?)
        }
        Command::List { from, to } => run_list(&settings, from.zip(to)),
        Command::Above { threshold } => run_above(&settings, threshold),
        Command::Delete { id } => run_delete(&settings, id),
        Command::Summary => run_summary(&settings),
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kakebo={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_init(settings: &Settings) -> Result<()> {
    settings.open_store().context("Failed to open store")?;

    match settings.backend {
        Backend::Csv => println!("✓ Movements file ready: {}", settings.csv_path.display()),
        Backend::Sqlite => println!("✓ Movements database ready: {}", settings.db_path.display()),
    }
    Ok(())
}

fn submit(settings: &Settings, movement: &Movement) -> Result<()> {
    let mut store = settings.open_store().context("Failed to open store")?;
    let id = store.submit(movement).context("Failed to save movement")?;

    match id {
        Some(id) => println!("✓ Saved #{}: {}", id, movement),
        None => println!("✓ Saved: {}", movement),
    }
    Ok(())
}

fn run_list(settings: &Settings, range: Option<(NaiveDate, NaiveDate)>) -> Result<()> {
    let store = settings.open_store().context("Failed to open store")?;

    let movements = match range {
        Some((from, to)) => store.fetch_between(from, to)?,
        None => store.fetch_all()?,
    };

    print_movements(&movements);
    Ok(())
}

fn run_above(settings: &Settings, threshold: f64) -> Result<()> {
    let store = sqlite_store(settings, "above")?;
    let expenses = store.find_expenses_above(threshold)?;

    print_movements(&expenses);
    Ok(())
}

fn run_delete(settings: &Settings, id: i64) -> Result<()> {
    let store = sqlite_store(settings, "delete")?;
    if store.delete(id)? {
        println!("✓ Deleted #{}", id);
    } else {
        println!("Nothing to delete: no movement #{}", id);
    }
    Ok(())
}

fn run_summary(settings: &Settings) -> Result<()> {
    let store = settings.open_store().context("Failed to open store")?;
    let summary = Summary::from_movements(&store.fetch_all()?);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn sqlite_store(settings: &Settings, command: &str) -> Result<SqliteStore> {
    if settings.backend != Backend::Sqlite {
        bail!("`{}` needs the sqlite backend (set KAKEBO_BACKEND=sqlite)", command);
    }
    Ok(SqliteStore::open(&settings.db_path).context("Failed to open database")?)
}

fn print_movements(movements: &[Movement]) {
    for movement in movements {
        match movement.id() {
            Some(id) => println!("#{:<5} {}", id, movement),
            None => println!("       {}", movement),
        }
    }
    println!("({} movements)", movements.len());
}
