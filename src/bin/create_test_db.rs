use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime, Weekday};

use budgeteur_cash_flow::{
    db::{NewTransaction, create_account, create_payee, create_transaction},
    initialize_db,
};

/// A utility for creating a test database for the budgeteur cash flow server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of transactions to create, ending today.
    #[arg(long, default_value_t = 365)]
    days: u16,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating accounts and payees...");

    let checking = create_account("Checking", false, &conn)?;
    let savings = create_account("Savings", false, &conn)?;
    let kiwisaver = create_account("KiwiSaver", true, &conn)?;

    let employer = create_payee("Employer", None, &conn)?;
    let supermarket = create_payee("Supermarket", None, &conn)?;
    let landlord = create_payee("Landlord", None, &conn)?;
    let to_savings = create_payee("Transfer: Savings", Some(savings), &conn)?;
    let from_checking = create_payee("Transfer: Checking", Some(checking), &conn)?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let first_day = today - Duration::days(i64::from(args.days));

    let daily_transactions = |date: Date| {
        let mut transactions = Vec::new();
        let day = date.day();

        if day == 1 {
            transactions.push((checking, landlord, -180_000));
        }

        if day == 15 {
            transactions.push((checking, employer, 420_000));
            transactions.push((checking, to_savings, -50_000));
            transactions.push((savings, from_checking, 50_000));
            transactions.push((kiwisaver, employer, 12_600));
        }

        if date.weekday() == Weekday::Saturday {
            transactions.push((checking, supermarket, -(15_000 + i64::from(day) * 137)));
        }

        transactions
    };

    let transactions = (0..=args.days).flat_map(|offset| {
        let date = first_day + Duration::days(i64::from(offset));
        daily_transactions(date)
            .into_iter()
            .map(move |(account_id, payee_id, amount)| NewTransaction {
                account_id,
                payee_id: Some(payee_id),
                date,
                amount,
            })
    });

    let mut count = 0;

    for (account_id, payee_id, amount) in [
        (checking, employer, 250_000),
        (savings, employer, 1_000_000),
        (kiwisaver, employer, 2_500_000),
    ] {
        create_transaction(
            &NewTransaction {
                account_id,
                payee_id: Some(payee_id),
                date: first_day - Duration::days(1),
                amount,
            },
            &conn,
        )?;
        count += 1;
    }

    for transaction in transactions {
        create_transaction(&transaction, &conn)?;
        count += 1;
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
