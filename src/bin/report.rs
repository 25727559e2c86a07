use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use budgeteur_cash_flow::{
    cash_flow::{Granularity, build_report, label_buckets, resolve_date_range},
    db::get_cash_flow_inputs,
    get_local_today,
};

/// Print a cash flow report from a budgeteur database as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The first month to include, e.g. "2024-01".
    #[arg(long)]
    start: String,

    /// The last month to include, e.g. "2024-06".
    #[arg(long)]
    end: String,

    /// The bucket size, "daily" or "monthly".
    #[arg(long, default_value = "monthly")]
    granularity: Granularity,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Also print the formatted label for each bucket.
    #[arg(long)]
    labels: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("Could not find a database at {db_path:#?}");
        exit(1);
    }

    let conn = Connection::open(db_path)?;

    let today = get_local_today(&args.timezone)?;
    let range = resolve_date_range(&args.start, &args.end, args.granularity, today)?;
    let inputs = get_cash_flow_inputs(range, args.granularity, &conn)?;
    let report = build_report(&inputs, range, args.granularity)?;

    let output = if args.labels {
        serde_json::json!({
            "report": report,
            "labels": label_buckets(&report)?,
        })
    } else {
        serde_json::to_value(&report)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
