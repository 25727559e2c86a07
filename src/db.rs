//! The SQLite record store that supplies the cash flow report.
//!
//! Transactions are stored in cents against an account and, optionally, a
//! payee. A payee with a `transfer_acct` represents another account, so
//! transactions with that payee are transfers. Off-budget accounts are
//! excluded from every query.

use rusqlite::{Connection, params, types::ValueRef};
use time::Date;

use crate::{
    Error,
    cash_flow::{AggregateRow, CashFlowInputs, DateRange, Granularity, SimpleCashFlow},
};

/// The database ID of an account.
pub type AccountId = i64;

/// The database ID of a payee.
pub type PayeeId = i64;

/// The database ID of a transaction.
pub type TransactionId = i64;

/// Which group of transactions to sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSign {
    /// Transactions with an amount greater than zero.
    Positive,
    /// Transactions with an amount less than zero.
    Negative,
}

impl AmountSign {
    fn predicate(self) -> &'static str {
        match self {
            Self::Positive => "t.amount > 0",
            Self::Negative => "t.amount < 0",
        }
    }
}

/// A transaction to insert with [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The payee, if any.
    pub payee_id: Option<PayeeId>,
    /// When the transaction happened.
    pub date: Date,
    /// The amount in cents, negative for money leaving the account.
    pub amount: i64,
}

/// Create the tables for the record store if they do not exist.
///
/// # Errors
/// Returns [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            offbudget INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS payee (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            transfer_acct INTEGER REFERENCES account(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            payee_id INTEGER REFERENCES payee(id) ON DELETE SET NULL,
            date TEXT NOT NULL,
            amount INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
    )?;

    Ok(())
}

/// Create an account and return its ID.
///
/// # Errors
/// Returns [Error::SqlError] if the name is already taken or the insert fails.
pub fn create_account(
    name: &str,
    offbudget: bool,
    connection: &Connection,
) -> Result<AccountId, Error> {
    connection.execute(
        "INSERT INTO account (name, offbudget) VALUES (?1, ?2)",
        params![name, offbudget],
    )?;

    Ok(connection.last_insert_rowid())
}

/// Create a payee and return its ID.
///
/// Set `transfer_account` to make the payee stand for another account.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn create_payee(
    name: &str,
    transfer_account: Option<AccountId>,
    connection: &Connection,
) -> Result<PayeeId, Error> {
    connection.execute(
        "INSERT INTO payee (name, transfer_acct) VALUES (?1, ?2)",
        params![name, transfer_account],
    )?;

    Ok(connection.last_insert_rowid())
}

/// Insert a transaction and return its ID.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (account_id, payee_id, date, amount) VALUES (?1, ?2, ?3, ?4)",
        params![
            transaction.account_id,
            transaction.payee_id,
            transaction.date,
            transaction.amount
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

/// Sums on-budget transactions in `range` with the given sign.
///
/// Rows are grouped by bucket (day or `YYYY-MM` month) and by the payee's
/// transfer account, and ordered by bucket. A sum that is not an integer,
/// e.g. because a stored amount is text or real, gets no amount.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_grouped_sums(
    range: DateRange,
    granularity: Granularity,
    sign: AmountSign,
    connection: &Connection,
) -> Result<Vec<AggregateRow>, Error> {
    let bucket = match granularity {
        Granularity::Daily => "t.date",
        Granularity::Monthly => "strftime('%Y-%m', t.date)",
    };

    let query = format!(
        "SELECT
            {bucket} AS bucket,
            p.transfer_acct,
            SUM(t.amount)
        FROM \"transaction\" t
        INNER JOIN account a ON a.id = t.account_id
        LEFT JOIN payee p ON p.id = t.payee_id
        WHERE a.offbudget = 0
            AND t.date BETWEEN ?1 AND ?2
            AND {}
        GROUP BY bucket, p.transfer_acct
        ORDER BY bucket, p.transfer_acct",
        sign.predicate()
    );

    let mut stmt = connection.prepare(&query)?;
    stmt.query_map(params![range.start, range.end], |row| {
        let transfer_account: Option<AccountId> = row.get(1)?;

        // Non-integer sums are left for the indexer to reject as malformed.
        let amount = match row.get_ref(2)? {
            ValueRef::Integer(amount) => Some(amount),
            _ => None,
        };

        Ok(AggregateRow {
            date: row.get(0)?,
            is_transfer: transfer_account.map(|id| id.to_string()),
            amount,
        })
    })?
    .collect::<Result<Vec<AggregateRow>, rusqlite::Error>>()
    .map_err(|error| error.into())
}

/// The sum of on-budget transactions strictly before `start`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_opening_balance(start: Date, connection: &Connection) -> Result<i64, Error> {
    let mut stmt = connection.prepare(
        "SELECT COALESCE(SUM(t.amount), 0)
        FROM \"transaction\" t
        INNER JOIN account a ON a.id = t.account_id
        WHERE a.offbudget = 0 AND t.date < ?1",
    )?;

    let total: i64 = stmt.query_row([start], |row| row.get(0))?;

    Ok(total)
}

/// Fetches everything needed to build a report for `range`.
///
/// # Errors
/// Returns [Error::SqlError] if any query fails.
pub fn get_cash_flow_inputs(
    range: DateRange,
    granularity: Granularity,
    connection: &Connection,
) -> Result<CashFlowInputs, Error> {
    Ok(CashFlowInputs {
        starting_balance: get_opening_balance(range.start, connection)?,
        income: get_grouped_sums(range, granularity, AmountSign::Positive, connection)?,
        expense: get_grouped_sums(range, granularity, AmountSign::Negative, connection)?,
    })
}

/// Total income and expenses in `range`, excluding transfers.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_simple_cash_flow(
    range: DateRange,
    connection: &Connection,
) -> Result<SimpleCashFlow, Error> {
    let mut stmt = connection.prepare(
        "SELECT
            COALESCE(SUM(CASE WHEN t.amount > 0 THEN t.amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN t.amount < 0 THEN t.amount ELSE 0 END), 0)
        FROM \"transaction\" t
        INNER JOIN account a ON a.id = t.account_id
        LEFT JOIN payee p ON p.id = t.payee_id
        WHERE a.offbudget = 0
            AND p.transfer_acct IS NULL
            AND t.date BETWEEN ?1 AND ?2",
    )?;

    stmt.query_row(params![range.start, range.end], |row| {
        Ok(SimpleCashFlow {
            income: row.get(0)?,
            expense: row.get(1)?,
        })
    })
    .map_err(|error| error.into())
}
