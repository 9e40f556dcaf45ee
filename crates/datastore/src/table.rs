//! The record table wraps a rusqlite connection and one table whose columns grow as fields are declared.
//!
//! This layer knows nothing about rules.  It creates the table, adds columns, inserts and reads rows.  Every
//! statement is logged at debug before it runs, and every engine failure is logged at error and then returned.
//! Creating the table is the one exception: if that fails we log it and carry on, and the failure shows up on the
//! first statement that touches the table.
use log::*;
use rusqlite::OptionalExtension;

use crate::descriptor::{check_name, quote_ident, TableDescriptor, ID_COLUMN};
use crate::errors::*;
use crate::row::Row;
use crate::row_value::{string_form, Record, RowValue};

/// SQL that we run as part of opening a connection.
///
/// - Enables the busy timeout.
/// - Enables foreign key enforcement (though we don't expect foreign keys to be used).
/// - Raises the default cache size, since everything lives in memory anyway.
///
/// There's no WAL: the database is in memory and goes away with the connection.
const INITIAL_SQL: &str = r#"
PRAGMA busy_timeout = 1000;
PRAGMA cache_size = -100000;
PRAGMA foreign_keys = 1;
"#;

const INSERT_TEMPLATE: &str = r#"
INSERT INTO {{ table }}
{%- if has_columns %}(
    {{ columns | join(sep=", ") }}
) VALUES (
    {%- for c in columns -%}
    ?{{ loop.index }}{% if not loop.last %}, {% endif -%}
    {%- endfor -%}
)
{%- else %} DEFAULT VALUES
{%- endif %}
"#;

const SELECT_TEMPLATE: &str = r#"
SELECT {{ id }}{% for c in columns %}, {{ c }}{% endfor %}
FROM {{ table }}
"#;

/// Statements which depend on the column list, rebuilt whenever it changes.
#[derive(Debug)]
struct Statements {
    insert: String,
    select: String,
}

impl Statements {
    fn build(descriptor: &TableDescriptor) -> Result<Statements> {
        let mut context = tera::Context::new();
        context.insert("table", &quote_ident(descriptor.get_name()));
        context.insert("id", &quote_ident(ID_COLUMN));
        context.insert(
            "columns",
            &descriptor.iter_columns().map(quote_ident).collect::<Vec<_>>(),
        );
        context.insert("has_columns", &(descriptor.column_count() > 0));

        let insert = tera::Tera::one_off(INSERT_TEMPLATE, &context, false)?
            .trim()
            .to_string();
        let select = tera::Tera::one_off(SELECT_TEMPLATE, &context, false)?
            .trim()
            .to_string();
        debug!("Insert statement for {}: {}", descriptor.get_name(), insert);
        debug!("Select statement for {}: {}", descriptor.get_name(), select);

        Ok(Statements { insert, select })
    }
}

/// Log an engine failure for `sql` and hand it back.
fn engine_failure(sql: &str, e: rusqlite::Error) -> Error {
    error!("{}: {}", sql, e);
    Error::Persistence(e)
}

pub struct RecordTable {
    conn: rusqlite::Connection,
    descriptor: TableDescriptor,
    statements: Statements,
}

impl RecordTable {
    /// Open a new in-memory database and create the table `name.to_lowercase()` in it.
    ///
    /// Each table gets its own connection.
    pub fn open(name: &str) -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        RecordTable::with_connection(conn, name)
    }

    /// Build a table on an already-existing connection.
    ///
    /// Only fails if the connection can't be set up.  A failure to create the table is logged and otherwise ignored.
    pub fn with_connection(conn: rusqlite::Connection, name: &str) -> Result<Self> {
        conn.execute_batch(INITIAL_SQL)?;

        let descriptor = TableDescriptor::new(name.to_lowercase());
        let statements = Statements::build(&descriptor)?;
        let table = RecordTable {
            conn,
            descriptor,
            statements,
        };
        table.create();
        Ok(table)
    }

    fn create(&self) {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({} INTEGER PRIMARY KEY AUTOINCREMENT)",
            quote_ident(self.descriptor.get_name()),
            quote_ident(ID_COLUMN)
        );
        debug!("{}", sql);
        if let Err(e) = self.conn.execute(&sql, []) {
            error!("Unable to create table {}: {}", self.descriptor.get_name(), e);
        }
    }

    pub fn get_name(&self) -> &str {
        self.descriptor.get_name()
    }

    pub fn get_descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Append a column named `name`.
    ///
    /// Adding a column which already exists fails in sqlite, and that failure is returned.
    pub fn add_column(&mut self, name: &str) -> Result<()> {
        check_name(name)?;

        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_ident(self.descriptor.get_name()),
            quote_ident(name)
        );
        debug!("{}", sql);
        self.conn
            .execute(&sql, [])
            .map_err(|e| engine_failure(&sql, e))?;

        self.descriptor.push_column(name.to_string());
        self.statements = Statements::build(&self.descriptor)?;
        Ok(())
    }

    /// Insert a row, returning the id sqlite assigned to it.
    ///
    /// The record must have exactly one value per value column.  Values are stored in their string form.
    pub fn insert(&mut self, record: &Record) -> Result<i64> {
        let rv = RowValue::new(&self.descriptor, record).map_err(|e| {
            error!("{}: {}", self.descriptor.get_name(), e);
            e
        })?;

        let sql = &self.statements.insert;
        debug!("{}", sql);
        let mut statement = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| engine_failure(sql, e))?;
        statement
            .execute(rusqlite::params_from_iter(rv.iter()))
            .map_err(|e| engine_failure(sql, e))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Read up to `limit` rows, in id order.
    pub fn fetch_first(&self, limit: usize) -> Result<Vec<Row>> {
        let sql = format!(
            "{} ORDER BY {} LIMIT ?1",
            self.statements.select,
            quote_ident(ID_COLUMN)
        );
        // sqlite treats a negative limit as no limit at all, so saturate rather than wrap.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        debug!("{}", sql);
        let mut statement = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| engine_failure(&sql, e))?;
        let rows = statement
            .query_map([limit], |r| Row::from_rusqlite_row(&self.descriptor, r))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| engine_failure(&sql, e))?;

        Ok(rows)
    }

    /// Read the first row where `key_column` equals `key`.
    ///
    /// The key is compared in its string form.  Since `id` has integer affinity, sqlite converts the key back to an
    /// integer when looking up by id.
    ///
    /// `key_column` must be `id` or one of the table's columns.  Sqlite would read a quoted name that matches no column
    /// as a string literal, so unknown columns are refused before any sql is built.
    pub fn fetch_by_key(&self, key_column: &str, key: &serde_json::Value) -> Result<Option<Row>> {
        if !key_column.eq_ignore_ascii_case(ID_COLUMN) && !self.descriptor.has_column(key_column) {
            error!(
                "{}: no column {} to fetch by",
                self.descriptor.get_name(),
                key_column
            );
            return Err(Error::UnknownField {
                field: key_column.to_string(),
            });
        }

        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY {} LIMIT 1",
            self.statements.select,
            quote_ident(key_column),
            quote_ident(ID_COLUMN)
        );

        debug!("{}", sql);
        let mut statement = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| engine_failure(&sql, e))?;
        let row = statement
            .query_row([string_form(key)], |r| {
                Row::from_rusqlite_row(&self.descriptor, r)
            })
            .optional()
            .map_err(|e| engine_failure(&sql, e))?;

        Ok(row)
    }

    /// Replace the row where `key_column` equals `key`.
    ///
    /// Not implemented: always fails.
    pub fn update(
        &mut self,
        key_column: &str,
        _key: &serde_json::Value,
        _record: &Record,
    ) -> Result<()> {
        warn!(
            "Refusing to update {} by {}: updates are not implemented",
            self.descriptor.get_name(),
            key_column
        );
        Err(Error::NotImplemented {
            operation: "update",
        })
    }

    /// The columns sqlite reports for the table, including `id`, in table order.
    pub fn column_names(&self) -> Result<Vec<String>> {
        let sql = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

        debug!("{}", sql);
        let mut statement = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| engine_failure(sql, e))?;
        let names = statement
            .query_map([self.descriptor.get_name()], |r| r.get(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
            .map_err(|e| engine_failure(sql, e))?;

        Ok(names)
    }

    pub fn row_count(&self) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            quote_ident(self.descriptor.get_name())
        );

        debug!("{}", sql);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |r| r.get(0))
            .map_err(|e| engine_failure(&sql, e))?;

        Ok(count as u64)
    }
}
