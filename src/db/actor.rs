use crate::db::row::{Row, Value, validate_identifier};
use crate::db::schema::SQLITE_INIT;
use crate::error::TomeError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// Every row of a table, ordered by id.
    SelectAll(String, RpcReplyPort<Result<Vec<Row>, TomeError>>),

    /// Insert a row and return the id SQLite assigned.
    Insert(String, Row, RpcReplyPort<Result<i64, TomeError>>),

    /// Overwrite the given columns of the row with this id.
    Update(String, i64, Row, RpcReplyPort<Result<(), TomeError>>),

    /// Delete the row with this id.
    Delete(String, i64, RpcReplyPort<Result<(), TomeError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn select_all(&self, table: &str) -> Result<Vec<Row>, TomeError> {
        ractor::call!(self.actor, DbActorMessage::SelectAll, table.to_string())
            .map_err(|e| TomeError::RactorError(format!("DbActor SelectAll RPC failed: {e}")))?
    }

    pub async fn insert(&self, table: &str, row: Row) -> Result<i64, TomeError> {
        ractor::call!(self.actor, DbActorMessage::Insert, table.to_string(), row)
            .map_err(|e| TomeError::RactorError(format!("DbActor Insert RPC failed: {e}")))?
    }

    pub async fn update(&self, table: &str, id: i64, row: Row) -> Result<(), TomeError> {
        ractor::call!(self.actor, DbActorMessage::Update, table.to_string(), id, row)
            .map_err(|e| TomeError::RactorError(format!("DbActor Update RPC failed: {e}")))?
    }

    pub async fn delete(&self, table: &str, id: i64) -> Result<(), TomeError> {
        ractor::call!(self.actor, DbActorMessage::Delete, table.to_string(), id)
            .map_err(|e| TomeError::RactorError(format!("DbActor Delete RPC failed: {e}")))?
    }

    /// Stops the actor; pending calls fail with `RactorError`.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::SelectAll(table, reply) => {
                let res = self.select_all(&state.pool, &table).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Insert(table, row, reply) => {
                let res = self.insert(&state.pool, &table, row).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Update(table, id, row, reply) => {
                let res = self.update(&state.pool, &table, id, row).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Delete(table, id, reply) => {
                let res = self.delete(&state.pool, &table, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn select_all(&self, pool: &SqlitePool, table: &str) -> Result<Vec<Row>, TomeError> {
        let table = validate_identifier(table)?;
        let sql = format!("SELECT * FROM {table} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(pool).await?;

        let rows: Vec<Row> = rows.iter().map(decode_row).collect();
        debug!(table, count = rows.len(), "db select_all");
        Ok(rows)
    }

    async fn insert(&self, pool: &SqlitePool, table: &str, row: Row) -> Result<i64, TomeError> {
        let table = validate_identifier(table)?;
        let fields = row.into_fields();
        fields.check_decoded(table)?;

        let sql = if fields.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES RETURNING id")
        } else {
            let columns = column_list(&fields)?;
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!("INSERT INTO {table} ({columns}) VALUES ({placeholders}) RETURNING id")
        };

        let mut query = sqlx::query::<Sqlite>(&sql);
        for (_, value) in fields.iter() {
            query = bind_value(query, value);
        }
        let id: i64 = query.fetch_one(pool).await?.try_get(0)?;

        debug!(table, id, columns = fields.len(), "db insert applied");
        Ok(id)
    }

    async fn update(
        &self,
        pool: &SqlitePool,
        table: &str,
        id: i64,
        row: Row,
    ) -> Result<(), TomeError> {
        let table = validate_identifier(table)?;
        let fields = row.into_fields();
        fields.check_decoded(table)?;

        // An empty update still has to prove the row exists.
        let assignments = if fields.is_empty() {
            "id = id".to_string()
        } else {
            fields
                .iter()
                .map(|(column, _)| validate_identifier(column).map(|c| format!("{c} = ?")))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        };
        let sql = format!("UPDATE {table} SET {assignments} WHERE id = ?");

        let mut query = sqlx::query::<Sqlite>(&sql);
        for (_, value) in fields.iter() {
            query = bind_value(query, value);
        }
        let res = query.bind(id).execute(pool).await?;

        let affected = res.rows_affected();
        debug!(table, id, affected, columns = fields.len(), "db update applied");

        if affected == 0 {
            return Err(TomeError::NotFound {
                table: table.to_string(),
                id,
            });
        }
        Ok(())
    }

    async fn delete(&self, pool: &SqlitePool, table: &str, id: i64) -> Result<(), TomeError> {
        let table = validate_identifier(table)?;
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let res = sqlx::query(&sql).bind(id).execute(pool).await?;

        let affected = res.rows_affected();
        debug!(table, id, affected, "db delete applied");

        if affected == 0 {
            return Err(TomeError::NotFound {
                table: table.to_string(),
                id,
            });
        }
        Ok(())
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        // Rejected by `check_decoded` before binding.
        Value::Undecodable(_) => query.bind(None::<String>),
    }
}

fn column_list(fields: &Row) -> Result<String, TomeError> {
    Ok(fields
        .iter()
        .map(|(column, _)| validate_identifier(column))
        .collect::<Result<Vec<_>, _>>()?
        .join(", "))
}

/// Reads every cell; a cell that fails to decode becomes `Value::Undecodable` so one bad
/// row cannot fail the whole table read.
fn decode_row(row: &SqliteRow) -> Row {
    let mut out = Row::new();
    for column in row.columns() {
        let value = decode_cell(row, column.ordinal())
            .unwrap_or_else(|e| Value::Undecodable(e.to_string()));
        out.insert(column.name(), value);
    }
    out
}

fn decode_cell(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    Ok(match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get(idx)?),
        "REAL" => Value::Real(row.try_get(idx)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(idx)?;
            Value::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::Text(row.try_get(idx)?),
    })
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, TomeError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| TomeError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), TomeError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
