use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    Postgres,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum SqlxBinds {
    String(String),
    OptionString(Option<String>),
    OptionInt(Option<i32>),
    OptionDate(Option<NaiveDate>),
    StringList(Vec<String>),
    Uuid(Uuid),
    UuidList(Vec<Uuid>),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

pub fn binds_query(stmt: &str, binds: Vec<SqlxBinds>) -> Query<'_, Postgres, PgArguments> {
    let mut q: Query<'_, Postgres, PgArguments> = sqlx::query(stmt);
    for bind in binds {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::OptionString(val) => q.bind(val),
            SqlxBinds::OptionInt(val) => q.bind(val),
            SqlxBinds::OptionDate(val) => q.bind(val),
            SqlxBinds::StringList(val) => q.bind(val),
            SqlxBinds::Uuid(val) => q.bind(val),
            SqlxBinds::UuidList(val) => q.bind(val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(val),
        };
    }
    q
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::OptionString(val) => q.bind(val),
            SqlxBinds::OptionInt(val) => q.bind(val),
            SqlxBinds::OptionDate(val) => q.bind(val),
            SqlxBinds::StringList(val) => q.bind(val),
            SqlxBinds::Uuid(val) => q.bind(val),
            SqlxBinds::UuidList(val) => q.bind(val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(val),
        };
    }
    q
}

fn push_wheres(stmt: &mut String, wheres: &[String]) {
    if !wheres.is_empty() {
        stmt.push_str(" WHERE");
        for (idx, item) in wheres.iter().enumerate() {
            stmt.push_str(&format!(" {}", item));
            if idx < wheres.len() - 1 {
                stmt.push_str(" AND");
            }
        }
    }
}

pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    order_by: Vec<String>,
) -> String {
    // Select
    let mut stmt = "SELECT ".to_string();
    if let Some(val) = select {
        stmt.push_str(&val);
    } else {
        stmt.push('*');
    }

    // From
    stmt.push_str(format!(" FROM {}", table_name).as_str());

    // Where
    push_wheres(&mut stmt, wheres);

    // order by
    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY");
        for (idx, item) in order_by.iter().enumerate() {
            stmt.push_str(format!(" {}", item).as_str());
            if idx < order_by.len() - 1 {
                stmt.push(',');
            }
        }
    }
    stmt
}

/// `sets` must not be empty; an `UPDATE` without assignments is invalid SQL.
pub fn update_builder(table_name: &str, sets: &[String], wheres: &[String]) -> String {
    let mut stmt = format!("UPDATE {} SET {}", table_name, sets.join(", "));
    push_wheres(&mut stmt, wheres);
    stmt
}
