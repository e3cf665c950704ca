use serde_json::{Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Decode, Postgres, Row as _, Type, TypeInfo};

use crate::models::Row;

/// Converts a result row to a JSON object keyed by column name.
///
/// Booleans, integers, floats and JSON map to native JSON values. Anything
/// else is returned as its text representation.
pub fn to_json(row: &PgRow) -> Row {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => decode::<bool>(row, idx).map(|v| v.map_or(Value::Null, Value::Bool)),
            "INT2" => decode::<i16>(row, idx).map(|v| v.map_or(Value::Null, Value::from)),
            "INT4" => decode::<i32>(row, idx).map(|v| v.map_or(Value::Null, Value::from)),
            "INT8" => decode::<i64>(row, idx).map(|v| v.map_or(Value::Null, Value::from)),
            "FLOAT4" => decode::<f32>(row, idx).map(|v| v.map_or(Value::Null, |f| float(f.into()))),
            "FLOAT8" => decode::<f64>(row, idx).map(|v| v.map_or(Value::Null, float)),
            "JSON" | "JSONB" => decode::<Value>(row, idx).map(Option::unwrap_or_default),
            _ => None,
        };
        let value = value.unwrap_or_else(|| text(row, idx));
        out.insert(column.name().to_owned(), value);
    }
    out
}

/// `None` when the column could not be decoded as `T`.
fn decode<'r, T>(row: &'r PgRow, idx: usize) -> Option<Option<T>>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get::<Option<T>, _>(idx).ok()
}

fn text(row: &PgRow, idx: usize) -> Value {
    match row.try_get_unchecked::<Option<String>, _>(idx) {
        Ok(Some(s)) => Value::String(s),
        _ => Value::Null,
    }
}

// NaN and infinities have no JSON number form.
fn float(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}
