//! Live execution through the `scylla` driver.
//!
//! Works with both ScyllaDB and Apache Cassandra over the CQL native protocol.

use crate::client::{CqlSession, ExecOutcome};
use crate::config::{AuthMechanism, DestinationConfig};
use crate::error::{SinkError, SinkResult};
use crate::value::Value;
use scylla::client::caching_session::CachingSession;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::cluster::metadata::{ColumnType, NativeType};
use scylla::statement::unprepared::Statement as UnpreparedStatement;
use chrono::{NaiveDate, NaiveTime, Timelike};
use scylla::value::{
    CqlDate, CqlDecimal, CqlTime, CqlTimestamp, CqlTimeuuid, CqlValue, CqlVarint, Row,
};
use tracing::info;

/// A connected cluster session with a prepared statement cache.
pub struct ScyllaSession {
    session: CachingSession,
}

impl ScyllaSession {
    /// Connect using the destination configuration.
    pub async fn connect(config: &DestinationConfig) -> SinkResult<Self> {
        config.validate()?;
        let nodes = config.contact_points()?;
        info!(nodes = ?nodes, keyspace = %config.keyspace, "connecting to cluster");

        let mut builder = SessionBuilder::new()
            .known_nodes(&nodes)
            .use_keyspace(&config.keyspace, false)
            .connection_timeout(config.connect_timeout());

        if config.auth.mechanism == AuthMechanism::Basic {
            builder = builder.user(
                config.auth.username.clone().unwrap_or_default(),
                config.auth.password.clone().unwrap_or_default(),
            );
        }

        let session = builder
            .build()
            .await
            .map_err(|e| SinkError::Connection(format!("error connecting to the cluster: {e}")))?;

        Ok(Self::from_session(session, config.statement_cache_size))
    }

    /// Wrap an already connected driver session.
    pub fn from_session(session: Session, statement_cache_size: usize) -> Self {
        Self {
            session: CachingSession::from(session, statement_cache_size.max(1)),
        }
    }

    /// The underlying driver session.
    pub fn inner(&self) -> &Session {
        self.session.get_session()
    }
}

impl CqlSession for ScyllaSession {
    async fn execute(&self, cql: &str, params: &[Value]) -> SinkResult<ExecOutcome> {
        let statement = UnpreparedStatement::new(cql);
        let prepared = self
            .session
            .add_prepared_statement(&statement)
            .await
            .map_err(|e| SinkError::execution(format!("prepare failed: {e}")))?;

        let col_specs = prepared.get_variable_col_specs();
        if col_specs.len() != params.len() {
            return Err(SinkError::execution(format!(
                "statement has {} bind markers but {} params were given",
                col_specs.len(),
                params.len()
            )));
        }

        let values = col_specs
            .iter()
            .zip(params)
            .map(|(col, value)| coerce(value, col.typ(), col.name()))
            .collect::<SinkResult<Vec<Option<CqlValue>>>>()?;

        let result = self
            .session
            .get_session()
            .execute_unpaged(&prepared, values)
            .await
            .map_err(|e| SinkError::execution(e.to_string()))?;

        // Conditional statements answer with an `[applied]` row; plain writes return no rows.
        let Ok(rows) = result.into_rows_result() else {
            return Ok(ExecOutcome::APPLIED);
        };
        let mut iter = rows
            .rows::<Row>()
            .map_err(|e| SinkError::execution(format!("unexpected result shape: {e}")))?;
        match iter.next() {
            Some(row) => {
                let row = row.map_err(|e| SinkError::execution(e.to_string()))?;
                let applied = !matches!(row.columns.first(), Some(Some(CqlValue::Boolean(false))));
                Ok(ExecOutcome { applied })
            }
            None => Ok(ExecOutcome::APPLIED),
        }
    }
}

/// Convert a record value into the bind marker's declared type.
///
/// `None` binds CQL null.
fn coerce(value: &Value, typ: &ColumnType<'_>, column: &str) -> SinkResult<Option<CqlValue>> {
    let mismatch = || {
        SinkError::execution(format!(
            "cannot bind {} value to column {column} of type {typ:?}",
            value.type_name()
        ))
    };

    let ColumnType::Native(native) = typ else {
        return match value {
            Value::Null => Ok(None),
            _ => Err(mismatch()),
        };
    };

    let cql = match (value, native) {
        (Value::Null, _) => return Ok(None),

        (Value::Boolean(b), NativeType::Boolean) => CqlValue::Boolean(*b),
        (Value::Boolean(b), NativeType::Text) => CqlValue::Text(b.to_string()),

        (Value::Int(i), NativeType::TinyInt) => {
            CqlValue::TinyInt(i8::try_from(*i).map_err(|_| mismatch())?)
        }
        (Value::Int(i), NativeType::SmallInt) => {
            CqlValue::SmallInt(i16::try_from(*i).map_err(|_| mismatch())?)
        }
        (Value::Int(i), NativeType::Int) => CqlValue::Int(i32::try_from(*i).map_err(|_| mismatch())?),
        (Value::Int(i), NativeType::BigInt) => CqlValue::BigInt(*i),
        (Value::Int(i), NativeType::Float) => CqlValue::Float(*i as f32),
        (Value::Int(i), NativeType::Double) => CqlValue::Double(*i as f64),
        (Value::Int(i), NativeType::Timestamp) => CqlValue::Timestamp(CqlTimestamp(*i)),
        (Value::Int(i), NativeType::Text) => CqlValue::Text(i.to_string()),
        (Value::Int(i), NativeType::Ascii) => CqlValue::Ascii(i.to_string()),
        (Value::Int(i), NativeType::Varint) => CqlValue::Varint(varint(i128::from(*i))),
        (Value::Int(i), NativeType::Decimal) => CqlValue::Decimal(decimal(i128::from(*i), 0)),

        (Value::Double(f), NativeType::Float) => CqlValue::Float(*f as f32),
        (Value::Double(f), NativeType::Double) => CqlValue::Double(*f),
        (Value::Double(f), NativeType::Text) => CqlValue::Text(f.to_string()),
        (Value::Double(f), NativeType::Decimal) => {
            CqlValue::Decimal(parse_decimal(&f.to_string()).ok_or_else(mismatch)?)
        }
        // JSON sources often emit whole numbers as `22.0`
        (Value::Double(f), NativeType::TinyInt) => {
            CqlValue::TinyInt(whole_as(*f).ok_or_else(mismatch)?)
        }
        (Value::Double(f), NativeType::SmallInt) => {
            CqlValue::SmallInt(whole_as(*f).ok_or_else(mismatch)?)
        }
        (Value::Double(f), NativeType::Int) => CqlValue::Int(whole_as(*f).ok_or_else(mismatch)?),
        (Value::Double(f), NativeType::BigInt) => CqlValue::BigInt(whole(*f).ok_or_else(mismatch)?),
        (Value::Double(f), NativeType::Varint) => {
            CqlValue::Varint(varint(i128::from(whole(*f).ok_or_else(mismatch)?)))
        }

        (Value::Text(s), NativeType::Text) => CqlValue::Text(s.clone()),
        (Value::Text(s), NativeType::Ascii) => CqlValue::Ascii(s.clone()),
        (Value::Text(s), NativeType::Uuid) => {
            CqlValue::Uuid(s.parse().map_err(|_| mismatch())?)
        }
        (Value::Text(s), NativeType::Timeuuid) => {
            CqlValue::Timeuuid(CqlTimeuuid::from(s.parse::<uuid::Uuid>().map_err(|_| mismatch())?))
        }
        (Value::Text(s), NativeType::Timestamp) => {
            let ts = chrono::DateTime::parse_from_rfc3339(s).map_err(|_| mismatch())?;
            CqlValue::Timestamp(CqlTimestamp(ts.timestamp_millis()))
        }
        (Value::Text(s), NativeType::Inet) => CqlValue::Inet(s.parse().map_err(|_| mismatch())?),
        (Value::Text(s), NativeType::Boolean) => CqlValue::Boolean(s.parse().map_err(|_| mismatch())?),
        (Value::Text(s), NativeType::Int) => CqlValue::Int(s.parse().map_err(|_| mismatch())?),
        (Value::Text(s), NativeType::BigInt) => CqlValue::BigInt(s.parse().map_err(|_| mismatch())?),
        (Value::Text(s), NativeType::Blob) => CqlValue::Blob(s.as_bytes().to_vec()),
        (Value::Text(s), NativeType::Varint) => {
            CqlValue::Varint(varint(s.parse().map_err(|_| mismatch())?))
        }
        (Value::Text(s), NativeType::Decimal) => {
            CqlValue::Decimal(parse_decimal(s).ok_or_else(mismatch)?)
        }
        (Value::Text(s), NativeType::Date) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| mismatch())?;
            CqlValue::Date(date_value(date).ok_or_else(mismatch)?)
        }
        (Value::Text(s), NativeType::Time) => {
            CqlValue::Time(time_value(s.parse().map_err(|_| mismatch())?))
        }

        (Value::Timestamp(ts), NativeType::Timestamp) => {
            CqlValue::Timestamp(CqlTimestamp(ts.timestamp_millis()))
        }
        (Value::Timestamp(ts), NativeType::Text) => CqlValue::Text(ts.to_rfc3339()),
        (Value::Timestamp(ts), NativeType::Date) => {
            CqlValue::Date(date_value(ts.date_naive()).ok_or_else(mismatch)?)
        }

        (Value::Uuid(u), NativeType::Uuid) => CqlValue::Uuid(*u),
        (Value::Uuid(u), NativeType::Timeuuid) => CqlValue::Timeuuid(CqlTimeuuid::from(*u)),
        (Value::Uuid(u), NativeType::Text) => CqlValue::Text(u.to_string()),

        (Value::Blob(b), NativeType::Blob) => CqlValue::Blob(b.clone()),

        _ => return Err(mismatch()),
    };

    Ok(Some(cql))
}

/// `f` as an integer, if it has no fractional part and fits in `i64`.
fn whole(f: f64) -> Option<i64> {
    // 2^63 itself is out of range
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then_some(f as i64)
}

fn whole_as<T: TryFrom<i64>>(f: f64) -> Option<T> {
    whole(f).and_then(|i| T::try_from(i).ok())
}

/// Minimal two's complement big-endian encoding.
fn signed_be_bytes(n: i128) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (b, next) = (bytes[start], bytes[start + 1]);
        let redundant = (b == 0x00 && next & 0x80 == 0) || (b == 0xff && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn varint(n: i128) -> CqlVarint {
    CqlVarint::from_signed_bytes_be(signed_be_bytes(n))
}

fn decimal(unscaled: i128, scale: i32) -> CqlDecimal {
    CqlDecimal::from_signed_be_bytes_and_exponent(signed_be_bytes(unscaled), scale)
}

/// Parse `-12.345` or `1.5e3` into an exact decimal.
fn parse_decimal(s: &str) -> Option<CqlDecimal> {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(at) => (&s[..at], s[at + 1..].parse::<i32>().ok()?),
        None => (s, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = int_part.trim_start_matches(['-', '+']);
    if digits.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let unscaled: i128 = format!("{int_part}{frac_part}").parse().ok()?;
    let scale = i32::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;
    Some(decimal(unscaled, scale))
}

/// Days since the epoch, centered at 2^31.
fn date_value(date: NaiveDate) -> Option<CqlDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let days = date.signed_duration_since(epoch).num_days() + (1i64 << 31);
    u32::try_from(days).ok().map(CqlDate)
}

/// Nanoseconds since midnight.
fn time_value(time: NaiveTime) -> CqlTime {
    let seconds = i64::from(time.num_seconds_from_midnight());
    CqlTime(seconds * 1_000_000_000 + i64::from(time.nanosecond()))
}
