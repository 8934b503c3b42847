use std::error::Error;

use chrono::SubsecRound;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Borrow `params` as the slice tokio-postgres binds from.
#[must_use]
pub fn as_refs(params: &[RowValues]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                // narrower integer columns created outside this crate
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            // TIMESTAMP keeps microseconds only
            RowValues::Timestamp(dt) => dt.trunc_subsecs(6).to_sql(ty, out),
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(blob) => blob.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::CHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn encode(value: &RowValues, ty: &Type) -> bytes::BytesMut {
        let mut out = bytes::BytesMut::new();
        value.to_sql_checked(ty, &mut out).unwrap();
        out
    }

    #[test]
    fn timestamps_are_written_at_microsecond_precision() {
        let base = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_nano_opt(14, 30, 5, 123_456_789))
            .unwrap();
        let micros = base.trunc_subsecs(6);
        assert_eq!(
            encode(&RowValues::Timestamp(base), &Type::TIMESTAMP),
            encode(&RowValues::Timestamp(micros), &Type::TIMESTAMP)
        );
    }

    #[test]
    fn integers_narrow_to_the_column_width() {
        assert_eq!(encode(&RowValues::Int(7), &Type::INT4).len(), 4);
        assert_eq!(encode(&RowValues::Int(7), &Type::INT8).len(), 8);
        let mut out = bytes::BytesMut::new();
        assert!(RowValues::Int(i64::MAX).to_sql_checked(&Type::INT4, &mut out).is_err());
    }
}
