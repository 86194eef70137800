//! Helpers for storing exact decimal amounts in SQLite.
//!
//! SQLite has no decimal type and its `REAL` columns would lose precision,
//! so amounts and balances are stored as canonical decimal strings and all
//! arithmetic on them happens in Rust.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

use crate::Error;

/// Read the decimal stored as text in column `index` of `row`.
///
/// # Errors
/// Returns a [rusqlite::Error::FromSqlConversionFailure] if the column does
/// not hold a valid decimal string.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

/// Format `amount` for storage.
pub fn to_sql_text(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// `a + b`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the result overflows.
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
    a.checked_add(b).ok_or(Error::AmountOutOfRange)
}

/// `a - b`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the result overflows.
pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
    a.checked_sub(b).ok_or(Error::AmountOutOfRange)
}

/// The sum of `amounts`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the sum overflows.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts.into_iter().try_fold(Decimal::ZERO, checked_add)
}

/// `part` as a percentage of `whole`, or zero if `whole` is zero.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the ratio overflows.
pub fn checked_percentage(part: Decimal, whole: Decimal) -> Result<Decimal, Error> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }

    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(Error::AmountOutOfRange)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::Error;

    use super::{checked_add, checked_percentage, checked_sub, checked_sum, get_decimal, to_sql_text};

    #[test]
    fn round_trips_through_text_column() {
        let conn = Connection::open_in_memory().unwrap();
        let amount = Decimal::new(-12345, 2);

        let got = conn
            .query_row("SELECT ?1", [to_sql_text(amount)], |row| get_decimal(row, 0))
            .unwrap();

        assert_eq!(got, amount);
    }

    #[test]
    fn trailing_zeros_are_dropped() {
        assert_eq!(to_sql_text(Decimal::new(15000, 2)), "150");
    }

    #[test]
    fn malformed_text_is_a_conversion_error() {
        let conn = Connection::open_in_memory().unwrap();

        let result = conn.query_row("SELECT 'twelve'", [], |row| get_decimal(row, 0));

        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(0, _, _))
        ));
    }

    #[test]
    fn overflowing_arithmetic_is_an_error() {
        assert_eq!(checked_add(Decimal::MAX, Decimal::ONE), Err(Error::AmountOutOfRange));
        assert_eq!(checked_sub(Decimal::MIN, Decimal::ONE), Err(Error::AmountOutOfRange));
        assert_eq!(
            checked_sum([Decimal::MAX, Decimal::MAX]),
            Err(Error::AmountOutOfRange)
        );
        assert_eq!(
            checked_percentage(Decimal::MAX, Decimal::new(1, 2)),
            Err(Error::AmountOutOfRange)
        );
    }

    #[test]
    fn arithmetic_in_range_succeeds() {
        assert_eq!(checked_sum([Decimal::from(50), Decimal::from(100)]), Ok(Decimal::from(150)));
        assert_eq!(checked_sum([]), Ok(Decimal::ZERO));
        assert_eq!(
            checked_percentage(Decimal::from(1), Decimal::from(8)),
            Ok(Decimal::new(125, 1))
        );
        assert_eq!(checked_percentage(Decimal::from(5), Decimal::ZERO), Ok(Decimal::ZERO));
    }
}
