//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos. Las funciones `validate_*` se usan tanto
//! directamente como desde `#[validate(custom = "...")]`.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Caracteres permitidos en una matrícula: alfanuméricos, espacios y guiones
    pub static ref PLATE_NUMBER_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]*[A-Za-z0-9]$")
        .expect("plate number regex is valid");

    /// Teléfono con prefijo internacional opcional
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-]{7,20}$")
        .expect("phone regex is valid");
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Convertir una fecha de calendario (`YYYY-MM-DD`) o un instante RFC3339
/// a `DateTime<Utc>`. Una fecha sin hora se interpreta como 00:00 UTC.
pub fn parse_calendar_instant(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if let Ok(date) = validate_date(value) {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    validate_datetime(value).map_err(|_| {
        let mut error = ValidationError::new("calendar_instant");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD or RFC3339".to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE_REGEX.is_match(value) || !(7..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de matrícula: 5 a 10 caracteres alfanuméricos,
/// se admiten espacios y guiones como separadores
pub fn validate_plate_number(value: &str) -> Result<(), ValidationError> {
    let significant = value.chars().filter(|c| c.is_ascii_alphanumeric()).count();
    if !PLATE_NUMBER_REGEX.is_match(value) || !(5..=10).contains(&significant) {
        let mut error = ValidationError::new("plate_number");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Precio diario de un auto: positivo y con dos decimales como máximo
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(*value)?;
    if value.scale() > 2 {
        let mut error = ValidationError::new("price_scale");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}

/// Normalizar una matrícula para almacenarla (mayúsculas, sin espacios extremos)
pub fn normalize_plate_number(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-15").is_ok());
        assert!(validate_date("2024/01/15").is_err());
    }

    #[test]
    fn test_parse_calendar_instant() {
        let plain = parse_calendar_instant("2024-06-10").unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-06-10T00:00:00+00:00");

        let rfc = parse_calendar_instant("2024-06-10T15:30:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-06-10T13:30:00+00:00");

        assert!(parse_calendar_instant("10/06/2024").is_err());
        assert!(parse_calendar_instant("").is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Tesla").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+33 6 12 34 56 78").is_ok());
        assert!(validate_phone("0612345678").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("06-12-ab-56").is_err());
    }

    #[test]
    fn test_validate_plate_number() {
        assert!(validate_plate_number("AB-123-CD").is_ok());
        assert!(validate_plate_number("B 1234 XYZ").is_ok());
        assert!(validate_plate_number("A1").is_err());
        assert!(validate_plate_number("ABCDEFGHIJK").is_err());
        assert!(validate_plate_number("AB_123_CD").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(&Decimal::new(4550, 2)).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_err());
        assert!(validate_price(&Decimal::new(-100, 0)).is_err());
        assert!(validate_price(&Decimal::new(10001, 3)).is_err());
    }

    #[test]
    fn test_normalize_plate_number() {
        assert_eq!(normalize_plate_number("  ab-123-cd "), "AB-123-CD");
    }
}
