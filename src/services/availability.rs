//! Disponibilidad de autos por rango de fechas
//!
//! Las fechas se comparan con granularidad de día (UTC): el inicio de un
//! rango se lleva a las 00:00:00.000 de su día y el fin a las 23:59:59.999.
//! Dos rangos cerrados `[a, b]` y `[c, d]` se solapan si `a <= d && b >= c`.
//!
//! Un auto está disponible para un rango si ninguna de sus reservas
//! bloqueantes (todas salvo las canceladas) se solapa con él.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{booking::Booking, car::Car};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::parse_calendar_instant;

/// Duración máxima de una reserva, en días
pub const MAX_RENTAL_DAYS: i64 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("La fecha de devolución ({end}) es anterior a la de recogida ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("La fecha de recogida ({pickup}) ya pasó")]
    PickupInPast { pickup: NaiveDate },

    #[error("Una reserva no puede superar {max} días (pedidos: {days})")]
    TooLong { days: i64, max: i64 },
}

/// Rango de fechas normalizado a días completos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant) + Duration::days(1) - Duration::milliseconds(1)
}

impl DateRange {
    /// Rango solicitado por un cliente; rechaza un fin anterior al inicio
    pub fn whole_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if end.date_naive() < start.date_naive() {
            return Err(RangeError::EndBeforeStart {
                start: start.date_naive(),
                end: end.date_naive(),
            });
        }
        Ok(Self {
            start: start_of_day(start),
            end: end_of_day(end),
        })
    }

    /// Rango ocupado por una reserva existente
    pub fn of_booking(booking: &Booking) -> Self {
        Self {
            start: start_of_day(booking.pickup_date),
            end: end_of_day(booking.return_date),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Días de alquiler, contando el día de recogida y el de devolución
    pub fn rental_days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }

    /// Un rango reservable empieza hoy o después y no supera `MAX_RENTAL_DAYS`
    pub fn ensure_bookable(&self, today: NaiveDate) -> Result<(), RangeError> {
        let pickup = self.start.date_naive();
        if pickup < today {
            return Err(RangeError::PickupInPast { pickup });
        }
        let days = self.rental_days();
        if days > MAX_RENTAL_DAYS {
            return Err(RangeError::TooLong {
                days,
                max: MAX_RENTAL_DAYS,
            });
        }
        Ok(())
    }
}

/// Parsear `start`/`end` de un query string. Ambos o ninguno.
pub fn parse_requested_range(start: Option<&str>, end: Option<&str>) -> AppResult<Option<DateRange>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let start = parse_calendar_instant(start)
                .map_err(|_| AppError::BadRequest(format!("Fecha de inicio inválida: '{}'", start)))?;
            let end = parse_calendar_instant(end)
                .map_err(|_| AppError::BadRequest(format!("Fecha de fin inválida: '{}'", end)))?;
            Ok(Some(DateRange::whole_days(start, end)?))
        }
        _ => Err(AppError::BadRequest(
            "Se requieren ambas fechas: start y end".to_string(),
        )),
    }
}

/// Filtrar los autos sin reservas bloqueantes que se solapen con `requested`.
///
/// Sin rango solicitado los autos se devuelven tal cual. El orden relativo
/// de los autos se conserva.
pub fn filter_available(cars: Vec<Car>, bookings: &[Booking], requested: Option<&DateRange>) -> Vec<Car> {
    let Some(requested) = requested else {
        return cars;
    };

    let blocked: HashSet<Uuid> = bookings
        .iter()
        .filter(|b| b.status.blocks_availability())
        .filter(|b| DateRange::of_booking(b).overlaps(requested))
        .map(|b| b.car_id)
        .collect();

    cars.into_iter().filter(|car| !blocked.contains(&car.id)).collect()
}

/// Comprobar un único auto contra sus reservas
pub fn is_car_available(car_id: Uuid, bookings: &[Booking], requested: &DateRange) -> bool {
    !bookings.iter().any(|b| {
        b.car_id == car_id
            && b.status.blocks_availability()
            && DateRange::of_booking(b).overlaps(requested)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{booking::BookingStatus, car::CarStatus};
    use rust_decimal::Decimal;

    fn at(value: &str) -> DateTime<Utc> {
        parse_calendar_instant(value).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::whole_days(at(start), at(end)).unwrap()
    }

    fn car(n: u128) -> Car {
        Car {
            id: Uuid::from_u128(n),
            owner_id: Uuid::from_u128(1000),
            name: format!("Car {}", n),
            price: Decimal::new(5000, 2),
            seats: 5,
            transmission: "Automatic".to_string(),
            fuel_type: "Petrol".to_string(),
            plate_number: format!("AB-{:03}-CD", n),
            rating: 4.5,
            image: None,
            status: CarStatus::Available,
            created_at: at("2024-01-01"),
            updated_at: at("2024-01-01"),
        }
    }

    fn booking(car: u128, pickup: &str, ret: &str, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            car_id: Uuid::from_u128(car),
            customer_id: Uuid::from_u128(2000),
            pickup_date: at(pickup),
            return_date: at(ret),
            total_price: Decimal::new(30000, 2),
            status,
            created_at: at("2024-01-01"),
            updated_at: at("2024-01-01"),
        }
    }

    fn ids(cars: &[Car]) -> Vec<Uuid> {
        cars.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_normalizes_to_whole_days() {
        let r = DateRange::whole_days(at("2024-06-12T15:45:10Z"), at("2024-06-13T08:00:00Z")).unwrap();
        assert_eq!(r.start().to_rfc3339(), "2024-06-12T00:00:00+00:00");
        assert_eq!(
            r.end().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-06-13T23:59:59.999Z"
        );
    }

    #[test]
    fn test_no_range_returns_cars_unchanged() {
        let cars = vec![car(2), car(1), car(3)];
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Confirmed)];
        assert_eq!(filter_available(cars.clone(), &bookings, None), cars);
    }

    #[test]
    fn test_cars_without_bookings_are_always_included() {
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Confirmed)];
        for (start, end) in [("2024-06-01", "2024-06-30"), ("2024-06-12", "2024-06-12"), ("2030-01-01", "2030-01-02")] {
            let result = filter_available(vec![car(1), car(2)], &bookings, Some(&range(start, end)));
            assert!(ids(&result).contains(&Uuid::from_u128(2)));
        }
    }

    #[test]
    fn test_concrete_scenario() {
        let cars = vec![car(1), car(2)];
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Confirmed)];

        let inside = filter_available(cars.clone(), &bookings, Some(&range("2024-06-12", "2024-06-13")));
        assert_eq!(ids(&inside), vec![Uuid::from_u128(2)]);

        let outside = filter_available(cars.clone(), &bookings, Some(&range("2024-06-20", "2024-06-22")));
        assert_eq!(outside, cars);
    }

    #[test]
    fn test_bookable_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();

        assert!(range("2024-06-12", "2024-06-12").ensure_bookable(today).is_ok());
        assert!(range("2024-06-20", "2024-09-17").ensure_bookable(today).is_ok());

        assert_eq!(
            range("2024-06-11", "2024-06-14").ensure_bookable(today),
            Err(RangeError::PickupInPast {
                pickup: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()
            })
        );
        assert_eq!(
            range("2024-06-20", "2024-09-18").ensure_bookable(today),
            Err(RangeError::TooLong { days: 91, max: MAX_RENTAL_DAYS })
        );
        assert!(matches!(
            range("2024-06-12", "9999-12-31").ensure_bookable(today),
            Err(RangeError::TooLong { .. })
        ));
    }

    #[test]
    fn test_request_starting_on_return_day_conflicts() {
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Confirmed)];
        let result = filter_available(vec![car(1)], &bookings, Some(&range("2024-06-15", "2024-06-16")));
        assert!(result.is_empty());

        let next_day = filter_available(vec![car(1)], &bookings, Some(&range("2024-06-16", "2024-06-17")));
        assert_eq!(next_day.len(), 1);
    }

    #[test]
    fn test_request_ending_on_pickup_day_conflicts() {
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Pending)];
        assert!(!is_car_available(Uuid::from_u128(1), &bookings, &range("2024-06-05", "2024-06-10")));
        assert!(is_car_available(Uuid::from_u128(1), &bookings, &range("2024-06-05", "2024-06-09")));
    }

    #[test]
    fn test_time_of_day_is_ignored() {
        let bookings = vec![booking(1, "2024-06-10T22:30:00Z", "2024-06-11T06:00:00Z", BookingStatus::Confirmed)];
        let requested = DateRange::whole_days(at("2024-06-09T09:00:00Z"), at("2024-06-10T01:00:00Z")).unwrap();
        assert!(!is_car_available(Uuid::from_u128(1), &bookings, &requested));
    }

    #[test]
    fn test_range_enclosing_booking_conflicts() {
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Completed)];
        let result = filter_available(vec![car(1)], &bookings, Some(&range("2024-06-01", "2024-06-30")));
        assert!(result.is_empty());
    }

    #[test]
    fn test_cancelled_bookings_do_not_block() {
        let bookings = vec![booking(1, "2024-06-10", "2024-06-15", BookingStatus::Cancelled)];
        let result = filter_available(vec![car(1)], &bookings, Some(&range("2024-06-12", "2024-06-13")));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_any_overlapping_booking_excludes_car() {
        let bookings = vec![
            booking(1, "2024-05-01", "2024-05-03", BookingStatus::Confirmed),
            booking(1, "2024-06-11", "2024-06-11", BookingStatus::Pending),
            booking(2, "2024-06-01", "2024-06-30", BookingStatus::Cancelled),
        ];
        let result = filter_available(vec![car(1), car(2)], &bookings, Some(&range("2024-06-10", "2024-06-12")));
        assert_eq!(ids(&result), vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_preserves_order() {
        let cars = vec![car(5), car(3), car(4), car(1)];
        let bookings = vec![booking(3, "2024-06-10", "2024-06-15", BookingStatus::Confirmed)];
        let result = filter_available(cars, &bookings, Some(&range("2024-06-10", "2024-06-10")));
        assert_eq!(
            ids(&result),
            vec![Uuid::from_u128(5), Uuid::from_u128(4), Uuid::from_u128(1)]
        );
    }

    #[test]
    fn test_idempotent() {
        let cars = vec![car(1), car(2), car(3)];
        let bookings = vec![
            booking(2, "2024-06-10", "2024-06-15", BookingStatus::Confirmed),
            booking(3, "2024-07-01", "2024-07-02", BookingStatus::Pending),
        ];
        let requested = range("2024-06-14", "2024-07-01");
        let first = filter_available(cars.clone(), &bookings, Some(&requested));
        let second = filter_available(cars, &bookings, Some(&requested));
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![Uuid::from_u128(1)]);
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = DateRange::whole_days(at("2024-06-15"), at("2024-06-10")).unwrap_err();
        assert!(matches!(err, RangeError::EndBeforeStart { .. }));

        assert!(DateRange::whole_days(at("2024-06-15T20:00:00Z"), at("2024-06-15T08:00:00Z")).is_ok());
    }

    #[test]
    fn test_rental_days() {
        assert_eq!(range("2024-06-10", "2024-06-10").rental_days(), 1);
        assert_eq!(range("2024-06-10", "2024-06-15").rental_days(), 6);
        assert_eq!(range("2024-02-28", "2024-03-01").rental_days(), 3);
    }

    #[test]
    fn test_parse_requested_range() {
        assert!(parse_requested_range(None, None).unwrap().is_none());
        assert!(parse_requested_range(Some("2024-06-10"), Some("2024-06-12")).unwrap().is_some());
        assert!(matches!(parse_requested_range(Some("2024-06-10"), None), Err(AppError::BadRequest(_))));
        assert!(matches!(
            parse_requested_range(Some("2024-06-12"), Some("2024-06-10")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_requested_range(Some("junio"), Some("2024-06-10")),
            Err(AppError::BadRequest(_))
        ));
    }
}
