pub mod application_repository;
pub mod booking_repository;
pub mod car_repository;
pub mod user_repository;
