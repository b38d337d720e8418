pub mod application_controller;
pub mod auth_controller;
pub mod booking_controller;
pub mod car_controller;
pub mod user_controller;
