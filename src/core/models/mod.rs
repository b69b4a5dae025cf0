pub mod appointment;
pub mod audit;
pub mod doctor;
pub mod user;
