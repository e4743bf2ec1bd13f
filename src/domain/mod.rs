pub mod calendar;
pub mod keyword;
pub mod repository;
pub mod todo;
pub mod token;
pub mod weather;
