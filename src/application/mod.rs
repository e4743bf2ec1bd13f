pub mod error;
pub mod google_service;
pub mod keyword_service;
pub mod todo_service;
pub mod weather_service;
