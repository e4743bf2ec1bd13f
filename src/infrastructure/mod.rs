pub mod google;
pub mod open_meteo;
pub mod sqlite_repo;
