//! API endpoint handlers. Handlers stay thin and delegate to `pipeline`.

pub mod deals;
pub mod documents;
pub mod health;
