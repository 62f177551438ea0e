pub mod database;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod store;
pub mod test_utils;
