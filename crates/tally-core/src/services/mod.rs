//! Services shared by Tally clients

mod database;

pub use database::{DatabaseService, DeleteDisposition};
