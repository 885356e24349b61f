pub mod balances;
pub mod summary;
pub mod ui;
