pub mod add;
pub mod history;
pub mod price;
pub mod setup;
pub mod summary;
pub mod tokens;
pub mod transfer;
pub mod ui;
pub mod watchlist;
