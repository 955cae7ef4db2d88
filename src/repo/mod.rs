mod accounts;
mod requests;

pub use accounts::{Account, AccountCredentials, AccountRepo, InsertAccountError, NewAccount};
pub use requests::{DiscountRequest, InsertRequestError, NewRequest, RequestRepo};
