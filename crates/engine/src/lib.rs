//! Domain rules and persistence for the finance backend.
//!
//! Every public operation lives on [`Engine`] and takes the caller's username
//! (`owner`) as its last argument; rows belonging to other users are never
//! visible.

pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};

mod accounts;
mod categories;
mod descriptions;
mod error;
mod family_members;
mod medical_expenses;
mod ops;
mod parameters;
mod payments;
mod pending_transactions;
mod receipt_images;
mod transactions;
mod transfers;
mod users;
mod util;
mod validation_amounts;

type ResultEngine<T> = Result<T, EngineError>;
