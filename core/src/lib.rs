//! Shared domain logic for Daybook.
//!
//! Everything here is oracle-agnostic and storage-agnostic: the HTTP layer
//! feeds raw oracle output into [`intent`], then runs the resulting intent
//! through a command handler ([`tasks`] or [`budget`]) against whichever
//! [`store`] backend it was given.

pub mod auth;
pub mod budget;
pub mod dates;
pub mod error;
pub mod intent;
pub mod memory;
pub mod money;
pub mod outcome;
pub mod records;
pub mod store;
pub mod tasks;
