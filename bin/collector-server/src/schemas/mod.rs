//! Wire-format DTOs, separate from the persistence records in [`crate::db`].

pub mod message;
