//! Business logic
//!
//! Services sit between the HTTP handlers and the `db` layer and return
//! [`ServiceResult`](crate::error::ServiceResult).

pub mod inventory;
pub mod product;
pub mod report;
pub mod report_worker;
pub mod transaction;
