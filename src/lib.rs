//! Core library for the bulletin-tools command line application.
//!
//! The library turns spreadsheet grade records into a normalized table. The
//! modules keep responsibilities narrow and composable: the workbook layout
//! lives in [`config`], spreadsheet adapters under [`io`], data
//! representations inside [`model`], the flattening of period sheets in
//! [`extract`], the per-date statistics in [`stats`], view aggregations in
//! [`views`], and the orchestration used by the CLI in [`pipeline`].

pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod stats;
pub mod views;

pub use config::Layout;
pub use error::{BulletinError, Result};
pub use stats::GradeTable;
