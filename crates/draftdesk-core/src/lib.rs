pub mod api;
pub mod catalog;
pub mod config;
pub mod creation;
pub mod error;
pub mod form;
pub mod history;
pub mod io;
pub mod paths;
pub mod project;
pub mod refine;
pub mod selection;
pub mod selector;
pub mod types;

pub use error::{DeskError, Result};
