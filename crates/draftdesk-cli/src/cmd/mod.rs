pub mod config;
pub mod critique;
pub mod generate;
pub mod plan;
pub mod project;
pub mod projects;
pub mod prompts;
pub mod refine;
pub mod select;
pub mod selection;
pub mod session;
pub mod settings;
pub mod supplementals;
