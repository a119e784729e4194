pub mod builder;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod parser;
pub mod render;
pub mod settings;
pub mod sources;
pub mod subconverter;
pub mod validate;

pub fn get_version() -> String {
    "0.2.1".to_string()
}
