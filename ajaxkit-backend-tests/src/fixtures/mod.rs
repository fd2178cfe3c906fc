mod config;
mod errors;
mod get_json;
mod scenarios;
