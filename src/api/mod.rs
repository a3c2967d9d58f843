pub mod api_types;
mod client;

pub use client::{FieldApi, HttpFieldApi};
