#![doc = "The `uptask` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence, authentication, the resource-scoping middleware chain"]
#![doc = "and the route configuration of the UpTask API. The binary (`main.rs`) wires them"]
#![doc = "into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
