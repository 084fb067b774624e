pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod status;
pub mod triggers;
pub mod webhooks;

pub use routes::create_router;
