pub mod handlers;
pub mod middleware;
pub mod movies;
pub mod proxy;
pub mod routes;
pub mod status;
pub mod video;

pub use routes::create_router;
