// WebSocket module - the session layer between connections and the engine
//
// - routes: axum router setup (WebSocket upgrade, health)
// - connection: per-connection read loop, outbound writer task, dispatch

mod connection;
mod routes;

pub use routes::create_router;
