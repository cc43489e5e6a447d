pub mod error;
pub mod http_client;
pub mod odds_fetch;
pub mod pipeline;
pub mod projection;
pub mod ratings_fetch;
pub mod reconcile;
pub mod table;
