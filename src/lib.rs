pub mod error;
pub mod auth {
    pub mod demo_auth;
    pub mod models;
    #[cfg(feature = "server")]
    pub mod provider;
}
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod repository;
}
pub mod documents;

#[cfg(feature = "server")]
pub mod api {
    pub mod documents;
    pub mod errors;
}
#[cfg(feature = "server")]
pub mod app;
#[cfg(feature = "server")]
pub mod config;
