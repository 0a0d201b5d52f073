pub mod analysis;
pub mod client;
pub mod config;
pub mod courses;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod resources;
pub mod routes;
pub mod search_client;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
