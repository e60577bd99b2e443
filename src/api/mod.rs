pub mod error;
pub mod health;
pub mod movies;
pub mod proxy;
pub mod response;

use crate::external::CatalogClient;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogClient,
}
