use std::sync::Arc;

use poem::{
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    EndpointExt, Route,
};
use poem_openapi::OpenApiService;
use r2d2::Pool as r2d2Pool;
use redis::Client;
use repository::profile::{PgProfileStore, ProfileStore};
use route::{auth::ApiAuth, profile::ApiProfile};
use settings::Config;
use sqlx::{Pool, Postgres};

pub mod cli;
pub mod core;
pub mod delta;
pub mod factory;
pub mod mapper;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod service;
pub mod settings;

pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis_conn: r2d2Pool<Client>,
    pub config: Config,
    pub profile_store: Arc<dyn ProfileStore>,
}

impl AppState {
    /// Wires the Postgres profile store onto `db`.
    pub fn new(db: Pool<Postgres>, redis_conn: r2d2Pool<Client>, config: Config) -> Self {
        let profile_store = Arc::new(PgProfileStore::new(db.clone()));
        Self {
            db,
            redis_conn,
            config,
            profile_store,
        }
    }
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route = OpenApiService::new((ApiAuth, ApiProfile), "Job Tracker Profile", "1.0")
        .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(Cors::new())
}
