use sqlx::PgPool;

use crate::oracle::OracleClient;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub oracle: OracleClient,
}
