use axum::{extract::State, response::Redirect};
use tracing::{info, warn};

use crate::middleware::session::{FlashLevel, Session};
use crate::router::AppState;

/// GET /test-redis -> ping the cache and report the outcome as a flash.
pub async fn test_redis(State(state): State<AppState>, session: Session) -> (Session, Redirect) {
    let session = match state.cache.ping().await {
        Ok(()) => {
            info!("Redis ping succeeded");
            session.flash(FlashLevel::Success, "Redis connection succeeded!")
        }
        Err(e) => {
            warn!(error = %e, "Redis ping failed");
            session.flash(FlashLevel::Danger, format!("Redis connection failed: {e}"))
        }
    };
    (session, Redirect::to("/"))
}

/// GET /test-mongodb -> list collections and report the outcome as a flash.
pub async fn test_mongodb(State(state): State<AppState>, session: Session) -> (Session, Redirect) {
    let session = match state.store.collection_names().await {
        Ok(names) => {
            info!(collections = names.len(), "MongoDB listing succeeded");
            session.flash(FlashLevel::Success, "MongoDB connection succeeded!")
        }
        Err(e) => {
            warn!(error = %e, "MongoDB listing failed");
            session.flash(FlashLevel::Danger, format!("MongoDB connection failed: {e}"))
        }
    };
    (session, Redirect::to("/"))
}
