//! Root greeting

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// GET /
async fn hello() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(hello))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn says_hello() {
        let Json(body) = hello().await;
        assert_eq!(body, json!({ "hello": "world" }));
    }
}
