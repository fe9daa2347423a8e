use axum::Json;
use serde_json::{json, Value};

use crate::sticker::template;

pub async fn list_templates() -> Json<Value> {
    let templates: Vec<Value> = template::names()
        .into_iter()
        .map(|name| {
            let t = template::get(name).expect("registry name resolves");
            json!({
                "name": t.name,
                "width": t.width,
                "height": t.height,
                "qr_size": t.qr_size,
            })
        })
        .collect();
    Json(json!({ "templates": templates }))
}
