//! Product payload reshaping.
//!
//! The backend stores product images as paths relative to the public asset
//! host. The browser needs absolute URLs, so each product object gains an
//! `image_url` next to its `image`.

use serde_json::{Map, Value};

/// Rewrite a product list or single-product payload in place.
///
/// Accepted shapes: `[product, ..]`, `{ "data": [product, ..], .. }`,
/// `{ "data": product }` and a bare product object.
pub fn attach_image_urls(payload: &mut Value, asset_base: &str) {
    match payload {
        Value::Array(items) => items.iter_mut().for_each(|item| attach_one(item, asset_base)),
        Value::Object(map) if map.contains_key("data") => {
            if let Some(data) = map.get_mut("data") {
                attach_image_urls(data, asset_base);
            }
        }
        Value::Object(_) => attach_one(payload, asset_base),
        _ => {}
    }
}

fn attach_one(item: &mut Value, asset_base: &str) {
    let Value::Object(product) = item else { return };
    let Some(image) = product.get("image").and_then(Value::as_str) else { return };
    let url = asset_url(asset_base, image);
    insert_url(product, url);
}

fn insert_url(product: &mut Map<String, Value>, url: String) {
    product.insert("image_url".to_owned(), Value::String(url));
}

pub fn asset_url(asset_base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        asset_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
