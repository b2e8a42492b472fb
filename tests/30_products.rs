mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn products_require_a_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/products", "/products/filter?search=x"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {} not protected", path);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body, json!({ "status": "error", "message": "Unauthorized" }));
    }

    // Garbage tokens are rejected the same way
    let res = client
        .get(format!("{}/products", server.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn list_respects_page_size_and_metadata() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (token, _) = common::register_user(server).await?;

    let res = client
        .get(format!("{}/products", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    let data = body["data"].as_array().cloned().unwrap_or_default();
    let total = body["total"].as_i64().unwrap_or(-1);
    let pages = body["pages"].as_i64().unwrap_or(-1);

    assert_eq!(body["limit"], 40);
    assert_eq!(body["page"], 1);
    assert!(data.len() <= 40, "page larger than limit: {}", data.len());
    assert!(total >= data.len() as i64);
    // pages == ceil(total / 40), floored at 1 for an empty table
    assert_eq!(pages, std::cmp::max((total + 39) / 40, 1));

    // Each product carries only its own properties
    for product in &data {
        let id = product["id"].as_i64().expect("product id");
        let props = product["product_props"].as_array().expect("product_props array");
        for prop in props {
            assert_eq!(prop["product_id"].as_i64(), Some(id), "foreign property on product {}", id);
        }
    }

    Ok(())
}

#[tokio::test]
async fn page_beyond_last_is_empty_with_valid_metadata() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (token, _) = common::register_user(server).await?;

    let first = client
        .get(format!("{}/products", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let pages = first["pages"].as_i64().unwrap_or(1);
    let total = first["total"].as_i64().unwrap_or(0);

    let res = client
        .get(format!("{}/products?page={}", server.base_url, pages + 1))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "beyond-last page should not error");

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["page"].as_i64(), Some(pages + 1));
    assert_eq!(body["pages"].as_i64(), Some(pages));
    assert_eq!(body["total"].as_i64(), Some(total));

    Ok(())
}

#[tokio::test]
async fn extreme_and_malformed_page_values_are_handled() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (token, _) = common::register_user(server).await?;

    // The largest i64 page is just a beyond-last page, never a server error
    let res = client
        .get(format!("{}/products?page={}", server.base_url, i64::MAX))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "huge page number should not error");
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["limit"], 40);

    // A non-numeric page falls back to the first page, still in the JSON shape
    let res = client
        .get(format!("{}/products?page=abc", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "malformed page should fall back, not reject");
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["page"].as_i64(), Some(1));
    assert!(body["data"].is_array());

    Ok(())
}

#[tokio::test]
async fn filter_returns_matching_subset_with_props() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (token, _) = common::register_user(server).await?;

    // Empty search matches every product: compare against the listing total
    let listing = client
        .get(format!("{}/products", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let total = listing["total"].as_i64().unwrap_or(0);

    let res = client
        .get(format!("{}/products/filter?search=", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let all = res.json::<serde_json::Value>().await?;
    let all = all.as_array().expect("filter returns a bare array");
    assert_eq!(all.len() as i64, total, "empty search should match everything");

    // Substring search: every hit contains the needle case-insensitively,
    // and no product matching the needle is missing from the result
    let needle = "duct";
    let res = client
        .get(format!("{}/products/filter?search={}", server.base_url, needle))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let hits = res.json::<serde_json::Value>().await?;
    let hits = hits.as_array().expect("filter returns a bare array");

    for product in hits {
        let name = product["name"].as_str().unwrap_or_default();
        assert!(
            name.to_lowercase().contains(needle),
            "'{}' does not contain '{}'",
            name,
            needle
        );
        let id = product["id"].as_i64().expect("product id");
        for prop in product["product_props"].as_array().expect("props") {
            assert_eq!(prop["product_id"].as_i64(), Some(id));
        }
    }

    let expected: Vec<&serde_json::Value> = all
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .map_or(false, |n| n.to_lowercase().contains(needle))
        })
        .collect();
    assert_eq!(hits.len(), expected.len(), "filter missed or over-matched products");

    Ok(())
}

#[tokio::test]
async fn filter_treats_wildcards_literally() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (token, _) = common::register_user(server).await?;

    // '%' must match only names that literally contain a percent sign,
    // not act as an ILIKE wildcard matching everything
    let res = client
        .get(format!("{}/products/filter?search=%25", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let hits = res.json::<serde_json::Value>().await?;
    for product in hits.as_array().expect("filter returns a bare array") {
        let name = product["name"].as_str().unwrap_or_default();
        assert!(name.contains('%'), "wildcard leaked into the pattern: matched '{}'", name);
    }

    Ok(())
}
