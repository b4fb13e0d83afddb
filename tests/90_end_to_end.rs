mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn register_login_publish_list_delete() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.register("a@x.com", "pw").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.login("a@x.com", "pw").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await?;
    let token = session["access_token"]
        .as_str()
        .context("missing access_token")?
        .to_string();

    let res = server
        .create_publication(&token, &common::publication("en", "Hello room"))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["user_email"], "a@x.com");
    let id = created["id"].as_str().context("missing id")?.to_string();

    let res = server.list_room(&token, "en").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let rows: Value = res.json().await?;
    assert!(common::ids(&rows).contains(&id));

    let res = server.delete_publication(&token, &id).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let rows: Value = server.list_room(&token, "en").await?.json().await?;
    assert!(!common::ids(&rows).contains(&id));
    Ok(())
}
