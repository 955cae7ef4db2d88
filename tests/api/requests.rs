use reqwest::StatusCode;

use sqlx::PgPool;

use uuid::Uuid;

use crate::helpers::{SubmitRequestPayload, TestApp, TestStaff};

#[sqlx::test]
async fn submit_returns_created_for_valid_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CREATED, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!("12.345.678-5", body["rut"]);
    assert_eq!("Pending", body["status"]);
    assert!(body["accepted_at"].is_null());
    // Country prefix stripped from the stored phone
    assert_eq!("912345678", body["phone"]);

    let row = sqlx::query!("select rut, phone from requests")
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch inserted row");
    assert_eq!("12.345.678-5", row.rut);
    assert_eq!("912345678", row.phone);

    Ok(())
}

#[sqlx::test]
async fn submit_returns_bad_request_for_invalid_data(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let mut missing_rut = SubmitRequestPayload::valid("12.345.678-5");
    missing_rut.rut = None;

    let mut short_rut = SubmitRequestPayload::valid("12.345.678-5");
    short_rut.rut = Some("1-9".into());

    let mut bad_rut = SubmitRequestPayload::valid("12.345.678-5");
    bad_rut.rut = Some("12.345.67J-5".into());

    let mut bad_phone = SubmitRequestPayload::valid("12.345.678-5");
    bad_phone.phone = Some("221234567".into());

    let mut empty_name = SubmitRequestPayload::valid("12.345.678-5");
    empty_name.name = Some("   ".into());

    let mut empty_commune = SubmitRequestPayload::valid("12.345.678-5");
    empty_commune.commune = Some("".into());

    let test_cases = vec![
        ("missing rut", missing_rut),
        ("short rut", short_rut),
        ("rut with bad characters", bad_rut),
        ("landline phone", bad_phone),
        ("blank name", empty_name),
        ("empty commune", empty_commune),
    ];

    for (desc, payload) in test_cases {
        let res = app
            .request_submit(&payload)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "API did not fail when payload was {}",
            desc
        );
    }

    let count = sqlx::query!(r#"select count(*) as "count!" from requests"#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count rows");
    assert_eq!(0, count.count);

    Ok(())
}

#[sqlx::test]
async fn second_submission_with_same_rut_conflicts(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    // Same RUT, entered with surrounding spaces this time
    let res = app
        .request_submit(&SubmitRequestPayload::valid(" 12.345.678-5 "))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CONFLICT, res.status());

    let count = sqlx::query!(
        r#"select count(*) as "count!" from requests where rut=$1"#,
        "12.345.678-5"
    )
        .fetch_one(&pool)
        .await
        .expect("Failed to count rows");
    assert_eq!(1, count.count);

    Ok(())
}

#[sqlx::test]
async fn list_requires_authentication(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .request_list(None)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn seller_can_list_and_search(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seller = TestStaff::seller(&pool).await;

    app.request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");

    let res = app
        .request_list(Some(&seller.credentials()))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let listed: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(1, listed.as_array().expect("Expected an array").len());

    let res = app
        .request_search(Some(&seller.credentials()), "12.345.678-5")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let found: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(1, found.as_array().expect("Expected an array").len());

    // A RUT nobody filed yields an empty list, not an error
    let res = app
        .request_search(Some(&seller.credentials()), "11.111.111-1")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let found: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert!(found.as_array().expect("Expected an array").is_empty());

    Ok(())
}

#[sqlx::test]
async fn search_with_invalid_rut_is_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seller = TestStaff::seller(&pool).await;

    let res = app
        .request_search(Some(&seller.credentials()), "not-a-rut!")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn administrator_can_change_status(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let admin = TestStaff::admin(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");
    let submitted: serde_json::Value = res.json().await.expect("Failed to parse response body");
    let id: Uuid = submitted["id"]
        .as_str()
        .expect("Missing id")
        .parse()
        .expect("Invalid id");

    let res = app
        .request_change_status(Some(&admin.credentials()), id, "Accepted")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let accepted: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!("Accepted", accepted["status"]);
    assert!(!accepted["accepted_at"].is_null());

    // Moving to any non-accepted status clears the acceptance timestamp
    let res = app
        .request_change_status(Some(&admin.credentials()), id, "Rejected")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let rejected: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!("Rejected", rejected["status"]);
    assert!(rejected["accepted_at"].is_null());

    Ok(())
}

#[sqlx::test]
async fn seller_cannot_change_status(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seller = TestStaff::seller(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");
    let submitted: serde_json::Value = res.json().await.expect("Failed to parse response body");
    let id: Uuid = submitted["id"]
        .as_str()
        .expect("Missing id")
        .parse()
        .expect("Invalid id");

    let res = app
        .request_change_status(Some(&seller.credentials()), id, "Accepted")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let row = sqlx::query!("select status from requests where id=$1", id)
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch row");
    assert_eq!("Pending", row.status);

    Ok(())
}

#[sqlx::test]
async fn unknown_status_is_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let admin = TestStaff::admin(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");
    let submitted: serde_json::Value = res.json().await.expect("Failed to parse response body");
    let id: Uuid = submitted["id"]
        .as_str()
        .expect("Missing id")
        .parse()
        .expect("Invalid id");

    let res = app
        .request_change_status(Some(&admin.credentials()), id, "Cancelled")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn changing_status_of_missing_request_is_not_found(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let admin = TestStaff::admin(&pool).await;

    let res = app
        .request_change_status(Some(&admin.credentials()), Uuid::new_v4(), "Accepted")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}

#[sqlx::test]
async fn administrator_can_deduplicate(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let admin = TestStaff::admin(&pool).await;

    app.request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");
    app.request_submit(&SubmitRequestPayload::valid("11.111.111-1"))
        .await
        .expect("Failed to submit request");

    // Plant a legacy duplicate row behind the unique index's back
    sqlx::query("alter table requests drop constraint requests_rut_key")
        .execute(&pool)
        .await
        .expect("Failed to drop unique index");
    sqlx::query!(
        r#"insert into requests(rut, name, paternal_surname, maternal_surname, address, phone, commune, submitted_at)
           values ('12.345.678-5', 'Copia', 'Copia', 'Copia', 'x', '912345678', 'Valdivia', now() + interval '1 hour')"#
    )
    .execute(&pool)
    .await
    .expect("Failed to seed duplicate row");

    let res = app
        .request_deduplicate(Some(&admin.credentials()))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(1, body["removed"]);

    let count = sqlx::query!(r#"select count(*) as "count!" from requests"#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count rows");
    assert_eq!(2, count.count);

    // A second pass finds nothing left to remove
    let res = app
        .request_deduplicate(Some(&admin.credentials()))
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(0, body["removed"]);

    Ok(())
}

#[sqlx::test]
async fn seller_cannot_deduplicate_or_delete(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seller = TestStaff::seller(&pool).await;

    let res = app
        .request_deduplicate(Some(&seller.credentials()))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .request_delete(Some(&seller.credentials()), Uuid::new_v4())
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    Ok(())
}

#[sqlx::test]
async fn administrator_can_delete_a_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let admin = TestStaff::admin(&pool).await;

    let res = app
        .request_submit(&SubmitRequestPayload::valid("12.345.678-5"))
        .await
        .expect("Failed to submit request");
    let submitted: serde_json::Value = res.json().await.expect("Failed to parse response body");
    let id: Uuid = submitted["id"]
        .as_str()
        .expect("Missing id")
        .parse()
        .expect("Invalid id");

    let res = app
        .request_delete(Some(&admin.credentials()), id)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    let res = app
        .request_delete(Some(&admin.credentials()), id)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}
