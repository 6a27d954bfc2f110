use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::common::{TestApp, TestResponse, routes};

mod review_creation {
    use super::*;

    #[tokio::test]
    async fn create_returns_stored_document_with_id() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::REVIEWS,
                &json!({
                    "product_id": 1,
                    "customer_id": 1,
                    "rating": 5,
                    "comment": "Great product!"
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["product_id"], 1);
        assert_eq!(res.body["customer_id"], 1);
        assert_eq!(res.body["rating"], 5);
        assert_eq!(res.body["comment"], "Great product!");
        assert!(res.body["created_at"].is_string());
        assert!(res.body.get("updated_at").is_none());
        assert!(res.body.get("customer_name").is_none());
        assert!(ObjectId::parse_str(res.id()).is_ok());
    }

    #[tokio::test]
    async fn missing_fields_are_stored_as_null() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::REVIEWS, &json!({ "rating": 3 })).await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["rating"], 3);
        assert!(res.body["product_id"].is_null());
        assert!(res.body["customer_id"].is_null());
        assert!(res.body["comment"].is_null());
    }

    #[tokio::test]
    async fn unknown_fields_are_not_stored() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::REVIEWS,
                &json!({ "product_id": 1, "created_at": "1999-01-01", "verified": true }),
            )
            .await;
        assert_eq!(res.status, 201);
        assert_ne!(res.body["created_at"], "1999-01-01");

        let fetched = app.get(&routes::review(&res.id())).await;
        assert!(fetched.body.get("verified").is_none());
    }

    #[tokio::test]
    async fn create_without_body_stores_all_fields_as_null() {
        let app = TestApp::spawn().await;

        let res = app.post_empty(routes::REVIEWS).await;

        assert_eq!(res.status, 201, "{}", res.text);
        for field in ["product_id", "customer_id", "rating", "comment"] {
            assert!(res.body[field].is_null(), "{field} should be null");
        }
        assert!(res.body["created_at"].is_string());

        let fetched = app.get(&routes::review(&res.id())).await;
        assert_eq!(fetched.status, 200);
        assert!(fetched.body["rating"].is_null());
    }

    #[tokio::test]
    async fn create_with_malformed_json_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::REVIEWS))
            .header("Content-Type", "application/json")
            .body("{not json")
            .send()
            .await
            .expect("Failed to send POST request");
        let res = TestResponse::from_response(res).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::REVIEWS, &json!([1, 2, 3])).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn created_review_can_be_fetched_unchanged() {
        let app = TestApp::spawn().await;

        let created = app
            .post(
                routes::REVIEWS,
                &json!({
                    "product_id": 7,
                    "customer_id": 2,
                    "rating": 4,
                    "comment": "Solid"
                }),
            )
            .await;
        let fetched = app.get(&routes::review(&created.id())).await;

        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body, created.body);
    }
}

mod review_listing {
    use super::*;

    #[tokio::test]
    async fn list_empty_collection() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::REVIEWS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }

    #[tokio::test]
    async fn list_returns_all_reviews_with_customer_names() {
        let app = TestApp::spawn().await;
        let first = app.create_review(1, 1, 5).await;
        let second = app.create_review(2, 2, 4).await;

        let res = app.get(routes::REVIEWS).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["_id"], first);
        assert_eq!(items[0]["customer_name"], "Ada Lovelace");
        assert_eq!(items[1]["_id"], second);
        assert_eq!(items[1]["customer_name"], "Grace Hopper");
    }

    #[tokio::test]
    async fn unknown_customer_gets_placeholder_name() {
        let app = TestApp::spawn().await;
        app.create_review(1, 999, 2).await;
        app.post(routes::REVIEWS, &json!({ "product_id": 1 })).await;

        let res = app.get(routes::REVIEWS).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        for item in items {
            assert_eq!(item["customer_name"], "Unknown Customer");
        }
    }

    #[tokio::test]
    async fn filter_by_product_id_is_exact() {
        let app = TestApp::spawn().await;
        let a = app.create_review(1, 1, 5).await;
        app.create_review(2, 1, 3).await;
        let c = app.create_review(1, 2, 1).await;
        app.create_review(11, 2, 1).await;

        let res = app.get(&routes::reviews_for_product("1")).await;

        assert_eq!(res.status, 200);
        let ids: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![a.as_str(), c.as_str()]);
    }

    #[tokio::test]
    async fn filter_matches_numbers_regardless_of_storage_width() {
        let app = TestApp::spawn().await;
        app.insert_document(doc! { "product_id": 5_i32, "customer_id": 1_i32 })
            .await;
        app.insert_document(doc! { "product_id": 5.0_f64, "customer_id": 2_i32 })
            .await;
        app.insert_document(doc! { "product_id": "5", "customer_id": 1_i32 })
            .await;

        let res = app.get(&routes::reviews_for_product("5")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn filter_with_no_matches_returns_empty_list() {
        let app = TestApp::spawn().await;
        app.create_review(1, 1, 5).await;

        let res = app.get(&routes::reviews_for_product("42")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }

    #[tokio::test]
    async fn empty_product_id_means_no_filter() {
        let app = TestApp::spawn().await;
        app.create_review(1, 1, 5).await;
        app.create_review(2, 1, 5).await;

        let res = app.get(&routes::reviews_for_product("")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn repeated_product_id_gets_structured_error() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?product_id=1&product_id=2", routes::REVIEWS))
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].is_string());
    }

    #[tokio::test]
    async fn non_integer_product_id_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::reviews_for_product("abc")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod review_retrieval {
    use super::*;

    #[tokio::test]
    async fn get_missing_review_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::review(&ObjectId::new().to_hex())).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let app = TestApp::spawn().await;

        let padded = format!("%20{}%20", ObjectId::new().to_hex());
        for id in ["not-an-id", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", padded.as_str()] {
            let res = app.get(&routes::review(id)).await;
            assert_eq!(res.status, 404, "id {id}: {}", res.text);
            assert_eq!(res.body["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn get_does_not_include_customer_name() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let res = app.get(&routes::review(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["_id"], id);
        assert!(res.body.get("customer_name").is_none());
    }
}

mod review_update {
    use super::*;

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;
        let before = app.get(&routes::review(&id)).await;

        let res = app
            .put(&routes::review(&id), &json!({ "rating": 2 }))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["_id"], id);
        assert_eq!(res.body["rating"], 2);
        assert_eq!(res.body["product_id"], before.body["product_id"]);
        assert_eq!(res.body["customer_id"], before.body["customer_id"]);
        assert_eq!(res.body["comment"], before.body["comment"]);
        assert_eq!(res.body["created_at"], before.body["created_at"]);
        assert!(res.body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn update_ignores_non_whitelisted_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;
        let before = app.get(&routes::review(&id)).await;

        let res = app
            .put(
                &routes::review(&id),
                &json!({
                    "comment": "Changed my mind",
                    "created_at": "1999-01-01",
                    "_id": "ffffffffffffffffffffffff",
                    "verified": true
                }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["comment"], "Changed my mind");
        assert_eq!(res.body["_id"], id);
        assert_eq!(res.body["created_at"], before.body["created_at"]);
        assert!(res.body.get("verified").is_none());
    }

    #[tokio::test]
    async fn update_can_set_field_to_null() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let res = app
            .put(&routes::review(&id), &json!({ "comment": null }))
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["comment"].is_null());
        assert_eq!(res.body["rating"], 5);
    }

    #[tokio::test]
    async fn empty_update_refreshes_updated_at() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let first = app.put(&routes::review(&id), &json!({})).await;
        assert_eq!(first.status, 200);
        let first_stamp = first.body["updated_at"].as_str().unwrap().to_string();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = app.put(&routes::review(&id), &json!({})).await;
        assert_eq!(second.status, 200);

        assert_ne!(second.body["updated_at"], first_stamp.as_str());
        assert_eq!(second.body["rating"], 5);
    }

    #[tokio::test]
    async fn update_is_visible_on_subsequent_get() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let updated = app
            .put(&routes::review(&id), &json!({ "product_id": 9, "customer_id": 2 }))
            .await;
        let fetched = app.get(&routes::review(&id)).await;

        assert_eq!(fetched.body, updated.body);
        assert_eq!(fetched.body["product_id"], 9);
        assert_eq!(fetched.body["customer_id"], 2);
    }

    #[tokio::test]
    async fn update_missing_review_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::review(&ObjectId::new().to_hex()), &json!({ "rating": 1 }))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn update_with_malformed_id_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::review("bogus"), &json!({ "rating": 1 }))
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn update_without_body_refreshes_updated_at() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let res = app.put_empty(&routes::review(&id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["rating"], 5);
        assert!(res.body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn update_with_malformed_body_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let res = app.put_raw(&routes::review(&id), "{not json").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod review_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_returns_no_content() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        let res = app.delete(&routes::review(&id)).await;

        assert_eq!(res.status, 204);
        assert!(res.text.is_empty());
    }

    #[tokio::test]
    async fn deleted_review_is_gone_everywhere() {
        let app = TestApp::spawn().await;
        let id = app.create_review(1, 1, 5).await;

        assert_eq!(app.delete(&routes::review(&id)).await.status, 204);

        assert_eq!(app.get(&routes::review(&id)).await.status, 404);
        assert_eq!(
            app.put(&routes::review(&id), &json!({ "rating": 1 }))
                .await
                .status,
            404
        );
        assert_eq!(app.delete(&routes::review(&id)).await.status, 404);

        let list = app.get(routes::REVIEWS).await;
        assert_eq!(list.body, json!([]));
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::review("12345")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
