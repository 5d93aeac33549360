// End-to-end: categories endpoint, per-category entry endpoints and the
// auth endpoint behind one mock server, consumed through `get_apis`.

#[cfg(test)]
mod test {

    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::Value;
    use tokio_stream::StreamExt;

    use crate::api::ApiClient;
    use crate::error::ApiError;
    use crate::paging::CategoryEntry;
    use crate::tests::common::{
        counting_route, drain, hits, json, mock_host, spawn_axum, test_config, StatusCode, AUTH_PATH,
        CATEGORIES_PATH, ENTRY_PATH,
    };

    async fn mock_categories(server: &MockServer, pages: &[Value]) {
        for (i, body) in pages.iter().enumerate() {
            let body = body.clone();
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(CATEGORIES_PATH)
                        .query_param("page", (i + 1).to_string());
                    then.status(200).json_body(body);
                })
                .await;
        }
    }

    async fn mock_entries(server: &MockServer, category: &str, pages: &[Value]) {
        for (i, body) in pages.iter().enumerate() {
            let body = body.clone();
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(ENTRY_PATH)
                        .query_param("category", category)
                        .query_param("page", (i + 1).to_string());
                    then.status(200).json_body(body);
                })
                .await;
        }
    }

    fn links(links: &[&str]) -> Value {
        let items: Vec<Value> = links.iter().map(|l| json!({ "Link": l })).collect();
        json!({ "categories": items })
    }

    fn empty() -> Value {
        json!({ "categories": [] })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn two_categories_two_pages_each() {
        let server = MockServer::start_async().await;
        mock_categories(&server, &[json!({ "categories": ["Animals", "Anime"] }), empty()]).await;
        mock_entries(&server, "Animals", &[links(&["a1"]), links(&["a2", "a3"]), empty()]).await;
        mock_entries(&server, "Anime", &[links(&["b1"]), links(&["b2"]), empty()]).await;

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let mut items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 5, "4 pages + sentinel");
        let sentinel = items.pop().unwrap();
        assert!(matches!(sentinel, Err(ApiError::NoMoreData)));

        let pages: Vec<Vec<CategoryEntry>> = items.into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(
            pages,
            vec![
                vec![CategoryEntry::new("Animals", "a1")],
                vec![CategoryEntry::new("Animals", "a2"), CategoryEntry::new("Animals", "a3")],
                vec![CategoryEntry::new("Anime", "b1")],
                vec![CategoryEntry::new("Anime", "b2")],
            ]
        );
    }

    #[tokio::test]
    async fn decode_error_in_second_category_aborts_after_first() {
        let server = MockServer::start_async().await;
        mock_categories(&server, &[json!({ "categories": ["Animals", "Anime", "Books"] }), empty()]).await;
        mock_entries(&server, "Animals", &[links(&["a1"]), links(&["a2"]), empty()]).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(ENTRY_PATH)
                    .query_param("category", "Anime")
                    .query_param("page", "1");
                then.status(200).json_body(json!({ "entries": "unexpected" }));
            })
            .await;
        let books = server
            .mock_async(|when, then| {
                when.method(GET).path(ENTRY_PATH).query_param("category", "Books");
                then.status(200).json_body(links(&["c1"]));
            })
            .await;

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 3, "2 pages + 1 fatal error, no sentinel");
        assert_eq!(items[0].as_ref().unwrap(), &vec![CategoryEntry::new("Animals", "a1")]);
        assert_eq!(items[1].as_ref().unwrap(), &vec![CategoryEntry::new("Animals", "a2")]);
        assert!(matches!(items[2], Err(ApiError::Decode(_))));
        assert_eq!(books.hits_async().await, 0, "remaining categories are skipped");
    }

    #[tokio::test]
    async fn broken_categories_page_is_single_fatal_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(CATEGORIES_PATH).query_param("page", "1");
                then.status(200).body("{\"categories\": [1, 2]}");
            })
            .await;

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn no_categories_yields_only_the_sentinel() {
        let server = MockServer::start_async().await;
        mock_categories(&server, &[empty()]).await;

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().is_err_and(|e| e.is_no_more_data()));
    }

    #[tokio::test]
    async fn category_with_no_entries_is_skipped_not_failed() {
        let server = MockServer::start_async().await;
        mock_categories(&server, &[json!({ "categories": ["Empty", "Animals"] }), empty()]).await;
        mock_entries(&server, "Empty", &[empty()]).await;
        mock_entries(&server, "Animals", &[links(&["a1"]), empty()]).await;

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &vec![CategoryEntry::new("Animals", "a1")]);
        assert!(matches!(items[1], Err(ApiError::NoMoreData)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn token_is_fetched_once_and_shared_by_every_paginator() {
        let server = MockServer::start_async().await;
        let auth = server
            .mock_async(|when, then| {
                when.method(GET).path(AUTH_PATH);
                then.status(200).json_body(json!({ "token": "shared" }));
            })
            .await;

        let bearer = "Bearer shared";
        let pages: [(&str, Option<&str>, &str, Value); 5] = [
            (CATEGORIES_PATH, None, "1", json!({ "categories": ["Animals", "Anime"] })),
            (CATEGORIES_PATH, None, "2", empty()),
            (ENTRY_PATH, Some("Animals"), "1", links(&["a1"])),
            (ENTRY_PATH, Some("Animals"), "2", empty()),
            (ENTRY_PATH, Some("Anime"), "1", empty()),
        ];
        for (path, category, page, body) in pages {
            server
                .mock_async(|when, then| {
                    let when = when
                        .method(GET)
                        .path(path)
                        .header("Authorization", bearer)
                        .query_param("page", page);
                    if let Some(category) = category {
                        when.query_param("category", category);
                    }
                    then.status(200).json_body(body);
                })
                .await;
        }

        let client = ApiClient::new(test_config(mock_host(&server))).unwrap();
        let items = drain(client.get_apis()).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &vec![CategoryEntry::new("Animals", "a1")]);
        assert!(items[1].as_ref().is_err_and(|e| e.is_sentinel()));
        assert_eq!(auth.hits_async().await, 1);
    }

    #[tokio::test]
    async fn slow_consumer_bounds_entry_fetches() {
        let (categories, _) = counting_route(CATEGORIES_PATH, |n| {
            let names: Vec<&str> = if n == 0 { vec!["Animals"] } else { vec![] };
            (StatusCode::OK, json!({ "categories": names }).to_string())
        });
        let (entries, entry_calls) = counting_route(ENTRY_PATH, |n| {
            (StatusCode::OK, json!({ "categories": [{ "Link": format!("a{n}") }] }).to_string())
        });
        let (handle, addr) = spawn_axum(categories.merge(entries)).await;

        let client = ApiClient::new(test_config(addr.to_string())).unwrap();
        let mut stream = client.get_apis();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, vec![CategoryEntry::new("Animals", "a0")]);
        tokio::time::sleep(Duration::from_millis(300)).await;

        // one consumed, one waiting in the outer slot, one in the page slot
        assert_eq!(hits(&entry_calls), 3);

        drop(stream);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits(&entry_calls), 3);

        handle.abort();
    }
}
