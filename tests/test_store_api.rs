use forkify::{FetchClient, FileStorage, Settings, Store, StoreError};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

fn settings(server: &Server, storage_path: &Path) -> Settings {
    Settings {
        api_url: format!("{}/api/v2/recipes/", server.url()),
        api_key: "test-key".to_string(),
        results_per_page: 10,
        storage_path: storage_path.to_path_buf(),
        ..Settings::default()
    }
}

fn open(settings: &Settings) -> Store {
    let client = FetchClient::http(Duration::from_secs(5)).unwrap();
    Store::new(
        settings,
        client,
        Box::new(FileStorage::new(&settings.storage_path)),
    )
}

fn recipe_body(id: &str) -> Value {
    json!({
        "status": "success",
        "data": { "recipe": {
            "id": id,
            "title": "Spicy Chicken and Pepper Jack Pizza",
            "publisher": "My Baking Addiction",
            "source_url": "http://www.mybakingaddiction.com/spicy-chicken-and-pepper-jack-pizza-recipe/",
            "image_url": "http://forkify-api.herokuapp.com/images/FlatBread21of1a180.jpg",
            "servings": 4,
            "cooking_time": 45,
            "ingredients": [
                { "quantity": 1, "unit": "", "description": "pizza dough" },
                { "quantity": 0.5, "unit": "cup", "description": "salsa" },
                { "quantity": null, "unit": "", "description": "fresh cilantro" }
            ]
        }}
    })
}

fn search_body(count: usize) -> Value {
    let recipes: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("5ed6604591c37cdc054bc{:03}", i),
                "title": format!("Pasta number {}", i),
                "publisher": "Closet Cooking",
                "image_url": "http://forkify-api.herokuapp.com/images/pasta.jpg"
            })
        })
        .collect();
    json!({ "status": "success", "results": count, "data": { "recipes": recipes } })
}

#[tokio::test]
async fn test_load_recipe_and_rescale() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let _m = server
        .mock("GET", "/api/v2/recipes/abc")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(recipe_body("abc").to_string())
        .create_async()
        .await;

    let store = open(&settings(&server, &dir.path().join("store.json")));
    store.load_recipe("abc").await.unwrap();

    let recipe = store.recipe().unwrap();
    assert_eq!(recipe.title, "Spicy Chicken and Pepper Jack Pizza");
    assert_eq!(recipe.cooking_time, 45);
    assert!(!recipe.bookmarked);
    assert!(store.current_search_results_page().is_empty());

    store.update_servings(8).unwrap();
    let recipe = store.recipe().unwrap();
    assert_eq!(recipe.ingredients[0].quantity, Some(2.0));
    assert_eq!(recipe.ingredients[1].quantity, Some(1.0));
    assert_eq!(recipe.ingredients[2].quantity, None);
}

#[tokio::test]
async fn test_search_pagination_23_results() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let _m = server
        .mock("GET", "/api/v2/recipes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "pasta".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body(23).to_string())
        .create_async()
        .await;

    let store = open(&settings(&server, &dir.path().join("store.json")));
    store.load_search_results("pasta").await.unwrap();

    let first = store.search_results_page(1);
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].title, "Pasta number 0");
    let pagination = store.pagination();
    assert_eq!((pagination.prev(), pagination.next()), (None, Some(2)));

    let third = store.search_results_page(3);
    assert_eq!(third.len(), 3);
    assert_eq!(third[2].title, "Pasta number 22");

    assert!(store.search_results_page(7).is_empty());
}

#[tokio::test]
async fn test_missing_recipe_surfaces_http_error() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let _m = server
        .mock("GET", "/api/v2/recipes/missing")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"fail","message":"Invalid _id: missing"}"#)
        .create_async()
        .await;

    let store = open(&settings(&server, &dir.path().join("store.json")));
    let err = store.load_recipe("missing").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid _id: missing (400)");
    assert!(store.recipe().is_none());
}

#[tokio::test]
async fn test_bookmarks_survive_restart() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let _m = server
        .mock("GET", "/api/v2/recipes/abc")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(recipe_body("abc").to_string())
        .expect(2)
        .create_async()
        .await;

    {
        let store = open(&settings(&server, &path));
        store.load_recipe("abc").await.unwrap();
        assert!(store.toggle_bookmark().unwrap());
    }

    let store = open(&settings(&server, &path));
    assert_eq!(store.bookmarks().len(), 1);
    assert_eq!(store.bookmarks()[0].id, "abc");

    store.load_recipe("abc").await.unwrap();
    assert!(store.recipe().unwrap().bookmarked);

    store.delete_bookmark("abc").unwrap();
    assert!(!store.recipe().unwrap().bookmarked);
    assert!(open(&settings(&server, &path)).bookmarks().is_empty());
}

#[tokio::test]
async fn test_upload_recipe_round_trip() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut body = recipe_body("new-id");
    body["data"]["recipe"]["key"] = json!("test-key");
    let m = server
        .mock("POST", "/api/v2/recipes")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "title": "Homemade Pizza",
            "cooking_time": 45,
            "servings": 4,
            "ingredients": [
                { "quantity": 1.0, "unit": "", "description": "pizza dough" },
                { "quantity": null, "unit": "", "description": "fresh cilantro" }
            ]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let store = open(&settings(&server, &dir.path().join("store.json")));
    let fields = vec![
        ("title".to_string(), "Homemade Pizza".to_string()),
        ("sourceUrl".to_string(), "https://example.com/pizza".to_string()),
        ("image".to_string(), "https://example.com/pizza.jpg".to_string()),
        ("publisher".to_string(), "Me".to_string()),
        ("cookingTime".to_string(), "45".to_string()),
        ("servings".to_string(), "4".to_string()),
        ("ingredient-1".to_string(), "1,,pizza dough".to_string()),
        ("ingredient-2".to_string(), ",,fresh cilantro".to_string()),
        ("ingredient-3".to_string(), String::new()),
    ];

    let recipe = store.upload_recipe(&fields).await.unwrap();

    m.assert_async().await;
    assert_eq!(recipe.id, "new-id");
    assert_eq!(recipe.key.as_deref(), Some("test-key"));
    assert!(store.recipe().unwrap().bookmarked);
    assert_eq!(store.bookmarks().len(), 1);
}

#[tokio::test]
async fn test_upload_validation_error_sends_nothing() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let m = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let store = open(&settings(&server, &dir.path().join("store.json")));
    let fields = [
        ("title", "Broken"),
        ("cookingTime", "10"),
        ("servings", "2"),
        ("ingredient-1", "2 eggs"),
    ];

    let err = store.upload_recipe(&fields).await.unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    m.assert_async().await;
}
