#![allow(dead_code)]

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const USERNAME: &str = "mor_2314";
pub const PASSWORD: &str = "83r5^_";
pub const TOKEN: &str = "fake-token";

/// Unknown id answered with `200` and an empty body.
pub const EMPTY_BODY_ID: u64 = 900;
/// Unknown id answered with `200` and a `null` body.
pub const NULL_BODY_ID: u64 = 901;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Healthy,
    ProductsDown,
    CategoriesDown,
    Garbage,
    InvalidProduct,
}

struct FakeState {
    mode: Mode,
    products: Vec<Value>,
}

/// In-process catalog service on an ephemeral port.
pub struct FakeCatalog {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeCatalog {
    pub async fn spawn(mode: Mode) -> Self {
        let mut products = products();
        if mode == Mode::InvalidProduct {
            products[0]["price"] = json!(-5.0);
        }
        let state = Arc::new(FakeState { mode, products });

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/categories", get(list_categories))
            .route("/products/:id", get(get_product))
            .route("/auth/login", post(login))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list_products(State(state): State<Arc<FakeState>>) -> Response {
    match state.mode {
        Mode::ProductsDown => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Mode::Garbage => (StatusCode::OK, "[{\"id\": 1, \"title\":").into_response(),
        _ => Json(state.products.clone()).into_response(),
    }
}

async fn list_categories(State(state): State<Arc<FakeState>>) -> Response {
    match state.mode {
        Mode::CategoriesDown => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => Json(categories()).into_response(),
    }
}

async fn get_product(State(state): State<Arc<FakeState>>, Path(id): Path<u64>) -> Response {
    if id == EMPTY_BODY_ID {
        return (StatusCode::OK, "").into_response();
    }
    if id == NULL_BODY_ID {
        return (StatusCode::OK, "null").into_response();
    }
    if state.mode == Mode::ProductsDown {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match state.products.iter().find(|p| p["id"] == json!(id)) {
        Some(product) => Json(product.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return (StatusCode::BAD_REQUEST, "username and password are not provided").into_response();
    }
    if username == USERNAME && password == PASSWORD {
        Json(json!({ "token": TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "username or password is incorrect").into_response()
    }
}

pub fn categories() -> Vec<&'static str> {
    vec!["electronics", "jewelery", "men's clothing", "women's clothing"]
}

pub fn products() -> Vec<Value> {
    vec![
        product(1, "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops", 109.95, "men's clothing", 3.9),
        product(2, "Mens Casual Premium Slim Fit T-Shirts", 22.3, "men's clothing", 4.1),
        product(3, "Mens Cotton Jacket", 55.99, "men's clothing", 4.7),
        product(5, "John Hardy Women's Legends Naga Bracelet", 695.0, "jewelery", 4.6),
        product(9, "WD 2TB Elements Portable External Hard Drive", 64.0, "electronics", 3.3),
        product(14, "Samsung 49-Inch CHG90 Curved Gaming Monitor", 999.99, "electronics", 2.2),
    ]
}

fn product(id: u64, title: &str, price: f64, category: &str, rate: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": price,
        "description": format!("Description of {title}"),
        "category": category,
        "image": format!("https://fakestoreapi.com/img/{id}.jpg"),
        "rating": { "rate": rate, "count": 120 },
    })
}
