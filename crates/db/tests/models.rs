//! Integration tests for the model layer against in-memory SQLite.

use db::models::{
    banner::{Banner, CreateBanner},
    category::{Category, CreateCategory},
    order::{CreateOrder, CreateOrderItem, Order, OrderListSpec, OrderSort},
    product::{CreateProduct, Product, ProductListSpec, ProductSort},
    user::{CreateUser, UpdateUser, User},
    ModelError,
};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn pool() -> SqlitePool {
    db::connect_in_memory().await.expect("in-memory pool")
}

async fn seed_banner(pool: &SqlitePool, label: &str) -> Banner {
    Banner::create(
        pool,
        &CreateBanner {
            label: label.to_string(),
            image: format!("https://img.example/{label}.png"),
        },
    )
    .await
    .expect("banner")
}

async fn seed_category(pool: &SqlitePool, title: &str, banner_ids: Vec<Uuid>) -> Uuid {
    Category::create(
        pool,
        &CreateCategory {
            title: title.to_string(),
            description: format!("{title} things"),
            banner_ids,
        },
    )
    .await
    .expect("category")
    .id
}

async fn seed_user(pool: &SqlitePool, email: &str) -> User {
    User::create(
        pool,
        &CreateUser {
            name: Some("Test User".to_string()),
            email: email.to_string(),
            phone: None,
        },
    )
    .await
    .expect("user")
}

fn product_input(title: &str, price: f64, category_ids: Vec<Uuid>) -> CreateProduct {
    CreateProduct {
        title: title.to_string(),
        description: None,
        images: vec![],
        keywords: vec![],
        metadata: serde_json::json!({}),
        price,
        discount: 0.0,
        stock: 10,
        is_featured: false,
        is_available: true,
        category_ids,
    }
}

#[tokio::test]
async fn category_round_trip() {
    let pool = pool().await;
    let banner = seed_banner(&pool, "summer").await;

    let created = Category::create(
        &pool,
        &CreateCategory {
            title: "Shoes".to_string(),
            description: "Footwear".to_string(),
            banner_ids: vec![banner.id],
        },
    )
    .await
    .expect("create");

    let read = Category::find_by_id_with_banners(&pool, created.id)
        .await
        .expect("read")
        .expect("present");

    assert_eq!(read.title, "Shoes");
    assert_eq!(read.description, "Footwear");
    assert_eq!(read.banners.len(), 1);
    assert_eq!(read.banners[0], banner);
}

#[tokio::test]
async fn category_update_replaces_banner_set() {
    let pool = pool().await;
    let first = seed_banner(&pool, "first").await;
    let second = seed_banner(&pool, "second").await;
    let third = seed_banner(&pool, "third").await;

    let id = seed_category(&pool, "Shoes", vec![first.id, second.id]).await;

    let updated = Category::update(
        &pool,
        id,
        &CreateCategory {
            title: "Shoes".to_string(),
            description: "Footwear".to_string(),
            banner_ids: vec![third.id],
        },
    )
    .await
    .expect("update");

    // The selection is replaced, not merged.
    let ids: Vec<Uuid> = updated.banners.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![third.id]);
}

#[tokio::test]
async fn banner_ordering_follows_selection_order() {
    let pool = pool().await;
    let a = seed_banner(&pool, "a").await;
    let b = seed_banner(&pool, "b").await;
    let id = seed_category(&pool, "Shoes", vec![b.id, a.id]).await;

    let read = Category::find_by_id_with_banners(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<Uuid> = read.banners.iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn referenced_category_delete_conflicts_and_row_survives() {
    let pool = pool().await;
    let banner = seed_banner(&pool, "banner").await;
    let category_id = seed_category(&pool, "Shoes", vec![banner.id]).await;
    Product::create(&pool, &product_input("Sneaker", 59.0, vec![category_id]))
        .await
        .expect("product");

    let err = Category::delete(&pool, category_id)
        .await
        .expect_err("delete must fail");
    assert!(matches!(err, ModelError::Referenced { entity: "category", .. }));

    // Still present on re-read.
    assert!(Category::find_by_id_with_banners(&pool, category_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn referenced_banner_delete_conflicts() {
    let pool = pool().await;
    let banner = seed_banner(&pool, "banner").await;
    seed_category(&pool, "Shoes", vec![banner.id]).await;

    let err = Banner::delete(&pool, banner.id).await.expect_err("conflict");
    assert!(matches!(err, ModelError::Referenced { entity: "banner", .. }));
}

#[tokio::test]
async fn unreferenced_category_delete_returns_entity() {
    let pool = pool().await;
    let id = seed_category(&pool, "Empty", vec![]).await;

    let deleted = Category::delete(&pool, id).await.expect("delete");
    assert_eq!(deleted.id, id);
    assert!(Category::find_by_id_with_banners(&pool, id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn missing_category_delete_is_not_found() {
    let pool = pool().await;
    let err = Category::delete(&pool, Uuid::new_v4())
        .await
        .expect_err("not found");
    assert!(matches!(err, ModelError::NotFound { entity: "category" }));
}

#[tokio::test]
async fn product_round_trip_preserves_json_columns() {
    let pool = pool().await;
    let category_id = seed_category(&pool, "Gadgets", vec![]).await;

    let mut input = product_input("Widget", 19.99, vec![category_id]);
    input.images = vec!["https://img.example/widget.png".to_string()];
    input.keywords = vec!["gadget".to_string(), "widget".to_string()];
    input.metadata = serde_json::json!({ "color": "red" });

    let created = Product::create(&pool, &input).await.expect("create");
    let read = Product::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("present");

    assert_eq!(read.title, "Widget");
    assert_eq!(read.price, 19.99);
    assert_eq!(read.images, input.images);
    assert_eq!(read.keywords, input.keywords);
    assert_eq!(read.metadata, input.metadata);
    assert_eq!(read, created.product);
}

#[tokio::test]
async fn product_list_filters_by_availability_and_category() {
    let pool = pool().await;
    let shoes = seed_category(&pool, "Running Shoes", vec![]).await;
    let hats = seed_category(&pool, "Hats", vec![]).await;

    Product::create(&pool, &product_input("Sneaker", 59.0, vec![shoes]))
        .await
        .unwrap();
    let mut hidden = product_input("Old Sneaker", 10.0, vec![shoes]);
    hidden.is_available = false;
    Product::create(&pool, &hidden).await.unwrap();
    Product::create(&pool, &product_input("Cap", 12.0, vec![hats]))
        .await
        .unwrap();

    // Case-insensitive substring on category title.
    let spec = ProductListSpec {
        is_available: Some(true),
        category: Some("shoe".to_string()),
        ..Default::default()
    };
    let listed = Product::find_many(&pool, &spec).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Sneaker");

    // No availability predicate: both shoe products appear.
    let spec = ProductListSpec {
        category: Some("SHOE".to_string()),
        ..Default::default()
    };
    assert_eq!(Product::find_many(&pool, &spec).await.unwrap().len(), 2);
}

#[tokio::test]
async fn product_list_sorts_by_price() {
    let pool = pool().await;
    let category = seed_category(&pool, "Stuff", vec![]).await;
    for (title, price) in [("Cheap", 5.0), ("Mid", 20.0), ("Dear", 100.0)] {
        Product::create(&pool, &product_input(title, price, vec![category]))
            .await
            .unwrap();
    }

    let spec = ProductListSpec {
        sort: ProductSort::MostExpensive,
        ..Default::default()
    };
    let titles: Vec<String> = Product::find_many(&pool, &spec)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title.clone())
        .collect();
    assert_eq!(titles, vec!["Dear", "Mid", "Cheap"]);

    let spec = ProductListSpec {
        sort: ProductSort::LeastExpensive,
        ..Default::default()
    };
    let titles: Vec<String> = Product::find_many(&pool, &spec)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title.clone())
        .collect();
    assert_eq!(titles, vec!["Cheap", "Mid", "Dear"]);
}

#[tokio::test]
async fn order_create_derives_payable_from_discounted_prices() {
    let pool = pool().await;
    let category = seed_category(&pool, "Stuff", vec![]).await;
    let mut input = product_input("Widget", 25.0, vec![category]);
    input.discount = 5.0;
    let product = Product::create(&pool, &input).await.unwrap();
    let user = seed_user(&pool, "buyer@example.com").await;

    let order = Order::create(
        &pool,
        &CreateOrder {
            user_id: user.id,
            items: vec![CreateOrderItem { product_id: product.id, count: 3 }],
        },
    )
    .await
    .expect("order");

    assert_eq!(order.payable, 60.0);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price, 20.0);
    assert_eq!(order.number, 1);

    let next = Order::create(
        &pool,
        &CreateOrder {
            user_id: user.id,
            items: vec![CreateOrderItem { product_id: product.id, count: 1 }],
        },
    )
    .await
    .unwrap();
    assert_eq!(next.number, 2);
}

async fn seed_orders_with_payables(pool: &SqlitePool, payables: &[f64]) -> Uuid {
    let category = seed_category(pool, "Stuff", vec![]).await;
    let user = seed_user(pool, "orders@example.com").await;
    for (i, payable) in payables.iter().enumerate() {
        let product = Product::create(pool, &product_input(&format!("P{i}"), *payable, vec![category]))
            .await
            .unwrap();
        Order::create(
            pool,
            &CreateOrder {
                user_id: user.id,
                items: vec![CreateOrderItem { product_id: product.id, count: 1 }],
            },
        )
        .await
        .unwrap();
    }
    user.id
}

#[tokio::test]
async fn order_list_second_page_of_lowest_payable() {
    let pool = pool().await;
    // 15 orders with payables 1.0 ..= 15.0.
    let payables: Vec<f64> = (1..=15).map(f64::from).collect();
    seed_orders_with_payables(&pool, &payables).await;

    let spec = OrderListSpec {
        sort: OrderSort::LowestPayable,
        page: 2,
        ..Default::default()
    };
    assert_eq!(spec.offset(), 12);

    let orders = Order::find_many(&pool, &spec).await.unwrap();
    let payables: Vec<f64> = orders.iter().map(|o| o.payable).collect();
    // Window skips the first 12 ascending payables.
    assert_eq!(payables, vec![13.0, 14.0, 15.0]);
}

#[tokio::test]
async fn order_list_one_sided_payable_bound() {
    let pool = pool().await;
    seed_orders_with_payables(&pool, &[50.0, 100.0, 150.0]).await;

    let spec = OrderListSpec {
        min_payable: Some(100.0),
        sort: OrderSort::LowestPayable,
        ..Default::default()
    };
    let orders = Order::find_many(&pool, &spec).await.unwrap();
    let payables: Vec<f64> = orders.iter().map(|o| o.payable).collect();
    // Nothing above the bound is excluded; the bound itself matches.
    assert_eq!(payables, vec![100.0, 150.0]);
}

#[tokio::test]
async fn order_list_filters_by_user_and_paid_state() {
    let pool = pool().await;
    let user_id = seed_orders_with_payables(&pool, &[10.0, 20.0]).await;
    let other = seed_user(&pool, "other@example.com").await;

    let spec = OrderListSpec { user_id: Some(user_id), ..Default::default() };
    assert_eq!(Order::find_many(&pool, &spec).await.unwrap().len(), 2);

    let spec = OrderListSpec { user_id: Some(other.id), ..Default::default() };
    assert!(Order::find_many(&pool, &spec).await.unwrap().is_empty());

    // Tri-state: no predicate vs. explicit false vs. explicit true.
    let all = Order::find_many(&pool, &OrderListSpec::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    Order::set_paid(&pool, all[0].id, true).await.unwrap();

    let spec = OrderListSpec { is_paid: Some(true), ..Default::default() };
    assert_eq!(Order::find_many(&pool, &spec).await.unwrap().len(), 1);
    let spec = OrderListSpec { is_paid: Some(false), ..Default::default() };
    assert_eq!(Order::find_many(&pool, &spec).await.unwrap().len(), 1);
}

#[tokio::test]
async fn order_list_filters_by_category_title_substring() {
    let pool = pool().await;
    let shoes = seed_category(&pool, "Running Shoes", vec![]).await;
    let hats = seed_category(&pool, "Hats", vec![]).await;
    let user = seed_user(&pool, "mixed@example.com").await;

    let sneaker = Product::create(&pool, &product_input("Sneaker", 59.0, vec![shoes]))
        .await
        .unwrap();
    let cap = Product::create(&pool, &product_input("Cap", 12.0, vec![hats]))
        .await
        .unwrap();

    for product in [&sneaker, &cap] {
        Order::create(
            &pool,
            &CreateOrder {
                user_id: user.id,
                items: vec![CreateOrderItem { product_id: product.id, count: 1 }],
            },
        )
        .await
        .unwrap();
    }

    let spec = OrderListSpec { category: Some("shoe".to_string()), ..Default::default() };
    let orders = Order::find_many(&pool, &spec).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payable, 59.0);
}

#[tokio::test]
async fn user_update_and_guarded_delete() {
    let pool = pool().await;
    let user = seed_user(&pool, "person@example.com").await;

    let updated = User::update(
        &pool,
        user.id,
        &UpdateUser {
            name: Some("Renamed".to_string()),
            email: "person@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            is_banned: true,
        },
    )
    .await
    .expect("update");
    assert!(updated.is_banned);
    assert_eq!(updated.name.as_deref(), Some("Renamed"));

    // A user without orders can be deleted.
    User::delete(&pool, user.id).await.expect("delete");

    // A user with orders cannot.
    let user_id = seed_orders_with_payables(&pool, &[10.0]).await;
    let err = User::delete(&pool, user_id).await.expect_err("conflict");
    assert!(matches!(err, ModelError::Referenced { entity: "user", .. }));
}
