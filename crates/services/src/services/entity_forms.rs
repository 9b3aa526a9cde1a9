//! Per-entity form schemas and session constructors.
//!
//! Field names match the camelCase keys of the API payloads, so a
//! validated form body can be posted as-is.

use db::models::banner::Banner;
use db::models::brand::Brand;
use db::models::category::CategoryWithBanners;
use db::models::product::ProductWithCategories;
use uuid::Uuid;

use super::form_session::{FieldKind, FieldSchema, FieldValue, FormSchema, FormSession};

pub fn banner_schema() -> FormSchema {
    FormSchema {
        collection: "banners",
        display_name: "Banner",
        list_path: "/banners",
        delete_hint: "Make sure you removed all categories using this banner first.",
        fields: vec![
            FieldSchema { name: "label", kind: FieldKind::Text { min_len: 1 }, required: true },
            FieldSchema { name: "image", kind: FieldKind::Text { min_len: 1 }, required: true },
        ],
    }
}

pub fn category_schema() -> FormSchema {
    FormSchema {
        collection: "categories",
        display_name: "Category",
        list_path: "/categories",
        delete_hint: "Make sure you removed all products using this category first.",
        fields: vec![
            FieldSchema { name: "title", kind: FieldKind::Text { min_len: 2 }, required: true },
            FieldSchema {
                name: "description",
                kind: FieldKind::Text { min_len: 1 },
                required: true,
            },
            FieldSchema { name: "bannerIds", kind: FieldKind::Relation, required: true },
        ],
    }
}

pub fn brand_schema() -> FormSchema {
    FormSchema {
        collection: "brands",
        display_name: "Brand",
        list_path: "/brands",
        delete_hint: "Make sure you removed all products using this brand first.",
        fields: vec![
            FieldSchema { name: "title", kind: FieldKind::Text { min_len: 2 }, required: true },
            FieldSchema {
                name: "description",
                kind: FieldKind::Text { min_len: 1 },
                required: false,
            },
            FieldSchema { name: "logo", kind: FieldKind::Text { min_len: 1 }, required: false },
        ],
    }
}

pub fn product_schema() -> FormSchema {
    FormSchema {
        collection: "products",
        display_name: "Product",
        list_path: "/products",
        delete_hint: "Make sure you removed all orders using this product first.",
        fields: vec![
            FieldSchema { name: "title", kind: FieldKind::Text { min_len: 2 }, required: true },
            FieldSchema {
                name: "description",
                kind: FieldKind::Text { min_len: 1 },
                required: false,
            },
            FieldSchema { name: "images", kind: FieldKind::List, required: false },
            FieldSchema { name: "keywords", kind: FieldKind::List, required: false },
            FieldSchema { name: "metadata", kind: FieldKind::Json, required: false },
            FieldSchema { name: "price", kind: FieldKind::Number { min: 1.0 }, required: true },
            FieldSchema { name: "discount", kind: FieldKind::Number { min: 0.0 }, required: false },
            FieldSchema { name: "stock", kind: FieldKind::Number { min: 0.0 }, required: false },
            FieldSchema { name: "isFeatured", kind: FieldKind::Flag, required: false },
            FieldSchema { name: "isAvailable", kind: FieldKind::Flag, required: false },
            FieldSchema { name: "categoryIds", kind: FieldKind::Relation, required: true },
        ],
    }
}

pub fn address_schema() -> FormSchema {
    FormSchema {
        collection: "addresses",
        display_name: "Address",
        list_path: "/addresses",
        delete_hint: "Make sure you removed all orders shipped to this address first.",
        fields: vec![
            FieldSchema { name: "address", kind: FieldKind::Text { min_len: 1 }, required: true },
            FieldSchema { name: "city", kind: FieldKind::Text { min_len: 1 }, required: true },
            FieldSchema {
                name: "postalCode",
                kind: FieldKind::Text { min_len: 1 },
                required: true,
            },
            FieldSchema { name: "country", kind: FieldKind::Text { min_len: 1 }, required: true },
            FieldSchema { name: "phone", kind: FieldKind::Text { min_len: 1 }, required: false },
        ],
    }
}

pub fn create_banner_form() -> FormSession {
    FormSession::create(banner_schema())
}

pub fn edit_banner_form(banner: &Banner) -> FormSession {
    FormSession::edit(
        banner_schema(),
        banner.id,
        vec![
            ("label", FieldValue::Text(banner.label.clone())),
            ("image", FieldValue::Text(banner.image.clone())),
        ],
    )
}

pub fn create_category_form() -> FormSession {
    FormSession::create(category_schema())
}

pub fn edit_category_form(category: &CategoryWithBanners) -> FormSession {
    FormSession::edit(
        category_schema(),
        category.id,
        vec![
            ("title", FieldValue::Text(category.title.clone())),
            ("description", FieldValue::Text(category.description.clone())),
            ("bannerIds", FieldValue::Relation(ids(category.banners.iter().map(|b| b.id)))),
        ],
    )
}

pub fn create_brand_form() -> FormSession {
    FormSession::create(brand_schema())
}

pub fn edit_brand_form(brand: &Brand) -> FormSession {
    FormSession::edit(
        brand_schema(),
        brand.id,
        vec![
            ("title", FieldValue::Text(brand.title.clone())),
            ("description", FieldValue::Text(brand.description.clone().unwrap_or_default())),
            ("logo", FieldValue::Text(brand.logo.clone().unwrap_or_default())),
        ],
    )
}

pub fn create_product_form() -> FormSession {
    FormSession::create(product_schema())
}

/// Seed a product edit form. Monetary values are rounded to cents and
/// the metadata object is rendered back to editable text.
pub fn edit_product_form(product: &ProductWithCategories) -> FormSession {
    let metadata = serde_json::to_string_pretty(&product.metadata)
        .unwrap_or_else(|_| "{}".to_string());
    FormSession::edit(
        product_schema(),
        product.id,
        vec![
            ("title", FieldValue::Text(product.title.clone())),
            ("description", FieldValue::Text(product.description.clone().unwrap_or_default())),
            ("images", FieldValue::List(product.images.clone())),
            ("keywords", FieldValue::List(product.keywords.clone())),
            ("metadata", FieldValue::Text(metadata)),
            ("price", FieldValue::Number(cents(product.price))),
            ("discount", FieldValue::Number(cents(product.discount))),
            ("stock", FieldValue::Number(product.stock as f64)),
            ("isFeatured", FieldValue::Flag(product.is_featured)),
            ("isAvailable", FieldValue::Flag(product.is_available)),
            (
                "categoryIds",
                FieldValue::Relation(ids(product.categories.iter().map(|c| c.id))),
            ),
        ],
    )
}

pub fn create_address_form() -> FormSession {
    FormSession::create(address_schema())
}

fn ids(iter: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    iter.collect()
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
