//! Offline unit tests for aip-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use aip_core::{AppConfig, ColorEntry, Environment};
use aip_db::{DbError, PoolConfig, ProductRow};
use chrono::Utc;
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn row(colors: &str) -> ProductRow {
    ProductRow {
        product_id: 9,
        product_name: "Orbit Hoodie".to_string(),
        description: "Brushed fleece".to_string(),
        short_description: String::new(),
        price: Decimal::new(4500, 2),
        is_sale: false,
        sales_price: Decimal::ZERO,
        stock_quantity: 4,
        is_in_stock: true,
        low_stock_threshold: 5,
        size: "L".to_string(),
        images: vec!["https://cdn.example.com/orbit.png".to_string()],
        colors: colors.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        password_cost: 12,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        media_url: None,
        media_api_base: "https://api.cloudinary.com".to_string(),
        media_timeout_secs: 30,
        session_ttl_hours: 8,
        allow_sign_up: false,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn product_row_decodes_stored_colors() {
    let product = row(
        "{color_data{color_code:#000000,color_name:Black}},{color_data{color_code:#fff,color_name:White}}",
    )
    .into_product()
    .expect("valid colors");

    assert_eq!(
        product.colors,
        vec![
            ColorEntry::new("#000000", "Black"),
            ColorEntry::new("#fff", "White"),
        ]
    );
    assert_eq!(product.product_name, "Orbit Hoodie");
}

#[test]
fn product_row_with_empty_colors_has_none() {
    let product = row("").into_product().expect("empty colors");
    assert!(product.colors.is_empty());
}

#[test]
fn product_row_with_malformed_colors_reports_the_product() {
    let err = row("{color_data{color_code:#000000}}")
        .into_product()
        .unwrap_err();
    match err {
        DbError::ColorDecode { product_id, source } => {
            assert_eq!(product_id, 9);
            assert_eq!(source.index, 0);
        }
        other => panic!("expected ColorDecode, got {other:?}"),
    }
}
