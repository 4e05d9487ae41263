use rust_decimal_macros::dec;
use storefront_api::{
    db::create_orm_conn,
    dto::products::{CreateProductRequest, GalleryImagePayload, ReplaceGalleryRequest, AddImagesRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::product_service,
    state::AppState,
};
use uuid::Uuid;

// Integration flow against a real database: create a product, exercise
// the slug/price rules, then run the primary-image and gallery-replace
// invariants end to end.
#[tokio::test]
async fn product_pricing_slug_and_image_sync_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };

    // Randomized title so repeated runs do not collide on the slug.
    let title = format!("Test Phone {}", Uuid::new_v4().simple());

    let created = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            title: title.clone(),
            description: Some("integration fixture".into()),
            price: Some(dec!(500)),
            discount: Some(dec!(10)),
            stock: Some(3),
            condition: None,
            is_active: Some(true),
            is_featured: None,
            brand_id: None,
            category_ids: vec![],
            tag_names: vec!["integration".into()],
            option_ids: vec![],
            cover_image: None,
            gallery: vec![],
        },
    )
    .await?;
    let product = created.data.unwrap();
    assert_eq!(product.final_price, Some(dec!(450.00)));
    assert!(product.slug.starts_with("test-phone"));

    // Same title again: distinct slug with a sequential suffix.
    let duplicate = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            title: title.clone(),
            description: None,
            price: Some(dec!(500)),
            discount: None,
            stock: None,
            condition: None,
            is_active: None,
            is_featured: None,
            brand_id: None,
            category_ids: vec![],
            tag_names: vec![],
            option_ids: vec![],
            cover_image: None,
            gallery: vec![],
        },
    )
    .await?;
    let duplicate = duplicate.data.unwrap();
    assert_eq!(duplicate.slug, format!("{}-1", product.slug));

    // Three images; B marked primary demotes the others and mirrors the cover.
    let added = product_service::add_images(
        &state,
        &admin,
        product.id,
        AddImagesRequest {
            images: vec![
                image_payload("https://cdn.example.com/img/a.webp", false),
                image_payload("https://cdn.example.com/img/b.webp", false),
                image_payload("https://cdn.example.com/img/c.webp", false),
            ],
            variant_id: None,
        },
    )
    .await?;
    let added = added.data.unwrap().items;
    assert_eq!(added.len(), 3);
    let image_b = added
        .iter()
        .find(|img| img.image_url.ends_with("/b.webp"))
        .unwrap()
        .clone();

    product_service::set_primary_image(&state, &admin, product.id, image_b.id).await?;
    let fetched = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert_eq!(fetched.cover_image.as_deref(), Some(image_b.image_url.as_str()));
    let primaries: Vec<_> = fetched.images.iter().filter(|img| img.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, image_b.id);

    // Re-setting the same primary is a no-op.
    product_service::set_primary_image(&state, &admin, product.id, image_b.id).await?;
    let fetched = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert_eq!(fetched.cover_image.as_deref(), Some(image_b.image_url.as_str()));
    assert_eq!(fetched.images.iter().filter(|img| img.is_primary).count(), 1);

    // Deleting the primary clears the cover; nothing is auto-promoted.
    product_service::delete_image(&state, &admin, product.id, image_b.id).await?;
    let fetched = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert_eq!(fetched.cover_image, None);
    assert_eq!(fetched.images.iter().filter(|img| img.is_primary).count(), 0);
    assert_eq!(fetched.images.len(), 2);

    // Wholesale replacement with two primary claims ends with exactly one.
    let replaced = product_service::replace_gallery(
        &state,
        &admin,
        product.id,
        ReplaceGalleryRequest {
            images: vec![
                image_payload("https://cdn.example.com/img/a.webp", true),
                image_payload("https://cdn.example.com/img/d.webp", true),
                image_payload("https://cdn.example.com/img/e.webp", false),
            ],
        },
    )
    .await?;
    let final_set = replaced.data.unwrap().items;
    assert_eq!(final_set.len(), 3);
    assert_eq!(final_set.iter().filter(|img| img.is_primary).count(), 1);
    assert!(final_set
        .iter()
        .find(|img| img.is_primary)
        .unwrap()
        .image_url
        .ends_with("/a.webp"));
    let fetched = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert!(fetched.cover_image.unwrap().ends_with("/a.webp"));

    Ok(())
}

// An invalid discount submitted together with images must persist
// nothing: no product row, no orphan image rows.
#[tokio::test]
async fn invalid_discount_persists_nothing() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };

    let title = format!("Broken Discount {}", Uuid::new_v4().simple());
    let result = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            title: title.clone(),
            description: None,
            price: Some(dec!(100)),
            discount: Some(dec!(150)),
            stock: None,
            condition: None,
            is_active: None,
            is_featured: None,
            brand_id: None,
            category_ids: vec![],
            tag_names: vec![],
            option_ids: vec![],
            cover_image: None,
            gallery: vec![image_payload("https://cdn.example.com/img/orphan.webp", true)],
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::Validation { ref field, .. }) if field == "discount"
    ));

    let leftovers: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE title = $1")
        .bind(&title)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(leftovers.0, 0);

    let orphans: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM product_images WHERE image_url = $1")
            .bind("https://cdn.example.com/img/orphan.webp")
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(orphans.0, 0);

    Ok(())
}

fn image_payload(url: &str, primary: bool) -> GalleryImagePayload {
    GalleryImagePayload {
        image_url: url.to_string(),
        alt_text: None,
        is_primary: primary,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(database_url).await?;
    Ok(AppState::new(pool, orm))
}
