//! Seed the catalog with starter products.

use rust_decimal::Decimal;

use creamline_core::NewProduct;
use creamline_store::datastore::DataService;

use super::{CommandError, connect};

fn starter_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Whole Milk 1l".to_string(),
            price: Decimal::new(129, 2),
            quantity: 120,
            category: "milk".to_string(),
            image_url: Some("/images/whole-milk-1l.jpg".to_string()),
        },
        NewProduct {
            name: "Butter 250g".to_string(),
            price: Decimal::new(349, 2),
            quantity: 60,
            category: "fresh".to_string(),
            image_url: Some("/images/butter-250g.jpg".to_string()),
        },
        NewProduct {
            name: "Quark 500g".to_string(),
            price: Decimal::new(279, 2),
            quantity: 45,
            category: "fresh".to_string(),
            image_url: Some("/images/quark-500g.jpg".to_string()),
        },
        NewProduct {
            name: "Kefir 1l".to_string(),
            price: Decimal::new(219, 2),
            quantity: 30,
            category: "cultured".to_string(),
            image_url: Some("/images/kefir-1l.jpg".to_string()),
        },
        NewProduct {
            name: "Aged Gouda 300g".to_string(),
            price: Decimal::new(699, 2),
            quantity: 25,
            category: "cheese".to_string(),
            image_url: Some("/images/aged-gouda-300g.jpg".to_string()),
        },
        NewProduct {
            name: "Skyr 450g".to_string(),
            price: Decimal::new(189, 2),
            quantity: 80,
            category: "cultured".to_string(),
            image_url: Some("/images/skyr-450g.jpg".to_string()),
        },
    ]
}

/// Insert the starter catalog.
pub async fn run() -> Result<(), CommandError> {
    let data = connect().await?;

    for new in starter_products() {
        let product = data.create_product(new).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "seeded product");
    }

    tracing::info!("Seeding complete");
    Ok(())
}
