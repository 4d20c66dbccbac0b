//! Catalog browsing.

use unishop_storefront::catalog::ProductCatalog;
use unishop_storefront::error::AppError;

use super::Context;

/// Print every product in the catalog.
pub async fn list(ctx: &Context) -> Result<(), AppError> {
    let mut catalog = ProductCatalog::new();
    let products = catalog.refresh(&ctx.api).await?;

    if products.is_empty() {
        println!("No products available");
        return Ok(());
    }

    for product in products {
        println!("{:>5}  {:<40}  {}", product.id, product.name, product.display_price());
    }
    Ok(())
}
