//! Cart commands.

use unishop_core::{Price, ProductId};
use unishop_storefront::cart::CartSnapshot;
use unishop_storefront::catalog::ProductCatalog;
use unishop_storefront::error::AppError;

use super::Context;

pub fn show(ctx: &Context) {
    print_snapshot(&ctx.cart.snapshot());
}

/// Add one unit of a catalog product.
pub async fn add(ctx: &mut Context, id: ProductId) -> Result<(), AppError> {
    let mut catalog = ProductCatalog::new();
    catalog.refresh(&ctx.api).await?;
    let product = catalog
        .find(id)
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

    ctx.cart.add_item(product.to_cart_item())?;
    println!("Added {} to your cart", product.name);
    show(ctx);
    Ok(())
}

pub fn set(ctx: &mut Context, id: ProductId, quantity: i64) -> Result<(), AppError> {
    if ctx.cart.get(id).is_none() {
        return Err(AppError::NotFound(format!("Cart line for product {id}")));
    }
    ctx.cart.set_quantity(id, quantity)?;
    show(ctx);
    Ok(())
}

pub fn remove(ctx: &mut Context, id: ProductId) -> Result<(), AppError> {
    ctx.cart.remove_item(id)?;
    show(ctx);
    Ok(())
}

pub fn clear(ctx: &mut Context) -> Result<(), AppError> {
    ctx.cart.clear()?;
    println!("Your cart is empty");
    Ok(())
}

/// Print cart lines followed by subtotal, delivery fee and total.
pub fn print_snapshot(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for item in &snapshot.items {
        println!(
            "{:>5}  {:<40}  x{:<2}  {}",
            item.id,
            item.name,
            item.quantity.get(),
            Price::store(item.line_total())
        );
    }
    println!();
    println!("Items:     {}", snapshot.item_count);
    println!("Subtotal:  {}", snapshot.subtotal_price());
    println!("Delivery:  {}", snapshot.delivery_fee_price());
    println!("Total:     {}", snapshot.total_price());
}
