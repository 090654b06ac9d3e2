//! Product service.
//!
//! Images are stored through [`FileStorage`] before the database write.
//! When the write fails the fresh uploads are removed again; images dropped
//! by an update are only deleted once the update has committed.

use sqlx::PgPool;
use tracing::{info, warn};

use bozor_core::{ListFilter, ProductId};

use super::files::{FileStorage, MediaFolder, UploadedFile, discard_uploads, store_uploads};
use super::{TokenValidator, authorize};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::product::{
    CreateProductInput, Product, ProductFields, ProductSummary, UpdateProductInput,
};

/// Highest accepted discount.
const MAX_DISCOUNT_PERCENT: i16 = 100;

/// Product operations.
pub struct ProductService<'a, S> {
    products: ProductRepository<'a>,
    tokens: &'a dyn TokenValidator,
    storage: &'a S,
}

impl<'a, S: FileStorage> ProductService<'a, S> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator, storage: &'a S) -> Self {
        Self {
            products: ProductRepository::new(pool),
            tokens,
            storage,
        }
    }

    /// Create an unpublished product sold by the acting user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for
    /// invalid fields, `AppError::File` if an image is rejected.
    pub async fn create(
        &self,
        token: &str,
        input: CreateProductInput,
        images: &[UploadedFile],
    ) -> Result<ProductId> {
        let actor = authorize(self.tokens, token)?;
        input.name.ensure_present("name")?;
        check_amounts(
            input.price.is_sign_negative(),
            input.stock_quantity,
            input.discount_percent,
        )?;

        let uploaded = store_uploads(self.storage, MediaFolder::Products, images).await?;
        let fields = ProductFields::new(&input, actor.id, uploaded.clone());

        match self.products.create(&fields, &input.params, actor.id).await {
            Ok(id) => {
                info!(product_id = %id, user_id = %actor.id, images = uploaded.len(), "Product created");
                Ok(id)
            }
            Err(e) => {
                discard_uploads(self.storage, &uploaded).await;
                Err(e.into())
            }
        }
    }

    /// Apply `input` to a product, appending `images` after removals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist,
    /// `AppError::BadRequest` for invalid fields, `AppError::File` if an
    /// image is rejected.
    pub async fn update(
        &self,
        token: &str,
        id: ProductId,
        input: UpdateProductInput,
        images: &[UploadedFile],
    ) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        check_amounts(
            input.price.is_some_and(|price| price.is_sign_negative()),
            input.stock_quantity.unwrap_or(0),
            input.discount_percent.unwrap_or(0),
        )?;

        let uploaded = store_uploads(self.storage, MediaFolder::Products, images).await?;

        let removed = match self
            .products
            .update(id, &input, uploaded.clone(), actor.id)
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                discard_uploads(self.storage, &uploaded).await;
                return Err(e.into());
            }
        };

        for image in &removed {
            if let Err(e) = self.storage.delete(&image.path).await {
                warn!(product_id = %id, path = %image.path, error = %e, "Failed to delete removed image");
            }
        }

        info!(
            product_id = %id,
            user_id = %actor.id,
            added = uploaded.len(),
            removed = removed.len(),
            "Product updated"
        );
        Ok(())
    }

    /// Soft-delete a product. Its images stay on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn delete(&self, token: &str, id: ProductId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.products.delete(id, actor.id).await?;
        info!(product_id = %id, user_id = %actor.id, "Product deleted");
        Ok(())
    }

    /// A product with its param selections, plus seller fields when
    /// `detail` is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId, detail: bool) -> Result<Product> {
        self.products
            .get_by_id(id, detail)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<ProductSummary>> {
        Ok(self.products.list(filter).await?)
    }
}

fn check_amounts(negative_price: bool, stock: i64, discount: i16) -> Result<()> {
    if negative_price {
        return Err(AppError::bad_request("price must not be negative"));
    }
    if stock < 0 {
        return Err(AppError::bad_request("stock_quantity must not be negative"));
    }
    if !(0..=MAX_DISCOUNT_PERCENT).contains(&discount) {
        return Err(AppError::bad_request(
            "discount_percent must be between 0 and 100",
        ));
    }
    Ok(())
}
