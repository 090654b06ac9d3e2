//! Product domain types.
//!
//! Prices are `NUMERIC` in the database and [`Decimal`] in memory; they are
//! serialized as JSON numbers for the admin UI.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bozor_core::{CategoryId, LocalizedText, ParamId, ParamValueId, ProductId, UserId};

/// An image stored in a product's `images` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Position-independent id, unique within the product.
    pub id: i32,
    /// Public path under `/media`.
    pub path: String,
}

/// Values chosen for one param of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSelection {
    /// The param.
    pub param_id: ParamId,
    /// Chosen values of the param.
    pub value_ids: Vec<ParamValueId>,
}

/// A product as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    /// Product ID.
    pub id: ProductId,
    /// Name in the request language.
    pub name: Option<String>,
    /// Description in the request language.
    pub description: Option<String>,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units in stock.
    pub stock_quantity: i64,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Category name in the request language.
    pub category_name: Option<String>,
    /// Discount in percent.
    pub discount_percent: i16,
    /// Images.
    pub images: Vec<ProductImage>,
    /// Average rating.
    pub rating_avg: Option<f32>,
    /// Whether the product is published.
    pub status: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// A single product with all localized variants and param selections.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Name in every language.
    pub name: LocalizedText,
    /// Description in every language.
    pub description: LocalizedText,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units in stock.
    pub stock_quantity: i64,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Discount in percent.
    pub discount_percent: i16,
    /// Images.
    pub images: Vec<ProductImage>,
    /// Average rating.
    pub rating_avg: Option<f32>,
    /// View counter.
    pub views_count: i64,
    /// Selling user.
    pub seller_id: Option<UserId>,
    /// Whether the product is published.
    pub status: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// Param values grouped by param.
    pub params: Vec<ParamSelection>,
    /// Seller details, only on the detail view.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
}

/// Seller fields added by the product detail view.
#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    /// Seller first name.
    pub first_name: Option<String>,
    /// Seller last name.
    pub last_name: Option<String>,
    /// Seller avatar path.
    pub avatar: Option<String>,
}

/// Input for creating a product.
///
/// Images arrive as separate multipart parts.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    /// Name; at least one variant is required.
    pub name: LocalizedText,
    /// Description.
    #[serde(default)]
    pub description: LocalizedText,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    #[serde(default)]
    pub stock_quantity: i64,
    /// Category.
    pub category_id: CategoryId,
    /// Discount in percent.
    #[serde(default)]
    pub discount_percent: i16,
    /// Param values grouped by param.
    #[serde(default)]
    pub params: Vec<ParamSelection>,
}

/// Input for updating a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    /// Name variants to overwrite.
    pub name: Option<LocalizedText>,
    /// Description variants to overwrite.
    pub description: Option<LocalizedText>,
    /// New price.
    pub price: Option<Decimal>,
    /// New stock.
    pub stock_quantity: Option<i64>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New discount.
    pub discount_percent: Option<i16>,
    /// New seller.
    pub seller_id: Option<UserId>,
    /// Publish or unpublish.
    pub status: Option<bool>,
    /// Ids of images to drop.
    #[serde(default)]
    pub remove_images: Vec<i32>,
    /// Replacement param selections; absent keeps the current ones.
    pub params: Option<Vec<ParamSelection>>,
}

/// The stored columns of a product that create and update write.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    /// Name.
    pub name: LocalizedText,
    /// Description.
    pub description: LocalizedText,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    pub stock_quantity: i64,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Discount in percent.
    pub discount_percent: i16,
    /// Images.
    pub images: Vec<ProductImage>,
    /// Selling user.
    pub seller_id: Option<UserId>,
    /// Whether the product is published.
    pub status: bool,
}

impl ProductFields {
    /// Fields of a new, unpublished product sold by `seller`.
    #[must_use]
    pub fn new(input: &CreateProductInput, seller: UserId, uploaded: Vec<String>) -> Self {
        let mut images = Vec::new();
        append_images(&mut images, uploaded);
        Self {
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock_quantity: input.stock_quantity,
            category_id: Some(input.category_id),
            discount_percent: input.discount_percent,
            images,
            seller_id: Some(seller),
            status: false,
        }
    }

    /// Apply an update, returning the images it removed.
    ///
    /// Removals happen before `uploaded` paths are appended.
    pub fn apply(&mut self, input: &UpdateProductInput, uploaded: Vec<String>) -> Vec<ProductImage> {
        if let Some(name) = &input.name {
            self.name.merge(name.clone());
        }
        if let Some(description) = &input.description {
            self.description.merge(description.clone());
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if let Some(stock) = input.stock_quantity {
            self.stock_quantity = stock;
        }
        if let Some(category_id) = input.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(discount) = input.discount_percent {
            self.discount_percent = discount;
        }
        if let Some(seller_id) = input.seller_id {
            self.seller_id = Some(seller_id);
        }
        if let Some(status) = input.status {
            self.status = status;
        }

        let removed = take_images(&mut self.images, &input.remove_images);
        append_images(&mut self.images, uploaded);
        removed
    }
}

/// The id the next appended image receives.
#[must_use]
pub fn next_image_id(images: &[ProductImage]) -> i32 {
    images.iter().map(|image| image.id).max().unwrap_or(0) + 1
}

/// Append uploaded paths, numbering them after the current highest id.
pub fn append_images(images: &mut Vec<ProductImage>, paths: impl IntoIterator<Item = String>) {
    let mut id = next_image_id(images);
    for path in paths {
        images.push(ProductImage { id, path });
        id += 1;
    }
}

/// Remove images by id, returning the removed entries.
pub fn take_images(images: &mut Vec<ProductImage>, ids: &[i32]) -> Vec<ProductImage> {
    let (removed, kept): (Vec<_>, Vec<_>) =
        images.drain(..).partition(|image| ids.contains(&image.id));
    *images = kept;
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image(id: i32) -> ProductImage {
        ProductImage {
            id,
            path: format!("/media/products/{id}.png"),
        }
    }

    #[test]
    fn test_new_images_are_numbered_from_one() {
        let mut images = Vec::new();
        append_images(&mut images, ["/media/products/a.png".to_owned(), "/media/products/b.png".to_owned()]);
        assert_eq!(images.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_appended_images_continue_after_max_id() {
        let mut images = vec![image(1), image(4)];
        append_images(&mut images, ["/media/products/c.png".to_owned()]);
        assert_eq!(images.last().unwrap().id, 5);
    }

    #[test]
    fn test_take_images_keeps_order_of_rest() {
        let mut images = vec![image(1), image(2), image(3)];
        let removed = take_images(&mut images, &[2, 9]);
        assert_eq!(removed, vec![image(2)]);
        assert_eq!(images, vec![image(1), image(3)]);
    }

    #[test]
    fn test_removed_ids_are_not_reused_while_higher_exist() {
        let mut images = vec![image(1), image(2), image(3)];
        take_images(&mut images, &[2]);
        assert_eq!(next_image_id(&images), 4);
    }

    fn fields() -> ProductFields {
        ProductFields {
            name: LocalizedText {
                uz: Some("Ko'ylak".to_owned()),
                ru: Some("Рубашка".to_owned()),
                en: None,
            },
            description: LocalizedText::default(),
            price: Decimal::new(5_000, 2),
            stock_quantity: 3,
            category_id: Some(CategoryId::new(1)),
            discount_percent: 0,
            images: vec![image(1), image(2)],
            seller_id: Some(UserId::new(5)),
            status: false,
        }
    }

    #[test]
    fn test_new_product_is_unpublished_and_owned_by_seller() {
        let input: CreateProductInput = serde_json::from_str(
            r#"{"name":{"en":"Shirt"},"price":"12.00","category_id":4}"#,
        )
        .unwrap();
        let fields = ProductFields::new(&input, UserId::new(9), vec!["/media/products/x.png".to_owned()]);
        assert!(!fields.status);
        assert_eq!(fields.seller_id, Some(UserId::new(9)));
        assert_eq!(fields.images, vec![ProductImage { id: 1, path: "/media/products/x.png".to_owned() }]);
    }

    #[test]
    fn test_apply_merges_locales_and_keeps_absent_fields() {
        let mut product = fields();
        let removed = product.apply(
            &UpdateProductInput {
                name: Some(LocalizedText {
                    en: Some("Shirt".to_owned()),
                    ..LocalizedText::default()
                }),
                stock_quantity: Some(10),
                ..UpdateProductInput::default()
            },
            Vec::new(),
        );

        assert!(removed.is_empty());
        assert_eq!(product.name.uz.as_deref(), Some("Ko'ylak"));
        assert_eq!(product.name.en.as_deref(), Some("Shirt"));
        assert_eq!(product.stock_quantity, 10);
        assert_eq!(product.price, Decimal::new(5_000, 2));
        assert_eq!(product.seller_id, Some(UserId::new(5)));
    }

    #[test]
    fn test_apply_removes_then_appends_images() {
        let mut product = fields();
        let removed = product.apply(
            &UpdateProductInput {
                remove_images: vec![2],
                ..UpdateProductInput::default()
            },
            vec!["/media/products/new.png".to_owned()],
        );

        assert_eq!(removed, vec![image(2)]);
        assert_eq!(
            product.images.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(product.images.last().unwrap().path, "/media/products/new.png");
    }

    #[test]
    fn test_price_accepts_number_and_serializes_as_float() {
        let input: CreateProductInput = serde_json::from_str(
            r#"{"name":{"uz":"Kurtka"},"price":199.5,"category_id":2}"#,
        )
        .unwrap();
        assert_eq!(input.price, Decimal::new(1995, 1));
        assert!(input.params.is_empty());

        let summary = ProductSummary {
            id: ProductId::new(1),
            name: Some("Kurtka".to_owned()),
            description: None,
            price: input.price,
            stock_quantity: 0,
            category_id: Some(input.category_id),
            category_name: None,
            discount_percent: 0,
            images: Vec::new(),
            rating_avg: None,
            status: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["price"], serde_json::json!(199.5));
    }
}
