//! Submission checks for admin writes. Every check runs before anything is
//! sent to the store or the upload service.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::colors::ColorEntry;
use crate::content::{SlideDraft, SlidePatch};
use crate::products::{ProductDraft, ProductPatch};

const MAX_NAME_LEN: usize = 200;

/// A rejected field on an admin submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ProductDraft {
    /// Trims the text fields in place and checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.product_name = check_name("product_name", &self.product_name)?;
        self.description = check_required("description", &self.description)?;
        self.short_description = self.short_description.trim().to_string();
        check_price(self.price)?;
        check_non_negative_decimal("sales_price", self.sales_price)?;
        check_non_negative("stock_quantity", self.stock_quantity)?;
        check_non_negative("low_stock_threshold", self.low_stock_threshold)?;
        self.size = check_required("size", &self.size)?;
        check_images(&self.images)?;
        check_colors(&self.colors)
    }
}

impl ProductPatch {
    /// Same rules as [`ProductDraft::validate`], applied to the supplied
    /// fields only.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if let Some(name) = &self.product_name {
            self.product_name = Some(check_name("product_name", name)?);
        }
        if let Some(description) = &self.description {
            self.description = Some(check_required("description", description)?);
        }
        if let Some(short) = &self.short_description {
            self.short_description = Some(short.trim().to_string());
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(sales_price) = self.sales_price {
            check_non_negative_decimal("sales_price", sales_price)?;
        }
        if let Some(qty) = self.stock_quantity {
            check_non_negative("stock_quantity", qty)?;
        }
        if let Some(threshold) = self.low_stock_threshold {
            check_non_negative("low_stock_threshold", threshold)?;
        }
        if let Some(size) = &self.size {
            self.size = Some(check_required("size", size)?);
        }
        if let Some(images) = &self.images {
            check_images(images)?;
        }
        if let Some(colors) = &self.colors {
            check_colors(colors)?;
        }
        Ok(())
    }
}

impl SlideDraft {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `label` or `image` is blank.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.label = check_required("label", &self.label)?;
        self.image = check_required("image", &self.image)?;
        Ok(())
    }
}

impl SlidePatch {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a supplied `label` or `image` is
    /// blank.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if let Some(label) = &self.label {
            self.label = Some(check_required("label", label)?);
        }
        if let Some(image) = &self.image {
            self.image = Some(check_required("image", image)?);
        }
        Ok(())
    }
}

/// Trims and checks a widget name.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the name is blank or too long.
pub fn validate_widget_name(name: &str) -> Result<String, ValidationError> {
    check_name("widget_name", name)
}

fn check_required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn check_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = check_required(field, value)?;
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(trimmed)
}

fn check_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::new("price", "must be greater than 0"));
    }
    Ok(())
}

fn check_non_negative_decimal(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

fn check_images(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(ValidationError::new("images", "image URLs must not be blank"));
    }
    Ok(())
}

fn check_colors(colors: &[ColorEntry]) -> Result<(), ValidationError> {
    colors
        .iter()
        .find_map(ColorEntry::storage_violation)
        .map_or(Ok(()), |reason| Err(ValidationError::new("colors", reason)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            product_name: "  Eye Candy Tee ".to_string(),
            description: "Heavyweight cotton".to_string(),
            short_description: String::new(),
            price: Decimal::new(100_000, 2),
            is_sale: false,
            sales_price: Decimal::ZERO,
            stock_quantity: 12,
            is_in_stock: true,
            low_stock_threshold: 5,
            size: "M".to_string(),
            images: vec!["https://cdn.example.com/tee.jpg".to_string()],
            colors: vec![ColorEntry::new("#000000", "Black")],
        }
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let mut d = draft();
        d.validate().expect("valid draft");
        assert_eq!(d.product_name, "Eye Candy Tee");
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut d = draft();
        d.product_name = "   ".to_string();
        assert_eq!(d.validate().unwrap_err().field, "product_name");
    }

    #[test]
    fn overlong_name_is_rejected() {
        let mut d = draft();
        d.product_name = "x".repeat(201);
        assert_eq!(d.validate().unwrap_err().field, "product_name");
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut d = draft();
        d.description = String::new();
        assert_eq!(d.validate().unwrap_err().field, "description");
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut d = draft();
        d.price = Decimal::ZERO;
        assert_eq!(d.validate().unwrap_err().field, "price");
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut d = draft();
        d.stock_quantity = -1;
        assert_eq!(d.validate().unwrap_err().field, "stock_quantity");
    }

    #[test]
    fn stock_flag_may_disagree_with_quantity() {
        let mut d = draft();
        d.stock_quantity = 0;
        d.is_in_stock = true;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn blank_size_is_rejected() {
        let mut d = draft();
        d.size = " ".to_string();
        assert_eq!(d.validate().unwrap_err().field, "size");
    }

    #[test]
    fn color_with_comma_is_rejected() {
        let mut d = draft();
        d.colors.push(ColorEntry::new("#fff", "Black, White"));
        let err = d.validate().unwrap_err();
        assert_eq!(err.field, "colors");
        assert!(err.message.contains("reserved character"));
    }

    #[test]
    fn patch_checks_only_supplied_fields() {
        let mut patch = ProductPatch {
            stock_quantity: Some(3),
            ..ProductPatch::default()
        };
        assert!(patch.validate().is_ok());

        let mut patch = ProductPatch {
            price: Some(Decimal::new(-5, 0)),
            ..ProductPatch::default()
        };
        assert_eq!(patch.validate().unwrap_err().field, "price");
    }

    #[test]
    fn patch_trims_name() {
        let mut patch = ProductPatch {
            product_name: Some(" Hoodie ".to_string()),
            ..ProductPatch::default()
        };
        patch.validate().expect("valid patch");
        assert_eq!(patch.product_name.as_deref(), Some("Hoodie"));
    }

    #[test]
    fn slide_requires_label_and_image() {
        let mut slide = SlideDraft {
            image: "https://cdn.example.com/hero.jpg".to_string(),
            label: String::new(),
        };
        assert_eq!(slide.validate().unwrap_err().field, "label");
        slide.label = "Summer drop".to_string();
        slide.image = " ".to_string();
        assert_eq!(slide.validate().unwrap_err().field, "image");
    }

    #[test]
    fn widget_name_is_trimmed_and_required() {
        assert_eq!(validate_widget_name(" New In ").unwrap(), "New In");
        assert!(validate_widget_name("").is_err());
    }
}
