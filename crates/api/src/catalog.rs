//! Sizechart and product recommendation lookups.
//!
//! Two lookup paths produce a size recommendation: the brand/body-part
//! sizechart (used when both are configured) and the generic product
//! lookup keyed by product URL. Both raw payloads are normalized to the
//! fixed `{tight, normal, loose}` shape before leaving this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use saia_core::recommendation::Recommendation;
use saia_core::types::Gender;

use crate::client::{build_http_client, parse_json, trim_base_url};
use crate::config::WidgetConfig;
use crate::error::ApiError;

/// Query for the brand/body-part sizechart path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeChartQuery {
    pub gender: Gender,
    pub hips: f64,
    pub chest: f64,
    pub waist: f64,
    pub brand: String,
    pub body_part: String,
}

/// Query for the generic product lookup path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuery {
    pub gender: Gender,
    pub hips: f64,
    pub chest: f64,
    pub waist: f64,
    pub url: String,
}

/// The recommendation endpoints, as the pipeline and the button
/// integration consume them.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Look up a size via the brand/body-part sizechart.
    async fn size_chart(&self, query: &SizeChartQuery)
        -> Result<Option<Recommendation>, ApiError>;

    /// Look up a size via the generic product path.
    async fn product_recommendation(
        &self,
        query: &ProductQuery,
    ) -> Result<Option<Recommendation>, ApiError>;

    /// Whether the widget entry point should be shown for a product.
    async fn product_visibility(&self, product_url: &str) -> Result<bool, ApiError>;
}

/// Product metadata relevant to the entry-point decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub widget_is_visible: bool,
}

/// The product endpoint answers with a single object or a list,
/// depending on how the product URL matched.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductPayload {
    Many(Vec<ProductInfo>),
    One(ProductInfo),
}

impl ProductPayload {
    fn visibility(self) -> bool {
        match self {
            ProductPayload::One(product) => product.widget_is_visible,
            ProductPayload::Many(products) => products
                .first()
                .map(|p| p.widget_is_visible)
                .unwrap_or(false),
        }
    }
}

/// HTTP client for the sizechart and product endpoints.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &WidgetConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            build_http_client(&config.api_key)?,
            &config.api_host,
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url),
        }
    }
}

#[async_trait]
impl RecommendationSource for CatalogClient {
    async fn size_chart(
        &self,
        query: &SizeChartQuery,
    ) -> Result<Option<Recommendation>, ApiError> {
        let response = self
            .http
            .get(format!("{}/sizecharts/size/", self.base_url))
            .query(query)
            .send()
            .await?;
        let raw: serde_json::Value = parse_json(response).await?;

        let recommendation = Recommendation::normalize(&raw);
        tracing::debug!(
            brand = %query.brand,
            body_part = %query.body_part,
            found = recommendation.is_some(),
            "Sizechart lookup complete",
        );
        Ok(recommendation)
    }

    async fn product_recommendation(
        &self,
        query: &ProductQuery,
    ) -> Result<Option<Recommendation>, ApiError> {
        let response = self
            .http
            .get(format!("{}/products/recommendation/", self.base_url))
            .query(query)
            .send()
            .await?;
        let raw: serde_json::Value = parse_json(response).await?;

        let recommendation = Recommendation::normalize(&raw);
        tracing::debug!(
            url = %query.url,
            found = recommendation.is_some(),
            "Product recommendation lookup complete",
        );
        Ok(recommendation)
    }

    async fn product_visibility(&self, product_url: &str) -> Result<bool, ApiError> {
        let response = self
            .http
            .get(format!("{}/products/", self.base_url))
            .query(&[("url", product_url)])
            .send()
            .await?;
        let payload: ProductPayload = parse_json(response).await?;
        Ok(payload.visibility())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_payload_accepts_object_and_list() {
        let one: ProductPayload =
            serde_json::from_value(serde_json::json!({"widget_is_visible": true})).unwrap();
        assert!(one.visibility());

        let many: ProductPayload = serde_json::from_value(serde_json::json!([
            {"widget_is_visible": false},
            {"widget_is_visible": true},
        ]))
        .unwrap();
        assert!(!many.visibility());
    }

    #[test]
    fn empty_product_list_is_not_visible() {
        let empty: ProductPayload = serde_json::from_value(serde_json::json!([])).unwrap();
        assert!(!empty.visibility());
    }

    #[test]
    fn size_chart_query_serializes_expected_fields() {
        let query = SizeChartQuery {
            gender: Gender::Female,
            hips: 95.0,
            chest: 90.0,
            waist: 70.0,
            brand: "Acme".to_string(),
            body_part: "top".to_string(),
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["body_part"], "top");
        assert_eq!(json["hips"], 95.0);
    }
}
