//! The host-page (button) side of the widget integration.
//!
//! The hosting page embeds the widget behind an entry button. This
//! module covers everything the host does without rendering: deciding
//! whether the button shows, building the widget URL, consuming the
//! widget's inbound messages, bootstrapping measurements from
//! hash-fragment parameters, and answering size lookups from a stored
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use saia_api::catalog::{ProductQuery, RecommendationSource, SizeChartQuery};
use saia_api::error::ApiError;
use saia_core::error::CoreError;
use saia_core::measurements::Measurements;
use saia_core::recommendation::Recommendation;
use saia_core::types::Gender;

use crate::message::{WidgetCommand, WidgetMessage};
use crate::storage::{load_measurements, save_measurements, KeyValueStore};

/// Product parameters configured on the hosting page.
#[derive(Debug, Clone, Default)]
pub struct ProductOptions {
    /// Shown on the final results screen.
    pub description: String,
    pub image_url: String,
    /// Product page URL; keys the generic recommendation path.
    pub url: String,
}

/// Configuration of one embedded button.
#[derive(Debug, Clone)]
pub struct ButtonConfig {
    /// API key forwarded to the widget.
    pub key: String,
    /// URL of the widget host page to embed.
    pub widget_url: String,
    /// When both `brand` and `body_part` are set, sizecharts are used
    /// and the product URL is ignored for lookups.
    pub brand: Option<String>,
    pub body_part: Option<String>,
    pub product: ProductOptions,
    /// Where the user returns after finishing the mobile flow.
    pub return_url: String,
    /// Origin the widget's outbound messages are scoped to.
    pub origin: String,
}

/// What the host should do in response to an inbound widget message.
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    /// Clear the embedded view.
    Close,
    /// Measurements arrived and were persisted to the snapshot slot.
    StoredMeasurements(Measurements),
    /// A recommendation arrived; update the size display.
    DisplaySize(Recommendation),
    /// Not a recognized widget message; do nothing.
    Ignored,
}

/// Host-side integration for one embedded button.
pub struct ButtonIntegration {
    config: ButtonConfig,
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn RecommendationSource>,
}

impl ButtonIntegration {
    /// Create the integration. The API key and widget URL are required.
    pub fn new(
        config: ButtonConfig,
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn RecommendationSource>,
    ) -> Result<Self, CoreError> {
        if config.key.is_empty() {
            return Err(CoreError::Validation("Please provide API key".to_string()));
        }
        if config.widget_url.is_empty() {
            return Err(CoreError::Validation(
                "Please provide a widget url".to_string(),
            ));
        }
        Ok(Self {
            config,
            store,
            catalog,
        })
    }

    fn sizechart_configured(&self) -> bool {
        matches!((&self.config.brand, &self.config.body_part), (Some(b), Some(p)) if !b.is_empty() && !p.is_empty())
    }

    /// Dispatch one inbound message from the widget.
    ///
    /// Only the three contract commands are recognized; everything else
    /// is reported as [`HostAction::Ignored`].
    pub fn handle_message(&self, value: &serde_json::Value) -> HostAction {
        let Some(message) = WidgetMessage::parse(value) else {
            return HostAction::Ignored;
        };

        match message.command {
            WidgetCommand::Close => HostAction::Close,
            WidgetCommand::Data => self.store_measurements(&message),
            WidgetCommand::Recommendations => match Recommendation::normalize(&message.data) {
                Some(recommendation) => HostAction::DisplaySize(recommendation),
                None => HostAction::Ignored,
            },
        }
    }

    fn store_measurements(&self, message: &WidgetMessage) -> HostAction {
        let measurements: Measurements = match serde_json::from_value(message.data.clone()) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring data message with malformed measurements");
                return HostAction::Ignored;
            }
        };
        if let Err(e) = save_measurements(self.store.as_ref(), &measurements) {
            tracing::warn!(error = %e, "Failed to persist measurement snapshot");
            return HostAction::Ignored;
        }
        HostAction::StoredMeasurements(measurements)
    }

    /// Bootstrap the snapshot slot from hash-fragment parameters.
    ///
    /// When all of `chest`, `height`, `hips`, `waist`, and `gender` are
    /// present, they are parsed as precomputed measurements and written
    /// to the slot. Partial parameter sets are ignored.
    pub fn bootstrap_from_fragment(&self, fragment: &str) -> Option<Measurements> {
        let params = parse_hash_params(fragment);

        let measurements = Measurements {
            hips: params.get("hips")?.parse().ok()?,
            chest: params.get("chest")?.parse().ok()?,
            waist: params.get("waist")?.parse().ok()?,
            gender: Gender::from_str(params.get("gender")?)?,
            height: params.get("height")?.parse().ok()?,
        };

        if let Err(e) = save_measurements(self.store.as_ref(), &measurements) {
            tracing::warn!(error = %e, "Failed to persist bootstrapped measurements");
            return None;
        }
        tracing::info!("Bootstrapped measurements from fragment parameters");
        Some(measurements)
    }

    /// Look up the size for the configured product from a previously
    /// stored snapshot, without any capture. `None` when no snapshot
    /// exists or the lookup yields nothing usable.
    pub async fn saved_size(&self) -> Result<Option<Recommendation>, ApiError> {
        let measurements = match load_measurements(self.store.as_ref()) {
            Ok(Some(m)) => m,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot slot unreadable, skipping saved-size lookup");
                return Ok(None);
            }
        };

        if self.sizechart_configured() {
            self.catalog
                .size_chart(&SizeChartQuery {
                    gender: measurements.gender,
                    hips: measurements.hips,
                    chest: measurements.chest,
                    waist: measurements.waist,
                    brand: self.config.brand.clone().unwrap_or_default(),
                    body_part: self.config.body_part.clone().unwrap_or_default(),
                })
                .await
        } else {
            self.catalog
                .product_recommendation(&ProductQuery {
                    gender: measurements.gender,
                    hips: measurements.hips,
                    chest: measurements.chest,
                    waist: measurements.waist,
                    url: self.config.product.url.clone(),
                })
                .await
        }
    }

    /// Whether the entry button should be shown for this product.
    ///
    /// With a sizechart configured the button always shows; otherwise
    /// the product's visibility flag decides.
    pub async fn button_visibility(&self) -> Result<bool, ApiError> {
        if self.sizechart_configured() {
            return Ok(true);
        }
        self.catalog
            .product_visibility(&self.config.product.url)
            .await
    }

    /// The URL the embedded widget is opened with.
    pub fn widget_url(&self) -> String {
        let mut url = format!(
            "{}?key={}#/?origin={}&returnUrl={}",
            self.config.widget_url, self.config.key, self.config.origin, self.config.return_url
        );

        if !self.config.product.url.is_empty() {
            url.push_str(&format!("&product={}", self.config.product.url));
        }
        if !self.config.product.description.is_empty() {
            url.push_str(&format!(
                "&product_description={}",
                self.config.product.description
            ));
        }
        if !self.config.product.image_url.is_empty() {
            url.push_str(&format!("&image={}", self.config.product.image_url));
        }
        if self.sizechart_configured() {
            url.push_str(&format!(
                "&brand={}&body_part={}",
                self.config.brand.as_deref().unwrap_or_default(),
                self.config.body_part.as_deref().unwrap_or_default()
            ));
        }

        url
    }
}

/// Parse hash-fragment parameters (`#/?a=1&b=2` or `#a=1&b=2`) into a
/// key/value map. Malformed pairs are skipped.
pub fn parse_hash_params(fragment: &str) -> HashMap<String, String> {
    let fragment = fragment.trim_start_matches('#');
    let query = match fragment.split_once('?') {
        Some((_, query)) => query,
        None => fragment.trim_start_matches('/'),
    };

    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, STORAGE_KEY};
    use async_trait::async_trait;

    /// Catalog stub answering with a fixed recommendation.
    struct FixedCatalog {
        recommendation: Option<Recommendation>,
        visible: bool,
    }

    #[async_trait]
    impl RecommendationSource for FixedCatalog {
        async fn size_chart(
            &self,
            _query: &SizeChartQuery,
        ) -> Result<Option<Recommendation>, ApiError> {
            Ok(self.recommendation.clone())
        }

        async fn product_recommendation(
            &self,
            _query: &ProductQuery,
        ) -> Result<Option<Recommendation>, ApiError> {
            Ok(self.recommendation.clone())
        }

        async fn product_visibility(&self, _product_url: &str) -> Result<bool, ApiError> {
            Ok(self.visible)
        }
    }

    fn config() -> ButtonConfig {
        ButtonConfig {
            key: "test-key".to_string(),
            widget_url: "https://widget.example".to_string(),
            brand: None,
            body_part: None,
            product: ProductOptions {
                description: String::new(),
                image_url: String::new(),
                url: "https://shop.example/jeans".to_string(),
            },
            return_url: "https://shop.example/jeans".to_string(),
            origin: "https://shop.example".to_string(),
        }
    }

    fn integration(
        config: ButtonConfig,
        store: Arc<MemoryStore>,
        recommendation: Option<Recommendation>,
    ) -> ButtonIntegration {
        ButtonIntegration::new(
            config,
            store,
            Arc::new(FixedCatalog {
                recommendation,
                visible: true,
            }),
        )
        .unwrap()
    }

    #[test]
    fn requires_key_and_widget_url() {
        let mut bad = config();
        bad.key = String::new();
        assert!(ButtonIntegration::new(
            bad,
            Arc::new(MemoryStore::default()),
            Arc::new(FixedCatalog {
                recommendation: None,
                visible: false,
            }),
        )
        .is_err());
    }

    #[test]
    fn parses_hash_params_in_both_layouts() {
        let params = parse_hash_params("#/?origin=https://a&returnUrl=https://b");
        assert_eq!(params.get("origin").map(String::as_str), Some("https://a"));

        let params = parse_hash_params("#chest=90&waist=70");
        assert_eq!(params.get("chest").map(String::as_str), Some("90"));

        assert!(parse_hash_params("#garbage-without-pairs").is_empty());
    }

    #[test]
    fn close_and_unknown_commands_dispatch() {
        let store = Arc::new(MemoryStore::default());
        let integration = integration(config(), store, None);

        let action =
            integration.handle_message(&serde_json::json!({"command": "saia-pf-widget.close"}));
        assert_eq!(action, HostAction::Close);

        let action =
            integration.handle_message(&serde_json::json!({"command": "saia-pf-widget.resize"}));
        assert_eq!(action, HostAction::Ignored);
    }

    #[test]
    fn data_command_persists_the_snapshot() {
        let store = Arc::new(MemoryStore::default());
        let integration = integration(config(), Arc::clone(&store), None);

        let action = integration.handle_message(&serde_json::json!({
            "command": "saia-pf-widget.data",
            "data": {"hips": 95.0, "chest": 90.0, "waist": 70.0, "gender": "female", "height": 172.0},
        }));

        assert!(matches!(action, HostAction::StoredMeasurements(m) if m.chest == 90.0));
        assert!(store.get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn recommendations_command_updates_the_display() {
        let store = Arc::new(MemoryStore::default());
        let integration = integration(config(), store, None);

        let action = integration.handle_message(&serde_json::json!({
            "command": "saia-pf-widget.recommendations",
            "data": {"normal": "M"},
        }));
        assert!(matches!(action, HostAction::DisplaySize(r) if r.normal.as_deref() == Some("M")));

        // An empty recommendation payload changes nothing.
        let action = integration.handle_message(&serde_json::json!({
            "command": "saia-pf-widget.recommendations",
            "data": {},
        }));
        assert_eq!(action, HostAction::Ignored);
    }

    #[test]
    fn bootstrap_requires_all_five_parameters() {
        let store = Arc::new(MemoryStore::default());
        let integration = integration(config(), Arc::clone(&store), None);

        assert_eq!(
            integration.bootstrap_from_fragment("#chest=90&height=172&hips=95&waist=70"),
            None
        );
        assert!(store.get(STORAGE_KEY).unwrap().is_none());

        let measurements = integration
            .bootstrap_from_fragment("#chest=90&height=172&hips=95&waist=70&gender=female")
            .unwrap();
        assert_eq!(measurements.gender, Gender::Female);
        assert!(store.get(STORAGE_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn saved_size_requires_a_snapshot() {
        let store = Arc::new(MemoryStore::default());
        let integration = integration(
            config(),
            Arc::clone(&store),
            Some(Recommendation {
                normal: Some("M".to_string()),
                ..Recommendation::default()
            }),
        );

        assert_eq!(integration.saved_size().await.unwrap(), None);

        integration.bootstrap_from_fragment("#chest=90&height=172&hips=95&waist=70&gender=male");
        let size = integration.saved_size().await.unwrap().unwrap();
        assert_eq!(size.normal.as_deref(), Some("M"));
    }

    #[tokio::test]
    async fn sizechart_configuration_skips_the_visibility_check() {
        let mut with_chart = config();
        with_chart.brand = Some("Acme".to_string());
        with_chart.body_part = Some("top".to_string());

        let integration = ButtonIntegration::new(
            with_chart,
            Arc::new(MemoryStore::default()),
            Arc::new(FixedCatalog {
                recommendation: None,
                visible: false,
            }),
        )
        .unwrap();

        assert!(integration.button_visibility().await.unwrap());
    }

    #[test]
    fn widget_url_carries_configured_parameters() {
        let mut config = config();
        config.brand = Some("Acme".to_string());
        config.body_part = Some("top".to_string());
        let integration = integration(config, Arc::new(MemoryStore::default()), None);

        let url = integration.widget_url();
        assert!(url.starts_with("https://widget.example?key=test-key#/?origin=https://shop.example"));
        assert!(url.contains("&product=https://shop.example/jeans"));
        assert!(url.contains("&brand=Acme&body_part=top"));
    }
}
