use rota_core::{ExcursionSettings, SeatCategory};

/// Resolves a seat category to its unit price from the current excursion
/// settings. Holds no other state and performs no I/O; callers load the
/// settings snapshot and must block price-dependent actions until it is
/// available.
#[derive(Debug, Clone, Default)]
pub struct PricingResolver {
    settings: Option<ExcursionSettings>,
}

impl PricingResolver {
    /// A resolver with no settings loaded yet; every quote fails.
    pub fn new() -> Self {
        Self { settings: None }
    }

    pub fn with_settings(settings: ExcursionSettings) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    pub fn load(&mut self, settings: ExcursionSettings) {
        self.settings = Some(settings);
    }

    pub fn is_loaded(&self) -> bool {
        self.settings.is_some()
    }

    pub fn settings(&self) -> Option<&ExcursionSettings> {
        self.settings.as_ref()
    }

    /// Unit price in cents for one seat of the given category.
    pub fn unit_price(&self, category: SeatCategory) -> Result<i32, PricingError> {
        let settings = self.settings.as_ref().ok_or(PricingError::SettingsNotLoaded)?;
        Ok(settings.price_for(category))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("excursion settings are not loaded yet")]
    SettingsNotLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn settings() -> ExcursionSettings {
        ExcursionSettings {
            id: Uuid::new_v4(),
            leito_price_cents: 18999,
            semi_leito_price_cents: 11999,
            trip_start: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            trip_end: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        }
    }

    #[test]
    fn test_unloaded_resolver_refuses_to_quote() {
        let resolver = PricingResolver::new();
        assert!(!resolver.is_loaded());
        assert!(matches!(
            resolver.unit_price(SeatCategory::Leito),
            Err(PricingError::SettingsNotLoaded)
        ));
    }

    #[test]
    fn test_quotes_follow_settings() {
        let resolver = PricingResolver::with_settings(settings());
        assert_eq!(resolver.unit_price(SeatCategory::Leito).unwrap(), 18999);
        assert_eq!(resolver.unit_price(SeatCategory::SemiLeito).unwrap(), 11999);
    }
}
