use crate::seat::SeatCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Singleton excursion configuration: unit prices per seat category and the
/// trip dates printed on tickets. Mutated only by an administrator.
///
/// Prices are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcursionSettings {
    pub id: Uuid,
    pub leito_price_cents: i32,
    pub semi_leito_price_cents: i32,
    pub trip_start: NaiveDate,
    pub trip_end: NaiveDate,
}

impl ExcursionSettings {
    /// The row created when the store has no settings yet: the launch prices
    /// and trip dates of the excursion.
    pub fn default_row() -> Self {
        Self {
            id: Uuid::new_v4(),
            leito_price_cents: 18999,
            semi_leito_price_cents: 11999,
            trip_start: NaiveDate::from_ymd_opt(2026, 1, 6).expect("static trip date"),
            trip_end: NaiveDate::from_ymd_opt(2026, 1, 10).expect("static trip date"),
        }
    }

    /// Unit price for one seat of the given category.
    pub fn price_for(&self, category: SeatCategory) -> i32 {
        match category {
            SeatCategory::Leito => self.leito_price_cents,
            SeatCategory::SemiLeito => self.semi_leito_price_cents,
        }
    }
}

/// Partial settings update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub leito_price_cents: Option<i32>,
    pub semi_leito_price_cents: Option<i32>,
    pub trip_start: Option<NaiveDate>,
    pub trip_end: Option<NaiveDate>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.leito_price_cents.is_none()
            && self.semi_leito_price_cents.is_none()
            && self.trip_start.is_none()
            && self.trip_end.is_none()
    }

    pub fn apply_to(&self, settings: &mut ExcursionSettings) {
        if let Some(cents) = self.leito_price_cents {
            settings.leito_price_cents = cents;
        }
        if let Some(cents) = self.semi_leito_price_cents {
            settings.semi_leito_price_cents = cents;
        }
        if let Some(date) = self.trip_start {
            settings.trip_start = date;
        }
        if let Some(date) = self.trip_end {
            settings.trip_end = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_price_lookup() {
        let s = settings();
        assert_eq!(s.price_for(SeatCategory::Leito), 18999);
        assert_eq!(s.price_for(SeatCategory::SemiLeito), 11999);
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut s = settings();
        let patch = SettingsPatch {
            semi_leito_price_cents: Some(12999),
            ..Default::default()
        };
        patch.apply_to(&mut s);
        assert_eq!(s.leito_price_cents, 18999);
        assert_eq!(s.semi_leito_price_cents, 12999);
    }
}
