//! Hourly rates and category labels.

use std::sync::Arc;

use crate::config::TariffConfig;
use crate::messages::{Locale, MessageCatalog, MessageId};
use crate::types::VehicleType;

/// Vehicle category lookup: rates for billing, labels for display and
/// check-in validation.
pub trait TariffTable: Send + Sync {
    /// Display label of `vehicle_type` in `locale`.
    fn label(&self, vehicle_type: VehicleType, locale: Locale) -> String;

    /// Hourly rate charged for `vehicle_type`.
    fn hourly_rate(&self, vehicle_type: VehicleType) -> u64;

    /// Map user input to a category by comparing it, ignoring case, with
    /// each category's label in `locale`.
    fn parse_label(&self, input: &str, locale: Locale) -> Option<VehicleType> {
        let input = input.trim();
        VehicleType::ALL
            .into_iter()
            .find(|vt| self.label(*vt, locale).to_lowercase() == input.to_lowercase())
    }
}

/// Tariffs taken from configuration, labels from the message catalog.
#[derive(Debug, Clone)]
pub struct ConfiguredTariffs {
    rates: TariffConfig,
    catalog: Arc<MessageCatalog>,
}

impl ConfiguredTariffs {
    /// Combine configured rates with a catalog for labels.
    #[must_use]
    pub const fn new(rates: TariffConfig, catalog: Arc<MessageCatalog>) -> Self {
        Self { rates, catalog }
    }
}

impl TariffTable for ConfiguredTariffs {
    fn label(&self, vehicle_type: VehicleType, locale: Locale) -> String {
        let id = match vehicle_type {
            VehicleType::Car => MessageId::VehicleCar,
            VehicleType::Motorcycle => MessageId::VehicleMotorcycle,
        };
        self.catalog.text(locale, id, &[])
    }

    fn hourly_rate(&self, vehicle_type: VehicleType) -> u64 {
        match vehicle_type {
            VehicleType::Car => self.rates.car_hourly_rate,
            VehicleType::Motorcycle => self.rates.motorcycle_hourly_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tariffs() -> ConfiguredTariffs {
        ConfiguredTariffs::new(TariffConfig::default(), Arc::new(MessageCatalog::default()))
    }

    #[test]
    fn test_default_rates() {
        let t = tariffs();
        assert_eq!(t.hourly_rate(VehicleType::Car), 2000);
        assert_eq!(t.hourly_rate(VehicleType::Motorcycle), 1000);
    }

    #[test]
    fn test_parse_label_is_case_insensitive() {
        let t = tariffs();
        assert_eq!(t.parse_label("CARRO", Locale::Es), Some(VehicleType::Car));
        assert_eq!(t.parse_label("Moto", Locale::Es), Some(VehicleType::Motorcycle));
        assert_eq!(t.parse_label("Motorcycle", Locale::En), Some(VehicleType::Motorcycle));
    }

    #[test]
    fn test_parse_label_uses_only_requested_locale() {
        let t = tariffs();
        assert_eq!(t.parse_label("car", Locale::Es), None);
        assert_eq!(t.parse_label("carro", Locale::En), None);
        assert_eq!(t.parse_label("truck", Locale::En), None);
    }

    #[test]
    fn test_custom_rates() {
        let t = ConfiguredTariffs::new(
            TariffConfig {
                car_hourly_rate: 3500,
                motorcycle_hourly_rate: 1200,
            },
            Arc::new(MessageCatalog::default()),
        );
        assert_eq!(t.hourly_rate(VehicleType::Car), 3500);
        assert_eq!(t.hourly_rate(VehicleType::Motorcycle), 1200);
    }
}
