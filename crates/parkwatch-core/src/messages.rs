//! Localized text lookup.
//!
//! Messages are keyed by [`MessageId`] and rendered for an explicit
//! [`Locale`]. Positional placeholders `{0}`, `{1}`, ... are replaced with
//! the supplied arguments.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish. The facility default.
    #[default]
    Es,
    /// English.
    En,
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Self; 2] = [Self::Es, Self::En];

    /// ISO 639-1 language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Parse a language tag such as `es`, `es-CO` or `en_US`.
    ///
    /// Only the primary subtag is considered.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(primary))
    }

    /// Pick the most preferred supported locale from an `Accept-Language`
    /// header value.
    ///
    /// Entries are ranked by their `q` weight; ties keep header order.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Self)> = header
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let weight = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((weight, locale))
            })
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, locale)| *locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unsupported locale '{s}'"))
    }
}

/// Identifier of a translatable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Display label of the car category.
    VehicleCar,
    /// Display label of the motorcycle category.
    VehicleMotorcycle,
    /// `{0}` = plate.
    VehicleExists,
    /// Unknown vehicle type at check-in.
    VehicleTypeInvalid,
    /// `{0}` = plate.
    VehicleRegistered,
    /// `{0}` = plate, `{1}` = total cost.
    VehicleExit,
    /// No open session for the plate.
    VehicleNotFound,
    /// `{0}` = plate.
    PlateInvalid,
    /// Landing text.
    Welcome,
}

impl MessageId {
    /// Dotted key of the message.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::VehicleCar => "vehicle.car",
            Self::VehicleMotorcycle => "vehicle.motorcycle",
            Self::VehicleExists => "parking.vehicle.exists",
            Self::VehicleTypeInvalid => "parking.vehicle.type.invalid",
            Self::VehicleRegistered => "parking.vehicle.registered",
            Self::VehicleExit => "parking.vehicle.exit",
            Self::VehicleNotFound => "parking.vehicle.notfound",
            Self::PlateInvalid => "parking.vehicle.plate.invalid",
            Self::Welcome => "app.welcome",
        }
    }
}

const SPANISH: &[(MessageId, &str)] = &[
    (MessageId::VehicleCar, "carro"),
    (MessageId::VehicleMotorcycle, "moto"),
    (
        MessageId::VehicleExists,
        "El vehículo con placa {0} ya se encuentra en el parqueadero.",
    ),
    (
        MessageId::VehicleTypeInvalid,
        "Tipo de vehículo inválido. Use 'carro' o 'moto'.",
    ),
    (
        MessageId::VehicleRegistered,
        "Vehículo con placa {0} registrado correctamente.",
    ),
    (
        MessageId::VehicleExit,
        "Salida registrada para la placa {0}. Costo total: {1}",
    ),
    (
        MessageId::VehicleNotFound,
        "No se encontró un vehículo dentro del parqueadero con esa placa.",
    ),
    (MessageId::PlateInvalid, "La placa '{0}' no es válida."),
    (MessageId::Welcome, "Bienvenido al parqueadero."),
];

const ENGLISH: &[(MessageId, &str)] = &[
    (MessageId::VehicleCar, "car"),
    (MessageId::VehicleMotorcycle, "motorcycle"),
    (
        MessageId::VehicleExists,
        "The vehicle with plate {0} is already parked.",
    ),
    (
        MessageId::VehicleTypeInvalid,
        "Invalid vehicle type. Use 'car' or 'motorcycle'.",
    ),
    (
        MessageId::VehicleRegistered,
        "Vehicle with plate {0} checked in.",
    ),
    (
        MessageId::VehicleExit,
        "Exit recorded for plate {0}. Total cost: {1}",
    ),
    (
        MessageId::VehicleNotFound,
        "No parked vehicle was found with that plate.",
    ),
    (MessageId::PlateInvalid, "The plate '{0}' is not valid."),
    (MessageId::Welcome, "Welcome to the parking lot."),
];

/// Bundled message catalog for every [`Locale`].
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<(Locale, MessageId), String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let bundles = [(Locale::Es, SPANISH), (Locale::En, ENGLISH)];
        let entries = bundles
            .into_iter()
            .flat_map(|(locale, bundle)| {
                bundle
                    .iter()
                    .map(move |(id, text)| ((locale, *id), (*text).to_string()))
            })
            .collect();
        Self { entries }
    }
}

impl MessageCatalog {
    /// Render `id` for `locale`, substituting positional arguments.
    ///
    /// Missing translations fall back to the message key so a gap in a
    /// catalog is visible instead of silently empty.
    #[must_use]
    pub fn text(&self, locale: Locale, id: MessageId, args: &[&dyn fmt::Display]) -> String {
        let Some(template) = self.entries.get(&(locale, id)) else {
            tracing::warn!(locale = %locale, key = id.key(), "Missing translation");
            return id.key().to_string();
        };

        args.iter()
            .enumerate()
            .fold(template.clone(), |text, (index, arg)| {
                text.replace(&format!("{{{index}}}"), &arg.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("es"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("es-CO"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("EN_us"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_accept_language_respects_weights() {
        assert_eq!(
            Locale::from_accept_language("fr-FR, en;q=0.5, es;q=0.8"),
            Some(Locale::Es)
        );
        assert_eq!(
            Locale::from_accept_language("en-US,en;q=0.9"),
            Some(Locale::En)
        );
        assert_eq!(Locale::from_accept_language("de, fr"), None);
        assert_eq!(Locale::from_accept_language("es;q=0, en;q=0.1"), Some(Locale::En));
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert!("xx".parse::<Locale>().is_err());
    }

    #[test]
    fn test_every_message_translated_in_every_locale() {
        let catalog = MessageCatalog::default();
        let ids = [
            MessageId::VehicleCar,
            MessageId::VehicleMotorcycle,
            MessageId::VehicleExists,
            MessageId::VehicleTypeInvalid,
            MessageId::VehicleRegistered,
            MessageId::VehicleExit,
            MessageId::VehicleNotFound,
            MessageId::PlateInvalid,
            MessageId::Welcome,
        ];
        for locale in Locale::ALL {
            for id in ids {
                assert_ne!(catalog.text(locale, id, &[]), id.key(), "{locale} {id:?}");
            }
        }
    }

    #[test]
    fn test_positional_arguments_substituted() {
        let catalog = MessageCatalog::default();
        let text = catalog.text(Locale::En, MessageId::VehicleExit, &[&"ABC-123", &4000]);
        assert_eq!(text, "Exit recorded for plate ABC-123. Total cost: 4000");

        let text = catalog.text(Locale::Es, MessageId::VehicleExists, &[&"XYZ-9"]);
        assert!(text.contains("XYZ-9"));
    }

    #[test]
    fn test_labels_per_locale() {
        let catalog = MessageCatalog::default();
        assert_eq!(catalog.text(Locale::Es, MessageId::VehicleCar, &[]), "carro");
        assert_eq!(catalog.text(Locale::Es, MessageId::VehicleMotorcycle, &[]), "moto");
        assert_eq!(catalog.text(Locale::En, MessageId::VehicleCar, &[]), "car");
    }
}
