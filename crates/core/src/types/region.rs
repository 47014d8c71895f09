//! Amazon marketplace regions and their SP-API endpoints.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Region`] from a string fails.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid marketplace region: {0}")]
pub struct ParseRegionError(String);

/// Region an Amazon marketplace account belongs to.
///
/// Determines which regional SP-API endpoint the account's requests are sent
/// to. Note that Amazon does not run a dedicated South American endpoint:
/// Brazilian accounts (`Br`) are served by the North American one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marketplace_region", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// North America (US, CA, MX).
    Na,
    /// Europe (UK, DE, FR, IT, ES, NL, SE, PL...).
    Eu,
    /// Far East (JP, AU, SG).
    Fe,
    /// Brazil - served by the North American endpoint.
    Br,
}

impl Region {
    /// Base URL of the SP-API endpoint serving this region.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Na | Self::Br => "https://sellingpartnerapi-na.amazon.com",
            Self::Eu => "https://sellingpartnerapi-eu.amazon.com",
            Self::Fe => "https://sellingpartnerapi-fe.amazon.com",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Na => write!(f, "na"),
            Self::Eu => write!(f, "eu"),
            Self::Fe => write!(f, "fe"),
            Self::Br => write!(f, "br"),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "na" => Ok(Self::Na),
            "eu" => Ok(Self::Eu),
            "fe" => Ok(Self::Fe),
            "br" => Ok(Self::Br),
            _ => Err(ParseRegionError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazil_uses_the_north_american_endpoint() {
        assert_eq!(Region::Br.endpoint(), Region::Na.endpoint());
        assert_eq!(
            Region::Br.endpoint(),
            "https://sellingpartnerapi-na.amazon.com"
        );
    }

    #[test]
    fn each_region_round_trips_through_its_string_form() {
        for region in [Region::Na, Region::Eu, Region::Fe, Region::Br] {
            let parsed: Region = region.to_string().parse().expect("round trip");
            assert_eq!(parsed, region);
        }
    }

    #[test]
    fn unknown_region_is_rejected() {
        assert!("sa".parse::<Region>().is_err());
    }
}
