use serde::{Deserialize, Serialize};

/// One of the ten nations the model tracks. The variant order is the
/// canonical iteration order for every deterministic listing the engine
/// produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    India,
    China,
    Pakistan,
    Nepal,
    Bangladesh,
    #[serde(rename = "Sri Lanka")]
    SriLanka,
    #[serde(rename = "USA")]
    Usa,
    Russia,
    Japan,
    #[serde(rename = "UK")]
    Uk,
}

impl Country {
    pub const ALL: [Country; 10] = [
        Country::India,
        Country::China,
        Country::Pakistan,
        Country::Nepal,
        Country::Bangladesh,
        Country::SriLanka,
        Country::Usa,
        Country::Russia,
        Country::Japan,
        Country::Uk,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Country::India => "India",
            Country::China => "China",
            Country::Pakistan => "Pakistan",
            Country::Nepal => "Nepal",
            Country::Bangladesh => "Bangladesh",
            Country::SriLanka => "Sri Lanka",
            Country::Usa => "USA",
            Country::Russia => "Russia",
            Country::Japan => "Japan",
            Country::Uk => "UK",
        }
    }

    /// World Bank ISO-3166 alpha-3 code used when querying indicators.
    pub const fn iso3(self) -> &'static str {
        match self {
            Country::India => "IND",
            Country::China => "CHN",
            Country::Pakistan => "PAK",
            Country::Nepal => "NPL",
            Country::Bangladesh => "BGD",
            Country::SriLanka => "LKA",
            Country::Usa => "USA",
            Country::Russia => "RUS",
            Country::Japan => "JPN",
            Country::Uk => "GBR",
        }
    }

    /// Lenient lookup for names produced by the interpretation capability.
    /// Unknown names return `None`; callers drop the entry rather than
    /// guessing a correction.
    pub fn parse(value: &str) -> Option<Country> {
        let trimmed = value.trim();
        Country::ALL
            .into_iter()
            .find(|country| country.name().eq_ignore_ascii_case(trimmed))
    }
}

/// One of the seven resilience dimensions every country is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Aspect {
    #[serde(rename = "Economic Stability")]
    EconomicStability,
    #[serde(rename = "Defense & Strategic Security")]
    DefenseStrategicSecurity,
    #[serde(rename = "Healthcare & Biological Readiness")]
    HealthcareBiologicalReadiness,
    #[serde(rename = "Cyber Resilience & Digital Infrastructure")]
    CyberResilienceDigitalInfrastructure,
    #[serde(rename = "Demographic & Social Stability")]
    DemographicSocialStability,
    #[serde(rename = "Energy Security")]
    EnergySecurity,
    #[serde(rename = "Debt & Fiscal Sustainability")]
    DebtFiscalSustainability,
}

impl Aspect {
    pub const ALL: [Aspect; 7] = [
        Aspect::EconomicStability,
        Aspect::DefenseStrategicSecurity,
        Aspect::HealthcareBiologicalReadiness,
        Aspect::CyberResilienceDigitalInfrastructure,
        Aspect::DemographicSocialStability,
        Aspect::EnergySecurity,
        Aspect::DebtFiscalSustainability,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Aspect::EconomicStability => "Economic Stability",
            Aspect::DefenseStrategicSecurity => "Defense & Strategic Security",
            Aspect::HealthcareBiologicalReadiness => "Healthcare & Biological Readiness",
            Aspect::CyberResilienceDigitalInfrastructure => {
                "Cyber Resilience & Digital Infrastructure"
            }
            Aspect::DemographicSocialStability => "Demographic & Social Stability",
            Aspect::EnergySecurity => "Energy Security",
            Aspect::DebtFiscalSustainability => "Debt & Fiscal Sustainability",
        }
    }

    pub fn parse(value: &str) -> Option<Aspect> {
        let trimmed = value.trim();
        Aspect::ALL
            .into_iter()
            .find(|aspect| aspect.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Scenario category controlling how a shock distributes across aspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Health,
    Cyber,
    Energy,
    Financial,
    Conflict,
    Climate,
    Social,
    SupplyChain,
    Governance,
}

impl Sector {
    pub const ALL: [Sector; 9] = [
        Sector::Health,
        Sector::Cyber,
        Sector::Energy,
        Sector::Financial,
        Sector::Conflict,
        Sector::Climate,
        Sector::Social,
        Sector::SupplyChain,
        Sector::Governance,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Sector::Health => "health",
            Sector::Cyber => "cyber",
            Sector::Energy => "energy",
            Sector::Financial => "financial",
            Sector::Conflict => "conflict",
            Sector::Climate => "climate",
            Sector::Social => "social",
            Sector::SupplyChain => "supply_chain",
            Sector::Governance => "governance",
        }
    }

    pub fn parse(value: &str) -> Option<Sector> {
        let trimmed = value.trim();
        Sector::ALL
            .into_iter()
            .find(|sector| sector.tag().eq_ignore_ascii_case(trimmed))
    }
}

/// Geographic reach of a scenario, controlling spillover multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Regional,
    Global,
}

impl Scope {
    /// Unknown scope strings degrade to `Regional` so a sloppy
    /// interpretation still gets spillover treatment instead of failing.
    pub fn parse_or_regional(value: &str) -> Scope {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Scope::Local,
            "global" => Scope::Global,
            _ => Scope::Regional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_names_round_trip_through_parse() {
        for country in Country::ALL {
            assert_eq!(Country::parse(country.name()), Some(country));
        }
        assert_eq!(Country::parse(" sri lanka "), Some(Country::SriLanka));
        assert_eq!(Country::parse("Atlantis"), None);
    }

    #[test]
    fn aspect_labels_round_trip_through_parse() {
        for aspect in Aspect::ALL {
            assert_eq!(Aspect::parse(aspect.label()), Some(aspect));
        }
        assert_eq!(Aspect::parse("Morale"), None);
    }

    #[test]
    fn sector_tags_round_trip_through_parse() {
        for sector in Sector::ALL {
            assert_eq!(Sector::parse(sector.tag()), Some(sector));
        }
        assert_eq!(Sector::parse("supply_chain"), Some(Sector::SupplyChain));
        assert_eq!(Sector::parse("weather"), None);
    }

    #[test]
    fn serde_uses_display_names_for_map_keys() {
        let mut scores = std::collections::BTreeMap::new();
        scores.insert(Country::SriLanka, 42);
        let json = serde_json::to_string(&scores).expect("serializes");
        assert_eq!(json, r#"{"Sri Lanka":42}"#);

        let back: std::collections::BTreeMap<Country, i32> =
            serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back.get(&Country::SriLanka), Some(&42));
    }

    #[test]
    fn unknown_scope_degrades_to_regional() {
        assert_eq!(Scope::parse_or_regional("GLOBAL"), Scope::Global);
        assert_eq!(Scope::parse_or_regional("continental"), Scope::Regional);
    }
}
