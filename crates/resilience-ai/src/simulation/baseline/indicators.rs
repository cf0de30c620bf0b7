use super::super::taxonomy::Aspect;

/// A public indicator feeding the baseline model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    /// Semantic name used as the key in normalized indicator maps.
    pub name: &'static str,
    /// World Bank series code.
    pub code: &'static str,
    /// Polarity: `false` means larger raw values hurt the score.
    pub higher_is_better: bool,
}

pub static INDICATOR_SPECS: [IndicatorSpec; 10] = [
    IndicatorSpec {
        name: "gdp_per_capita",
        code: "NY.GDP.PCAP.CD",
        higher_is_better: true,
    },
    IndicatorSpec {
        name: "gdp_growth",
        code: "NY.GDP.MKTP.KD.ZG",
        higher_is_better: true,
    },
    IndicatorSpec {
        name: "inflation",
        code: "FP.CPI.TOTL.ZG",
        higher_is_better: false,
    },
    IndicatorSpec {
        name: "debt_gdp",
        code: "GC.DOD.TOTL.GD.ZS",
        higher_is_better: false,
    },
    IndicatorSpec {
        name: "military_spend_gdp",
        code: "MS.MIL.XPND.GD.ZS",
        higher_is_better: true,
    },
    IndicatorSpec {
        name: "health_spend_per_capita",
        code: "SH.XPD.CHEX.PC.CD",
        higher_is_better: true,
    },
    IndicatorSpec {
        name: "internet_users",
        code: "IT.NET.USER.ZS",
        higher_is_better: true,
    },
    IndicatorSpec {
        name: "gini",
        code: "SI.POV.GINI",
        higher_is_better: false,
    },
    IndicatorSpec {
        name: "energy_imports",
        code: "EG.IMP.CONS.ZS",
        higher_is_better: false,
    },
    IndicatorSpec {
        name: "life_expectancy",
        code: "SP.DYN.LE00.IN",
        higher_is_better: true,
    },
];

/// Indicator blend per aspect. Weights conventionally sum to 1 but the
/// aggregator accepts arbitrary positive weights without validation.
pub const ASPECT_WEIGHTS: [(Aspect, &[(&str, f64)]); 7] = [
    (
        Aspect::EconomicStability,
        &[
            ("gdp_per_capita", 0.4),
            ("gdp_growth", 0.3),
            ("inflation", 0.3),
        ],
    ),
    (
        Aspect::DefenseStrategicSecurity,
        &[("military_spend_gdp", 0.6), ("gdp_per_capita", 0.4)],
    ),
    (
        Aspect::HealthcareBiologicalReadiness,
        &[("health_spend_per_capita", 0.7), ("life_expectancy", 0.3)],
    ),
    (
        Aspect::CyberResilienceDigitalInfrastructure,
        &[("internet_users", 0.7), ("gdp_per_capita", 0.3)],
    ),
    (
        Aspect::DemographicSocialStability,
        &[
            ("gini", 0.5),
            ("life_expectancy", 0.3),
            ("gdp_per_capita", 0.2),
        ],
    ),
    (
        Aspect::EnergySecurity,
        &[("energy_imports", 0.7), ("gdp_per_capita", 0.3)],
    ),
    (
        Aspect::DebtFiscalSustainability,
        &[("debt_gdp", 0.7), ("inflation", 0.3)],
    ),
];

pub const METHODOLOGY: &str = "Baseline scores are computed from public World Bank indicators covering economic \
performance, fiscal pressure, defense effort, health capacity, digital access, social \
inequality, energy dependence, and longevity. Each resilience aspect is a weighted \
blend of normalized indicators. Indicators are normalized to a 0-100 scale across the \
tracked countries and aggregated as a simple average across the 7 aspects.";

pub fn spec_by_name(name: &str) -> Option<&'static IndicatorSpec> {
    INDICATOR_SPECS.iter().find(|spec| spec.name == name)
}
