use serde::{Deserialize, Serialize};

/// A historically profitable (symbol, timeframe) configuration and the
/// features that drove it, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCatalogEntry {
    pub symbol: String,
    pub timeframe: String,
    pub features: Vec<String>,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    pub profitability_score: f64,
}

/// Raw catalog row as it appears in the tabular source. Every field is
/// optional here; validation happens in `FeatureCatalogEntry::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRow {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub top_features: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub win_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sharpe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profitability_score: Option<f64>,
}

/// Why a catalog row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRejection {
    MissingSymbol,
    MissingTimeframe,
    MissingFeatures,
    Unprofitable,
}

impl std::fmt::Display for CatalogRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            CatalogRejection::MissingSymbol => "missing symbol",
            CatalogRejection::MissingTimeframe => "missing timeframe",
            CatalogRejection::MissingFeatures => "missing or empty feature list",
            CatalogRejection::Unprofitable => "profitability score not positive",
        };
        f.write_str(msg)
    }
}

impl TryFrom<CatalogRow> for FeatureCatalogEntry {
    type Error = CatalogRejection;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let symbol = non_empty(row.symbol).ok_or(CatalogRejection::MissingSymbol)?;
        let timeframe = non_empty(row.timeframe).ok_or(CatalogRejection::MissingTimeframe)?;

        let features: Vec<String> = row
            .top_features
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if features.is_empty() {
            return Err(CatalogRejection::MissingFeatures);
        }

        let profitability_score = row.profitability_score.unwrap_or(0.0);
        if profitability_score <= 0.0 {
            return Err(CatalogRejection::Unprofitable);
        }

        Ok(Self {
            symbol,
            timeframe,
            features,
            win_rate: row.win_rate.unwrap_or(0.0),
            sharpe_ratio: row.sharpe_ratio.unwrap_or(0.0),
            profitability_score,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse a numeric cell, treating blanks, "nan" and junk as missing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}
