//! Reporting bands for the data quality score

use serde::{Deserialize, Serialize};

/// Quality band of a 0-100 data quality score
///
/// - Excellent: 85 and above
/// - Good: 65 to below 85
/// - Fair: 40 to below 65
/// - Poor: below 40
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBucket {
    /// Score >= 85
    Excellent,
    /// Score >= 65
    Good,
    /// Score >= 40
    Fair,
    /// Everything else
    Poor,
}

impl QualityBucket {
    /// All buckets, best first
    pub const ALL: [QualityBucket; 4] = [
        QualityBucket::Excellent,
        QualityBucket::Good,
        QualityBucket::Fair,
        QualityBucket::Poor,
    ];

    /// Classify a data quality score
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            QualityBucket::Excellent
        } else if score >= 65.0 {
            QualityBucket::Good
        } else if score >= 40.0 {
            QualityBucket::Fair
        } else {
            QualityBucket::Poor
        }
    }

    /// Parse a bucket from its name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Get the bucket name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityBucket::Excellent => "excellent",
            QualityBucket::Good => "good",
            QualityBucket::Fair => "fair",
            QualityBucket::Poor => "poor",
        }
    }

    /// Score range covered by the bucket
    pub fn description(&self) -> &'static str {
        match self {
            QualityBucket::Excellent => "Data quality 85-100",
            QualityBucket::Good => "Data quality 65-84",
            QualityBucket::Fair => "Data quality 40-64",
            QualityBucket::Poor => "Data quality <40",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(QualityBucket::from_score(100.0), QualityBucket::Excellent);
        assert_eq!(QualityBucket::from_score(85.0), QualityBucket::Excellent);
        assert_eq!(QualityBucket::from_score(84.99), QualityBucket::Good);
        assert_eq!(QualityBucket::from_score(65.0), QualityBucket::Good);
        assert_eq!(QualityBucket::from_score(40.0), QualityBucket::Fair);
        assert_eq!(QualityBucket::from_score(39.9), QualityBucket::Poor);
        assert_eq!(QualityBucket::from_score(0.0), QualityBucket::Poor);
    }

    #[test]
    fn test_nan_is_poor() {
        assert_eq!(QualityBucket::from_score(f64::NAN), QualityBucket::Poor);
    }

    #[test]
    fn test_parse() {
        assert_eq!(QualityBucket::parse("Good"), Some(QualityBucket::Good));
        assert_eq!(QualityBucket::parse(" poor "), Some(QualityBucket::Poor));
        assert_eq!(QualityBucket::parse("great"), None);
    }
}
