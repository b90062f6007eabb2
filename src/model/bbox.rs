// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Bounding box of a data request, with validation.
//!
//! A request region is rejected before any network traffic if it is
//! inverted, outside the valid coordinate range, or larger than the remote
//! API allows.

use crate::settings;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field of a bounding box, used to report errors next to the right input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BboxField {
    MinLon,
    MinLat,
    MaxLon,
    MaxLat,
}

impl fmt::Display for BboxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinLon => "min longitude",
            Self::MinLat => "min latitude",
            Self::MaxLon => "max longitude",
            Self::MaxLat => "max latitude",
        };
        f.write_str(name)
    }
}

/// Why a bounding box was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BboxError {
    #[error("{field} is not a number: {text:?}")]
    NotANumber { field: BboxField, text: String },
    #[error("expected 4 comma-separated coordinates, found {0}")]
    WrongArity(usize),
    #[error("{field} {value} is outside the valid range")]
    OutOfRange { field: BboxField, value: f64 },
    #[error("min longitude must be less than max longitude")]
    InvertedLongitude,
    #[error("min latitude must be less than max latitude")]
    InvertedLatitude,
    #[error("area of {area:.4} square degrees exceeds the limit of {limit}")]
    TooLarge { area: f64, limit: f64 },
}

impl BboxError {
    /// The input field this error should be reported against
    pub fn field(&self) -> Option<BboxField> {
        match self {
            Self::NotANumber { field, .. } | Self::OutOfRange { field, .. } => Some(*field),
            Self::InvertedLongitude => Some(BboxField::MaxLon),
            Self::InvertedLatitude => Some(BboxField::MaxLat),
            Self::WrongArity(_) | Self::TooLarge { .. } => None,
        }
    }
}

/// A min/max longitude/latitude rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Build a validated box
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, BboxError> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    pub fn area(&self) -> f64 {
        (self.max_lon - self.min_lon) * (self.max_lat - self.min_lat)
    }

    /// Check range, orientation and size
    pub fn validate(&self) -> Result<(), BboxError> {
        let lon_fields = [
            (BboxField::MinLon, self.min_lon),
            (BboxField::MaxLon, self.max_lon),
        ];
        for (field, value) in lon_fields {
            if !(-180.0..=180.0).contains(&value) {
                return Err(BboxError::OutOfRange { field, value });
            }
        }

        let lat_fields = [
            (BboxField::MinLat, self.min_lat),
            (BboxField::MaxLat, self.max_lat),
        ];
        for (field, value) in lat_fields {
            if !(-90.0..=90.0).contains(&value) {
                return Err(BboxError::OutOfRange { field, value });
            }
        }

        if self.min_lon >= self.max_lon {
            return Err(BboxError::InvertedLongitude);
        }
        if self.min_lat >= self.max_lat {
            return Err(BboxError::InvertedLatitude);
        }

        let area = self.area();
        if area > settings::region::MAX_AREA {
            return Err(BboxError::TooLarge {
                area,
                limit: settings::region::MAX_AREA,
            });
        }

        Ok(())
    }

    /// Query-string form used by the OSM API: `min_lon,min_lat,max_lon,max_lat`
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

impl FromStr for BoundingBox {
    type Err = BboxError;

    /// Parse `min_lon,min_lat,max_lon,max_lat` and validate it
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxError::WrongArity(parts.len()));
        }

        let fields = [
            BboxField::MinLon,
            BboxField::MinLat,
            BboxField::MaxLon,
            BboxField::MaxLat,
        ];
        let mut values = [0.0; 4];
        for ((slot, text), field) in values.iter_mut().zip(&parts).zip(fields) {
            *slot = text.parse::<f64>().map_err(|_| BboxError::NotANumber {
                field,
                text: text.to_string(),
            })?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_box() {
        let bbox = BoundingBox::new(-0.1, 51.5, -0.09, 51.51).unwrap();
        assert!(bbox.area() < 0.25);
        assert_eq!(bbox.to_query(), "-0.1,51.5,-0.09,51.51");
    }

    #[test]
    fn test_rejects_inverted_longitude() {
        let err = BoundingBox::new(0.2, 51.0, 0.1, 51.1).unwrap_err();
        assert_eq!(err, BboxError::InvertedLongitude);
        assert_eq!(err.field(), Some(BboxField::MaxLon));

        // Equal bounds count as inverted
        assert_eq!(
            BoundingBox::new(0.1, 51.0, 0.1, 51.1).unwrap_err(),
            BboxError::InvertedLongitude
        );
    }

    #[test]
    fn test_rejects_inverted_latitude() {
        assert_eq!(
            BoundingBox::new(0.0, 51.1, 0.1, 51.0).unwrap_err(),
            BboxError::InvertedLatitude
        );
        assert_eq!(
            BoundingBox::new(0.0, 51.0, 0.1, 51.0).unwrap_err(),
            BboxError::InvertedLatitude
        );
    }

    #[test]
    fn test_rejects_large_area() {
        let err = BoundingBox::new(0.0, 0.0, 0.6, 0.5).unwrap_err();
        assert!(matches!(err, BboxError::TooLarge { .. }));
        assert_eq!(err.field(), None);

        // Exactly at the limit is accepted
        assert!(BoundingBox::new(0.0, 0.0, 0.5, 0.5).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = BoundingBox::new(-181.0, 0.0, -180.0, 0.1).unwrap_err();
        assert_eq!(
            err,
            BboxError::OutOfRange {
                field: BboxField::MinLon,
                value: -181.0
            }
        );

        let err = BoundingBox::new(0.0, 89.9, 0.1, 90.5).unwrap_err();
        assert_eq!(err.field(), Some(BboxField::MaxLat));
    }

    #[test]
    fn test_parse_region_string() {
        let bbox: BoundingBox = " -0.1, 51.5 ,-0.09,51.51".parse().unwrap();
        assert_eq!(bbox.min_lon, -0.1);
        assert_eq!(bbox.max_lat, 51.51);

        assert_eq!(
            "1,2,3".parse::<BoundingBox>().unwrap_err(),
            BboxError::WrongArity(3)
        );
        let err = "a,51.5,-0.09,51.51".parse::<BoundingBox>().unwrap_err();
        assert_eq!(err.field(), Some(BboxField::MinLon));
    }
}
