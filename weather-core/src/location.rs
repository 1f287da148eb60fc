use std::{fmt, str::FromStr};

/// A single position fix, e.g. from a device or a geocoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl FromStr for Coordinate {
    type Err = anyhow::Error;

    /// Parses `"lat,lon"`, e.g. `"59.94,30.31"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("Expected coordinates as LAT,LON, got '{s}'"))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid latitude '{}'", lat.trim()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid longitude '{}'", lon.trim()))?;

        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("Latitude {latitude} is out of range -90..90");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("Longitude {longitude} is out of range -180..180");
        }

        Ok(Self::new(latitude, longitude))
    }
}

/// Where to fetch weather for: exact coordinates or a free-text place name.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Precise { latitude: f64, longitude: f64 },
    Address { text: String },
}

impl Location {
    pub fn address(text: impl Into<String>) -> Self {
        Location::Address { text: text.into() }
    }

    /// The coordinate of a precise location.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Location::Precise {
                latitude,
                longitude,
            } => Some(Coordinate::new(*latitude, *longitude)),
            Location::Address { .. } => None,
        }
    }

    /// Human-readable label for display next to the temperature.
    ///
    /// Coordinates are shown as numbers; a place name for them comes from
    /// reverse geocoding, see [`crate::geocode::Geocoder::reverse_geocode`].
    pub fn label(&self) -> String {
        match self {
            Location::Precise {
                latitude,
                longitude,
            } => format!("{latitude:.4}, {longitude:.4}"),
            Location::Address { text } => text.clone(),
        }
    }
}

impl From<Coordinate> for Location {
    fn from(c: Coordinate) -> Self {
        Location::Precise {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Picks the location to use from one batch of position updates.
///
/// Fixes arrive oldest first; everything but the last one is superseded.
pub fn latest_fix(batch: &[Coordinate]) -> Option<Location> {
    batch.last().copied().map(Location::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_fix_uses_last_coordinate() {
        let batch = [Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)];
        assert_eq!(latest_fix(&batch), Some(Location::from(batch[1])));
    }

    #[test]
    fn latest_fix_of_empty_batch_is_none() {
        assert_eq!(latest_fix(&[]), None);
    }

    #[test]
    fn labels() {
        let precise = Location::from(Coordinate::new(47.6062, -122.3321));
        assert_eq!(precise.label(), "47.6062, -122.3321");

        let address = Location::address("Saint Petersburg");
        assert_eq!(address.label(), "Saint Petersburg");
        assert_eq!(address.to_string(), "Saint Petersburg");
    }

    #[test]
    fn coordinate_of_location() {
        let precise = Location::from(Coordinate::new(1.5, -2.5));
        assert_eq!(precise.coordinate(), Some(Coordinate::new(1.5, -2.5)));
        assert_eq!(Location::address("Oslo").coordinate(), None);
    }

    #[test]
    fn parse_coordinate() {
        let c: Coordinate = " 59.94 , 30.31 ".parse().expect("valid coordinate");
        assert_eq!(c, Coordinate::new(59.94, 30.31));
    }

    #[test]
    fn parse_coordinate_rejects_garbage() {
        assert!("59.94".parse::<Coordinate>().is_err());
        assert!("north,30".parse::<Coordinate>().is_err());

        let err = "91,0".parse::<Coordinate>().unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = "0,-180.5".parse::<Coordinate>().unwrap_err();
        assert!(err.to_string().contains("Longitude"));
    }
}
