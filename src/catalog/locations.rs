//! Country → province → city tables behind the checkout address selectors.

use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub dial: String,
}

#[derive(Clone, Debug, Default)]
pub struct Locations {
    countries: Vec<Country>,
    provinces: HashMap<String, Vec<String>>,
    cities: HashMap<String, Vec<String>>,
}

const COUNTRIES: &[(&str, &str, &str)] = &[
    ("ID", "Indonesia", "+62"),
    ("SG", "Singapore", "+65"),
    ("MY", "Malaysia", "+60"),
];

const PROVINCES: &[(&str, &[&str])] = &[
    ("ID", &["DKI Jakarta", "Jawa Barat", "Jawa Tengah", "Jawa Timur", "DI Yogyakarta", "Banten", "Bali"]),
    ("SG", &["Central", "East", "North", "North-East", "West"]),
    ("MY", &["Kuala Lumpur", "Selangor", "Johor", "Penang", "Perak"]),
];

const CITIES: &[(&str, &[&str])] = &[
    ("DKI Jakarta", &["Jakarta Pusat", "Jakarta Selatan", "Jakarta Timur", "Jakarta Barat", "Jakarta Utara"]),
    ("Jawa Barat", &["Bandung", "Bekasi", "Depok", "Bogor"]),
    ("Jawa Tengah", &["Semarang", "Solo", "Magelang"]),
    ("Jawa Timur", &["Surabaya", "Malang", "Sidoarjo"]),
    ("DI Yogyakarta", &["Yogyakarta", "Sleman", "Bantul"]),
    ("Banten", &["Tangerang", "Serang", "Cilegon"]),
    ("Bali", &["Denpasar", "Badung"]),
    ("Central", &["Novena", "Orchard"]),
    ("East", &["Tampines", "Bedok"]),
    ("North", &["Woodlands", "Yishun"]),
    ("North-East", &["Serangoon", "Hougang"]),
    ("West", &["Jurong East", "Clementi"]),
    ("Kuala Lumpur", &["Bukit Bintang", "Cheras"]),
    ("Selangor", &["Shah Alam", "Petaling Jaya"]),
    ("Johor", &["Johor Bahru", "Batu Pahat"]),
    ("Penang", &["George Town", "Bayan Lepas"]),
    ("Perak", &["Ipoh", "Taiping"]),
];

fn owned(table: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    table
        .iter()
        .map(|(key, values)| (key.to_string(), values.iter().map(|v| v.to_string()).collect()))
        .collect()
}

impl Locations {
    pub fn builtin() -> Self {
        Self {
            countries: COUNTRIES
                .iter()
                .map(|(code, name, dial)| Country { code: code.to_string(), name: name.to_string(), dial: dial.to_string() })
                .collect(),
            provinces: owned(PROVINCES),
            cities: owned(CITIES),
        }
    }

    pub fn countries(&self) -> &[Country] { &self.countries }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.code == code)
    }

    /// Unknown countries have no provinces.
    pub fn provinces(&self, country: &str) -> &[String] {
        self.provinces.get(country).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Unknown provinces have no cities.
    pub fn cities(&self, province: &str) -> &[String] {
        self.cities.get(province).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_province(&self, country: &str, province: &str) -> bool {
        self.provinces(country).iter().any(|p| p == province)
    }

    pub fn has_city(&self, province: &str, city: &str) -> bool {
        self.cities(province).iter().any(|c| c == city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade() {
        let loc = Locations::builtin();
        assert_eq!(loc.countries().len(), 3);
        assert_eq!(loc.country("SG").map(|c| c.dial.as_str()), Some("+65"));
        assert_eq!(loc.provinces("ID").len(), 7);
        assert_eq!(loc.cities("Bali"), &["Denpasar".to_string(), "Badung".to_string()]);
        assert!(loc.provinces("XX").is_empty());
        assert!(loc.cities("Atlantis").is_empty());
    }

    #[test]
    fn test_consistency() {
        let loc = Locations::builtin();
        assert!(loc.has_province("ID", "Jawa Barat"));
        assert!(!loc.has_province("SG", "Jawa Barat"));
        assert!(loc.has_city("Jawa Barat", "Bandung"));
        assert!(!loc.has_city("Jawa Barat", "Surabaya"));
    }

    #[test]
    fn test_every_province_has_cities() {
        let loc = Locations::builtin();
        for country in loc.countries() {
            for province in loc.provinces(&country.code) {
                assert!(!loc.cities(province).is_empty(), "{province} has no cities");
            }
        }
    }
}
