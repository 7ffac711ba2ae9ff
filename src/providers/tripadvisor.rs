//! Tripadvisor Content API location records.
//!
//! A dump entry is the location details object with its reviews inlined under
//! `reviews`. Numeric fields arrive as strings from the API, so they are read
//! leniently.

use serde::{Deserialize, Deserializer};

use crate::models::{Atmosphere, Contact, Features, Place, PriceLevel, Review, UNKNOWN_RATING};
use crate::services::merge_list_unique;

const ACCESSIBILITY_OPTIONS: &[&str] = &["Wheelchair Accessible"];
const CARD_PAYMENT_OPTIONS: &[&str] = &[
    "American Express",
    "Accepts Credit Cards",
    "Mastercard",
    "Visa",
    "Digital Payments",
];
const ALCOHOL_SERVING_OPTIONS: &[&str] = &["Serves Alcohol", "Wine and Beer", "Full Bar"];
const WIFI_OPTIONS: &[&str] = &["Free Wifi"];
const RESERVABLE_OPTIONS: &[&str] = &["Reservations"];
const SEATING_OPTIONS: &[&str] = &["Seating", "Outdoor Seating", "Sit down"];
const DOG_FRIENDLY_OPTIONS: &[&str] = &["Dog Friendly"];
const PARKING_OPTIONS: &[&str] = &["Parking Available"];
const TAKEOUT_OPTIONS: &[&str] = &["Takeout"];

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Number(n)) => Some(n),
        Some(Lenient::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => format!("{}", n as i64),
        Lenient::Text(s) => s,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
    pub localized_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressObj {
    #[serde(default)]
    pub address_string: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripadvisorReview {
    #[serde(default)]
    pub lang: String,
    pub published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Location details plus reviews.
#[derive(Debug, Clone, Deserialize)]
pub struct TripadvisorLocation {
    #[serde(deserialize_with = "lenient_id")]
    pub location_id: String,
    #[serde(default)]
    pub name: String,
    pub website: Option<String>,
    pub web_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub address_obj: AddressObj,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub num_reviews: Option<f64>,
    /// Dollar brackets, possibly a range like `"$$ - $$$"`.
    #[serde(default)]
    pub price_level: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub subcategory: Vec<Named>,
    #[serde(default)]
    pub cuisine: Vec<Named>,
    #[serde(default)]
    pub trip_types: Vec<Named>,
    #[serde(default)]
    pub reviews: Vec<TripadvisorReview>,
}

fn localized(names: &[Named]) -> impl Iterator<Item = &str> {
    names.iter().filter_map(|n| n.localized_name.as_deref())
}

/// Parses `"$$ - $$$"` into every bracket it spans.
pub fn parse_price_levels(raw: &str) -> Vec<PriceLevel> {
    let levels: Vec<PriceLevel> = raw.split('-').map(PriceLevel::from_dollars).collect();
    merge_list_unique(&levels, &[])
}

impl TripadvisorLocation {
    /// Feature labels together with subcategory names.
    fn all_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain(localized(&self.subcategory))
            .collect()
    }

    fn features(&self) -> Features {
        let labels = self.all_features();
        let has = |options: &[&str]| options.iter().any(|o| labels.contains(o));

        Features {
            credit_card: has(CARD_PAYMENT_OPTIONS),
            serve_alcohol: has(ALCOHOL_SERVING_OPTIONS),
            is_accessible: has(ACCESSIBILITY_OPTIONS),
            takeout: has(TAKEOUT_OPTIONS),
            seating: has(SEATING_OPTIONS),
            wifi: has(WIFI_OPTIONS),
            reservation: has(RESERVABLE_OPTIONS),
            parking: has(PARKING_OPTIONS),
            dog_allowed: has(DOG_FRIENDLY_OPTIONS),
        }
    }

    fn atmospheres(&self) -> Vec<Atmosphere> {
        let atmospheres: Vec<Atmosphere> = localized(&self.trip_types)
            .map(Atmosphere::from_trip_type)
            .filter(|a| *a != Atmosphere::Unknown)
            .collect();
        merge_list_unique(&atmospheres, &[])
    }
}

impl From<TripadvisorLocation> for Place {
    fn from(location: TripadvisorLocation) -> Self {
        let features = location.features();
        let atmosphere_target = location.atmospheres();
        let types: Vec<String> = localized(&location.cuisine).map(String::from).collect();
        let tripadvisor_uri = location.web_url.clone().filter(|u| !u.is_empty());

        let contact = Contact {
            phone: location.phone.unwrap_or_default(),
            email: location.email.unwrap_or_default(),
            website: location.website.unwrap_or_default(),
            address: location.address_obj.address_string,
            gmaps_uri: None,
            specific_uri: tripadvisor_uri.clone().unwrap_or_default(),
            tripadvisor_uri,
        };

        let reviews = location
            .reviews
            .into_iter()
            .map(|review| Review {
                rating: review.rating.unwrap_or(UNKNOWN_RATING),
                lang: review.lang,
                title: review.title,
                content: review.text,
                publication_date: Review::parse_date(review.published_date.as_deref()),
            })
            .collect();

        Place {
            id: location.location_id,
            name: location.name,
            rating: location.rating.unwrap_or(UNKNOWN_RATING),
            types: merge_list_unique(&types, &[]),
            price_level: parse_price_levels(&location.price_level),
            atmosphere_target,
            contact,
            features,
            reviews,
            number_of_reviews: location.num_reviews.map_or(0, |n| n.max(0.0) as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderSource;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "location_id": "1234",
            "name": "Le Bistrot",
            "web_url": "https://www.tripadvisor.com/Restaurant_Review-1234",
            "phone": "+33 1 23 45 67 89",
            "address_obj": {"address_string": "1 rue X, 75001 Paris"},
            "rating": "4.5",
            "num_reviews": "87",
            "price_level": "$$ - $$$",
            "features": ["Reservations", "Free Wifi", "Visa"],
            "subcategory": [{"name": "sit_down", "localized_name": "Sit down"}],
            "cuisine": [{"name": "french", "localized_name": "French"}, {"name": "french", "localized_name": "French"}],
            "trip_types": [
                {"name": "couples", "localized_name": "Couples", "value": "12"},
                {"name": "solo", "localized_name": "Solo travel", "value": "3"}
            ],
            "reviews": [
                {"lang": "en", "published_date": "2023-06-10T15:09:48Z", "rating": 5, "title": "Great", "text": "Lovely dinner", "url": "https://..."}
            ]
        })
    }

    #[test]
    fn test_convert_location() {
        let location: TripadvisorLocation = serde_json::from_value(sample()).unwrap();
        let place = Place::from(location);

        assert_eq!(place.id, "1234");
        assert_eq!(place.rating, 4.5);
        assert_eq!(place.number_of_reviews, 87);
        assert_eq!(place.types, vec!["French"]);
        assert_eq!(place.price_level, vec![PriceLevel::Medium, PriceLevel::High]);
        assert_eq!(place.atmosphere_target, vec![Atmosphere::Couples, Atmosphere::Solo]);
        assert!(place.features.reservation);
        assert!(place.features.wifi);
        assert!(place.features.credit_card);
        assert!(place.features.seating);
        assert!(!place.features.parking);
        assert_eq!(place.contact.address, "1 rue X, 75001 Paris");
        assert_eq!(place.provider(), ProviderSource::Tripadvisor);
        assert_eq!(place.reviews[0].title, "Great");
        assert!(place.is_exploitable());
    }

    #[test]
    fn test_numeric_location_id() {
        let location: TripadvisorLocation =
            serde_json::from_value(json!({"location_id": 987, "name": "X"})).unwrap();
        let place = Place::from(location);
        assert_eq!(place.id, "987");
        assert_eq!(place.rating, UNKNOWN_RATING);
        assert_eq!(place.price_level, vec![PriceLevel::Unknown]);
        assert!(!place.is_exploitable());
    }

    #[test]
    fn test_parse_price_levels() {
        assert_eq!(parse_price_levels("$"), vec![PriceLevel::Low]);
        assert_eq!(parse_price_levels(""), vec![PriceLevel::Unknown]);
        assert_eq!(
            parse_price_levels("$$$ - $$$$"),
            vec![PriceLevel::High, PriceLevel::VeryHigh]
        );
    }
}
