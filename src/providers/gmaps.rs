//! Google Maps Places (v1) records.
//!
//! Only the fields the merge engine uses are modelled; everything else in the
//! response is ignored.

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{Atmosphere, Contact, Features, Place, PriceLevel, Review, UNKNOWN_RATING};
use crate::services::merge_list_unique;

const ACCESSIBILITY_OPTIONS: [&str; 4] = [
    "wheelchairAccessibleParking",
    "wheelchairAccessibleEntrance",
    "wheelchairAccessibleRestroom",
    "wheelchairAccessibleSeating",
];
const CARD_PAYMENT_OPTIONS: [&str; 3] = ["acceptsCreditCards", "acceptsDebitCards", "acceptsNfc"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmapsReview {
    pub rating: Option<f64>,
    pub text: Option<LocalizedText>,
    pub publish_time: Option<String>,
}

/// A place as returned by `places:searchNearby`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmapsPlace {
    pub id: String,
    pub display_name: Option<LocalizedText>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    pub primary_type: Option<String>,
    pub price_level: Option<String>,
    pub international_phone_number: Option<String>,
    pub national_phone_number: Option<String>,
    #[serde(alias = "websiteUri")]
    pub website: Option<String>,
    pub formatted_address: Option<String>,
    pub google_maps_uri: Option<String>,
    pub reservable: Option<bool>,
    pub takeout: Option<bool>,
    pub dine_in: Option<bool>,
    pub outdoor_seating: Option<bool>,
    pub allows_dogs: Option<bool>,
    pub serves_beer: Option<bool>,
    pub serves_wine: Option<bool>,
    pub serves_cocktails: Option<bool>,
    pub good_for_children: Option<bool>,
    pub good_for_groups: Option<bool>,
    pub good_for_watching_sports: Option<bool>,
    #[serde(default)]
    pub payment_options: HashMap<String, bool>,
    #[serde(default)]
    pub accessibility_options: HashMap<String, bool>,
    #[serde(default)]
    pub reviews: Vec<GmapsReview>,
}

fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}

fn any_option(options: &HashMap<String, bool>, keys: &[&str]) -> bool {
    keys.iter().any(|k| options.get(*k).copied().unwrap_or(false))
}

impl GmapsPlace {
    fn features(&self) -> Features {
        Features {
            credit_card: any_option(&self.payment_options, &CARD_PAYMENT_OPTIONS),
            serve_alcohol: flag(self.serves_beer)
                || flag(self.serves_wine)
                || flag(self.serves_cocktails),
            is_accessible: any_option(&self.accessibility_options, &ACCESSIBILITY_OPTIONS),
            takeout: flag(self.takeout),
            seating: flag(self.dine_in) || flag(self.outdoor_seating),
            wifi: false,
            reservation: flag(self.reservable),
            parking: false,
            dog_allowed: flag(self.allows_dogs),
        }
    }

    fn atmospheres(&self) -> Vec<Atmosphere> {
        [
            (self.good_for_children, Atmosphere::Family),
            (self.good_for_groups, Atmosphere::Groups),
            (self.good_for_watching_sports, Atmosphere::Sport),
        ]
        .into_iter()
        .filter(|(value, _)| flag(*value))
        .map(|(_, atmosphere)| atmosphere)
        .collect()
    }

    fn tags(&self) -> Vec<String> {
        let primary: Vec<String> = self.primary_type.iter().cloned().collect();
        merge_list_unique(&self.types, &primary)
    }
}

impl From<GmapsPlace> for Place {
    fn from(gmaps: GmapsPlace) -> Self {
        let features = gmaps.features();
        let atmosphere_target = gmaps.atmospheres();
        let types = gmaps.tags();
        let gmaps_uri = gmaps.google_maps_uri.clone().filter(|u| !u.is_empty());

        let contact = Contact {
            phone: gmaps
                .international_phone_number
                .or(gmaps.national_phone_number)
                .unwrap_or_default(),
            email: String::new(),
            website: gmaps.website.unwrap_or_default(),
            address: gmaps.formatted_address.unwrap_or_default(),
            specific_uri: gmaps_uri.clone().unwrap_or_default(),
            gmaps_uri,
            tripadvisor_uri: None,
        };

        // Reviews without a text body carry nothing worth merging.
        let reviews = gmaps
            .reviews
            .into_iter()
            .filter_map(|review| {
                let text = review.text?;
                Some(Review {
                    rating: review.rating.unwrap_or(UNKNOWN_RATING),
                    lang: text.language_code,
                    title: String::new(),
                    content: text.text,
                    publication_date: Review::parse_date(review.publish_time.as_deref()),
                })
            })
            .collect();

        Place {
            id: gmaps.id,
            name: gmaps.display_name.map(|n| n.text).unwrap_or_default(),
            rating: gmaps.rating.unwrap_or(UNKNOWN_RATING),
            types,
            price_level: vec![PriceLevel::from_gmaps(
                gmaps.price_level.as_deref().unwrap_or_default(),
            )],
            atmosphere_target,
            contact,
            features,
            reviews,
            number_of_reviews: gmaps.user_rating_count.unwrap_or(0),
        }
    }
}
