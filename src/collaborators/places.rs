//! Google Places facility search

use crate::runtime::{CollaboratorError, Facility, FacilitySearch};
use crate::state_machine::{Department, GeoPoint};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DETAIL_FIELDS: &str = "name,vicinity,formatted_phone_number,website,opening_hours";

/// Search radius in meters
pub const SEARCH_RADIUS_M: u32 = 10_000;

/// Places provider client
pub struct GooglePlacesService {
    client: Client,
    api_key: String,
}

impl GooglePlacesService {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }

    async fn nearby(
        &self,
        location: GeoPoint,
        department: Department,
    ) -> Result<Vec<NearbyPlace>, CollaboratorError> {
        let location_param = format!("{},{}", location.latitude, location.longitude);
        let radius = SEARCH_RADIUS_M.to_string();
        let response = self
            .client
            .get(NEARBY_URL)
            .query(&[
                ("location", location_param.as_str()),
                ("radius", radius.as_str()),
                ("keyword", department.label()),
                ("type", "hospital"),
                ("language", "ja"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: NearbyResponse = parse_json(response).await?;
        body.into_places()
    }

    async fn details(&self, place_id: &str) -> Result<Facility, CollaboratorError> {
        let response = self
            .client
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("language", "ja"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: DetailsResponse = parse_json(response).await?;
        body.into_facility()
    }
}

#[async_trait]
impl FacilitySearch for GooglePlacesService {
    async fn search(
        &self,
        location: GeoPoint,
        department: Department,
    ) -> Result<Vec<Facility>, CollaboratorError> {
        tracing::info!(
            latitude = location.latitude,
            longitude = location.longitude,
            department = %department,
            radius_m = SEARCH_RADIUS_M,
            "Searching nearby facilities"
        );

        let places = match self.nearby(location, department).await {
            Ok(places) => places,
            Err(e) => {
                tracing::error!(error = %e, "Nearby search failed");
                return Ok(vec![]);
            }
        };
        tracing::info!(count = places.len(), "Nearby search returned places");

        let lookups = places.iter().map(|place| self.details(&place.place_id));
        let details = join_all(lookups).await;

        let facilities = places
            .iter()
            .zip(details)
            .filter_map(|(place, detail)| match detail {
                Ok(facility) => Some(facility),
                Err(e) => {
                    tracing::warn!(place_id = %place.place_id, error = %e, "Dropping facility, detail fetch failed");
                    None
                }
            })
            .collect();

        Ok(facilities)
    }
}

/// Stand-in used when no places API key is configured
pub struct UnconfiguredFacilitySearch;

#[async_trait]
impl FacilitySearch for UnconfiguredFacilitySearch {
    async fn search(
        &self,
        _location: GeoPoint,
        department: Department,
    ) -> Result<Vec<Facility>, CollaboratorError> {
        tracing::warn!(
            department = %department,
            "Facility search requested but GOOGLE_MAPS_API_KEY is not set"
        );
        Err(CollaboratorError::Provider(
            "places API key not configured".to_string(),
        ))
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, CollaboratorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollaboratorError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| CollaboratorError::Parse(e.to_string()))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyPlace>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    place_id: String,
}

impl NearbyResponse {
    fn into_places(self) -> Result<Vec<NearbyPlace>, CollaboratorError> {
        match self.status.as_str() {
            "OK" => Ok(self.results),
            "ZERO_RESULTS" => Ok(vec![]),
            other => Err(CollaboratorError::Provider(format!(
                "{other}: {}",
                self.error_message.unwrap_or_default()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    name: Option<String>,
    vicinity: Option<String>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

impl DetailsResponse {
    fn into_facility(self) -> Result<Facility, CollaboratorError> {
        if self.status != "OK" {
            return Err(CollaboratorError::Provider(self.status));
        }
        let details = self
            .result
            .ok_or_else(|| CollaboratorError::Parse("details without result".to_string()))?;
        let name = details
            .name
            .ok_or_else(|| CollaboratorError::Parse("place without name".to_string()))?;

        Ok(Facility {
            name,
            address: details.vicinity.unwrap_or_default(),
            phone: details.formatted_phone_number,
            website: details.website,
            opening_hours: details
                .opening_hours
                .map(|h| h.weekday_text)
                .filter(|lines| !lines.is_empty()),
        })
    }
}
