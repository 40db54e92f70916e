use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};

use crate::models::{ApiError, PropertyRecord, SimilarHome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_healthy_yield() {
        // $2,500/mo on $500k is a 6% annual yield.
        let score = good_buy_score(500_000.0, 2_500.0);
        assert_eq!(score, 72);
        assert!((40..=98).contains(&score));
        assert_eq!(verdict(score), "Good Buy");
    }

    #[test]
    fn test_score_near_zero_yield_hits_floor() {
        let score = good_buy_score(2_000_000.0, 100.0);
        assert_eq!(score, 40);
        assert_eq!(verdict(score), "Neutral");
    }

    #[test]
    fn test_score_extreme_yield_hits_ceiling() {
        assert_eq!(good_buy_score(100_000.0, 5_000.0), 98);
    }

    #[test]
    fn test_score_zero_price_is_floor() {
        assert_eq!(good_buy_score(0.0, 2_500.0), 40);
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(verdict(98), "Strong Buy");
        assert_eq!(verdict(81), "Strong Buy");
        assert_eq!(verdict(80), "Good Buy");
        assert_eq!(verdict(71), "Good Buy");
        assert_eq!(verdict(70), "Neutral");
        assert_eq!(verdict(40), "Neutral");
    }

    #[test]
    fn test_zillow_url_formatting() {
        assert_eq!(
            zillow_url("123 Main St, San Francisco, CA"),
            "https://www.zillow.com/homes/123-Main-St-San-Francisco-CA_rb/"
        );
    }

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(format_usd(1_234_567.0), "$1,234,567");
        assert_eq!(format_usd(2_500.0), "$2,500");
        assert_eq!(format_usd(950.0), "$950");
    }

    #[test]
    fn test_mock_property_is_plausible() {
        let record = mock_property("45 Sunset Blvd");

        assert_eq!(record.address, "45 Sunset Blvd");
        assert!((60..95).contains(&record.good_buy_score));
        assert!((1..=10).contains(&record.school_rating));
        assert_eq!(record.similar.len(), 3);
        assert!(record.price.starts_with('$'));
        assert!(record.rent.ends_with("/mo"));
        assert!(!record.verdict.is_empty());
    }

    #[test]
    fn test_mock_property_carries_demo_texture() {
        let record = mock_property("45 Sunset Blvd");

        // Demo mode ships its own verdict blurbs, not the live ones.
        assert_eq!(record.verdict_desc, mock_verdict_desc(record.good_buy_score));
        assert_ne!(record.verdict_desc, verdict_desc(69));

        // Each canned similar home gets its own photo.
        let images: Vec<_> = record.similar.iter().map(|h| h.image.as_str()).collect();
        assert_eq!(images.len(), 3);
        assert_ne!(images[0], images[1]);
        assert_ne!(images[1], images[2]);
        assert_ne!(images[0], images[2]);
    }

    #[test]
    fn test_map_provider_payload() {
        let payload = json!({
            "data": {
                "price": 750000,
                "rentZestimate": 3200,
                "homeStatus": "For Sale",
                "livingArea": 1850,
                "lotSize": 0.3,
                "schools": [{ "rating": 9 }],
                "similarHomes": [
                    { "address": "1 Elm St", "price": 700000, "imgSrc": "https://example.com/a.jpg" },
                    { "address": "2 Elm St", "price": 710000 },
                ]
            }
        });

        let record = map_provider_response(&payload, "5 Oak Ave");

        assert_eq!(record.address, "5 Oak Ave");
        assert_eq!(record.price, "$750,000");
        assert_eq!(record.rent, "$3,200/mo");
        assert_eq!(record.school_rating, 9);
        assert_eq!(record.area, "1850 sqft");
        assert_eq!(record.lot_size, "0.3 acres");
        assert_eq!(record.good_buy_score, good_buy_score(750_000.0, 3_200.0));
        assert_eq!(record.similar.len(), 2);
        assert_eq!(record.similar[0].price, "$700,000");
        // Missing image falls back to the stock photo.
        assert_eq!(record.similar[1].image, FALLBACK_IMAGE);
    }

    #[test]
    fn test_map_provider_payload_defaults() {
        let record = map_provider_response(&json!({}), "5 Oak Ave");

        assert_eq!(record.price, "$0");
        assert_eq!(record.school_rating, 8);
        assert_eq!(record.area, "2000 sqft");
        assert_eq!(record.lot_size, "0.25 acres");
        assert!(record.similar.is_empty());
    }

    #[test]
    fn test_map_provider_payload_zestimate_fallback() {
        let payload = json!({ "data": { "zestimate": 600000 } });
        let record = map_provider_response(&payload, "5 Oak Ave");

        assert_eq!(record.price, "$600,000");
        // Rent falls back to 0.5% of price.
        assert_eq!(record.rent, "$3,000/mo");
    }
}

const HASDATA_ENDPOINT: &str = "https://api.hasdata.com/scrape/zillow/property";
const FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?auto=format&fit=crop&q=80";

/// 0-100 "good buy" score from estimated annual rental yield.
/// Deterministic: score = clamp(round(rent*12/price*100*12), 40, 98).
pub fn good_buy_score(price: f64, rent: f64) -> u32 {
    if price <= 0.0 {
        return 40;
    }
    let annual_yield = rent * 12.0 / price * 100.0;
    (annual_yield * 12.0).round().clamp(40.0, 98.0) as u32
}

pub fn verdict(score: u32) -> &'static str {
    if score > 80 {
        "Strong Buy"
    } else if score > 70 {
        "Good Buy"
    } else {
        "Neutral"
    }
}

pub fn verdict_desc(score: u32) -> &'static str {
    if score > 80 {
        "Excellent rental yield potential with strong appreciation prospects."
    } else if score > 70 {
        "Solid investment opportunity with stable expected returns."
    } else {
        "Market value is high relative to rental income. Consider negotiation."
    }
}

/// "123 Main St, San Francisco, CA" -> ".../123-Main-St-San-Francisco-CA_rb/"
pub fn zillow_url(address: &str) -> String {
    let slug = address
        .replace(',', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("https://www.zillow.com/homes/{slug}_rb/")
}

/// Render a dollar amount with thousands separators, no cents.
fn format_usd(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

/// Synthesize plausible demo data when no provider credential is configured.
pub fn mock_property(address: &str) -> PropertyRecord {
    let mut rng = rand::rng();

    let price = rng.random_range(500_000..2_000_000) as f64;
    let rent = (price * 0.005).floor();
    let score = rng.random_range(60..95);

    let similar = [
        (
            "124 Maple Ave",
            0.9,
            "https://images.unsplash.com/photo-1570129477492-45c003edd2be?auto=format&fit=crop&q=80",
        ),
        (
            "892 Oak Lane",
            1.1,
            "https://images.unsplash.com/photo-1568605114967-8130f3a36994?auto=format&fit=crop&q=80",
        ),
        (
            "45 Sunset Blvd",
            1.05,
            "https://images.unsplash.com/photo-1572120360610-d971b9d7767c?auto=format&fit=crop&q=80",
        ),
    ];

    PropertyRecord {
        address: address.to_string(),
        price: format_usd(price),
        status: "For Sale".to_string(),
        rent: format!("{}/mo", format_usd(rent)),
        school_rating: rng.random_range(1..=10),
        area: format!("{} sqft", rng.random_range(1_500..4_000)),
        lot_size: format!("{:.2} acres", rng.random_range(0.10..0.50)),
        good_buy_score: score,
        verdict: verdict(score).to_string(),
        verdict_desc: mock_verdict_desc(score).to_string(),
        similar: similar
            .iter()
            .enumerate()
            .map(|(i, (addr, factor, image))| SimilarHome {
                id: i as u32 + 1,
                address: addr.to_string(),
                price: format_usd(price * factor),
                image: image.to_string(),
            })
            .collect(),
    }
}

/// The demo-mode verdict blurbs, looser than the live ones.
fn mock_verdict_desc(score: u32) -> &'static str {
    if score > 80 {
        "This property shows excellent rental yield potential and is in a high-growth neighborhood."
    } else {
        "Solid property but watch out for slightly higher than average property taxes in this area."
    }
}

/// Remap the provider payload into the fixed display schema, falling back
/// to reasonable estimates where the scrape came back sparse.
pub fn map_provider_response(payload: &Value, address: &str) -> PropertyRecord {
    let property = payload.get("data").unwrap_or(payload);

    let price = property["price"]
        .as_f64()
        .or_else(|| property["zestimate"].as_f64())
        .unwrap_or(0.0);
    let rent = property["rentZestimate"].as_f64().unwrap_or(price * 0.005);

    let school_rating = match property["schools"].as_array() {
        Some(schools) => schools
            .first()
            .and_then(|s| s["rating"].as_u64())
            .unwrap_or(7) as u8,
        None => 8,
    };

    let lot_size = match property["lotSize"].as_f64() {
        Some(acres) => format!("{acres} acres"),
        None => "0.25 acres".to_string(),
    };

    let score = good_buy_score(price, rent);

    let similar = property["similarHomes"]
        .as_array()
        .map(|homes| {
            homes
                .iter()
                .take(3)
                .enumerate()
                .map(|(i, home)| SimilarHome {
                    id: i as u32,
                    address: home["address"].as_str().unwrap_or_default().to_string(),
                    price: format_usd(home["price"].as_f64().unwrap_or(0.0)),
                    image: home["imgSrc"]
                        .as_str()
                        .unwrap_or(FALLBACK_IMAGE)
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    PropertyRecord {
        address: property["address"]
            .as_str()
            .unwrap_or(address)
            .to_string(),
        price: format_usd(price),
        status: property["homeStatus"]
            .as_str()
            .unwrap_or("For Sale")
            .to_string(),
        rent: format!("{}/mo", format_usd(rent)),
        school_rating,
        area: format!(
            "{} sqft",
            property["livingArea"].as_u64().unwrap_or(2_000)
        ),
        lot_size,
        good_buy_score: score,
        verdict: verdict(score).to_string(),
        verdict_desc: verdict_desc(score).to_string(),
        similar,
    }
}

/// Thin client for the property-data scrape provider.
pub struct HasDataClient {
    http: Client,
    api_key: String,
}

impl HasDataClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    pub async fn lookup(&self, address: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(HASDATA_ENDPOINT)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "url": zillow_url(address) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "Property lookup failed: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
