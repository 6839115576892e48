use crate::config::{AppConfig, CampaignConfig, ShopConfig};

/// Creates a valid configuration pointing the shop at `base_url`.
///
/// The campaign runs on 2024-10-01 from 00:00 to 18:00 IST with the tag
/// `sale`.
pub fn create_test_config(base_url: &str) -> AppConfig {
    AppConfig {
        shop: ShopConfig {
            name: "acme".into(),
            access_token: "shpat_test".into(),
            api_version: "2024-10".into(),
            base_url: Some(base_url.to_string()),
        },
        campaign: CampaignConfig {
            target_tags: vec!["sale".into()],
            start_date: "2024-10-01".into(),
            start_time: "00:00".into(),
            end_date: "2024-10-01".into(),
            end_time: "18:00".into(),
            timezone: "Asia/Kolkata".into(),
            ..Default::default()
        },
        ..Default::default()
    }
}
