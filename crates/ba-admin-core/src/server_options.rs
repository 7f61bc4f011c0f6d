//! Known Nacos servers offered in the address dropdown.

use ba_api_types::NacosServerOption;
use chrono::{DateTime, NaiveDateTime};

/// Sort key in epoch milliseconds. Missing or unparseable times count as 0.
pub fn modified_at_ms(option: &NacosServerOption) -> i64 {
    match &option.last_modified_time {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(serde_json::Value::String(s)) => parse_time(s).unwrap_or_default(),
        _ => 0,
    }
}

fn parse_time(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Drop entries without an address and order the rest newest first.
pub fn prepare_options(mut options: Vec<NacosServerOption>) -> Vec<NacosServerOption> {
    options.retain(|o| address(o).is_some());
    options.sort_by_key(|o| std::cmp::Reverse(modified_at_ms(o)));
    options
}

pub fn address(option: &NacosServerOption) -> Option<&str> {
    option
        .server_addresses
        .as_deref()
        .filter(|a| !a.trim().is_empty())
}

/// Headline shown for an option: data id, then name, then the address.
pub fn title(option: &NacosServerOption) -> &str {
    [&option.data_id, &option.name]
        .into_iter()
        .find_map(|v| v.as_deref().filter(|s| !s.is_empty()))
        .or_else(|| address(option))
        .unwrap_or_default()
}

pub fn namespace_label(option: &NacosServerOption) -> &str {
    option
        .namespace
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("default namespace")
}

pub fn env_label(option: &NacosServerOption) -> &str {
    option
        .env
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("default")
}

/// Badge colour class for an environment tag.
pub fn env_badge_color(env: Option<&str>) -> &'static str {
    match env {
        Some("production") => "success",
        Some("development") => "primary",
        Some("test") => "warning",
        _ => "secondary",
    }
}

pub fn contains_address(options: &[NacosServerOption], server_address: &str) -> bool {
    options
        .iter()
        .any(|o| o.server_addresses.as_deref() == Some(server_address))
}

/// Case-insensitive match of the typed text against an option's visible text.
pub fn matches_filter(option: &NacosServerOption, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {} {} {}",
        title(option),
        address(option).unwrap_or_default(),
        namespace_label(option),
        env_label(option)
    )
    .to_lowercase();
    haystack.contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(addr: &str, modified: serde_json::Value) -> NacosServerOption {
        NacosServerOption {
            server_addresses: Some(addr.to_owned()),
            last_modified_time: Some(modified),
            ..Default::default()
        }
    }

    #[test]
    fn newest_first_with_missing_times_last() {
        let options = vec![
            option("old", json!("2023-01-01 08:00:00")),
            NacosServerOption {
                server_addresses: Some("undated".into()),
                ..Default::default()
            },
            option("new", json!("2024-06-01T10:00:00Z")),
            option("numeric", json!(1_690_000_000_000_i64)),
            option("garbage", json!("yesterday")),
        ];
        let sorted: Vec<String> = prepare_options(options)
            .into_iter()
            .filter_map(|o| o.server_addresses)
            .collect();
        assert_eq!(sorted[0], "new");
        assert_eq!(sorted[1], "numeric");
        assert_eq!(sorted[2], "old");
        assert!(sorted[3..].contains(&"undated".to_string()));
        assert!(sorted[3..].contains(&"garbage".to_string()));
    }

    #[test]
    fn options_without_address_are_dropped() {
        let options = vec![
            option("", json!(0)),
            NacosServerOption::default(),
            option("10.0.0.1", json!(0)),
        ];
        assert_eq!(prepare_options(options).len(), 1);
    }

    #[test]
    fn labels_fall_back() {
        let mut o = option("10.0.0.1", json!(0));
        assert_eq!(title(&o), "10.0.0.1");
        assert_eq!(namespace_label(&o), "default namespace");
        assert_eq!(env_label(&o), "default");
        o.name = Some("billing".into());
        assert_eq!(title(&o), "billing");
        o.data_id = Some("gateway.yaml".into());
        assert_eq!(title(&o), "gateway.yaml");
    }

    #[test]
    fn badge_colors() {
        assert_eq!(env_badge_color(Some("production")), "success");
        assert_eq!(env_badge_color(Some("test")), "warning");
        assert_eq!(env_badge_color(Some("staging")), "secondary");
        assert_eq!(env_badge_color(None), "secondary");
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut o = option("10.0.0.1", json!(0));
        o.env = Some("Production".into());
        assert!(matches_filter(&o, "prod"));
        assert!(matches_filter(&o, "10.0"));
        assert!(matches_filter(&o, ""));
        assert!(!matches_filter(&o, "staging"));
    }
}
