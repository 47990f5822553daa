//! Shared output formatting conventions.

/// Render at most `cap` items, then one summary line for the omitted rest.
pub fn capped_lines<T>(items: &[T], cap: usize, render: impl Fn(&T) -> String) -> Vec<String> {
    let mut lines: Vec<String> = items.iter().take(cap).map(&render).collect();
    if items.len() > cap {
        lines.push(format!("...AND {} MORE", items.len() - cap));
    }
    lines
}

/// Trading pair for `price`: uppercased argument, defaulting to BTCUSDT.
pub fn resolve_pair(arg: Option<&str>) -> String {
    match arg {
        Some(a) if !a.trim().is_empty() => a.trim().to_uppercase(),
        _ => "BTCUSDT".to_string(),
    }
}

/// Satoshi-denominated value in whole-coin units.
pub fn sats_to_btc(sats: i64) -> f64 {
    sats as f64 / 100_000_000.0
}

/// Whole-coin rendering with four decimals.
pub fn format_btc(sats: i64) -> String {
    format!("{:.4} BTC", sats_to_btc(sats))
}

/// Currency rendering with two decimals.
pub fn format_usd(value: f64) -> String {
    format!("${value:.2}")
}

/// Clip to `max` characters with an ellipsis marker.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let clipped: String = text.chars().take(max).collect();
        format!("{clipped}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_items_render_fifteen_plus_summary() {
        let items: Vec<String> = (0..20).map(|i| format!("sub{i}.example.com")).collect();
        let lines = capped_lines(&items, 15, |s| format!("[HOST]: {s}"));
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "[HOST]: sub0.example.com");
        assert_eq!(lines[14], "[HOST]: sub14.example.com");
        assert_eq!(lines[15], "...AND 5 MORE");
    }

    #[test]
    fn under_cap_has_no_summary_line() {
        let items = vec!["a", "b"];
        let lines = capped_lines(&items, 15, |s| s.to_string());
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn exactly_cap_has_no_summary_line() {
        let items: Vec<u32> = (0..15).collect();
        let lines = capped_lines(&items, 15, |n| n.to_string());
        assert_eq!(lines.len(), 15);
    }

    #[test]
    fn missing_pair_defaults_to_btcusdt() {
        assert_eq!(resolve_pair(None), "BTCUSDT");
        assert_eq!(resolve_pair(Some("")), "BTCUSDT");
        assert_eq!(resolve_pair(Some("  ")), "BTCUSDT");
    }

    #[test]
    fn pair_argument_is_uppercased() {
        assert_eq!(resolve_pair(Some("ethusdt")), "ETHUSDT");
        assert_eq!(resolve_pair(Some("SOLUSDT")), "SOLUSDT");
    }

    #[test]
    fn satoshi_conversion_renders_four_decimals() {
        assert_eq!(format_btc(5_000_000_000), "50.0000 BTC");
        assert_eq!(format_btc(250_000), "0.0025 BTC");
        assert_eq!(format_btc(0), "0.0000 BTC");
    }

    #[test]
    fn currency_renders_two_decimals() {
        assert_eq!(format_usd(64231.419), "$64231.42");
        assert_eq!(format_usd(0.5), "$0.50");
    }

    #[test]
    fn clip_is_char_safe() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 4), "abcd...");
    }
}
