//! Storm Prediction Center convective outlook pages.

const SPC_OUTLOOK_BASE: &str = "https://www.spc.noaa.gov/products/outlook";

/// Outlook page for day 1, 2 or 3. Other days have no categorical page.
pub fn spc_outlook_url(day: u8) -> Option<String> {
    matches!(day, 1..=3).then(|| format!("{}/day{}otlk.html", SPC_OUTLOOK_BASE, day))
}
