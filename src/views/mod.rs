//! Text renderings of the feed, detail, add and list views.

pub mod detail;
pub mod draft;
pub mod feed;
pub mod list;

/// Five stars with half-star precision, e.g. `★★★½☆`.
pub fn stars(rating: f64) -> String {
    let halves = (rating.clamp(0.0, 5.0) * 2.0).round() as usize;
    let full = halves / 2;
    let half = halves % 2;
    let mut out = "★".repeat(full);
    if half == 1 {
        out.push('½');
    }
    out.push_str(&"☆".repeat(5 - full - half));
    out
}
