//! Boarding and deboarding options for a route.
//!
//! Pickup is offered on the stretch of stops before the expressway and
//! drop-off on the stretch after it. Boundary stops are matched loosely
//! (case, hyphens and spacing are ignored) because stop names in route rows
//! are typed by hand.

/// Inclusive stretch of a stop list between two named stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopWindow {
    pub first: &'static str,
    pub last: &'static str,
}

pub const PICKUP_WINDOW: StopWindow = StopWindow {
    first: "Berger",
    last: "Ogudu",
};

pub const DROP_OFF_WINDOW: StopWindow = StopWindow {
    first: "Iyana Oworo",
    last: "Lekki Phase 1",
};

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches(stop: &str, boundary: &str) -> bool {
    let (stop, boundary) = (normalize(stop), normalize(boundary));
    !stop.is_empty() && !boundary.is_empty() && (stop.contains(&boundary) || boundary.contains(&stop))
}

pub fn find_stop(stops: &[String], name: &str) -> Option<usize> {
    stops.iter().position(|stop| matches(stop, name))
}

/// Stops inside `window`, or the whole list when either boundary is missing
/// or the boundaries are out of order.
pub fn stops_within(stops: &[String], window: StopWindow) -> Vec<String> {
    match (find_stop(stops, window.first), find_stop(stops, window.last)) {
        (Some(first), Some(last)) if first <= last => stops[first..=last].to_vec(),
        _ => stops.to_vec(),
    }
}

pub fn boarding_options(stops: &[String]) -> Vec<String> {
    stops_within(stops, PICKUP_WINDOW)
}

pub fn deboarding_options(stops: &[String]) -> Vec<String> {
    stops_within(stops, DROP_OFF_WINDOW)
}
