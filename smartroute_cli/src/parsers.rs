use jiff::SpanRelativeTo;
use smartroute_optimizer::problem::coordinate::Coordinate;

pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    if let Ok(seconds) = input.parse::<i64>() {
        return Ok(jiff::SignedDuration::from_secs(seconds.abs()));
    }

    Err(String::from("Invalid duration"))
}

/// `lat,lng`
pub fn parse_coordinate(input: &str) -> Result<Coordinate, String> {
    let (lat, lng) = input
        .split_once(',')
        .ok_or_else(|| String::from("Expected <lat>,<lng>"))?;

    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("Invalid latitude: {error}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("Invalid longitude: {error}"))?;

    Coordinate::try_new(lat, lng).ok_or_else(|| format!("Coordinate {lat},{lng} is out of range"))
}
