use crate::domain::Coordinates;

/// City-hall area fallback, shown before any district has been chosen.
pub const SEOUL_CENTER: Coordinates = Coordinates {
    lat: 37.5665,
    lng: 126.9780,
};

// Map centers for the 25 autonomous districts. These are fixed camera
// positions, not geocoded boundaries, so they live in code rather than config.
const DISTRICT_CENTERS: [(&str, f64, f64); 25] = [
    ("강남구", 37.5172, 127.0473),
    ("강동구", 37.5301, 127.1238),
    ("강북구", 37.6396, 127.0257),
    ("강서구", 37.5510, 126.8495),
    ("관악구", 37.4784, 126.9516),
    ("광진구", 37.5384, 127.0823),
    ("구로구", 37.4954, 126.8875),
    ("금천구", 37.4501, 126.9004),
    ("노원구", 37.6543, 127.0564),
    ("도봉구", 37.6688, 127.0471),
    ("동대문구", 37.5744, 127.0396),
    ("동작구", 37.5124, 126.9393),
    ("마포구", 37.5634, 126.9083),
    ("서대문구", 37.5791, 126.9368),
    ("서초구", 37.4836, 127.0326),
    ("성동구", 37.5633, 127.0369),
    ("성북구", 37.5894, 127.0182),
    ("송파구", 37.5145, 127.1058),
    ("양천구", 37.5271, 126.8562),
    ("영등포구", 37.5263, 126.8963),
    ("용산구", 37.5325, 126.9900),
    ("은평구", 37.6176, 126.9227),
    ("종로구", 37.5730, 126.9794),
    ("중구", 37.5636, 126.9977),
    ("중랑구", 37.6060, 127.0927),
];

/// Looks up the map center for a district name, `None` for anything that is
/// not one of the 25 Seoul districts.
pub fn center_of(gu: &str) -> Option<Coordinates> {
    DISTRICT_CENTERS
        .iter()
        .find(|(name, _, _)| *name == gu)
        .map(|(_, lat, lng)| Coordinates {
            lat: *lat,
            lng: *lng,
        })
}

pub fn is_known(gu: &str) -> bool {
    center_of(gu).is_some()
}

pub fn names() -> impl Iterator<Item = &'static str> {
    DISTRICT_CENTERS.iter().map(|(name, _, _)| *name)
}
