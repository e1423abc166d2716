use crate::domain::CanonicalCategory;

// Structured type identifiers as they appear in upstream ontology categories
// (e.g. "koah:VeterinaryHospital"). Matched case-sensitively against the raw
// category only, in declaration order.
const STRUCTURED_IDENTIFIERS: [(&str, CanonicalCategory); 11] = [
    ("VeterinaryHospital", CanonicalCategory::Hospital),
    ("BeautySalon", CanonicalCategory::Care),
    ("Pharmacy", CanonicalCategory::Pharmacy),
    ("PetShop", CanonicalCategory::Shop),
    ("Supplies", CanonicalCategory::Shop),
    ("PetCafe", CanonicalCategory::Cafe),
    ("Cafe", CanonicalCategory::Cafe),
    ("Funeral", CanonicalCategory::Funeral),
    ("Culture", CanonicalCategory::Culture),
    ("Museum", CanonicalCategory::Culture),
    ("PoopBag", CanonicalCategory::Poopbag),
];

// Korean keyword fallback for records whose category field is free-form,
// generic ("기타") or empty. Substring containment, not tokenized, so a
// keyword inside a longer word still counts.
const CATEGORY_KEYWORDS: [(CanonicalCategory, &[&str]); 8] = [
    (
        CanonicalCategory::Hospital,
        &["병원", "클리닉", "의료", "메디컬", "치과"],
    ),
    (CanonicalCategory::Pharmacy, &["약국"]),
    (
        CanonicalCategory::Care,
        &["미용", "살롱", "헤어", "목욕", "스파"],
    ),
    (
        CanonicalCategory::Shop,
        &["용품", "사료", "간식", "마트", "스토어"],
    ),
    (
        CanonicalCategory::Cafe,
        &["카페", "커피", "cafe", "coffee"],
    ),
    (CanonicalCategory::Funeral, &["장례", "추모"]),
    (
        CanonicalCategory::Culture,
        &["미술관", "박물관", "전시", "문화"],
    ),
    (CanonicalCategory::Poopbag, &["배변봉투", "봉투함"]),
];

/// Maps a facility's raw category identifier and display name to a canonical
/// category tag, or `None` when neither carries a recognizable signal.
///
/// Structured identifiers win over keyword matches, and within each pass the
/// first table entry that matches wins. Both inputs may be empty; the
/// function always returns.
pub fn classify(raw_category: &str, name: &str) -> Option<CanonicalCategory> {
    // Structured identifiers are authoritative when the source supplies them
    for (marker, category) in STRUCTURED_IDENTIFIERS {
        if raw_category.contains(marker) {
            return Some(category);
        }
    }

    // Fall back to keyword matching over the category text and name together
    let haystack = format!("{}{}", raw_category, name).to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return Some(category);
        }
    }

    None
}
