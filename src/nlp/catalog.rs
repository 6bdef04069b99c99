//! Canonical product catalog and the model-name → product-family mapping.

use regex::Regex;
use std::sync::OnceLock;

pub const NO_SPECIFIC_PRODUCT: &str = "No specific product";
pub const OTHERS: &str = "Others";

/// Families the annotator may answer with.
pub const PRODUCT_CATEGORIES: &[&str] = &[
    "Galaxy S",
    "Galaxy Z Flip",
    "Galaxy Z Fold",
    "Galaxy Tab S",
    "Galaxy Tab A",
    "Galaxy A",
    "Galaxy M",
    "Galaxy Watch",
    "Galaxy Buds",
    "Monitor",
    "Soundbar",
    "Refrigerator",
    "Laundry",
    "Air Conditioner",
    "Vacuum Cleaner",
    "Microwave",
    "Others",
];

/// Known product names, in lookup order.
pub const CANONICAL_PRODUCTS: &[&str] = &[
    "Galaxy S20", "Galaxy S21", "Galaxy S22", "Galaxy S23", "Galaxy S24", "Galaxy S25",
    "Galaxy Z Flip3", "Galaxy Z Flip4", "Galaxy Z Flip5", "Galaxy Z Flip6", "Galaxy Z Flip7",
    "Galaxy Z Fold2", "Galaxy Z Fold3", "Galaxy Z Fold4", "Galaxy Z Fold5", "Galaxy Z Fold6",
    "Galaxy Z Fold7",
    "Galaxy Tab S6", "Galaxy Tab S7", "Galaxy Tab S8", "Galaxy Tab S9", "Galaxy Tab S10",
    "Galaxy Tab A7", "Galaxy Tab A8", "Galaxy Tab A9", "Galaxy Tab A10",
    "Galaxy A01", "Galaxy A02", "Galaxy A03", "Galaxy A04", "Galaxy A05", "Galaxy A06",
    "Galaxy A10", "Galaxy A11", "Galaxy A12", "Galaxy A13", "Galaxy A14", "Galaxy A15",
    "Galaxy A16", "Galaxy A20", "Galaxy A21", "Galaxy A22", "Galaxy A23", "Galaxy A24",
    "Galaxy A25", "Galaxy A26", "Galaxy A2", "Galaxy A30", "Galaxy A31", "Galaxy A32",
    "Galaxy A33", "Galaxy A34", "Galaxy A35", "Galaxy A36", "Galaxy A50", "Galaxy A51",
    "Galaxy A52", "Galaxy A53", "Galaxy A54", "Galaxy A55", "Galaxy A56", "Galaxy A70",
    "Galaxy A71", "Galaxy A72", "Galaxy A73", "Galaxy A7", "Galaxy A80", "Galaxy A9",
    "Galaxy M02", "Galaxy M10", "Galaxy M11", "Galaxy M12", "Galaxy M14", "Galaxy M15",
    "Galaxy M20", "Galaxy M21", "Galaxy M22", "Galaxy M23", "Galaxy M30", "Galaxy M31",
    "Galaxy M32", "Galaxy M33", "Galaxy M34", "Galaxy M51", "Galaxy M52", "Galaxy M53",
    "Galaxy M54", "Galaxy M62",
    "Galaxy Watch 3", "Galaxy Watch 4", "Galaxy Watch 5", "Galaxy Watch 6", "Galaxy Watch 7",
    "Galaxy Watch 8", "Galaxy Watch FE", "Galaxy Watch Ultra", "Galaxy Watch Active",
    "Galaxy Buds", "Galaxy Buds 2", "Galaxy Buds 3", "Galaxy Buds FE", "Galaxy Buds Live",
    "Galaxy Buds Plus", "Galaxy Buds Pro",
    "Monitor", "Soundbar", "Refrigerator", "Laundry", "Air Conditioner", "Vacuum Cleaner",
    "Microwave",
    "The Frame", "The Serif", "The Sero", "The Premiere", "The Freestyle", "OLED", "NEO QLED",
    "QLED", "Crystal UHD",
];

/// Ordered family rules over a lowercased product name; first match wins.
const FAMILY_RULES: &[(&str, &str)] = &[
    (r"z flip", "Galaxy Z Flip"),
    (r"z fold", "Galaxy Z Fold"),
    (r"\bs\d{2}\b", "Galaxy S"),
    (r"tab s", "Galaxy Tab S"),
    (r"tab a", "Galaxy Tab A"),
    (r"\ba\d{1,2}\b", "Galaxy A"),
    (r"\bm\d{1,2}\b", "Galaxy M"),
    (r"watch", "Galaxy Watch"),
    (r"buds", "Galaxy Buds"),
    (r"monitor", "Monitor"),
    (r"soundbar", "Soundbar"),
    (r"refrigerator", "Refrigerator"),
    (r"laundry", "Laundry"),
    (r"microwave", "Microwave"),
    (r"air conditioner|aircon|air-con", "Air Conditioner"),
    (r"vacuum", "Vacuum Cleaner"),
];

fn family_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        FAMILY_RULES
            .iter()
            .filter_map(|(pattern, family)| Regex::new(pattern).ok().map(|re| (re, *family)))
            .collect()
    })
}

/// Family of a catalog entry by rule; `Others` when no rule applies.
pub fn family_of(product: &str) -> &'static str {
    let low = product.to_lowercase();
    family_rules()
        .iter()
        .find(|(re, _)| re.is_match(&low))
        .map(|(_, family)| *family)
        .unwrap_or(OTHERS)
}

fn catalog() -> &'static [(&'static str, &'static str)] {
    static CATALOG: OnceLock<Vec<(&'static str, &'static str)>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        CANONICAL_PRODUCTS
            .iter()
            .map(|p| (*p, family_of(p)))
            .collect()
    })
}

/// Category for a model name: exact catalog hit, then the first catalog entry
/// contained in it (case-insensitive), else `Others`.
pub fn assign_category(product: &str) -> &'static str {
    if product.is_empty() {
        return OTHERS;
    }
    if let Some((_, family)) = catalog().iter().find(|(known, _)| *known == product) {
        return family;
    }
    let low = product.to_lowercase();
    catalog()
        .iter()
        .find(|(known, _)| low.contains(&known.to_lowercase()))
        .map(|(_, family)| *family)
        .unwrap_or(OTHERS)
}
