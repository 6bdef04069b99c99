use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

pub const SAMSUNG_STAR: &str = "Samsung Star";
pub const MODERATOR: &str = "Moderator";
pub const MEMBER: &str = "Member";

/// Community-star roster, as displayed on the forum.
const STAR_ROSTER: &[&str] = &[
    "pntv1905", "davidbui13", "nguyennam", "Jiyoon051", "thaoxuka", "Garam", "SnehaTS", "AmeetM",
    "Jodsta", "HS_NzAu", "Dolgogi", "mbckl", "VueeyLe", "Manue12", "Dietta", "Vee33", "shelley_",
    "photosbyraffy", "Nessaslifestylediary", "_nok_", "djrules24", "Yasmik", "Cgers80",
    "StephenMC", "nxmah", "duggle", "abdurraim", "BagusPrisandhy", "AriMantep", "anggazone08",
    "Henders-", "krisnugroho", "bagusjpg", "bayJoee", "galaxyOD", "KAKPJ", "Uqiuqian",
    "CaptainLynnnn", "alinrizkiana", "Alvitooo", "mikaelrinto", "fazri91", "Kbbbb",
    "Jeremyeyeguy", "JamieGems", "peeonurhead", "TheAseanPrince", "nattooh", "SG_Yap",
    "Wolfsbanee", "Sukasblood", "klausandfound", "unclechan", "23edl_", "renwei89", "nazzzz",
    "jun4hong2", "Tiganamploh", "YOLO_CY", "theroytravels", "aliasyraf", "Keryin", "jonloo1126",
    "Angpaologized", "PPHATTARAPONG", "ttoeytraveller", "Bern2Hell", "bagol1209", "TimmyRose",
    "SummeRamirez", "MarkLuceño", "LiezlNierves",
];

const TRIM_CHARS: &[char] = &[
    '@', '#', '-', '*', '_', '|', '(', ')', '[', ']', '{', '}', ':', ',', ';', '.', '!', '?', '"',
    '\'',
];

/// Lowercase, strip diacritics and compatibility forms (NFKD, then keep
/// ASCII), collapse whitespace and trim surrounding punctuation.
pub fn normalize_name(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(TRIM_CHARS).to_string()
}

fn star_roster() -> &'static HashSet<String> {
    static ROSTER: OnceLock<HashSet<String>> = OnceLock::new();
    ROSTER.get_or_init(|| {
        STAR_ROSTER
            .iter()
            .map(|n| normalize_name(n))
            .filter(|n| !n.is_empty())
            .collect()
    })
}

fn moderator_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"(?i)global_contents", r"(?i)\bsamsung\b"]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

pub fn roster_size() -> usize {
    star_roster().len()
}

pub fn classify_posted_by(author_name: &str) -> &'static str {
    if author_name.trim().is_empty() {
        return MEMBER;
    }
    if star_roster().contains(&normalize_name(author_name)) {
        return SAMSUNG_STAR;
    }
    if moderator_patterns().iter().any(|re| re.is_match(author_name)) {
        return MODERATOR;
    }
    MEMBER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(normalize_name("  @Henders-  "), "henders");
        assert_eq!(normalize_name("MarkLuceño"), "markluceno");
        assert_eq!(normalize_name("Some   Body"), "some body");
        assert_eq!(normalize_name("_nok_"), "nok");
    }

    #[test]
    fn stacked_diacritics_and_wide_forms_fold_to_ascii() {
        assert_eq!(normalize_name("NguyễnNam"), "nguyennam");
        assert_eq!(normalize_name("Thảo Xuka"), "thao xuka");
        assert_eq!(normalize_name("ｄｕｇｇｌｅ"), "duggle");
        assert_eq!(classify_posted_by("NguyễnNam"), SAMSUNG_STAR);
        assert_eq!(classify_posted_by("ＳＧ＿Ｙａｐ"), SAMSUNG_STAR);
    }

    #[test]
    fn stars_moderators_members() {
        assert_eq!(classify_posted_by("duggle"), SAMSUNG_STAR);
        assert_eq!(classify_posted_by("SG_YAP"), SAMSUNG_STAR);
        assert_eq!(classify_posted_by("nok"), SAMSUNG_STAR);
        assert_eq!(classify_posted_by("Global_Contents_SG"), MODERATOR);
        assert_eq!(classify_posted_by("Samsung Care"), MODERATOR);
        assert_eq!(classify_posted_by("samsungfan"), MEMBER);
        assert_eq!(classify_posted_by(""), MEMBER);
        assert_eq!(classify_posted_by("random_user"), MEMBER);
    }

    #[test]
    fn roster_is_loaded() {
        assert_eq!(roster_size(), STAR_ROSTER.len());
    }
}
