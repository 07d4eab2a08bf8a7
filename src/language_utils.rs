use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Catalog keys are ISO 639-1 codes. Clients may ask for a language by its
/// ISO 639-1, ISO 639-2/T or ISO 639-2/B code, so every lookup goes through
/// `canonical_code` first.

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Resolve any supported form of a code to a language
pub fn parse_language(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = part2b_to_part2t(&normalized).unwrap_or(&normalized);
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1, falling back to ISO 639-2/T
/// for languages without a two-letter code
pub fn canonical_code(code: &str) -> Result<String> {
    let language = parse_language(code)?;
    Ok(language
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| language.to_639_3().to_string()))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (parse_language(code1), parse_language(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// English name of a language
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(parse_language(code)?.to_name().to_string())
}

/// Name of a language in that language, if known
pub fn get_local_name(code: &str) -> Result<Option<String>> {
    Ok(parse_language(code)?.to_autonym().map(str::to_string))
}
