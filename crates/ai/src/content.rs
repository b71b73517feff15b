//! Multi-language listing descriptions.
//!
//! The English description is generated first and screened with a full
//! compliance check. Translations run only for compliant copy, one
//! language at a time, and each one may fail on its own.

use std::sync::LazyLock;

use homestead_core::compliance::{CheckMode, ComplianceReport};
use homestead_core::error::CoreError;
use homestead_core::types::{Cents, ScoreSource};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::client::{complete_json, TextGenerator};
use crate::compliance;

/// Language of the generated base description.
pub const BASE_LANGUAGE: &str = "en";

/// Most target languages accepted in one request.
pub const MAX_LANGUAGES: usize = 10;

const DESCRIPTION_PROMPT: &str = "You write rental listing descriptions. Describe the property \
in 80 to 150 words of warm, factual English. Describe the home, never the ideal tenant. \
Answer with a JSON object: {\"description\": <text>}.";

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Za-z]{2,4})?$").expect("valid regex"));

/// What the description is written from.
#[derive(Debug, Clone)]
pub struct ListingFacts<'a> {
    pub title: &'a str,
    pub property_type: &'a str,
    pub city: &'a str,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub monthly_rent_cents: Cents,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub language: String,
    pub text: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContent {
    pub base_language: &'static str,
    pub description: String,
    /// `rules` when the template fallback was used.
    pub source: ScoreSource,
    pub compliance: ComplianceReport,
    pub translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct DescriptionOutput {
    description: String,
}

#[derive(Debug, Deserialize)]
struct TranslationOutput {
    text: String,
}

/// The placeholder stored for a translation that failed.
pub fn unavailable_placeholder(language: &str) -> String {
    format!("[Translation unavailable: {language}]")
}

/// Normalize and deduplicate requested language codes.
pub fn validate_languages(languages: &[String]) -> Result<Vec<String>, CoreError> {
    if languages.len() > MAX_LANGUAGES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_LANGUAGES} languages may be requested"
        )));
    }
    let mut out: Vec<String> = Vec::with_capacity(languages.len());
    for raw in languages {
        let code = raw.trim();
        if !LANGUAGE_RE.is_match(code) {
            return Err(CoreError::Validation(format!(
                "'{code}' is not a valid language code"
            )));
        }
        let code = code.to_string();
        if code != BASE_LANGUAGE && !out.contains(&code) {
            out.push(code);
        }
    }
    Ok(out)
}

fn describe(facts: &ListingFacts<'_>) -> String {
    let mut text = format!(
        "Title: {}\nType: {}\nCity: {}\nBedrooms: {}\nBathrooms: {}\nMonthly rent: {:.2}",
        facts.title,
        facts.property_type,
        facts.city,
        facts.bedrooms,
        facts.bathrooms,
        facts.monthly_rent_cents as f64 / 100.0
    );
    if let Some(notes) = facts.notes {
        text.push_str("\nOwner notes: ");
        text.push_str(notes);
    }
    text
}

/// Plain description built from the facts alone.
pub fn template_description(facts: &ListingFacts<'_>) -> String {
    let rooms = match facts.bedrooms {
        0 => "studio".to_string(),
        1 => "1 bedroom".to_string(),
        n => format!("{n} bedrooms"),
    };
    let baths = if facts.bathrooms == 1 {
        "1 bathroom".to_string()
    } else {
        format!("{} bathrooms", facts.bathrooms)
    };
    format!(
        "{}: {} in {} with {}, {}. Monthly rent {:.2}.",
        facts.title,
        facts.property_type,
        facts.city,
        rooms,
        baths,
        facts.monthly_rent_cents as f64 / 100.0
    )
}

async fn translate(generator: &dyn TextGenerator, text: &str, language: &str) -> Translation {
    let system = format!(
        "Translate the rental listing description into the language with code '{language}'. \
         Keep the meaning and tone. Answer with a JSON object: {{\"text\": <translation>}}."
    );
    match complete_json::<TranslationOutput>(generator, &system, text).await {
        Ok(out) if !out.text.trim().is_empty() => Translation {
            language: language.to_string(),
            text: out.text.trim().to_string(),
            available: true,
        },
        Ok(_) => {
            tracing::warn!(language, "Empty translation");
            unavailable(language)
        }
        Err(e) => {
            tracing::warn!(language, error = %e, "Translation failed");
            unavailable(language)
        }
    }
}

fn unavailable(language: &str) -> Translation {
    Translation {
        language: language.to_string(),
        text: unavailable_placeholder(language),
        available: false,
    }
}

/// Generate, screen and translate a listing description.
pub async fn generate(
    generator: &dyn TextGenerator,
    facts: &ListingFacts<'_>,
    languages: &[String],
) -> Result<GeneratedContent, CoreError> {
    let languages = validate_languages(languages)?;

    let (description, source) =
        match complete_json::<DescriptionOutput>(generator, DESCRIPTION_PROMPT, &describe(facts))
            .await
        {
            Ok(out) if !out.description.trim().is_empty() => {
                (out.description.trim().to_string(), ScoreSource::Combined)
            }
            Ok(_) => (template_description(facts), ScoreSource::Rules),
            Err(e) => {
                tracing::warn!(error = %e, "Description generation failed, using template");
                (template_description(facts), ScoreSource::Rules)
            }
        };

    let report = compliance::check(Some(generator), &description, CheckMode::Full).await?;

    let mut translations = Vec::new();
    if report.compliant {
        for language in &languages {
            translations.push(translate(generator, &description, language).await);
        }
    } else {
        tracing::info!(
            violations = report.violations.len(),
            "Generated description failed compliance, skipping translations"
        );
    }

    Ok(GeneratedContent {
        base_language: BASE_LANGUAGE,
        description,
        source,
        compliance: report,
        translations,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::client::AiError;
    use crate::testing::{FailingGenerator, ScriptedGenerator};

    fn facts() -> ListingFacts<'static> {
        ListingFacts {
            title: "Garden flat",
            property_type: "apartment",
            city: "Porto",
            bedrooms: 2,
            bathrooms: 1,
            monthly_rent_cents: 95_000,
            notes: None,
        }
    }

    #[test]
    fn languages_are_deduplicated_and_base_dropped() {
        let langs = vec!["pt".to_string(), "en".to_string(), "pt".to_string(), "fr".to_string()];
        assert_eq!(validate_languages(&langs).unwrap(), vec!["pt", "fr"]);
    }

    #[test]
    fn bad_language_code_is_rejected() {
        let langs = vec!["portuguese!".to_string()];
        assert_matches!(validate_languages(&langs), Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn translations_follow_compliant_description() {
        let generator = ScriptedGenerator::ok(&[
            r#"{"description": "A bright garden flat close to the river."}"#,
            r#"{"violations": []}"#,
            r#"{"text": "Um apartamento luminoso."}"#,
            r#"{"text": "Un appartement lumineux."}"#,
        ]);
        let langs = vec!["pt".to_string(), "fr".to_string()];

        let content = generate(&generator, &facts(), &langs).await.unwrap();

        assert!(content.compliance.compliant);
        assert_eq!(content.source, ScoreSource::Combined);
        assert_eq!(content.translations.len(), 2);
        assert_eq!(content.translations[0].language, "pt");
        assert!(content.translations.iter().all(|t| t.available));
    }

    #[tokio::test]
    async fn failed_translation_gets_placeholder() {
        let generator = ScriptedGenerator::new(vec![
            Ok(r#"{"description": "A bright garden flat."}"#.to_string()),
            Ok(r#"{"violations": []}"#.to_string()),
            Err(AiError::EmptyResponse),
            Ok(r#"{"text": "Un appartement."}"#.to_string()),
        ]);
        let langs = vec!["de".to_string(), "fr".to_string()];

        let content = generate(&generator, &facts(), &langs).await.unwrap();

        assert_eq!(content.translations[0].text, "[Translation unavailable: de]");
        assert!(!content.translations[0].available);
        assert_eq!(content.translations[1].text, "Un appartement.");
    }

    #[tokio::test]
    async fn non_compliant_description_is_not_translated() {
        let generator = ScriptedGenerator::ok(&[
            r#"{"description": "Cosy flat, adults only, no children."}"#,
            r#"{"violations": []}"#,
        ]);
        let langs = vec!["pt".to_string()];

        let content = generate(&generator, &facts(), &langs).await.unwrap();

        assert!(!content.compliance.compliant);
        assert!(content.translations.is_empty());
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn provider_down_uses_template() {
        let langs = vec!["es".to_string()];
        let content = generate(&FailingGenerator, &facts(), &langs).await.unwrap();

        assert_eq!(content.source, ScoreSource::Rules);
        assert_eq!(content.description, template_description(&facts()));
        assert_eq!(content.compliance.source, ScoreSource::Rules);
        assert_eq!(content.translations[0].text, unavailable_placeholder("es"));
    }
}
