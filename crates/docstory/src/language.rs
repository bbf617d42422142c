//! Supported locales and language detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Locales the prompt templates exist for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    /// Portuguese
    Portuguese,
    /// English
    English,
    /// Spanish
    Spanish,
}

impl Locale {
    /// All supported locales
    pub const ALL: [Locale; 3] = [Locale::Portuguese, Locale::English, Locale::Spanish];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Portuguese => "pt",
            Locale::English => "en",
            Locale::Spanish => "es",
        }
    }

    /// English name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Locale::Portuguese => "Portuguese",
            Locale::English => "English",
            Locale::Spanish => "Spanish",
        }
    }

    /// Map a detector result onto the supported set
    pub fn from_detected(lang: whatlang::Lang) -> Result<Self> {
        match lang {
            whatlang::Lang::Por => Ok(Locale::Portuguese),
            whatlang::Lang::Eng => Ok(Locale::English),
            whatlang::Lang::Spa => Ok(Locale::Spanish),
            other => Err(Error::UnsupportedLanguage(format!(
                "detected '{}' ({}), expected one of pt, en, es",
                other.code(),
                other.eng_name()
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pt" | "por" | "pt-br" | "pt-pt" | "portuguese" | "português" | "portugues" => {
                Ok(Locale::Portuguese)
            }
            "en" | "eng" | "en-us" | "en-gb" | "english" | "inglês" | "ingles" => {
                Ok(Locale::English)
            }
            "es" | "spa" | "es-es" | "spanish" | "espanhol" | "español" | "espanol" => {
                Ok(Locale::Spanish)
            }
            other => Err(Error::UnsupportedLanguage(format!(
                "'{}' (choose pt, en or es)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.code().to_string()
    }
}

/// Detection outcome with the detector's confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Detected locale
    pub locale: Locale,
    /// Detector confidence in `[0, 1]`
    pub confidence: f64,
}

/// Classify normalized text into a supported locale
pub fn detect_language(text: &str) -> Result<Detection> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput(
            "text is empty, language cannot be detected".to_string(),
        ));
    }

    let info = whatlang::detect(text).ok_or_else(|| {
        Error::EmptyInput("language could not be detected, content may be insufficient".to_string())
    })?;

    let locale = Locale::from_detected(info.lang())?;
    tracing::debug!(
        "Detected language {} (confidence {:.2}, reliable: {})",
        locale.code(),
        info.confidence(),
        info.is_reliable()
    );

    Ok(Detection {
        locale,
        confidence: info.confidence(),
    })
}
