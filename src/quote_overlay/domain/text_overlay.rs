use super::error::DomainError;

/// Upper bound on the quote and on the attribution, counted in characters after trimming.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 2000;

/// Quote and optional attribution, validated on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteText {
    quote: String,
    attribution: Option<String>,
}

impl QuoteText {
    pub fn new(quote: &str, attribution: Option<&str>) -> Result<Self, DomainError> {
        Self::with_max_chars(quote, attribution, DEFAULT_MAX_TEXT_CHARS)
    }

    pub fn with_max_chars(quote: &str, attribution: Option<&str>, max_chars: usize) -> Result<Self, DomainError> {
        let quote = quote.trim();
        if quote.is_empty() {
            return Err(DomainError::EmptyText);
        }
        check_length("quote", quote, max_chars)?;
        // 空白だけの署名は無いものとして扱う
        let attribution = attribution.map(str::trim).filter(|a| !a.is_empty());
        if let Some(a) = attribution {
            check_length("attribution", a, max_chars)?;
        }
        let attribution = attribution.map(str::to_string);

        Ok(Self {
            quote: quote.to_string(),
            attribution,
        })
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }
}

fn check_length(field: &str, text: &str, max_chars: usize) -> Result<(), DomainError> {
    if text.chars().nth(max_chars).is_some() {
        return Err(DomainError::InvalidInput(format!(
            "{} is longer than {} characters",
            field, max_chars
        )));
    }
    Ok(())
}
