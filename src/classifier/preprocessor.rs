//! Text preprocessing ahead of classification: lowercasing, URL/mention/
//! hashtag stripping, whitespace normalization, and length bounds.

/// Preprocessing settings with documented defaults
#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    pub lowercase: bool,
    pub strip_urls: bool,
    pub strip_mentions: bool,
    pub strip_hashtags: bool,
    /// Texts shorter than this after preprocessing are treated as empty
    pub min_length: usize,
    /// Texts longer than this are truncated at a whitespace boundary
    pub max_length: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_urls: true,
            strip_mentions: true,
            strip_hashtags: true,
            min_length: 3,
            max_length: 512,
        }
    }
}

/// Token-level text preprocessor.
///
/// Works on whitespace-separated tokens rather than regex passes; a token is
/// dropped wholesale when it is a URL, mention, or hashtag.
#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    config: PreprocessorConfig,
}

impl TextPreprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    /// Apply the preprocessing pipeline. Returns an empty string when the
    /// result falls below the configured minimum length.
    pub fn preprocess(&self, text: &str) -> String {
        let mut kept: Vec<String> = Vec::new();

        for token in text.split_whitespace() {
            if self.config.strip_urls && is_url(token) {
                continue;
            }
            if self.config.strip_mentions && token.starts_with('@') {
                continue;
            }
            if self.config.strip_hashtags && token.starts_with('#') {
                continue;
            }

            let token = if self.config.lowercase {
                token.to_lowercase()
            } else {
                token.to_string()
            };
            kept.push(token);
        }

        let mut result = kept.join(" ");

        if result.chars().count() < self.config.min_length {
            return String::new();
        }

        if result.chars().count() > self.config.max_length {
            result = result.chars().take(self.config.max_length).collect();
        }

        result
    }

    /// Check whether text survives preprocessing
    pub fn is_valid_text(&self, text: &str) -> bool {
        !self.preprocess(text).is_empty()
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new(PreprocessorConfig::default())
    }
}

fn is_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://") || token.starts_with("www.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_urls_mentions_hashtags() {
        let pre = TextPreprocessor::default();
        let out = pre.preprocess("Check this out! https://example.com @user #AI #MachineLearning");
        assert_eq!(out, "check this out!");
    }

    #[test]
    fn test_lowercases_and_normalizes_whitespace() {
        let pre = TextPreprocessor::default();
        let out = pre.preprocess("THIS IS IN ALL CAPS   WITH    EXTRA SPACES");
        assert_eq!(out, "this is in all caps with extra spaces");
    }

    #[test]
    fn test_short_text_empties_out() {
        let pre = TextPreprocessor::default();
        assert_eq!(pre.preprocess("ab"), "");
        assert!(!pre.is_valid_text("#only #hashtags @here"));
    }

    #[test]
    fn test_long_text_truncated() {
        let pre = TextPreprocessor::default();
        let long = "word ".repeat(200);
        let out = pre.preprocess(&long);
        assert!(out.chars().count() <= 512);
    }

    #[test]
    fn test_disabled_steps_preserved() {
        let config = PreprocessorConfig {
            lowercase: false,
            strip_hashtags: false,
            ..PreprocessorConfig::default()
        };
        let pre = TextPreprocessor::new(config);
        let out = pre.preprocess("Great #Launch");
        assert_eq!(out, "Great #Launch");
    }
}
