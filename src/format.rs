use std::fmt;

/// Image formats a page can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Bmp,
    Jpeg,
    Gif,
    Emf,
    Wmf,
}

impl OutputFormat {
    /// Accepted format tokens, in the order the usage text lists them.
    pub const TOKENS: [&'static str; 7] = ["png", "bmp", "jpg", "jpeg", "gif", "emf", "wmf"];

    /// Map a format token to a format. Matching ignores case but is otherwise exact.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "emf" => Some(Self::Emf),
            "wmf" => Some(Self::Wmf),
            _ => None,
        }
    }

    /// File extension used for output files. `jpg` input still yields `jpeg` here.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_resolves() {
        for token in OutputFormat::TOKENS {
            assert!(OutputFormat::from_token(token).is_some(), "{token}");
            assert!(OutputFormat::from_token(&token.to_uppercase()).is_some(), "{token}");
        }
    }

    #[test]
    fn jpg_and_jpeg_are_the_same_format() {
        assert_eq!(OutputFormat::from_token("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_token("JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_token("JpG").map(OutputFormat::extension), Some("jpeg"));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        for token in ["", "tiff", "png ", ".png", "jpe", "webp", "svg"] {
            assert_eq!(OutputFormat::from_token(token), None, "{token:?}");
        }
    }

    #[test]
    fn display_is_the_extension() {
        assert_eq!(OutputFormat::Wmf.to_string(), "wmf");
        assert_eq!(OutputFormat::Jpeg.to_string(), "jpeg");
    }
}
