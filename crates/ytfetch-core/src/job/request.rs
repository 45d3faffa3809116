use serde::{Deserialize, Serialize};

/// Requested video quality: best available, or capped to a maximum height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Best,
    MaxHeight(u32),
}

impl Resolution {
    /// A plain number is a height cap; anything else (`best`, `max`, ...) means best.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(h) = value.parse::<u32>() {
                return Resolution::MaxHeight(h);
            }
        }
        Resolution::Best
    }
}

/// One job: fetch a single URL (or a whole playlist) with the given output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub resolution: Resolution,
    pub output_format: String,
    pub extract_audio: bool,
    pub is_playlist: bool,
    pub proxy: Option<String>,
}

impl DownloadRequest {
    /// Single video at best quality, muxed into mp4.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resolution: Resolution::Best,
            output_format: "mp4".to_string(),
            extract_audio: false,
            is_playlist: false,
            proxy: None,
        }
    }

    pub fn with_resolution(mut self, resolution: &str) -> Self {
        self.resolution = Resolution::parse(resolution);
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn with_extract_audio(mut self, extract_audio: bool) -> Self {
        self.extract_audio = extract_audio;
        self
    }

    pub fn with_playlist(mut self, is_playlist: bool) -> Self {
        self.is_playlist = is_playlist;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// Result of one finished job. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub url: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn success(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            succeeded: false,
            error: Some(error.into()),
        }
    }

    pub fn from_result<E: std::fmt::Display>(url: &str, res: Result<(), E>) -> Self {
        match res {
            Ok(()) => Self::success(url),
            Err(e) => Self::failure(url, e.to_string()),
        }
    }
}
