//! Loader configuration.

/// How the header's declared row pitch is treated for the top mip level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PitchPolicy {
    /// Use the declared pitch for level 0 of uncompressed formats when the
    /// `PITCH` flag is set. Deeper levels are always recomputed.
    #[default]
    PreferDeclared,
    /// Ignore the declared pitch and compute every level's pitch.
    Recompute,
}

/// Options for [`DdsLoader`](crate::DdsLoader).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Level 0 pitch handling.
    pub pitch_policy: PitchPolicy,
    /// Reject files whose planned payload exceeds this many bytes.
    pub max_payload_bytes: Option<u64>,
}

impl LoadOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pitch policy.
    pub fn pitch_policy(mut self, policy: PitchPolicy) -> Self {
        self.pitch_policy = policy;
        self
    }

    /// Cap the payload size.
    pub fn max_payload_bytes(mut self, limit: u64) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }
}
