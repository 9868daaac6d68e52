//! Command-line arguments and the language-model configuration record.
//!
//! [`LmConfig`] carries the architecture knobs of the minimind model. The
//! probe only builds the default instance (or one loaded from a JSON file)
//! and prints it; nothing here constructs a model.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "minimind-probe",
    about = "Report accelerators and print the default model configuration"
)]
pub struct Cli {
    /// Load configuration overrides from a JSON file instead of using defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit a single JSON document instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Language-model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Model family identifier.
    pub model_type: String,

    /// Hidden (embedding) dimension.
    pub dim: usize,

    /// Number of transformer layers.
    pub n_layers: usize,

    /// Number of attention heads.
    pub n_heads: usize,

    /// Number of KV heads (for GQA).
    pub n_kv_heads: usize,

    /// Vocabulary size.
    pub vocab_size: usize,

    /// Explicit FFN hidden size; derived from `dim` when unset.
    pub hidden_dim: Option<usize>,

    /// FFN hidden size is rounded up to a multiple of this.
    pub multiple_of: usize,

    /// RMSNorm epsilon.
    pub norm_eps: f64,

    /// Maximum sequence length.
    pub max_seq_len: usize,

    /// RoPE base frequency.
    pub rope_theta: f64,

    pub dropout: f64,

    pub flash_attn: bool,

    // Mixture-of-experts settings; ignored unless `use_moe` is set.
    pub use_moe: bool,

    /// Experts selected per token.
    pub num_experts_per_tok: usize,

    /// Total routed experts.
    pub n_routed_experts: usize,

    /// Always-active shared experts.
    pub n_shared_experts: usize,

    /// Gate scoring function.
    pub scoring_func: String,

    /// Auxiliary load-balancing loss weight.
    pub aux_loss_alpha: f64,

    /// Compute the auxiliary loss per sequence rather than per batch.
    pub seq_aux: bool,

    /// Renormalize top-k gate probabilities.
    pub norm_topk_prob: bool,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            model_type: "minimind".to_string(),
            dim: 512,
            n_layers: 8,
            n_heads: 8,
            n_kv_heads: 2,
            vocab_size: 6400,
            hidden_dim: None,
            multiple_of: 64,
            norm_eps: 1e-5,
            max_seq_len: 8192,
            rope_theta: 1e6,
            dropout: 0.0,
            flash_attn: true,
            use_moe: false,
            num_experts_per_tok: 2,
            n_routed_experts: 4,
            n_shared_experts: 1,
            scoring_func: "softmax".to_string(),
            aux_loss_alpha: 0.1,
            seq_aux: true,
            norm_topk_prob: true,
        }
    }
}

impl LmConfig {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str::<LmConfig>(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Config file not found at {:?}, using defaults", path);
                LmConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Per-head dimension (0 when `n_heads` is 0).
    pub fn head_dim(&self) -> usize {
        self.dim.checked_div(self.n_heads).unwrap_or(0)
    }

    /// FFN hidden size: `hidden_dim` if set, otherwise 8/3 of `dim` rounded
    /// up to `multiple_of`.
    pub fn ffn_hidden_dim(&self) -> Result<usize, ConfigError> {
        if let Some(h) = self.hidden_dim {
            return Ok(h);
        }
        self.dim
            .checked_mul(8)
            .map(|h| h / 3)
            .and_then(|h| h.checked_next_multiple_of(self.multiple_of))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "FFN hidden size cannot be derived from dim ({}) and multiple_of ({})",
                    self.dim, self.multiple_of
                ))
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_heads == 0 || self.dim % self.n_heads != 0 {
            return Err(ConfigError::Invalid(format!(
                "dim ({}) must be a positive multiple of n_heads ({})",
                self.dim, self.n_heads
            )));
        }
        if self.n_kv_heads == 0 || self.n_heads % self.n_kv_heads != 0 {
            return Err(ConfigError::Invalid(format!(
                "n_heads ({}) must be a positive multiple of n_kv_heads ({})",
                self.n_heads, self.n_kv_heads
            )));
        }
        if self.multiple_of == 0 {
            return Err(ConfigError::Invalid("multiple_of must be > 0".to_string()));
        }
        self.ffn_hidden_dim()?;
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::Invalid(format!(
                "dropout ({}) must be in [0, 1)",
                self.dropout
            )));
        }
        if self.use_moe && self.num_experts_per_tok > self.n_routed_experts {
            return Err(ConfigError::Invalid(format!(
                "num_experts_per_tok ({}) exceeds n_routed_experts ({})",
                self.num_experts_per_tok, self.n_routed_experts
            )));
        }
        Ok(())
    }
}

/// Renders as `LmConfig {pretty JSON}`.
impl fmt::Display for LmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "LmConfig {json}")
    }
}
