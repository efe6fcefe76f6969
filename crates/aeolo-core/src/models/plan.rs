//! Plan model
//!
//! A plan is one bandwidth policy tier: ceiling rates, committed
//! information rate (CIR) bookkeeping, burst allowances and
//! long-transfer caps, pooled under a provider group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::provider_group::ProviderGroup;
use crate::math::{div_or, finite_or, whole_or, CIR_FALLBACK};
use crate::{AppError, AppResult};

/// How a plan's CIR bookkeeping is driven
///
/// Exactly one mode is active at a time, and it decides which side of
/// the CIR bookkeeping is the input and which is derived on every save.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum CirMode {
    /// The absolute totals are the input; the fractions are derived
    TotalCir,
    /// The fraction of the ceiling to guarantee is the input
    Percentage(f64),
    /// A reuse multiplier is the input (1.0 guarantees the full ceiling)
    ReUsed(f64),
}

impl CirMode {
    /// Selector string for the active mode
    pub fn selector(&self) -> &'static str {
        match self {
            CirMode::TotalCir => "total_cir",
            CirMode::Percentage(_) => "percentage",
            CirMode::ReUsed(_) => "re_used",
        }
    }

    /// True when the absolute totals are the authoritative input
    #[inline]
    pub fn used_total_cir(&self) -> bool {
        matches!(self, CirMode::TotalCir)
    }

    /// True when the CIR fraction comes from a caller-supplied percentage
    #[inline]
    pub fn used_cir_percentage(&self) -> bool {
        matches!(self, CirMode::Percentage(_))
    }

    /// Build the mode from its selector string and per-mode payload.
    ///
    /// Unknown or empty selectors fall back to re-used mode.
    pub fn from_selector(selector: &str, percentage: f64, reuse: f64) -> Self {
        match selector {
            "total_cir" => CirMode::TotalCir,
            "percentage" => CirMode::Percentage(percentage),
            _ => CirMode::ReUsed(reuse),
        }
    }

    /// Rehydrate the mode from a stored flag pair.
    ///
    /// `cir` is the stored multiplier. It becomes the payload so that a
    /// rehydrated plan reconciles to the same values it was saved with.
    pub fn from_flags(used_total_cir: bool, used_cir_percentage: bool, cir: f64) -> Self {
        if used_total_cir {
            CirMode::TotalCir
        } else if used_cir_percentage {
            CirMode::Percentage(cir)
        } else {
            CirMode::ReUsed(cir)
        }
    }
}

impl Default for CirMode {
    fn default() -> Self {
        CirMode::ReUsed(1.0)
    }
}

/// Parse a reuse ratio expression into a CIR multiplier.
///
/// Accepts either a bare number ("0.5") or a "guaranteed:sold" pair
/// ("1:4" guarantees a quarter of the ceiling). Returns `None` for
/// anything that does not describe a positive finite ratio.
pub fn parse_ratio(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let value = match raw.split_once(':') {
        Some((guaranteed, sold)) => {
            let guaranteed: f64 = guaranteed.trim().parse().ok()?;
            let sold: f64 = sold.trim().parse().ok()?;
            if sold == 0.0 {
                return None;
            }
            guaranteed / sold
        }
        None => raw.parse().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

fn different_to_zero(value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::new("different_to_zero"));
    }
    Ok(())
}

/// Plan model representing one bandwidth policy tier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Plan {
    /// Unique plan ID
    pub id: i32,

    /// Human-readable plan name, unique across all plans
    #[validate(length(min = 3, max = 128))]
    pub name: String,

    /// Provider group whose pool this plan draws from
    #[validate(required)]
    pub provider_group_id: Option<i32>,

    /// Upload ceiling rate in kbit/s
    #[validate(custom(function = "different_to_zero"))]
    pub ceil_up: u32,

    /// Download ceiling rate in kbit/s
    #[validate(custom(function = "different_to_zero"))]
    pub ceil_down: u32,

    /// Upload burst allowance in kbit
    pub burst_up: u32,

    /// Download burst allowance in kbit
    pub burst_down: u32,

    /// Download volume in kbyte after which a transfer counts as long
    #[validate(range(max = 4_294_967_294u64))]
    pub long_download_max: u64,

    /// Upload volume in kbyte after which a transfer counts as long
    #[validate(range(max = 4_294_967_294u64))]
    pub long_upload_max: u64,

    /// Active CIR mode and its payload
    pub cir_mode: CirMode,

    /// Upload CIR as a fraction of the ceiling, derived on save
    pub cir_up: f64,

    /// Download CIR as a fraction of the ceiling, derived on save
    pub cir_down: f64,

    /// Committed upload capacity across all contracts in kbit/s
    pub total_cir_up: u64,

    /// Committed download capacity across all contracts in kbit/s
    pub total_cir_down: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// True when the absolute totals are the authoritative input
    #[inline]
    pub fn used_total_cir(&self) -> bool {
        self.cir_mode.used_total_cir()
    }

    /// True when the CIR fraction comes from a caller-supplied percentage
    #[inline]
    pub fn used_cir_percentage(&self) -> bool {
        self.cir_mode.used_cir_percentage()
    }

    /// Reconcile the CIR bookkeeping for the active mode.
    ///
    /// Runs once per save, after validation and before the record is
    /// persisted. Whichever side the mode treats as the input stays
    /// untouched and the other side is recomputed from it:
    ///
    /// - `TotalCir` derives the per-plan fractions from the totals
    /// - `Percentage` and `ReUsed` take the fraction from the mode
    ///   payload and recompute the totals from it
    ///
    /// Arithmetic never fails here: a collapsed denominator substitutes
    /// `CIR_FALLBACK` for the fractions and zero for the totals, so a
    /// save is not blocked by a transient zero-contract state.
    pub fn reconcile_cir(&mut self, contract_count: u64) {
        let count = contract_count as f64;

        match self.cir_mode {
            CirMode::TotalCir => {
                self.cir_up = div_or(
                    self.total_cir_up as f64,
                    self.ceil_up as f64 * count,
                    CIR_FALLBACK,
                );
                self.cir_down = div_or(
                    self.total_cir_down as f64,
                    self.ceil_down as f64 * count,
                    CIR_FALLBACK,
                );
            }
            CirMode::Percentage(fraction) => {
                self.cir_up = fraction;
                self.cir_down = fraction;
            }
            CirMode::ReUsed(multiplier) => {
                self.cir_up = multiplier;
                self.cir_down = multiplier;
            }
        }

        // The totals are the input in total_cir mode and must survive the save.
        if !self.cir_mode.used_total_cir() {
            self.total_cir_up = whole_or(self.ceil_up as f64 * self.cir_up * count, 0);
            self.total_cir_down = whole_or(self.ceil_down as f64 * self.cir_down * count, 0);
        }
    }

    /// Committed upload capacity bounded by the plan's share of the group pool.
    ///
    /// The shaping generator consumes the up/down pair cross-wired: the
    /// upload bound is derived from the group's download-side figures
    /// and vice versa.
    pub fn real_total_cir_up(&self, group: &ProviderGroup) -> AppResult<u64> {
        if group.total_cir_down == 0 {
            return Err(AppError::DivisionByZero(format!(
                "provider group {} has zero total CIR down",
                group.id
            )));
        }
        let share =
            group.rate_down as u128 * self.total_cir_down as u128 / group.total_cir_down as u128;
        Ok(share.min(self.total_cir_up as u128) as u64)
    }

    /// Committed download capacity bounded by the plan's share of the group pool.
    pub fn real_total_cir_down(&self, group: &ProviderGroup) -> AppResult<u64> {
        if group.total_cir_up == 0 {
            return Err(AppError::DivisionByZero(format!(
                "provider group {} has zero total CIR up",
                group.id
            )));
        }
        let share =
            group.rate_up as u128 * self.total_cir_up as u128 / group.total_cir_up as u128;
        Ok(share.min(self.total_cir_down as u128) as u64)
    }

    /// Per-contract slice of the bounded upload capacity in kbit/s
    pub fn cir_factor_up(&self, group: &ProviderGroup, contract_count: u64) -> AppResult<u64> {
        if contract_count == 0 {
            return Err(AppError::DivisionByZero(format!(
                "plan {} has no contracts to share CIR between",
                self.name
            )));
        }
        Ok(self.real_total_cir_up(group)? / contract_count)
    }

    /// Per-contract slice of the bounded download capacity in kbit/s
    pub fn cir_factor_down(&self, group: &ProviderGroup, contract_count: u64) -> AppResult<u64> {
        if contract_count == 0 {
            return Err(AppError::DivisionByZero(format!(
                "plan {} has no contracts to share CIR between",
                self.name
            )));
        }
        Ok(self.real_total_cir_down(group)? / contract_count)
    }

    /// Sustained upload rate in kbit/s (ceiling scaled by the CIR fraction)
    pub fn rate_up(&self) -> f64 {
        finite_or(self.ceil_up as f64 * self.cir_up, 0.0)
    }

    /// Sustained download rate in kbit/s (ceiling scaled by the CIR fraction)
    pub fn rate_down(&self) -> f64 {
        finite_or(self.ceil_down as f64 * self.cir_down, 0.0)
    }

    /// Upload burst allowance converted from kbit to bytes
    #[inline]
    pub fn burst_up_to_bytes(&self) -> u64 {
        (self.burst_up as u64 / 8) * 1024
    }

    /// Download burst allowance converted from kbit to bytes
    #[inline]
    pub fn burst_down_to_bytes(&self) -> u64 {
        (self.burst_down as u64 / 8) * 1024
    }

    /// Long-transfer download threshold converted from kbyte to bytes
    #[inline]
    pub fn long_download_max_to_bytes(&self) -> u64 {
        self.long_download_max * 1024
    }

    /// Long-transfer upload threshold converted from kbyte to bytes
    #[inline]
    pub fn long_upload_max_to_bytes(&self) -> u64 {
        self.long_upload_max * 1024
    }

    /// Display name used by the change-audit sink
    pub fn auditable_name(&self) -> String {
        format!("Plan: {}", self.name)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            provider_group_id: None,
            ceil_up: 0,
            ceil_down: 0,
            burst_up: 0,
            burst_down: 0,
            long_download_max: 0,
            long_upload_max: 0,
            cir_mode: CirMode::default(),
            cir_up: 0.0,
            cir_down: 0.0,
            total_cir_up: 0,
            total_cir_down: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
