//! Compensation computation.
//!
//! Subjects earn a base payment, a bonus per distinct region reached (plus an
//! extra for reaching all three), and an equal share of a fixed Pareto pool:
//! the pool divides evenly across frontier points, and each point's share
//! divides evenly among its owners. Joining payouts to the external identity
//! spreadsheet stays outside this crate — the export carries the participant
//! integer parsed from the owner id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;

use designlab_core::domain::SubjectId;

use crate::pareto::ParetoFront;

/// Payment constants, in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensationSchedule {
    pub base: f64,
    pub per_region: f64,
    pub all_regions_bonus: f64,
    pub pareto_pool: f64,
}

impl Default for CompensationSchedule {
    fn default() -> Self {
        Self {
            base: 20.0,
            per_region: 3.0,
            all_regions_bonus: 1.0,
            pareto_pool: 20.0,
        }
    }
}

/// One subject's computed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub subject: SubjectId,
    /// Participant integer from `"<name> (ID <n>)"`.
    pub participant_id: u64,
    /// Rounded to cents.
    pub dollars: f64,
}

#[derive(Debug, Error)]
pub enum CompensationError {
    #[error("subject id {0:?} does not carry a participant integer")]
    UnparsableSubject(SubjectId),
    #[error("frontier owner {0:?} is not in the subject roster")]
    UnknownOwner(SubjectId),
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Compute payouts for every subject in `coverage` (coverage score 0–3 per
/// subject, from the region tallies). Frontier owners must all appear in the
/// roster.
pub fn compute_payouts(
    front: &ParetoFront,
    coverage: &BTreeMap<SubjectId, u8>,
    schedule: &CompensationSchedule,
) -> Result<Vec<Payout>, CompensationError> {
    let mut dollars: BTreeMap<SubjectId, f64> = BTreeMap::new();

    for (subject, &score) in coverage {
        let mut amount = schedule.base + schedule.per_region * f64::from(score);
        if score == 3 {
            amount += schedule.all_regions_bonus;
        }
        dollars.insert(subject.clone(), amount);
    }

    if !front.is_empty() {
        let per_point = schedule.pareto_pool / front.len() as f64;
        for (_, owners) in front.iter() {
            let per_owner = per_point / owners.len() as f64;
            for owner in owners {
                let entry = dollars
                    .get_mut(owner)
                    .ok_or_else(|| CompensationError::UnknownOwner(owner.clone()))?;
                *entry += per_owner;
            }
        }
    }

    dollars
        .into_iter()
        .map(|(subject, amount)| {
            let participant_id = subject
                .numeric_id()
                .ok_or_else(|| CompensationError::UnparsableSubject(subject.clone()))?;
            Ok(Payout {
                subject,
                participant_id,
                dollars: (amount * 100.0).round() / 100.0,
            })
        })
        .collect()
}

/// Write payouts as CSV: `participant_id,dollars` with a header row.
pub fn write_csv<W: Write>(payouts: &[Payout], writer: W) -> Result<(), CompensationError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["participant_id", "dollars"])?;
    for payout in payouts {
        out.write_record([
            payout.participant_id.to_string(),
            format!("{:.2}", payout.dollars),
        ])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
