//! Turn loop - drives the per-tick cadence
//!
//! wait for start, then per tick: snapshot -> refresh the local view ->
//! one decision pass per owned unit -> submit if it is our move. Units
//! run strictly sequentially within a tick so later units observe the
//! speculative effects of earlier decisions.

use crate::actions::ActionKind;
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::decision::decide;
use crate::transport::Transport;
use crate::view::LocalView;

/// Totals for one complete run, for reporting and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub ticks: u64,
    pub builds: u64,
    pub moves: u64,
    /// Turns the engine rejected; each one loses that tick's actions
    pub rejected: u64,
}

pub struct TurnLoop<T: Transport> {
    transport: T,
    config: AgentConfig,
}

impl<T: Transport> TurnLoop<T> {
    pub fn new(transport: T, config: AgentConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until the engine signals game over
    ///
    /// A rejected submission is fatal for that tick only: the actions are
    /// lost, the loop carries on with the next snapshot. Everything else
    /// that escalates out of a tick ends the run.
    pub fn run(&mut self) -> Result<TurnReport> {
        let my_team = self.transport.wait_for_start()?;
        tracing::info!(team = my_team.0, "game started");

        let mut view = LocalView::new(my_team, self.config.clone());
        let mut report = TurnReport::default();

        while !self.transport.is_game_over() {
            let snapshot = self.transport.wait_till_next_turn()?;
            view.refresh(&snapshot);

            let units = view.owned_units();
            tracing::debug!(tick = snapshot.tick, units = units.len(), "turn snapshot");

            for id in units {
                // The unit can vanish mid-pass only if the snapshot lied;
                // skipping is the safe answer either way.
                let Some(unit) = view.unit(id).copied() else {
                    continue;
                };
                match decide(&unit, &mut view, snapshot.tick, &self.config)? {
                    Some(ActionKind::Build(direction)) => {
                        tracing::debug!(unit = id.0, ?direction, "committed build");
                        report.builds += 1;
                    }
                    Some(ActionKind::Move(direction)) => {
                        tracing::debug!(unit = id.0, ?direction, "committed move");
                        report.moves += 1;
                    }
                    None => {}
                }
            }

            if self.transport.is_my_turn() {
                let actions = view.drain_actions();
                match self.transport.submit_turn(actions) {
                    Ok(()) => {}
                    Err(AgentError::TurnRejected(reason)) => {
                        tracing::error!(%reason, tick = snapshot.tick, "turn rejected");
                        report.rejected += 1;
                    }
                    Err(other) => return Err(other),
                }
            }
            report.ticks += 1;
        }

        tracing::info!(
            ticks = report.ticks,
            builds = report.builds,
            moves = report.moves,
            "game over"
        );
        Ok(report)
    }
}
