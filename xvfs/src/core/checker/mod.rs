// SPDX-License-Identifier: MIT

pub mod stats;
pub mod tracker;
mod types;

pub use stats::WalkerStats;
pub use tracker::RefTracker;
pub use types::{CheckPhase, CheckReport, Finding, Severity};

pub use crate::core::errors::{FsCheckerError, FsCheckerResult};

/// Trait for verifying the integrity of a filesystem.
///
/// Phases run in a fixed order and the first failing phase aborts the check:
/// a violation is returned as `Err`, never recorded and skipped. Informational
/// and warning findings accumulate in the returned [`CheckReport`].
pub trait FsChecker {
    type Options: Default;

    fn check_with(&mut self, opt: &Self::Options) -> FsCheckerResult<CheckReport> {
        let mut rep = CheckReport::default();
        self.run_phase(opt, &mut rep, CheckPhase::Geometry, Self::check_geometry)?;
        self.run_phase(opt, &mut rep, CheckPhase::Root, Self::check_root)?;
        self.run_phase(opt, &mut rep, CheckPhase::Tree, Self::check_tree)?;
        self.run_phase(opt, &mut rep, CheckPhase::Inodes, Self::check_inodes)?;
        self.run_phase(opt, &mut rep, CheckPhase::Bitmap, Self::check_bitmap)?;
        Ok(rep)
    }

    fn check_all(&mut self) -> FsCheckerResult<CheckReport> {
        self.check_with(&Self::Options::default())
    }

    fn check_geometry(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut CheckReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_root(&mut self, _opt: &Self::Options, _rep: &mut CheckReport) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_tree(&mut self, _opt: &Self::Options, _rep: &mut CheckReport) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_inodes(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut CheckReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }
    fn check_bitmap(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut CheckReport,
    ) -> FsCheckerResult<()> {
        Ok(())
    }

    fn run_phase<F>(
        &mut self,
        opt: &Self::Options,
        rep: &mut CheckReport,
        phase: CheckPhase,
        f: F,
    ) -> FsCheckerResult<()>
    where
        F: Fn(&mut Self, &Self::Options, &mut CheckReport) -> FsCheckerResult<()>,
    {
        f(self, opt, rep)?;
        rep.complete(phase);
        Ok(())
    }
}
